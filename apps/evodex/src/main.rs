//! # Evodex - Evolution Chain Browser
//!
//! The binary for the Evodex chain engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                 apps/evodex (THE BINARY)                 │
//! │                                                          │
//! │  ┌─────────────┐   ┌──────────────┐   ┌──────────────┐   │
//! │  │    CLI      │   │   Settings   │   │   Sprites    │   │
//! │  │   (clap)    │   │   (toml)     │   │  (sprite dir)│   │
//! │  └──────┬──────┘   └──────┬───────┘   └──────┬───────┘   │
//! │         └─────────────────┼──────────────────┘           │
//! │                           ▼                              │
//! │                   ┌───────────────┐                      │
//! │                   │  evodex-core  │                      │
//! │                   │  (THE LOGIC)  │                      │
//! │                   └───────────────┘                      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! evodex init
//! evodex import -f catalog.json
//! evodex show 133 --variant shiny
//! evodex profile 4 5 6 --rounds 10
//! ```

use clap::Parser;
use evodex::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    // EVODEX_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("EVODEX_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "evodex=info,evodex_core=warn".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the Evodex startup banner.
fn print_banner() {
    println!(
        r#"
  ███████╗██╗   ██╗ ██████╗ ██████╗ ███████╗██╗  ██╗
  ██╔════╝██║   ██║██╔═══██╗██╔══██╗██╔════╝╚██╗██╔╝
  █████╗  ██║   ██║██║   ██║██║  ██║█████╗   ╚███╔╝
  ██╔══╝  ╚██╗ ██╔╝██║   ██║██║  ██║██╔══╝   ██╔██╗
  ███████╗ ╚████╔╝ ╚██████╔╝██████╔╝███████╗██╔╝ ██╗
  ╚══════╝  ╚═══╝   ╚═════╝ ╚═════╝ ╚══════╝╚═╝  ╚═╝

  Evolution Chain Browser v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
