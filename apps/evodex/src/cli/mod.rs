//! # Evodex CLI Module
//!
//! This module implements the CLI interface for Evodex.
//!
//! ## Available Commands
//!
//! - `init` - Initialize an empty catalog database
//! - `import` - Validate and load a JSON catalog
//! - `export` - Write the catalog as JSON or as a binary snapshot
//! - `show` - Print the evolution display model of one species
//! - `status` - Show catalog counts and active settings
//! - `profile` - Time repeated requests against the latency budgets

mod commands;

use crate::settings::{Overrides, resolve_config};
use clap::{Parser, Subcommand};
use evodex_core::{Backend, EvodexError, ImageVariant};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Evodex - Evolution Chain Browser
///
/// Resolves evolution chains from a species catalog and prints the display
/// model a renderer would draw.
#[derive(Parser, Debug)]
#[command(name = "evodex")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to the TOML config file (default: ./evodex.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the catalog database (overrides catalog.database)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Storage backend: "redb" (ACID database) or "file" (binary snapshot)
    #[arg(short = 'B', long, global = true)]
    pub backend: Option<String>,

    /// Sprite directory (overrides images.sprite_dir)
    #[arg(long, global = true)]
    pub sprite_dir: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new empty catalog database
    Init {
        /// Force initialization even if database exists
        #[arg(short, long)]
        force: bool,
    },

    /// Import a JSON catalog, replacing the stored one
    Import {
        /// Path to the catalog file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Export the stored catalog
    Export {
        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Export format (json, snapshot)
        #[arg(short = 't', long, default_value = "json")]
        format: String,
    },

    /// Show the evolution chain of a species
    Show {
        /// Catalog number of the species
        species: u16,

        /// Thumbnail variant (normal, shiny)
        #[arg(long)]
        variant: Option<String>,
    },

    /// Show catalog status
    Status,

    /// Time repeated display model requests
    Profile {
        /// Catalog numbers to request, in order
        #[arg(required = true)]
        species: Vec<u16>,

        /// Number of passes over the list
        #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=10_000))]
        rounds: u32,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), EvodexError> {
    let variant = match &cli.command {
        Some(Commands::Show {
            variant: Some(raw), ..
        }) => Some(raw.parse::<ImageVariant>()?),
        _ => None,
    };
    let overrides = Overrides {
        database: cli.database,
        backend: cli.backend.as_deref().map(str::parse::<Backend>).transpose()?,
        variant,
        sprite_dir: cli.sprite_dir,
    };
    let config = resolve_config(cli.config.as_deref(), &overrides)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Init { force }) => cmd_init(&config, force),
        Some(Commands::Import { file }) => cmd_import(&config, &file),
        Some(Commands::Export { output, format }) => cmd_export(&config, &output, &format),
        Some(Commands::Show { species, .. }) => cmd_show(&config, species, json_mode, cli.verbose),
        Some(Commands::Profile { species, rounds }) => {
            cmd_profile(&config, &species, rounds, json_mode)
        }
        Some(Commands::Status) | None => {
            // No subcommand - show status by default
            cmd_status(&config, json_mode)
        }
    }
}
