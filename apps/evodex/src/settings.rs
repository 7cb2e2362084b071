//! # Settings
//!
//! Loads [`EvodexConfig`] from TOML and layers command-line overrides on top.
//!
//! Resolution order, later wins:
//! 1. Built-in defaults
//! 2. The config file (`--config`, or `evodex.toml` in the working
//!    directory when present)
//! 3. Command-line flags

use evodex_core::{Backend, EvodexConfig, EvodexError, ImageVariant};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "evodex.toml";

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

// =============================================================================
// LOADING
// =============================================================================

/// Parse a TOML document into a configuration. Missing keys take defaults.
pub fn parse_config(text: &str) -> Result<EvodexConfig, EvodexError> {
    toml::from_str(text).map_err(|e| EvodexError::ConfigError(e.to_string()))
}

/// Load the configuration file.
///
/// An explicit path must exist. Without one, `evodex.toml` is read if it is
/// there and defaults are used otherwise.
pub fn load_config(path: Option<&Path>) -> Result<EvodexConfig, EvodexError> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.is_file() {
                tracing::debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(EvodexConfig::default());
            }
            fallback
        }
    };

    let metadata = std::fs::metadata(&path).map_err(|e| {
        EvodexError::ConfigError(format!("Cannot read config '{}': {}", path.display(), e))
    })?;
    if metadata.len() > MAX_CONFIG_FILE_SIZE {
        return Err(EvodexError::ConfigError(format!(
            "Config '{}' exceeds {} bytes",
            path.display(),
            MAX_CONFIG_FILE_SIZE
        )));
    }

    let text = std::fs::read_to_string(&path)
        .map_err(|e| EvodexError::IoError(format!("Read config: {}", e)))?;
    tracing::debug!("Loaded config from {:?}", path);
    parse_config(&text)
}

// =============================================================================
// OVERRIDES
// =============================================================================

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub database: Option<PathBuf>,
    pub backend: Option<Backend>,
    pub variant: Option<ImageVariant>,
    pub sprite_dir: Option<PathBuf>,
}

impl Overrides {
    /// Overwrite every field that was given.
    pub fn apply(&self, config: &mut EvodexConfig) {
        if let Some(database) = &self.database {
            config.catalog.database.clone_from(database);
        }
        if let Some(backend) = self.backend {
            config.catalog.backend = backend;
        }
        if let Some(variant) = self.variant {
            config.images.variant = variant;
        }
        if let Some(sprite_dir) = &self.sprite_dir {
            config.images.sprite_dir = Some(sprite_dir.clone());
        }
    }
}

/// Load, override, then validate.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &Overrides,
) -> Result<EvodexConfig, EvodexError> {
    let mut config = load_config(path)?;
    overrides.apply(&mut config);
    config.validate()?;
    Ok(config)
}

// =============================================================================
// TESTS
// =============================================================================
