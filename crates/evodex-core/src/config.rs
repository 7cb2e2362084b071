//! # Configuration
//!
//! Every setting has a default, so an empty file (or no file) is a valid
//! configuration. Parsing the file is the binary's job; this module only
//! defines the shape and checks the values.

use crate::instrumentation::Budgets;
use crate::primitives::{
    DEFAULT_CHAIN_CACHE_CAPACITY, DEFAULT_IMAGE_CACHE_CAPACITY, MAX_REQUIREMENT_LENGTH,
    MIN_REQUIREMENT_LENGTH,
};
use crate::requirement::RequirementFormatter;
use crate::{EvodexError, ImageVariant};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Upper bound accepted for either cache capacity.
pub const MAX_CACHE_CAPACITY: usize = 4096;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvodexConfig {
    pub cache: CacheConfig,
    pub budgets: Budgets,
    pub formatter: FormatterConfig,
    pub images: ImageConfig,
    pub catalog: CatalogConfig,
}

/// `[cache]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub chain_capacity: usize,
    pub image_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            chain_capacity: DEFAULT_CHAIN_CACHE_CAPACITY,
            image_capacity: DEFAULT_IMAGE_CACHE_CAPACITY,
        }
    }
}

/// `[formatter]` section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Longest requirement text shown before truncation, in characters.
    pub max_chars: usize,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            max_chars: MAX_REQUIREMENT_LENGTH,
        }
    }
}

impl FormatterConfig {
    #[must_use]
    pub fn formatter(&self) -> RequirementFormatter {
        RequirementFormatter::with_limit(self.max_chars)
    }
}

/// `[images]` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub variant: ImageVariant,
    /// Root of the sprite tree; no images are shown when unset.
    pub sprite_dir: Option<PathBuf>,
}

/// Storage backend for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// redb database with typed-key tables.
    #[default]
    Redb,
    /// Binary snapshot file loaded into memory.
    File,
}

impl Backend {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Redb => "redb",
            Self::File => "file",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = EvodexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "redb" => Ok(Self::Redb),
            "file" => Ok(Self::File),
            other => Err(EvodexError::ConfigError(format!(
                "unknown backend '{other}' (expected redb or file)"
            ))),
        }
    }
}

/// `[catalog]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub database: PathBuf,
    pub backend: Backend,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from("evodex.db"),
            backend: Backend::Redb,
        }
    }
}

impl EvodexConfig {
    /// Reject values the caches and budgets cannot work with.
    pub fn validate(&self) -> Result<(), EvodexError> {
        for (name, capacity) in [
            ("cache.chain_capacity", self.cache.chain_capacity),
            ("cache.image_capacity", self.cache.image_capacity),
        ] {
            if capacity == 0 || capacity > MAX_CACHE_CAPACITY {
                return Err(EvodexError::ConfigError(format!(
                    "{name} must be between 1 and {MAX_CACHE_CAPACITY}, got {capacity}"
                )));
            }
        }

        for (name, budget) in [
            ("budgets.cold_linear_ms", self.budgets.cold_linear_ms),
            ("budgets.cold_branching_ms", self.budgets.cold_branching_ms),
            ("budgets.warm_ms", self.budgets.warm_ms),
        ] {
            if budget == 0 {
                return Err(EvodexError::ConfigError(format!("{name} must be positive")));
            }
        }

        if self.formatter.max_chars < MIN_REQUIREMENT_LENGTH {
            return Err(EvodexError::ConfigError(format!(
                "formatter.max_chars must be at least {MIN_REQUIREMENT_LENGTH}"
            )));
        }

        if self.catalog.database.as_os_str().is_empty() {
            return Err(EvodexError::ConfigError(
                "catalog.database must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EvolutionMethod;

    #[test]
    fn defaults_are_valid() {
        let config = EvodexConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache.chain_capacity, 50);
        assert_eq!(config.cache.image_capacity, 50);
        assert_eq!(config.budgets.cold_linear_ms, 200);
        assert_eq!(config.catalog.backend, Backend::Redb);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: EvodexConfig =
            serde_json::from_str(r#"{"cache": {"image_capacity": 8}, "images": {"variant": "shiny"}}"#)
                .expect("parse");
        assert_eq!(config.cache.chain_capacity, 50);
        assert_eq!(config.cache.image_capacity, 8);
        assert_eq!(config.images.variant, ImageVariant::Shiny);
        assert_eq!(config.budgets, Budgets::default());
    }

    #[test]
    fn zero_capacity_rejected() {
        let mut config = EvodexConfig::default();
        config.cache.chain_capacity = 0;
        assert!(matches!(config.validate(), Err(EvodexError::ConfigError(_))));
    }

    #[test]
    fn zero_budget_rejected() {
        let mut config = EvodexConfig::default();
        config.budgets.warm_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn short_formatter_limit_rejected() {
        let mut config = EvodexConfig::default();
        config.formatter.max_chars = 3;
        assert!(config.validate().is_err());

        config.formatter.max_chars = 20;
        assert!(config.validate().is_ok());
        assert_eq!(config.formatter.formatter().max_chars(), 20);
    }

    #[test]
    fn default_limit_keeps_longest_documented_requirements() {
        let formatter = EvodexConfig::default().formatter.formatter();
        assert_eq!(formatter.max_chars(), MAX_REQUIREMENT_LENGTH);
        assert!(formatter.max_chars() > 20);

        let trade = formatter.format(&EvolutionMethod::TradeItem, None, Some("Metal Coat"), None);
        assert_eq!(trade.text, "Trade holding Metal Coat");
        let night = formatter.format(&EvolutionMethod::HappinessNight, None, None, None);
        assert_eq!(night.text, "High Friendship (Night)");
    }

    #[test]
    fn backend_parsing() {
        assert_eq!("file".parse::<Backend>().ok(), Some(Backend::File));
        assert!("sqlite".parse::<Backend>().is_err());
    }
}
