//! # Core Type Definitions
//!
//! This module contains the shared vocabulary of the Evodex core:
//! - Catalog identifiers (`SpeciesId`, `ChainId`)
//! - Raw rows returned by the chain store (`SpeciesRow`, `EdgeRow`, `ChainRows`)
//! - The tagged evolution method (`EvolutionMethod`)
//! - Image variants
//! - Warnings (`EvodexWarning`, `IntegrityIssue`, `MissingData`)
//! - Error types (`EvodexError`)
//!
//! ## Determinism Guarantees
//!
//! Identifier types implement `Ord` so that every map and set keyed by them
//! iterates in the same order on every run.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Catalog number of a species (1..=386 in a valid catalog).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesId(pub u16);

impl SpeciesId {
    /// Get the raw catalog number.
    #[must_use]
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Check whether the id lies inside the catalog range.
    #[must_use]
    pub const fn is_in_catalog(self) -> bool {
        self.0 >= crate::primitives::MIN_SPECIES_ID && self.0 <= crate::primitives::MAX_SPECIES_ID
    }
}

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:03}", self.0)
    }
}

/// Identifier grouping species into one evolutionary family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChainId(pub u32);

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chain {}", self.0)
    }
}

// =============================================================================
// CATALOG RECORDS
// =============================================================================

/// A species as stored in the catalog. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    pub chain_id: ChainId,
}

impl Species {
    #[must_use]
    pub fn new(id: SpeciesId, name: impl Into<String>, chain_id: ChainId) -> Self {
        Self {
            id,
            name: name.into(),
            chain_id,
        }
    }
}

/// One species row of a chain query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesRow {
    pub id: SpeciesId,
    pub name: String,
}

/// One directed evolution edge as stored, before interpretation.
///
/// `method` is kept as the raw tag so that unknown values survive until the
/// formatter can report them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRow {
    pub from: SpeciesId,
    pub to: SpeciesId,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub minimum_level: Option<u32>,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub trigger: Option<String>,
}

impl EdgeRow {
    /// Create an edge with only a method tag.
    #[must_use]
    pub fn new(from: SpeciesId, to: SpeciesId, method: Option<&str>) -> Self {
        Self {
            from,
            to,
            method: method.map(str::to_string),
            minimum_level: None,
            item_name: None,
            trigger: None,
        }
    }

    /// Set the minimum level.
    #[must_use]
    pub fn with_level(mut self, level: u32) -> Self {
        self.minimum_level = Some(level);
        self
    }

    /// Set the item name.
    #[must_use]
    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.item_name = Some(item.into());
        self
    }

    /// Set the auxiliary trigger tag.
    #[must_use]
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.trigger = Some(trigger.into());
        self
    }

    /// Parse the raw method tag.
    #[must_use]
    pub fn parsed_method(&self) -> EvolutionMethod {
        EvolutionMethod::parse(self.method.as_deref())
    }
}

/// Everything the chain store returns for one chain query.
///
/// `chain_id` is `None` when the requested species is unknown to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainRows {
    pub chain_id: Option<ChainId>,
    pub species: Vec<SpeciesRow>,
    pub edges: Vec<EdgeRow>,
    /// Members left out by the store's per-chain member cap.
    pub omitted_members: usize,
}

impl ChainRows {
    /// Rows for a species the store does not know.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check whether the given species appears among the species rows.
    #[must_use]
    pub fn contains_species(&self, id: SpeciesId) -> bool {
        self.species.iter().any(|row| row.id == id)
    }
}

// =============================================================================
// EVOLUTION METHOD
// =============================================================================

/// The transformation requirement kind carried by an edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EvolutionMethod {
    Level,
    Stone,
    UseItem,
    Trade,
    TradeItem,
    Happiness,
    HappinessDay,
    HappinessNight,
    LevelAttackHigher,
    LevelDefenseHigher,
    LevelAttackDefenseEqual,
    /// No method recorded (null or empty tag).
    None,
    /// A tag this build does not know.
    Unrecognized(String),
}

impl EvolutionMethod {
    /// Parse a raw method tag. Total: every input maps to a variant.
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim) else {
            return Self::None;
        };
        match raw {
            "" => Self::None,
            "level" => Self::Level,
            "stone" => Self::Stone,
            "use-item" => Self::UseItem,
            "trade" => Self::Trade,
            "trade-item" => Self::TradeItem,
            "happiness" => Self::Happiness,
            "happiness-day" => Self::HappinessDay,
            "happiness-night" => Self::HappinessNight,
            "level-attack-higher" => Self::LevelAttackHigher,
            "level-defense-higher" => Self::LevelDefenseHigher,
            "level-attack-defense-equal" => Self::LevelAttackDefenseEqual,
            other => Self::Unrecognized(other.to_string()),
        }
    }

    /// The canonical tag for this method.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Level => "level",
            Self::Stone => "stone",
            Self::UseItem => "use-item",
            Self::Trade => "trade",
            Self::TradeItem => "trade-item",
            Self::Happiness => "happiness",
            Self::HappinessDay => "happiness-day",
            Self::HappinessNight => "happiness-night",
            Self::LevelAttackHigher => "level-attack-higher",
            Self::LevelDefenseHigher => "level-defense-higher",
            Self::LevelAttackDefenseEqual => "level-attack-defense-equal",
            Self::None => "",
            Self::Unrecognized(tag) => tag,
        }
    }
}

impl fmt::Display for EvolutionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// IMAGE VARIANT
// =============================================================================

/// Which thumbnail of a species to show.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum ImageVariant {
    #[default]
    Normal,
    Shiny,
}

impl ImageVariant {
    /// Directory-style name of the variant.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Shiny => "shiny",
        }
    }
}

impl fmt::Display for ImageVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ImageVariant {
    type Err = EvodexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "shiny" => Ok(Self::Shiny),
            other => Err(EvodexError::ConfigError(format!(
                "unknown image variant '{other}' (expected normal or shiny)"
            ))),
        }
    }
}

// =============================================================================
// WARNINGS
// =============================================================================

/// A structural anomaly found while resolving a chain.
///
/// Each issue has already been corrected when it is reported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// No species without an incoming edge reaches the requested one; the
    /// lowest id that does was used as root.
    NoRoot { chosen: SpeciesId },
    /// Several species have no incoming edge; the lowest one whose subtree
    /// holds the requested species was used as root.
    MultipleRoots {
        candidates: Vec<SpeciesId>,
        chosen: SpeciesId,
    },
    /// Edge to an already staged species was dropped (cycle or second parent).
    RevisitSkipped { from: SpeciesId, to: SpeciesId },
    /// Edge endpoint is not a member of the chain.
    DanglingEdge { from: SpeciesId, to: SpeciesId },
    /// A second row for the same `(from, to)` pair was ignored.
    DuplicateEdge { from: SpeciesId, to: SpeciesId },
    /// Species not reachable from the chosen root was left out of the stages.
    UnreachableSpecies { species: SpeciesId },
    /// The chain exceeded the member cap; `omitted` members were never fetched.
    ChainTruncated { kept: usize, omitted: usize },
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoRoot { chosen } => write!(f, "no root candidate, chose {chosen}"),
            Self::MultipleRoots { candidates, chosen } => {
                write!(f, "{} root candidates, chose {chosen}", candidates.len())
            }
            Self::RevisitSkipped { from, to } => {
                write!(f, "skipped edge {from} -> {to} to already visited species")
            }
            Self::DanglingEdge { from, to } => {
                write!(f, "skipped edge {from} -> {to} leaving the chain")
            }
            Self::DuplicateEdge { from, to } => write!(f, "duplicate edge {from} -> {to}"),
            Self::UnreachableSpecies { species } => {
                write!(f, "{species} unreachable from root")
            }
            Self::ChainTruncated { kept, omitted } => {
                write!(f, "chain truncated to {kept} members, {omitted} omitted")
            }
        }
    }
}

/// Data the resolver or formatter expected but did not find.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissingData {
    /// The store returned no chain rows containing the species.
    NoChainRows { species: SpeciesId },
    /// An item-based edge has no item name.
    MissingItem {
        edge: Option<(SpeciesId, SpeciesId)>,
        method: String,
    },
}

/// Coarse classification used for counting and filtering warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WarningKind {
    DataIntegrity,
    MissingData,
    UnrecognizedMethod,
    ImageUnavailable,
}

/// A recoverable anomaly. Logged once through `tracing` and returned
/// alongside the best-effort result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvodexWarning {
    /// All integrity issues of one resolution, already corrected.
    DataIntegrity {
        chain_id: Option<ChainId>,
        issues: Vec<IntegrityIssue>,
    },
    MissingData(MissingData),
    UnrecognizedMethod {
        edge: Option<(SpeciesId, SpeciesId)>,
        method: String,
    },
    ImageUnavailable {
        species: SpeciesId,
        variant: ImageVariant,
        reason: String,
    },
}

impl EvodexWarning {
    /// Classify the warning.
    #[must_use]
    pub fn kind(&self) -> WarningKind {
        match self {
            Self::DataIntegrity { .. } => WarningKind::DataIntegrity,
            Self::MissingData(_) => WarningKind::MissingData,
            Self::UnrecognizedMethod { .. } => WarningKind::UnrecognizedMethod,
            Self::ImageUnavailable { .. } => WarningKind::ImageUnavailable,
        }
    }

    /// Write the warning to the logging sink.
    pub fn emit(&self) {
        tracing::warn!(kind = ?self.kind(), "{}", self);
    }
}

fn fmt_edge(edge: Option<(SpeciesId, SpeciesId)>) -> String {
    match edge {
        Some((from, to)) => format!(" on edge {from} -> {to}"),
        None => String::new(),
    }
}

impl fmt::Display for EvodexWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DataIntegrity { chain_id, issues } => {
                match chain_id {
                    Some(id) => write!(f, "data integrity ({id}): ")?,
                    None => write!(f, "data integrity: ")?,
                }
                for (i, issue) in issues.iter().enumerate() {
                    if i > 0 {
                        f.write_str("; ")?;
                    }
                    write!(f, "{issue}")?;
                }
                Ok(())
            }
            Self::MissingData(MissingData::NoChainRows { species }) => {
                write!(f, "missing data: no chain rows for {species}")
            }
            Self::MissingData(MissingData::MissingItem { edge, method }) => {
                write!(f, "missing data: '{method}' without item name{}", fmt_edge(*edge))
            }
            Self::UnrecognizedMethod { edge, method } => {
                write!(f, "unrecognized method '{method}'{}", fmt_edge(*edge))
            }
            Self::ImageUnavailable {
                species,
                variant,
                reason,
            } => write!(f, "image unavailable for {species} ({variant}): {reason}"),
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the Evodex system.
///
/// Only `StoreUnavailable` and `IoError` can come out of a display model
/// request; everything else belongs to catalog loading and configuration.
#[derive(Debug, Error)]
pub enum EvodexError {
    /// The raw-query collaborator could not be reached.
    #[error("Chain store unavailable: {0}")]
    StoreUnavailable(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A serialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// A deserialization error occurred.
    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    /// The catalog failed validation and was not loaded.
    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    /// A configuration value is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================
