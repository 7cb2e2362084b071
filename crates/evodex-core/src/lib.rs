//! # evodex-core
//!
//! The evolution chain engine for Evodex - THE LOGIC.
//!
//! Turns raw species and evolution rows into a navigable chain model,
//! turns evolution metadata into short display strings, and keeps both
//! behind bounded LRU caches with measured latency budgets.
//!
//! ## Pipeline
//!
//! ```text
//! get_display_model(species)
//!   -> EvolutionCache  (hit: done)      -> ChainResolver -> ChainStore
//!                                                        -> RequirementFormatter
//!   -> ImageCache per stage (hit: done) -> ImageDecoder
//!   -> PerformanceMonitor
//! ```
//!
//! ## Architectural Constraints
//!
//! - Single-threaded and synchronous: no async, no locking, no background work
//! - Caches are explicit objects with injected capacity, never globals
//! - Bad data degrades to a warning plus a best-effort model; only a failing
//!   store surfaces as an error
//! - Deterministic: BTreeMap ordering, lowest-id tie-breaks

// =============================================================================
// MODULES
// =============================================================================

pub mod cache;
pub mod catalog;
pub mod config;
pub mod display;
pub mod formats;
pub mod image;
pub mod instrumentation;
pub mod primitives;
pub mod requirement;
pub mod resolver;
pub mod storage;
pub mod store;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    ChainId, ChainRows, EdgeRow, EvodexError, EvodexWarning, EvolutionMethod, ImageVariant,
    IntegrityIssue, MissingData, Species, SpeciesId, SpeciesRow, WarningKind,
};

// =============================================================================
// RE-EXPORTS: Chain Engine
// =============================================================================

pub use cache::{CacheOutcome, CacheStats, EvolutionCache, ImageCache, Lookup};
pub use catalog::{Catalog, CatalogValidator};
pub use config::{Backend, EvodexConfig};
pub use display::{DisplayModel, EdgeModel, EvolutionService, StageModel};
pub use image::{DecodeError, ImageDecoder, ImageHandle, ImageKey};
pub use instrumentation::{Budgets, ChainShape, MonitorStats, PathKind, PerfSample, PerformanceMonitor};
pub use requirement::{Requirement, RequirementFormatter, RequirementIssue, format_requirement};
pub use resolver::{ChainEdge, ChainGraph, ChainResolver, ResolvedChain, Stage, StageEntry, build_chain};
pub use storage::RedbStore;
pub use store::{CatalogStats, ChainStore, MemoryStore};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{SnapshotHeader, catalog_from_bytes, catalog_to_bytes};
