//! # Engine Primitives
//!
//! Hardcoded runtime constants for the Evodex core.
//!
//! These values are compiled into the binary. Everything a deployment may
//! want to tune (cache capacities, budgets) has a default here and an
//! override in [`crate::config::EvodexConfig`].

// =============================================================================
// CATALOG BOUNDS
// =============================================================================

/// Lowest valid species id in the catalog.
pub const MIN_SPECIES_ID: u16 = 1;

/// Highest valid species id in the catalog.
pub const MAX_SPECIES_ID: u16 = 386;

/// Maximum byte length of a species display name.
pub const MAX_NAME_LENGTH: usize = 64;

/// Maximum byte length of a method, item name or trigger tag.
///
/// Longer values are rejected by the catalog validator.
pub const MAX_TAG_LENGTH: usize = 64;

/// Upper bound on species fetched for a single chain.
///
/// Real families have at most nine members. Catalogs with a larger chain are
/// rejected on import; a store holding one anyway keeps the requested
/// species and reports the rest as omitted.
pub const MAX_CHAIN_MEMBERS: usize = 32;

// =============================================================================
// REQUIREMENT TEXT
// =============================================================================

/// Default maximum displayed length of a requirement string, in characters.
///
/// Overrides the 20-character default of the display rules:
/// "Trade holding Metal Coat" (24) and "High Friendship (Night)" (23) must
/// render untruncated. A limit of 20 is still available through
/// `[formatter] max_chars`.
pub const MAX_REQUIREMENT_LENGTH: usize = 24;

/// Smallest limit a formatter accepts; anything lower cannot hold the ellipsis.
pub const MIN_REQUIREMENT_LENGTH: usize = 4;

/// Suffix appended to truncated requirement strings.
pub const ELLIPSIS: &str = "...";

/// Text shown for a method the formatter does not know.
pub const UNKNOWN_REQUIREMENT: &str = "Unknown";

// =============================================================================
// CACHE CAPACITIES
// =============================================================================

/// Default capacity of the evolution data cache (C₁).
///
/// Matches [`DEFAULT_IMAGE_CACHE_CAPACITY`] so both tiers share one memory budget.
pub const DEFAULT_CHAIN_CACHE_CAPACITY: usize = 50;

/// Default capacity of the application-wide image reference cache (C₂).
pub const DEFAULT_IMAGE_CACHE_CAPACITY: usize = 50;

// =============================================================================
// PERFORMANCE BUDGETS (milliseconds)
// =============================================================================

/// Cold-path budget for linear chains with at most [`LINEAR_BUDGET_MAX_STAGES`] stages.
pub const COLD_LINEAR_BUDGET_MS: u64 = 200;

/// Cold-path budget for branching chains and anything larger than the linear case.
pub const COLD_BRANCHING_BUDGET_MS: u64 = 250;

/// Warm-path budget, independent of chain shape.
pub const WARM_BUDGET_MS: u64 = 50;

/// Largest linear chain covered by the tighter cold budget.
pub const LINEAR_BUDGET_MAX_STAGES: usize = 3;

/// Largest branching family covered by the branching cold budget.
pub const BRANCHING_BUDGET_MAX_SPECIES: usize = 6;

// =============================================================================
// SNAPSHOT FORMAT
// =============================================================================

/// Magic bytes for the Evodex catalog snapshot header.
pub const MAGIC_BYTES: &[u8; 4] = b"EVDX";

/// Current snapshot format version.
///
/// Increment this when making breaking changes to the snapshot layout.
pub const FORMAT_VERSION: u8 = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_limit_leaves_room_for_text() {
        assert!(MIN_REQUIREMENT_LENGTH > ELLIPSIS.len());
        assert!(MAX_REQUIREMENT_LENGTH >= MIN_REQUIREMENT_LENGTH);
    }

    #[test]
    fn cache_tiers_share_budget() {
        assert_eq!(DEFAULT_CHAIN_CACHE_CAPACITY, DEFAULT_IMAGE_CACHE_CAPACITY);
    }

    #[test]
    fn magic_bytes_correct() {
        assert_eq!(MAGIC_BYTES, b"EVDX");
    }
}
