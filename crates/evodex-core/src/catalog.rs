//! # Catalog Module
//!
//! The static catalog and its validation protocol.
//!
//! - Validate the whole catalog before any store is touched
//! - Reject out-of-range ids, empty or oversized names and tags
//! - Reject duplicate species ids
//! - Reject chains with more than `MAX_CHAIN_MEMBERS` species
//! - No repair: structural oddities inside a chain (cycles, extra roots)
//!   are left for the resolver to correct and report

use crate::primitives::{
    MAX_CHAIN_MEMBERS, MAX_NAME_LENGTH, MAX_SPECIES_ID, MAX_TAG_LENGTH, MIN_SPECIES_ID,
};
use crate::store::MemoryStore;
use crate::{ChainId, EdgeRow, EvodexError, Species, SpeciesId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The full species and evolution table, as imported and persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub species: Vec<Species>,
    #[serde(default)]
    pub evolutions: Vec<EdgeRow>,
}

impl Catalog {
    /// Species count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.species.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Distinct chain count.
    #[must_use]
    pub fn chain_count(&self) -> usize {
        self.species
            .iter()
            .map(|species| species.chain_id)
            .collect::<BTreeSet<_>>()
            .len()
    }
}

/// Validates catalogs before ingestion.
pub struct CatalogValidator;

impl CatalogValidator {
    /// Validate one species.
    ///
    /// A species is valid if:
    /// - Its id lies within the catalog range
    /// - Its name is non-empty after trimming and within the length limit
    pub fn validate_species(species: &Species) -> Result<(), EvodexError> {
        Self::check_id(species.id, "species")?;

        let name = species.name.trim();
        if name.is_empty() {
            return Err(EvodexError::InvalidCatalog(format!(
                "species {} has an empty name",
                species.id
            )));
        }
        if species.name.len() > MAX_NAME_LENGTH {
            return Err(EvodexError::InvalidCatalog(format!(
                "species {} name exceeds {MAX_NAME_LENGTH} bytes",
                species.id
            )));
        }
        Ok(())
    }

    /// Validate one edge: both endpoints in range, every tag within bounds.
    pub fn validate_edge(edge: &EdgeRow) -> Result<(), EvodexError> {
        Self::check_id(edge.from, "edge source")?;
        Self::check_id(edge.to, "edge target")?;

        for (field, value) in [
            ("method", edge.method.as_deref()),
            ("item_name", edge.item_name.as_deref()),
            ("trigger", edge.trigger.as_deref()),
        ] {
            if let Some(value) = value
                && value.len() > MAX_TAG_LENGTH
            {
                return Err(EvodexError::InvalidCatalog(format!(
                    "edge {} -> {} {field} exceeds {MAX_TAG_LENGTH} bytes",
                    edge.from, edge.to
                )));
            }
        }
        Ok(())
    }

    /// Validate a whole catalog. Nothing is loaded unless this passes.
    pub fn validate(catalog: &Catalog) -> Result<(), EvodexError> {
        let mut seen = BTreeSet::new();
        let mut chain_sizes: BTreeMap<ChainId, usize> = BTreeMap::new();
        for species in &catalog.species {
            Self::validate_species(species)?;
            if !seen.insert(species.id) {
                return Err(EvodexError::InvalidCatalog(format!(
                    "species {} listed twice",
                    species.id
                )));
            }
            let size = chain_sizes.entry(species.chain_id).or_default();
            *size += 1;
            if *size > MAX_CHAIN_MEMBERS {
                return Err(EvodexError::InvalidCatalog(format!(
                    "chain {} has more than {MAX_CHAIN_MEMBERS} species",
                    species.chain_id
                )));
            }
        }
        for edge in &catalog.evolutions {
            Self::validate_edge(edge)?;
        }
        Ok(())
    }

    fn check_id(id: SpeciesId, role: &str) -> Result<(), EvodexError> {
        if id.is_in_catalog() {
            return Ok(());
        }
        Err(EvodexError::InvalidCatalog(format!(
            "{role} id {} outside {MIN_SPECIES_ID}..={MAX_SPECIES_ID}",
            id.value()
        )))
    }
}

impl MemoryStore {
    /// Build a store from a validated catalog.
    pub fn from_catalog(catalog: &Catalog) -> Result<Self, EvodexError> {
        let mut store = Self::new();
        store.load_catalog(catalog)?;
        Ok(store)
    }

    /// Validate and add every row of `catalog`. The store is untouched on error.
    pub fn load_catalog(&mut self, catalog: &Catalog) -> Result<(), EvodexError> {
        CatalogValidator::validate(catalog)?;
        for species in &catalog.species {
            self.insert_species(species.clone());
        }
        for edge in &catalog.evolutions {
            self.insert_edge(edge.clone());
        }
        Ok(())
    }

    /// Export the store contents as a catalog.
    #[must_use]
    pub fn to_catalog(&self) -> Catalog {
        Catalog {
            species: self.all_species().cloned().collect(),
            evolutions: self.all_edges().cloned().collect(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
