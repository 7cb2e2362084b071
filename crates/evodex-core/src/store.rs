//! # Chain Store
//!
//! The raw-query contract the resolver depends on, and an in-memory
//! implementation of it.
//!
//! A store answers one question: given a species, which species share its
//! chain and which edges leave them. Implementations look rows up by typed
//! key only; ids are never spliced into query text.

use crate::primitives::MAX_CHAIN_MEMBERS;
use crate::{ChainId, ChainRows, EdgeRow, EvodexError, Species, SpeciesId, SpeciesRow};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// CHAINSTORE TRAIT
// =============================================================================

/// Row counts of a loaded catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    pub species: usize,
    pub chains: usize,
    pub edges: usize,
}

/// The raw-query collaborator.
///
/// Every error returned here is treated as a collaborator outage and
/// propagates out of the display model request.
pub trait ChainStore {
    /// Fetch all species sharing the chain of `species`, and every edge
    /// leaving one of them.
    ///
    /// Returns empty rows (not an error) when the species is unknown.
    fn query_chain(&self, species: SpeciesId) -> Result<ChainRows, EvodexError>;

    /// Count the rows of the catalog.
    fn stats(&self) -> Result<CatalogStats, EvodexError>;
}

/// Collects chain members under `MAX_CHAIN_MEMBERS`.
///
/// Members must be offered in id order. The requested species is always
/// kept; the remaining slots go to the lowest other ids.
#[derive(Debug)]
pub(crate) struct MemberCap {
    requested: SpeciesId,
    kept: Vec<SpeciesId>,
    others: usize,
    omitted: usize,
}

impl MemberCap {
    pub(crate) fn new(requested: SpeciesId) -> Self {
        Self {
            requested,
            kept: Vec::new(),
            others: 0,
            omitted: 0,
        }
    }

    pub(crate) fn offer(&mut self, member: SpeciesId) {
        if member == self.requested {
            self.kept.push(member);
        } else if self.others < MAX_CHAIN_MEMBERS.saturating_sub(1) {
            self.others += 1;
            self.kept.push(member);
        } else {
            self.omitted += 1;
        }
    }

    /// Kept ids in id order, and how many were left out.
    pub(crate) fn finish(self) -> (Vec<SpeciesId>, usize) {
        (self.kept, self.omitted)
    }
}

impl<S: ChainStore + ?Sized> ChainStore for &S {
    fn query_chain(&self, species: SpeciesId) -> Result<ChainRows, EvodexError> {
        (**self).query_chain(species)
    }

    fn stats(&self) -> Result<CatalogStats, EvodexError> {
        (**self).stats()
    }
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// In-memory catalog.
///
/// Uses `BTreeMap` throughout so query results come back in id order.
/// Edge rows are stored as given, duplicates included; cleaning them up is
/// the resolver's job.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    species: BTreeMap<SpeciesId, Species>,
    members: BTreeMap<ChainId, BTreeSet<SpeciesId>>,
    edges: BTreeMap<SpeciesId, Vec<EdgeRow>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a species.
    pub fn insert_species(&mut self, species: Species) {
        if let Some(previous) = self.species.get(&species.id)
            && let Some(members) = self.members.get_mut(&previous.chain_id)
        {
            members.remove(&species.id);
        }
        self.members
            .entry(species.chain_id)
            .or_default()
            .insert(species.id);
        self.species.insert(species.id, species);
    }

    /// Append an edge row.
    pub fn insert_edge(&mut self, edge: EdgeRow) {
        self.edges.entry(edge.from).or_default().push(edge);
    }

    /// Look up a species by id.
    #[must_use]
    pub fn species(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(&id)
    }

    /// All species in id order.
    pub fn all_species(&self) -> impl Iterator<Item = &Species> {
        self.species.values()
    }

    /// All edge rows, ordered by source species.
    pub fn all_edges(&self) -> impl Iterator<Item = &EdgeRow> {
        self.edges.values().flatten()
    }
}

impl ChainStore for MemoryStore {
    fn query_chain(&self, species: SpeciesId) -> Result<ChainRows, EvodexError> {
        let Some(record) = self.species.get(&species) else {
            return Ok(ChainRows::empty());
        };

        let mut cap = MemberCap::new(species);
        for &member in self.members.get(&record.chain_id).into_iter().flatten() {
            cap.offer(member);
        }
        let (member_ids, omitted_members) = cap.finish();

        let species_rows = member_ids
            .iter()
            .filter_map(|id| self.species.get(id))
            .map(|s| SpeciesRow {
                id: s.id,
                name: s.name.clone(),
            })
            .collect();

        let edge_rows = member_ids
            .iter()
            .filter_map(|id| self.edges.get(id))
            .flatten()
            .cloned()
            .collect();

        Ok(ChainRows {
            chain_id: Some(record.chain_id),
            species: species_rows,
            edges: edge_rows,
            omitted_members,
        })
    }

    fn stats(&self) -> Result<CatalogStats, EvodexError> {
        Ok(CatalogStats {
            species: self.species.len(),
            chains: self.members.values().filter(|m| !m.is_empty()).count(),
            edges: self.edges.values().map(Vec::len).sum(),
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn pikachu_line() -> MemoryStore {
        let mut store = MemoryStore::new();
        store.insert_species(Species::new(SpeciesId(172), "Pichu", ChainId(10)));
        store.insert_species(Species::new(SpeciesId(25), "Pikachu", ChainId(10)));
        store.insert_species(Species::new(SpeciesId(26), "Raichu", ChainId(10)));
        store.insert_species(Species::new(SpeciesId(1), "Bulbasaur", ChainId(1)));
        store.insert_edge(EdgeRow::new(SpeciesId(172), SpeciesId(25), Some("happiness")));
        store.insert_edge(
            EdgeRow::new(SpeciesId(25), SpeciesId(26), Some("stone")).with_item("Thunder Stone"),
        );
        store
    }

    #[test]
    fn query_returns_chain_members_in_id_order() {
        let store = pikachu_line();
        let rows = store.query_chain(SpeciesId(26)).expect("query");

        assert_eq!(rows.chain_id, Some(ChainId(10)));
        let ids: Vec<_> = rows.species.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![SpeciesId(25), SpeciesId(26), SpeciesId(172)]);
        assert_eq!(rows.edges.len(), 2);
    }

    #[test]
    fn query_excludes_other_chains() {
        let store = pikachu_line();
        let rows = store.query_chain(SpeciesId(1)).expect("query");
        assert_eq!(rows.species.len(), 1);
        assert!(rows.edges.is_empty());
    }

    #[test]
    fn unknown_species_yields_empty_rows() {
        let store = pikachu_line();
        let rows = store.query_chain(SpeciesId(300)).expect("query");
        assert_eq!(rows, ChainRows::empty());
    }

    fn long_line(length: u16) -> MemoryStore {
        let mut store = MemoryStore::new();
        for id in 1..=length {
            store.insert_species(Species::new(SpeciesId(id), format!("Stage{id}"), ChainId(7)));
        }
        for id in 1..length {
            store.insert_edge(EdgeRow::new(SpeciesId(id), SpeciesId(id + 1), Some("level")).with_level(5));
        }
        store
    }

    #[test]
    fn oversized_chain_keeps_requested_member() {
        let store = long_line(40);
        let rows = store.query_chain(SpeciesId(40)).expect("query");

        assert_eq!(rows.species.len(), MAX_CHAIN_MEMBERS);
        assert_eq!(rows.omitted_members, 40 - MAX_CHAIN_MEMBERS);
        assert!(rows.contains_species(SpeciesId(40)));
        assert!(rows.contains_species(SpeciesId(1)));
        assert!(!rows.contains_species(SpeciesId(39)));
    }

    #[test]
    fn chain_at_cap_is_not_truncated() {
        let store = long_line(32);
        let rows = store.query_chain(SpeciesId(32)).expect("query");
        assert_eq!(rows.species.len(), 32);
        assert_eq!(rows.omitted_members, 0);
    }

    #[test]
    fn reinserting_species_moves_chain_membership() {
        let mut store = pikachu_line();
        store.insert_species(Species::new(SpeciesId(1), "Bulbasaur", ChainId(10)));

        let stats = store.stats().expect("stats");
        assert_eq!(stats.species, 4);
        assert_eq!(stats.chains, 1);
        assert_eq!(stats.edges, 2);
    }

    #[test]
    fn store_usable_through_reference() {
        let store = pikachu_line();
        let by_ref: &MemoryStore = &store;
        let rows = ChainStore::query_chain(&by_ref, SpeciesId(25)).expect("query");
        assert_eq!(rows.species.len(), 3);
    }
}
