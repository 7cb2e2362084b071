//! Evolution data cache: resolved chains keyed by species id.
//!
//! A miss resolves the chain once and files a view for every member of it,
//! so stepping through a family after the first request never reaches the
//! store again. The requested species goes in last and ends up
//! most-recently-used.

use super::bounded::{BoundedLru, CacheStats, Lookup};
use crate::resolver::{ChainResolver, ResolvedChain};
use crate::store::ChainStore;
use crate::{EvodexError, SpeciesId};
use std::rc::Rc;

/// Bounded LRU of resolved chains in front of a [`ChainResolver`].
#[derive(Debug)]
pub struct EvolutionCache<S> {
    resolver: ChainResolver<S>,
    entries: BoundedLru<SpeciesId, ResolvedChain>,
}

impl<S: ChainStore> EvolutionCache<S> {
    /// Create a cache holding at most `capacity` chains (minimum 1).
    #[must_use]
    pub fn new(resolver: ChainResolver<S>, capacity: usize) -> Self {
        Self {
            resolver,
            entries: BoundedLru::new(capacity),
        }
    }

    /// Return the cached chain of `species`, resolving it on a miss.
    ///
    /// A hit never touches the resolver. On a miss, chain-mates not already
    /// cached are filed too; entries already present keep their position.
    pub fn get_or_resolve(&mut self, species: SpeciesId) -> Result<Lookup<ResolvedChain>, EvodexError> {
        if let Some(chain) = self.entries.get(&species) {
            return Ok(Lookup::hit(chain.clone()));
        }

        let graph = self.resolver.resolve_graph(species)?;
        for member in graph.members() {
            if member != species && !self.entries.contains(&member) {
                self.entries
                    .insert(member, ResolvedChain::new(Rc::clone(&graph), member));
            }
        }

        let chain = ResolvedChain::new(graph, species);
        self.entries.insert(species, chain.clone());
        Ok(Lookup::miss(chain))
    }

    /// Drop every cached chain.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn contains(&self, species: SpeciesId) -> bool {
        self.entries.contains(&species)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Cached species from most- to least-recently-used.
    pub fn species_by_recency(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        self.entries.keys_by_recency().copied()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }

    #[must_use]
    pub fn resolver(&self) -> &ChainResolver<S> {
        &self.resolver
    }
}

// =============================================================================
// TESTS
// =============================================================================
