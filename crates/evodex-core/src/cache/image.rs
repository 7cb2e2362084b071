//! Image reference cache: decoded thumbnails keyed by species and variant.
//!
//! This cache is application-wide. Other screens may insert into it or
//! evict from it directly; the display service only borrows it per request.

use super::bounded::{BoundedLru, CacheStats, Lookup};
use crate::image::{DecodeError, ImageDecoder, ImageHandle, ImageKey};
use crate::{ImageVariant, SpeciesId};

/// Bounded LRU of thumbnails in front of an [`ImageDecoder`].
#[derive(Debug)]
pub struct ImageCache<D> {
    decoder: D,
    entries: BoundedLru<ImageKey, ImageHandle>,
}

impl<D: ImageDecoder> ImageCache<D> {
    /// Create a cache holding at most `capacity` thumbnails (minimum 1).
    #[must_use]
    pub fn new(decoder: D, capacity: usize) -> Self {
        Self {
            decoder,
            entries: BoundedLru::new(capacity),
        }
    }

    /// Return the cached thumbnail, decoding it on a miss.
    ///
    /// Decode failures are returned to the caller and not cached, so a later
    /// request retries the decoder.
    pub fn get_or_load(
        &mut self,
        species: SpeciesId,
        variant: ImageVariant,
    ) -> Result<Lookup<ImageHandle>, DecodeError> {
        let key = ImageKey::new(species, variant);
        if let Some(handle) = self.entries.get(&key) {
            return Ok(Lookup::hit(handle.clone()));
        }

        let handle = self.decoder.decode(species, variant)?;
        self.entries.insert(key, handle.clone());
        Ok(Lookup::miss(handle))
    }

    /// File an already decoded thumbnail. Returns the evicted one, if any.
    pub fn insert(&mut self, handle: ImageHandle) -> Option<ImageHandle> {
        self.entries
            .insert(handle.key(), handle)
            .map(|(_, evicted)| evicted)
    }

    /// Drop one thumbnail.
    pub fn evict(&mut self, species: SpeciesId, variant: ImageVariant) -> Option<ImageHandle> {
        self.entries.remove(&ImageKey::new(species, variant))
    }

    /// Drop every thumbnail. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn contains(&self, species: SpeciesId, variant: ImageVariant) -> bool {
        self.entries.contains(&ImageKey::new(species, variant))
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

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.entries.stats().hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.entries.stats().misses
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.entries.stats()
    }
}

// =============================================================================
// TESTS
// =============================================================================
