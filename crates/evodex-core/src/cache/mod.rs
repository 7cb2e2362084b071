//! # Caches
//!
//! Two explicit, capacity-injected LRU tiers. Neither is a global: the
//! composition root owns both and lends them out.
//!
//! - [`EvolutionCache`] resolved chains by species, owned by the display service
//! - [`ImageCache`] decoded thumbnails, shared with any other UI surface

mod bounded;
mod evolution;
mod image;

pub use bounded::{BoundedLru, CacheOutcome, CacheStats, Lookup};
pub use evolution::EvolutionCache;
pub use image::ImageCache;
