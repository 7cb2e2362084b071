//! # Image Collaborator
//!
//! The decode interface the image cache loads thumbnails through, and the
//! handle type it hands out.
//!
//! Handles are reference counted: cloning one out of the cache never copies
//! pixel data.

use crate::{ImageVariant, SpeciesId};
use std::rc::Rc;
use thiserror::Error;

/// Cache key of one thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageKey {
    pub species: SpeciesId,
    pub variant: ImageVariant,
}

impl ImageKey {
    #[must_use]
    pub const fn new(species: SpeciesId, variant: ImageVariant) -> Self {
        Self { species, variant }
    }
}

/// A decoded thumbnail, opaque to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageHandle {
    key: ImageKey,
    width: u32,
    height: u32,
    data: Rc<[u8]>,
}

impl ImageHandle {
    /// Wrap decoded bytes.
    #[must_use]
    pub fn new(key: ImageKey, width: u32, height: u32, data: impl Into<Rc<[u8]>>) -> Self {
        Self {
            key,
            width,
            height,
            data: data.into(),
        }
    }

    #[must_use]
    pub fn key(&self) -> ImageKey {
        self.key
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Check whether two handles share one buffer.
    #[must_use]
    pub fn same_buffer(&self, other: &ImageHandle) -> bool {
        Rc::ptr_eq(&self.data, &other.data)
    }
}

/// Why a thumbnail could not be produced.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// No asset exists for this species and variant.
    #[error("no image for {species} ({variant})")]
    NotFound {
        species: SpeciesId,
        variant: ImageVariant,
    },

    /// The asset exists but could not be read or decoded.
    #[error("decode failed: {0}")]
    Failed(String),
}

/// The image-decode collaborator. Calls block until the image is ready.
pub trait ImageDecoder {
    fn decode(&self, species: SpeciesId, variant: ImageVariant) -> Result<ImageHandle, DecodeError>;
}

impl<D: ImageDecoder + ?Sized> ImageDecoder for &D {
    fn decode(&self, species: SpeciesId, variant: ImageVariant) -> Result<ImageHandle, DecodeError> {
        (**self).decode(species, variant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_shares_buffer() {
        let key = ImageKey::new(SpeciesId(25), ImageVariant::Normal);
        let handle = ImageHandle::new(key, 64, 64, vec![1u8, 2, 3]);
        let copy = handle.clone();

        assert!(handle.same_buffer(&copy));
        assert_eq!(copy.data(), &[1, 2, 3]);
        assert_eq!(copy.key(), key);
    }

    #[test]
    fn not_found_message_names_species() {
        let err = DecodeError::NotFound {
            species: SpeciesId(7),
            variant: ImageVariant::Shiny,
        };
        assert_eq!(err.to_string(), "no image for #007 (shiny)");
    }
}
