//! # Snapshot Format
//!
//! Binary serialization of a [`Catalog`] for the file backend.
//!
//! Format: Header (5 bytes) + postcard-serialized catalog.
//! - 4 bytes: Magic ("EVDX")
//! - 1 byte: Version
//!
//! ## Validation order
//!
//! Size limits and the header are checked before the payload is decoded,
//! and the decoded catalog goes through [`CatalogValidator`] before it is
//! returned.

use crate::catalog::{Catalog, CatalogValidator};
use crate::{EvodexError, primitives};

/// Maximum accepted snapshot size.
///
/// A full catalog is a few tens of kilobytes; anything near this bound is
/// corrupt or hostile.
pub const MAX_SNAPSHOT_PAYLOAD_SIZE: usize = 16 * 1024 * 1024; // 16 MB

/// Header length in bytes.
const HEADER_LEN: usize = 5;

// =============================================================================
// FILE HEADER
// =============================================================================

/// The snapshot header precedes all catalog data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl SnapshotHeader {
    /// Create a header with the current format version.
    #[must_use]
    pub fn new() -> Self {
        Self {
            magic: *primitives::MAGIC_BYTES,
            version: primitives::FORMAT_VERSION,
        }
    }

    /// Validate magic bytes and version.
    pub fn validate(&self) -> Result<(), EvodexError> {
        if &self.magic != primitives::MAGIC_BYTES {
            return Err(EvodexError::DeserializationError(
                "Invalid magic bytes".to_string(),
            ));
        }
        if self.version != primitives::FORMAT_VERSION {
            return Err(EvodexError::DeserializationError(format!(
                "Unsupported version: {} (expected {})",
                self.version,
                primitives::FORMAT_VERSION
            )));
        }
        Ok(())
    }

    /// Write the header to bytes.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let [m0, m1, m2, m3] = self.magic;
        [m0, m1, m2, m3, self.version]
    }

    /// Read a header from the start of `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EvodexError> {
        match bytes {
            [m0, m1, m2, m3, version, ..] => Ok(Self {
                magic: [*m0, *m1, *m2, *m3],
                version: *version,
            }),
            _ => Err(EvodexError::DeserializationError(
                "Header too short".to_string(),
            )),
        }
    }
}

impl Default for SnapshotHeader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// SERIALIZATION FUNCTIONS
// =============================================================================

/// Serialize a catalog to bytes (header + payload). No file I/O.
pub fn catalog_to_bytes(catalog: &Catalog) -> Result<Vec<u8>, EvodexError> {
    let payload =
        postcard::to_stdvec(catalog).map_err(|e| EvodexError::SerializationError(e.to_string()))?;

    let mut result = Vec::with_capacity(HEADER_LEN + payload.len());
    result.extend_from_slice(&SnapshotHeader::new().to_bytes());
    result.extend_from_slice(&payload);
    Ok(result)
}

/// Deserialize and validate a catalog. No file I/O.
pub fn catalog_from_bytes(bytes: &[u8]) -> Result<Catalog, EvodexError> {
    if bytes.len() < HEADER_LEN {
        return Err(EvodexError::DeserializationError(format!(
            "Data too short: minimum {HEADER_LEN} bytes required"
        )));
    }
    if bytes.len() > MAX_SNAPSHOT_PAYLOAD_SIZE {
        return Err(EvodexError::DeserializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_SNAPSHOT_PAYLOAD_SIZE
        )));
    }

    let header = SnapshotHeader::from_bytes(bytes)?;
    header.validate()?;

    let payload = bytes.get(HEADER_LEN..).unwrap_or_default();
    let catalog: Catalog = postcard::from_bytes(payload).map_err(|e| {
        EvodexError::DeserializationError(format!("Failed to deserialize catalog: {e}"))
    })?;

    CatalogValidator::validate(&catalog)?;
    Ok(catalog)
}

// =============================================================================
// TESTS
// =============================================================================
