//! # Formats
//!
//! Byte-level encodings of the catalog. File I/O stays in the app layer.

pub mod persistence;

pub use persistence::{
    MAX_SNAPSHOT_PAYLOAD_SIZE, SnapshotHeader, catalog_from_bytes, catalog_to_bytes,
};
