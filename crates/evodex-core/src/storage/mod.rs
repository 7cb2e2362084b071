//! # Storage
//!
//! Persistent [`ChainStore`](crate::store::ChainStore) backends.

pub mod redb_store;

pub use redb_store::RedbStore;
