//! # redb-backed Chain Store
//!
//! A disk-backed catalog using the redb embedded database.
//!
//! Every lookup is a typed key or key-range read; ids never pass through
//! query text. One chain query is one read transaction:
//! - `species` point lookup for the requested id
//! - `chain_members` range scan over `(chain_id, *)`
//! - `evolutions` range scan over `(member, *)` per member
//!
//! Catalog replacement happens in a single write transaction, so readers
//! see either the old catalog or the new one.

use crate::catalog::{Catalog, CatalogValidator};
use crate::store::{CatalogStats, ChainStore, MemberCap};
use crate::{ChainId, ChainRows, EdgeRow, EvodexError, Species, SpeciesId, SpeciesRow};
use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use std::collections::BTreeSet;
use std::path::Path;

/// Table for species: SpeciesId(u16) -> serialized Species bytes
const SPECIES: TableDefinition<u16, &[u8]> = TableDefinition::new("species");

/// Table for chain membership: (chain_id, species_id) -> ()
const CHAIN_MEMBERS: TableDefinition<(u32, u16), ()> = TableDefinition::new("chain_members");

/// Table for evolutions: (from_id, to_id) -> serialized EdgeRow bytes
const EVOLUTIONS: TableDefinition<(u16, u16), &[u8]> = TableDefinition::new("evolutions");

fn io_error(e: impl std::fmt::Display) -> EvodexError {
    EvodexError::IoError(e.to_string())
}

fn unavailable(e: impl std::fmt::Display) -> EvodexError {
    EvodexError::StoreUnavailable(e.to_string())
}

/// A catalog stored in redb.
pub struct RedbStore {
    db: Database,
}

impl std::fmt::Debug for RedbStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedbStore").finish_non_exhaustive()
    }
}

impl RedbStore {
    /// Open or create a catalog database at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EvodexError> {
        let db = Database::create(path.as_ref()).map_err(io_error)?;

        // Initialize tables if they don't exist
        {
            let write_txn = db.begin_write().map_err(io_error)?;
            let _ = write_txn.open_table(SPECIES).map_err(io_error)?;
            let _ = write_txn.open_table(CHAIN_MEMBERS).map_err(io_error)?;
            let _ = write_txn.open_table(EVOLUTIONS).map_err(io_error)?;
            write_txn.commit().map_err(io_error)?;
        }

        Ok(Self { db })
    }

    /// Replace the stored catalog in one ACID transaction.
    ///
    /// The catalog is validated before the transaction opens. Duplicate
    /// `(from, to)` edges keep the first row.
    pub fn replace_catalog(&mut self, catalog: &Catalog) -> Result<CatalogStats, EvodexError> {
        CatalogValidator::validate(catalog)?;

        let write_txn = self.db.begin_write().map_err(io_error)?;
        write_txn.delete_table(SPECIES).map_err(io_error)?;
        write_txn.delete_table(CHAIN_MEMBERS).map_err(io_error)?;
        write_txn.delete_table(EVOLUTIONS).map_err(io_error)?;

        let mut stats = CatalogStats::default();
        {
            let mut species_table = write_txn.open_table(SPECIES).map_err(io_error)?;
            let mut members_table = write_txn.open_table(CHAIN_MEMBERS).map_err(io_error)?;
            let mut edges_table = write_txn.open_table(EVOLUTIONS).map_err(io_error)?;

            let mut chains = BTreeSet::new();
            for species in &catalog.species {
                let bytes = postcard::to_allocvec(species)
                    .map_err(|e| EvodexError::SerializationError(e.to_string()))?;
                species_table
                    .insert(species.id.0, bytes.as_slice())
                    .map_err(io_error)?;
                members_table
                    .insert((species.chain_id.0, species.id.0), ())
                    .map_err(io_error)?;
                chains.insert(species.chain_id);
            }

            for edge in &catalog.evolutions {
                let key = (edge.from.0, edge.to.0);
                if edges_table.get(key).map_err(io_error)?.is_some() {
                    continue;
                }
                let bytes = postcard::to_allocvec(edge)
                    .map_err(|e| EvodexError::SerializationError(e.to_string()))?;
                edges_table.insert(key, bytes.as_slice()).map_err(io_error)?;
                stats.edges += 1;
            }

            stats.species = catalog.species.len();
            stats.chains = chains.len();
        }

        write_txn.commit().map_err(io_error)?;
        Ok(stats)
    }

    /// Read the whole catalog back, in key order.
    pub fn to_catalog(&self) -> Result<Catalog, EvodexError> {
        let read_txn = self.db.begin_read().map_err(io_error)?;
        let species_table = read_txn.open_table(SPECIES).map_err(io_error)?;
        let edges_table = read_txn.open_table(EVOLUTIONS).map_err(io_error)?;

        let mut catalog = Catalog::default();
        for entry in species_table.iter().map_err(io_error)? {
            let (_, value) = entry.map_err(io_error)?;
            catalog.species.push(decode_species(value.value())?);
        }
        for entry in edges_table.iter().map_err(io_error)? {
            let (_, value) = entry.map_err(io_error)?;
            catalog.evolutions.push(decode_edge(value.value())?);
        }
        Ok(catalog)
    }

    /// Compact the database file.
    pub fn compact(&mut self) -> Result<(), EvodexError> {
        self.db.compact().map_err(io_error)?;
        Ok(())
    }
}

fn decode_species(bytes: &[u8]) -> Result<Species, EvodexError> {
    postcard::from_bytes(bytes).map_err(|e| EvodexError::DeserializationError(e.to_string()))
}

fn decode_edge(bytes: &[u8]) -> Result<EdgeRow, EvodexError> {
    postcard::from_bytes(bytes).map_err(|e| EvodexError::DeserializationError(e.to_string()))
}

impl ChainStore for RedbStore {
    fn query_chain(&self, species: SpeciesId) -> Result<ChainRows, EvodexError> {
        let read_txn = self.db.begin_read().map_err(unavailable)?;
        let species_table = read_txn.open_table(SPECIES).map_err(unavailable)?;

        let Some(record) = species_table
            .get(species.0)
            .map_err(unavailable)?
            .map(|guard| decode_species(guard.value()))
            .transpose()?
        else {
            return Ok(ChainRows::empty());
        };

        let members_table = read_txn.open_table(CHAIN_MEMBERS).map_err(unavailable)?;
        let chain = record.chain_id.0;
        let mut cap = MemberCap::new(species);
        for entry in members_table
            .range((chain, 0u16)..=(chain, u16::MAX))
            .map_err(unavailable)?
        {
            let (key, _) = entry.map_err(unavailable)?;
            let (_, member) = key.value();
            cap.offer(SpeciesId(member));
        }
        let (member_ids, omitted_members) = cap.finish();

        let mut species_rows = Vec::with_capacity(member_ids.len());
        for &member in &member_ids {
            if let Some(guard) = species_table.get(member.0).map_err(unavailable)? {
                let stored = decode_species(guard.value())?;
                species_rows.push(SpeciesRow {
                    id: stored.id,
                    name: stored.name,
                });
            }
        }

        let edges_table = read_txn.open_table(EVOLUTIONS).map_err(unavailable)?;
        let mut edge_rows = Vec::new();
        for &SpeciesId(member) in &member_ids {
            for entry in edges_table
                .range((member, 0u16)..=(member, u16::MAX))
                .map_err(unavailable)?
            {
                let (_, value) = entry.map_err(unavailable)?;
                edge_rows.push(decode_edge(value.value())?);
            }
        }

        Ok(ChainRows {
            chain_id: Some(ChainId(chain)),
            species: species_rows,
            edges: edge_rows,
            omitted_members,
        })
    }

    fn stats(&self) -> Result<CatalogStats, EvodexError> {
        let read_txn = self.db.begin_read().map_err(unavailable)?;
        let species_table = read_txn.open_table(SPECIES).map_err(unavailable)?;
        let members_table = read_txn.open_table(CHAIN_MEMBERS).map_err(unavailable)?;
        let edges_table = read_txn.open_table(EVOLUTIONS).map_err(unavailable)?;

        let mut chains = BTreeSet::new();
        for entry in members_table.iter().map_err(unavailable)? {
            let (key, _) = entry.map_err(unavailable)?;
            chains.insert(key.value().0);
        }

        Ok(CatalogStats {
            species: species_table.len().map_err(unavailable)? as usize,
            chains: chains.len(),
            edges: edges_table.len().map_err(unavailable)? as usize,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
