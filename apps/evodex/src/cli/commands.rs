//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::sprites::SpriteDirDecoder;
use evodex_core::{
    Backend, CacheStats, Catalog, CatalogStats, ChainRows, ChainStore, DisplayModel,
    EvodexConfig, EvodexError, EvolutionService, ImageCache, MemoryStore, MonitorStats,
    PerfSample, RedbStore, SpeciesId, catalog_from_bytes, catalog_to_bytes,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum JSON catalog size for import (64 MB).
const MAX_IMPORT_FILE_SIZE: u64 = 64 * 1024 * 1024;

/// Maximum snapshot size read by the file backend (16 MB).
const MAX_SNAPSHOT_FILE_SIZE: u64 = 16 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), EvodexError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| EvodexError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(EvodexError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Validate an input path.
///
/// Canonicalizes the path to resolve symlinks and "..", and ensures it
/// names an existing regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, EvodexError> {
    let canonical = path.canonicalize().map_err(|e| {
        EvodexError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(EvodexError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Validate an output path: the parent directory must exist.
fn validate_output_path(path: &Path) -> Result<PathBuf, EvodexError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        EvodexError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(EvodexError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| EvodexError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn print_json(value: &impl Serialize) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_default()
    );
}

// =============================================================================
// CATALOG STORE
// =============================================================================

/// The configured backend, opened.
#[derive(Debug)]
pub enum CatalogStore {
    Redb(RedbStore),
    File(MemoryStore),
}

impl CatalogStore {
    /// Read the whole catalog back.
    pub fn to_catalog(&self) -> Result<Catalog, EvodexError> {
        match self {
            Self::Redb(store) => store.to_catalog(),
            Self::File(store) => Ok(store.to_catalog()),
        }
    }
}

impl ChainStore for CatalogStore {
    fn query_chain(&self, species: SpeciesId) -> Result<ChainRows, EvodexError> {
        match self {
            Self::Redb(store) => store.query_chain(species),
            Self::File(store) => store.query_chain(species),
        }
    }

    fn stats(&self) -> Result<CatalogStats, EvodexError> {
        match self {
            Self::Redb(store) => store.stats(),
            Self::File(store) => store.stats(),
        }
    }
}

/// Open the catalog named by the configuration.
///
/// A missing snapshot file is an empty catalog; redb creates its file.
pub fn open_store(config: &EvodexConfig) -> Result<CatalogStore, EvodexError> {
    let db_path = &config.catalog.database;
    match config.catalog.backend {
        Backend::Redb => RedbStore::open(db_path).map(CatalogStore::Redb),
        Backend::File => {
            if !db_path.exists() {
                return Ok(CatalogStore::File(MemoryStore::new()));
            }
            validate_file_size(db_path, MAX_SNAPSHOT_FILE_SIZE)?;
            let data = std::fs::read(db_path)
                .map_err(|e| EvodexError::IoError(format!("Read snapshot: {}", e)))?;
            let catalog = catalog_from_bytes(&data)?;
            MemoryStore::from_catalog(&catalog).map(CatalogStore::File)
        }
    }
}

fn write_snapshot(catalog: &Catalog, path: &Path) -> Result<usize, EvodexError> {
    let data = catalog_to_bytes(catalog)?;
    std::fs::write(path, &data)
        .map_err(|e| EvodexError::IoError(format!("Write snapshot: {}", e)))?;
    Ok(data.len())
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize a new empty catalog database.
pub fn cmd_init(config: &EvodexConfig, force: bool) -> Result<(), EvodexError> {
    let db_path = &config.catalog.database;
    if db_path.exists() {
        if !force {
            return Err(EvodexError::IoError(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(db_path)
            .map_err(|e| EvodexError::IoError(format!("Remove database: {}", e)))?;
    }

    match config.catalog.backend {
        Backend::Redb => {
            let _store = RedbStore::open(db_path)?;
            println!("Initialized new redb database at {:?}", db_path);
        }
        Backend::File => {
            write_snapshot(&Catalog::default(), db_path)?;
            println!("Initialized new snapshot file at {:?}", db_path);
        }
    }
    Ok(())
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Parse and validate a JSON catalog file.
pub fn read_catalog_json(path: &Path) -> Result<Catalog, EvodexError> {
    let validated_path = validate_file_path(path)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| EvodexError::IoError(format!("Read file: {}", e)))?;
    serde_json::from_slice(&data).map_err(|e| EvodexError::DeserializationError(e.to_string()))
}

/// Import a catalog, replacing whatever the database held.
///
/// Validation happens before the first write; a rejected catalog leaves
/// the database untouched.
pub fn import_catalog(config: &EvodexConfig, input: &Path) -> Result<CatalogStats, EvodexError> {
    let catalog = read_catalog_json(input)?;
    let db_path = &config.catalog.database;

    let stats = match config.catalog.backend {
        Backend::Redb => RedbStore::open(db_path)?.replace_catalog(&catalog)?,
        Backend::File => {
            let store = MemoryStore::from_catalog(&catalog)?;
            write_snapshot(&store.to_catalog(), db_path)?;
            store.stats()?
        }
    };

    tracing::info!(
        species = stats.species,
        chains = stats.chains,
        edges = stats.edges,
        "Imported catalog into {:?}",
        db_path
    );
    Ok(stats)
}

/// Import a catalog from a JSON file.
pub fn cmd_import(config: &EvodexConfig, input: &Path) -> Result<(), EvodexError> {
    let stats = import_catalog(config, input)?;
    println!(
        "Imported catalog: {} species, {} chains, {} evolutions",
        stats.species, stats.chains, stats.edges
    );
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Export the catalog.
pub fn cmd_export(config: &EvodexConfig, output: &Path, format: &str) -> Result<(), EvodexError> {
    let validated_output = validate_output_path(output)?;
    let catalog = open_store(config)?.to_catalog()?;

    let written = match format {
        "json" => {
            let data = serde_json::to_vec_pretty(&catalog)
                .map_err(|e| EvodexError::SerializationError(e.to_string()))?;
            std::fs::write(&validated_output, &data)
                .map_err(|e| EvodexError::IoError(format!("Write file: {}", e)))?;
            data.len()
        }
        "snapshot" => write_snapshot(&catalog, &validated_output)?,
        _ => {
            return Err(EvodexError::ConfigError(format!(
                "Unknown format: {}. Use: json, snapshot",
                format
            )));
        }
    };

    println!("Exported {} bytes to {:?}", written, validated_output);
    Ok(())
}

// =============================================================================
// SHOW COMMAND
// =============================================================================

/// A display model and how long it took.
#[derive(Debug, Clone)]
pub struct ShowReport {
    pub model: DisplayModel,
    /// `None` when the store was unavailable.
    pub sample: Option<PerfSample>,
}

/// Build the display model of one species, falling back to the
/// "unavailable" model when the catalog cannot be reached.
pub fn show_species(config: &EvodexConfig, species: SpeciesId) -> Result<ShowReport, EvodexError> {
    let store = match open_store(config) {
        Ok(store) => store,
        Err(EvodexError::StoreUnavailable(reason) | EvodexError::IoError(reason)) => {
            tracing::warn!(species = species.value(), "Catalog unavailable: {}", reason);
            return Ok(ShowReport {
                model: DisplayModel::unavailable(species),
                sample: None,
            });
        }
        Err(e) => return Err(e),
    };

    let mut images = ImageCache::new(
        SpriteDirDecoder::from_config(&config.images),
        config.cache.image_capacity,
    );
    let mut service = EvolutionService::from_config(store, config);

    match service.get_display_model(species, &mut images) {
        Ok(model) => Ok(ShowReport {
            model,
            sample: service.last_sample(),
        }),
        Err(e) => {
            tracing::warn!(species = species.value(), "Evolution data unavailable: {}", e);
            Ok(ShowReport {
                model: DisplayModel::unavailable(species),
                sample: None,
            })
        }
    }
}

/// JSON rendering of a [`ShowReport`].
pub fn report_json(report: &ShowReport) -> serde_json::Value {
    let model = &report.model;
    serde_json::json!({
        "species_id": model.species_id.value(),
        "available": model.is_available(),
        "chain_id": model.chain_id.map(|id| id.0),
        "is_branching": model.is_branching,
        "stages": model.stages.iter().map(|stage| serde_json::json!({
            "species_id": stage.species_id.value(),
            "name": stage.name,
            "stage_number": stage.stage_number,
            "is_current": stage.is_current,
            "image": stage.image.as_ref().map(|image| serde_json::json!({
                "width": image.width(),
                "height": image.height(),
                "bytes": image.data().len()
            }))
        })).collect::<Vec<_>>(),
        "edges": model.edges.iter().map(|edge| serde_json::json!({
            "from": edge.from.value(),
            "to": edge.to.value(),
            "requirement": edge.requirement_text
        })).collect::<Vec<_>>(),
        "warnings": model.warnings.iter().map(|warning| serde_json::json!({
            "kind": format!("{:?}", warning.kind()),
            "message": warning.to_string()
        })).collect::<Vec<_>>(),
        "timing": report.sample.map(|sample| serde_json::json!({
            "path": sample.path,
            "elapsed_us": sample.elapsed_us(),
            "budget_ms": sample.budget_ms,
            "over_budget": sample.over_budget()
        }))
    })
}

/// Print the display model of a species.
pub fn cmd_show(
    config: &EvodexConfig,
    species: u16,
    json_mode: bool,
    verbose: bool,
) -> Result<(), EvodexError> {
    let report = show_species(config, SpeciesId(species))?;

    if json_mode {
        print_json(&report_json(&report));
        return Ok(());
    }

    let model = &report.model;
    if !model.is_available() {
        println!("Evolution data unavailable for {}", model.species_id);
        return Ok(());
    }

    let title = format!("Evolution Chain for {}", model.species_id);
    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
    if let Some(chain_id) = model.chain_id {
        println!("Chain:  {}", chain_id.0);
    }
    println!(
        "Shape:  {}",
        if model.is_branching { "branching" } else { "linear" }
    );
    println!();

    println!("Stages:");
    for stage in &model.stages {
        let marker = if stage.is_current { '*' } else { ' ' };
        let image = match &stage.image {
            Some(image) => format!("{}x{}", image.width(), image.height()),
            None => "no image".to_string(),
        };
        println!(
            "  [{}] {} {} {:<12} {}",
            stage.stage_number, marker, stage.species_id, stage.name, image
        );
    }

    if !model.edges.is_empty() {
        println!();
        println!("Evolutions:");
        for edge in &model.edges {
            println!("  {} -> {}  {}", edge.from, edge.to, edge.requirement_text);
        }
    }

    if !model.warnings.is_empty() {
        println!();
        println!("Warnings:");
        for warning in &model.warnings {
            println!("  - {}", warning);
        }
    }

    if verbose && let Some(sample) = report.sample {
        println!();
        println!(
            "Timing: {} path, {} us (budget {} ms{})",
            sample.path,
            sample.elapsed_us(),
            sample.budget_ms,
            if sample.over_budget() { ", over" } else { "" }
        );
    }

    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show catalog status.
pub fn cmd_status(config: &EvodexConfig, json_mode: bool) -> Result<(), EvodexError> {
    let stats = open_store(config)?.stats()?;

    if json_mode {
        let output = serde_json::json!({
            "database": config.catalog.database.to_string_lossy(),
            "backend": config.catalog.backend.as_str(),
            "species": stats.species,
            "chains": stats.chains,
            "evolutions": stats.edges,
            "chain_cache_capacity": config.cache.chain_capacity,
            "image_cache_capacity": config.cache.image_capacity,
            "budgets": config.budgets
        });
        print_json(&output);
        return Ok(());
    }

    println!("Evodex Catalog Status");
    println!("=====================");
    println!("Database: {:?}", config.catalog.database);
    println!("Backend:  {}", config.catalog.backend);
    println!();
    println!("Species:    {}", stats.species);
    println!("Chains:     {}", stats.chains);
    println!("Evolutions: {}", stats.edges);
    println!();
    println!(
        "Caches:     {} chains, {} images",
        config.cache.chain_capacity, config.cache.image_capacity
    );
    println!(
        "Budgets:    cold {} / {} ms, warm {} ms",
        config.budgets.cold_linear_ms, config.budgets.cold_branching_ms, config.budgets.warm_ms
    );

    Ok(())
}

// =============================================================================
// PROFILE COMMAND
// =============================================================================

/// Outcome of a profiling run.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub requests: u64,
    pub monitor: MonitorStats,
    pub chain_cache: CacheStats,
    pub image_cache: CacheStats,
}

/// Request every species `rounds` times through one service.
///
/// Store failures abort the run; a profile over an unreachable catalog
/// measures nothing.
pub fn profile_species(
    config: &EvodexConfig,
    species: &[u16],
    rounds: u32,
) -> Result<ProfileReport, EvodexError> {
    let store = open_store(config)?;
    let mut images = ImageCache::new(
        SpriteDirDecoder::from_config(&config.images),
        config.cache.image_capacity,
    );
    let mut service = EvolutionService::from_config(store, config);

    let mut requests = 0u64;
    for round in 0..rounds {
        for &id in species {
            service.get_display_model(SpeciesId(id), &mut images)?;
            requests += 1;
        }
        tracing::debug!(round, "Profile round complete");
    }

    Ok(ProfileReport {
        requests,
        monitor: service.monitor().stats(),
        chain_cache: service.chains().stats(),
        image_cache: images.stats(),
    })
}

/// Profile repeated requests.
pub fn cmd_profile(
    config: &EvodexConfig,
    species: &[u16],
    rounds: u32,
    json_mode: bool,
) -> Result<(), EvodexError> {
    let report = profile_species(config, species, rounds)?;

    if json_mode {
        print_json(&report);
        return Ok(());
    }

    let monitor = &report.monitor;
    println!("Evodex Profile");
    println!("==============");
    println!("Requests:      {}", report.requests);
    println!("Cold / warm:   {} / {}", monitor.cold_requests, monitor.warm_requests);
    println!("Over budget:   {}", monitor.over_budget);
    println!("Mean:          {} us", monitor.mean_us());
    match monitor.slowest_species {
        Some(slowest) => println!("Slowest:       {} us ({})", monitor.slowest_us, slowest),
        None => println!("Slowest:       -"),
    }
    println!();
    for (name, stats) in [("Chain cache", report.chain_cache), ("Image cache", report.image_cache)] {
        println!(
            "{}:   {}/{} entries, {} hits, {} misses, {} evictions ({}% hit)",
            name,
            stats.len,
            stats.capacity,
            stats.hits,
            stats.misses,
            stats.evictions,
            stats.hit_percent()
        );
    }

    Ok(())
}
