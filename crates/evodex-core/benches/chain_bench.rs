//! # Chain Benchmarks
//!
//! Performance benchmarks for chain resolution and the display pipeline.
//!
//! Run with: `cargo bench -p evodex-core`

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use evodex_core::{
    ChainId, ChainRows, DecodeError, EdgeRow, EvodexConfig, EvolutionMethod, EvolutionService,
    ImageCache, ImageDecoder, ImageHandle, ImageKey, ImageVariant, MemoryStore,
    RequirementFormatter, Species, SpeciesId, SpeciesRow, build_chain,
};
use std::hint::black_box;

/// Rows for a linear chain of `size` species.
fn linear_rows(size: u16) -> ChainRows {
    ChainRows {
        chain_id: Some(ChainId(1)),
        species: (1..=size)
            .map(|id| SpeciesRow {
                id: SpeciesId(id),
                name: format!("Stage{id}"),
            })
            .collect(),
        edges: (1..size)
            .map(|id| EdgeRow::new(SpeciesId(id), SpeciesId(id + 1), Some("level")).with_level(u32::from(id) * 10))
            .collect(),
        omitted_members: 0,
    }
}

/// Rows for one root with `size - 1` direct children.
fn star_rows(size: u16) -> ChainRows {
    ChainRows {
        chain_id: Some(ChainId(2)),
        species: (1..=size)
            .map(|id| SpeciesRow {
                id: SpeciesId(id),
                name: format!("Branch{id}"),
            })
            .collect(),
        edges: (2..=size)
            .map(|id| EdgeRow::new(SpeciesId(1), SpeciesId(id), Some("stone")).with_item("Moon Stone"))
            .collect(),
        omitted_members: 0,
    }
}

struct NullDecoder;

impl ImageDecoder for NullDecoder {
    fn decode(&self, species: SpeciesId, variant: ImageVariant) -> Result<ImageHandle, DecodeError> {
        Ok(ImageHandle::new(ImageKey::new(species, variant), 1, 1, vec![0u8]))
    }
}

/// Catalog of `chains` three-stage chains.
fn catalog_store(chains: u16) -> MemoryStore {
    let mut store = MemoryStore::new();
    for chain in 0..chains {
        let base = chain * 3 + 1;
        for offset in 0..3 {
            store.insert_species(Species::new(
                SpeciesId(base + offset),
                format!("Mon{}", base + offset),
                ChainId(u32::from(chain)),
            ));
        }
        store.insert_edge(EdgeRow::new(SpeciesId(base), SpeciesId(base + 1), Some("level")).with_level(16));
        store.insert_edge(EdgeRow::new(SpeciesId(base + 1), SpeciesId(base + 2), Some("level")).with_level(36));
    }
    store
}

// =============================================================================
// BENCHMARKS
// =============================================================================

fn bench_build_chain(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_chain");
    let formatter = RequirementFormatter::default();

    for size in [3u16, 6, 9].iter() {
        let linear = linear_rows(*size);
        group.bench_with_input(BenchmarkId::new("linear", size), size, |b, &size| {
            b.iter(|| black_box(build_chain(SpeciesId(size), &linear, &formatter)));
        });

        let star = star_rows(*size);
        group.bench_with_input(BenchmarkId::new("star", size), size, |b, _| {
            b.iter(|| black_box(build_chain(SpeciesId(1), &star, &formatter)));
        });
    }

    group.finish();
}

fn bench_format(c: &mut Criterion) {
    let formatter = RequirementFormatter::default();
    let method = EvolutionMethod::TradeItem;

    c.bench_function("format_trade_item", |b| {
        b.iter(|| black_box(formatter.format(&method, None, Some("Dragon Scale"), None)));
    });
}

fn bench_display_model(c: &mut Criterion) {
    let mut group = c.benchmark_group("display_model");

    group.bench_function("cold", |b| {
        b.iter(|| {
            let mut images = ImageCache::new(NullDecoder, 50);
            let mut service =
                EvolutionService::from_config(catalog_store(10), &EvodexConfig::default());
            black_box(service.get_display_model(SpeciesId(14), &mut images))
        });
    });

    group.bench_function("warm", |b| {
        let mut images = ImageCache::new(NullDecoder, 50);
        let mut service = EvolutionService::from_config(catalog_store(10), &EvodexConfig::default());
        let _ = service.get_display_model(SpeciesId(14), &mut images);
        b.iter(|| black_box(service.get_display_model(SpeciesId(14), &mut images)));
    });

    group.finish();
}

criterion_group!(benches, bench_build_chain, bench_format, bench_display_model);
criterion_main!(benches);
