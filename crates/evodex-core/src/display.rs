//! # Display Model
//!
//! The single entry point the renderer talks to.
//!
//! [`EvolutionService::get_display_model`] runs the whole pipeline for one
//! species: chain cache, resolver on a miss, one image lookup per stage,
//! then timing. The renderer never sees the resolver, the formatter or
//! either cache.

use crate::cache::{EvolutionCache, ImageCache};
use crate::config::EvodexConfig;
use crate::image::{ImageDecoder, ImageHandle};
use crate::instrumentation::{ChainShape, PathKind, PerfSample, PerformanceMonitor};
use crate::resolver::ChainResolver;
use crate::store::ChainStore;
use crate::{ChainId, EvodexError, EvodexWarning, ImageVariant, SpeciesId};
use std::time::Instant;

// =============================================================================
// MODEL
// =============================================================================

/// One stage as the renderer draws it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageModel {
    pub species_id: SpeciesId,
    pub name: String,
    pub stage_number: u32,
    pub is_current: bool,
    /// `None` when no thumbnail could be produced.
    pub image: Option<ImageHandle>,
}

/// One arrow between two stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeModel {
    pub from: SpeciesId,
    pub to: SpeciesId,
    pub requirement_text: String,
}

/// Everything needed to draw the evolution panel of one species.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayModel {
    pub species_id: SpeciesId,
    pub chain_id: Option<ChainId>,
    pub stages: Vec<StageModel>,
    pub edges: Vec<EdgeModel>,
    pub is_branching: bool,
    /// Chain warnings plus image warnings of this request.
    pub warnings: Vec<EvodexWarning>,
}

impl DisplayModel {
    /// The "evolution data unavailable" model shown after a store outage.
    #[must_use]
    pub fn unavailable(species_id: SpeciesId) -> Self {
        Self {
            species_id,
            chain_id: None,
            stages: Vec::new(),
            edges: Vec::new(),
            is_branching: false,
            warnings: Vec::new(),
        }
    }

    /// False only for [`DisplayModel::unavailable`].
    #[must_use]
    pub fn is_available(&self) -> bool {
        !self.stages.is_empty()
    }

    /// The stage flagged as current, if the requested species was staged.
    #[must_use]
    pub fn current_stage(&self) -> Option<&StageModel> {
        self.stages.iter().find(|stage| stage.is_current)
    }
}

// =============================================================================
// SERVICE
// =============================================================================

/// Owns the chain cache and the monitor; borrows the shared image cache.
#[derive(Debug)]
pub struct EvolutionService<S> {
    chains: EvolutionCache<S>,
    monitor: PerformanceMonitor,
    variant: ImageVariant,
    last_sample: Option<PerfSample>,
}

impl<S: ChainStore> EvolutionService<S> {
    #[must_use]
    pub fn new(chains: EvolutionCache<S>, monitor: PerformanceMonitor, variant: ImageVariant) -> Self {
        Self {
            chains,
            monitor,
            variant,
            last_sample: None,
        }
    }

    /// Build a service over `store` with capacity, text limit, budgets and
    /// variant taken from `config`.
    #[must_use]
    pub fn from_config(store: S, config: &EvodexConfig) -> Self {
        let resolver = ChainResolver::with_formatter(store, config.formatter.formatter());
        Self::new(
            EvolutionCache::new(resolver, config.cache.chain_capacity),
            PerformanceMonitor::new(config.budgets),
            config.images.variant,
        )
    }

    /// Assemble the display model of `species`.
    ///
    /// Bad data and missing images degrade the model and add warnings. Only
    /// a store failure is returned as an error; callers then show
    /// [`DisplayModel::unavailable`].
    pub fn get_display_model<D: ImageDecoder>(
        &mut self,
        species: SpeciesId,
        images: &mut ImageCache<D>,
    ) -> Result<DisplayModel, EvodexError> {
        let started = Instant::now();

        let lookup = self.chains.get_or_resolve(species)?;
        let mut any_miss = !lookup.is_hit();
        let chain = lookup.into_value();
        let mut warnings = chain.warnings().to_vec();

        let mut stages = Vec::with_capacity(chain.stage_count());
        for stage in chain.stages() {
            let image = match images.get_or_load(stage.species, self.variant) {
                Ok(found) => {
                    any_miss |= !found.is_hit();
                    Some(found.into_value())
                }
                Err(err) => {
                    any_miss = true;
                    let warning = EvodexWarning::ImageUnavailable {
                        species: stage.species,
                        variant: self.variant,
                        reason: err.to_string(),
                    };
                    warning.emit();
                    warnings.push(warning);
                    None
                }
            };
            stages.push(StageModel {
                species_id: stage.species,
                name: stage.name.to_string(),
                stage_number: stage.number,
                is_current: stage.is_current,
                image,
            });
        }

        let edges = chain
            .edges()
            .iter()
            .map(|edge| EdgeModel {
                from: edge.from,
                to: edge.to,
                requirement_text: edge.requirement.clone(),
            })
            .collect();

        let model = DisplayModel {
            species_id: species,
            chain_id: chain.chain_id(),
            stages,
            edges,
            is_branching: chain.is_branching(),
            warnings,
        };

        let sample = self.monitor.record(
            species,
            PathKind::from_misses(any_miss),
            ChainShape::new(chain.stage_count(), chain.is_branching()),
            started.elapsed(),
        );
        self.last_sample = Some(sample);

        Ok(model)
    }

    /// Timing of the most recent successful request.
    #[must_use]
    pub fn last_sample(&self) -> Option<PerfSample> {
        self.last_sample
    }

    #[must_use]
    pub fn chains(&self) -> &EvolutionCache<S> {
        &self.chains
    }

    /// Mutable access, for invalidation after a catalog reload.
    pub fn chains_mut(&mut self) -> &mut EvolutionCache<S> {
        &mut self.chains
    }

    #[must_use]
    pub fn monitor(&self) -> &PerformanceMonitor {
        &self.monitor
    }

    #[must_use]
    pub fn variant(&self) -> ImageVariant {
        self.variant
    }

    pub fn set_variant(&mut self, variant: ImageVariant) {
        self.variant = variant;
    }
}

// =============================================================================
// TESTS
// =============================================================================
