//! # Performance Instrumentation
//!
//! Classifies each display model request as cold or warm, picks the budget
//! that applies to the chain's shape, and logs a warning when the measured
//! time exceeds it.
//!
//! Purely observational: a slow request is never aborted or retried.
//! All arithmetic is on whole milliseconds and microseconds.

use crate::primitives::{
    BRANCHING_BUDGET_MAX_SPECIES, COLD_BRANCHING_BUDGET_MS, COLD_LINEAR_BUDGET_MS,
    LINEAR_BUDGET_MAX_STAGES, WARM_BUDGET_MS,
};
use crate::SpeciesId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Whether any cache missed while serving a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathKind {
    Cold,
    Warm,
}

impl PathKind {
    /// Cold if any lookup missed.
    #[must_use]
    pub fn from_misses(any_miss: bool) -> Self {
        if any_miss { Self::Cold } else { Self::Warm }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cold => "cold",
            Self::Warm => "warm",
        }
    }
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The parts of a chain that decide its cold budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainShape {
    pub stage_count: usize,
    pub is_branching: bool,
}

impl ChainShape {
    #[must_use]
    pub fn new(stage_count: usize, is_branching: bool) -> Self {
        Self {
            stage_count,
            is_branching,
        }
    }

    /// Short linear chain, the tightest cold budget.
    #[must_use]
    pub fn is_short_linear(&self) -> bool {
        !self.is_branching && self.stage_count <= LINEAR_BUDGET_MAX_STAGES
    }

    /// Branching chain small enough for the named branching budget.
    #[must_use]
    pub fn is_small_branching(&self) -> bool {
        self.is_branching && self.stage_count <= BRANCHING_BUDGET_MAX_SPECIES
    }
}

/// Latency budgets in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Budgets {
    pub cold_linear_ms: u64,
    pub cold_branching_ms: u64,
    pub warm_ms: u64,
}

impl Default for Budgets {
    fn default() -> Self {
        Self {
            cold_linear_ms: COLD_LINEAR_BUDGET_MS,
            cold_branching_ms: COLD_BRANCHING_BUDGET_MS,
            warm_ms: WARM_BUDGET_MS,
        }
    }
}

impl Budgets {
    /// Budget for one request.
    ///
    /// Cold chains that are neither short-linear nor small-branching fall
    /// back to the branching budget.
    #[must_use]
    pub fn for_request(&self, path: PathKind, shape: ChainShape) -> u64 {
        match path {
            PathKind::Warm => self.warm_ms,
            PathKind::Cold if shape.is_short_linear() => self.cold_linear_ms,
            PathKind::Cold => self.cold_branching_ms,
        }
    }
}

/// One measured request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerfSample {
    pub species: SpeciesId,
    pub path: PathKind,
    pub elapsed: Duration,
    pub budget_ms: u64,
}

impl PerfSample {
    /// Elapsed time in whole milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).unwrap_or(u64::MAX)
    }

    /// Elapsed time in whole microseconds.
    #[must_use]
    pub fn elapsed_us(&self) -> u64 {
        u64::try_from(self.elapsed.as_micros()).unwrap_or(u64::MAX)
    }

    /// Over budget once the elapsed time strictly exceeds it.
    #[must_use]
    pub fn over_budget(&self) -> bool {
        self.elapsed > Duration::from_millis(self.budget_ms)
    }
}

/// Cumulative counters kept by a [`PerformanceMonitor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonitorStats {
    pub cold_requests: u64,
    pub warm_requests: u64,
    pub over_budget: u64,
    pub total_us: u64,
    pub slowest_us: u64,
    pub slowest_species: Option<SpeciesId>,
}

impl MonitorStats {
    /// Mean request time in microseconds.
    #[must_use]
    pub fn mean_us(&self) -> u64 {
        let requests = self.cold_requests.saturating_add(self.warm_requests);
        if requests == 0 {
            return 0;
        }
        self.total_us / requests
    }
}

/// Records request timings against [`Budgets`].
#[derive(Debug, Clone, Default)]
pub struct PerformanceMonitor {
    budgets: Budgets,
    stats: MonitorStats,
}

impl PerformanceMonitor {
    #[must_use]
    pub fn new(budgets: Budgets) -> Self {
        Self {
            budgets,
            stats: MonitorStats::default(),
        }
    }

    #[must_use]
    pub fn budgets(&self) -> &Budgets {
        &self.budgets
    }

    #[must_use]
    pub fn stats(&self) -> MonitorStats {
        self.stats
    }

    /// Reset the counters.
    pub fn reset(&mut self) {
        self.stats = MonitorStats::default();
    }

    /// Record one request; warns if it ran over budget.
    pub fn record(
        &mut self,
        species: SpeciesId,
        path: PathKind,
        shape: ChainShape,
        elapsed: Duration,
    ) -> PerfSample {
        let sample = PerfSample {
            species,
            path,
            elapsed,
            budget_ms: self.budgets.for_request(path, shape),
        };

        match path {
            PathKind::Cold => self.stats.cold_requests = self.stats.cold_requests.saturating_add(1),
            PathKind::Warm => self.stats.warm_requests = self.stats.warm_requests.saturating_add(1),
        }
        let elapsed_us = sample.elapsed_us();
        self.stats.total_us = self.stats.total_us.saturating_add(elapsed_us);
        if self.stats.slowest_species.is_none() || elapsed_us > self.stats.slowest_us {
            self.stats.slowest_us = elapsed_us;
            self.stats.slowest_species = Some(species);
        }

        if sample.over_budget() {
            self.stats.over_budget = self.stats.over_budget.saturating_add(1);
            tracing::warn!(
                species = species.value(),
                path = path.as_str(),
                stages = shape.stage_count,
                branching = shape.is_branching,
                elapsed_ms = sample.elapsed_ms(),
                budget_ms = sample.budget_ms,
                "display model for {} took {}ms, {} budget is {}ms",
                species,
                sample.elapsed_ms(),
                path,
                sample.budget_ms
            );
        }

        sample
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const LINEAR: ChainShape = ChainShape {
        stage_count: 3,
        is_branching: false,
    };
    const EEVEE: ChainShape = ChainShape {
        stage_count: 6,
        is_branching: true,
    };

    #[test]
    fn budget_selection_by_path_and_shape() {
        let budgets = Budgets::default();
        assert_eq!(budgets.for_request(PathKind::Cold, LINEAR), 200);
        assert_eq!(budgets.for_request(PathKind::Cold, EEVEE), 250);
        assert_eq!(budgets.for_request(PathKind::Warm, LINEAR), 50);
        assert_eq!(budgets.for_request(PathKind::Warm, EEVEE), 50);
    }

    #[test]
    fn unnamed_cold_shapes_use_branching_budget() {
        let budgets = Budgets::default();
        assert_eq!(budgets.for_request(PathKind::Cold, ChainShape::new(4, false)), 250);
        assert_eq!(budgets.for_request(PathKind::Cold, ChainShape::new(9, true)), 250);
    }

    #[test]
    fn exactly_on_budget_is_within() {
        let mut monitor = PerformanceMonitor::default();
        let sample = monitor.record(SpeciesId(1), PathKind::Warm, LINEAR, Duration::from_millis(50));
        assert!(!sample.over_budget());
        assert_eq!(monitor.stats().over_budget, 0);
    }

    #[test]
    fn over_budget_is_counted() {
        let mut monitor = PerformanceMonitor::default();
        let sample = monitor.record(
            SpeciesId(133),
            PathKind::Cold,
            EEVEE,
            Duration::from_millis(251),
        );
        assert!(sample.over_budget());
        assert_eq!(sample.elapsed_ms(), 251);
        assert_eq!(monitor.stats().over_budget, 1);
    }

    #[test]
    fn cumulative_stats() {
        let mut monitor = PerformanceMonitor::new(Budgets {
            warm_ms: 1,
            ..Budgets::default()
        });
        monitor.record(SpeciesId(1), PathKind::Cold, LINEAR, Duration::from_micros(900));
        monitor.record(SpeciesId(2), PathKind::Warm, LINEAR, Duration::from_micros(100));
        monitor.record(SpeciesId(3), PathKind::Warm, LINEAR, Duration::from_micros(2_000));

        let stats = monitor.stats();
        assert_eq!((stats.cold_requests, stats.warm_requests), (1, 2));
        assert_eq!(stats.over_budget, 1);
        assert_eq!(stats.slowest_us, 2_000);
        assert_eq!(stats.slowest_species, Some(SpeciesId(3)));
        assert_eq!(stats.mean_us(), 1_000);

        monitor.reset();
        assert_eq!(monitor.stats(), MonitorStats::default());
    }

    #[test]
    fn path_from_misses() {
        assert_eq!(PathKind::from_misses(true), PathKind::Cold);
        assert_eq!(PathKind::from_misses(false), PathKind::Warm);
    }
}
