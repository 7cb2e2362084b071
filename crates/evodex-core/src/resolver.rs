//! # Chain Resolver
//!
//! Builds a validated, acyclic evolution chain from raw store rows.
//!
//! The chain is kept as flat vectors over integer ids: stages in
//! breadth-first order, edges in discovery order. Nothing points at
//! anything, so a resolved chain is cheap to share between cache entries.
//!
//! Resolution never fails on bad data. Zero or several roots, cycles,
//! dangling or duplicate edges and unreachable species are corrected
//! deterministically and reported as one `DataIntegrity` warning per chain.
//! Only a failing [`ChainStore`] produces an error.

use crate::requirement::RequirementFormatter;
use crate::store::ChainStore;
use crate::{
    ChainId, ChainRows, EdgeRow, EvodexError, EvodexWarning, IntegrityIssue, MissingData,
    SpeciesId,
};
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::rc::Rc;

/// Display name used when the store has no row for a species.
pub const UNKNOWN_SPECIES_NAME: &str = "Unknown";

// =============================================================================
// CHAIN GRAPH
// =============================================================================

/// A species placed in the chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageEntry {
    pub species: SpeciesId,
    pub name: String,
    /// Depth in the chain, root = 1.
    pub stage: u32,
}

/// An accepted edge with its display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainEdge {
    pub from: SpeciesId,
    pub to: SpeciesId,
    pub from_stage: u32,
    pub requirement: String,
}

/// The species-independent result of one resolution.
///
/// Every member of the chain shares one `ChainGraph`; only the "current"
/// marker differs between their [`ResolvedChain`] views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainGraph {
    chain_id: Option<ChainId>,
    root: SpeciesId,
    stages: Vec<StageEntry>,
    edges: Vec<ChainEdge>,
    is_branching: bool,
    warnings: Vec<EvodexWarning>,
}

impl ChainGraph {
    /// The chain identifier, `None` for a degenerate chain.
    #[must_use]
    pub fn chain_id(&self) -> Option<ChainId> {
        self.chain_id
    }

    /// The root species (stage 1).
    #[must_use]
    pub fn root(&self) -> SpeciesId {
        self.root
    }

    /// Stages in breadth-first order.
    #[must_use]
    pub fn stages(&self) -> &[StageEntry] {
        &self.stages
    }

    /// Accepted edges in discovery order.
    #[must_use]
    pub fn edges(&self) -> &[ChainEdge] {
        &self.edges
    }

    /// Whether some species has two or more outgoing edges.
    #[must_use]
    pub fn is_branching(&self) -> bool {
        self.is_branching
    }

    /// Warnings raised while building this chain.
    #[must_use]
    pub fn warnings(&self) -> &[EvodexWarning] {
        &self.warnings
    }

    /// Stage number of a member species.
    #[must_use]
    pub fn stage_of(&self, species: SpeciesId) -> Option<u32> {
        self.stages
            .iter()
            .find(|entry| entry.species == species)
            .map(|entry| entry.stage)
    }

    /// Member species in breadth-first order.
    pub fn members(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        self.stages.iter().map(|entry| entry.species)
    }

    /// Number of staged species.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Always false for a chain produced by [`build_chain`].
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

// =============================================================================
// RESOLVED CHAIN (per-species view)
// =============================================================================

/// One stage as seen from the requested species.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage<'a> {
    pub species: SpeciesId,
    pub name: &'a str,
    pub number: u32,
    pub is_current: bool,
}

/// A chain viewed from one requested species. Read-only and cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChain {
    graph: Rc<ChainGraph>,
    current: SpeciesId,
}

impl ResolvedChain {
    /// Wrap a shared chain graph for `current`.
    #[must_use]
    pub fn new(graph: Rc<ChainGraph>, current: SpeciesId) -> Self {
        Self { graph, current }
    }

    /// The requested species.
    #[must_use]
    pub fn current(&self) -> SpeciesId {
        self.current
    }

    /// The shared graph behind this view.
    #[must_use]
    pub fn graph(&self) -> &Rc<ChainGraph> {
        &self.graph
    }

    #[must_use]
    pub fn chain_id(&self) -> Option<ChainId> {
        self.graph.chain_id
    }

    #[must_use]
    pub fn root(&self) -> SpeciesId {
        self.graph.root
    }

    #[must_use]
    pub fn is_branching(&self) -> bool {
        self.graph.is_branching
    }

    #[must_use]
    pub fn edges(&self) -> &[ChainEdge] {
        &self.graph.edges
    }

    #[must_use]
    pub fn warnings(&self) -> &[EvodexWarning] {
        &self.graph.warnings
    }

    /// Stages with the current marker applied.
    pub fn stages(&self) -> impl Iterator<Item = Stage<'_>> + '_ {
        self.graph.stages.iter().map(move |entry| Stage {
            species: entry.species,
            name: &entry.name,
            number: entry.stage,
            is_current: entry.species == self.current,
        })
    }

    /// Stage number of the requested species, if it was staged.
    #[must_use]
    pub fn current_stage(&self) -> Option<u32> {
        self.graph.stage_of(self.current)
    }

    /// Number of staged species.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.graph.len()
    }

    /// Check whether two views were built from the same resolution.
    #[must_use]
    pub fn shares_graph_with(&self, other: &ResolvedChain) -> bool {
        Rc::ptr_eq(&self.graph, &other.graph)
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Resolves chains through a [`ChainStore`].
#[derive(Debug, Clone)]
pub struct ChainResolver<S> {
    store: S,
    formatter: RequirementFormatter,
}

impl<S: ChainStore> ChainResolver<S> {
    /// Create a resolver with the default requirement formatter.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self::with_formatter(store, RequirementFormatter::default())
    }

    /// Create a resolver with a custom requirement formatter.
    #[must_use]
    pub fn with_formatter(store: S, formatter: RequirementFormatter) -> Self {
        Self { store, formatter }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Resolve the chain of `species`, viewed from `species`.
    ///
    /// Queries the store exactly once.
    pub fn resolve(&self, species: SpeciesId) -> Result<ResolvedChain, EvodexError> {
        let graph = self.resolve_graph(species)?;
        Ok(ResolvedChain::new(graph, species))
    }

    /// Resolve the shared chain graph of `species`.
    pub fn resolve_graph(&self, species: SpeciesId) -> Result<Rc<ChainGraph>, EvodexError> {
        let rows = self.store.query_chain(species)?;
        Ok(Rc::new(build_chain(species, &rows, &self.formatter)))
    }
}

/// Build a chain graph from already fetched rows.
///
/// Pure apart from logging: every warning attached to the result has also
/// been written to the logging sink once.
#[must_use]
pub fn build_chain(
    requested: SpeciesId,
    rows: &ChainRows,
    formatter: &RequirementFormatter,
) -> ChainGraph {
    if !rows.contains_species(requested) {
        return degenerate_chain(requested, rows);
    }

    let mut issues = Vec::new();
    if rows.omitted_members > 0 {
        issues.push(IntegrityIssue::ChainTruncated {
            kept: rows.species.len(),
            omitted: rows.omitted_members,
        });
    }

    // Member names, first row wins.
    let mut names: BTreeMap<SpeciesId, &str> = BTreeMap::new();
    for row in &rows.species {
        names.entry(row.id).or_insert(row.name.as_str());
    }

    // Accepted edges keyed by (from, to) so children come out in id order.
    let mut accepted: BTreeMap<(SpeciesId, SpeciesId), &EdgeRow> = BTreeMap::new();
    for edge in &rows.edges {
        if !names.contains_key(&edge.from) || !names.contains_key(&edge.to) {
            issues.push(IntegrityIssue::DanglingEdge {
                from: edge.from,
                to: edge.to,
            });
            continue;
        }
        if accepted.contains_key(&(edge.from, edge.to)) {
            issues.push(IntegrityIssue::DuplicateEdge {
                from: edge.from,
                to: edge.to,
            });
            continue;
        }
        accepted.insert((edge.from, edge.to), edge);
    }

    let mut children: BTreeMap<SpeciesId, Vec<(SpeciesId, &EdgeRow)>> = BTreeMap::new();
    for (&(from, to), &edge) in &accepted {
        children.entry(from).or_default().push((to, edge));
    }

    let root = choose_root(requested, &names, &children, &mut issues);

    // Iterative BFS; a species is staged the first time it is discovered.
    let mut stage_of: BTreeMap<SpeciesId, u32> = BTreeMap::new();
    let mut queue = VecDeque::new();
    let mut stages = Vec::with_capacity(names.len());
    let mut edges = Vec::with_capacity(accepted.len());
    let mut edge_warnings = Vec::new();

    stage_of.insert(root, 1);
    queue.push_back((root, 1u32));

    while let Some((current, stage)) = queue.pop_front() {
        stages.push(StageEntry {
            species: current,
            name: names
                .get(&current)
                .map_or(UNKNOWN_SPECIES_NAME, |name| *name)
                .to_string(),
            stage,
        });

        for &(child, edge) in children.get(&current).into_iter().flatten() {
            if stage_of.contains_key(&child) {
                issues.push(IntegrityIssue::RevisitSkipped {
                    from: current,
                    to: child,
                });
                continue;
            }
            let child_stage = stage.saturating_add(1);
            stage_of.insert(child, child_stage);
            queue.push_back((child, child_stage));

            let requirement = formatter.format(
                &edge.parsed_method(),
                edge.minimum_level,
                edge.item_name.as_deref(),
                edge.trigger.as_deref(),
            );
            if let Some(issue) = requirement.issue {
                edge_warnings.push(issue.into_warning(Some((current, child))));
            }
            edges.push(ChainEdge {
                from: current,
                to: child,
                from_stage: stage,
                requirement: requirement.text,
            });
        }
    }

    for &species in names.keys() {
        if !stage_of.contains_key(&species) {
            issues.push(IntegrityIssue::UnreachableSpecies { species });
        }
    }

    let mut out_degree: BTreeMap<SpeciesId, usize> = BTreeMap::new();
    for edge in &edges {
        *out_degree.entry(edge.from).or_default() += 1;
    }
    let is_branching = out_degree.values().any(|&degree| degree >= 2);

    let mut warnings = Vec::with_capacity(edge_warnings.len().saturating_add(1));
    if !issues.is_empty() {
        warnings.push(EvodexWarning::DataIntegrity {
            chain_id: rows.chain_id,
            issues,
        });
    }
    warnings.extend(edge_warnings);
    for warning in &warnings {
        warning.emit();
    }

    ChainGraph {
        chain_id: rows.chain_id,
        root,
        stages,
        edges,
        is_branching,
        warnings,
    }
}

/// Pick the lowest species with no incoming edge that reaches `requested`.
///
/// When no such species exists the lowest id that reaches `requested` is
/// used; `requested` itself always qualifies.
fn choose_root(
    requested: SpeciesId,
    names: &BTreeMap<SpeciesId, &str>,
    children: &BTreeMap<SpeciesId, Vec<(SpeciesId, &EdgeRow)>>,
    issues: &mut Vec<IntegrityIssue>,
) -> SpeciesId {
    let targets: BTreeSet<SpeciesId> = children
        .values()
        .flatten()
        .map(|&(to, _)| to)
        .collect();
    let candidates: Vec<SpeciesId> = names
        .keys()
        .copied()
        .filter(|id| !targets.contains(id))
        .collect();

    let reaching = candidates
        .iter()
        .copied()
        .find(|&candidate| reaches(candidate, requested, children));

    match reaching {
        Some(chosen) => {
            if candidates.len() > 1 {
                issues.push(IntegrityIssue::MultipleRoots {
                    candidates,
                    chosen,
                });
            }
            chosen
        }
        None => {
            let chosen = names
                .keys()
                .copied()
                .find(|&id| reaches(id, requested, children))
                .unwrap_or(requested);
            issues.push(IntegrityIssue::NoRoot { chosen });
            chosen
        }
    }
}

/// Whether `target` is `start` or one of its descendants.
fn reaches(
    start: SpeciesId,
    target: SpeciesId,
    children: &BTreeMap<SpeciesId, Vec<(SpeciesId, &EdgeRow)>>,
) -> bool {
    let mut seen = BTreeSet::from([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        if current == target {
            return true;
        }
        for &(child, _) in children.get(&current).into_iter().flatten() {
            if seen.insert(child) {
                queue.push_back(child);
            }
        }
    }
    false
}

/// One-stage chain for a species the store has no rows for.
fn degenerate_chain(requested: SpeciesId, rows: &ChainRows) -> ChainGraph {
    let warning = EvodexWarning::MissingData(MissingData::NoChainRows { species: requested });
    warning.emit();

    ChainGraph {
        chain_id: None,
        root: requested,
        stages: vec![StageEntry {
            species: requested,
            name: rows
                .species
                .iter()
                .find(|row| row.id == requested)
                .map_or_else(|| UNKNOWN_SPECIES_NAME.to_string(), |row| row.name.clone()),
            stage: 1,
        }],
        edges: Vec::new(),
        is_branching: false,
        warnings: vec![warning],
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::{Species, SpeciesRow, WarningKind};

    fn rows(chain: u32, species: &[(u16, &str)], edges: Vec<EdgeRow>) -> ChainRows {
        ChainRows {
            chain_id: Some(ChainId(chain)),
            species: species
                .iter()
                .map(|&(id, name)| SpeciesRow {
                    id: SpeciesId(id),
                    name: name.to_string(),
                })
                .collect(),
            edges,
            omitted_members: 0,
        }
    }

    fn build(requested: u16, rows: &ChainRows) -> ChainGraph {
        build_chain(SpeciesId(requested), rows, &RequirementFormatter::default())
    }

    fn integrity_issues(graph: &ChainGraph) -> Vec<IntegrityIssue> {
        graph
            .warnings()
            .iter()
            .filter_map(|w| match w {
                EvodexWarning::DataIntegrity { issues, .. } => Some(issues.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    fn count_kind(graph: &ChainGraph, kind: WarningKind) -> usize {
        graph.warnings().iter().filter(|w| w.kind() == kind).count()
    }

    #[test]
    fn linear_chain_stages_and_edges() {
        let rows = rows(
            1,
            &[(1, "A"), (2, "B"), (3, "C")],
            vec![
                EdgeRow::new(SpeciesId(1), SpeciesId(2), Some("level")).with_level(16),
                EdgeRow::new(SpeciesId(2), SpeciesId(3), Some("stone")).with_item("Thunder Stone"),
            ],
        );
        let chain = ResolvedChain::new(Rc::new(build(2, &rows)), SpeciesId(2));

        let stages: Vec<_> = chain
            .stages()
            .map(|s| (s.species.value(), s.number, s.is_current))
            .collect();
        assert_eq!(stages, vec![(1, 1, false), (2, 2, true), (3, 3, false)]);

        let edges: Vec<_> = chain
            .edges()
            .iter()
            .map(|e| (e.from.value(), e.to.value(), e.from_stage, e.requirement.as_str()))
            .collect();
        assert_eq!(edges, vec![(1, 2, 1, "Level 16"), (2, 3, 2, "Thunder Stone")]);
        assert!(!chain.is_branching());
        assert!(chain.warnings().is_empty());
        assert_eq!(chain.root(), SpeciesId(1));
        assert_eq!(chain.current_stage(), Some(2));
    }

    #[test]
    fn branching_chain_one_root_five_children() {
        let species = [
            (133, "Eevee"),
            (134, "Vaporeon"),
            (135, "Jolteon"),
            (136, "Flareon"),
            (196, "Espeon"),
            (197, "Umbreon"),
        ];
        let edges = vec![
            EdgeRow::new(SpeciesId(133), SpeciesId(134), Some("stone")).with_item("Water Stone"),
            EdgeRow::new(SpeciesId(133), SpeciesId(135), Some("stone")).with_item("Thunder Stone"),
            EdgeRow::new(SpeciesId(133), SpeciesId(136), Some("stone")).with_item("Fire Stone"),
            EdgeRow::new(SpeciesId(133), SpeciesId(196), Some("happiness-day")),
            EdgeRow::new(SpeciesId(133), SpeciesId(197), Some("happiness-night")),
        ];
        let graph = build(133, &rows(67, &species, edges));

        assert!(graph.is_branching());
        assert_eq!(graph.len(), 6);
        assert_eq!(graph.stage_of(SpeciesId(133)), Some(1));
        for child in [134, 135, 136, 196, 197] {
            assert_eq!(graph.stage_of(SpeciesId(child)), Some(2));
        }
        assert!(graph.warnings().is_empty());
    }

    #[test]
    fn zero_edges_single_stage() {
        let graph = build(128, &rows(50, &[(128, "Tauros")], Vec::new()));
        assert_eq!(graph.len(), 1);
        assert!(graph.edges().is_empty());
        assert!(!graph.is_branching());
        assert!(graph.warnings().is_empty());
    }

    #[test]
    fn missing_rows_degenerate_chain() {
        let graph = build(151, &ChainRows::empty());
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.root(), SpeciesId(151));
        assert_eq!(graph.stages()[0].name, UNKNOWN_SPECIES_NAME);
        assert!(graph.edges().is_empty());
        assert_eq!(
            graph.warnings(),
            &[EvodexWarning::MissingData(MissingData::NoChainRows {
                species: SpeciesId(151)
            })]
        );
    }

    #[test]
    fn two_cycle_terminates_with_one_integrity_warning() {
        let rows = rows(
            9,
            &[(1, "A"), (2, "B")],
            vec![
                EdgeRow::new(SpeciesId(1), SpeciesId(2), Some("level")).with_level(10),
                EdgeRow::new(SpeciesId(2), SpeciesId(1), Some("level")).with_level(20),
            ],
        );
        let graph = build(1, &rows);

        assert_eq!(graph.root(), SpeciesId(1));
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(count_kind(&graph, WarningKind::DataIntegrity), 1);
        assert_eq!(
            integrity_issues(&graph),
            vec![
                IntegrityIssue::NoRoot {
                    chosen: SpeciesId(1)
                },
                IntegrityIssue::RevisitSkipped {
                    from: SpeciesId(2),
                    to: SpeciesId(1)
                },
            ]
        );
    }

    #[test]
    fn self_loop_is_skipped() {
        let rows = rows(
            3,
            &[(5, "Loop")],
            vec![EdgeRow::new(SpeciesId(5), SpeciesId(5), Some("level"))],
        );
        let graph = build(5, &rows);
        assert_eq!(graph.len(), 1);
        assert!(graph.edges().is_empty());
        assert_eq!(count_kind(&graph, WarningKind::DataIntegrity), 1);
    }

    #[test]
    fn multiple_roots_pick_lowest_and_drop_unreachable() {
        let rows = rows(
            4,
            &[(10, "X"), (11, "Y"), (20, "P"), (21, "Q")],
            vec![
                EdgeRow::new(SpeciesId(20), SpeciesId(21), Some("level")).with_level(30),
                EdgeRow::new(SpeciesId(10), SpeciesId(11), Some("level")).with_level(18),
            ],
        );
        let graph = build(11, &rows);

        assert_eq!(graph.root(), SpeciesId(10));
        let members: Vec<_> = graph.members().collect();
        assert_eq!(members, vec![SpeciesId(10), SpeciesId(11)]);
        assert_eq!(
            integrity_issues(&graph),
            vec![
                IntegrityIssue::MultipleRoots {
                    candidates: vec![SpeciesId(10), SpeciesId(20)],
                    chosen: SpeciesId(10)
                },
                IntegrityIssue::UnreachableSpecies {
                    species: SpeciesId(20)
                },
                IntegrityIssue::UnreachableSpecies {
                    species: SpeciesId(21)
                },
            ]
        );
    }

    #[test]
    fn multiple_roots_pick_the_one_reaching_requested() {
        let rows = rows(
            4,
            &[(10, "X"), (11, "Y"), (20, "P"), (21, "Q")],
            vec![
                EdgeRow::new(SpeciesId(20), SpeciesId(21), Some("level")).with_level(30),
                EdgeRow::new(SpeciesId(10), SpeciesId(11), Some("level")).with_level(18),
            ],
        );
        let graph = build(21, &rows);

        assert_eq!(graph.root(), SpeciesId(20));
        let members: Vec<_> = graph.members().collect();
        assert_eq!(members, vec![SpeciesId(20), SpeciesId(21)]);
        assert_eq!(graph.stage_of(SpeciesId(21)), Some(2));
        assert_eq!(
            integrity_issues(&graph),
            vec![
                IntegrityIssue::MultipleRoots {
                    candidates: vec![SpeciesId(10), SpeciesId(20)],
                    chosen: SpeciesId(20)
                },
                IntegrityIssue::UnreachableSpecies {
                    species: SpeciesId(10)
                },
                IntegrityIssue::UnreachableSpecies {
                    species: SpeciesId(11)
                },
            ]
        );
    }

    #[test]
    fn cycle_away_from_the_only_root_still_stages_requested() {
        let rows = rows(
            8,
            &[(1, "Root"), (2, "Next"), (5, "Ping"), (6, "Pong")],
            vec![
                EdgeRow::new(SpeciesId(1), SpeciesId(2), Some("level")),
                EdgeRow::new(SpeciesId(5), SpeciesId(6), Some("level")),
                EdgeRow::new(SpeciesId(6), SpeciesId(5), Some("level")),
            ],
        );
        let graph = build(6, &rows);

        assert_eq!(graph.root(), SpeciesId(5));
        assert_eq!(graph.stage_of(SpeciesId(6)), Some(2));
        assert_eq!(
            integrity_issues(&graph),
            vec![
                IntegrityIssue::NoRoot {
                    chosen: SpeciesId(5)
                },
                IntegrityIssue::RevisitSkipped {
                    from: SpeciesId(6),
                    to: SpeciesId(5)
                },
                IntegrityIssue::UnreachableSpecies {
                    species: SpeciesId(1)
                },
                IntegrityIssue::UnreachableSpecies {
                    species: SpeciesId(2)
                },
            ]
        );
    }

    #[test]
    fn truncated_rows_report_omitted_members() {
        let mut rows = rows(
            11,
            &[(1, "A"), (2, "B")],
            vec![EdgeRow::new(SpeciesId(1), SpeciesId(2), Some("level")).with_level(12)],
        );
        rows.omitted_members = 3;
        let graph = build(2, &rows);

        assert_eq!(graph.stage_of(SpeciesId(2)), Some(2));
        assert_eq!(
            integrity_issues(&graph),
            vec![IntegrityIssue::ChainTruncated { kept: 2, omitted: 3 }]
        );
    }

    #[test]
    fn diamond_keeps_first_parent_only() {
        let rows = rows(
            5,
            &[(1, "Root"), (2, "Left"), (3, "Right"), (4, "Join")],
            vec![
                EdgeRow::new(SpeciesId(1), SpeciesId(2), Some("level")),
                EdgeRow::new(SpeciesId(1), SpeciesId(3), Some("level")),
                EdgeRow::new(SpeciesId(2), SpeciesId(4), Some("level")),
                EdgeRow::new(SpeciesId(3), SpeciesId(4), Some("level")),
            ],
        );
        let graph = build(4, &rows);

        assert_eq!(graph.stage_of(SpeciesId(4)), Some(3));
        assert_eq!(graph.edges().len(), 3);
        for edge in graph.edges() {
            assert_eq!(graph.stage_of(edge.to), Some(edge.from_stage + 1));
        }
        assert_eq!(
            integrity_issues(&graph),
            vec![IntegrityIssue::RevisitSkipped {
                from: SpeciesId(3),
                to: SpeciesId(4)
            }]
        );
    }

    #[test]
    fn dangling_and_duplicate_edges_are_dropped() {
        let rows = rows(
            6,
            &[(1, "A"), (2, "B")],
            vec![
                EdgeRow::new(SpeciesId(1), SpeciesId(2), Some("level")).with_level(7),
                EdgeRow::new(SpeciesId(1), SpeciesId(2), Some("level")).with_level(99),
                EdgeRow::new(SpeciesId(2), SpeciesId(300), Some("trade")),
            ],
        );
        let graph = build(1, &rows);

        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].requirement, "Level 7");
        assert_eq!(
            integrity_issues(&graph),
            vec![
                IntegrityIssue::DuplicateEdge {
                    from: SpeciesId(1),
                    to: SpeciesId(2)
                },
                IntegrityIssue::DanglingEdge {
                    from: SpeciesId(2),
                    to: SpeciesId(300)
                },
            ]
        );
    }

    #[test]
    fn formatter_issues_carry_edge_context() {
        let rows = rows(
            7,
            &[(1, "A"), (2, "B"), (3, "C")],
            vec![
                EdgeRow::new(SpeciesId(1), SpeciesId(2), Some("moonwalk")),
                EdgeRow::new(SpeciesId(1), SpeciesId(3), Some("stone")),
            ],
        );
        let graph = build(1, &rows);

        assert_eq!(graph.edges()[0].requirement, "Unknown");
        assert_eq!(graph.edges()[1].requirement, "");
        assert_eq!(
            graph.warnings(),
            &[
                EvodexWarning::UnrecognizedMethod {
                    edge: Some((SpeciesId(1), SpeciesId(2))),
                    method: "moonwalk".to_string()
                },
                EvodexWarning::MissingData(MissingData::MissingItem {
                    edge: Some((SpeciesId(1), SpeciesId(3))),
                    method: "stone".to_string()
                }),
            ]
        );
    }

    #[test]
    fn branching_ignores_skipped_edges() {
        let rows = rows(
            8,
            &[(1, "A"), (2, "B"), (3, "C")],
            vec![
                EdgeRow::new(SpeciesId(1), SpeciesId(2), Some("level")),
                EdgeRow::new(SpeciesId(2), SpeciesId(1), Some("level")),
                EdgeRow::new(SpeciesId(2), SpeciesId(3), Some("level")),
            ],
        );
        let graph = build(1, &rows);
        assert!(!graph.is_branching());
        assert_eq!(graph.len(), 3);
    }

    #[test]
    fn resolver_queries_store_and_marks_current() {
        let mut store = MemoryStore::new();
        store.insert_species(Species::new(SpeciesId(4), "Charmander", ChainId(2)));
        store.insert_species(Species::new(SpeciesId(5), "Charmeleon", ChainId(2)));
        store.insert_edge(EdgeRow::new(SpeciesId(4), SpeciesId(5), Some("level")).with_level(16));

        let resolver = ChainResolver::new(store);
        let chain = resolver.resolve(SpeciesId(5)).expect("resolve");

        assert_eq!(chain.chain_id(), Some(ChainId(2)));
        assert_eq!(chain.current(), SpeciesId(5));
        let current: Vec<_> = chain
            .stages()
            .filter(|s| s.is_current)
            .map(|s| s.name)
            .collect();
        assert_eq!(current, vec!["Charmeleon"]);
    }

    #[test]
    fn views_of_one_graph_share_it() {
        let rows = rows(
            1,
            &[(1, "A"), (2, "B")],
            vec![EdgeRow::new(SpeciesId(1), SpeciesId(2), None)],
        );
        let graph = Rc::new(build(1, &rows));
        let a = ResolvedChain::new(Rc::clone(&graph), SpeciesId(1));
        let b = ResolvedChain::new(graph, SpeciesId(2));
        assert!(a.shares_graph_with(&b));
        assert_ne!(a, b);
    }
}
