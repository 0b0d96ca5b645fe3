//! The normalization pipeline.
//!
//! Steps run in a fixed order over one graph:
//!
//! | Step | Stage | Toggle |
//! |------|-------|--------|
//! | a | list member order | `list_canon` |
//! | b | content-addressed list heads | `list_canon` |
//! | c | orphan chain pruning | `list_canon` and `prune_lists` |
//! | d | `owl:equivalentClass` orientation | always |
//! | e | symmetric edge orientation | `symmetric_canon` |
//!
//! Each step only rewrites what is not yet canonical, so running the
//! pipeline on its own output changes nothing.

use std::time::Instant;

use owldiff_graph::{Graph, PrefixTable};
use serde::{Deserialize, Serialize};

use crate::lists::{canonicalize_all_lists, determinize_list_heads, prune_orphan_lists};
use crate::report::{Diagnostics, NormalizeReport, StageTiming};
use crate::symmetric::{canonicalize_equivalence_orientation, canonicalize_symmetric_edges};

/// Which normalization steps run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NormalizeOptions {
    /// Sort list members and give lists content-addressed heads.
    pub list_canon: bool,
    /// Remove chains orphaned by head rewiring.
    pub prune_lists: bool,
    /// Orient the symmetric properties.
    pub symmetric_canon: bool,
    /// Emit a progress event every this many items; 0 disables it.
    pub log_every: usize,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            list_canon: true,
            prune_lists: true,
            symmetric_canon: true,
            log_every: 0,
        }
    }
}

/// Normalizes graphs with fixed options and a fixed prefix table.
///
/// Old and new graphs of a diff must go through the same `Normalizer`, one
/// at a time, so equal content gets equal keys and equal list heads.
#[derive(Debug, Clone)]
pub struct Normalizer {
    options: NormalizeOptions,
    prefixes: PrefixTable,
}

impl Normalizer {
    /// Creates a normalizer.
    #[must_use]
    pub fn new(options: NormalizeOptions, prefixes: PrefixTable) -> Self {
        Self { options, prefixes }
    }

    /// The options in effect.
    #[must_use]
    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// The prefix table used for canonical keys.
    #[must_use]
    pub fn prefixes(&self) -> &PrefixTable {
        &self.prefixes
    }

    /// Normalizes `graph` in place.
    pub fn normalize(&self, graph: &mut Graph) -> NormalizeReport {
        let _span = tracing::info_span!("normalize").entered();
        let started = Instant::now();
        let opts = &self.options;
        let prefixes = &self.prefixes;
        let mut diagnostics = Diagnostics::new();
        let mut report = NormalizeReport {
            triples_before: graph.len(),
            ..NormalizeReport::default()
        };
        tracing::info!(triples = graph.len(), "normalization started");

        if opts.list_canon {
            let t = Instant::now();
            let (reordered, heads) =
                canonicalize_all_lists(graph, prefixes, opts.log_every, &mut diagnostics);
            report.list_heads = heads.len();
            report.list_items_reordered = reordered;
            report.stages.push(StageTiming::new("list-order", t.elapsed()));

            let t = Instant::now();
            let (rewired, mapping) =
                determinize_list_heads(graph, &heads, prefixes, opts.log_every, &mut diagnostics);
            report.list_refs_rewired = rewired;
            report.canonical_lists = mapping
                .values()
                .collect::<std::collections::BTreeSet<_>>()
                .len();
            report.stages.push(StageTiming::new("list-heads", t.elapsed()));

            if opts.prune_lists {
                let t = Instant::now();
                report.orphan_triples_pruned =
                    prune_orphan_lists(graph, &heads, &mapping, opts.log_every);
                report.stages.push(StageTiming::new("list-prune", t.elapsed()));
            }
        }

        let t = Instant::now();
        report.equivalence_rewritten =
            canonicalize_equivalence_orientation(graph, prefixes, opts.log_every, &mut diagnostics);
        report.stages.push(StageTiming::new("equivalence", t.elapsed()));

        if opts.symmetric_canon {
            let t = Instant::now();
            report.symmetric_rewritten =
                canonicalize_symmetric_edges(graph, prefixes, opts.log_every, &mut diagnostics);
            report.stages.push(StageTiming::new("symmetric", t.elapsed()));
        }

        report.triples_after = graph.len();
        report.diagnostics = diagnostics;
        tracing::info!(
            triples = report.triples_after,
            delta = report.triples_after as i64 - report.triples_before as i64,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "normalization finished"
        );
        report
    }
}

/// Normalizes `graph` with the default prefix table.
pub fn normalize(graph: &mut Graph, options: &NormalizeOptions) -> NormalizeReport {
    Normalizer::new(*options, PrefixTable::default()).normalize(graph)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use owldiff_graph::parser::parse_str;
    use owldiff_graph::vocab::{owl, rdf};
    use owldiff_graph::{Format, Term};

    const OWL: &str = r#"
        @prefix ex: <http://example.org/> .
        @prefix owl: <http://www.w3.org/2002/07/owl#> .
        ex:C owl:unionOf ( ex:B ex:A ) ;
             owl:disjointWith ex:A .
        ex:D owl:intersectionOf ( ex:A ex:B ) .
        [ owl:onProperty ex:p ; owl:someValuesFrom ex:A ] owl:equivalentClass ex:E .
        ex:B owl:sameAs ex:A .
    "#;

    fn parsed() -> Graph {
        parse_str(OWL, Format::Turtle, "test").expect("fixture parses")
    }

    #[test]
    fn full_pipeline_counts() {
        let mut g = parsed();
        let report = normalize(&mut g, &NormalizeOptions::default());
        assert_eq!(report.list_heads, 2);
        assert_eq!(report.list_refs_rewired, 2);
        assert_eq!(report.canonical_lists, 1);
        assert_eq!(report.orphan_triples_pruned, 8);
        assert_eq!(report.equivalence_rewritten, 1);
        // C disjointWith A and B sameAs A
        assert_eq!(report.symmetric_rewritten, 2);
        assert!(report.diagnostics.is_empty());
        assert_eq!(report.triples_after, g.len());
        assert_eq!(report.stages.len(), 5);

        // one shared list of two cells
        assert_eq!(g.triples_matching(None, Some(&Term::iri(rdf::FIRST)), None).len(), 2);
    }

    #[test]
    fn idempotent() {
        let mut once = parsed();
        normalize(&mut once, &NormalizeOptions::default());
        let mut twice = once.clone();
        let report = normalize(&mut twice, &NormalizeOptions::default());
        assert_eq!(once, twice);
        assert_eq!(report.list_items_reordered, 0);
        assert_eq!(report.list_refs_rewired, 0);
        assert_eq!(report.orphan_triples_pruned, 0);
        assert_eq!(report.equivalence_rewritten, 0);
        assert_eq!(report.symmetric_rewritten, 0);
    }

    #[test]
    fn toggles_skip_steps() {
        let mut g = parsed();
        let opts = NormalizeOptions {
            list_canon: false,
            symmetric_canon: false,
            ..NormalizeOptions::default()
        };
        let report = normalize(&mut g, &opts);
        assert_eq!(report.stages.len(), 1);
        assert_eq!(report.list_heads, 0);
        assert_eq!(report.equivalence_rewritten, 1);
        let same_as = Term::iri(owl::SAME_AS);
        let b = Term::iri("http://example.org/B");
        assert_eq!(g.triples_matching(Some(&b), Some(&same_as), None).len(), 1);
    }

    #[test]
    fn without_pruning_orphans_stay() {
        let mut g = parsed();
        let opts = NormalizeOptions {
            prune_lists: false,
            ..NormalizeOptions::default()
        };
        let report = normalize(&mut g, &opts);
        assert_eq!(report.orphan_triples_pruned, 0);
        assert_eq!(g.triples_matching(None, Some(&Term::iri(rdf::FIRST)), None).len(), 6);
    }

    #[test]
    fn options_from_partial_toml() {
        let opts: NormalizeOptions = toml::from_str("prune_lists = false").expect("valid toml");
        assert!(opts.list_canon);
        assert!(!opts.prune_lists);
        assert!(opts.symmetric_canon);
    }
}
