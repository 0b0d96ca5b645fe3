//! Run reports: non-fatal anomalies, per-stage timings, and normalization counts.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::Serialize;

/// Category of a non-fatal anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A list chain that could not be traversed; the head was left as-is.
    MalformedList,
    /// A symmetric or equivalence edge with a literal object; it was not reoriented.
    LiteralEdge,
}

/// A single skipped structure.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Anomaly {
    /// What went wrong.
    pub kind: AnomalyKind,
    /// Canonical key of the subject involved.
    pub subject: String,
    /// Human-readable reason.
    pub detail: String,
}

impl Anomaly {
    /// A list head that was left uncanonicalized.
    pub fn malformed_list(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: AnomalyKind::MalformedList,
            subject: subject.into(),
            detail: detail.into(),
        }
    }

    /// A symmetric or equivalence edge pointing at a literal.
    pub fn literal_edge(subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind: AnomalyKind::LiteralEdge,
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

/// Anomalies aggregated over a run. The same anomaly is only kept once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    anomalies: BTreeSet<Anomaly>,
}

impl Diagnostics {
    /// Creates an empty set of diagnostics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an anomaly. Returns `false` if it had already been recorded.
    pub fn push(&mut self, anomaly: Anomaly) -> bool {
        self.anomalies.insert(anomaly)
    }

    /// Merges diagnostics from another run stage.
    pub fn extend(&mut self, other: Diagnostics) {
        self.anomalies.extend(other.anomalies);
    }

    /// Total number of distinct anomalies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anomalies.len()
    }

    /// True if nothing was skipped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anomalies.is_empty()
    }

    /// Number of anomalies of `kind`.
    #[must_use]
    pub fn count(&self, kind: AnomalyKind) -> usize {
        self.anomalies.iter().filter(|a| a.kind == kind).count()
    }

    /// Iterates over anomalies in a stable order.
    pub fn iter(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter()
    }

    /// Emits the end-of-run summary for `scope` (e.g. `"old"`).
    pub fn log_summary(&self, scope: &str) {
        if self.is_empty() {
            tracing::info!(scope, "no skipped structures");
            return;
        }
        tracing::warn!(
            scope,
            malformed_lists = self.count(AnomalyKind::MalformedList),
            literal_edges = self.count(AnomalyKind::LiteralEdge),
            "some structures were left uncanonicalized"
        );
        for a in &self.anomalies {
            tracing::debug!(scope, kind = ?a.kind, subject = %a.subject, "{}", a.detail);
        }
    }
}

/// Wall-clock time spent in one stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageTiming {
    /// Stage name.
    pub stage: String,
    /// Elapsed milliseconds.
    pub millis: f64,
}

impl StageTiming {
    /// Records `elapsed` for `stage`.
    pub fn new(stage: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            stage: stage.into(),
            millis: elapsed.as_secs_f64() * 1000.0,
        }
    }
}

/// Outcome of normalizing one graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NormalizeReport {
    /// Triples before normalization.
    pub triples_before: usize,
    /// Triples after normalization.
    pub triples_after: usize,
    /// Distinct objects of list-bearing properties.
    pub list_heads: usize,
    /// Members written by list reordering.
    pub list_items_reordered: usize,
    /// List-bearing references moved to a canonical head.
    pub list_refs_rewired: usize,
    /// Distinct canonical lists.
    pub canonical_lists: usize,
    /// `rdf:first`/`rdf:rest` triples removed from orphaned chains.
    pub orphan_triples_pruned: usize,
    /// Equivalence edges reoriented.
    pub equivalence_rewritten: usize,
    /// Symmetric edges reoriented.
    pub symmetric_rewritten: usize,
    /// Per-stage timings in execution order.
    pub stages: Vec<StageTiming>,
    /// Structures left as-is.
    pub diagnostics: Diagnostics,
}

/// Emits a `debug` heartbeat every `log_every` items of a long loop.
pub(crate) fn heartbeat(stage: &str, done: usize, total: usize, log_every: usize, rewrites: usize) {
    if log_every > 0 && done % log_every == 0 {
        tracing::debug!(stage, done, total, rewrites, "progress");
    }
}
