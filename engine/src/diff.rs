//! Graph comparison.
//!
//! Both strategies take two graphs that have already been normalized and
//! produce the same three-way split. [`IsomorphicDiff`] works on
//! [`CanonicalGraph`] triples directly. [`SimpleDiff`] compares the sorted
//! N-Triples lines of the canonical graphs and parses the resulting line sets
//! back; it is only as good as the normalization that preceded it.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use owldiff_graph::parser::parse_str;
use owldiff_graph::serializer::ntriples::to_ntriples;
use owldiff_graph::{Format, Graph};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::isomorphic::CanonicalGraph;

/// The three-way split between an old and a new graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GraphDiff {
    /// Triples in both graphs.
    pub unchanged: Graph,
    /// Triples only in the old graph.
    pub old_only: Graph,
    /// Triples only in the new graph.
    pub new_only: Graph,
}

impl GraphDiff {
    /// Triples added by the new version.
    #[must_use]
    pub fn additions(&self) -> &Graph {
        &self.new_only
    }

    /// Triples removed by the new version.
    #[must_use]
    pub fn removals(&self) -> &Graph {
        &self.old_only
    }

    /// True when nothing was added or removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.old_only.is_empty() && self.new_only.is_empty()
    }
}

/// A way of comparing two normalized graphs.
pub trait DiffStrategy {
    /// Short name used in logs and summaries.
    fn name(&self) -> &'static str;

    /// Splits `old` and `new` into unchanged, old-only, and new-only triples.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Internal`] if an intermediate form the strategy
    /// produced itself cannot be read back.
    fn diff(&self, old: &Graph, new: &Graph) -> Result<GraphDiff, EngineError>;
}

/// Set operations over canonically relabelled graphs.
#[derive(Debug, Clone, Copy, Default)]
pub struct IsomorphicDiff;

impl DiffStrategy for IsomorphicDiff {
    fn name(&self) -> &'static str {
        "isomorphic"
    }

    fn diff(&self, old: &Graph, new: &Graph) -> Result<GraphDiff, EngineError> {
        let _span = tracing::info_span!("diff", mode = self.name()).entered();
        let old = CanonicalGraph::new(old);
        let new = CanonicalGraph::new(new);
        let (old, new) = (old.graph(), new.graph());
        Ok(GraphDiff {
            unchanged: old.intersection(new),
            old_only: old.difference(new),
            new_only: new.difference(old),
        })
    }
}

/// Line-set operations over canonical N-Triples.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleDiff;

impl SimpleDiff {
    fn lines(graph: &Graph) -> BTreeSet<String> {
        to_ntriples(CanonicalGraph::new(graph).graph())
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_owned)
            .collect()
    }

    fn reparse<'a>(lines: impl Iterator<Item = &'a String>, what: &str) -> Result<Graph, EngineError> {
        let mut text = String::new();
        for line in lines {
            text.push_str(line);
            text.push('\n');
        }
        parse_str(&text, Format::NTriples, what)
            .map_err(|e| EngineError::Internal(format!("canonical N-Triples did not re-parse: {e}")))
    }
}

impl DiffStrategy for SimpleDiff {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn diff(&self, old: &Graph, new: &Graph) -> Result<GraphDiff, EngineError> {
        let _span = tracing::info_span!("diff", mode = self.name()).entered();
        let old = Self::lines(old);
        let new = Self::lines(new);
        Ok(GraphDiff {
            unchanged: Self::reparse(old.intersection(&new), "unchanged")?,
            old_only: Self::reparse(old.difference(&new), "old-only")?,
            new_only: Self::reparse(new.difference(&old), "new-only")?,
        })
    }
}

/// Which [`DiffStrategy`] to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffMode {
    /// [`IsomorphicDiff`].
    #[default]
    Isomorphic,
    /// [`SimpleDiff`].
    Simple,
}

impl DiffMode {
    /// The strategy this mode selects.
    #[must_use]
    pub fn strategy(self) -> Box<dyn DiffStrategy> {
        match self {
            DiffMode::Isomorphic => Box::new(IsomorphicDiff),
            DiffMode::Simple => Box::new(SimpleDiff),
        }
    }
}

impl FromStr for DiffMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "isomorphic" | "iso" => Ok(DiffMode::Isomorphic),
            "simple" => Ok(DiffMode::Simple),
            other => Err(format!("unknown diff mode '{other}' (expected isomorphic or simple)")),
        }
    }
}

impl fmt::Display for DiffMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DiffMode::Isomorphic => "isomorphic",
            DiffMode::Simple => "simple",
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn nt(text: &str) -> Graph {
        parse_str(text, Format::NTriples, "test").expect("fixture parses")
    }

    const OLD: &str = "<http://e/a> <http://e/p> <http://e/b> .\n\
                       <http://e/a> <http://e/p> _:x .\n\
                       _:x <http://e/q> \"old\" .\n";
    const NEW: &str = "<http://e/a> <http://e/p> <http://e/b> .\n\
                       <http://e/a> <http://e/p> _:y .\n\
                       _:y <http://e/q> \"new\"@en .\n";

    #[test]
    fn both_modes_agree() {
        let (old, new) = (nt(OLD), nt(NEW));
        let iso = IsomorphicDiff.diff(&old, &new).expect("diff");
        let simple = SimpleDiff.diff(&old, &new).expect("diff");
        assert_eq!(iso, simple);
        assert_eq!(iso.unchanged.len(), 1);
        assert_eq!(iso.removals().len(), 2);
        assert_eq!(iso.additions().len(), 2);
    }

    #[test]
    fn renamed_blank_nodes_are_unchanged() {
        let old = nt(OLD);
        let renamed = nt(&OLD.replace("_:x", "_:other"));
        for mode in [DiffMode::Isomorphic, DiffMode::Simple] {
            let d = mode.strategy().diff(&old, &renamed).expect("diff");
            assert!(d.is_empty(), "{mode}");
            assert_eq!(d.unchanged.len(), 3);
        }
    }

    #[test]
    fn empty_graphs() {
        let d = SimpleDiff.diff(&Graph::new(), &Graph::new()).expect("diff");
        assert!(d.is_empty());
        assert!(d.unchanged.is_empty());
    }

    #[test]
    fn mode_names() {
        assert_eq!("simple".parse::<DiffMode>(), Ok(DiffMode::Simple));
        assert_eq!("ISOMORPHIC".parse::<DiffMode>(), Ok(DiffMode::Isomorphic));
        assert!("fast".parse::<DiffMode>().is_err());
        assert_eq!(DiffMode::Simple.strategy().name(), "simple");
        assert_eq!(DiffMode::default().to_string(), "isomorphic");
    }
}
