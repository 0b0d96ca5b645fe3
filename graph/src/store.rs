//! In-memory triple store.
//!
//! [`Graph`] has set semantics: inserting a triple twice keeps one copy.
//! Iteration is in sorted (subject, predicate, object) order, so anything
//! derived from a graph by walking it is deterministic regardless of the
//! order triples were inserted in. Each position has its own index, so a
//! pattern with any bound position only touches the matching triples.

use std::collections::{BTreeSet, HashMap};

use crate::model::{BlankId, Term, Triple};

type Index = HashMap<Term, BTreeSet<Triple>>;

/// A set of RDF triples indexed by subject, predicate, and object.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    triples: BTreeSet<Triple>,
    by_subject: Index,
    by_predicate: Index,
    by_object: Index,
}

impl Graph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// True if the graph holds no triples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Adds a triple. Returns `false` if it was already present.
    pub fn insert(&mut self, triple: Triple) -> bool {
        if self.triples.contains(&triple) {
            return false;
        }
        index_insert(&mut self.by_subject, &triple.s, &triple);
        index_insert(&mut self.by_predicate, &triple.p, &triple);
        index_insert(&mut self.by_object, &triple.o, &triple);
        self.triples.insert(triple)
    }

    /// Removes a triple. Returns `false` if it was not present.
    pub fn remove(&mut self, triple: &Triple) -> bool {
        if !self.triples.remove(triple) {
            return false;
        }
        index_remove(&mut self.by_subject, &triple.s, triple);
        index_remove(&mut self.by_predicate, &triple.p, triple);
        index_remove(&mut self.by_object, &triple.o, triple);
        true
    }

    /// True if the triple is present.
    #[must_use]
    pub fn contains(&self, triple: &Triple) -> bool {
        self.triples.contains(triple)
    }

    /// Iterates over all triples in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Returns every triple matching the pattern, in sorted order.
    ///
    /// `None` in a position is a wildcard.
    #[must_use]
    pub fn triples_matching(
        &self,
        s: Option<&Term>,
        p: Option<&Term>,
        o: Option<&Term>,
    ) -> Vec<Triple> {
        let mut candidates: Option<&BTreeSet<Triple>> = None;
        for (bound, index) in [
            (s, &self.by_subject),
            (o, &self.by_object),
            (p, &self.by_predicate),
        ] {
            let Some(term) = bound else { continue };
            let Some(set) = index.get(term) else {
                return Vec::new();
            };
            if candidates.map_or(true, |c| set.len() < c.len()) {
                candidates = Some(set);
            }
        }
        let candidates = candidates.unwrap_or(&self.triples);
        candidates
            .iter()
            .filter(|t| s.map_or(true, |s| &t.s == s))
            .filter(|t| p.map_or(true, |p| &t.p == p))
            .filter(|t| o.map_or(true, |o| &t.o == o))
            .cloned()
            .collect()
    }

    /// Objects of `(s, p, ?)`.
    #[must_use]
    pub fn objects(&self, s: &Term, p: &Term) -> Vec<Term> {
        self.triples_matching(Some(s), Some(p), None)
            .into_iter()
            .map(|t| t.o)
            .collect()
    }

    /// Subjects of `(?, p, o)`.
    #[must_use]
    pub fn subjects(&self, p: &Term, o: &Term) -> Vec<Term> {
        self.triples_matching(None, Some(p), Some(o))
            .into_iter()
            .map(|t| t.s)
            .collect()
    }

    /// `(subject, object)` pairs of every triple with predicate `p`.
    #[must_use]
    pub fn subject_objects(&self, p: &Term) -> Vec<(Term, Term)> {
        self.triples_matching(None, Some(p), None)
            .into_iter()
            .map(|t| (t.s, t.o))
            .collect()
    }

    /// Number of triples using `term` as object.
    #[must_use]
    pub fn object_count(&self, term: &Term) -> usize {
        self.by_object.get(term).map_or(0, BTreeSet::len)
    }

    /// Every blank node label used in subject or object position.
    #[must_use]
    pub fn blank_nodes(&self) -> BTreeSet<BlankId> {
        self.by_subject
            .keys()
            .chain(self.by_object.keys())
            .filter_map(Term::as_blank)
            .cloned()
            .collect()
    }

    /// Triples present in either graph.
    #[must_use]
    pub fn union(&self, other: &Graph) -> Graph {
        self.iter().chain(other.iter()).cloned().collect()
    }

    /// Triples present in both graphs.
    #[must_use]
    pub fn intersection(&self, other: &Graph) -> Graph {
        self.iter().filter(|t| other.contains(t)).cloned().collect()
    }

    /// Triples of `self` absent from `other`.
    #[must_use]
    pub fn difference(&self, other: &Graph) -> Graph {
        self.iter().filter(|t| !other.contains(t)).cloned().collect()
    }
}

fn index_insert(index: &mut Index, key: &Term, triple: &Triple) {
    index.entry(key.clone()).or_default().insert(triple.clone());
}

fn index_remove(index: &mut Index, key: &Term, triple: &Triple) {
    if let Some(set) = index.get_mut(key) {
        set.remove(triple);
        if set.is_empty() {
            index.remove(key);
        }
    }
}

impl PartialEq for Graph {
    fn eq(&self, other: &Self) -> bool {
        self.triples == other.triples
    }
}

impl Eq for Graph {}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

impl Extend<Triple> for Graph {
    fn extend<I: IntoIterator<Item = Triple>>(&mut self, iter: I) {
        for triple in iter {
            self.insert(triple);
        }
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::collections::btree_set::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::collections::btree_set::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str, p: &str, o: &str) -> Triple {
        let term = |x: &str| match x.strip_prefix("_:") {
            Some(label) => Term::blank(label),
            None => Term::iri(format!("http://example.org/{x}")),
        };
        Triple::new(term(s), term(p), term(o))
    }

    #[test]
    fn insert_is_idempotent() {
        let mut g = Graph::new();
        assert!(g.insert(t("a", "p", "b")));
        assert!(!g.insert(t("a", "p", "b")));
        assert_eq!(g.len(), 1);
    }

    #[test]
    fn remove_updates_every_index() {
        let mut g: Graph = [t("a", "p", "b"), t("a", "q", "c")].into_iter().collect();
        assert!(g.remove(&t("a", "p", "b")));
        assert!(!g.remove(&t("a", "p", "b")));
        let a = Term::iri("http://example.org/a");
        let p = Term::iri("http://example.org/p");
        let b = Term::iri("http://example.org/b");
        assert!(g.triples_matching(Some(&a), Some(&p), None).is_empty());
        assert!(g.triples_matching(None, None, Some(&b)).is_empty());
        assert_eq!(g.triples_matching(Some(&a), None, None).len(), 1);
    }

    #[test]
    fn wildcard_patterns() {
        let g: Graph = [
            t("a", "p", "b"),
            t("a", "p", "c"),
            t("d", "p", "b"),
            t("d", "q", "_:x"),
        ]
        .into_iter()
        .collect();
        let p = Term::iri("http://example.org/p");
        let b = Term::iri("http://example.org/b");
        assert_eq!(g.triples_matching(None, None, None).len(), 4);
        assert_eq!(g.triples_matching(None, Some(&p), None).len(), 3);
        assert_eq!(g.subjects(&p, &b).len(), 2);
        assert_eq!(g.object_count(&b), 2);
        let unknown = Term::iri("http://example.org/zzz");
        assert!(g.triples_matching(Some(&unknown), Some(&p), None).is_empty());
        assert_eq!(g.blank_nodes().len(), 1);
    }

    #[test]
    fn set_operations() {
        let a: Graph = [t("a", "p", "b"), t("a", "p", "c")].into_iter().collect();
        let b: Graph = [t("a", "p", "c"), t("a", "p", "d")].into_iter().collect();
        assert_eq!(a.intersection(&b).len(), 1);
        assert_eq!(a.difference(&b), [t("a", "p", "b")].into_iter().collect());
        assert_eq!(a.union(&b).len(), 3);
    }

    #[test]
    fn iteration_order_ignores_insertion_order() {
        let forward: Graph = [t("a", "p", "b"), t("c", "p", "d")].into_iter().collect();
        let backward: Graph = [t("c", "p", "d"), t("a", "p", "b")].into_iter().collect();
        let f: Vec<_> = forward.iter().collect();
        let b: Vec<_> = backward.iter().collect();
        assert_eq!(f, b);
    }
}
