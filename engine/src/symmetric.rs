//! Orientation of equivalence and symmetric edges.
//!
//! `owl:equivalentClass` keeps the IRI side as subject when the other side is
//! a blank node, otherwise the smaller canonical key. The symmetric
//! properties always keep the smaller key as subject. Either way each
//! relation ends up stored in exactly one direction.

use owldiff_graph::vocab::owl;
use owldiff_graph::{Graph, PrefixTable, Term, Triple};

use crate::report::{heartbeat, Anomaly, Diagnostics};

/// The equivalence property with the IRI-before-blank-node rule.
pub const EQUIVALENCE_PROPERTY: &str = owl::EQUIVALENT_CLASS;

/// Properties stored in (min, max) canonical-key order.
pub const SYMMETRIC_PROPERTIES: [&str; 3] = [owl::EQUIVALENT_PROPERTY, owl::SAME_AS, owl::DISJOINT_WITH];

/// Replaces `edge` by its reverse. Returns `false` when the object is a literal.
fn flip(graph: &mut Graph, edge: &Triple) -> bool {
    let Some(reversed) = edge.flipped() else {
        return false;
    };
    graph.insert(reversed);
    graph.remove(edge);
    true
}

fn report_literal(edge: &Triple, prefixes: &PrefixTable, diagnostics: &mut Diagnostics) {
    let subject = prefixes.key(&edge.s);
    let detail = format!("{} {}", prefixes.key(&edge.p), prefixes.key(&edge.o));
    if diagnostics.push(Anomaly::literal_edge(&subject, &detail)) {
        tracing::warn!(%subject, edge = %detail, "edge with literal object not reoriented");
    }
}

/// True if `(s, o)` is already in the orientation the equivalence rule wants.
fn equivalence_oriented(s: &Term, o: &Term, prefixes: &PrefixTable) -> bool {
    match (s, o) {
        (Term::Iri(_), Term::Blank(_)) => true,
        (Term::Blank(_), Term::Iri(_)) => false,
        _ => prefixes.key(s) <= prefixes.key(o),
    }
}

/// Orients every `owl:equivalentClass` edge.
///
/// Returns the number of edges reversed.
pub fn canonicalize_equivalence_orientation(
    graph: &mut Graph,
    prefixes: &PrefixTable,
    log_every: usize,
    diagnostics: &mut Diagnostics,
) -> usize {
    let edges = graph.triples_matching(None, Some(&Term::iri(EQUIVALENCE_PROPERTY)), None);
    tracing::info!(pairs = edges.len(), "owl:equivalentClass pairs found");
    let mut rewritten = 0;
    for (i, edge) in edges.iter().enumerate() {
        if !edge.o.is_resource() {
            report_literal(edge, prefixes, diagnostics);
        } else if !equivalence_oriented(&edge.s, &edge.o, prefixes) && flip(graph, edge) {
            rewritten += 1;
        }
        heartbeat("equivalence", i + 1, edges.len(), log_every, rewritten);
    }
    tracing::info!(rewritten, "owl:equivalentClass edges oriented");
    rewritten
}

/// Puts every edge of the symmetric properties in (min, max) key order.
///
/// Returns the number of edges reversed.
pub fn canonicalize_symmetric_edges(
    graph: &mut Graph,
    prefixes: &PrefixTable,
    log_every: usize,
    diagnostics: &mut Diagnostics,
) -> usize {
    let mut total = 0;
    for property in SYMMETRIC_PROPERTIES {
        let predicate = Term::iri(property);
        let edges = graph.triples_matching(None, Some(&predicate), None);
        let mut rewritten = 0;
        for (i, edge) in edges.iter().enumerate() {
            if !edge.o.is_resource() {
                report_literal(edge, prefixes, diagnostics);
            } else if prefixes.key(&edge.s) > prefixes.key(&edge.o) && flip(graph, edge) {
                rewritten += 1;
            }
            heartbeat("symmetric", i + 1, edges.len(), log_every, rewritten);
        }
        tracing::info!(property = %prefixes.key(&predicate), pairs = edges.len(), rewritten, "symmetric edges oriented");
        total += rewritten;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://example.org/{local}"))
    }

    fn edge(s: Term, p: &str, o: Term) -> Triple {
        Triple::new(s, Term::iri(p), o)
    }

    #[test]
    fn iri_is_subject_of_equivalence_with_blank() {
        let mut g: Graph = [edge(Term::blank("b1"), EQUIVALENCE_PROPERTY, ex("P"))].into_iter().collect();
        let mut d = Diagnostics::new();
        let n = canonicalize_equivalence_orientation(&mut g, &PrefixTable::default(), 0, &mut d);
        assert_eq!(n, 1);
        assert!(g.contains(&edge(ex("P"), EQUIVALENCE_PROPERTY, Term::blank("b1"))));
        assert_eq!(g.len(), 1);

        let again = canonicalize_equivalence_orientation(&mut g, &PrefixTable::default(), 0, &mut d);
        assert_eq!(again, 0);
    }

    #[test]
    fn same_kind_equivalence_uses_key_order() {
        let mut g: Graph = [
            edge(ex("B"), EQUIVALENCE_PROPERTY, ex("A")),
            edge(Term::blank("z"), EQUIVALENCE_PROPERTY, Term::blank("a")),
        ]
        .into_iter()
        .collect();
        let mut d = Diagnostics::new();
        let n = canonicalize_equivalence_orientation(&mut g, &PrefixTable::default(), 0, &mut d);
        assert_eq!(n, 2);
        assert!(g.contains(&edge(ex("A"), EQUIVALENCE_PROPERTY, ex("B"))));
        assert!(g.contains(&edge(Term::blank("a"), EQUIVALENCE_PROPERTY, Term::blank("z"))));
    }

    #[test]
    fn both_directions_collapse_to_one() {
        let mut g: Graph = [
            edge(ex("A"), owl::SAME_AS, ex("B")),
            edge(ex("B"), owl::SAME_AS, ex("A")),
        ]
        .into_iter()
        .collect();
        let mut d = Diagnostics::new();
        let n = canonicalize_symmetric_edges(&mut g, &PrefixTable::default(), 0, &mut d);
        assert_eq!(n, 1);
        assert_eq!(g.len(), 1);
        assert!(g.contains(&edge(ex("A"), owl::SAME_AS, ex("B"))));
    }

    #[test]
    fn every_symmetric_property_is_oriented() {
        let mut g: Graph = SYMMETRIC_PROPERTIES
            .iter()
            .map(|p| edge(ex("Z"), p, ex("Y")))
            .collect();
        let mut d = Diagnostics::new();
        assert_eq!(canonicalize_symmetric_edges(&mut g, &PrefixTable::default(), 0, &mut d), 3);
        assert!(g.iter().all(|t| t.s == ex("Y")));
    }

    #[test]
    fn equivalent_class_is_not_treated_as_symmetric() {
        let mut g: Graph = [edge(ex("P"), EQUIVALENCE_PROPERTY, Term::blank("a"))].into_iter().collect();
        let mut d = Diagnostics::new();
        assert_eq!(canonicalize_symmetric_edges(&mut g, &PrefixTable::default(), 0, &mut d), 0);
    }

    #[test]
    fn literal_objects_are_reported_not_flipped() {
        let mut g: Graph = [
            edge(ex("A"), owl::SAME_AS, Term::string("a")),
            edge(ex("B"), EQUIVALENCE_PROPERTY, Term::string("b")),
        ]
        .into_iter()
        .collect();
        let before = g.clone();
        let mut d = Diagnostics::new();
        canonicalize_equivalence_orientation(&mut g, &PrefixTable::default(), 0, &mut d);
        canonicalize_symmetric_edges(&mut g, &PrefixTable::default(), 0, &mut d);
        assert_eq!(g, before);
        assert_eq!(d.len(), 2);
    }
}
