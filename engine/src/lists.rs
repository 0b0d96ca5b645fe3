//! OWL list canonicalization.
//!
//! Lists hanging off a list-bearing property are rewritten in three steps:
//!
//! 1. [`canonicalize_all_lists`] sorts each list's members by [`MemberKeys`],
//!    reusing the existing cells.
//! 2. [`determinize_list_heads`] gives every distinct member sequence a
//!    content-addressed head `_:L_<sha256>` and points all references at it.
//! 3. [`prune_orphan_lists`] removes the `rdf:first`/`rdf:rest` triples of
//!    chains nobody points at any more.
//!
//! Malformed chains are never repaired. They are reported and left as they were.
//! A chain that shares cells with another one is well-formed, but its cells
//! are never rewritten in place; it only gets a fresh canonical list.

use std::collections::{BTreeMap, BTreeSet};

use owldiff_graph::vocab::{owl, rdf};
use owldiff_graph::{Graph, PrefixTable, Term, Triple};
use sha2::{Digest, Sha256};

use crate::report::{heartbeat, Anomaly, Diagnostics};
use crate::symmetric::{EQUIVALENCE_PROPERTY, SYMMETRIC_PROPERTIES};

/// Predicates whose object is the head of an ordered list.
pub const LIST_PROPERTIES: [&str; 7] = [
    owl::UNION_OF,
    owl::INTERSECTION_OF,
    owl::ONE_OF,
    owl::MEMBERS,
    owl::DISJOINT_UNION_OF,
    owl::PROPERTY_CHAIN_AXIOM,
    owl::HAS_KEY,
];

/// Prefix of content-addressed list identities.
pub const CANONICAL_PREFIX: &str = "L_";

/// Why a chain could not be traversed or rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum MalformedList {
    /// A cell has no `rdf:first`.
    #[error("cell without rdf:first")]
    MissingFirst,
    /// A cell has more than one `rdf:first`.
    #[error("cell with several rdf:first values")]
    MultipleFirst,
    /// A cell has more than one `rdf:rest`.
    #[error("cell with several rdf:rest values")]
    MultipleRest,
    /// The chain ends without reaching `rdf:nil`.
    #[error("chain does not end in rdf:nil")]
    MissingTerminator,
    /// The chain loops back on itself.
    #[error("chain contains a cycle")]
    Cycle,
    /// A cell is reachable from more than one chain.
    #[error("cell shared with another chain")]
    SharedCell,
    /// A literal where a cell was expected.
    #[error("literal in cell position")]
    LiteralCell,
}

/// A traversed list: its cells in order and the member held by each.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListChain {
    /// The head cell.
    pub head: Term,
    /// Every cell from the head up to (not including) `rdf:nil`.
    pub cells: Vec<Term>,
    /// The `rdf:first` value of each cell.
    pub members: Vec<Term>,
}

impl ListChain {
    /// True for `rdf:nil`, the empty list.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// True if `predicate` is one of [`LIST_PROPERTIES`].
#[must_use]
pub fn is_list_property(predicate: &Term) -> bool {
    LIST_PROPERTIES.iter().any(|p| predicate.is(p))
}

/// Walks the chain starting at `head`.
///
/// # Errors
///
/// Returns the first [`MalformedList`] reason met along the chain. Sharing
/// is not checked here; see [`check_exclusive`].
pub fn collect_list(graph: &Graph, head: &Term) -> Result<ListChain, MalformedList> {
    let first = Term::iri(rdf::FIRST);
    let rest = Term::iri(rdf::REST);

    let mut chain = ListChain {
        head: head.clone(),
        cells: Vec::new(),
        members: Vec::new(),
    };
    let mut seen = BTreeSet::new();
    let mut cell = head.clone();
    while !cell.is(rdf::NIL) {
        if !cell.is_resource() {
            return Err(MalformedList::LiteralCell);
        }
        if !seen.insert(cell.clone()) {
            return Err(MalformedList::Cycle);
        }
        let member = single(graph.objects(&cell, &first)).map_err(|many| {
            if many {
                MalformedList::MultipleFirst
            } else {
                MalformedList::MissingFirst
            }
        })?;
        let next = single(graph.objects(&cell, &rest)).map_err(|many| {
            if many {
                MalformedList::MultipleRest
            } else {
                MalformedList::MissingTerminator
            }
        })?;
        chain.cells.push(cell);
        chain.members.push(member);
        cell = next;
    }
    Ok(chain)
}

/// Checks that no other chain runs through the cells of `chain`.
///
/// # Errors
///
/// [`MalformedList::SharedCell`] if the head is some chain's tail or a later
/// cell is referenced by anything besides its predecessor.
pub fn check_exclusive(graph: &Graph, chain: &ListChain) -> Result<(), MalformedList> {
    let rest = Term::iri(rdf::REST);
    let shared = chain.cells.iter().enumerate().any(|(i, c)| {
        if i == 0 {
            !graph.subjects(&rest, c).is_empty()
        } else {
            graph.object_count(c) > 1
        }
    });
    if shared {
        Err(MalformedList::SharedCell)
    } else {
        Ok(())
    }
}

/// `Ok` with the only value, else `Err(true)` for several and `Err(false)` for none.
fn single(mut values: Vec<Term>) -> Result<Term, bool> {
    match values.len() {
        1 => values.pop().ok_or(false),
        0 => Err(false),
        _ => Err(true),
    }
}

/// Every distinct object of a list-bearing property, in term order.
#[must_use]
pub fn list_heads(graph: &Graph) -> BTreeSet<Term> {
    LIST_PROPERTIES
        .iter()
        .flat_map(|p| graph.triples_matching(None, Some(&Term::iri(p)), None))
        .map(|t| t.o)
        .collect()
}

fn collect_or_report(
    graph: &Graph,
    head: &Term,
    prefixes: &PrefixTable,
    diagnostics: &mut Diagnostics,
) -> Option<ListChain> {
    match collect_list(graph, head) {
        Ok(chain) => Some(chain),
        Err(reason) => {
            let subject = prefixes.key(head);
            if diagnostics.push(Anomaly::malformed_list(&subject, reason.to_string())) {
                tracing::warn!(head = %subject, %reason, "malformed list left as-is");
            }
            None
        }
    }
}

/// Sort keys for list members.
///
/// IRIs and literals use [`PrefixTable::key`]. A blank node is keyed by a
/// digest of what it describes: its outgoing triples, with the value of a
/// nested list-bearing property taken as the sorted set of its members. The
/// key survives any renaming of blank nodes and does not depend on the list
/// the node sits in. Equivalence and symmetric edges are left out because
/// orientation moves them from one end to the other.
pub struct MemberKeys<'g> {
    graph: &'g Graph,
    prefixes: &'g PrefixTable,
    cache: BTreeMap<Term, String>,
    visiting: BTreeSet<Term>,
}

impl<'g> MemberKeys<'g> {
    /// Keys for members of lists in `graph`.
    #[must_use]
    pub fn new(graph: &'g Graph, prefixes: &'g PrefixTable) -> Self {
        Self {
            graph,
            prefixes,
            cache: BTreeMap::new(),
            visiting: BTreeSet::new(),
        }
    }

    /// The sort key of `term`.
    pub fn key(&mut self, term: &Term) -> String {
        if !term.is_blank() {
            return self.prefixes.key(term);
        }
        if let Some(key) = self.cache.get(term) {
            return key.clone();
        }
        if !self.visiting.insert(term.clone()) {
            return "_:cycle".to_owned();
        }
        let description = self.describe(term);
        self.visiting.remove(term);
        let key = format!("_:{:x}", Sha256::digest(description.as_bytes()));
        self.cache.insert(term.clone(), key.clone());
        key
    }

    /// `members` with their keys, sorted by key. Equal keys keep their order.
    pub fn sorted(&mut self, members: &[Term]) -> Vec<(String, Term)> {
        let mut keyed: Vec<(String, Term)> = members.iter().map(|m| (self.key(m), m.clone())).collect();
        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        keyed
    }

    fn describe(&mut self, node: &Term) -> String {
        let mut lines = Vec::new();
        for t in self.graph.triples_matching(Some(node), None, None) {
            if t.p.is(rdf::FIRST)
                || t.p.is(rdf::REST)
                || t.p.is(EQUIVALENCE_PROPERTY)
                || SYMMETRIC_PROPERTIES.iter().any(|p| t.p.is(p))
            {
                continue;
            }
            let value = if is_list_property(&t.p) {
                self.set_key(&t.o)
            } else {
                self.key(&t.o)
            };
            lines.push(format!("{} {value}", self.prefixes.key(&t.p)));
        }
        lines.sort();
        // a plain list used as a member keeps its order
        if let Ok(chain) = collect_list(self.graph, node) {
            let items: Vec<String> = chain.members.iter().map(|m| self.key(m)).collect();
            lines.push(format!("( {} )", items.join(" ")));
        }
        lines.join("\n")
    }

    fn set_key(&mut self, head: &Term) -> String {
        match collect_list(self.graph, head) {
            Ok(chain) => {
                let keys: Vec<String> = self.sorted(&chain.members).into_iter().map(|(k, _)| k).collect();
                format!("{{ {} }}", keys.join(" "))
            }
            Err(_) => self.key(head),
        }
    }
}

fn hash_keys(sorted_keys: &[String]) -> String {
    format!("{:x}", Sha256::digest(sorted_keys.join("|").as_bytes()))
}

/// Hex SHA-256 over the `|`-joined keys of the sorted members.
pub fn list_hash(keys: &mut MemberKeys<'_>, members: &[Term]) -> String {
    let sorted: Vec<String> = keys.sorted(members).into_iter().map(|(k, _)| k).collect();
    hash_keys(&sorted)
}

/// Sorts the members of every list referenced by a list-bearing property.
///
/// Sorting is stable, so equal-keyed duplicates keep their relative order
/// and are never dropped. Only `rdf:first` objects change; the cells and any
/// other triples on them stay. Chains sharing cells are left for
/// [`determinize_list_heads`]. Returns the number of members rewritten and
/// the set of heads found.
pub fn canonicalize_all_lists(
    graph: &mut Graph,
    prefixes: &PrefixTable,
    log_every: usize,
    diagnostics: &mut Diagnostics,
) -> (usize, BTreeSet<Term>) {
    let heads = list_heads(graph);
    tracing::info!(heads = heads.len(), properties = LIST_PROPERTIES.len(), "list heads found");

    // keys never look at member order, so all of them are read before any write
    let mut reorders: Vec<(ListChain, Vec<Term>)> = Vec::new();
    {
        let mut keys = MemberKeys::new(graph, prefixes);
        for (i, head) in heads.iter().enumerate() {
            if let Some(chain) = collect_or_report(graph, head, prefixes, diagnostics) {
                if let Err(reason) = check_exclusive(graph, &chain) {
                    tracing::debug!(head = %prefixes.key(head), %reason, "cells not sorted in place");
                } else {
                    let sorted: Vec<Term> = keys.sorted(&chain.members).into_iter().map(|(_, m)| m).collect();
                    if sorted != chain.members {
                        reorders.push((chain, sorted));
                    }
                }
            }
            heartbeat("lists", i + 1, heads.len(), log_every, reorders.len());
        }
    }

    let first = Term::iri(rdf::FIRST);
    let mut rewritten = 0;
    for (chain, sorted) in reorders {
        for ((cell, old), new) in chain.cells.iter().zip(&chain.members).zip(&sorted) {
            if old != new {
                graph.remove(&Triple::new(cell.clone(), first.clone(), old.clone()));
                graph.insert(Triple::new(cell.clone(), first.clone(), new.clone()));
            }
        }
        rewritten += sorted.len();
    }
    tracing::info!(rewritten, heads = heads.len(), "list members canonicalized");
    (rewritten, heads)
}

/// Base name of the `n`th distinct list sharing `hash`.
fn canonical_base(hash: &str, n: usize) -> String {
    if n == 0 {
        hash.to_owned()
    } else {
        format!("{hash}-{n}")
    }
}

/// The `index`th cell of the canonical list named by `base`.
fn canonical_cell(base: &str, index: usize) -> Term {
    if index == 0 {
        Term::blank(format!("{CANONICAL_PREFIX}{base}"))
    } else {
        Term::blank(format!("{CANONICAL_PREFIX}{base}_{index}"))
    }
}

/// True if `head` is a canonical head for `hash` (`_:L_<hash>` or `_:L_<hash>-<n>`).
fn is_canonical_head(head: &Term, hash: &str) -> bool {
    let Some(rest) = head
        .as_blank()
        .and_then(|b| b.as_str().strip_prefix(CANONICAL_PREFIX))
        .and_then(|l| l.strip_prefix(hash))
    else {
        return false;
    };
    rest.is_empty() || rest.strip_prefix('-').is_some_and(|n| n.parse::<usize>().is_ok_and(|n| n > 0))
}

fn has_cells(graph: &Graph, cell: &Term) -> bool {
    !graph.objects(cell, &Term::iri(rdf::FIRST)).is_empty()
        || !graph.objects(cell, &Term::iri(rdf::REST)).is_empty()
}

fn materialize(graph: &mut Graph, base: &str, members: &[Term]) {
    let first = Term::iri(rdf::FIRST);
    let rest = Term::iri(rdf::REST);
    for (i, member) in members.iter().enumerate() {
        let next = if i + 1 == members.len() {
            Term::iri(rdf::NIL)
        } else {
            canonical_cell(base, i + 1)
        };
        graph.insert(Triple::new(canonical_cell(base, i), first.clone(), member.clone()));
        graph.insert(Triple::new(canonical_cell(base, i), rest.clone(), next));
    }
}

struct PlannedList {
    head: Term,
    hash: String,
    members: Vec<Term>,
    in_order: bool,
    ground: bool,
}

/// Points every list-bearing reference to one of `heads` at a canonical head.
///
/// Heads whose members are all IRIs or literals share one `_:L_<hash>` list
/// per member sequence, materialized once if the graph does not already
/// contain it. A list holding blank nodes is never merged with another: the
/// members are distinct nodes even when they describe the same thing, so
/// each such head gets its own `_:L_<hash>` or `_:L_<hash>-<n>` list. A head
/// that already is one of those, in sorted order, keeps its name. Empty and
/// malformed lists are skipped. Returns the number of references rewired and
/// the mapping from each original head to its canonical head.
pub fn determinize_list_heads(
    graph: &mut Graph,
    heads: &BTreeSet<Term>,
    prefixes: &PrefixTable,
    log_every: usize,
    diagnostics: &mut Diagnostics,
) -> (usize, BTreeMap<Term, Term>) {
    let references: Vec<Triple> = LIST_PROPERTIES
        .iter()
        .flat_map(|p| graph.triples_matching(None, Some(&Term::iri(p)), None))
        .filter(|t| heads.contains(&t.o))
        .collect();
    tracing::info!(heads = heads.len(), references = references.len(), "determinizing list heads");

    let mut planned = Vec::new();
    {
        let mut keys = MemberKeys::new(graph, prefixes);
        for head in heads {
            let Some(chain) = collect_or_report(graph, head, prefixes, diagnostics) else {
                continue;
            };
            if chain.is_empty() {
                continue;
            }
            let (sorted_keys, members): (Vec<String>, Vec<Term>) = keys.sorted(&chain.members).into_iter().unzip();
            planned.push(PlannedList {
                head: head.clone(),
                hash: hash_keys(&sorted_keys),
                in_order: members == chain.members,
                ground: !members.iter().any(Term::is_blank),
                members,
            });
        }
    }

    let mut mapping: BTreeMap<Term, Term> = BTreeMap::new();
    let mut claimed: BTreeSet<Term> = BTreeSet::new();
    for list in planned.iter().filter(|l| !l.ground && l.in_order) {
        if is_canonical_head(&list.head, &list.hash) && claimed.insert(list.head.clone()) {
            mapping.insert(list.head.clone(), list.head.clone());
        }
    }
    for list in &planned {
        if mapping.contains_key(&list.head) {
            continue;
        }
        let canonical = if list.ground {
            let base = canonical_base(&list.hash, 0);
            let canonical = canonical_cell(&base, 0);
            if !has_cells(graph, &canonical) {
                materialize(graph, &base, &list.members);
            }
            canonical
        } else {
            let mut n = 0;
            while claimed.contains(&canonical_cell(&canonical_base(&list.hash, n), 0))
                || has_cells(graph, &canonical_cell(&canonical_base(&list.hash, n), 0))
            {
                n += 1;
            }
            let base = canonical_base(&list.hash, n);
            materialize(graph, &base, &list.members);
            let canonical = canonical_cell(&base, 0);
            claimed.insert(canonical.clone());
            canonical
        };
        mapping.insert(list.head.clone(), canonical);
    }

    let mut rewired = 0;
    for (i, reference) in references.iter().enumerate() {
        if let Some(canonical) = mapping.get(&reference.o) {
            if canonical != &reference.o {
                graph.insert(Triple::new(reference.s.clone(), reference.p.clone(), canonical.clone()));
                graph.remove(reference);
                rewired += 1;
            }
        }
        heartbeat("heads", i + 1, references.len(), log_every, rewired);
    }
    let canonical_lists = mapping.values().collect::<BTreeSet<_>>().len();
    tracing::info!(rewired, canonical_lists, "list references rewired");
    (rewired, mapping)
}

/// Removes the list structure of replaced heads that are no longer referenced.
///
/// Only `rdf:first` and `rdf:rest` triples are removed. The walk stops at
/// `rdf:nil`, at a cell already visited, at any cell a list-bearing property
/// still points at, and at any cell another remaining `rdf:rest` edge still
/// leads to. Returns the number of triples removed.
pub fn prune_orphan_lists(
    graph: &mut Graph,
    original_heads: &BTreeSet<Term>,
    head_to_canonical: &BTreeMap<Term, Term>,
    log_every: usize,
) -> usize {
    let replaced: Vec<&Term> = head_to_canonical
        .iter()
        .filter(|(head, canonical)| head != canonical && original_heads.contains(*head))
        .map(|(head, _)| head)
        .collect();
    if replaced.is_empty() {
        tracing::info!("no replaced list heads to prune");
        return 0;
    }

    let still_referenced = list_heads(graph);
    let orphans: Vec<&Term> = replaced
        .into_iter()
        .filter(|h| !still_referenced.contains(*h))
        .collect();
    tracing::info!(candidates = orphans.len(), "pruning orphan lists");

    let first = Term::iri(rdf::FIRST);
    let rest = Term::iri(rdf::REST);
    let mut removed = 0;
    let mut visited = BTreeSet::new();
    for (i, head) in orphans.iter().enumerate() {
        let mut cell = (*head).clone();
        loop {
            if cell.is(rdf::NIL) || !cell.is_resource() || visited.contains(&cell) {
                break;
            }
            if (&cell != *head && still_referenced.contains(&cell)) || !graph.subjects(&rest, &cell).is_empty() {
                break;
            }
            visited.insert(cell.clone());
            let next = graph.objects(&cell, &rest);
            for t in graph
                .triples_matching(Some(&cell), Some(&first), None)
                .into_iter()
                .chain(graph.triples_matching(Some(&cell), Some(&rest), None))
            {
                if graph.remove(&t) {
                    removed += 1;
                }
            }
            match <[Term; 1]>::try_from(next) {
                Ok([n]) => cell = n,
                Err(_) => break,
            }
        }
        heartbeat("prune", i + 1, orphans.len(), log_every, removed);
    }
    tracing::info!(removed, "orphan list triples removed");
    removed
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use owldiff_graph::parser::parse_str;
    use owldiff_graph::Format;

    fn ttl(body: &str) -> Graph {
        let doc = format!(
            "@prefix ex: <http://example.org/> .\n\
             @prefix owl: <http://www.w3.org/2002/07/owl#> .\n\
             @prefix rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#> .\n{body}"
        );
        parse_str(&doc, Format::Turtle, "test").expect("fixture parses")
    }

    fn ex(local: &str) -> Term {
        Term::iri(format!("http://example.org/{local}"))
    }

    fn union_head(g: &Graph, class: &str) -> Term {
        let heads = g.objects(&ex(class), &Term::iri(owl::UNION_OF));
        assert_eq!(heads.len(), 1);
        heads[0].clone()
    }

    #[test]
    fn collects_well_formed_list() {
        let g = ttl("ex:C owl:unionOf ( ex:B ex:A ) .");
        let chain = collect_list(&g, &union_head(&g, "C"));
        assert_eq!(chain.map(|c| c.members), Ok(vec![ex("B"), ex("A")]));
    }

    #[test]
    fn nil_is_the_empty_list() {
        let chain = collect_list(&Graph::new(), &Term::iri(rdf::NIL));
        assert!(chain.is_ok_and(|c| c.is_empty()));
    }

    #[test]
    fn detects_malformations() {
        let h = Term::blank("h");
        let cases = [
            ("ex:C owl:unionOf _:h . _:h rdf:first ex:A .", MalformedList::MissingTerminator),
            ("_:h rdf:first ex:A , ex:B ; rdf:rest rdf:nil .", MalformedList::MultipleFirst),
            ("_:h rdf:rest rdf:nil .", MalformedList::MissingFirst),
            ("_:h rdf:first ex:A ; rdf:rest _:a , _:b .", MalformedList::MultipleRest),
            (
                "_:h rdf:first ex:A ; rdf:rest _:t . _:t rdf:first ex:B ; rdf:rest _:h .",
                MalformedList::Cycle,
            ),
            ("_:h rdf:first ex:A ; rdf:rest \"x\" .", MalformedList::LiteralCell),
        ];
        for (body, reason) in cases {
            assert_eq!(collect_list(&ttl(body), &h), Err(reason), "{body}");
        }
    }

    #[test]
    fn shared_cells_are_walkable_but_not_exclusive() {
        let g = ttl(
            "_:h rdf:first ex:A ; rdf:rest _:t . _:t rdf:first ex:B ; rdf:rest rdf:nil .\n\
             _:g rdf:first ex:C ; rdf:rest _:t .",
        );
        for (head, members) in [("h", vec![ex("A"), ex("B")]), ("t", vec![ex("B")])] {
            let chain = collect_list(&g, &Term::blank(head)).expect("well-formed");
            assert_eq!(chain.members, members);
            assert_eq!(check_exclusive(&g, &chain), Err(MalformedList::SharedCell));
        }
        let alone = ttl("ex:C owl:unionOf ( ex:A ex:B ) .");
        let chain = collect_list(&alone, &union_head(&alone, "C")).expect("well-formed");
        assert_eq!(check_exclusive(&alone, &chain), Ok(()));
    }

    #[test]
    fn sorts_members_in_place() {
        let mut g = ttl("ex:C owl:unionOf ( ex:B ex:A ) . ");
        let head = union_head(&g, "C");
        let mut d = Diagnostics::new();
        let (rewritten, heads) = canonicalize_all_lists(&mut g, &PrefixTable::default(), 0, &mut d);
        assert_eq!(rewritten, 2);
        assert!(heads.contains(&head));
        assert_eq!(collect_list(&g, &head).map(|c| c.members), Ok(vec![ex("A"), ex("B")]));
        assert!(d.is_empty());

        let (again, _) = canonicalize_all_lists(&mut g, &PrefixTable::default(), 0, &mut d);
        assert_eq!(again, 0);
    }

    #[test]
    fn duplicate_members_are_kept() {
        let mut g = ttl("ex:C owl:oneOf ( ex:B ex:A ex:B ) .");
        let head = g.objects(&ex("C"), &Term::iri(owl::ONE_OF))[0].clone();
        let mut d = Diagnostics::new();
        canonicalize_all_lists(&mut g, &PrefixTable::default(), 0, &mut d);
        assert_eq!(
            collect_list(&g, &head).map(|c| c.members),
            Ok(vec![ex("A"), ex("B"), ex("B")])
        );
    }

    #[test]
    fn equal_lists_share_one_canonical_head() {
        let mut g = ttl(
            "ex:C owl:unionOf ( ex:A ex:B ) .\n\
             ex:D owl:unionOf ( ex:B ex:A ) .",
        );
        let prefixes = PrefixTable::default();
        let mut d = Diagnostics::new();
        let (_, heads) = canonicalize_all_lists(&mut g, &prefixes, 0, &mut d);
        let (rewired, mapping) = determinize_list_heads(&mut g, &heads, &prefixes, 0, &mut d);
        assert_eq!(rewired, 2);
        assert_eq!(mapping.len(), 2);

        let c = union_head(&g, "C");
        assert_eq!(c, union_head(&g, "D"));
        let label = c.as_blank().expect("canonical head is blank").as_str();
        assert!(label.starts_with(CANONICAL_PREFIX));
        assert_eq!(label.len(), CANONICAL_PREFIX.len() + 64);
        assert_eq!(collect_list(&g, &c).map(|l| l.members), Ok(vec![ex("A"), ex("B")]));
    }

    #[test]
    fn canonical_head_is_content_addressed() {
        let g = Graph::new();
        let prefixes = PrefixTable::default();
        let mut keys = MemberKeys::new(&g, &prefixes);
        let hash = list_hash(&mut keys, &[ex("B"), ex("A")]);
        assert_eq!(hash, list_hash(&mut keys, &[ex("A"), ex("B")]));
        assert_ne!(hash, list_hash(&mut keys, &[ex("A"), ex("B"), ex("D")]));
    }

    #[test]
    fn blank_members_are_keyed_by_what_they_describe() {
        let prefixes = PrefixTable::default();
        let g = ttl(
            "ex:C owl:intersectionOf ( _:r1 _:r2 ) .\n\
             _:r1 owl:onProperty ex:p ; owl:someValuesFrom ex:A .\n\
             _:r2 owl:onProperty ex:q ; owl:allValuesFrom ex:B .",
        );
        let mut keys = MemberKeys::new(&g, &prefixes);
        let (k1, k2) = (keys.key(&Term::blank("r1")), keys.key(&Term::blank("r2")));
        assert_ne!(k1, k2);
        assert_eq!(k1.len(), "_:".len() + 64);

        // labels swapped, so the list holds the members the other way round
        let swapped = ttl(
            "ex:C owl:intersectionOf ( _:r1 _:r2 ) .\n\
             _:r2 owl:onProperty ex:p ; owl:someValuesFrom ex:A .\n\
             _:r1 owl:onProperty ex:q ; owl:allValuesFrom ex:B .",
        );
        let mut other = MemberKeys::new(&swapped, &prefixes);
        assert_eq!(other.key(&Term::blank("r2")), k1);
        assert_eq!(other.key(&Term::blank("r1")), k2);
    }

    #[test]
    fn nested_lists_are_keyed_as_sets() {
        let prefixes = PrefixTable::default();
        let a = ttl("ex:C owl:unionOf ( _:r ) . _:r owl:intersectionOf ( ex:A ex:B ) .");
        let b = ttl("ex:C owl:unionOf ( _:r ) . _:r owl:intersectionOf ( ex:B ex:A ) .");
        let key_a = MemberKeys::new(&a, &prefixes).key(&Term::blank("r"));
        let key_b = MemberKeys::new(&b, &prefixes).key(&Term::blank("r"));
        assert_eq!(key_a, key_b);
    }

    #[test]
    fn lists_of_blank_nodes_are_never_merged() {
        let restriction = "[ owl:onProperty ex:p ; owl:someValuesFrom ex:A ]";
        let mut g = ttl(&format!(
            "ex:C owl:intersectionOf ( {restriction} ) .\n\
             ex:D owl:intersectionOf ( {restriction} ) ."
        ));
        let prefixes = PrefixTable::default();
        let mut d = Diagnostics::new();
        let (_, heads) = canonicalize_all_lists(&mut g, &prefixes, 0, &mut d);
        let (rewired, mapping) = determinize_list_heads(&mut g, &heads, &prefixes, 0, &mut d);
        prune_orphan_lists(&mut g, &heads, &mapping, 0);
        assert_eq!(rewired, 2);

        let label = |class: &str| {
            let head = g.objects(&ex(class), &Term::iri(owl::INTERSECTION_OF))[0].clone();
            head.as_blank().expect("blank head").as_str().to_owned()
        };
        let mut labels = [label("C"), label("D")];
        labels.sort();
        assert!(labels[0].starts_with(CANONICAL_PREFIX));
        assert_eq!(labels[1], format!("{}-1", labels[0]));

        // the second pass keeps both names
        let before = g.clone();
        let (_, heads) = canonicalize_all_lists(&mut g, &prefixes, 0, &mut d);
        let (rewired, mapping) = determinize_list_heads(&mut g, &heads, &prefixes, 0, &mut d);
        assert_eq!(rewired, 0);
        assert!(mapping.iter().all(|(h, c)| h == c));
        assert_eq!(g, before);
    }

    #[test]
    fn shared_tail_gets_its_own_list() {
        let mut g = ttl(
            "ex:C owl:unionOf _:a . _:a rdf:first ex:B ; rdf:rest _:b .\n\
             _:b rdf:first ex:A ; rdf:rest rdf:nil .\n\
             ex:D owl:hasKey _:b .",
        );
        let prefixes = PrefixTable::default();
        let mut d = Diagnostics::new();
        let (rewritten, heads) = canonicalize_all_lists(&mut g, &prefixes, 0, &mut d);
        // sorting _:a in place would change the list of ex:D
        assert_eq!(rewritten, 0);
        let (rewired, mapping) = determinize_list_heads(&mut g, &heads, &prefixes, 0, &mut d);
        assert_eq!(rewired, 2);
        assert_eq!(prune_orphan_lists(&mut g, &heads, &mapping, 0), 4);
        assert!(d.is_empty());

        let key = g.objects(&ex("D"), &Term::iri(owl::HAS_KEY))[0].clone();
        assert_eq!(collect_list(&g, &key).map(|c| c.members), Ok(vec![ex("A")]));
        assert_eq!(collect_list(&g, &union_head(&g, "C")).map(|c| c.members), Ok(vec![ex("A"), ex("B")]));
        assert!(g.triples_matching(Some(&Term::blank("b")), None, None).is_empty());
    }

    #[test]
    fn pruning_stops_where_another_chain_continues() {
        let mut g = ttl(
            "ex:C owl:unionOf _:h . _:h rdf:first ex:B ; rdf:rest _:t .\n\
             _:t rdf:first ex:A ; rdf:rest rdf:nil .\n\
             _:x rdf:first ex:Z ; rdf:rest _:t .",
        );
        let prefixes = PrefixTable::default();
        let mut d = Diagnostics::new();
        let (_, heads) = canonicalize_all_lists(&mut g, &prefixes, 0, &mut d);
        let (_, mapping) = determinize_list_heads(&mut g, &heads, &prefixes, 0, &mut d);
        assert_eq!(prune_orphan_lists(&mut g, &heads, &mapping, 0), 2);
        let t = Term::blank("t");
        assert_eq!(g.objects(&t, &Term::iri(rdf::FIRST)), vec![ex("A")]);
        assert_eq!(g.objects(&Term::blank("x"), &Term::iri(rdf::REST)), vec![t]);
    }

    #[test]
    fn malformed_and_empty_lists_are_skipped() {
        let mut g = ttl(
            "ex:C owl:unionOf _:h . _:h rdf:first ex:A .\n\
             ex:E owl:unionOf () .",
        );
        let before = g.clone();
        let prefixes = PrefixTable::default();
        let mut d = Diagnostics::new();
        let (_, heads) = canonicalize_all_lists(&mut g, &prefixes, 0, &mut d);
        let (rewired, mapping) = determinize_list_heads(&mut g, &heads, &prefixes, 0, &mut d);
        assert_eq!(rewired, 0);
        assert!(mapping.is_empty());
        assert_eq!(g, before);
        assert_eq!(d.len(), 1);
    }

    #[test]
    fn prunes_only_list_structure() {
        let mut g = ttl(
            "ex:C owl:unionOf _:h .\n\
             _:h rdf:first ex:B ; rdf:rest _:t ; ex:note \"kept\" .\n\
             _:t rdf:first ex:A ; rdf:rest rdf:nil .",
        );
        let prefixes = PrefixTable::default();
        let mut d = Diagnostics::new();
        let (_, heads) = canonicalize_all_lists(&mut g, &prefixes, 0, &mut d);
        let (_, mapping) = determinize_list_heads(&mut g, &heads, &prefixes, 0, &mut d);
        let removed = prune_orphan_lists(&mut g, &heads, &mapping, 0);
        assert_eq!(removed, 4);

        let h = Term::blank("h");
        let t = Term::blank("t");
        assert!(g.triples_matching(Some(&t), None, None).is_empty());
        assert_eq!(g.triples_matching(Some(&h), None, None).len(), 1);
        assert_eq!(g.objects(&h, &ex("note")), vec![Term::string("kept")]);
        // ex:C unionOf L, L first A, L rest L_1, L_1 first B, L_1 rest nil, note
        assert_eq!(g.len(), 6);
    }

    #[test]
    fn still_referenced_heads_are_not_pruned() {
        let g0 = ttl("ex:C owl:unionOf ( ex:A ) .");
        let head = union_head(&g0, "C");
        let mut g = g0.clone();
        g.insert(Triple::new(ex("D"), Term::iri(owl::INTERSECTION_OF), head.clone()));
        let canonical = Term::blank("L_x");
        let mapping = BTreeMap::from([(head.clone(), canonical)]);
        let heads = BTreeSet::from([head]);
        assert_eq!(prune_orphan_lists(&mut g, &heads, &mapping, 0), 0);
    }
}
