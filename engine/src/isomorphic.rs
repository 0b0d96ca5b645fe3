//! Canonical blank node labelling.
//!
//! [`CanonicalGraph`] relabels every blank node from the structure around it,
//! so two isomorphic graphs become triple-for-triple equal and can be compared
//! with plain set operations.
//!
//! Blank nodes are split into connected components (blank nodes joined by a
//! triple). Within a component, node colours start uniform and are refined by
//! hashing each node's colour with the sorted colours and ground terms of its
//! incoming and outgoing edges, until the number of colours stops growing.
//! Nodes that still share a colour are separated by individualizing each
//! member of the smallest tied class in turn and keeping the branch whose
//! relabelled N-Triples are smallest.
//!
//! # Accuracy
//!
//! Isomorphic graphs always get equal canonical forms as long as the branch
//! budget is not exhausted. The budget is only reached on large, highly
//! regular components, which do not occur in OWL ontologies; when it is, the
//! first branch is kept and a `debug` event is emitted.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use owldiff_graph::serializer::ntriples::term_string;
use owldiff_graph::{BlankId, Graph, Term, Triple};
use sha2::{Digest, Sha256};

type Color = [u8; 32];

/// Branches explored per component before settling for the first one.
const BRANCH_BUDGET: usize = 1024;

/// Length of the hex part of a canonical label.
const LABEL_HEX_LEN: usize = 32;

/// A graph whose blank nodes carry content-derived labels.
#[derive(Debug, Clone)]
pub struct CanonicalGraph {
    graph: Graph,
    labels: BTreeMap<BlankId, BlankId>,
}

impl CanonicalGraph {
    /// Relabels every blank node of `graph`.
    #[must_use]
    pub fn new(graph: &Graph) -> Self {
        let components = Component::split(graph);
        tracing::debug!(components = components.len(), "canonicalizing blank nodes");

        let mut labelled: Vec<(String, Vec<(BlankId, String)>)> = components
            .iter()
            .map(|component| {
                let mut budget = BRANCH_BUDGET;
                let (signature, colors) =
                    component.search(vec![[0u8; 32]; component.nodes.len()], &mut budget);
                if budget == 0 {
                    tracing::debug!(nodes = component.nodes.len(), "branch budget exhausted");
                }
                let component_hash = Sha256::digest(signature.as_bytes());
                let labels = component
                    .nodes
                    .iter()
                    .zip(&colors)
                    .map(|(node, color)| {
                        let mut h = Sha256::new();
                        h.update(component_hash);
                        h.update(color);
                        let hex = hex(&finish(h));
                        (node.clone(), format!("c{}", &hex[..LABEL_HEX_LEN]))
                    })
                    .collect();
                (signature, labels)
            })
            .collect();

        // identical components would collapse into one; keep them apart
        labelled.sort_by(|a, b| a.0.cmp(&b.0));
        let mut labels = BTreeMap::new();
        let mut previous: Option<&str> = None;
        let mut ordinal = 0;
        for (signature, nodes) in &labelled {
            ordinal = if previous == Some(signature.as_str()) {
                ordinal + 1
            } else {
                0
            };
            previous = Some(signature);
            for (node, label) in nodes {
                let label = if ordinal == 0 {
                    label.clone()
                } else {
                    format!("{label}_{ordinal}")
                };
                labels.insert(node.clone(), BlankId::new(label));
            }
        }

        let relabel = |term: &Term| match term {
            Term::Blank(b) => labels.get(b).cloned().map_or_else(|| term.clone(), Term::Blank),
            _ => term.clone(),
        };
        let graph = graph
            .iter()
            .map(|t| Triple::new(relabel(&t.s), t.p.clone(), relabel(&t.o)))
            .collect();
        Self { graph, labels }
    }

    /// The relabelled graph.
    #[must_use]
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Consumes `self`, returning the relabelled graph.
    #[must_use]
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// The canonical label given to an input blank node.
    #[must_use]
    pub fn label(&self, original: &BlankId) -> Option<&BlankId> {
        self.labels.get(original)
    }
}

/// True if the two graphs are equal up to blank node renaming.
#[must_use]
pub fn isomorphic(a: &Graph, b: &Graph) -> bool {
    a.len() == b.len()
        && a.blank_nodes().len() == b.blank_nodes().len()
        && CanonicalGraph::new(a).graph == CanonicalGraph::new(b).graph
}

enum Neighbor {
    Ground(String),
    Node(usize),
}

struct Edge {
    outgoing: bool,
    predicate: String,
    other: Neighbor,
}

/// Blank nodes connected through blank-to-blank triples, with every triple
/// that mentions one of them.
struct Component<'g> {
    nodes: Vec<BlankId>,
    index: HashMap<BlankId, usize>,
    edges: Vec<Vec<Edge>>,
    triples: Vec<&'g Triple>,
}

impl<'g> Component<'g> {
    fn split(graph: &'g Graph) -> Vec<Component<'g>> {
        let blanks: Vec<BlankId> = graph.blank_nodes().into_iter().collect();
        let global: HashMap<&BlankId, usize> = blanks.iter().enumerate().map(|(i, b)| (b, i)).collect();

        let mut parent: Vec<usize> = (0..blanks.len()).collect();
        for t in graph {
            if let (Some(s), Some(o)) = (t.s.as_blank(), t.o.as_blank()) {
                if let (Some(&a), Some(&b)) = (global.get(s), global.get(o)) {
                    let (ra, rb) = (find(&mut parent, a), find(&mut parent, b));
                    if ra != rb {
                        parent[ra.max(rb)] = ra.min(rb);
                    }
                }
            }
        }

        let mut by_root: BTreeMap<usize, Component<'g>> = BTreeMap::new();
        for (i, blank) in blanks.iter().enumerate() {
            let root = find(&mut parent, i);
            let c = by_root.entry(root).or_insert_with(|| Component {
                nodes: Vec::new(),
                index: HashMap::new(),
                edges: Vec::new(),
                triples: Vec::new(),
            });
            c.index.insert(blank.clone(), c.nodes.len());
            c.nodes.push(blank.clone());
            c.edges.push(Vec::new());
        }

        for t in graph {
            let anchor = t.s.as_blank().or_else(|| t.o.as_blank());
            let Some(root) = anchor.and_then(|b| global.get(b)).map(|&i| find(&mut parent, i)) else {
                continue;
            };
            let Some(c) = by_root.get_mut(&root) else {
                continue;
            };
            c.triples.push(t);
            let predicate = term_string(&t.p);
            let s = t.s.as_blank().and_then(|b| c.index.get(b)).copied();
            let o = t.o.as_blank().and_then(|b| c.index.get(b)).copied();
            if let Some(s) = s {
                let other = o.map_or_else(|| Neighbor::Ground(term_string(&t.o)), Neighbor::Node);
                c.edges[s].push(Edge {
                    outgoing: true,
                    predicate: predicate.clone(),
                    other,
                });
            }
            if let Some(o) = o {
                let other = s.map_or_else(|| Neighbor::Ground(term_string(&t.s)), Neighbor::Node);
                c.edges[o].push(Edge {
                    outgoing: false,
                    predicate,
                    other,
                });
            }
        }
        by_root.into_values().collect()
    }

    /// Refines `colors` until the partition is stable.
    fn refine(&self, colors: &mut Vec<Color>) {
        let mut classes = distinct(colors);
        loop {
            let next: Vec<Color> = self
                .edges
                .iter()
                .enumerate()
                .map(|(i, edges)| {
                    let mut parts: Vec<String> = edges
                        .iter()
                        .map(|e| {
                            let other = match &e.other {
                                Neighbor::Ground(term) => term.clone(),
                                Neighbor::Node(j) => hex(&colors[*j]),
                            };
                            if e.outgoing {
                                format!("+{} {}", e.predicate, other)
                            } else {
                                format!("-{} {}", other, e.predicate)
                            }
                        })
                        .collect();
                    parts.sort_unstable();
                    let mut h = Sha256::new();
                    h.update(colors[i]);
                    for part in parts {
                        h.update(b"|");
                        h.update(part.as_bytes());
                    }
                    finish(h)
                })
                .collect();
            let n = distinct(&next);
            *colors = next;
            if n <= classes {
                break;
            }
            classes = n;
        }
    }

    /// Smallest class of nodes sharing a colour, ties broken by colour.
    fn smallest_tied_class(colors: &[Color]) -> Option<Vec<usize>> {
        let mut classes: BTreeMap<&Color, Vec<usize>> = BTreeMap::new();
        for (i, c) in colors.iter().enumerate() {
            classes.entry(c).or_default().push(i);
        }
        classes
            .into_values()
            .filter(|members| members.len() > 1)
            .min_by_key(Vec::len)
    }

    /// Returns the smallest signature reachable from `colors` and its colouring.
    fn search(&self, mut colors: Vec<Color>, budget: &mut usize) -> (String, Vec<Color>) {
        self.refine(&mut colors);
        let Some(class) = Self::smallest_tied_class(&colors) else {
            return (self.signature(&colors), colors);
        };
        let mut best: Option<(String, Vec<Color>)> = None;
        for (k, &member) in class.iter().enumerate() {
            if k > 0 && *budget == 0 {
                break;
            }
            *budget = budget.saturating_sub(1);
            let mut branch = colors.clone();
            let mut h = Sha256::new();
            h.update(branch[member]);
            h.update(b"!");
            branch[member] = finish(h);
            let candidate = self.search(branch, budget);
            if best.as_ref().map_or(true, |(sig, _)| candidate.0 < *sig) {
                best = Some(candidate);
            }
        }
        best.unwrap_or_else(|| (self.signature(&colors), colors))
    }

    /// Sorted N-Triples of the component with blank nodes written as colours.
    fn signature(&self, colors: &[Color]) -> String {
        let term = |t: &Term| match t.as_blank().and_then(|b| self.index.get(b)) {
            Some(&i) => format!("_:{}", hex(&colors[i])),
            None => term_string(t),
        };
        let lines: BTreeSet<String> = self
            .triples
            .iter()
            .map(|t| format!("{} {} {} .", term(&t.s), term(&t.p), term(&t.o)))
            .collect();
        lines.into_iter().collect::<Vec<_>>().join("\n")
    }
}

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

fn distinct(colors: &[Color]) -> usize {
    colors.iter().collect::<HashSet<_>>().len()
}

fn finish(h: Sha256) -> Color {
    let mut color = [0u8; 32];
    color.copy_from_slice(&h.finalize());
    color
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
