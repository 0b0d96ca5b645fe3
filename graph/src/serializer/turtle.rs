//! Turtle 1.1 serializer.
//!
//! Subjects are written in canonical-key order with their predicates grouped
//! by `;` and objects by `,`. Only the prefixes that are actually used get an
//! `@prefix` line.

use std::collections::{BTreeMap, BTreeSet};

use crate::key::{escape_into, PrefixTable};
use crate::model::{Iri, Term};
use crate::store::Graph;
use crate::vocab::rdf;

/// Serializes a graph to a Turtle string.
///
/// # Errors
///
/// This function is infallible; it always returns a valid Turtle string.
#[must_use]
pub fn to_turtle(graph: &Graph, prefixes: &PrefixTable) -> String {
    let mut writer = Writer {
        prefixes,
        used: BTreeSet::new(),
    };

    // subject key -> predicate key -> object renderings
    let mut blocks: BTreeMap<String, (String, BTreeMap<(u8, String), BTreeSet<String>>)> =
        BTreeMap::new();
    for t in graph {
        let subject = writer.term(&t.s);
        let predicate = if t.p.is(rdf::TYPE) {
            (0, "a".to_owned())
        } else {
            (1, writer.term(&t.p))
        };
        let object = writer.term(&t.o);
        blocks
            .entry(prefixes.key(&t.s))
            .or_insert_with(|| (subject, BTreeMap::new()))
            .1
            .entry(predicate)
            .or_default()
            .insert(object);
    }

    let mut out = String::with_capacity(graph.len() * 64);
    for prefix in &writer.used {
        if let Some(ns) = prefixes.namespace(prefix) {
            out.push_str(&format!("@prefix {prefix}: <{ns}> .\n"));
        }
    }
    if !writer.used.is_empty() {
        out.push('\n');
    }

    for (subject, predicates) in blocks.into_values() {
        out.push_str(&subject);
        let count = predicates.len();
        for (i, ((_, predicate), objects)) in predicates.into_iter().enumerate() {
            out.push_str("\n    ");
            out.push_str(&predicate);
            out.push(' ');
            let objects: Vec<String> = objects.into_iter().collect();
            out.push_str(&objects.join(" ,\n        "));
            out.push_str(if i + 1 == count { " .\n" } else { " ;" });
        }
        out.push('\n');
    }

    out
}

struct Writer<'a> {
    prefixes: &'a PrefixTable,
    used: BTreeSet<String>,
}

impl Writer<'_> {
    fn term(&mut self, term: &Term) -> String {
        match term {
            Term::Iri(iri) => self.iri(iri),
            Term::Blank(id) => format!("_:{}", id.as_str()),
            Term::Literal(lit) => {
                let mut s = String::from("\"");
                escape_into(&mut s, lit.lexical());
                s.push('"');
                if let Some(lang) = lit.language() {
                    s.push('@');
                    s.push_str(lang);
                } else if let Some(dt) = lit.datatype() {
                    s.push_str("^^");
                    s.push_str(&self.iri(dt));
                }
                s
            }
        }
    }

    fn iri(&mut self, iri: &Iri) -> String {
        match self.prefixes.compact(iri.as_str()) {
            Some((prefix, local)) => {
                self.used.insert(prefix.to_owned());
                format!("{prefix}:{local}")
            }
            None => format!("<{}>", iri.as_str()),
        }
    }
}
