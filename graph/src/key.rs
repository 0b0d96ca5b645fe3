//! Canonical term keys.
//!
//! [`PrefixTable::key`] renders a term as a deterministic string: the
//! shortest bound `prefix:local` form for an IRI (else `<iri>`), a quoted
//! lexical form with `@lang` or `^^datatype` for a literal, and `_:label`
//! for a blank node. Keys are used to sort list members, orient symmetric
//! edges, and hash list content. The table is fixed for a whole run so both
//! graphs of a diff get identical keys for identical terms.

use std::collections::BTreeMap;

use crate::model::{Iri, Literal, Term};

/// Prefix bindings used for canonical keys and Turtle output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixTable {
    bindings: BTreeMap<String, String>,
}

/// Bindings present in every table.
pub const DEFAULT_PREFIXES: &[(&str, &str)] = &[
    ("dc", "http://purl.org/dc/elements/1.1/"),
    ("dcterms", "http://purl.org/dc/terms/"),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
    ("owl", "http://www.w3.org/2002/07/owl#"),
    ("prov", "http://www.w3.org/ns/prov#"),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("schema", "https://schema.org/"),
    ("sh", "http://www.w3.org/ns/shacl#"),
    ("skos", "http://www.w3.org/2004/02/skos/core#"),
    ("vann", "http://purl.org/vocab/vann/"),
    ("xml", "http://www.w3.org/XML/1998/namespace"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
];

impl Default for PrefixTable {
    fn default() -> Self {
        Self {
            bindings: DEFAULT_PREFIXES
                .iter()
                .map(|(p, ns)| ((*p).to_owned(), (*ns).to_owned()))
                .collect(),
        }
    }
}

impl PrefixTable {
    /// A table with no bindings: every IRI renders in `<…>` form.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }

    /// Adds or replaces a binding.
    #[must_use]
    pub fn with_binding(mut self, prefix: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.bind(prefix, namespace);
        self
    }

    /// Adds or replaces a binding in place.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.bindings.insert(prefix.into(), namespace.into());
    }

    /// Iterates over `(prefix, namespace)` in prefix order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings.iter().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    /// The namespace bound to `prefix`.
    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.bindings.get(prefix).map(String::as_str)
    }

    /// Shortest `(prefix, local)` split of `iri`, if any binding applies.
    ///
    /// Bindings whose prefix is not a Turtle prefix name are never used. Ties on length go to the lexicographically smaller rendering.
    #[must_use]
    pub fn compact<'a>(&'a self, iri: &'a str) -> Option<(&'a str, &'a str)> {
        self.bindings
            .iter()
            .filter(|(prefix, _)| is_prefix_name(prefix))
            .filter_map(|(prefix, ns)| {
                let local = iri.strip_prefix(ns.as_str())?;
                is_local_name(local).then_some((prefix.as_str(), local))
            })
            .min_by(|(pa, la), (pb, lb)| {
                (pa.len() + la.len())
                    .cmp(&(pb.len() + lb.len()))
                    .then_with(|| (pa, la).cmp(&(pb, lb)))
            })
    }

    /// Canonical key of a term.
    #[must_use]
    pub fn key(&self, term: &Term) -> String {
        match term {
            Term::Iri(iri) => self.iri_key(iri),
            Term::Blank(id) => format!("_:{}", id.as_str()),
            Term::Literal(lit) => self.literal_key(lit),
        }
    }

    fn iri_key(&self, iri: &Iri) -> String {
        match self.compact(iri.as_str()) {
            Some((prefix, local)) => format!("{prefix}:{local}"),
            None => format!("<{}>", iri.as_str()),
        }
    }

    fn literal_key(&self, lit: &Literal) -> String {
        let mut key = String::with_capacity(lit.lexical().len() + 2);
        key.push('"');
        escape_into(&mut key, lit.lexical());
        key.push('"');
        if let Some(lang) = lit.language() {
            key.push('@');
            key.push_str(lang);
        } else if let Some(dt) = lit.datatype() {
            key.push_str("^^");
            key.push_str(&self.iri_key(dt));
        }
        key
    }
}

/// Appends `s` with `\`, `"`, and control characters escaped as in N-Triples.
pub fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", u32::from(c))),
            c => out.push(c),
        }
    }
}

/// `PN_CHARS_BASE` of the Turtle grammar.
fn is_pn_chars_base(c: char) -> bool {
    matches!(c,
        'A'..='Z'
        | 'a'..='z'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{02FF}'
        | '\u{0370}'..='\u{037D}'
        | '\u{037F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// `PN_CHARS` of the Turtle grammar.
fn is_pn_chars(c: char) -> bool {
    is_pn_chars_base(c)
        || matches!(c,
            '_' | '-' | '0'..='9' | '\u{00B7}' | '\u{0300}'..='\u{036F}' | '\u{203F}'..='\u{2040}')
}

/// True if `prefix` can be written as `prefix:` in Turtle (`PN_PREFIX`, or empty).
#[must_use]
pub fn is_prefix_name(prefix: &str) -> bool {
    let mut chars = prefix.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    is_pn_chars_base(first) && !prefix.ends_with('.') && chars.all(|c| is_pn_chars(c) || c == '.')
}

/// Conservative `PN_LOCAL` check: a local name that round-trips through
/// Turtle without escapes.
fn is_local_name(local: &str) -> bool {
    let mut chars = local.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(is_pn_chars_base(first) || first == '_' || first.is_ascii_digit()) {
        return false;
    }
    if local.ends_with('.') {
        return false;
    }
    chars.all(|c| is_pn_chars(c) || c == '.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{owl, xsd};

    #[test]
    fn iri_uses_bound_prefix() {
        let table = PrefixTable::default();
        assert_eq!(table.key(&Term::iri(owl::UNION_OF)), "owl:unionOf");
    }

    #[test]
    fn unbound_iri_is_bracketed() {
        let table = PrefixTable::default();
        assert_eq!(
            table.key(&Term::iri("http://example.org/A")),
            "<http://example.org/A>"
        );
    }

    #[test]
    fn shortest_prefix_wins() {
        let table = PrefixTable::empty()
            .with_binding("long", "http://example.org/")
            .with_binding("s", "http://example.org/ns/");
        assert_eq!(table.key(&Term::iri("http://example.org/ns/A")), "s:A");
        assert_eq!(table.key(&Term::iri("http://example.org/B")), "long:B");
    }

    #[test]
    fn invalid_local_name_falls_back() {
        let table = PrefixTable::empty().with_binding("ex", "http://example.org/");
        assert_eq!(
            table.key(&Term::iri("http://example.org/a/b")),
            "<http://example.org/a/b>"
        );
        assert_eq!(table.key(&Term::iri("http://example.org/")), "<http://example.org/>");
    }

    #[test]
    fn local_names_follow_turtle_character_classes() {
        let table = PrefixTable::empty().with_binding("ex", "http://example.org/");
        for local in ["A", "a1", "_x", "1a", "caf\u{e9}", "a-b.c", "a\u{b7}b"] {
            let iri = format!("http://example.org/{local}");
            assert_eq!(table.key(&Term::iri(&iri)), format!("ex:{local}"), "{local}");
        }
        // feminine ordinal, superscript two, trailing dot, leading hyphen
        for local in ["\u{aa}", "a\u{b2}", "a.", "-a", "a b"] {
            let iri = format!("http://example.org/{local}");
            assert_eq!(table.key(&Term::iri(&iri)), format!("<{iri}>"), "{local}");
        }
    }

    #[test]
    fn prefix_names() {
        for ok in ["", "ex", "e.x", "dc11", "caf\u{e9}"] {
            assert!(is_prefix_name(ok), "{ok}");
        }
        for bad in ["1ex", "_ex", "ex.", "e x", "\u{b2}", "ex:"] {
            assert!(!is_prefix_name(bad), "{bad}");
        }
        let table = PrefixTable::empty().with_binding("1ex", "http://example.org/");
        assert_eq!(table.key(&Term::iri("http://example.org/A")), "<http://example.org/A>");
    }

    #[test]
    fn literal_keys() {
        let table = PrefixTable::default();
        assert_eq!(table.key(&Term::string("a \"b\"")), "\"a \\\"b\\\"\"");
        assert_eq!(
            table.key(&Literal::lang("chat", "FR").into()),
            "\"chat\"@fr"
        );
        assert_eq!(
            table.key(&Literal::typed("1", Iri::new(xsd::INTEGER)).into()),
            "\"1\"^^xsd:integer"
        );
    }

    #[test]
    fn blank_key_uses_label() {
        assert_eq!(PrefixTable::default().key(&Term::blank("b0")), "_:b0");
    }

    #[test]
    fn distinct_terms_distinct_keys() {
        let table = PrefixTable::default();
        let terms = [
            Term::string("x"),
            Literal::lang("x", "en").into(),
            Literal::typed("x", Iri::new(xsd::INTEGER)).into(),
            Term::iri("x"),
            Term::blank("x"),
        ];
        let keys: std::collections::BTreeSet<_> = terms.iter().map(|t| table.key(t)).collect();
        assert_eq!(keys.len(), terms.len());
    }
}
