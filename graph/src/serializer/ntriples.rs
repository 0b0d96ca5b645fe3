//! N-Triples serializer.
//!
//! Produces one triple per line with absolute IRIs, sorted, so the output
//! of two equal graphs is byte-identical. That property is what the
//! line-set diff strategy relies on.

use crate::key::escape_into;
use crate::model::{Literal, Term, Triple};
use crate::store::Graph;

/// Serializes a graph to an N-Triples string with sorted lines.
///
/// # Errors
///
/// This function is infallible; it always returns a valid N-Triples string.
#[must_use]
pub fn to_ntriples(graph: &Graph) -> String {
    let mut lines: Vec<String> = graph.iter().map(triple_line).collect();
    lines.sort_unstable();
    let mut out = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

/// Renders one triple as an N-Triples line, without the trailing newline.
#[must_use]
pub fn triple_line(t: &Triple) -> String {
    let mut out = String::with_capacity(128);
    term(&mut out, &t.s);
    out.push(' ');
    term(&mut out, &t.p);
    out.push(' ');
    term(&mut out, &t.o);
    out.push_str(" .");
    out
}

/// Renders a single term in N-Triples syntax.
#[must_use]
pub fn term_string(t: &Term) -> String {
    let mut out = String::new();
    term(&mut out, t);
    out
}

fn term(out: &mut String, t: &Term) {
    match t {
        Term::Iri(iri) => {
            out.push('<');
            out.push_str(iri.as_str());
            out.push('>');
        }
        Term::Blank(id) => {
            out.push_str("_:");
            out.push_str(id.as_str());
        }
        Term::Literal(l) => lit(out, l),
    }
}

fn lit(out: &mut String, l: &Literal) {
    out.push('"');
    escape_into(out, l.lexical());
    out.push('"');
    if let Some(lang) = l.language() {
        out.push('@');
        out.push_str(lang);
    } else if let Some(dt) = l.datatype() {
        out.push_str("^^<");
        out.push_str(dt.as_str());
        out.push('>');
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Iri;
    use crate::vocab::xsd;

    fn sample() -> Graph {
        [
            Triple::new(
                Term::iri("http://example.org/s"),
                Term::iri("http://example.org/p"),
                Term::string("line\nbreak \"quoted\""),
            ),
            Triple::new(
                Term::blank("b0"),
                Term::iri("http://example.org/p"),
                Literal::typed("1", Iri::new(xsd::INTEGER)).into(),
            ),
            Triple::new(
                Term::blank("b0"),
                Term::iri("http://example.org/q"),
                Literal::lang("hi", "en").into(),
            ),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn every_line_ends_with_period() {
        let nt = to_ntriples(&sample());
        assert_eq!(nt.lines().count(), 3);
        for line in nt.lines() {
            assert!(line.ends_with(" ."), "Line does not end with ' .': {line}");
        }
    }

    #[test]
    fn escapes_lexical_forms() {
        let nt = to_ntriples(&sample());
        assert!(nt.contains(r#""line\nbreak \"quoted\"""#));
        assert!(nt.contains("\"1\"^^<http://www.w3.org/2001/XMLSchema#integer>"));
        assert!(nt.contains("\"hi\"@en"));
    }

    #[test]
    fn output_is_sorted() {
        let nt = to_ntriples(&sample());
        let lines: Vec<_> = nt.lines().collect();
        let mut sorted = lines.clone();
        sorted.sort_unstable();
        assert_eq!(lines, sorted);
    }
}
