//! Turtle, N-Triples, RDF/XML and JSON-LD input.
//!
//! Parsing is delegated to `sophia_turtle`, `sophia_xml` and
//! `sophia_jsonld`; every parsed term is converted into the owned [`Term`]
//! model so the rest of the workspace never sees sophia types.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use sophia_api::parser::QuadParser;
use sophia_api::quad::Quad as SophiaQuad;
use sophia_api::source::{QuadSource, TripleSource};
use sophia_api::term::{Term as SophiaTerm, TermKind};
use sophia_api::triple::Triple as SophiaTriple;
use sophia_jsonld::JsonLdParser;
use sophia_turtle::parser::{nt, turtle};

use crate::error::GraphError;
use crate::format::Format;
use crate::model::{Iri, Literal, Term, Triple};
use crate::store::Graph;

/// Reads and parses a graph file.
///
/// The file size is checked against `max_bytes` before anything is read.
/// When `format` is `None` it is detected from the file extension.
///
/// # Errors
///
/// Returns [`GraphError::Io`] if the file cannot be stat'ed or opened,
/// [`GraphError::TooLarge`] if it exceeds `max_bytes`, and
/// [`GraphError::Syntax`] / [`GraphError::UnsupportedTerm`] if it does not
/// parse into plain RDF triples.
pub fn parse_file(path: &Path, format: Option<Format>, max_bytes: u64) -> Result<Graph, GraphError> {
    guard_file_size(path, max_bytes)?;
    let format = format.unwrap_or_else(|| Format::from_path(path));
    let file = File::open(path).map_err(|source| GraphError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let reader = BufReader::new(file);
    let source_name = path.display().to_string();

    parse_reader(reader, format, &source_name)
}

/// Parses a graph from an in-memory string.
///
/// `source_name` labels the input in error messages.
///
/// # Errors
///
/// Returns [`GraphError::Syntax`] or [`GraphError::UnsupportedTerm`] if the
/// text does not parse into plain RDF triples.
pub fn parse_str(text: &str, format: Format, source_name: &str) -> Result<Graph, GraphError> {
    parse_reader(text.as_bytes(), format, source_name)
}

fn parse_reader<R: BufRead>(reader: R, format: Format, source_name: &str) -> Result<Graph, GraphError> {
    let mut collector = Collector::new(source_name);
    let outcome = match format {
        Format::Turtle => turtle::parse_bufread(reader)
            .for_each_triple(|t| collector.push(&t))
            .map_err(|e| e.to_string()),
        Format::NTriples => nt::parse_bufread(reader)
            .for_each_triple(|t| collector.push(&t))
            .map_err(|e| e.to_string()),
        Format::RdfXml => sophia_xml::parser::parse_bufread(reader)
            .for_each_triple(|t| collector.push(&t))
            .map_err(|e| e.to_string()),
        Format::JsonLd => JsonLdParser::new()
            .parse(reader)
            .for_each_quad(|q| collector.push_quad(&q))
            .map_err(|e| e.to_string()),
    };
    outcome.map_err(|message| GraphError::Syntax {
        source_name: source_name.to_owned(),
        message,
    })?;
    collector.finish()
}

/// Rejects files larger than `max_bytes`.
///
/// # Errors
///
/// Returns [`GraphError::Io`] if the file cannot be stat'ed and
/// [`GraphError::TooLarge`] if it is over the limit.
pub fn guard_file_size(path: &Path, max_bytes: u64) -> Result<(), GraphError> {
    let size = std::fs::metadata(path)
        .map_err(|source| GraphError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    if size > max_bytes {
        return Err(GraphError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit: max_bytes,
        });
    }
    Ok(())
}

/// Accumulates converted triples; the first conversion error wins.
struct Collector<'a> {
    source_name: &'a str,
    graph: Graph,
    error: Option<GraphError>,
}

impl<'a> Collector<'a> {
    fn new(source_name: &'a str) -> Self {
        Self {
            source_name,
            graph: Graph::new(),
            error: None,
        }
    }

    fn push<T: SophiaTriple>(&mut self, triple: &T) {
        self.push_terms(triple.s(), triple.p(), triple.o());
    }

    /// The graph name is dropped.
    fn push_quad<Q: SophiaQuad>(&mut self, quad: &Q) {
        self.push_terms(quad.s(), quad.p(), quad.o());
    }

    fn push_terms<T: SophiaTerm>(&mut self, s: T, p: T, o: T) {
        if self.error.is_some() {
            return;
        }
        let converted = convert_term(s, self.source_name).and_then(|s| {
            let p = convert_term(p, self.source_name)?;
            let o = convert_term(o, self.source_name)?;
            Triple::try_new(s, p, o)
        });
        match converted {
            Ok(t) => {
                self.graph.insert(t);
            }
            Err(e) => self.error = Some(e),
        }
    }

    fn finish(self) -> Result<Graph, GraphError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.graph),
        }
    }
}

fn convert_term<T: SophiaTerm>(term: T, source_name: &str) -> Result<Term, GraphError> {
    let unsupported = |kind: &str| GraphError::UnsupportedTerm {
        source_name: source_name.to_owned(),
        kind: kind.to_owned(),
    };
    match term.kind() {
        TermKind::Iri => term
            .iri()
            .map(|iri| Term::iri(iri.as_str()))
            .ok_or_else(|| unsupported("IRI without value")),
        TermKind::BlankNode => term
            .bnode_id()
            .map(|id| Term::blank(id.as_str()))
            .ok_or_else(|| unsupported("blank node without label")),
        TermKind::Literal => {
            let lexical = term
                .lexical_form()
                .ok_or_else(|| unsupported("literal without lexical form"))?;
            if let Some(lang) = term.language_tag() {
                return Ok(Literal::lang(&*lexical, lang.as_str()).into());
            }
            Ok(match term.datatype() {
                Some(dt) => Literal::typed(&*lexical, Iri::new(dt.as_str())).into(),
                None => Literal::simple(&*lexical).into(),
            })
        }
        TermKind::Triple => Err(unsupported("quoted triple (RDF-star)")),
        TermKind::Variable => Err(unsupported("variable")),
    }
}
