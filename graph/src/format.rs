//! Supported serializations.
//!
//! All four formats are read; only Turtle and N-Triples are written.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::GraphError;
use crate::key::PrefixTable;
use crate::serializer::{ntriples, turtle};
use crate::store::Graph;

/// An RDF serialization the workspace can read, and for some, write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Turtle 1.1.
    #[default]
    Turtle,
    /// N-Triples.
    NTriples,
    /// RDF/XML, the usual `.owl` serialization. Input only.
    RdfXml,
    /// JSON-LD; named graphs are merged into the default graph. Input only.
    JsonLd,
}

impl Format {
    /// Detects the format from a file extension; anything unknown is Turtle.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("nt" | "ntriples") => Format::NTriples,
            Some("owl" | "rdf" | "xml") => Format::RdfXml,
            Some("jsonld" | "json") => Format::JsonLd,
            _ => Format::Turtle,
        }
    }

    /// File extension used for outputs.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Format::Turtle => "ttl",
            Format::NTriples => "nt",
            Format::RdfXml => "rdf",
            Format::JsonLd => "jsonld",
        }
    }

    /// True for the formats [`Format::serialize`] can produce.
    #[must_use]
    pub fn is_writable(self) -> bool {
        matches!(self, Format::Turtle | Format::NTriples)
    }

    /// Serializes `graph`; `prefixes` is only consulted for Turtle.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::ReadOnlyFormat`] for RDF/XML and JSON-LD.
    pub fn serialize(self, graph: &Graph, prefixes: &PrefixTable) -> Result<String, GraphError> {
        match self {
            Format::Turtle => Ok(turtle::to_turtle(graph, prefixes)),
            Format::NTriples => Ok(ntriples::to_ntriples(graph)),
            Format::RdfXml | Format::JsonLd => Err(GraphError::ReadOnlyFormat(self)),
        }
    }
}

impl FromStr for Format {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "turtle" | "ttl" => Ok(Format::Turtle),
            "nt" | "ntriples" | "n-triples" => Ok(Format::NTriples),
            "rdfxml" | "rdf/xml" | "xml" | "owl" => Ok(Format::RdfXml),
            "jsonld" | "json-ld" => Ok(Format::JsonLd),
            other => Err(GraphError::UnknownFormat(other.to_owned())),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Turtle => "turtle",
            Format::NTriples => "nt",
            Format::RdfXml => "rdfxml",
            Format::JsonLd => "jsonld",
        })
    }
}
