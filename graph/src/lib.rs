//! RDF graph layer for owldiff.
//!
//! The `owldiff-graph` crate provides the owned term model, an indexed
//! in-memory triple store, canonical term keys, Turtle / N-Triples input
//! and output, and RDF/XML / JSON-LD input.
//!
//! # Entry Point
//!
//! ```
//! use owldiff_graph::{parser, Format, PrefixTable};
//!
//! let graph = parser::parse_str(
//!     "<http://example.org/a> <http://example.org/p> \"x\" .",
//!     Format::NTriples,
//!     "inline",
//! )
//! .map_err(|e| e.to_string())?;
//! assert_eq!(graph.len(), 1);
//!
//! let turtle = Format::Turtle
//!     .serialize(&graph, &PrefixTable::default())
//!     .map_err(|e| e.to_string())?;
//! assert!(turtle.contains("<http://example.org/a>"));
//! # Ok::<(), String>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod error;
pub mod format;
pub mod key;
pub mod model;
pub mod parser;
pub mod serializer;
pub mod store;
pub mod vocab;

pub use error::GraphError;
pub use format::Format;
pub use key::PrefixTable;
pub use model::{BlankId, Iri, Literal, Term, Triple};
pub use store::Graph;
