//! OWL-aware normalization and diff engine.
//!
//! Two versions of an ontology usually disagree on blank node labels even
//! when nothing changed. The engine removes the dominant sources of that
//! noise before comparing:
//!
//! | Module | Role |
//! |--------|------|
//! | [`lists`] | Sorted, content-addressed `rdf:first`/`rdf:rest` lists |
//! | [`symmetric`] | One stored direction per equivalence or symmetric edge |
//! | [`pipeline`] | Runs the steps above in order, idempotently |
//! | [`isomorphic`] | Content-derived labels for every remaining blank node |
//! | [`diff`] | Additions, removals, unchanged; two interchangeable strategies |
//! | [`run`] | Batch runs over files with atomic outputs |
//!
//! # Entry Point
//!
//! ```
//! use owldiff_engine::{normalize, DiffMode, NormalizeOptions};
//! use owldiff_graph::{parser, Format};
//!
//! let old = "<http://e/a> <http://www.w3.org/2002/07/owl#sameAs> <http://e/b> .";
//! let new = "<http://e/b> <http://www.w3.org/2002/07/owl#sameAs> <http://e/a> .";
//! let mut old = parser::parse_str(old, Format::NTriples, "old").map_err(|e| e.to_string())?;
//! let mut new = parser::parse_str(new, Format::NTriples, "new").map_err(|e| e.to_string())?;
//! normalize(&mut old, &NormalizeOptions::default());
//! normalize(&mut new, &NormalizeOptions::default());
//!
//! let diff = DiffMode::Isomorphic.strategy().diff(&old, &new).map_err(|e| e.to_string())?;
//! assert!(diff.is_empty());
//! # Ok::<(), String>(())
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

pub mod config;
pub mod diff;
pub mod error;
pub mod isomorphic;
pub mod lists;
pub mod pipeline;
pub mod report;
pub mod run;
pub mod symmetric;

pub use config::EngineConfig;
pub use diff::{DiffMode, DiffStrategy, GraphDiff, IsomorphicDiff, SimpleDiff};
pub use error::EngineError;
pub use isomorphic::CanonicalGraph;
pub use pipeline::{normalize, NormalizeOptions, Normalizer};
pub use report::{Diagnostics, NormalizeReport};
pub use run::{run_diff, run_normalize, DiffRequest, OutputSpec, RunSummary};
