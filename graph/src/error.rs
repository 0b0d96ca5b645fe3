//! Errors raised while building, reading, or writing graphs.

use std::path::PathBuf;

use crate::format::Format;

/// Error type for the graph layer.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The file could not be stat'ed or read.
    #[error("cannot read {}: {source}", path.display())]
    Io {
        /// The offending path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file exceeds the configured input ceiling.
    #[error("refusing to read {} ({size} bytes) > limit {limit} bytes", path.display())]
    TooLarge {
        /// The offending path.
        path: PathBuf,
        /// Actual size in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        limit: u64,
    },

    /// The serialization could not be parsed.
    #[error("syntax error in {source_name}: {message}")]
    Syntax {
        /// File name or other label of the input.
        source_name: String,
        /// Parser message.
        message: String,
    },

    /// The input contains a term kind the model does not represent.
    #[error("unsupported term in {source_name}: {kind}")]
    UnsupportedTerm {
        /// File name or other label of the input.
        source_name: String,
        /// Description of the rejected term.
        kind: String,
    },

    /// A triple with a term in a position it may not occupy.
    #[error("invalid triple: {0}")]
    InvalidTriple(String),

    /// A format name that is not recognised.
    #[error("unknown RDF format '{0}' (expected turtle, nt, rdfxml or jsonld)")]
    UnknownFormat(String),

    /// Output was requested in a format that is only read.
    #[error("{0} is an input-only format; write turtle or nt")]
    ReadOnlyFormat(Format),
}
