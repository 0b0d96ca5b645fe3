//! Engine error type.

use std::path::PathBuf;

use owldiff_graph::GraphError;

/// Errors that abort a normalization or diff run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Reading or parsing an input graph failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// A configuration file is missing or invalid.
    #[error("invalid configuration {}: {message}", path.display())]
    Config {
        /// The configuration file.
        path: PathBuf,
        /// What was wrong with it.
        message: String,
    },

    /// Writing an output failed.
    #[error("cannot write {}: {source}", path.display())]
    Io {
        /// The output path.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// An internal invariant did not hold. This is a bug, not bad input.
    #[error("internal error: {0}")]
    Internal(String),
}
