//! Error types for logger operations and sink writes.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by logger operations.
///
/// None of these are fatal to the process: every failing operation also
/// records a diagnostic through the logger itself before returning.
#[derive(Error, Debug)]
pub enum LoggerError {
    /// A symbolic level name not present in the level table.
    #[error("unknown log level: {0:?}")]
    InvalidLevel(String),

    /// Destination path missing, not a directory, or not accessible.
    #[error("invalid destination {path:?}: {reason}")]
    InvalidDestination {
        /// The resolved path that failed validation.
        path: PathBuf,
        /// Which check failed.
        reason: String,
    },

    /// The rolling engine refused the sink configuration.
    #[error("cannot register sink {name:?}: {reason}")]
    SinkRegistration {
        /// Name the sink would have been registered under.
        name: String,
        /// Engine error text.
        reason: String,
    },
}

/// Errors produced by an individual sink when writing a record.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The underlying writer failed.
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),
}
