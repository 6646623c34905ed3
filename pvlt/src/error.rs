//! Error types for the pvlt CLI.

use std::path::PathBuf;

use thiserror::Error;

/// Result alias used throughout the CLI.
pub type Result<T> = std::result::Result<T, PvltError>;

/// Anything a pvlt command can fail with.
#[derive(Debug, Error)]
pub enum PvltError {
    /// Could not read an input file.
    #[error("cannot read {}: {source}", path.display())]
    ReadInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not write an output file.
    #[error("cannot write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A core load or dump failure.
    #[error(transparent)]
    Pvl(#[from] pvl::PvlError),

    /// JSON rendering failure.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
