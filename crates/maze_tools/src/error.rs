//! Error type for the tools.

use maze_core::error::MazeError;
use thiserror::Error;

/// Result type alias using [`ToolError`].
pub type Result<T> = std::result::Result<T, ToolError>;

/// Errors reported by the command-line tools.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Engine rejected the input.
    #[error(transparent)]
    Maze(#[from] MazeError),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File could not be read or written.
    #[error("IO error on '{path}': {source}")]
    Io {
        /// Path involved in the failure.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Command-line argument could not be parsed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ToolError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
