//! Error types for maze construction and configuration.
//!
//! Queries against a loaded maze never fail; they return fallback values.
//! Errors only surface where text or configuration enters the engine.

use thiserror::Error;

/// Result type alias using [`MazeError`].
pub type Result<T> = std::result::Result<T, MazeError>;

/// Top-level error type for the maze engine.
#[derive(Debug, Error)]
pub enum MazeError {
    /// Textual maze contained no rows.
    #[error("Maze text contains no rows")]
    EmptyGrid,

    /// Configuration value cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration source failed to parse.
    #[error("Failed to parse config '{source_name}': {message}")]
    ConfigParse {
        /// Name of the source (file path or `<string>`).
        source_name: String,
        /// Error message.
        message: String,
    },

    /// File could not be read or written.
    #[error("IO error on '{path}': {message}")]
    Io {
        /// Path involved in the failure.
        path: String,
        /// Error message.
        message: String,
    },
}
