//! # Maze Development Tools
//!
//! Command-line tools for development:
//! - Maze generator writing text or JSON
//! - Maze file validator
//! - Route and line-of-sight inspector
//! - Parallel batch checker for generator settings

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod batch;
pub mod error;
pub mod generate;
pub mod query;
pub mod validate;
