//! # Maze Core
//!
//! Deterministic maze engine for a top-down tank shooter.
//!
//! This crate contains **only** maze logic:
//! - No rendering
//! - No networking
//! - No entity or AI state
//! - No floating-point geometry (uses fixed-point)
//!
//! This separation enables:
//! - Host-generated mazes replayed identically on a peer
//! - Headless validation and batch tooling
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`generator`] - Procedural maze generation
//! - [`maze`] - Loaded maze, coordinate mapping and named points
//! - [`collision`] - Circle-vs-wall collision with rounded corners
//! - [`destruction`] - Bullet hits and explosive walls
//! - [`pathfinding`] - A* search and route selection
//! - [`visibility`] - Line-of-sight classification
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod collision;
pub mod config;
pub mod destruction;
pub mod error;
pub mod generator;
pub mod grid;
pub mod math;
pub mod maze;
pub mod pathfinding;
pub mod visibility;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{EngineConfig, MazeSettings};
    pub use crate::destruction::HitResult;
    pub use crate::error::{MazeError, Result};
    pub use crate::generator::{GeneratedMaze, GeneratorConfig, MazeGenerator};
    pub use crate::grid::{Cell, CellKind, Corner, GridPos, RoundedCorners, Tile, WallAttribute};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::maze::{Maze, SpawnSlot};
    pub use crate::pathfinding::{select_path, AugmentedPath, RoutePlan};
    pub use crate::visibility::Obstruction;
}
