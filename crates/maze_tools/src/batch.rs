//! Parallel batch checks over many seeds.
//!
//! Generates one maze per seed with rayon, validates each, and summarises
//! the results. Used to tune generator settings before shipping them.

use maze_core::config::MazeSettings;
use maze_core::generator::{GeneratorConfig, MazeGenerator};
use maze_core::maze::{Maze, SpawnSlot};
use rayon::prelude::*;
use serde::Serialize;

use crate::error::Result;
use crate::validate::{validate_maze, ValidationReport};

/// Outcome for a single seed.
#[derive(Debug, Clone, Serialize)]
pub struct SeedResult {
    /// Seed the maze was generated with.
    pub seed: u64,
    /// Length of the shortest path from start (or first spawn) to exit.
    pub path_length: usize,
    /// Validation findings.
    pub report: ValidationReport,
}

/// Aggregate over a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Number of mazes generated.
    pub mazes: usize,
    /// Number that passed validation.
    pub valid: usize,
    /// Mean shortest-path length to the exit.
    pub mean_path_length: f64,
    /// Mean number of destructible walls.
    pub mean_destructible_walls: f64,
    /// Largest spawn distance gap seen (multiplayer only).
    pub worst_spawn_gap: Option<u32>,
    /// Seeds that failed validation.
    pub failures: Vec<SeedResult>,
}

impl BatchSummary {
    /// Whether every maze passed validation.
    #[must_use]
    pub fn all_valid(&self) -> bool {
        self.valid == self.mazes
    }
}

fn check_seed(base: &GeneratorConfig, settings: MazeSettings, seed: u64) -> Result<SeedResult> {
    let config = base.clone().with_seed(seed);
    let generated = MazeGenerator::new(config)?.generate();
    let maze = Maze::from_rows(&generated.rows, settings)?;

    let origin = maze
        .start()
        .or_else(|| maze.spawn(SpawnSlot::First));
    let path_length = match (origin, maze.exit()) {
        (Some(from), Some(to)) => maze.find_path(from, to).len(),
        _ => 0,
    };

    Ok(SeedResult {
        seed,
        path_length,
        report: validate_maze(&maze),
    })
}

/// Generate and validate `count` mazes with seeds `first_seed..`.
pub fn run_batch(
    base: &GeneratorConfig,
    settings: MazeSettings,
    first_seed: u64,
    count: usize,
) -> Result<BatchSummary> {
    base.validate()?;
    settings.validate()?;

    let results: Vec<SeedResult> = (0..count)
        .into_par_iter()
        .map(|i| check_seed(base, settings, first_seed.wrapping_add(i as u64)))
        .collect::<Result<_>>()?;

    let mazes = results.len();
    let mean = |total: usize| {
        if mazes == 0 {
            0.0
        } else {
            total as f64 / mazes as f64
        }
    };
    let mean_path_length = mean(results.iter().map(|r| r.path_length).sum());
    let mean_destructible_walls = mean(results.iter().map(|r| r.report.destructible_walls).sum());
    let worst_spawn_gap = results
        .iter()
        .filter_map(|r| r.report.spawn_distance_gap)
        .max();

    let failures: Vec<SeedResult> = results
        .into_iter()
        .filter(|r| !r.report.is_valid())
        .collect();

    tracing::info!(mazes, failures = failures.len(), "Batch finished");

    Ok(BatchSummary {
        mazes,
        valid: mazes - failures.len(),
        mean_path_length,
        mean_destructible_walls,
        worst_spawn_gap,
        failures,
    })
}
