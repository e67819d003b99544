//! Maze file validation.
//!
//! A maze file is valid when its rows are rectangular, it has exactly one
//! exit, it has either a start or both multiplayer spawns, every one of those
//! is connected to the exit, and the exit is not much closer to one spawn.

use std::path::Path;

use maze_core::config::MazeSettings;
use maze_core::grid::{CellKind, GridPos};
use maze_core::maze::{Maze, SpawnSlot};
use serde::Serialize;

use crate::error::{Result, ToolError};

/// Findings for one maze.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
    /// A start marker is present.
    pub has_start: bool,
    /// An exit marker is present.
    pub has_exit: bool,
    /// Number of multiplayer spawn markers present.
    pub spawns: usize,
    /// Number of enemy spawn markers.
    pub enemy_spawns: usize,
    /// Number of destructible walls.
    pub destructible_walls: usize,
    /// Every border cell is a wall.
    pub closed_border: bool,
    /// Absolute difference of the spawns' Manhattan distances to the exit.
    pub spawn_distance_gap: Option<u32>,
    /// Problems that make the maze unusable.
    pub issues: Vec<String>,
}

impl ValidationReport {
    /// Whether no issues were found.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Inspect a loaded maze.
#[must_use]
pub fn validate_maze(maze: &Maze) -> ValidationReport {
    let (rows, cols) = (maze.rows(), maze.cols());
    let mut issues = Vec::new();

    for (i, row) in maze.source_rows().iter().enumerate() {
        let len = row.chars().count();
        if len != cols {
            issues.push(format!("row {i} has {len} cells, expected {cols}"));
        }
    }

    let mut destructible_walls = 0;
    let mut closed_border = true;
    for row in 0..rows as i32 {
        for col in 0..cols as i32 {
            let pos = GridPos::new(col, row);
            let on_border =
                col == 0 || row == 0 || col == cols as i32 - 1 || row == rows as i32 - 1;
            match maze.kind_at(pos) {
                Some(CellKind::Destructible) => destructible_walls += 1,
                Some(CellKind::Solid) => {}
                _ if on_border => closed_border = false,
                _ => {}
            }
        }
    }

    let exit = maze.exit();
    let exit_markers: usize = maze
        .source_rows()
        .iter()
        .map(|row| row.matches('E').count())
        .sum();
    if exit_markers == 0 {
        issues.push("missing exit marker 'E'".into());
    } else if exit_markers > 1 {
        issues.push(format!("found {exit_markers} exit markers, expected 1"));
    }

    let spawn_cells: Vec<GridPos> = [SpawnSlot::First, SpawnSlot::Second]
        .into_iter()
        .filter_map(|slot| maze.spawn_cell(slot))
        .collect();
    if spawn_cells.len() == 1 {
        issues.push("only one multiplayer spawn marker".into());
    }
    if maze.start().is_none() && spawn_cells.len() < 2 {
        issues.push("missing start marker 'S' and spawn pair".into());
    }

    if let Some(exit) = exit {
        let origins = maze
            .start()
            .into_iter()
            .chain(spawn_cells.iter().map(|&p| maze.grid_to_world(p)));
        for origin in origins {
            if maze.find_path(origin, exit).is_empty() {
                let cell = maze.world_to_grid(origin);
                issues.push(format!(
                    "no walkable path from ({}, {}) to the exit",
                    cell.col, cell.row
                ));
            }
        }
    }

    let spawn_distance_gap = match (maze.exit_cell(), spawn_cells.as_slice()) {
        (Some(exit), [first, second]) => {
            let (d1, d2) = (exit.manhattan(*first), exit.manhattan(*second));
            let gap = d1.abs_diff(d2);
            let allowed = 3u32.max(d1.min(d2) / 3);
            if gap > allowed {
                issues.push(format!(
                    "exit favours one spawn: distances {d1} and {d2} differ by more than {allowed}"
                ));
            }
            Some(gap)
        }
        _ => None,
    };

    ValidationReport {
        rows,
        cols,
        has_start: maze.start().is_some(),
        has_exit: exit.is_some(),
        spawns: spawn_cells.len(),
        enemy_spawns: maze.enemy_spawn_points().len(),
        destructible_walls,
        closed_border,
        spawn_distance_gap,
        issues,
    }
}

/// Load and inspect a maze file.
pub fn validate_file(path: &Path, settings: MazeSettings) -> Result<ValidationReport> {
    let text = std::fs::read_to_string(path).map_err(|e| ToolError::io(path, e))?;
    let maze = Maze::from_text(&text, settings)?;
    let report = validate_maze(&maze);
    tracing::debug!(path = %path.display(), issues = report.issues.len(), "Validated maze");
    Ok(report)
}
