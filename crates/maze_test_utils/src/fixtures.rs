//! Test fixtures and helpers.
//!
//! Small hand-written mazes and coordinate shortcuts for consistent testing.

use fixed::types::I32F32;
use maze_core::config::MazeSettings;
use maze_core::grid::GridPos;
use maze_core::math::Vec2Fixed;
use maze_core::maze::Maze;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Load a maze from rows with default settings.
///
/// # Panics
///
/// Panics if the rows cannot be loaded.
#[must_use]
pub fn maze_from_rows(rows: &[&str]) -> Maze {
    match Maze::from_rows(rows, MazeSettings::default()) {
        Ok(maze) => maze,
        Err(e) => panic!("fixture maze failed to load: {e}"),
    }
}

/// World-space centre of a cell.
#[must_use]
pub fn center(maze: &Maze, col: i32, row: i32) -> Vec2Fixed {
    maze.grid_to_world(GridPos::new(col, row))
}

/// Rows of an open room of `cols` x `rows` cells surrounded by solid walls.
#[must_use]
pub fn walled_room(cols: usize, rows: usize) -> Vec<String> {
    let width = cols + 2;
    let mut out = Vec::with_capacity(rows + 2);
    out.push("#".repeat(width));
    for _ in 0..rows {
        out.push(format!("#{}#", ".".repeat(cols)));
    }
    out.push("#".repeat(width));
    out
}

/// Corridor blocked by a single destructible wall, start on the left and
/// exit on the right.
pub const BLOCKED_CORRIDOR: [&str; 3] = ["#######", "#S.*.E#", "#######"];

/// Explosive wall surrounded by every kind of neighbour.
///
/// The `B` at (2,2) has destructible, solid and exit neighbours, and a
/// destructible wall two steps away at (4,2).
pub const EXPLOSIVE_CLUSTER: [&str; 5] = ["#####.", "#*G*#.", "#HB.*.", "#*#E#.", "######"];
