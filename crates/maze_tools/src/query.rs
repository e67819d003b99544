//! Route and line-of-sight inspection between two cells.
//!
//! Answers the same questions the AI layer asks at runtime, reported in
//! grid coordinates so they can be read against the maze text.

use maze_core::grid::GridPos;
use maze_core::math::{Fixed, Vec2Fixed};
use maze_core::maze::Maze;
use maze_core::visibility::Obstruction;
use serde::Serialize;

use crate::error::{Result, ToolError};

/// Everything the engine says about travelling from one cell to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteReport {
    /// Origin cell.
    pub from: GridPos,
    /// Target cell.
    pub to: GridPos,
    /// Shortest path over walkable cells.
    pub walkable_path: Vec<GridPos>,
    /// Path chosen after weighing destructible walls.
    pub route: Vec<GridPos>,
    /// Whether the chosen route needs walls shot down.
    pub through_destructible: bool,
    /// First wall to shoot on the chosen route.
    pub wall_target: Option<GridPos>,
    /// What lies on the straight line between the two cells.
    pub obstruction: Obstruction,
    /// First wall on the straight line, if any.
    pub first_blocked: Option<GridPos>,
}

/// Parse a `col,row` pair.
pub fn parse_cell(text: &str) -> Result<GridPos> {
    let invalid = || ToolError::InvalidArgument(format!("expected 'col,row', got '{text}'"));
    let (col, row) = text.split_once(',').ok_or_else(invalid)?;
    let col = col.trim().parse().map_err(|_| invalid())?;
    let row = row.trim().parse().map_err(|_| invalid())?;
    Ok(GridPos::new(col, row))
}

/// Convert a wall step cost given on the command line.
pub fn parse_cost(cost: u32) -> Result<Fixed> {
    Fixed::checked_from_num(cost).ok_or_else(|| {
        ToolError::InvalidArgument(format!(
            "destructible cost {cost} exceeds the maximum of {}",
            Fixed::MAX.to_num::<i32>()
        ))
    })
}

/// Inspect the route between two cells.
#[must_use]
pub fn inspect_route(
    maze: &Maze,
    from: GridPos,
    to: GridPos,
    destructible_cost: Fixed,
) -> RouteReport {
    let start = maze.grid_to_world(from);
    let target = maze.grid_to_world(to);
    let cells = |points: &[Vec2Fixed]| -> Vec<GridPos> {
        points.iter().map(|&p| maze.world_to_grid(p)).collect()
    };

    let walkable = maze.find_path(start, target);
    let plan = maze.plan_route(start, target, destructible_cost);
    let obstruction = maze.check_path(start, target);
    let first_blocked = obstruction
        .is_blocked()
        .then(|| maze.world_to_grid(maze.first_blocked_position(start, target)));

    RouteReport {
        from,
        to,
        walkable_path: cells(&walkable),
        route: cells(&plan.waypoints),
        through_destructible: plan.through_destructible,
        wall_target: plan.wall_target.map(|p| maze.world_to_grid(p)),
        obstruction,
        first_blocked,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_core::config::MazeSettings;

    #[test]
    fn test_parse_cell() {
        assert_eq!(parse_cell("3,4").unwrap(), GridPos::new(3, 4));
        assert_eq!(parse_cell(" 10 , 0 ").unwrap(), GridPos::new(10, 0));
        assert!(parse_cell("3").is_err());
        assert!(parse_cell("a,b").is_err());
    }

    #[test]
    fn test_parse_cost() {
        assert_eq!(parse_cost(3).unwrap(), Fixed::from_num(3));
        assert_eq!(parse_cost(2_000_000_000).unwrap(), Fixed::from_num(2_000_000_000));
        assert!(matches!(
            parse_cost(u32::MAX),
            Err(ToolError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_inspect_blocked_corridor() {
        let maze = Maze::from_rows(&["#######", "#S.*.E#", "#######"], MazeSettings::default())
            .unwrap();
        let report = inspect_route(&maze, GridPos::new(1, 1), GridPos::new(5, 1), Fixed::from_num(3));

        assert!(report.walkable_path.is_empty());
        assert_eq!(report.route.len(), 4);
        assert!(report.through_destructible);
        assert_eq!(report.wall_target, Some(GridPos::new(3, 1)));
        assert_eq!(report.obstruction, Obstruction::BlockedByDestructible);
        assert_eq!(report.first_blocked, Some(GridPos::new(3, 1)));
    }

    #[test]
    fn test_inspect_clear_line() {
        let maze = Maze::from_rows(&["S...E"], MazeSettings::default()).unwrap();
        let report = inspect_route(&maze, GridPos::new(0, 0), GridPos::new(4, 0), Fixed::from_num(3));
        assert_eq!(report.walkable_path, report.route);
        assert_eq!(report.obstruction, Obstruction::Clear);
        assert_eq!(report.first_blocked, None);
    }
}
