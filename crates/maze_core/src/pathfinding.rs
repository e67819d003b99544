//! Grid pathfinding using the A* algorithm.
//!
//! Two searches share one implementation: the plain shortest path over
//! walkable cells, and a destructible-aware variant that may route through
//! destructible walls at an inflated step cost. [`select_path`] holds the
//! policy for choosing between them.
//!
//! All costs are fixed-point and ties are broken on coordinates, so a host
//! and its peer always compute the same route.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

use crate::grid::{CellKind, GridPos};
use crate::math::{Fixed, Vec2Fixed};
use crate::maze::Maze;

/// Cost of stepping onto an empty or exit cell.
const STEP_COST: Fixed = Fixed::ONE;

/// A destructible route is taken over a walkable one only when it is shorter
/// than this percentage of the walkable route's length.
pub const DESTRUCTIBLE_ROUTE_MAX_PERCENT: usize = 50;

/// Direction offsets for 4-directional movement: north, east, south, west.
const DIRECTIONS: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Which cells a search may enter and what each step costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Traversal {
    WalkableOnly,
    ThroughDestructible(Fixed),
}

impl Traversal {
    /// Step cost onto a cell of `kind`, `None` if impassable.
    fn step_cost(self, kind: CellKind) -> Option<Fixed> {
        match (kind, self) {
            (CellKind::Empty | CellKind::Exit, _) => Some(STEP_COST),
            (CellKind::Destructible, Self::ThroughDestructible(cost)) => Some(cost),
            _ => None,
        }
    }
}

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    pos: GridPos,
    g_score: Fixed,
    /// f_score = g_score + heuristic
    f_score: Fixed,
    /// Tie-breaker for determinism: lower coordinates first.
    tie_breaker: u64,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap; reverse for lowest f_score first.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.tie_breaker.cmp(&self.tie_breaker),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Convert coordinates to a tie-breaker value for deterministic ordering.
#[inline]
fn coords_to_tie_breaker(pos: GridPos) -> u64 {
    ((pos.row as u32 as u64) << 32) | (pos.col as u32 as u64)
}

/// Manhattan distance heuristic (admissible for unit-cost 4-way movement).
#[inline]
fn manhattan_heuristic(a: GridPos, b: GridPos) -> Fixed {
    Fixed::from_num(a.manhattan(b))
}

/// Result of a destructible-aware search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AugmentedPath {
    /// Waypoints from the cell after start through the target.
    pub path: Vec<Vec2Fixed>,
    /// Whether any waypoint lies on a destructible wall.
    pub uses_destructible: bool,
    /// Centre of the first destructible wall along the path.
    pub first_destructible: Option<Vec2Fixed>,
}

/// A route chosen between the plain and destructible-aware searches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePlan {
    /// Waypoints to follow. Empty if the target is unreachable.
    pub waypoints: Vec<Vec2Fixed>,
    /// Whether the route requires shooting through walls.
    pub through_destructible: bool,
    /// The first wall to shoot, when `through_destructible`.
    pub wall_target: Option<Vec2Fixed>,
}

/// Whether the destructible-aware path should replace the plain one.
///
/// It is preferred when the plain path is empty, or when it goes through a
/// wall and is shorter than half the plain path. The asymmetric threshold
/// keeps periodically recomputed routes from flapping between "go around"
/// and "shoot through".
#[must_use]
pub fn prefer_augmented(plain_len: usize, augmented: &AugmentedPath) -> bool {
    if augmented.path.is_empty() {
        return false;
    }
    if plain_len == 0 {
        return true;
    }
    augmented.uses_destructible
        && augmented.path.len() * 100 < plain_len * DESTRUCTIBLE_ROUTE_MAX_PERCENT
}

/// Pick between a plain path and a destructible-aware path.
#[must_use]
pub fn select_path(plain: Vec<Vec2Fixed>, augmented: AugmentedPath) -> RoutePlan {
    if prefer_augmented(plain.len(), &augmented) {
        RoutePlan {
            waypoints: augmented.path,
            through_destructible: augmented.uses_destructible,
            wall_target: augmented.first_destructible,
        }
    } else {
        RoutePlan {
            waypoints: plain,
            through_destructible: false,
            wall_target: None,
        }
    }
}

impl Maze {
    /// Shortest 4-connected path between two world positions.
    ///
    /// Returns tile centres from the cell after `start` through `target`.
    /// Empty if either endpoint is unwalkable, no path exists, or both
    /// points share a cell.
    #[must_use]
    pub fn find_path(&self, start: Vec2Fixed, target: Vec2Fixed) -> Vec<Vec2Fixed> {
        let from = self.world_to_grid(start);
        let to = self.world_to_grid(target);
        if !self.is_walkable(from) || !self.is_walkable(to) {
            return Vec::new();
        }

        self.search(from, to, Traversal::WalkableOnly)
            .map(|cells| cells.into_iter().map(|p| self.grid_to_world(p)).collect())
            .unwrap_or_default()
    }

    /// Shortest path that may pass through destructible walls.
    ///
    /// Each step onto a destructible wall costs `destructible_cost` instead
    /// of one. Costs below one are raised to one so the heuristic stays
    /// admissible. Endpoints may be walkable cells or destructible walls.
    #[must_use]
    pub fn find_path_through_destructible(
        &self,
        start: Vec2Fixed,
        target: Vec2Fixed,
        destructible_cost: Fixed,
    ) -> AugmentedPath {
        let traversal = Traversal::ThroughDestructible(destructible_cost.max(STEP_COST));
        let from = self.world_to_grid(start);
        let to = self.world_to_grid(target);
        let passable = |pos| {
            self.kind_at(pos)
                .and_then(|kind| traversal.step_cost(kind))
                .is_some()
        };
        if !passable(from) || !passable(to) {
            return AugmentedPath::default();
        }

        let Some(cells) = self.search(from, to, traversal) else {
            return AugmentedPath::default();
        };

        let first_wall = cells
            .iter()
            .copied()
            .find(|&p| self.kind_at(p) == Some(CellKind::Destructible));

        AugmentedPath {
            path: cells.iter().map(|&p| self.grid_to_world(p)).collect(),
            uses_destructible: first_wall.is_some(),
            first_destructible: first_wall.map(|p| self.grid_to_world(p)),
        }
    }

    /// Run both searches and apply [`select_path`].
    #[must_use]
    pub fn plan_route(
        &self,
        start: Vec2Fixed,
        target: Vec2Fixed,
        destructible_cost: Fixed,
    ) -> RoutePlan {
        let plain = self.find_path(start, target);
        let augmented = self.find_path_through_destructible(start, target, destructible_cost);
        select_path(plain, augmented)
    }

    /// Internal A* over grid cells. Returns the cells after `start` through
    /// `goal`, or `None` when unreachable.
    fn search(&self, start: GridPos, goal: GridPos, traversal: Traversal) -> Option<Vec<GridPos>> {
        let cell_count = self.rows() * self.cols();
        let start_index = self.index(start)?;
        let goal_index = self.index(goal)?;

        let mut open_set: BinaryHeap<AStarNode> = BinaryHeap::new();
        let mut came_from: Vec<Option<usize>> = vec![None; cell_count];
        // `None` marks an unreached cell; scores saturate at `Fixed::MAX` so a
        // route made of very expensive walls is still found.
        let mut g_score: Vec<Option<Fixed>> = vec![None; cell_count];
        let mut expanded = 0usize;

        g_score[start_index] = Some(Fixed::ZERO);
        open_set.push(AStarNode {
            pos: start,
            g_score: Fixed::ZERO,
            f_score: manhattan_heuristic(start, goal),
            tie_breaker: coords_to_tie_breaker(start),
        });

        while let Some(current) = open_set.pop() {
            let current_index = self.index(current.pos)?;

            if current_index == goal_index {
                tracing::trace!(expanded, "A* reached goal");
                return Some(self.reconstruct(&came_from, start_index, goal_index));
            }

            // Stale entry: a cheaper route to this cell was already expanded.
            if g_score[current_index].is_some_and(|best| current.g_score > best) {
                continue;
            }
            expanded += 1;

            for &(dx, dy) in &DIRECTIONS {
                let next = current.pos.offset(dx, dy);
                let Some(next_index) = self.index(next) else {
                    continue;
                };
                let Some(step) = self.kind_at(next).and_then(|k| traversal.step_cost(k)) else {
                    continue;
                };

                let tentative_g = current.g_score.saturating_add(step);
                if g_score[next_index].map_or(true, |best| tentative_g < best) {
                    came_from[next_index] = Some(current_index);
                    g_score[next_index] = Some(tentative_g);
                    open_set.push(AStarNode {
                        pos: next,
                        g_score: tentative_g,
                        f_score: tentative_g.saturating_add(manhattan_heuristic(next, goal)),
                        tie_breaker: coords_to_tie_breaker(next),
                    });
                }
            }
        }

        tracing::trace!(expanded, "A* exhausted open set");
        None
    }

    /// Walk `came_from` back from the goal, excluding the start cell.
    fn reconstruct(&self, came_from: &[Option<usize>], start: usize, goal: usize) -> Vec<GridPos> {
        let cols = self.cols();
        let mut path = Vec::new();
        let mut current = goal;
        while current != start {
            path.push(GridPos::new((current % cols) as i32, (current / cols) as i32));
            match came_from[current] {
                Some(prev) => current = prev,
                None => break,
            }
        }
        path.reverse();
        path
    }
}
