//! Line-of-sight queries over the grid.
//!
//! Lines are discretized with Bresenham stepping between the cells holding
//! the two endpoints. Cells outside the grid are skipped, not treated as
//! walls, so a line that leaves the map is judged only on what it crosses
//! inside it. The walk is clipped to the grid first, so its cost is bounded
//! by the grid size however far away the endpoints are.

use serde::{Deserialize, Serialize};

use crate::grid::{CellKind, GridPos};
use crate::math::Vec2Fixed;
use crate::maze::Maze;

/// Three-way verdict for a line between two points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Obstruction {
    /// No wall cell on the line.
    Clear,
    /// Only destructible walls on the line.
    BlockedByDestructible,
    /// At least one solid wall on the line.
    BlockedBySolid,
}

impl Obstruction {
    /// True unless the line is clear.
    #[must_use]
    pub const fn is_blocked(self) -> bool {
        !matches!(self, Self::Clear)
    }
}

/// Bresenham walk between two cells, inclusive of both ends.
///
/// Cells are computed in closed form from their step index, so a walk can
/// be clipped to the grid without stepping through the cells outside it.
#[derive(Debug, Clone)]
pub struct GridLine {
    origin: (i64, i64),
    delta: (i64, i64),
    step: (i64, i64),
    /// Steps along the major axis.
    span: i64,
    next: i64,
    /// One past the last step index to yield.
    end: i64,
}

impl GridLine {
    /// Line from `from` to `to`.
    #[must_use]
    pub fn new(from: GridPos, to: GridPos) -> Self {
        let (x0, y0) = (i64::from(from.col), i64::from(from.row));
        let (x1, y1) = (i64::from(to.col), i64::from(to.row));
        let delta = ((x1 - x0).abs(), (y1 - y0).abs());
        let span = delta.0.max(delta.1);
        Self {
            origin: (x0, y0),
            delta,
            step: (if x0 < x1 { 1 } else { -1 }, if y0 < y1 { 1 } else { -1 }),
            span,
            next: 0,
            end: span + 1,
        }
    }

    /// Restrict the walk to cells inside a `cols` x `rows` grid.
    ///
    /// A straight line crosses a rectangle at most once, so the in-bounds
    /// cells are one contiguous run of step indices.
    #[must_use]
    pub fn clipped(mut self, cols: usize, rows: usize) -> Self {
        let (cols, rows) = (cols as i64, rows as i64);
        let (x_from, x_to) = self.in_range(self.origin.0, self.delta.0, self.step.0, cols);
        let (y_from, y_to) = self.in_range(self.origin.1, self.delta.1, self.step.1, rows);
        self.next = self.next.max(x_from).max(y_from);
        self.end = self.end.min(x_to).min(y_to);
        self
    }

    /// Offset along one axis after `k` steps, rounding ties toward the start.
    fn offset(&self, k: i64, delta: i64) -> i64 {
        if self.span == 0 {
            return 0;
        }
        let span = i128::from(self.span);
        let value = (2 * i128::from(k) * i128::from(delta) + span - 1) / (2 * span);
        // Bounded by `delta`, which fits.
        value as i64
    }

    /// Step indices `[from, to)` where one coordinate stays within `0..len`.
    fn in_range(&self, origin: i64, delta: i64, step: i64, len: i64) -> (i64, i64) {
        let coord = |k: i64| origin + step * self.offset(k, delta);
        if step > 0 {
            (
                self.first_step(|k| coord(k) >= 0),
                self.first_step(|k| coord(k) >= len),
            )
        } else {
            (
                self.first_step(|k| coord(k) < len),
                self.first_step(|k| coord(k) < 0),
            )
        }
    }

    /// Smallest step index in `0..=span` satisfying a monotone predicate,
    /// or `span + 1` if none does.
    fn first_step(&self, holds: impl Fn(i64) -> bool) -> i64 {
        let (mut lo, mut hi) = (0, self.span + 1);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if holds(mid) {
                hi = mid;
            } else {
                lo = mid + 1;
            }
        }
        lo
    }
}

impl Iterator for GridLine {
    type Item = GridPos;

    fn next(&mut self) -> Option<GridPos> {
        if self.next >= self.end {
            return None;
        }
        let k = self.next;
        self.next += 1;

        let x = self.origin.0 + self.step.0 * self.offset(k, self.delta.0);
        let y = self.origin.1 + self.step.1 * self.offset(k, self.delta.1);
        // Both ends come from i32 coordinates, so every point in between fits.
        Some(GridPos::new(x as i32, y as i32))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next).max(0) as usize;
        (remaining, Some(remaining))
    }
}

impl Maze {
    /// In-bounds wall kinds along the line between two world points.
    fn walls_on_line(
        &self,
        start: Vec2Fixed,
        target: Vec2Fixed,
    ) -> impl Iterator<Item = (GridPos, CellKind)> + '_ {
        GridLine::new(self.world_to_grid(start), self.world_to_grid(target))
            .clipped(self.cols(), self.rows())
            .filter_map(move |pos| self.kind_at(pos).map(|kind| (pos, kind)))
            .filter(|(_, kind)| kind.is_wall())
    }

    /// Classify what lies between `start` and `target`.
    ///
    /// A solid wall anywhere on the line wins over destructible walls, even
    /// when the destructible wall comes first.
    #[must_use]
    pub fn check_path(&self, start: Vec2Fixed, target: Vec2Fixed) -> Obstruction {
        let mut result = Obstruction::Clear;
        for (_, kind) in self.walls_on_line(start, target) {
            match kind {
                CellKind::Solid => return Obstruction::BlockedBySolid,
                CellKind::Destructible => result = Obstruction::BlockedByDestructible,
                _ => {}
            }
        }
        result
    }

    /// World centre of the first wall on the line, or `target` if none.
    #[must_use]
    pub fn first_blocked_position(&self, start: Vec2Fixed, target: Vec2Fixed) -> Vec2Fixed {
        self.walls_on_line(start, target)
            .next()
            .map_or(target, |(pos, _)| self.grid_to_world(pos))
    }

    /// Shorthand for `check_path(..) == Obstruction::Clear`.
    #[must_use]
    pub fn has_line_of_sight(&self, start: Vec2Fixed, target: Vec2Fixed) -> bool {
        !self.check_path(start, target).is_blocked()
    }
}
