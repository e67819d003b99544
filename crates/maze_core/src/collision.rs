//! Circle-versus-wall collision with per-corner rounding.
//!
//! Every wall tile is drawn as a rectangle inset by [`TILE_INSET`] on each
//! side. Corners flagged as rounded are treated as quarter circles of the
//! configured corner radius; the rest of the rectangle uses a plain
//! clamped-point test.

use crate::grid::{CellKind, Corner, GridPos};
use crate::math::{Fixed, Vec2Fixed};
use crate::maze::Maze;

/// Gap between a wall rectangle and its tile edge, in world units.
pub const TILE_INSET: Fixed = Fixed::ONE;

/// Axis-aligned wall rectangle in world space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WallRect {
    left: Fixed,
    top: Fixed,
    right: Fixed,
    bottom: Fixed,
}

impl WallRect {
    fn for_tile(pos: GridPos, tile: Fixed) -> Self {
        let left = Fixed::from_num(pos.col) * tile + TILE_INSET;
        let top = Fixed::from_num(pos.row) * tile + TILE_INSET;
        let inner = tile - TILE_INSET * Fixed::from_num(2);
        Self {
            left,
            top,
            right: left + inner,
            bottom: top + inner,
        }
    }

    fn clamp(&self, point: Vec2Fixed) -> Vec2Fixed {
        Vec2Fixed::new(
            point.x.clamp(self.left, self.right),
            point.y.clamp(self.top, self.bottom),
        )
    }
}

impl Maze {
    /// Whether a circle at `point` with `radius` overlaps any wall.
    ///
    /// Only `Solid` and `Destructible` tiles collide. Queries entirely
    /// outside the maze never collide.
    #[must_use]
    pub fn check_collision(&self, point: Vec2Fixed, radius: Fixed) -> bool {
        let tile = self.tile_size();
        let corner_radius = self.settings().corner_radius_fixed();

        let reach = Vec2Fixed::new(radius, radius);
        let min = self.world_to_grid(point - reach);
        let max = self.world_to_grid(point + reach);

        let min_col = min.col.max(0);
        let min_row = min.row.max(0);
        let max_col = max.col.min(self.cols() as i32 - 1);
        let max_row = max.row.min(self.rows() as i32 - 1);

        for row in min_row..=max_row {
            for col in min_col..=max_col {
                let pos = GridPos::new(col, row);
                let Some(cell) = self.cell(pos) else {
                    continue;
                };
                if !matches!(cell.kind(), CellKind::Solid | CellKind::Destructible) {
                    continue;
                }

                let rect = WallRect::for_tile(pos, tile);
                if circle_hits_wall(&rect, cell.rounded_corners().0, corner_radius, point, radius)
                {
                    return true;
                }
            }
        }

        false
    }
}

/// Corner zone containing `point`, if any.
///
/// Returns the corner together with the centre of its rounding arc.
fn corner_zone(
    rect: &WallRect,
    corner_radius: Fixed,
    point: Vec2Fixed,
) -> Option<(Corner, Vec2Fixed)> {
    let inner_left = rect.left + corner_radius;
    let inner_right = rect.right - corner_radius;
    let inner_top = rect.top + corner_radius;
    let inner_bottom = rect.bottom - corner_radius;

    let in_left = point.x < inner_left;
    let in_right = point.x > inner_right;
    let in_top = point.y < inner_top;
    let in_bottom = point.y > inner_bottom;

    let corner = match (in_left, in_right, in_top, in_bottom) {
        (true, _, true, _) => Corner::NorthWest,
        (_, true, true, _) => Corner::NorthEast,
        (_, true, _, true) => Corner::SouthEast,
        (true, _, _, true) => Corner::SouthWest,
        _ => return None,
    };

    let centre_x = if in_left { inner_left } else { inner_right };
    let centre_y = if in_top { inner_top } else { inner_bottom };
    Some((corner, Vec2Fixed::new(centre_x, centre_y)))
}

fn circle_hits_wall(
    rect: &WallRect,
    rounded: [bool; 4],
    corner_radius: Fixed,
    point: Vec2Fixed,
    radius: Fixed,
) -> bool {
    match corner_zone(rect, corner_radius, point) {
        Some((corner, arc_centre)) if rounded[corner as usize] => {
            point.within(arc_centre, radius + corner_radius)
        }
        _ => point.within(rect.clamp(point), radius),
    }
}
