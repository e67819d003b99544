//! Bullet hits against walls and explosive chain clearing.
//!
//! This module only mutates cells and reports what happened. Granting
//! rewards, healing the shooter and damaging entities caught in an
//! explosion are the caller's job, once per [`HitResult`] with
//! `destroyed == true`.

use serde::{Deserialize, Serialize};

use crate::grid::{CellKind, GridPos, WallAttribute};
use crate::math::{Fixed, Vec2Fixed};
use crate::maze::Maze;

/// Outcome of a bullet reaching a point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HitResult {
    /// The bullet struck a wall and should be removed.
    pub contacted: bool,
    /// The struck wall was destroyed by this hit.
    pub destroyed: bool,
    /// Attribute of the destroyed wall; `None` unless `destroyed`.
    pub attribute: WallAttribute,
    /// Cell the point mapped to.
    pub grid_pos: GridPos,
    /// World-space centre of that cell.
    pub position: Vec2Fixed,
    /// Neighbouring walls cleared by an explosive wall.
    pub cleared_by_explosion: Vec<GridPos>,
}

impl HitResult {
    fn miss(grid_pos: GridPos, position: Vec2Fixed) -> Self {
        Self {
            contacted: false,
            destroyed: false,
            attribute: WallAttribute::None,
            grid_pos,
            position,
            cleared_by_explosion: Vec::new(),
        }
    }

    fn contact(grid_pos: GridPos, position: Vec2Fixed) -> Self {
        Self {
            contacted: true,
            ..Self::miss(grid_pos, position)
        }
    }

    /// Whether the destroyed wall was explosive.
    #[must_use]
    pub fn exploded(&self) -> bool {
        self.destroyed && self.attribute == WallAttribute::Explosive
    }
}

impl Maze {
    /// Apply a bullet hit of `damage` at `point`.
    ///
    /// - Out of bounds, `Empty` or `Exit`: no contact, nothing changes.
    /// - `Solid`: contact, nothing changes.
    /// - `Destructible`: health drops by `damage`; at or below zero the cell
    ///   becomes `Empty`. An explosive wall also clears every destructible
    ///   wall among its 8 neighbours (no further chaining).
    pub fn resolve_bullet_hit(&mut self, point: Vec2Fixed, damage: Fixed) -> HitResult {
        let pos = self.world_to_grid(point);
        let centre = self.grid_to_world(pos);

        let Some(cell) = self.cell_mut(pos) else {
            return HitResult::miss(pos, centre);
        };

        match cell.kind() {
            CellKind::Empty | CellKind::Exit => HitResult::miss(pos, centre),
            CellKind::Solid => HitResult::contact(pos, centre),
            CellKind::Destructible => {
                cell.health -= damage;
                if cell.health > Fixed::ZERO {
                    return HitResult::contact(pos, centre);
                }

                let attribute = cell.attribute();
                cell.clear();
                tracing::trace!(col = pos.col, row = pos.row, ?attribute, "Wall destroyed");

                let cleared_by_explosion = if attribute == WallAttribute::Explosive {
                    self.explode(pos)
                } else {
                    Vec::new()
                };

                HitResult {
                    contacted: true,
                    destroyed: true,
                    attribute,
                    grid_pos: pos,
                    position: centre,
                    cleared_by_explosion,
                }
            }
        }
    }

    /// Clear destructible walls in the 8-neighbourhood of `origin`.
    fn explode(&mut self, origin: GridPos) -> Vec<GridPos> {
        let mut cleared = Vec::new();
        for pos in origin.neighbors8() {
            if let Some(cell) = self.cell_mut(pos) {
                if cell.kind() == CellKind::Destructible {
                    cell.clear();
                    cleared.push(pos);
                }
            }
        }
        tracing::debug!(
            col = origin.col,
            row = origin.row,
            cleared = cleared.len(),
            "Explosive wall detonated"
        );
        cleared
    }

    /// World-space centres of the in-bounds cells surrounding `origin`.
    ///
    /// Callers use this to find entities caught in an explosion.
    #[must_use]
    pub fn explosion_area(&self, origin: GridPos) -> Vec<Vec2Fixed> {
        origin
            .neighbors8()
            .filter(|&pos| self.in_bounds(pos))
            .map(|pos| self.grid_to_world(pos))
            .collect()
    }
}
