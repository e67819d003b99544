//! The loaded maze: typed cells, coordinate mapping and named points.
//!
//! A [`Maze`] is built wholesale from the textual format and then only
//! mutated through [`Maze::resolve_bullet_hit`](crate::destruction). All
//! other operations are read-only queries.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::config::MazeSettings;
use crate::error::{MazeError, Result};
use crate::generator::{GeneratorConfig, MazeGenerator};
use crate::grid::{Cell, CellKind, GridPos, RoundedCorners, Tile};
use crate::math::{Fixed, Vec2Fixed};

/// Multiplayer spawn slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnSlot {
    /// Marker `1`.
    First,
    /// Marker `2`.
    Second,
}

impl SpawnSlot {
    const fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

/// A rectangular grid of cells with a fixed tile size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Maze {
    rows: usize,
    cols: usize,
    /// Cell data stored in row-major order.
    cells: Vec<Cell>,
    settings: MazeSettings,
    start: Option<GridPos>,
    exit: Option<GridPos>,
    spawns: [Option<GridPos>; 2],
    enemy_spawns: Vec<GridPos>,
    /// Text the maze was loaded from, kept verbatim for peers.
    source_rows: Vec<String>,
}

impl Maze {
    /// Load a maze from newline-separated rows.
    pub fn from_text(text: &str, settings: MazeSettings) -> Result<Self> {
        let rows: Vec<&str> = text
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .collect();
        Self::from_rows(&rows, settings)
    }

    /// Load a maze from individual rows.
    ///
    /// Rows shorter than the longest one are padded with empty floor.
    /// Unrecognised symbols are empty floor.
    pub fn from_rows<S: AsRef<str>>(rows: &[S], settings: MazeSettings) -> Result<Self> {
        settings.validate()?;
        if rows.is_empty() {
            return Err(MazeError::EmptyGrid);
        }

        let source_rows: Vec<String> = rows.iter().map(|r| r.as_ref().to_string()).collect();
        let row_count = source_rows.len();
        let col_count = source_rows
            .iter()
            .map(|r| r.chars().count())
            .max()
            .unwrap_or(0);
        if col_count == 0 {
            return Err(MazeError::EmptyGrid);
        }
        // Every world coordinate inside the maze must fit in fixed-point.
        let extent = row_count.max(col_count) as u64 * u64::from(settings.tile_size);
        if extent > i32::MAX as u64 {
            return Err(MazeError::InvalidConfig(format!(
                "{col_count}x{row_count} maze with tile_size {} exceeds the world coordinate range",
                settings.tile_size
            )));
        }

        let wall_health = settings.wall_health_fixed();
        let mut maze = Self {
            rows: row_count,
            cols: col_count,
            cells: vec![Cell::default(); row_count * col_count],
            settings,
            start: None,
            exit: None,
            spawns: [None, None],
            enemy_spawns: Vec::new(),
            source_rows,
        };

        for row in 0..row_count {
            let line = maze.source_rows[row].clone();
            for (col, ch) in line.chars().enumerate() {
                let pos = GridPos::new(col as i32, row as i32);
                let tile = Tile::from_char(ch);
                let cell = match tile {
                    Tile::Solid => Cell::of_kind(CellKind::Solid),
                    Tile::Exit => {
                        maze.exit = Some(pos);
                        Cell::of_kind(CellKind::Exit)
                    }
                    Tile::Start => {
                        maze.start = Some(pos);
                        Cell::of_kind(CellKind::Empty)
                    }
                    Tile::EnemySpawn => {
                        maze.enemy_spawns.push(pos);
                        Cell::of_kind(CellKind::Empty)
                    }
                    Tile::Spawn1 => {
                        maze.spawns[SpawnSlot::First.index()] = Some(pos);
                        Cell::of_kind(CellKind::Empty)
                    }
                    Tile::Spawn2 => {
                        maze.spawns[SpawnSlot::Second.index()] = Some(pos);
                        Cell::of_kind(CellKind::Empty)
                    }
                    other => match other.wall_attribute() {
                        Some(attribute) => Cell::destructible(attribute, wall_health),
                        None => Cell::of_kind(CellKind::Empty),
                    },
                };
                maze.cells[row * col_count + col] = cell;
            }
        }

        maze.compute_rounded_corners();

        #[cfg(feature = "debug-validation")]
        maze.assert_invariants();

        Ok(maze)
    }

    /// Generate a new maze and load it.
    pub fn generate(config: &GeneratorConfig, settings: MazeSettings) -> Result<Self> {
        let generated = MazeGenerator::new(config.clone())?.generate();
        Self::from_rows(&generated.rows, settings)
    }

    /// Number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Settings the maze was loaded with.
    #[must_use]
    pub const fn settings(&self) -> &MazeSettings {
        &self.settings
    }

    /// Edge length of a tile in world units.
    #[must_use]
    pub fn tile_size(&self) -> Fixed {
        self.settings.tile_size_fixed()
    }

    /// Overall maze extent in world units (width, height).
    #[must_use]
    pub fn size(&self) -> Vec2Fixed {
        let tile = self.tile_size();
        Vec2Fixed::new(
            Fixed::from_num(self.cols) * tile,
            Fixed::from_num(self.rows) * tile,
        )
    }

    /// Check if coordinates are within grid bounds.
    #[must_use]
    pub fn in_bounds(&self, pos: GridPos) -> bool {
        pos.col >= 0
            && pos.row >= 0
            && (pos.col as usize) < self.cols
            && (pos.row as usize) < self.rows
    }

    #[inline]
    pub(crate) fn index(&self, pos: GridPos) -> Option<usize> {
        if self.in_bounds(pos) {
            Some(pos.row as usize * self.cols + pos.col as usize)
        } else {
            None
        }
    }

    /// Read-only access to a cell. `None` if out of bounds.
    #[must_use]
    pub fn cell(&self, pos: GridPos) -> Option<&Cell> {
        self.index(pos).map(|i| &self.cells[i])
    }

    pub(crate) fn cell_mut(&mut self, pos: GridPos) -> Option<&mut Cell> {
        self.index(pos).map(move |i| &mut self.cells[i])
    }

    /// Cell kind at a position. `None` if out of bounds.
    #[must_use]
    pub fn kind_at(&self, pos: GridPos) -> Option<CellKind> {
        self.cell(pos).map(Cell::kind)
    }

    /// Map a world position to the cell containing it (floor division).
    ///
    /// The result may be out of bounds.
    #[must_use]
    pub fn world_to_grid(&self, point: Vec2Fixed) -> GridPos {
        let tile = self.tile_size();
        GridPos::new(
            (point.x / tile).floor().saturating_to_num::<i32>(),
            (point.y / tile).floor().saturating_to_num::<i32>(),
        )
    }

    /// Convert grid coordinates to world position (center of cell).
    #[must_use]
    pub fn grid_to_world(&self, pos: GridPos) -> Vec2Fixed {
        let tile = self.tile_size();
        let half = tile / Fixed::from_num(2);
        Vec2Fixed::new(
            Fixed::from_num(pos.col).saturating_mul(tile).saturating_add(half),
            Fixed::from_num(pos.row).saturating_mul(tile).saturating_add(half),
        )
    }

    /// True iff the cell is in bounds and is empty floor or the exit.
    #[must_use]
    pub fn is_walkable(&self, pos: GridPos) -> bool {
        self.kind_at(pos).is_some_and(CellKind::is_walkable)
    }

    /// True if the cell is a wall. Out-of-bounds positions count as walls.
    #[must_use]
    pub fn is_wall(&self, pos: GridPos) -> bool {
        self.kind_at(pos).map_or(true, CellKind::is_wall)
    }

    /// Start point (`S`), if the maze has one.
    #[must_use]
    pub fn start(&self) -> Option<Vec2Fixed> {
        self.start.map(|p| self.grid_to_world(p))
    }

    /// Cell holding the start point.
    #[must_use]
    pub const fn start_cell(&self) -> Option<GridPos> {
        self.start
    }

    /// Exit point (`E`), if the maze has one.
    #[must_use]
    pub fn exit(&self) -> Option<Vec2Fixed> {
        self.exit.map(|p| self.grid_to_world(p))
    }

    /// Cell holding the exit.
    #[must_use]
    pub const fn exit_cell(&self) -> Option<GridPos> {
        self.exit
    }

    /// Multiplayer spawn point for a slot, if present.
    #[must_use]
    pub fn spawn(&self, slot: SpawnSlot) -> Option<Vec2Fixed> {
        self.spawns[slot.index()].map(|p| self.grid_to_world(p))
    }

    /// Cell holding a multiplayer spawn.
    #[must_use]
    pub const fn spawn_cell(&self, slot: SpawnSlot) -> Option<GridPos> {
        self.spawns[slot.index()]
    }

    /// Enemy spawn points (`X`) in reading order.
    #[must_use]
    pub fn enemy_spawn_points(&self) -> Vec<Vec2Fixed> {
        self.enemy_spawns
            .iter()
            .map(|&p| self.grid_to_world(p))
            .collect()
    }

    /// Whether a circle at `point` has reached the exit.
    ///
    /// Touching counts once the centres are closer than `radius` plus half a
    /// tile. Mazes without an exit never report arrival.
    #[must_use]
    pub fn is_at_exit(&self, point: Vec2Fixed, radius: Fixed) -> bool {
        let half_tile = self.tile_size() / Fixed::from_num(2);
        self.exit()
            .is_some_and(|exit| point.within(exit, radius + half_tile))
    }

    /// Remaining health ratio of a destructible wall (1 = untouched).
    #[must_use]
    pub fn health_fraction(&self, pos: GridPos) -> Option<Fixed> {
        self.cell(pos)
            .filter(|c| c.kind() == CellKind::Destructible && c.max_health() > Fixed::ZERO)
            .map(|c| c.health() / c.max_health())
    }

    /// The rows this maze was loaded from.
    #[must_use]
    pub fn source_rows(&self) -> &[String] {
        &self.source_rows
    }

    /// The text this maze was loaded from, one row per line.
    ///
    /// This is what a host sends to its peer.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.source_rows.join("\n")
    }

    /// Render the current cell state (after destruction) in the textual
    /// format, re-adding the named markers.
    #[must_use]
    pub fn snapshot_text(&self) -> String {
        let mut chars: Vec<Vec<char>> = (0..self.rows)
            .map(|row| {
                (0..self.cols)
                    .map(|col| {
                        let cell = &self.cells[row * self.cols + col];
                        match cell.kind() {
                            CellKind::Empty => Tile::Empty,
                            CellKind::Solid => Tile::Solid,
                            CellKind::Exit => Tile::Exit,
                            CellKind::Destructible => Tile::from(cell.attribute()),
                        }
                        .to_char()
                    })
                    .collect()
            })
            .collect();

        let mut mark = |pos: GridPos, tile: Tile| {
            if self.kind_at(pos) == Some(CellKind::Empty) {
                chars[pos.row as usize][pos.col as usize] = tile.to_char();
            }
        };
        for &pos in &self.enemy_spawns {
            mark(pos, Tile::EnemySpawn);
        }
        if let Some(pos) = self.start {
            mark(pos, Tile::Start);
        }
        if let Some(pos) = self.spawns[0] {
            mark(pos, Tile::Spawn1);
        }
        if let Some(pos) = self.spawns[1] {
            mark(pos, Tile::Spawn2);
        }

        chars
            .into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Hash of the mutable cell state for determinism checks.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.rows.hash(&mut hasher);
        self.cols.hash(&mut hasher);
        for cell in &self.cells {
            cell.kind().hash(&mut hasher);
            cell.attribute().hash(&mut hasher);
            cell.health().to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }

    /// Derive corner rounding for every wall tile.
    ///
    /// A corner is rounded iff both orthogonal neighbours sharing it are not
    /// walls. Diagonal neighbours do not participate.
    fn compute_rounded_corners(&mut self) {
        for row in 0..self.rows as i32 {
            for col in 0..self.cols as i32 {
                let pos = GridPos::new(col, row);
                if !self.is_wall(pos) {
                    continue;
                }

                let north = self.is_wall(pos.offset(0, -1));
                let south = self.is_wall(pos.offset(0, 1));
                let west = self.is_wall(pos.offset(-1, 0));
                let east = self.is_wall(pos.offset(1, 0));

                let rounded = RoundedCorners([
                    !north && !west,
                    !north && !east,
                    !south && !east,
                    !south && !west,
                ]);
                if let Some(cell) = self.cell_mut(pos) {
                    cell.rounded = rounded;
                }
            }
        }
    }

    #[cfg(feature = "debug-validation")]
    fn assert_invariants(&self) {
        use crate::grid::WallAttribute;

        for cell in &self.cells {
            assert!(
                cell.kind() == CellKind::Destructible || cell.attribute() == WallAttribute::None,
                "attribute set on non-destructible cell: {cell:?}"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Corner, WallAttribute};

    fn load(rows: &[&str]) -> Maze {
        Maze::from_rows(rows, MazeSettings::default()).unwrap()
    }

    fn world(x: i32, y: i32) -> Vec2Fixed {
        Vec2Fixed::from_int(x, y)
    }

    #[test]
    fn test_world_range_overflow_rejected() {
        let settings = MazeSettings::default().with_tile_size(crate::config::MAX_TILE_SIZE);
        let too_wide = ".".repeat(32_768);
        assert!(matches!(
            Maze::from_rows(&[too_wide.as_str()], settings),
            Err(MazeError::InvalidConfig(_))
        ));

        let widest = ".".repeat(32_767);
        let maze = Maze::from_rows(&[widest.as_str()], settings).unwrap();
        assert_eq!(maze.size().x, Fixed::from_num(32_767 * 65_536));
        assert_eq!(
            maze.grid_to_world(GridPos::new(i32::MAX, 0)).x,
            Fixed::MAX
        );
    }

    #[test]
    fn test_load_symbols() {
        let maze = load(&["#####", "#S*E#", "#GHB#", "#X12#", "#####"]);
        assert_eq!(maze.rows(), 5);
        assert_eq!(maze.cols(), 5);
        assert_eq!(maze.start_cell(), Some(GridPos::new(1, 1)));
        assert_eq!(maze.exit_cell(), Some(GridPos::new(3, 1)));
        assert_eq!(maze.kind_at(GridPos::new(3, 1)), Some(CellKind::Exit));
        assert_eq!(maze.kind_at(GridPos::new(2, 1)), Some(CellKind::Destructible));
        assert_eq!(
            maze.cell(GridPos::new(1, 2)).map(Cell::attribute),
            Some(WallAttribute::RewardGrant)
        );
        assert_eq!(
            maze.cell(GridPos::new(2, 2)).map(Cell::attribute),
            Some(WallAttribute::HealGrant)
        );
        assert_eq!(
            maze.cell(GridPos::new(3, 2)).map(Cell::attribute),
            Some(WallAttribute::Explosive)
        );
        assert_eq!(maze.spawn_cell(SpawnSlot::First), Some(GridPos::new(2, 3)));
        assert_eq!(maze.spawn_cell(SpawnSlot::Second), Some(GridPos::new(3, 3)));
        assert_eq!(maze.enemy_spawn_points(), vec![world(75, 175)]);
    }

    #[test]
    fn test_destructible_health_from_settings() {
        let maze = Maze::from_rows(&["*"], MazeSettings::default().with_wall_health(60)).unwrap();
        let cell = maze.cell(GridPos::new(0, 0)).unwrap();
        assert_eq!(cell.health(), Fixed::from_num(60));
        assert_eq!(cell.max_health(), Fixed::from_num(60));
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(matches!(
            Maze::from_text("", MazeSettings::default()),
            Err(MazeError::EmptyGrid)
        ));
    }

    #[test]
    fn test_ragged_rows_padded_with_floor() {
        let maze = load(&["###", "#"]);
        assert_eq!(maze.cols(), 3);
        assert_eq!(maze.kind_at(GridPos::new(2, 1)), Some(CellKind::Empty));
    }

    #[test]
    fn test_unknown_symbols_are_floor() {
        let maze = load(&["#?#"]);
        assert!(maze.is_walkable(GridPos::new(1, 0)));
    }

    #[test]
    fn test_world_to_grid_conversion() {
        let maze = load(&["....", "....", "...."]);
        assert_eq!(maze.world_to_grid(world(0, 0)), GridPos::new(0, 0));
        assert_eq!(maze.world_to_grid(world(49, 49)), GridPos::new(0, 0));
        assert_eq!(maze.world_to_grid(world(50, 120)), GridPos::new(1, 2));
        // Floor division keeps negative positions out of bounds.
        assert_eq!(maze.world_to_grid(world(-1, 10)), GridPos::new(-1, 0));
    }

    #[test]
    fn test_grid_to_world_conversion() {
        let maze = load(&["...."]);
        assert_eq!(maze.grid_to_world(GridPos::new(0, 0)), world(25, 25));
        assert_eq!(maze.grid_to_world(GridPos::new(3, 0)), world(175, 25));
    }

    #[test]
    fn test_walkable_and_wall_bounds() {
        let maze = load(&["#*", ".E"]);
        assert!(!maze.is_walkable(GridPos::new(0, 0)));
        assert!(!maze.is_walkable(GridPos::new(1, 0)));
        assert!(maze.is_walkable(GridPos::new(0, 1)));
        assert!(maze.is_walkable(GridPos::new(1, 1)));
        assert!(!maze.is_walkable(GridPos::new(5, 5)));

        assert!(maze.is_wall(GridPos::new(0, 0)));
        assert!(maze.is_wall(GridPos::new(1, 0)));
        assert!(!maze.is_wall(GridPos::new(1, 1)));
        assert!(maze.is_wall(GridPos::new(-1, 0)));
    }

    #[test]
    fn test_size_in_world_units() {
        let maze = load(&["....", "...."]);
        assert_eq!(maze.size(), world(200, 100));
    }

    #[test]
    fn test_isolated_wall_rounds_all_corners() {
        let maze = load(&["...", ".#.", "..."]);
        let corners = maze.cell(GridPos::new(1, 1)).unwrap().rounded_corners();
        for corner in Corner::ALL {
            assert!(corners.is_rounded(corner));
        }
    }

    #[test]
    fn test_corner_rounding_uses_orthogonal_neighbors_only() {
        // Diagonal walls around the centre do not suppress rounding.
        let maze = load(&["#.#", ".#.", "#.#"]);
        let corners = maze.cell(GridPos::new(1, 1)).unwrap().rounded_corners();
        assert_eq!(corners, RoundedCorners([true; 4]));
    }

    #[test]
    fn test_corner_rounding_wall_run() {
        // Middle of a horizontal run: only north/south open.
        let maze = load(&[".....", ".###.", "....."]);
        let middle = maze.cell(GridPos::new(2, 1)).unwrap().rounded_corners();
        assert_eq!(middle, RoundedCorners::NONE);
        let left_end = maze.cell(GridPos::new(1, 1)).unwrap().rounded_corners();
        assert!(left_end.is_rounded(Corner::NorthWest));
        assert!(left_end.is_rounded(Corner::SouthWest));
        assert!(!left_end.is_rounded(Corner::NorthEast));
    }

    #[test]
    fn test_bounds_suppress_rounding() {
        let maze = load(&["#."]);
        let corners = maze.cell(GridPos::new(0, 0)).unwrap().rounded_corners();
        assert_eq!(corners, RoundedCorners::NONE);
    }

    #[test]
    fn test_is_at_exit() {
        let maze = load(&["S.E"]);
        let exit = maze.exit().unwrap();
        assert_eq!(exit, world(125, 25));
        assert!(maze.is_at_exit(world(100, 25), Fixed::from_num(5)));
        assert!(!maze.is_at_exit(world(80, 25), Fixed::from_num(5)));
    }

    #[test]
    fn test_no_exit_never_arrives() {
        let maze = load(&["S.."]);
        assert!(!maze.is_at_exit(world(25, 25), Fixed::from_num(500)));
    }

    #[test]
    fn test_text_round_trip() {
        let rows = ["#####", "#S.E#", "#####"];
        let maze = load(&rows);
        assert_eq!(maze.to_text(), rows.join("\n"));
        let reloaded = Maze::from_text(&maze.to_text(), MazeSettings::default()).unwrap();
        assert_eq!(reloaded.state_hash(), maze.state_hash());
    }

    #[test]
    fn test_snapshot_text_matches_fresh_load() {
        let rows = ["#####", "#S*E#", "#X1G#", "#####"];
        let maze = load(&rows);
        assert_eq!(maze.snapshot_text(), rows.join("\n"));
    }

    #[test]
    fn test_health_fraction() {
        let maze = load(&["*#"]);
        assert_eq!(maze.health_fraction(GridPos::new(0, 0)), Some(Fixed::ONE));
        assert_eq!(maze.health_fraction(GridPos::new(1, 0)), None);
    }
}
