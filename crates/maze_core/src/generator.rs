//! Procedural maze generation.
//!
//! Generates textual mazes with:
//! - A spanning tree of 1-wide corridors (recursive backtracker)
//! - Start and exit far apart, with a guaranteed path between them
//! - Enemy spawn markers away from both
//! - Destructible walls along corridors, with attributes in multiplayer
//! - Multiplayer spawn pairs near the centre and an exit fair to both
//!
//! Output is fully determined by the configuration when a seed is set. The
//! host of a multiplayer match generates once and sends the text to the peer.

use std::cmp::Reverse;
use std::collections::VecDeque;
use std::ops::RangeInclusive;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};
use crate::grid::{GridPos, Tile, WallAttribute};

/// Smallest generated width or height.
pub const MIN_DIMENSION: u32 = 5;

/// Largest accepted width or height.
pub const MAX_DIMENSION: u32 = 4095;

/// Enemies spawn strictly farther than this from the start (or a spawn).
const ENEMY_MIN_START_DISTANCE: u32 = 5;

/// Enemies spawn strictly farther than this from the exit.
const ENEMY_MIN_EXIT_DISTANCE: u32 = 3;

/// Share of farthest cells the single-player exit is drawn from.
const SINGLE_PLAYER_EXIT_FRACTION: f64 = 0.1;

/// Share of farthest cells the provisional multiplayer exit is drawn from.
const MULTIPLAYER_EXIT_FRACTION: f64 = 0.3;

/// Explosive walls keep at least this many tiles from every map edge.
const EXPLOSIVE_EDGE_MARGIN: i32 = 2;

const EXPLOSIVE_CHANCE: f64 = 0.1;
const REWARD_CHANCE: f64 = 0.5;
/// Cumulative with [`REWARD_CHANCE`].
const HEAL_CHANCE: f64 = 0.75;

/// Carving steps two cells at a time: north, east, south, west.
const CARVE_STEPS: [(i32, i32); 4] = [(0, -2), (2, 0), (0, 2), (-2, 0)];

/// 4-directional neighbours: north, east, south, west.
const NEIGHBORS4: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Parameters for procedural generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Width in cells, border included. Raised to 5 and forced odd.
    pub width: u32,
    /// Height in cells, border included. Raised to 5 and forced odd.
    pub height: u32,
    /// Seed for deterministic output. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Maximum number of enemy spawn markers.
    pub enemy_count: u32,
    /// Chance that a corridor-facing wall becomes destructible.
    pub destructible_ratio: f32,
    /// Place two fair spawn points instead of a start.
    pub multiplayer: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 21,
            height: 15,
            seed: None,
            enemy_count: 5,
            destructible_ratio: 0.15,
            multiplayer: false,
        }
    }
}

impl GeneratorConfig {
    /// Set the requested dimensions.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the enemy count.
    #[must_use]
    pub const fn with_enemy_count(mut self, enemy_count: u32) -> Self {
        self.enemy_count = enemy_count;
        self
    }

    /// Set the destructible wall ratio (clamped to 0.0-1.0).
    #[must_use]
    pub fn with_destructible_ratio(mut self, ratio: f32) -> Self {
        self.destructible_ratio = ratio.clamp(0.0, 1.0);
        self
    }

    /// Enable or disable multiplayer placement.
    #[must_use]
    pub const fn with_multiplayer(mut self, multiplayer: bool) -> Self {
        self.multiplayer = multiplayer;
        self
    }

    /// Dimensions actually generated: at least [`MIN_DIMENSION`], always odd.
    #[must_use]
    pub fn effective_size(&self) -> (u32, u32) {
        let fix = |n: u32| {
            let n = n.max(MIN_DIMENSION);
            if n % 2 == 0 {
                n + 1
            } else {
                n
            }
        };
        (fix(self.width), fix(self.height))
    }

    /// Reject parameters generation cannot honour.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.destructible_ratio) {
            return Err(MazeError::InvalidConfig(format!(
                "destructible_ratio must be within 0.0..=1.0, got {}",
                self.destructible_ratio
            )));
        }
        if self.width > MAX_DIMENSION || self.height > MAX_DIMENSION {
            return Err(MazeError::InvalidConfig(format!(
                "maze dimensions {}x{} exceed {MAX_DIMENSION}",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// A generated maze in textual form plus its named points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMaze {
    /// Rows of the textual format, all of equal length.
    pub rows: Vec<String>,
    /// Start marker. `None` in multiplayer mazes.
    pub start: Option<GridPos>,
    /// Exit marker.
    pub exit: GridPos,
    /// Spawn markers `1` and `2` in multiplayer mazes.
    pub spawns: Option<[GridPos; 2]>,
}

impl GeneratedMaze {
    /// Rows joined with newlines, as sent to peers.
    #[must_use]
    pub fn to_text(&self) -> String {
        self.rows.join("\n")
    }
}

/// Maze generator owning its random source.
#[derive(Debug, Clone)]
pub struct MazeGenerator {
    config: GeneratorConfig,
    width: i32,
    height: i32,
    rng: ChaCha8Rng,
}

impl MazeGenerator {
    /// Create a generator, seeded from the config or from OS entropy.
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let (width, height) = config.effective_size();
        if (width, height) != (config.width, config.height) {
            tracing::debug!(
                requested_width = config.width,
                requested_height = config.height,
                width,
                height,
                "Normalised maze dimensions"
            );
        }
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            config,
            width: width as i32,
            height: height as i32,
            rng,
        })
    }

    /// Generation parameters.
    #[must_use]
    pub const fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generate a maze.
    ///
    /// With a seed, every call re-seeds and returns the same maze. Without
    /// one, successive calls continue the entropy-seeded stream.
    pub fn generate(&mut self) -> GeneratedMaze {
        if let Some(seed) = self.config.seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }
        let rng = &mut self.rng;
        let config = &self.config;

        let mut canvas = Canvas::filled(self.width, self.height, Tile::Solid);
        carve_passages(&mut canvas, rng);

        let fraction = if config.multiplayer {
            MULTIPLAYER_EXIT_FRACTION
        } else {
            SINGLE_PLAYER_EXIT_FRACTION
        };
        let (start, mut exit) = place_start_and_exit(&mut canvas, rng, fraction);
        ensure_path(&mut canvas, rng, start, exit);

        let mut spawns = None;
        if config.multiplayer {
            canvas.set(start, Tile::Empty);
            canvas.set(exit, Tile::Empty);
            let pair = place_spawns(&canvas, rng);
            exit = place_fair_exit(&canvas, rng, pair, exit);
            canvas.set(pair[0], Tile::Spawn1);
            canvas.set(pair[1], Tile::Spawn2);
            canvas.set(exit, Tile::Exit);
            for spawn in pair {
                ensure_path(&mut canvas, rng, spawn, exit);
            }
            spawns = Some(pair);
        }

        let anchors: Vec<GridPos> = match spawns {
            Some(pair) => pair.to_vec(),
            None => vec![start],
        };
        let enemies = place_enemies(
            &mut canvas,
            rng,
            &anchors,
            exit,
            config.enemy_count as usize,
        );
        let walls = place_destructible_walls(
            &mut canvas,
            rng,
            config.destructible_ratio,
            config.multiplayer,
        );

        tracing::debug!(
            width = self.width,
            height = self.height,
            seed = ?config.seed,
            multiplayer = config.multiplayer,
            enemies,
            walls,
            "Generated maze"
        );

        GeneratedMaze {
            rows: canvas.rows(),
            start: spawns.is_none().then_some(start),
            exit,
            spawns,
        }
    }
}

/// Mutable character grid used during generation.
#[derive(Debug, Clone)]
struct Canvas {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Canvas {
    fn filled(width: i32, height: i32, tile: Tile) -> Self {
        Self {
            width,
            height,
            tiles: vec![tile; (width * height) as usize],
        }
    }

    #[inline]
    fn index(&self, pos: GridPos) -> usize {
        debug_assert!(self.contains(pos), "{pos:?} outside canvas");
        (pos.row * self.width + pos.col) as usize
    }

    fn contains(&self, pos: GridPos) -> bool {
        pos.col >= 0 && pos.row >= 0 && pos.col < self.width && pos.row < self.height
    }

    /// Inside the one-cell border.
    fn is_interior(&self, pos: GridPos) -> bool {
        pos.col > 0 && pos.row > 0 && pos.col < self.width - 1 && pos.row < self.height - 1
    }

    fn tile(&self, pos: GridPos) -> Tile {
        self.tiles[self.index(pos)]
    }

    fn set(&mut self, pos: GridPos, tile: Tile) {
        let i = self.index(pos);
        self.tiles[i] = tile;
    }

    /// Interior positions in row-major order.
    fn interior(&self) -> impl Iterator<Item = GridPos> {
        let (width, height) = (self.width, self.height);
        (1..height - 1).flat_map(move |row| (1..width - 1).map(move |col| GridPos::new(col, row)))
    }

    /// Interior cells holding plain floor, row-major.
    fn open_floor(&self) -> Vec<GridPos> {
        self.interior()
            .filter(|&p| self.tile(p) == Tile::Empty)
            .collect()
    }

    /// Tiles between this cell and the nearest map edge.
    fn edge_distance(&self, pos: GridPos) -> i32 {
        pos.col
            .min(pos.row)
            .min(self.width - 1 - pos.col)
            .min(self.height - 1 - pos.row)
    }

    fn rows(&self) -> Vec<String> {
        self.tiles
            .chunks(self.width as usize)
            .map(|row| row.iter().map(|t| t.to_char()).collect())
            .collect()
    }
}

/// One level of the backtracker: a cell and its shuffled directions.
struct CarveFrame {
    pos: GridPos,
    dirs: [usize; 4],
    next: usize,
}

impl CarveFrame {
    fn new(pos: GridPos, rng: &mut ChaCha8Rng) -> Self {
        let mut dirs = [0, 1, 2, 3];
        dirs.shuffle(rng);
        Self { pos, dirs, next: 0 }
    }
}

/// Recursive backtracker from (1,1), run on an explicit stack.
///
/// Directions are shuffled when a cell is entered, so the random stream is
/// consumed in the same order as the recursive formulation.
fn carve_passages(canvas: &mut Canvas, rng: &mut ChaCha8Rng) {
    let origin = GridPos::new(1, 1);
    canvas.set(origin, Tile::Empty);
    let mut stack = vec![CarveFrame::new(origin, rng)];

    while let Some(frame) = stack.last_mut() {
        if frame.next == frame.dirs.len() {
            stack.pop();
            continue;
        }
        let (dx, dy) = CARVE_STEPS[frame.dirs[frame.next]];
        frame.next += 1;
        let pos = frame.pos;

        let target = pos.offset(dx, dy);
        if canvas.is_interior(target) && canvas.tile(target) == Tile::Solid {
            canvas.set(pos.offset(dx / 2, dy / 2), Tile::Empty);
            canvas.set(target, Tile::Empty);
            stack.push(CarveFrame::new(target, rng));
        }
    }
}

/// Pick a random start and an exit among the cells farthest from it.
fn place_start_and_exit(
    canvas: &mut Canvas,
    rng: &mut ChaCha8Rng,
    fraction: f64,
) -> (GridPos, GridPos) {
    let mut open = canvas.open_floor();
    let (start, exit) = if open.len() < 2 {
        tracing::debug!(open = open.len(), "Too few open cells, using corner start and exit");
        (
            GridPos::new(1, 1),
            GridPos::new(canvas.width - 2, canvas.height - 2),
        )
    } else {
        open.shuffle(rng);
        let start = open[0];
        let mut ranked = open.split_off(1);
        // Stable: equal distances keep their shuffled order.
        ranked.sort_by_key(|p| Reverse(p.manhattan(start)));
        let top = ((ranked.len() as f64 * fraction) as usize).max(1);
        (start, ranked[rng.gen_range(0..top)])
    };

    canvas.set(start, Tile::Start);
    canvas.set(exit, Tile::Exit);
    (start, exit)
}

/// Guarantee `to` is reachable from `from` through non-solid interior cells.
///
/// Carves a jagged corridor when the flood fill misses. Returns whether
/// anything was carved.
fn ensure_path(canvas: &mut Canvas, rng: &mut ChaCha8Rng, from: GridPos, to: GridPos) -> bool {
    let mut visited = vec![false; canvas.tiles.len()];
    let mut queue = VecDeque::new();
    visited[canvas.index(from)] = true;
    queue.push_back(from);

    while let Some(pos) = queue.pop_front() {
        if pos == to {
            return false;
        }
        for (dx, dy) in NEIGHBORS4 {
            let next = pos.offset(dx, dy);
            if !canvas.is_interior(next) {
                continue;
            }
            let i = canvas.index(next);
            if !visited[i] && canvas.tile(next) != Tile::Solid {
                visited[i] = true;
                queue.push_back(next);
            }
        }
    }

    tracing::debug!(?from, ?to, "Repairing connectivity");
    let toward = |a: i32, b: i32| if b > a { 1 } else { -1 };
    let mut pos = from;
    while pos != to {
        let prefer_x = rng.gen_bool(0.5);
        if prefer_x && pos.col != to.col {
            pos.col += toward(pos.col, to.col);
        } else if pos.row != to.row {
            pos.row += toward(pos.row, to.row);
        } else {
            pos.col += toward(pos.col, to.col);
        }
        if canvas.tile(pos) == Tile::Solid {
            canvas.set(pos, Tile::Empty);
        }
    }
    true
}

/// Open floor cells whose coordinates fall within the `lo..=hi` fractions
/// (numerator, denominator) of each axis.
fn central_cells(
    canvas: &Canvas,
    open: &[GridPos],
    lo: (i32, i32),
    hi: (i32, i32),
) -> Vec<GridPos> {
    let range = |size: i32, (num, den): (i32, i32)| size * num / den;
    let (min_col, max_col) = (range(canvas.width, lo), range(canvas.width, hi));
    let (min_row, max_row) = (range(canvas.height, lo), range(canvas.height, hi));
    open.iter()
        .copied()
        .filter(|p| (min_col..=max_col).contains(&p.col) && (min_row..=max_row).contains(&p.row))
        .collect()
}

/// Choose two spawn points near the centre at a moderate distance apart.
///
/// The search widens to the larger central region when the inner one holds
/// no pair at a qualifying distance.
fn place_spawns(canvas: &Canvas, rng: &mut ChaCha8Rng) -> [GridPos; 2] {
    let open = canvas.open_floor();
    let size = canvas.width.min(canvas.height) as u32;
    let band = 6u32.min(size / 4)..=15u32.max(size / 2);

    let mut pairs = spawn_pairs(&central_cells(canvas, &open, (1, 4), (3, 4)), &band);
    if pairs.is_empty() {
        tracing::debug!("Widening spawn region");
        pairs = spawn_pairs(&central_cells(canvas, &open, (1, 6), (5, 6)), &band);
    }

    pairs.choose(rng).copied().unwrap_or_else(|| {
        tracing::debug!("No qualifying spawn pair, using corners");
        [
            GridPos::new(1, 1),
            GridPos::new(canvas.width - 2, canvas.height - 2),
        ]
    })
}

/// Every pair of candidates whose distance lies within `band`.
fn spawn_pairs(candidates: &[GridPos], band: &RangeInclusive<u32>) -> Vec<[GridPos; 2]> {
    let mut pairs = Vec::new();
    for (i, &a) in candidates.iter().enumerate() {
        for &b in &candidates[i + 1..] {
            if band.contains(&a.manhattan(b)) {
                pairs.push([a, b]);
            }
        }
    }
    pairs
}

/// Exit candidate scored against both spawns.
#[derive(Debug, Clone, Copy)]
struct ExitCandidate {
    pos: GridPos,
    min_distance: u32,
    difference: u32,
    on_border: bool,
}

impl ExitCandidate {
    fn is_fair(&self) -> bool {
        self.difference <= 3u32.max(self.min_distance / 3)
    }
}

/// Place the exit far from both spawns with a bounded distance difference.
///
/// Prefers the outer border ring; falls back to any fair cell, then to the
/// least unfair open cell, then to `fallback`.
fn place_fair_exit(
    canvas: &Canvas,
    rng: &mut ChaCha8Rng,
    spawns: [GridPos; 2],
    fallback: GridPos,
) -> GridPos {
    let (ring_w, ring_h) = (canvas.width / 4, canvas.height / 4);
    let candidates: Vec<ExitCandidate> = canvas
        .open_floor()
        .into_iter()
        .filter(|p| !spawns.contains(p))
        .map(|pos| {
            let d1 = pos.manhattan(spawns[0]);
            let d2 = pos.manhattan(spawns[1]);
            ExitCandidate {
                pos,
                min_distance: d1.min(d2),
                difference: d1.abs_diff(d2),
                on_border: pos.col < ring_w
                    || pos.row < ring_h
                    || pos.col >= canvas.width - ring_w
                    || pos.row >= canvas.height - ring_h,
            }
        })
        .collect();

    let mut fair: Vec<ExitCandidate> = candidates
        .iter()
        .filter(|c| c.on_border && c.is_fair())
        .copied()
        .collect();
    if fair.len() < 3 {
        fair = candidates.iter().filter(|c| c.is_fair()).copied().collect();
    }

    if fair.is_empty() {
        tracing::debug!("No fair exit candidate, using least unfair cell");
        return candidates
            .iter()
            .min_by_key(|c| (c.difference, Reverse(c.min_distance)))
            .map_or(fallback, |c| c.pos);
    }

    fair.sort_by_key(|c| (Reverse(c.min_distance), c.difference));
    let top = (fair.len() / 4).max(1);
    fair[rng.gen_range(0..top)].pos
}

/// Mark up to `count` enemy spawns away from the anchors and exit.
fn place_enemies(
    canvas: &mut Canvas,
    rng: &mut ChaCha8Rng,
    anchors: &[GridPos],
    exit: GridPos,
    count: usize,
) -> usize {
    let mut spots: Vec<GridPos> = canvas
        .open_floor()
        .into_iter()
        .filter(|p| {
            anchors
                .iter()
                .all(|a| p.manhattan(*a) > ENEMY_MIN_START_DISTANCE)
                && p.manhattan(exit) > ENEMY_MIN_EXIT_DISTANCE
        })
        .collect();
    spots.shuffle(rng);

    let placed = spots.len().min(count);
    for &pos in &spots[..placed] {
        canvas.set(pos, Tile::EnemySpawn);
    }
    placed
}

/// Whether a destructible wall may face this tile.
const fn faces_corridor(tile: Tile) -> bool {
    matches!(
        tile,
        Tile::Empty | Tile::Start | Tile::Exit | Tile::Spawn1 | Tile::Spawn2
    )
}

/// Turn corridor-facing solid walls destructible. Returns how many.
fn place_destructible_walls(
    canvas: &mut Canvas,
    rng: &mut ChaCha8Rng,
    ratio: f32,
    multiplayer: bool,
) -> usize {
    let mut candidates = Vec::new();
    for pos in canvas.interior().collect::<Vec<_>>() {
        if canvas.tile(pos) != Tile::Solid {
            continue;
        }
        let faces = NEIGHBORS4
            .iter()
            .any(|&(dx, dy)| faces_corridor(canvas.tile(pos.offset(dx, dy))));
        if faces && (rng.gen_range(0..1000u32) as f32 / 1000.0) < ratio {
            candidates.push(pos);
        }
    }

    if !multiplayer {
        for &pos in &candidates {
            canvas.set(pos, Tile::Destructible);
        }
        return candidates.len();
    }

    let mut rest = Vec::with_capacity(candidates.len());
    for &pos in &candidates {
        if canvas.edge_distance(pos) > EXPLOSIVE_EDGE_MARGIN && rng.gen_bool(EXPLOSIVE_CHANCE) {
            canvas.set(pos, Tile::ExplosiveWall);
        } else {
            rest.push(pos);
        }
    }

    for pos in rest {
        let near_explosive = pos
            .neighbors8()
            .any(|n| canvas.contains(n) && canvas.tile(n) == Tile::ExplosiveWall);
        let attribute = if near_explosive {
            WallAttribute::None
        } else {
            let roll: f64 = rng.gen();
            if roll < REWARD_CHANCE {
                WallAttribute::RewardGrant
            } else if roll < HEAL_CHANCE {
                WallAttribute::HealGrant
            } else {
                WallAttribute::None
            }
        };
        canvas.set(pos, Tile::from(attribute));
    }
    candidates.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate(config: GeneratorConfig) -> GeneratedMaze {
        MazeGenerator::new(config).unwrap().generate()
    }

    fn count(maze: &GeneratedMaze, ch: char) -> usize {
        maze.rows.iter().flat_map(|r| r.chars()).filter(|&c| c == ch).count()
    }

    fn char_at(maze: &GeneratedMaze, pos: GridPos) -> char {
        maze.rows[pos.row as usize].as_bytes()[pos.col as usize] as char
    }

    #[test]
    fn test_dimensions_forced_odd_and_minimum() {
        let config = GeneratorConfig::default().with_size(20, 2);
        assert_eq!(config.effective_size(), (21, 5));

        let maze = generate(config.with_seed(1));
        assert_eq!(maze.rows.len(), 5);
        assert!(maze.rows.iter().all(|r| r.len() == 21));
    }

    #[test]
    fn test_invalid_ratio_rejected() {
        let config = GeneratorConfig {
            destructible_ratio: -0.1,
            ..Default::default()
        };
        assert!(matches!(
            MazeGenerator::new(config),
            Err(MazeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_oversized_rejected() {
        let config = GeneratorConfig::default().with_size(MAX_DIMENSION + 1, 9);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ratio_builder_clamps() {
        let config = GeneratorConfig::default().with_destructible_ratio(3.0);
        assert!((config.destructible_ratio - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_same_seed_same_maze() {
        let config = GeneratorConfig::default().with_seed(42);
        assert_eq!(generate(config.clone()), generate(config));
    }

    #[test]
    fn test_generate_reseeds_each_call() {
        let mut generator = MazeGenerator::new(GeneratorConfig::default().with_seed(9)).unwrap();
        let first = generator.generate();
        let second = generator.generate();
        assert_eq!(first, second);
    }

    #[test]
    fn test_seeds_produce_variety() {
        let texts: Vec<String> = (0..8)
            .map(|seed| generate(GeneratorConfig::default().with_seed(seed)).to_text())
            .collect();
        assert!(texts.iter().any(|t| t != &texts[0]));
    }

    #[test]
    fn test_border_stays_solid() {
        for seed in 0..10 {
            let maze = generate(
                GeneratorConfig::default()
                    .with_seed(seed)
                    .with_destructible_ratio(1.0),
            );
            let last_row = maze.rows.len() - 1;
            assert!(maze.rows[0].chars().all(|c| c == '#'));
            assert!(maze.rows[last_row].chars().all(|c| c == '#'));
            for row in &maze.rows {
                assert!(row.starts_with('#') && row.ends_with('#'));
            }
        }
    }

    #[test]
    fn test_single_player_markers() {
        let maze = generate(GeneratorConfig::default().with_seed(3));
        assert_eq!(count(&maze, 'S'), 1);
        assert_eq!(count(&maze, 'E'), 1);
        assert_eq!(count(&maze, '1') + count(&maze, '2'), 0);
        assert_eq!(maze.spawns, None);

        let start = maze.start.unwrap();
        assert_eq!(char_at(&maze, start), 'S');
        assert_eq!(char_at(&maze, maze.exit), 'E');
    }

    #[test]
    fn test_single_player_walls_have_no_attributes() {
        let maze = generate(
            GeneratorConfig::default()
                .with_seed(11)
                .with_destructible_ratio(0.8),
        );
        assert!(count(&maze, '*') > 0);
        assert_eq!(count(&maze, 'G') + count(&maze, 'H') + count(&maze, 'B'), 0);
    }

    #[test]
    fn test_zero_ratio_places_no_walls() {
        let maze = generate(
            GeneratorConfig::default()
                .with_seed(5)
                .with_destructible_ratio(0.0)
                .with_multiplayer(true),
        );
        for ch in ['*', 'G', 'H', 'B'] {
            assert_eq!(count(&maze, ch), 0);
        }
    }

    #[test]
    fn test_full_ratio_converts_every_corridor_wall() {
        let maze = generate(
            GeneratorConfig::default()
                .with_seed(8)
                .with_destructible_ratio(1.0)
                .with_enemy_count(0),
        );
        let grid: Vec<Vec<char>> = maze.rows.iter().map(|r| r.chars().collect()).collect();
        for row in 1..grid.len() - 1 {
            for col in 1..grid[0].len() - 1 {
                if grid[row][col] != '#' {
                    continue;
                }
                let neighbors = [
                    grid[row - 1][col],
                    grid[row + 1][col],
                    grid[row][col - 1],
                    grid[row][col + 1],
                ];
                assert!(
                    !neighbors.iter().any(|c| matches!(c, '.' | 'S' | 'E')),
                    "solid wall at ({col},{row}) faces a corridor"
                );
            }
        }
    }

    #[test]
    fn test_enemy_count_and_distance() {
        let config = GeneratorConfig::default()
            .with_size(31, 21)
            .with_seed(17)
            .with_enemy_count(4);
        let maze = generate(config);
        assert_eq!(count(&maze, 'X'), 4);

        let start = maze.start.unwrap();
        for (row, line) in maze.rows.iter().enumerate() {
            for (col, ch) in line.chars().enumerate() {
                if ch == 'X' {
                    let pos = GridPos::new(col as i32, row as i32);
                    assert!(pos.manhattan(start) > ENEMY_MIN_START_DISTANCE);
                    assert!(pos.manhattan(maze.exit) > ENEMY_MIN_EXIT_DISTANCE);
                }
            }
        }
    }

    #[test]
    fn test_enemies_capped_by_room() {
        let maze = generate(
            GeneratorConfig::default()
                .with_size(5, 5)
                .with_seed(2)
                .with_enemy_count(50),
        );
        assert!(count(&maze, 'X') < 50);
    }

    #[test]
    fn test_multiplayer_markers() {
        let maze = generate(
            GeneratorConfig::default()
                .with_size(25, 25)
                .with_seed(21)
                .with_multiplayer(true),
        );
        assert_eq!(count(&maze, 'S'), 0);
        assert_eq!(count(&maze, 'E'), 1);
        assert_eq!(count(&maze, '1'), 1);
        assert_eq!(count(&maze, '2'), 1);
        assert_eq!(maze.start, None);

        let [first, second] = maze.spawns.unwrap();
        assert_eq!(char_at(&maze, first), '1');
        assert_eq!(char_at(&maze, second), '2');
        assert_eq!(char_at(&maze, maze.exit), 'E');
    }

    #[test]
    fn test_multiplayer_explosive_rules() {
        for seed in 0..10 {
            let maze = generate(
                GeneratorConfig::default()
                    .with_size(31, 31)
                    .with_seed(seed)
                    .with_destructible_ratio(1.0)
                    .with_multiplayer(true),
            );
            let grid: Vec<Vec<char>> = maze.rows.iter().map(|r| r.chars().collect()).collect();
            let (h, w) = (grid.len() as i32, grid[0].len() as i32);
            for row in 0..h {
                for col in 0..w {
                    if grid[row as usize][col as usize] != 'B' {
                        continue;
                    }
                    let pos = GridPos::new(col, row);
                    assert!(col.min(row).min(w - 1 - col).min(h - 1 - row) > EXPLOSIVE_EDGE_MARGIN);
                    for n in pos.neighbors8() {
                        let ch = grid[n.row as usize][n.col as usize];
                        assert!(ch != 'G' && ch != 'H', "bonus wall next to explosive at {pos:?}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_carving_reaches_every_odd_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut canvas = Canvas::filled(11, 9, Tile::Solid);
        carve_passages(&mut canvas, &mut rng);
        for row in (1..9).step_by(2) {
            for col in (1..11).step_by(2) {
                assert_eq!(canvas.tile(GridPos::new(col, row)), Tile::Empty);
            }
        }
        // A spanning tree over 5x4 odd cells opens exactly 19 connectors.
        let open = canvas.open_floor().len();
        assert_eq!(open, 20 + 19);
    }

    #[test]
    fn test_ensure_path_carves_when_disconnected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let mut canvas = Canvas::filled(9, 7, Tile::Solid);
        let from = GridPos::new(1, 1);
        let to = GridPos::new(7, 5);
        canvas.set(from, Tile::Start);
        canvas.set(to, Tile::Exit);

        assert!(ensure_path(&mut canvas, &mut rng, from, to));
        assert!(!ensure_path(&mut canvas, &mut rng, from, to));
    }

    #[test]
    fn test_repair_logged_at_debug() {
        use std::io;
        use std::sync::{Arc, Mutex};

        struct Capture(Arc<Mutex<Vec<u8>>>);

        impl io::Write for Capture {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let buffer = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buffer);
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || Capture(Arc::clone(&sink)))
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let mut rng = ChaCha8Rng::seed_from_u64(5);
            let mut canvas = Canvas::filled(9, 7, Tile::Solid);
            assert!(ensure_path(&mut canvas, &mut rng, GridPos::new(1, 1), GridPos::new(7, 5)));
        });

        let logs = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        assert!(logs
            .lines()
            .any(|line| line.contains("DEBUG") && line.contains("Repairing connectivity")));
    }

    #[test]
    fn test_ensure_path_leaves_connected_maze_alone() {
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let mut canvas = Canvas::filled(9, 9, Tile::Solid);
        carve_passages(&mut canvas, &mut rng);
        let before = canvas.rows();
        assert!(!ensure_path(&mut canvas, &mut rng, GridPos::new(1, 1), GridPos::new(7, 7)));
        assert_eq!(canvas.rows(), before);
    }

    #[test]
    fn test_spawns_widen_when_central_pairs_too_close() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut canvas = Canvas::filled(25, 25, Tile::Solid);
        // Inner region (6..=18) holds only an adjacent pair; (4, 12) lies
        // in the wider region at distance 8 and 9 from them.
        for pos in [GridPos::new(6, 6), GridPos::new(7, 6), GridPos::new(4, 12)] {
            canvas.set(pos, Tile::Empty);
        }
        let pair = place_spawns(&canvas, &mut rng);
        assert!(pair.contains(&GridPos::new(4, 12)));
        assert!(pair.contains(&GridPos::new(6, 6)) || pair.contains(&GridPos::new(7, 6)));
    }

    #[test]
    fn test_fair_exit_prefers_balanced_cells() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut canvas = Canvas::filled(15, 15, Tile::Solid);
        for pos in canvas.interior().collect::<Vec<_>>() {
            canvas.set(pos, Tile::Empty);
        }
        let spawns = [GridPos::new(5, 7), GridPos::new(9, 7)];
        let exit = place_fair_exit(&canvas, &mut rng, spawns, GridPos::new(1, 1));
        let d1 = exit.manhattan(spawns[0]);
        let d2 = exit.manhattan(spawns[1]);
        assert!(d1.abs_diff(d2) <= 3u32.max(d1.min(d2) / 3));
    }
}
