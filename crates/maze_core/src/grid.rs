//! Cell model and the textual tile vocabulary.
//!
//! A maze is a row-major array of [`Cell`]s addressed by [`GridPos`]
//! (column, row). The textual form exchanged between host and peer uses one
//! character per cell; see [`Tile`].

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// Discrete grid coordinates. `col` grows to the east, `row` to the south.
///
/// Signed so that world positions left of or above the maze map to
/// out-of-bounds coordinates instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct GridPos {
    /// Column index.
    pub col: i32,
    /// Row index.
    pub row: i32,
}

impl GridPos {
    /// Create a grid position.
    #[must_use]
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    /// Offset by a column/row delta.
    #[must_use]
    pub const fn offset(self, dcol: i32, drow: i32) -> Self {
        Self {
            col: self.col + dcol,
            row: self.row + drow,
        }
    }

    /// Manhattan distance in cells.
    #[must_use]
    pub const fn manhattan(self, other: Self) -> u32 {
        self.col.abs_diff(other.col) + self.row.abs_diff(other.row)
    }

    /// The eight surrounding positions, row by row from the north-west.
    pub fn neighbors8(self) -> impl Iterator<Item = GridPos> {
        (-1..=1)
            .flat_map(move |drow| (-1..=1).map(move |dcol| (dcol, drow)))
            .filter(|&(dcol, drow)| dcol != 0 || drow != 0)
            .map(move |(dcol, drow)| self.offset(dcol, drow))
    }
}

/// What occupies a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CellKind {
    /// Open floor.
    #[default]
    Empty,
    /// Indestructible wall.
    Solid,
    /// Wall that can be shot down.
    Destructible,
    /// Level exit (walkable).
    Exit,
}

impl CellKind {
    /// Walls block movement and collide with circles.
    #[must_use]
    pub const fn is_wall(self) -> bool {
        matches!(self, Self::Solid | Self::Destructible)
    }

    /// Tanks may stand on empty floor and the exit.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        matches!(self, Self::Empty | Self::Exit)
    }
}

/// Bonus or penalty carried by a destructible wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WallAttribute {
    /// Plain wall.
    #[default]
    None,
    /// Grants currency to the shooter.
    RewardGrant,
    /// Heals the shooter.
    HealGrant,
    /// Clears neighbouring destructible walls when destroyed.
    Explosive,
}

/// Corner of a tile, clockwise from the north-west.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    /// Top-left.
    NorthWest = 0,
    /// Top-right.
    NorthEast = 1,
    /// Bottom-right.
    SouthEast = 2,
    /// Bottom-left.
    SouthWest = 3,
}

impl Corner {
    /// All corners in index order.
    pub const ALL: [Corner; 4] = [
        Corner::NorthWest,
        Corner::NorthEast,
        Corner::SouthEast,
        Corner::SouthWest,
    ];
}

/// Per-corner rounding flags, derived from neighbour occupancy on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RoundedCorners(pub [bool; 4]);

impl RoundedCorners {
    /// No corner rounded.
    pub const NONE: Self = Self([false; 4]);

    /// Whether the given corner is rounded.
    #[must_use]
    pub const fn is_rounded(self, corner: Corner) -> bool {
        self.0[corner as usize]
    }
}

/// One grid position.
///
/// `attribute` is [`WallAttribute::None`] unless `kind` is
/// [`CellKind::Destructible`]; health is only meaningful for destructible
/// cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Cell {
    pub(crate) kind: CellKind,
    pub(crate) attribute: WallAttribute,
    #[serde(with = "fixed_serde")]
    pub(crate) health: Fixed,
    #[serde(with = "fixed_serde")]
    pub(crate) max_health: Fixed,
    pub(crate) rounded: RoundedCorners,
}

impl Cell {
    /// Create a cell of the given kind with no health.
    #[must_use]
    pub const fn of_kind(kind: CellKind) -> Self {
        Self {
            kind,
            attribute: WallAttribute::None,
            health: Fixed::ZERO,
            max_health: Fixed::ZERO,
            rounded: RoundedCorners::NONE,
        }
    }

    /// Create a destructible wall at full health.
    #[must_use]
    pub const fn destructible(attribute: WallAttribute, health: Fixed) -> Self {
        Self {
            kind: CellKind::Destructible,
            attribute,
            health,
            max_health: health,
            rounded: RoundedCorners::NONE,
        }
    }

    /// Cell kind.
    #[must_use]
    pub const fn kind(&self) -> CellKind {
        self.kind
    }

    /// Wall attribute (always `None` for non-destructible cells).
    #[must_use]
    pub const fn attribute(&self) -> WallAttribute {
        self.attribute
    }

    /// Remaining health.
    #[must_use]
    pub const fn health(&self) -> Fixed {
        self.health
    }

    /// Health at load time.
    #[must_use]
    pub const fn max_health(&self) -> Fixed {
        self.max_health
    }

    /// Derived corner rounding.
    #[must_use]
    pub const fn rounded_corners(&self) -> RoundedCorners {
        self.rounded
    }

    /// Turn the cell into open floor, dropping attribute and health.
    pub(crate) fn clear(&mut self) {
        *self = Self::of_kind(CellKind::Empty);
    }
}

/// One character of the textual maze format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// `#`
    Solid,
    /// `*`
    Destructible,
    /// `G`
    RewardWall,
    /// `H`
    HealWall,
    /// `B`
    ExplosiveWall,
    /// `.` (and any unrecognised character)
    Empty,
    /// `S`
    Start,
    /// `E`
    Exit,
    /// `X`
    EnemySpawn,
    /// `1`
    Spawn1,
    /// `2`
    Spawn2,
}

impl Tile {
    /// Parse a symbol. Unrecognised characters are treated as empty floor.
    #[must_use]
    pub const fn from_char(ch: char) -> Self {
        match ch {
            '#' => Self::Solid,
            '*' => Self::Destructible,
            'G' => Self::RewardWall,
            'H' => Self::HealWall,
            'B' => Self::ExplosiveWall,
            'S' => Self::Start,
            'E' => Self::Exit,
            'X' => Self::EnemySpawn,
            '1' => Self::Spawn1,
            '2' => Self::Spawn2,
            _ => Self::Empty,
        }
    }

    /// The symbol written for this tile.
    #[must_use]
    pub const fn to_char(self) -> char {
        match self {
            Self::Solid => '#',
            Self::Destructible => '*',
            Self::RewardWall => 'G',
            Self::HealWall => 'H',
            Self::ExplosiveWall => 'B',
            Self::Empty => '.',
            Self::Start => 'S',
            Self::Exit => 'E',
            Self::EnemySpawn => 'X',
            Self::Spawn1 => '1',
            Self::Spawn2 => '2',
        }
    }

    /// Wall attribute for destructible tiles, `None` when not destructible.
    #[must_use]
    pub const fn wall_attribute(self) -> Option<WallAttribute> {
        match self {
            Self::Destructible => Some(WallAttribute::None),
            Self::RewardWall => Some(WallAttribute::RewardGrant),
            Self::HealWall => Some(WallAttribute::HealGrant),
            Self::ExplosiveWall => Some(WallAttribute::Explosive),
            _ => None,
        }
    }

    /// Whether the tile is open ground (floor or any marker standing on floor).
    #[must_use]
    pub const fn is_open(self) -> bool {
        matches!(
            self,
            Self::Empty | Self::Start | Self::Exit | Self::EnemySpawn | Self::Spawn1 | Self::Spawn2
        )
    }
}

impl From<WallAttribute> for Tile {
    fn from(attribute: WallAttribute) -> Self {
        match attribute {
            WallAttribute::None => Self::Destructible,
            WallAttribute::RewardGrant => Self::RewardWall,
            WallAttribute::HealGrant => Self::HealWall,
            WallAttribute::Explosive => Self::ExplosiveWall,
        }
    }
}
