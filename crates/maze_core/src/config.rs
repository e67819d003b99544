//! Engine configuration.
//!
//! Settings are plain integers so they read naturally in RON files; the
//! fixed-point values the engine works with are derived on demand.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MazeError, Result};
use crate::generator::GeneratorConfig;
use crate::math::Fixed;

/// Largest accepted tile edge in world units.
pub const MAX_TILE_SIZE: u32 = 1 << 16;

/// Largest accepted starting health of a destructible wall.
pub const MAX_WALL_HEALTH: u32 = 1_000_000;

/// Geometry and durability of a loaded maze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MazeSettings {
    /// Edge length of one tile in world units.
    pub tile_size: u32,
    /// Radius of a rounded wall corner in world units.
    pub corner_radius: u32,
    /// Starting health of every destructible wall.
    pub wall_health: u32,
}

impl Default for MazeSettings {
    fn default() -> Self {
        Self {
            tile_size: 50,
            corner_radius: 8,
            wall_health: 100,
        }
    }
}

impl MazeSettings {
    /// Set the tile size.
    #[must_use]
    pub const fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Set the wall health.
    #[must_use]
    pub const fn with_wall_health(mut self, wall_health: u32) -> Self {
        self.wall_health = wall_health;
        self
    }

    /// Tile size as fixed-point.
    #[must_use]
    pub fn tile_size_fixed(&self) -> Fixed {
        Fixed::from_num(self.tile_size)
    }

    /// Corner radius as fixed-point.
    #[must_use]
    pub fn corner_radius_fixed(&self) -> Fixed {
        Fixed::from_num(self.corner_radius)
    }

    /// Wall health as fixed-point.
    #[must_use]
    pub fn wall_health_fixed(&self) -> Fixed {
        Fixed::from_num(self.wall_health)
    }

    /// Reject settings that would make the geometry degenerate or leave
    /// the fixed-point range.
    pub fn validate(&self) -> Result<()> {
        if !(4..=MAX_TILE_SIZE).contains(&self.tile_size) {
            return Err(MazeError::InvalidConfig(format!(
                "tile_size must be within 4..={MAX_TILE_SIZE}, got {}",
                self.tile_size
            )));
        }
        // The rounded corners of the inset rectangle must not overlap.
        if u64::from(self.corner_radius) * 2 > u64::from(self.tile_size - 2) {
            return Err(MazeError::InvalidConfig(format!(
                "corner_radius {} too large for tile_size {}",
                self.corner_radius, self.tile_size
            )));
        }
        if !(1..=MAX_WALL_HEALTH).contains(&self.wall_health) {
            return Err(MazeError::InvalidConfig(format!(
                "wall_health must be within 1..={MAX_WALL_HEALTH}, got {}",
                self.wall_health
            )));
        }
        Ok(())
    }
}

/// Complete engine configuration as stored in a RON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Geometry of loaded mazes.
    pub maze: MazeSettings,
    /// Parameters for procedural generation.
    pub generator: GeneratorConfig,
}

impl EngineConfig {
    /// Parse a configuration from RON text and validate it.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Self::parse(text, "<string>")
    }

    /// Load a configuration from a RON file and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MazeError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&text, &path.display().to_string())
    }

    fn parse(text: &str, source_name: &str) -> Result<Self> {
        let config: Self = ron::from_str(text).map_err(|e| MazeError::ConfigParse {
            source_name: source_name.to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate both sections.
    pub fn validate(&self) -> Result<()> {
        self.maze.validate()?;
        self.generator.validate()
    }
}
