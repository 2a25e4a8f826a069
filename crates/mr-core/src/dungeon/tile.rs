//! Map tiles.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Terrain type of a single map cell.
///
/// Floors and stairs are walkable and transparent; walls are neither.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[repr(u8)]
pub enum TileKind {
    #[default]
    Wall = 0,
    Floor = 1,
    StairsDown = 2,
    StairsUp = 3,
}

impl TileKind {
    /// Check if units can stand here
    pub const fn is_walkable(&self) -> bool {
        !matches!(self, TileKind::Wall)
    }

    /// Check if sight passes through
    pub const fn is_transparent(&self) -> bool {
        !matches!(self, TileKind::Wall)
    }

    /// Glyph when the tile is in the current field of view
    pub const fn lit_glyph(&self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => '.',
            TileKind::StairsDown => '>',
            TileKind::StairsUp => '<',
        }
    }

    /// Glyph when the tile is only remembered from exploration
    pub const fn dim_glyph(&self) -> char {
        match self {
            TileKind::Wall => '#',
            TileKind::Floor => ' ',
            TileKind::StairsDown => '>',
            TileKind::StairsUp => '<',
        }
    }
}

/// A single map cell
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
}

impl Tile {
    pub const fn wall() -> Self {
        Self {
            kind: TileKind::Wall,
        }
    }

    pub const fn floor() -> Self {
        Self {
            kind: TileKind::Floor,
        }
    }

    pub const fn is_walkable(&self) -> bool {
        self.kind.is_walkable()
    }

    pub const fn is_transparent(&self) -> bool {
        self.kind.is_transparent()
    }
}
