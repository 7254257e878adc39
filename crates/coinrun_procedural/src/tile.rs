//! # Tiles
//!
//! The cell types of a level grid and the integer cell coordinate.

/// Number of decoration variants the generator draws from.
pub const DECOR_VARIANTS: u8 = 4;

/// A single cell of the level grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tile {
    /// Open air.
    #[default]
    Empty,
    /// Collides on every side.
    Solid {
        /// Visual variant ([`Tile::GROUND`] or [`Tile::CRATE`]).
        variant: u8,
    },
    /// Non-colliding, kills on contact.
    Lava,
    /// Non-colliding background decoration.
    Decor {
        /// Visual variant, `0..DECOR_VARIANTS`.
        variant: u8,
    },
}

impl Tile {
    /// Terrain (floor, walls, platforms).
    pub const GROUND: Self = Self::Solid { variant: 0 };
    /// Obstacle crate placed on a platform.
    pub const CRATE: Self = Self::Solid { variant: 1 };

    /// Returns `true` if the tile blocks movement.
    #[inline]
    #[must_use]
    pub const fn is_solid(self) -> bool {
        matches!(self, Self::Solid { .. })
    }

    /// Returns `true` if touching the tile ends the episode.
    #[inline]
    #[must_use]
    pub const fn is_hazard(self) -> bool {
        matches!(self, Self::Lava)
    }

    /// Returns `true` if a body may occupy the tile.
    #[inline]
    #[must_use]
    pub const fn is_passable(self) -> bool {
        matches!(self, Self::Empty | Self::Decor { .. })
    }

    /// Single-character form used by [`Tilemap::from_rows`](crate::Tilemap::from_rows).
    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Empty => '.',
            Self::Solid { variant: 1 } => 'c',
            Self::Solid { .. } => '#',
            Self::Lava => '~',
            Self::Decor { .. } => '*',
        }
    }

    /// Parses a glyph produced by [`Tile::glyph`].
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' | ' ' => Some(Self::Empty),
            '#' => Some(Self::GROUND),
            'c' => Some(Self::CRATE),
            '~' => Some(Self::Lava),
            '*' => Some(Self::Decor { variant: 0 }),
            _ => None,
        }
    }
}

/// Integer grid coordinate. `y` grows downward; row 0 is the top.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Cell {
    /// Creates a cell coordinate.
    #[inline]
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// World-space position of a body standing in this cell: horizontally
    /// centred, feet on the cell's bottom edge.
    #[inline]
    #[must_use]
    pub fn feet(self) -> (f32, f32) {
        (self.x as f32 + 0.5, self.y as f32 + 1.0)
    }
}
