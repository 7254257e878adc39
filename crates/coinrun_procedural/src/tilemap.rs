//! # Tilemap
//!
//! The static level grid for one episode, and the terrain queries used by
//! physics, AI and rendering.
//!
//! Anything outside the grid reads as solid ground, so bodies can never
//! leave the level through an edge.

use std::fmt;

use crate::tile::{Cell, Tile};

/// Immutable (per episode) grid of tiles with its visual theme.
#[derive(Clone, PartialEq, Eq)]
pub struct Tilemap {
    width: u32,
    height: u32,
    /// Row-major, `y * width + x`.
    tiles: Box<[Tile]>,
    theme: u32,
}

impl Tilemap {
    /// Creates an all-empty map.
    ///
    /// # Panics
    ///
    /// Panics if either dimension is zero.
    #[must_use]
    pub fn new(width: u32, height: u32, theme: u32) -> Self {
        assert!(width > 0 && height > 0, "Tilemap dimensions must be non-zero");
        Self {
            width,
            height,
            tiles: vec![Tile::Empty; (width * height) as usize].into_boxed_slice(),
            theme,
        }
    }

    /// Builds a map from text rows (see [`Tile::glyph`]); unknown glyphs
    /// become empty. Rows shorter than the first are padded with empty.
    ///
    /// # Panics
    ///
    /// Panics if `rows` is empty or the first row is empty.
    #[must_use]
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as u32;
        let mut map = Self::new(width, height, 0);
        for (y, row) in rows.iter().enumerate() {
            for (x, glyph) in row.chars().enumerate().take(width as usize) {
                let tile = Tile::from_glyph(glyph).unwrap_or(Tile::Empty);
                map.set(x as i32, y as i32, tile);
            }
        }
        map
    }

    /// Width in tiles.
    #[inline]
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height in tiles.
    #[inline]
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Wall theme chosen at generation.
    #[inline]
    #[must_use]
    pub const fn theme(&self) -> u32 {
        self.theme
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= self.width as i32 || y >= self.height as i32 {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    /// Returns `true` if `(x, y)` is inside the grid.
    #[inline]
    #[must_use]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        self.index(x, y).is_some()
    }

    /// Tile at `(x, y)`; out of bounds reads as ground.
    #[inline]
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Tile {
        self.index(x, y).map_or(Tile::GROUND, |i| self.tiles[i])
    }

    /// Tile at a cell.
    #[inline]
    #[must_use]
    pub fn at(&self, cell: Cell) -> Tile {
        self.get(cell.x, cell.y)
    }

    /// Overwrites a tile. Out-of-bounds writes are ignored.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, tile: Tile) {
        if let Some(i) = self.index(x, y) {
            self.tiles[i] = tile;
        }
    }

    /// Returns `true` if `(x, y)` blocks movement.
    #[inline]
    #[must_use]
    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_solid()
    }

    /// Returns `true` if `(x, y)` kills on contact.
    #[inline]
    #[must_use]
    pub fn is_hazard(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_hazard()
    }

    /// Returns `true` if a body can stand in `(x, y)`: the cell is passable
    /// and the one below it is solid.
    #[inline]
    #[must_use]
    pub fn is_stand(&self, x: i32, y: i32) -> bool {
        self.in_bounds(x, y) && self.get(x, y).is_passable() && self.is_solid(x, y + 1)
    }

    /// Topmost stand cell in column `x`, scanning down from row 0.
    #[must_use]
    pub fn surface(&self, x: i32) -> Option<i32> {
        (0..self.height as i32).find(|&y| self.is_stand(x, y))
    }

    /// Iterates over `(x, y, tile)` for every non-empty cell.
    pub fn iter_occupied(&self) -> impl Iterator<Item = (i32, i32, Tile)> + '_ {
        let width = self.width as usize;
        self.tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| **t != Tile::Empty)
            .map(move |(i, t)| ((i % width) as i32, (i / width) as i32, *t))
    }

    /// Raw tiles in row-major order.
    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }
}

impl fmt::Debug for Tilemap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tilemap {}x{} theme={}", self.width, self.height, self.theme)?;
        for row in self.tiles.chunks(self.width as usize) {
            let line: String = row.iter().map(|t| t.glyph()).collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
