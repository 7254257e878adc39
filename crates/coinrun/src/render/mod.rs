//! # Rendering
//!
//! Software rasterisation of the scene into RGBA surfaces, and extraction
//! into the interleaved RGB buffers handed to callers.
//!
//! Everything is drawn as filled rectangles. Frame order:
//!
//! 1. Clear
//! 2. Background
//! 3. Behind-layer sprites
//! 4. Tilemap
//! 5. Particles
//! 6. Ahead-layer sprites
//! 7. Agent

pub mod camera;
pub mod palette;
pub mod surface;

pub use camera::Camera;
pub use surface::SoftwareSurface;

use bytemuck::{Pod, Zeroable};
use coinrun_procedural::{Tile, Tilemap};

/// One RGBA pixel.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha; 255 is opaque.
    pub a: u8,
}

impl Rgba {
    /// Opaque colour.
    #[inline]
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same colour with a different alpha.
    #[inline]
    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Multiplies the colour channels by `factor`, saturating.
    #[must_use]
    pub fn scale(self, factor: f32) -> Self {
        let s = |c: u8| (f32::from(c) * factor).round().clamp(0.0, 255.0) as u8;
        Self {
            r: s(self.r),
            g: s(self.g),
            b: s(self.b),
            a: self.a,
        }
    }

    /// Linear blend toward `other`; `t = 0` is `self`.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// Something rectangles can be drawn into.
pub trait RenderTarget {
    /// Width in pixels.
    fn width(&self) -> u32;

    /// Height in pixels.
    fn height(&self) -> u32;

    /// Fills the whole target.
    fn clear(&mut self, color: Rgba);

    /// Fills the pixels whose centres lie in `[x0, x1) × [y0, y1)`,
    /// blending by `color.a`. Coordinates may lie outside the target.
    fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba);
}

/// Copies the RGB channels of an RGBA buffer into `out`.
///
/// For every `x < width`, `y < height` and channel `c < 3`,
/// `out[3 * (y + height * x) + c] = src[4 * (y + height * x) + c]`.
///
/// # Panics
///
/// Panics if `src` holds fewer than `4 * width * height` bytes or `out`
/// fewer than `3 * width * height`.
pub fn extract_rgb(src: &[u8], width: usize, height: usize, out: &mut [u8]) {
    for x in 0..width {
        for y in 0..height {
            let i = y + height * x;
            out[3 * i..3 * i + 3].copy_from_slice(&src[4 * i..4 * i + 3]);
        }
    }
}

// ============================================================================
// SCENE PASSES
// ============================================================================

/// Draws the episode background: a vertical gradient with a row of
/// distant blocks shifted by `offset`.
pub fn draw_background(target: &mut impl RenderTarget, index: u32, offset: f32) {
    const BANDS: u32 = 8;

    let (w, h) = (target.width() as f32, target.height() as f32);
    let (top, bottom) = palette::background(index);

    let band = h / BANDS as f32;
    for i in 0..BANDS {
        let color = top.lerp(bottom, i as f32 / (BANDS - 1) as f32);
        target.fill_rect(0.0, i as f32 * band, w, (i + 1) as f32 * band, color);
    }

    let block = bottom.scale(0.8);
    let spacing = w / 4.0;
    for k in 0..6u32 {
        let x = (k as f32 - offset) * spacing;
        let rise = 0.15 + 0.05 * ((k * 37 + index) % 5) as f32;
        target.fill_rect(x, h * (1.0 - rise), x + spacing * 0.6, h, block);
    }
}

/// Draws every visible tile in the map's wall theme.
pub fn draw_tilemap(target: &mut impl RenderTarget, camera: &Camera, map: &Tilemap) {
    let walls = palette::wall_theme(map.theme());
    let (x0, y0, x1, y1) = camera.visible_tiles();
    let inset = 0.08;

    for ty in y0..=y1 {
        for tx in x0..=x1 {
            let (fx, fy) = (tx as f32, ty as f32);
            match map.get(tx, ty) {
                Tile::Empty => {}
                Tile::Solid { variant } => {
                    let base = walls[usize::from(variant.min(1))];
                    camera.fill_world(target, fx, fy, fx + 1.0, fy + 1.0, base.scale(0.7));
                    camera.fill_world(
                        target,
                        fx + inset,
                        fy + inset,
                        fx + 1.0 - inset,
                        fy + 1.0 - inset,
                        base,
                    );
                }
                Tile::Lava => {
                    camera.fill_world(target, fx, fy + 0.2, fx + 1.0, fy + 1.0, palette::LAVA);
                    camera.fill_world(
                        target,
                        fx,
                        fy + 0.2,
                        fx + 1.0,
                        fy + 0.35,
                        palette::LAVA.scale(1.3),
                    );
                }
                Tile::Decor { variant } => {
                    let color = palette::DECOR[usize::from(variant) % palette::DECOR.len()];
                    camera.fill_world(target, fx + 0.35, fy + 0.55, fx + 0.65, fy + 1.0, color);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_drops_alpha() {
        let src: Vec<u8> = (0..16).collect();
        let mut out = vec![0u8; 12];
        extract_rgb(&src, 2, 2, &mut out);
        assert_eq!(out, vec![0, 1, 2, 4, 5, 6, 8, 9, 10, 12, 13, 14]);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Rgba::rgb(0, 100, 200);
        let b = Rgba::rgb(200, 100, 0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
        assert_eq!(a.lerp(b, 0.5), Rgba::rgb(100, 100, 100));
    }

    #[test]
    fn test_scale_saturates() {
        assert_eq!(Rgba::rgb(200, 10, 0).scale(2.0), Rgba::rgb(255, 20, 0));
    }
}
