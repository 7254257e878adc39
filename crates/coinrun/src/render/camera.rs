//! # Camera
//!
//! Maps world tiles to target pixels. The view is `view_tiles` tiles wide,
//! keeps square tiles, and is centred on a focus point.

use super::{RenderTarget, Rgba};

/// World-to-screen transform for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    center_x: f32,
    center_y: f32,
    /// Pixels per tile.
    scale: f32,
    half_width: f32,
    half_height: f32,
}

impl Camera {
    /// A camera over a `width × height` pixel target centred on
    /// `(focus_x, focus_y)`.
    #[must_use]
    pub fn follow(width: u32, height: u32, view_tiles: f32, focus_x: f32, focus_y: f32) -> Self {
        Self {
            center_x: focus_x,
            center_y: focus_y,
            scale: width as f32 / view_tiles,
            half_width: width as f32 * 0.5,
            half_height: height as f32 * 0.5,
        }
    }

    /// Pixels per tile.
    #[inline]
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Screen position of a world point.
    #[inline]
    #[must_use]
    pub fn to_screen(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (x - self.center_x) * self.scale + self.half_width,
            (y - self.center_y) * self.scale + self.half_height,
        )
    }

    /// Inclusive tile range `(x0, y0, x1, y1)` touching the view.
    #[must_use]
    pub fn visible_tiles(&self) -> (i32, i32, i32, i32) {
        let hw = self.half_width / self.scale;
        let hh = self.half_height / self.scale;
        (
            (self.center_x - hw).floor() as i32,
            (self.center_y - hh).floor() as i32,
            (self.center_x + hw).floor() as i32,
            (self.center_y + hh).floor() as i32,
        )
    }

    /// Fills a world-space rectangle.
    #[inline]
    pub fn fill_world(
        &self,
        target: &mut impl RenderTarget,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        color: Rgba,
    ) {
        let (sx0, sy0) = self.to_screen(x0, y0);
        let (sx1, sy1) = self.to_screen(x1, y1);
        target.fill_rect(sx0, sy0, sx1, sy1, color);
    }
}
