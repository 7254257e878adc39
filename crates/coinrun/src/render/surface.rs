//! # Software Surface
//!
//! Row-major RGBA pixel buffer. Allocated once per environment and reused
//! for every frame.

use super::{RenderTarget, Rgba};
use crate::error::{EnvError, EnvResult};

/// CPU render target.
#[derive(Clone, Debug)]
pub struct SoftwareSurface {
    width: u32,
    height: u32,
    texels: Vec<Rgba>,
}

impl SoftwareSurface {
    /// Allocates a `width × height` surface cleared to transparent black.
    ///
    /// # Errors
    ///
    /// [`EnvError::Resource`] if a dimension is zero or the buffer cannot be
    /// allocated.
    pub fn new(width: u32, height: u32) -> EnvResult<Self> {
        if width == 0 || height == 0 {
            return Err(EnvError::Resource(format!(
                "surface dimensions {width}x{height} must be non-zero"
            )));
        }
        let len = (width as usize)
            .checked_mul(height as usize)
            .ok_or_else(|| EnvError::Resource(format!("surface {width}x{height} overflows")))?;

        let mut texels = Vec::new();
        texels.try_reserve_exact(len).map_err(|e| {
            EnvError::Resource(format!("cannot allocate {width}x{height} surface: {e}"))
        })?;
        texels.resize(len, Rgba::default());

        Ok(Self {
            width,
            height,
            texels,
        })
    }

    /// Pixels as bytes, four per pixel, row-major.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        bytemuck::cast_slice(&self.texels)
    }

    /// Pixel at `(x, y)`, if inside.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        (x < self.width && y < self.height)
            .then(|| self.texels[y as usize * self.width as usize + x as usize])
    }
}

/// Pixel column/row range covered by `[a, b)`, clipped to `0..limit`.
#[inline]
fn span(a: f32, b: f32, limit: u32) -> (usize, usize) {
    let lo = a.round().clamp(0.0, limit as f32) as usize;
    let hi = b.round().clamp(0.0, limit as f32) as usize;
    (lo, hi.max(lo))
}

#[inline]
fn blend(dst: Rgba, src: Rgba) -> Rgba {
    let a = u16::from(src.a);
    let inv = 255 - a;
    let mix = |d: u8, s: u8| ((u16::from(s) * a + u16::from(d) * inv + 127) / 255) as u8;
    Rgba {
        r: mix(dst.r, src.r),
        g: mix(dst.g, src.g),
        b: mix(dst.b, src.b),
        a: 255,
    }
}

impl RenderTarget for SoftwareSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn clear(&mut self, color: Rgba) {
        self.texels.fill(color);
    }

    fn fill_rect(&mut self, x0: f32, y0: f32, x1: f32, y1: f32, color: Rgba) {
        if color.a == 0 {
            return;
        }
        let (px0, px1) = span(x0, x1, self.width);
        let (py0, py1) = span(y0, y1, self.height);
        let stride = self.width as usize;

        for y in py0..py1 {
            let row = &mut self.texels[y * stride + px0..y * stride + px1];
            if color.a == 255 {
                row.fill(color);
            } else {
                for texel in row {
                    *texel = blend(*texel, color);
                }
            }
        }
    }
}
