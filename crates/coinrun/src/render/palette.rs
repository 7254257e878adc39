//! # Palettes
//!
//! Fixed colour tables. Theme indices drawn at reset select rows here, so
//! the configured theme counts may not exceed these tables.

use super::Rgba;

/// `[ground, crate]` colours per wall theme.
pub const WALL_THEMES: [[Rgba; 2]; 6] = [
    [Rgba::rgb(112, 84, 62), Rgba::rgb(176, 128, 72)],
    [Rgba::rgb(92, 96, 108), Rgba::rgb(150, 150, 160)],
    [Rgba::rgb(70, 110, 64), Rgba::rgb(132, 170, 96)],
    [Rgba::rgb(150, 132, 96), Rgba::rgb(200, 180, 120)],
    [Rgba::rgb(96, 64, 104), Rgba::rgb(160, 110, 170)],
    [Rgba::rgb(60, 88, 120), Rgba::rgb(110, 150, 190)],
];

/// Body colour per agent theme.
pub const AGENT_THEMES: [Rgba; 5] = [
    Rgba::rgb(60, 120, 230),
    Rgba::rgb(230, 90, 160),
    Rgba::rgb(80, 200, 120),
    Rgba::rgb(240, 140, 40),
    Rgba::rgb(150, 90, 220),
];

/// Number of distinct backgrounds [`background`] can produce.
pub const BACKGROUND_LIMIT: u32 = 256;

/// Lava fill.
pub const LAVA: Rgba = Rgba::rgb(230, 80, 20);

/// Goal coin.
pub const COIN: Rgba = Rgba::rgb(250, 210, 40);

/// Mob body.
pub const MOB: Rgba = Rgba::rgb(200, 40, 40);

/// Decoration variants.
pub const DECOR: [Rgba; 4] = [
    Rgba::rgb(90, 170, 70),
    Rgba::rgb(220, 200, 80),
    Rgba::rgb(200, 90, 120),
    Rgba::rgb(120, 120, 110),
];

/// Colours of one wall theme. Out-of-range themes wrap.
#[inline]
#[must_use]
pub fn wall_theme(theme: u32) -> [Rgba; 2] {
    WALL_THEMES[theme as usize % WALL_THEMES.len()]
}

/// Agent body colour for a theme. Out-of-range themes wrap.
#[inline]
#[must_use]
pub fn agent_theme(theme: u32) -> Rgba {
    AGENT_THEMES[theme as usize % AGENT_THEMES.len()]
}

/// `(top, bottom)` gradient colours of background `index`.
///
/// Hues step by the golden ratio so neighbouring indices look different.
#[must_use]
pub fn background(index: u32) -> (Rgba, Rgba) {
    let hue = (index % BACKGROUND_LIMIT) as f32 * 0.618_034;
    let hue = hue - hue.floor();
    (hsv(hue, 0.35, 0.95), hsv(hue, 0.55, 0.6))
}

fn hsv(h: f32, s: f32, v: f32) -> Rgba {
    let sector = h * 6.0;
    let i = sector.floor();
    let f = sector - i;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    let (r, g, b) = match i as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    let c = |x: f32| (x * 255.0).round().clamp(0.0, 255.0) as u8;
    Rgba::rgb(c(r), c(g), c(b))
}
