//! RGB565 color packing with color-key transparency
//!
//! The target format has no alpha channel, so transparent pixels are
//! replaced with a reserved key color (magenta by default).

use serde::Deserialize;

/// Default transparency key: magenta (255, 0, 255)
pub const DEFAULT_COLOR_KEY: ColorKey = ColorKey::new(255, 0, 255);

/// Default alpha threshold. Pixels with alpha below this are transparent.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 128;

/// One RGBA8 pixel as decoded from the source image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// RGB color reinterpreted downstream as "transparent"
///
/// Deserializes from a three-element array, e.g. `color_key = [255, 0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "[u8; 3]")]
pub struct ColorKey {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorKey {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed RGB565 value of the key
    pub const fn packed(&self) -> u16 {
        pack_rgb565(self.r, self.g, self.b)
    }

    pub fn is_magenta(&self) -> bool {
        *self == DEFAULT_COLOR_KEY
    }
}

impl Default for ColorKey {
    fn default() -> Self {
        DEFAULT_COLOR_KEY
    }
}

impl From<[u8; 3]> for ColorKey {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Self { r, g, b }
    }
}

/// Pack an 8-bit RGB triple into 5-6-5 layout.
///
/// Each channel is truncated, never rounded.
pub const fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    ((r as u16 >> 3) << 11) | ((g as u16 >> 2) << 5) | (b as u16 >> 3)
}

/// Pack one pixel, substituting the key color when alpha is below `alpha_threshold`.
///
/// An opaque pixel whose RGB equals the key also packs to the key value,
/// so it is transparent downstream as well.
pub fn pack_pixel(pixel: Rgba, key: ColorKey, alpha_threshold: u8) -> u16 {
    if pixel.a < alpha_threshold {
        key.packed()
    } else {
        pack_rgb565(pixel.r, pixel.g, pixel.b)
    }
}

/// Pack a row-major pixel sequence. Output length always equals input length.
pub fn pack_pixels(pixels: &[Rgba], key: ColorKey, alpha_threshold: u8) -> Vec<u16> {
    pixels
        .iter()
        .map(|&p| pack_pixel(p, key, alpha_threshold))
        .collect()
}
