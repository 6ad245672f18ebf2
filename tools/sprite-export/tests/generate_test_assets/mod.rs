//! PNG fixtures for integration tests

#![allow(dead_code)]

use image::{ImageFormat, Rgba, RgbaImage};
use std::path::Path;

/// Write a PNG from row-major RGBA pixels
pub fn write_png(
    path: &Path,
    width: u32,
    height: u32,
    pixels: &[[u8; 4]],
) -> image::ImageResult<()> {
    let raw: Vec<u8> = pixels.iter().flatten().copied().collect();
    let img = RgbaImage::from_raw(width, height, raw).expect("pixel count must match dimensions");
    img.save_with_format(path, ImageFormat::Png)
}

/// 2x1: opaque magenta, transparent green
pub fn generate_key_pair_png(path: &Path) -> image::ImageResult<()> {
    write_png(path, 2, 1, &[[255, 0, 255, 255], [0, 255, 0, 0]])
}

/// 4x4 checkerboard of red and half-transparent blue
pub fn generate_checkerboard_png(path: &Path) -> image::ImageResult<()> {
    let mut img = RgbaImage::new(4, 4);
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        *pixel = if (x + y) % 2 == 0 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 100])
        };
    }
    img.save_with_format(path, ImageFormat::Png)
}

/// Solid opaque image of one color
pub fn generate_solid_png(
    path: &Path,
    width: u32,
    height: u32,
    rgb: [u8; 3],
) -> image::ImageResult<()> {
    let img = RgbaImage::from_pixel(width, height, Rgba([rgb[0], rgb[1], rgb[2], 255]));
    img.save_with_format(path, ImageFormat::Png)
}
