//! Shared test utilities for the webp-press test suite.
//!
//! Writes small synthetic images in every allow-listed format so tests can
//! run the real codecs without shipping binary fixtures.
//!
//! # Usage
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let tmp = tempfile::TempDir::new().unwrap();
//! let path = tmp.path().join("photo.jpg");
//! create_test_jpeg(&path, 400, 300);
//! assert_eq!(image_dimensions(&path), (400, 300));
//! ```

use crate::imaging::ImageKind;
use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

/// A gradient so encoders have something other than a flat color to chew on.
fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

fn gradient_rgba(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 64, 200])
    })
}

/// Create a valid JPEG file with the given dimensions.
pub fn create_test_jpeg(path: &Path, width: u32, height: u32) {
    gradient_rgb(width, height)
        .save_with_format(path, ImageFormat::Jpeg)
        .unwrap();
}

/// Create a JPEG of pseudo-random noise, which compresses like a photograph
/// rather than a flat gradient.
pub fn create_noisy_jpeg(path: &Path, width: u32, height: u32) {
    let mut state: u32 = 0x2545_F491;
    RgbImage::from_fn(width, height, |x, y| {
        // xorshift32
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        let noise = (state & 0x3F) as u8;
        image::Rgb([
            ((x % 256) as u8).wrapping_add(noise),
            ((y % 256) as u8).wrapping_add(noise / 2),
            noise.wrapping_mul(3),
        ])
    })
    .save_with_format(path, ImageFormat::Jpeg)
    .unwrap();
}

/// Create a valid RGBA PNG file with the given dimensions.
pub fn create_test_png(path: &Path, width: u32, height: u32) {
    gradient_rgba(width, height)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// Create a file of `kind`, whatever its extension says.
pub fn create_test_image(path: &Path, kind: ImageKind, width: u32, height: u32) {
    match kind {
        ImageKind::Jpeg => create_test_jpeg(path, width, height),
        ImageKind::Png => create_test_png(path, width, height),
        ImageKind::Gif | ImageKind::Tiff => DynamicImage::ImageRgba8(gradient_rgba(width, height))
            .save_with_format(path, kind.image_format())
            .unwrap(),
    }
}

/// Create a BMP, a format outside the allow-list.
pub fn create_test_bmp(path: &Path, width: u32, height: u32) {
    gradient_rgb(width, height)
        .save_with_format(path, ImageFormat::Bmp)
        .unwrap();
}

// =========================================================================
// Assertions
// =========================================================================

/// Decode `path` by content and return its dimensions.
pub fn image_dimensions(path: &Path) -> (u32, u32) {
    let img = image::ImageReader::open(path)
        .unwrap()
        .with_guessed_format()
        .unwrap()
        .decode()
        .unwrap_or_else(|e| panic!("failed to decode {}: {e}", path.display()));
    (img.width(), img.height())
}

/// All file names in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
