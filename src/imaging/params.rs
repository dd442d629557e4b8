//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the high-level [`operations`](super::operations) module
//! (which decides whether a step runs) and the [`backend`](super::backend)
//! (which does the actual pixel work). This separation allows swapping backends
//! (e.g. for testing with a mock) without changing operation logic.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG encoding quality (1–100, default 85). Clamped on construction.
//! - [`PngLevel`]: PNG compression level on the familiar 0–9 scale (default 7).
//! - [`EncodeSettings`]: Quality + PNG level, shared by resize and compress.
//! - [`WebpSettings`]: Lossy quality (default 80) or lossless for the WebP copy.
//! - [`ResizeParams`]: In-place downsample: file, kind, target dimensions.
//! - [`CompressParams`]: In-place re-encode: file, kind.
//! - [`ConvertParams`]: WebP conversion: source, destination.

use super::kind::ImageKind;
use image::codecs::png::CompressionType;
use std::path::PathBuf;

/// Quality setting for lossy JPEG encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(85)
    }
}

/// PNG compression level, 0 (fastest) to 9 (smallest).
///
/// The pure-Rust encoder exposes three presets rather than ten levels, so
/// the level is bucketed: 0–2 fast, 3–6 default, 7–9 best.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PngLevel(u8);

impl PngLevel {
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn compression_type(self) -> CompressionType {
        match self.0 {
            0..=2 => CompressionType::Fast,
            3..=6 => CompressionType::Default,
            _ => CompressionType::Best,
        }
    }
}

impl Default for PngLevel {
    fn default() -> Self {
        Self(7)
    }
}

/// Encoder settings applied whenever a file is rewritten in its own format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeSettings {
    pub quality: Quality,
    pub png_level: PngLevel,
}

/// How the WebP copy is encoded.
///
/// Lossy at `quality` unless `lossless` is set. Lossless output of a
/// photograph is usually larger than the JPEG it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebpSettings {
    pub quality: Quality,
    pub lossless: bool,
}

impl Default for WebpSettings {
    fn default() -> Self {
        Self {
            quality: Quality::new(80),
            lossless: false,
        }
    }
}

/// Downsample `path` to exactly `width`×`height`, overwriting it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub path: PathBuf,
    pub kind: ImageKind,
    pub width: u32,
    pub height: u32,
    pub encode: EncodeSettings,
}

/// Re-encode `path` in its own format, overwriting it.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressParams {
    pub path: PathBuf,
    pub kind: ImageKind,
    pub encode: EncodeSettings,
}

/// Decode `source` and write it as WebP to `output`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub kind: ImageKind,
    pub webp: WebpSettings,
}
