//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the operations every backend must
//! support: capability probing, identify, sniff, resize, compress, and
//! convert.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), with every codec
//! compiled into the binary.

use super::params::{CompressParams, ConvertParams, ResizeParams};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
    #[error("No WebP encoder available")]
    WebpUnavailable,
    #[error("No convertible image extension on {}", .0.display())]
    UnknownExtension(PathBuf),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

/// Which codecs the backend can use right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// At least one allow-listed format can be both decoded and encoded.
    pub codecs: bool,
    /// WebP output is possible.
    pub webp: bool,
}

impl Capabilities {
    pub fn full() -> Self {
        Self {
            codecs: true,
            webp: true,
        }
    }

    pub fn none() -> Self {
        Self {
            codecs: false,
            webp: false,
        }
    }
}

/// Trait for image processing backends.
///
/// Every backend must implement all operations so the pipeline and batch
/// converter stay backend-agnostic. Resize and compress overwrite the file
/// they are given; convert writes a new file.
pub trait ImageBackend {
    /// Report codec availability.
    fn capabilities(&self) -> Capabilities;

    /// Get image dimensions.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Guess the encoded format from the file's leading bytes.
    ///
    /// `Ok(None)` means the contents matched no known signature.
    fn sniff(&self, path: &Path) -> Result<Option<ImageFormat>, BackendError>;

    /// Downsample in place.
    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError>;

    /// Re-encode in place with format-specific settings.
    fn compress(&self, params: &CompressParams) -> Result<(), BackendError>;

    /// Decode and write a WebP copy.
    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError>;
}
