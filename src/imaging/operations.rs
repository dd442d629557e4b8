//! High-level image operations.
//!
//! These functions combine calculations with backend execution.
//! They take configuration, compute parameters, and call the backend.
//! None of them log; the callers decide how loud a failure is.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::calculate_fit_dimensions;
use super::kind::ImageKind;
use super::params::{CompressParams, ConvertParams, EncodeSettings, ResizeParams, WebpSettings};
use crate::naming::webp_path_for;
use std::path::{Path, PathBuf};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Get image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok((dims.width, dims.height))
}

/// Identify the allow-listed kind of a file from its contents.
///
/// `Ok(None)` covers both unrecognised bytes and recognised formats outside
/// the allow-list (BMP, WebP, ...).
pub fn detect_kind(backend: &impl ImageBackend, path: &Path) -> Result<Option<ImageKind>> {
    Ok(backend.sniff(path)?.and_then(ImageKind::from_image_format))
}

/// Bounding box for the resize step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeLimits {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for ResizeLimits {
    fn default() -> Self {
        Self {
            max_width: 2560,
            max_height: 2560,
        }
    }
}

/// Plan a resize without executing it.
///
/// Returns `None` when the kind is not resizable or the image already fits.
pub fn plan_resize(
    path: &Path,
    kind: ImageKind,
    original: (u32, u32),
    limits: ResizeLimits,
    encode: EncodeSettings,
) -> Option<ResizeParams> {
    if !kind.supports_resize() {
        return None;
    }
    let (width, height) =
        calculate_fit_dimensions(original, (limits.max_width, limits.max_height))?;
    Some(ResizeParams {
        path: path.to_path_buf(),
        kind,
        width,
        height,
        encode,
    })
}

/// Downsample `path` in place if it exceeds `limits`.
///
/// Returns the new dimensions, or `None` if nothing was done. TIFF is never
/// resized and is not even identified. A file whose contents are not `kind`
/// is left alone.
pub fn resize_if_oversized(
    backend: &impl ImageBackend,
    path: &Path,
    kind: ImageKind,
    limits: ResizeLimits,
    encode: EncodeSettings,
) -> Result<Option<Dimensions>> {
    if !kind.supports_resize() {
        return Ok(None);
    }
    if detect_kind(backend, path)? != Some(kind) {
        return Ok(None);
    }
    let original = get_dimensions(backend, path)?;
    let Some(params) = plan_resize(path, kind, original, limits, encode) else {
        return Ok(None);
    };
    backend.resize(&params)?;
    Ok(Some(Dimensions {
        width: params.width,
        height: params.height,
    }))
}

/// Re-encode `path` in place with the settings for its kind.
pub fn compress_in_place(
    backend: &impl ImageBackend,
    path: &Path,
    kind: ImageKind,
    encode: EncodeSettings,
) -> Result<()> {
    backend.compress(&CompressParams {
        path: path.to_path_buf(),
        kind,
        encode,
    })
}

/// Write a WebP sibling of `path` and return its location.
///
/// The source is left in place. An existing sibling is overwritten.
pub fn convert_to_webp(
    backend: &impl ImageBackend,
    path: &Path,
    kind: ImageKind,
    webp: WebpSettings,
) -> Result<PathBuf> {
    if !backend.capabilities().webp {
        return Err(BackendError::WebpUnavailable);
    }
    let output =
        webp_path_for(path).ok_or_else(|| BackendError::UnknownExtension(path.to_path_buf()))?;
    backend.convert(&ConvertParams {
        source: path.to_path_buf(),
        output: output.clone(),
        kind,
        webp,
    })?;
    Ok(output)
}
