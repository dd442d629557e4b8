//! Centralized filename handling for uploads and their WebP siblings.
//!
//! Only the extensions `jpg`, `jpeg`, `png`, `gif`, and `tiff` are
//! recognised, in any letter case. The WebP sibling of a file is the same
//! path with that extension swapped for a lowercase `.webp`:
//!
//! - `2024/05/photo.JPEG` → `2024/05/photo.webp`
//! - `banner.png` → `banner.webp`
//! - `scan.tif` → no sibling (`tif` is not in the list)
//!
//! Intake still accepts `.tif` uploads as TIFF and compresses them; they just
//! never get a `.webp`.

use crate::imaging::ImageKind;
use std::path::{Path, PathBuf};

/// MIME reported for files whose extension names no allow-listed format.
pub const FALLBACK_MIME: &str = "application/octet-stream";

const CONVERTIBLE_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "png", "gif", "tiff"];

/// Derive the WebP output path for `path`.
///
/// Returns `None` when the file has no convertible extension.
pub fn webp_path_for(path: &Path) -> Option<PathBuf> {
    is_convertible(path).then(|| path.with_extension("webp"))
}

/// Whether the batch converter should pick this file up.
pub fn is_convertible(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            CONVERTIBLE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// The MIME type an uploader would declare for `path`, judged by extension.
pub fn mime_for_path(path: &Path) -> &'static str {
    ImageKind::from_path(path)
        .map(ImageKind::mime)
        .unwrap_or(FALLBACK_MIME)
}
