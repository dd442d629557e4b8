//! Batch conversion of files already sitting in the upload root.
//!
//! Operator-triggered and separate from upload intake: files are neither
//! resized nor recompressed, only given a `.webp` sibling. Each file's kind
//! is taken from its contents, so a mislabelled upload is still decoded with
//! the right codec. One bad file never stops the run.

use crate::config::PipelineConfig;
use crate::imaging::{BackendError, ImageBackend, WebpSettings, convert_to_webp, detect_kind};
use crate::naming::is_convertible;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Upload directory not found: {}", .0.display())]
    RootNotFound(PathBuf),
    #[error("No image codecs available")]
    CodecsUnavailable,
    #[error("No WebP encoder available")]
    WebpUnavailable,
}

/// What happened to one file.
#[derive(Debug)]
pub enum BatchStatus {
    Converted(PathBuf),
    /// Contents are not an accepted image type.
    Skipped,
    Failed(BackendError),
}

#[derive(Debug)]
pub struct BatchEntry {
    pub source: PathBuf,
    pub status: BatchStatus,
}

#[derive(Debug)]
pub struct BatchReport {
    pub root: PathBuf,
    pub entries: Vec<BatchEntry>,
}

impl BatchReport {
    pub fn converted(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Converted(_)))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, BatchStatus::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&BatchStatus) -> bool) -> usize {
        self.entries.iter().filter(|e| pred(&e.status)).count()
    }
}

/// List the files under `root` the converter will pick up, sorted by path.
///
/// Without `recursive` only direct children of `root` are considered.
/// Unreadable directory entries are logged and skipped.
pub fn find_candidates(root: &Path, recursive: bool) -> Result<Vec<PathBuf>, BatchError> {
    if !root.is_dir() {
        return Err(BatchError::RootNotFound(root.to_path_buf()));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut candidates = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).max_depth(max_depth) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if entry.file_type().is_file() && is_convertible(entry.path()) {
            candidates.push(entry.into_path());
        }
    }
    candidates.sort();
    Ok(candidates)
}

/// Give every convertible file under `root` a WebP sibling.
///
/// Existing `.webp` files are overwritten. Per-file failures are recorded in
/// the report; only problems that would fail every file are returned as
/// errors.
pub fn batch_convert(
    backend: &impl ImageBackend,
    config: &PipelineConfig,
    root: &Path,
) -> Result<BatchReport, BatchError> {
    let caps = backend.capabilities();
    if !caps.codecs {
        return Err(BatchError::CodecsUnavailable);
    }
    if !caps.webp {
        return Err(BatchError::WebpUnavailable);
    }

    let candidates = find_candidates(root, config.batch.recursive)?;
    info!(
        "Batch converting {} file(s) in {}",
        candidates.len(),
        root.display()
    );

    let webp = config.webp_settings();
    let entries = candidates
        .into_iter()
        .map(|source| {
            let status = convert_one(backend, &source, webp);
            BatchEntry { source, status }
        })
        .collect();

    Ok(BatchReport {
        root: root.to_path_buf(),
        entries,
    })
}

fn convert_one(backend: &impl ImageBackend, source: &Path, webp: WebpSettings) -> BatchStatus {
    let kind = match detect_kind(backend, source) {
        Ok(Some(kind)) => kind,
        Ok(None) => {
            warn!("Skipping {}: not an accepted image type", source.display());
            return BatchStatus::Skipped;
        }
        Err(e) => {
            warn!("Skipping {}: {}", source.display(), e);
            return BatchStatus::Failed(e);
        }
    };

    match convert_to_webp(backend, source, kind, webp) {
        Ok(webp) => {
            info!("Converted {} to {}", source.display(), webp.display());
            BatchStatus::Converted(webp)
        }
        Err(e) => {
            error!("Could not convert {}: {}", source.display(), e);
            BatchStatus::Failed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BatchConfig;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::{Capabilities, RustBackend};
    use crate::test_helpers::*;
    use image::ImageFormat;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"").unwrap();
    }

    fn names(paths: &[PathBuf], root: &Path) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().to_string())
            .collect()
    }

    fn recursive() -> PipelineConfig {
        PipelineConfig {
            batch: BatchConfig { recursive: true },
            ..PipelineConfig::default()
        }
    }

    // =========================================================================
    // find_candidates
    // =========================================================================

    #[test]
    fn candidates_filter_by_extension() {
        let tmp = TempDir::new().unwrap();
        for name in [
            "b.png", "a.JPG", "c.gif", "d.tiff", "e.jpeg", "f.tif", "g.webp", "h.bmp", "notes.txt",
        ] {
            touch(&tmp.path().join(name));
        }

        let found = find_candidates(tmp.path(), false).unwrap();

        assert_eq!(
            names(&found, tmp.path()),
            vec!["a.JPG", "b.png", "c.gif", "d.tiff", "e.jpeg"]
        );
    }

    #[test]
    fn candidates_stay_at_top_level_by_default() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("top.jpg"));
        touch(&tmp.path().join("2024/05/nested.jpg"));

        let found = find_candidates(tmp.path(), false).unwrap();

        assert_eq!(names(&found, tmp.path()), vec!["top.jpg"]);
    }

    #[test]
    fn candidates_descend_when_recursive() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("top.jpg"));
        touch(&tmp.path().join("2024/05/nested.jpg"));

        let found = find_candidates(tmp.path(), true).unwrap();

        assert_eq!(found.len(), 2);
        assert!(found.contains(&tmp.path().join("2024/05/nested.jpg")));
    }

    #[test]
    fn directories_named_like_images_are_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("album.jpg")).unwrap();

        assert!(find_candidates(tmp.path(), true).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_an_error() {
        let tmp = TempDir::new().unwrap();

        let result = find_candidates(&tmp.path().join("nope"), false);

        assert!(matches!(result, Err(BatchError::RootNotFound(_))));
    }

    // =========================================================================
    // batch_convert (mock backend)
    // =========================================================================

    #[test]
    fn converts_every_candidate() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a.jpg"));
        touch(&tmp.path().join("b.jpg"));
        let backend = MockBackend::with_image(10, 10, ImageFormat::Jpeg);

        let report = batch_convert(&backend, &PipelineConfig::default(), tmp.path()).unwrap();

        assert_eq!(report.converted(), 2);
        assert_eq!(
            file_names(tmp.path()),
            vec!["a.jpg", "a.webp", "b.jpg", "b.webp"]
        );
    }

    #[test]
    fn never_resizes_or_compresses() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("huge.png"));
        let backend = MockBackend::with_image(9000, 9000, ImageFormat::Png);

        batch_convert(&backend, &PipelineConfig::default(), tmp.path()).unwrap();

        let ops = backend.get_operations();
        assert!(
            ops.iter()
                .all(|op| matches!(op, RecordedOp::Sniff(_) | RecordedOp::Convert { .. }))
        );
    }

    #[test]
    fn configured_webp_quality_reaches_encoder() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a.jpg"));
        let backend = MockBackend::with_image(10, 10, ImageFormat::Jpeg);
        let config: PipelineConfig = toml::from_str("[convert]\nwebp_quality = 42").unwrap();

        batch_convert(&backend, &config, tmp.path()).unwrap();

        assert!(backend.get_operations().iter().any(|op| matches!(
            op,
            RecordedOp::Convert { webp, .. } if webp.quality.value() == 42 && !webp.lossless
        )));
    }

    #[test]
    fn unrecognised_content_is_skipped() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a.gif"));
        let backend = MockBackend::with_image(10, 10, ImageFormat::Bmp);

        let report = batch_convert(&backend, &PipelineConfig::default(), tmp.path()).unwrap();

        assert_eq!(report.skipped(), 1);
        assert_eq!(file_names(tmp.path()), vec!["a.gif"]);
    }

    #[test]
    fn per_file_failures_are_reported_not_raised() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a.jpg"));
        touch(&tmp.path().join("b.png"));
        let backend = MockBackend::with_image(10, 10, ImageFormat::Jpeg).failing("convert");

        let report = batch_convert(&backend, &PipelineConfig::default(), tmp.path()).unwrap();

        assert_eq!(report.failed(), 2);
        assert_eq!(report.entries.len(), 2);
    }

    #[test]
    fn recursive_config_reaches_subfolders() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("2023/01/a.jpg"));
        let backend = MockBackend::with_image(10, 10, ImageFormat::Jpeg);

        let flat = batch_convert(&backend, &PipelineConfig::default(), tmp.path()).unwrap();
        let deep = batch_convert(&backend, &recursive(), tmp.path()).unwrap();

        assert!(flat.entries.is_empty());
        assert_eq!(deep.converted(), 1);
        assert!(tmp.path().join("2023/01/a.webp").exists());
    }

    #[test]
    fn missing_webp_encoder_fails_up_front() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("a.jpg"));
        let backend = MockBackend::with_image(10, 10, ImageFormat::Jpeg).with_capabilities(
            Capabilities {
                codecs: true,
                webp: false,
            },
        );

        let result = batch_convert(&backend, &PipelineConfig::default(), tmp.path());

        assert!(matches!(result, Err(BatchError::WebpUnavailable)));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn missing_codecs_fail_up_front() {
        let tmp = TempDir::new().unwrap();
        let backend = MockBackend::new().with_capabilities(Capabilities::none());

        let result = batch_convert(&backend, &PipelineConfig::default(), tmp.path());

        assert!(matches!(result, Err(BatchError::CodecsUnavailable)));
    }

    // =========================================================================
    // Real codecs
    // =========================================================================

    #[test]
    fn real_mixed_directory() {
        let tmp = TempDir::new().unwrap();
        create_test_jpeg(&tmp.path().join("one.jpg"), 32, 24);
        create_test_image(&tmp.path().join("two.gif"), crate::imaging::ImageKind::Gif, 16, 16);
        fs::write(tmp.path().join("broken.jpg"), b"not really a jpeg").unwrap();

        let report = batch_convert(&RustBackend::new(), &PipelineConfig::default(), tmp.path())
            .unwrap();

        assert_eq!(report.converted(), 2);
        assert_eq!(report.entries.len(), 3);
        assert_eq!(image_dimensions(&tmp.path().join("one.webp")), (32, 24));
        assert_eq!(image_dimensions(&tmp.path().join("two.webp")), (16, 16));
        assert!(!tmp.path().join("broken.webp").exists());
    }
}
