//! Upload intake: the pipeline every new upload passes through.
//!
//! ```text
//! capability check → resize → validate → compress → convert
//! ```
//!
//! The steps always run in this order. The pipeline never fails the upload
//! it was handed. Every failure is logged and turned into an
//! [`IntakeOutcome::Stopped`], and the caller still gets back a descriptor
//! that points at a real image:
//!
//! | Failure | Descriptor returned |
//! |---|---|
//! | codecs missing | input, file untouched |
//! | resize | logged only; the pipeline carries on with the original |
//! | validation | input, file untouched (or resized) |
//! | compress | input |
//! | convert / no WebP encoder | input, file now compressed |
//!
//! A successful run swaps the descriptor to the `.webp` sibling with MIME
//! `image/webp`.

use crate::config::PipelineConfig;
use crate::imaging::{
    BackendError, Dimensions, ImageBackend, ImageKind, WEBP_MIME, compress_in_place,
    convert_to_webp, detect_kind, resize_if_oversized,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// An uploaded file as the host describes it: where it is and what type the
/// uploader claimed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDescriptor {
    pub path: PathBuf,
    pub mime: String,
}

impl UploadDescriptor {
    pub fn new(path: impl Into<PathBuf>, mime: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime: mime.into(),
        }
    }

    /// The allow-listed kind named by the declared MIME, if any.
    pub fn declared_kind(&self) -> Option<ImageKind> {
        ImageKind::from_mime(&self.mime)
    }
}

/// Broad classes of intake failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Something is missing from the runtime (codecs, WebP encoder).
    Environment,
    /// The file is not something the pipeline accepts.
    Validation,
    /// Decoding or encoding failed partway through a step.
    Codec,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Environment => "environment",
            Self::Validation => "validation",
            Self::Codec => "codec",
        })
    }
}

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("No image codecs available; upload left as-is")]
    CodecsUnavailable,
    #[error("Could not read file type: {0}")]
    Unreadable(#[source] BackendError),
    #[error("{} does not have an accepted image extension", .0.display())]
    UnsupportedExtension(PathBuf),
    #[error("{} is not a JPEG, PNG, GIF or TIFF image", .0.display())]
    UnsupportedContent(PathBuf),
    #[error("File contents are {content} but the extension says {extension}")]
    ContentMismatch {
        extension: ImageKind,
        content: ImageKind,
    },
    #[error("Compression failed: {0}")]
    Compress(#[source] BackendError),
    #[error("WebP conversion failed: {0}")]
    Convert(#[source] BackendError),
}

impl IntakeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CodecsUnavailable | Self::Convert(BackendError::WebpUnavailable) => {
                ErrorKind::Environment
            }
            Self::Unreadable(_)
            | Self::UnsupportedExtension(_)
            | Self::UnsupportedContent(_)
            | Self::ContentMismatch { .. }
            | Self::Convert(BackendError::UnknownExtension(_)) => ErrorKind::Validation,
            Self::Compress(_) | Self::Convert(_) => ErrorKind::Codec,
        }
    }
}

/// Where the pipeline ended up.
#[derive(Debug)]
pub enum IntakeOutcome {
    Converted { webp: PathBuf },
    Stopped(IntakeError),
}

/// Everything that happened to one upload.
#[derive(Debug)]
pub struct IntakeReport {
    /// The descriptor as it came in.
    pub upload: UploadDescriptor,
    /// New dimensions, if the resize step rewrote the file.
    pub resized: Option<Dimensions>,
    /// Whether the file was re-encoded in place.
    pub compressed: bool,
    pub outcome: IntakeOutcome,
}

impl IntakeReport {
    /// The descriptor handed back to the host.
    pub fn descriptor(&self) -> UploadDescriptor {
        match &self.outcome {
            IntakeOutcome::Converted { webp } => UploadDescriptor::new(webp.clone(), WEBP_MIME),
            IntakeOutcome::Stopped(_) => self.upload.clone(),
        }
    }

    pub fn converted(&self) -> bool {
        matches!(self.outcome, IntakeOutcome::Converted { .. })
    }
}

/// Upload hook: run the pipeline and return only the resulting descriptor.
pub fn handle_upload(
    backend: &impl ImageBackend,
    config: &PipelineConfig,
    upload: UploadDescriptor,
) -> UploadDescriptor {
    process_upload(backend, config, upload).descriptor()
}

/// Run every intake step over `upload` and report what happened.
pub fn process_upload(
    backend: &impl ImageBackend,
    config: &PipelineConfig,
    upload: UploadDescriptor,
) -> IntakeReport {
    let mut report = IntakeReport {
        upload,
        resized: None,
        compressed: false,
        outcome: IntakeOutcome::Stopped(IntakeError::CodecsUnavailable),
    };
    let path = report.upload.path.clone();
    let encode = config.encode_settings();

    if !backend.capabilities().codecs {
        warn!("No image codecs available, skipping {}", path.display());
        return report;
    }

    if config.resize_images {
        match report.upload.declared_kind() {
            Some(kind) => {
                match resize_if_oversized(backend, &path, kind, config.resize_limits(), encode) {
                    Ok(Some(dims)) => {
                        info!(
                            "Resized {} to {}x{}",
                            path.display(),
                            dims.width,
                            dims.height
                        );
                        report.resized = Some(dims);
                    }
                    Ok(None) => debug!("{} needs no resize", path.display()),
                    Err(e) => error!("Resize of {} failed: {}", path.display(), e),
                }
            }
            None => debug!(
                "Declared type {} is not resizable, skipping resize",
                report.upload.mime
            ),
        }
    }

    let kind = match validate(backend, &path) {
        Ok(kind) => kind,
        Err(e) => {
            debug!("Not processing {}: {}", path.display(), e);
            report.outcome = IntakeOutcome::Stopped(e);
            return report;
        }
    };

    if let Err(e) = compress_in_place(backend, &path, kind, encode) {
        error!("Compression of {} failed: {}", path.display(), e);
        report.outcome = IntakeOutcome::Stopped(IntakeError::Compress(e));
        return report;
    }
    report.compressed = true;
    debug!("Compressed {} as {}", path.display(), kind);

    let webp = match convert_to_webp(backend, &path, kind, config.webp_settings()) {
        Ok(webp) => webp,
        Err(BackendError::WebpUnavailable) => {
            warn!("WebP encoder unavailable, keeping {}", path.display());
            report.outcome =
                IntakeOutcome::Stopped(IntakeError::Convert(BackendError::WebpUnavailable));
            return report;
        }
        Err(e) => {
            error!("WebP conversion of {} failed: {}", path.display(), e);
            report.outcome = IntakeOutcome::Stopped(IntakeError::Convert(e));
            return report;
        }
    };
    info!("Converted {} to {}", path.display(), webp.display());

    if !config.convert.keep_original {
        remove_original(&path);
    }

    report.outcome = IntakeOutcome::Converted { webp };
    report
}

/// Check the real file type and the extension against the allow-list.
///
/// Both must name an accepted format, and the same one. The content's kind
/// is what the later steps encode with.
fn validate(backend: &impl ImageBackend, path: &Path) -> Result<ImageKind, IntakeError> {
    let extension = ImageKind::from_path(path)
        .ok_or_else(|| IntakeError::UnsupportedExtension(path.to_path_buf()))?;
    let content = detect_kind(backend, path)
        .map_err(IntakeError::Unreadable)?
        .ok_or_else(|| IntakeError::UnsupportedContent(path.to_path_buf()))?;
    if extension != content {
        return Err(IntakeError::ContentMismatch { extension, content });
    }
    Ok(content)
}

fn remove_original(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed original {}", path.display()),
        Err(e) => warn!("Could not remove original {}: {}", path.display(), e),
    }
}
