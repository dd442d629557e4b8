//! Operator-facing notices about the runtime environment.
//!
//! The pipeline degrades silently when codecs are missing, so the CLI shows
//! these banners to tell the operator why uploads are passing through
//! untouched.

use crate::imaging::Capabilities;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Error,
    Warning,
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "error",
            Self::Warning => "warning",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }
}

/// Notices for whatever the backend reports as missing. Empty when
/// everything is available.
pub fn environment_notices(caps: Capabilities) -> Vec<Notice> {
    if !caps.codecs {
        return vec![Notice::error(
            "No JPEG, PNG, GIF or TIFF codecs are available. \
             Uploads will be stored without resizing, compression or WebP conversion.",
        )];
    }
    let mut notices = Vec::new();
    if !caps.webp {
        notices.push(Notice::warning(
            "No WebP encoder is available. \
             Uploads will be compressed but kept in their original format.",
        ));
    }
    notices
}
