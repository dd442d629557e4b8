//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## Upload
//!
//! ```text
//! photo.jpg (image/jpeg)
//!     Resized: 2560x1920
//!     Compressed: yes
//!     Result: converted → photo.webp
//! ```
//!
//! ## Batch
//!
//! ```text
//! Batch uploads/ (3 files)
//! 001 a.jpg → a.webp
//! 002 b.jpg
//!     skipped: not an accepted image type
//! 003 c.png
//!     failed: Processing failed: ...
//!
//! Converted 1, skipped 1, failed 1
//! ```
//!
//! ## Check
//!
//! ```text
//! [warning] No WebP encoder is available. ...
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! `upload` keeps stdout for the JSON descriptor, so its report and notices
//! go through the `eprint_*` wrappers instead.

use crate::batch::{BatchReport, BatchStatus};
use crate::notices::Notice;
use crate::pipeline::{IntakeOutcome, IntakeReport};
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Display `path` relative to `root` when it lives under it.
fn relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Upload
// ============================================================================

/// Format the report of a single upload intake.
pub fn format_upload_report(report: &IntakeReport) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({})",
        file_name(&report.upload.path),
        report.upload.mime
    )];

    if let Some(dims) = report.resized {
        lines.push(format!("{}Resized: {}x{}", indent(1), dims.width, dims.height));
    }
    lines.push(format!(
        "{}Compressed: {}",
        indent(1),
        if report.compressed { "yes" } else { "no" }
    ));
    lines.push(match &report.outcome {
        IntakeOutcome::Converted { webp } => {
            format!("{}Result: converted → {}", indent(1), file_name(webp))
        }
        IntakeOutcome::Stopped(e) => {
            format!("{}Result: unchanged ({}): {}", indent(1), e.kind(), e)
        }
    });
    lines
}

pub fn eprint_upload_report(report: &IntakeReport) {
    for line in format_upload_report(report) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Batch
// ============================================================================

/// Format batch results, one entry per file in enumeration order.
pub fn format_batch_report(report: &BatchReport) -> Vec<String> {
    let root = &report.root;
    let mut lines = vec![format!(
        "Batch {} ({} files)",
        root.display(),
        report.entries.len()
    )];

    for (i, entry) in report.entries.iter().enumerate() {
        let source = relative(&entry.source, root);
        match &entry.status {
            BatchStatus::Converted(webp) => lines.push(format!(
                "{} {} → {}",
                format_index(i + 1),
                source,
                relative(webp, root)
            )),
            BatchStatus::Skipped => {
                lines.push(format!("{} {}", format_index(i + 1), source));
                lines.push(format!(
                    "{}skipped: not an accepted image type",
                    indent(1)
                ));
            }
            BatchStatus::Failed(e) => {
                lines.push(format!("{} {}", format_index(i + 1), source));
                lines.push(format!("{}failed: {}", indent(1), e));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Converted {}, skipped {}, failed {}",
        report.converted(),
        report.skipped(),
        report.failed()
    ));
    lines
}

pub fn print_batch_report(report: &BatchReport) {
    for line in format_batch_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Notices
// ============================================================================

pub fn format_notices(notices: &[Notice]) -> Vec<String> {
    notices
        .iter()
        .map(|n| format!("[{}] {}", n.level, n.message))
        .collect()
}

pub fn print_notices(notices: &[Notice]) {
    for line in format_notices(notices) {
        println!("{}", line);
    }
}

pub fn eprint_notices(notices: &[Notice]) {
    for line in format_notices(notices) {
        eprintln!("{}", line);
    }
}
