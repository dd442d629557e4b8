//! # webp-press
//!
//! Upload-time image optimization for a media library. Every new upload is
//! optionally downsized, recompressed in its own format, and given a WebP
//! sibling that replaces it in the host's records. A separate batch command
//! converts files that were uploaded before the pipeline existed.
//!
//! # Architecture: One Pipeline, One Batch Pass
//!
//! ```text
//! upload   {path, mime} → capability → resize → validate → compress → convert → {path, mime}
//! batch    uploads/     → enumerate → sniff → convert                          → report
//! ```
//!
//! The intake never fails an upload. Whatever goes wrong, the host gets back
//! a descriptor pointing at a valid image; the reason is logged and recorded
//! in the [`pipeline::IntakeReport`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Upload intake: the five steps and their failure semantics |
//! | [`batch`] | Walks the upload root and converts every image it finds |
//! | [`config`] | `config.toml` loading, validation, and merging over stock defaults |
//! | [`naming`] | Extension rules and the `.webp` sibling path |
//! | [`notices`] | Operator banners for missing codecs |
//! | [`imaging`] | Image operations: identify, resize, compress, convert |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## A Closed Set of Formats
//!
//! The accepted formats are the [`imaging::ImageKind`] enum, not a list of MIME
//! strings. Declared MIME types, file extensions, and sniffed contents are
//! all mapped onto it at the edges, so the steps only ever match on four
//! variants.
//!
//! ## Explicit Configuration
//!
//! [`config::PipelineConfig`] is loaded once and passed by reference into
//! [`pipeline::process_upload`] and [`batch::batch_convert`]. Nothing reads
//! settings from a global.
//!
//! ## Statically Linked Imaging
//!
//! Codecs come from the `image` crate, plus `tiff` for LZW output and `webp`
//! (a bundled `libwebp`) for lossy WebP. There is no system library to go
//! missing at runtime, but the capability check still runs so a build without
//! a codec feature degrades the same way.

pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod notices;
pub mod output;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;
