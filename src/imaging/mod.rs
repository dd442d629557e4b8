//! Image processing with every codec compiled into the binary.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify / sniff** | `image::ImageReader::with_guessed_format` |
//! | **Resize** | `resize_exact` with bilinear (`Triangle`) filtering |
//! | **Compress** | JPEG/PNG/GIF encoders from `image`, LZW TIFF from `tiff` |
//! | **Convert** | `webp::Encoder` (lossy), `image::codecs::webp::WebPEncoder` (lossless) |
//!
//! The module is split into:
//! - **Kind**: [`ImageKind`], the closed set of accepted formats
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod kind;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Capabilities, Dimensions, ImageBackend};
pub use calculations::calculate_fit_dimensions;
pub use kind::{ImageKind, WEBP_MIME};
pub use operations::{
    ResizeLimits, compress_in_place, convert_to_webp, detect_kind, get_dimensions,
    resize_if_oversized,
};
pub use params::{EncodeSettings, PngLevel, Quality, WebpSettings};
pub use rust_backend::RustBackend;
