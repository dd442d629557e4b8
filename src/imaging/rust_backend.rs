//! Image processing backend with no system libraries.
//!
//! Everything is statically linked into the binary. All codecs are pure Rust
//! except lossy WebP, which goes through the bundled `libwebp`.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Sniff + decode (JPEG, PNG, GIF, TIFF) | `image::ImageReader::with_guessed_format` |
//! | Resize | `image::DynamicImage::resize_exact` with `Triangle` (bilinear) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` at the configured quality |
//! | Encode → PNG | `image::codecs::png::PngEncoder` at the configured level preset |
//! | Encode → GIF | `image::codecs::gif::GifEncoder` |
//! | Encode → TIFF (LZW) | `tiff::encoder::TiffEncoder` |
//! | Encode → WebP (lossy) | `webp::Encoder` at the configured quality |
//! | Encode → WebP (lossless) | `image::codecs::webp::WebPEncoder` |
//!
//! Every write encodes into memory first and only then replaces the file,
//! so a failed encode leaves the original bytes on disk.

use super::backend::{BackendError, Capabilities, Dimensions, ImageBackend};
use super::kind::ImageKind;
use super::params::{CompressParams, ConvertParams, EncodeSettings, ResizeParams, WebpSettings};
use image::codecs::gif::GifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;
use tiff::encoder::{TiffEncoder, colortype, compression::Lzw};

/// NeuQuant speed for GIF palettes: 1 is slowest, 30 fastest.
const GIF_QUANTIZE_SPEED: i32 = 10;

/// Backend built on the `image` crate, with `tiff` and `webp` for the
/// encoders it lacks.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Open a reader that decides the format from content alone.
///
/// `ImageReader::open` would seed the format from the extension and keep it
/// when the magic bytes match nothing, which lets a corrupt `.jpg` pass as JPEG.
fn content_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, BackendError> {
    let file = File::open(path)?;
    Ok(ImageReader::new(BufReader::new(file)).with_guessed_format()?)
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    content_reader(path)?.decode().map_err(|e| {
        BackendError::ProcessingFailed(format!("Failed to decode {}: {}", path.display(), e))
    })
}

fn encode_failed(kind: &str, e: impl std::fmt::Display) -> BackendError {
    BackendError::ProcessingFailed(format!("{kind} encode failed: {e}"))
}

/// JPEG has no alpha and no 16-bit mode.
fn jpeg_compatible(img: &DynamicImage) -> Cow<'_, DynamicImage> {
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(img),
        other => Cow::Owned(DynamicImage::ImageRgb8(other.to_rgb8())),
    }
}

/// Encode `img` in `kind`'s own format.
fn encode(
    img: &DynamicImage,
    kind: ImageKind,
    settings: EncodeSettings,
) -> Result<Vec<u8>, BackendError> {
    let mut buf = Vec::new();
    match kind {
        ImageKind::Jpeg => {
            let encoder =
                JpegEncoder::new_with_quality(&mut buf, settings.quality.value() as u8);
            jpeg_compatible(img)
                .write_with_encoder(encoder)
                .map_err(|e| encode_failed("JPEG", e))?;
        }
        ImageKind::Png => {
            let encoder = PngEncoder::new_with_quality(
                &mut buf,
                settings.png_level.compression_type(),
                PngFilter::Adaptive,
            );
            img.write_with_encoder(encoder)
                .map_err(|e| encode_failed("PNG", e))?;
        }
        ImageKind::Gif => {
            let rgba = img.to_rgba8();
            // The trailer is written when the encoder drops
            let mut encoder = GifEncoder::new_with_speed(&mut buf, GIF_QUANTIZE_SPEED);
            encoder
                .encode(rgba.as_raw(), rgba.width(), rgba.height(), ExtendedColorType::Rgba8)
                .map_err(|e| encode_failed("GIF", e))?;
        }
        ImageKind::Tiff => encode_tiff_lzw(img, &mut buf)?,
    }
    Ok(buf)
}

/// Write an LZW-compressed TIFF. The `image` crate's own TIFF encoder
/// offers no compression setting.
fn encode_tiff_lzw(img: &DynamicImage, buf: &mut Vec<u8>) -> Result<(), BackendError> {
    let tiff_err = |e: tiff::TiffError| encode_failed("TIFF", e);
    let mut encoder = TiffEncoder::new(Cursor::new(buf)).map_err(tiff_err)?;
    let (w, h) = (img.width(), img.height());

    match img {
        DynamicImage::ImageLuma8(gray) => encoder
            .write_image_with_compression::<colortype::Gray8, _>(w, h, Lzw, gray.as_raw())
            .map_err(tiff_err),
        other if other.color().has_alpha() => {
            let rgba = other.to_rgba8();
            encoder
                .write_image_with_compression::<colortype::RGBA8, _>(w, h, Lzw, rgba.as_raw())
                .map_err(tiff_err)
        }
        other => {
            let rgb = other.to_rgb8();
            encoder
                .write_image_with_compression::<colortype::RGB8, _>(w, h, Lzw, rgb.as_raw())
                .map_err(tiff_err)
        }
    }
}

/// Encode as WebP. Both encoders take 8-bit RGB(A) only.
fn encode_webp(img: &DynamicImage, settings: WebpSettings) -> Result<Vec<u8>, BackendError> {
    let alpha = img.color().has_alpha();
    if settings.lossless {
        let mut buf = Vec::new();
        let encoder = WebPEncoder::new_lossless(&mut buf);
        let result = if alpha {
            img.to_rgba8().write_with_encoder(encoder)
        } else {
            img.to_rgb8().write_with_encoder(encoder)
        };
        result.map_err(|e| encode_failed("WebP", e))?;
        return Ok(buf);
    }

    let quality = settings.quality.value() as f32;
    let encoded = if alpha {
        let rgba = img.to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height()).encode(quality)
    } else {
        let rgb = img.to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), rgb.width(), rgb.height()).encode(quality)
    };
    Ok(encoded.to_vec())
}

impl ImageBackend for RustBackend {
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            codecs: ImageKind::ALL.iter().any(|kind| {
                let format = kind.image_format();
                format.reading_enabled() && format.writing_enabled()
            }),
            webp: ImageFormat::WebP.writing_enabled(),
        }
    }

    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = content_reader(path)?.into_dimensions().map_err(|e| {
            BackendError::ProcessingFailed(format!("Failed to read dimensions: {}", e))
        })?;
        Ok(Dimensions { width, height })
    }

    fn sniff(&self, path: &Path) -> Result<Option<ImageFormat>, BackendError> {
        Ok(content_reader(path)?.format())
    }

    fn resize(&self, params: &ResizeParams) -> Result<(), BackendError> {
        let img = load_image(&params.path)?;
        let resized = img.resize_exact(params.width, params.height, FilterType::Triangle);
        drop(img);
        let bytes = encode(&resized, params.kind, params.encode)?;
        std::fs::write(&params.path, bytes)?;
        Ok(())
    }

    fn compress(&self, params: &CompressParams) -> Result<(), BackendError> {
        let img = load_image(&params.path)?;
        let bytes = encode(&img, params.kind, params.encode)?;
        std::fs::write(&params.path, bytes)?;
        Ok(())
    }

    fn convert(&self, params: &ConvertParams) -> Result<(), BackendError> {
        if !ImageFormat::WebP.writing_enabled() {
            return Err(BackendError::WebpUnavailable);
        }
        let img = load_image(&params.source)?;
        let bytes = encode_webp(&img, params.webp)?;
        std::fs::write(&params.output, bytes)?;
        Ok(())
    }
}
