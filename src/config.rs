//! Pipeline configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by whatever keys the user file sets; everything else keeps its
//! default. The resulting [`PipelineConfig`] is passed explicitly into the
//! intake and batch entry points and never mutated by them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! compress_quality = 85     # JPEG quality (0-100)
//! resize_images = true      # Downsize oversized uploads ("yes"/"no" also accepted)
//! uploads_dir = "uploads"   # Upload root scanned by `batch`
//!
//! [resize]
//! max_width = 2560
//! max_height = 2560
//!
//! [compression]
//! png_level = 7             # PNG compression level (0-9)
//!
//! [convert]
//! keep_original = true      # Keep the compressed source next to its .webp
//! webp_quality = 80         # Lossy WebP quality (0-100)
//! lossless = false          # Encode lossless WebP instead
//!
//! [batch]
//! recursive = false         # Descend into subdirectories of uploads_dir
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{EncodeSettings, PngLevel, Quality, ResizeLimits, WebpSettings};
use serde::{Deserialize, Deserializer, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Pipeline configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. User config files need only specify
/// the values they want to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// JPEG encoding quality (0 = worst, 100 = best).
    pub compress_quality: u32,
    /// Whether oversized uploads are downsized before compression.
    #[serde(deserialize_with = "deserialize_yes_no")]
    pub resize_images: bool,
    /// Upload root for batch conversion.
    pub uploads_dir: String,
    pub resize: ResizeConfig,
    pub compression: CompressionConfig,
    pub convert: ConvertConfig,
    pub batch: BatchConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            compress_quality: 85,
            resize_images: true,
            uploads_dir: "uploads".to_string(),
            resize: ResizeConfig::default(),
            compression: CompressionConfig::default(),
            convert: ConvertConfig::default(),
            batch: BatchConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compress_quality > 100 {
            return Err(ConfigError::Validation(
                "compress_quality must be 0-100".into(),
            ));
        }
        if self.compression.png_level > 9 {
            return Err(ConfigError::Validation(
                "compression.png_level must be 0-9".into(),
            ));
        }
        if self.convert.webp_quality > 100 {
            return Err(ConfigError::Validation(
                "convert.webp_quality must be 0-100".into(),
            ));
        }
        if self.resize.max_width == 0 || self.resize.max_height == 0 {
            return Err(ConfigError::Validation(
                "resize.max_width and resize.max_height must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Encoder settings for in-place rewrites (resize and compress).
    pub fn encode_settings(&self) -> EncodeSettings {
        EncodeSettings {
            quality: Quality::new(self.compress_quality),
            png_level: PngLevel::new(self.compression.png_level),
        }
    }

    /// Encoder settings for the `.webp` sibling.
    pub fn webp_settings(&self) -> WebpSettings {
        WebpSettings {
            quality: Quality::new(self.convert.webp_quality),
            lossless: self.convert.lossless,
        }
    }

    pub fn resize_limits(&self) -> ResizeLimits {
        ResizeLimits {
            max_width: self.resize.max_width,
            max_height: self.resize.max_height,
        }
    }

    pub fn uploads_path(&self) -> PathBuf {
        PathBuf::from(&self.uploads_dir)
    }
}

/// The host stored this flag as the string `"yes"` (anything else meant no);
/// TOML users will more naturally write a boolean. Accept both.
fn deserialize_yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum YesNo {
        Bool(bool),
        Text(String),
    }

    Ok(match YesNo::deserialize(deserializer)? {
        YesNo::Bool(b) => b,
        YesNo::Text(s) => s.trim().eq_ignore_ascii_case("yes"),
    })
}

/// Resize step settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResizeConfig {
    /// Largest width kept as-is, in pixels.
    pub max_width: u32,
    /// Largest height kept as-is, in pixels.
    pub max_height: u32,
}

impl Default for ResizeConfig {
    fn default() -> Self {
        let limits = ResizeLimits::default();
        Self {
            max_width: limits.max_width,
            max_height: limits.max_height,
        }
    }
}

/// Compress step settings beyond the JPEG quality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompressionConfig {
    /// PNG compression level, 0 (fastest) to 9 (smallest).
    pub png_level: u8,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            png_level: PngLevel::default().value(),
        }
    }
}

/// WebP encoding and what happens to the source after conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    /// Keep the pre-conversion file on disk next to its `.webp` sibling.
    pub keep_original: bool,
    /// Lossy WebP quality (0 = worst, 100 = best). Ignored when `lossless`.
    pub webp_quality: u32,
    /// Encode lossless WebP. Usually several times larger than lossy output.
    pub lossless: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            keep_original: true,
            webp_quality: 80,
            lossless: false,
        }
    }
}

/// Batch conversion settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatchConfig {
    /// Walk subdirectories (e.g. `2024/05/`) instead of only the upload root.
    pub recursive: bool,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PipelineConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if no `config.toml` exists in the directory.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PipelineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result.
pub fn load_config(root: &Path) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# webp-press Configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# JPEG quality used when uploads are recompressed (0 = worst, 100 = best).
compress_quality = 85

# Downsize uploads larger than [resize] before compressing them.
# Accepts true/false or the strings "yes"/"no".
resize_images = true

# Upload root scanned by the `batch` command.
uploads_dir = "uploads"

# ---------------------------------------------------------------------------
# Resize
# ---------------------------------------------------------------------------
[resize]
# Bounding box in pixels. Larger images are scaled down to fit, keeping
# their aspect ratio. TIFF files are never resized.
max_width = 2560
max_height = 2560

# ---------------------------------------------------------------------------
# Compression
# ---------------------------------------------------------------------------
[compression]
# PNG compression level (0 = fastest, 9 = smallest).
png_level = 7

# ---------------------------------------------------------------------------
# WebP conversion
# ---------------------------------------------------------------------------
[convert]
# Keep the compressed original next to its .webp sibling after an upload
# is converted. Set to false to delete it.
keep_original = true

# Lossy WebP quality (0 = worst, 100 = best).
webp_quality = 80

# Encode lossless WebP instead. Photographs come out several times larger
# than the lossy default, often larger than the source.
lossless = false

# ---------------------------------------------------------------------------
# Batch conversion
# ---------------------------------------------------------------------------
[batch]
# Only files directly inside uploads_dir are converted unless this is set.
# Hosts that store uploads in year/month folders need it enabled.
recursive = false
"##
}
