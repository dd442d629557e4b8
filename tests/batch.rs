//! End-to-end batch conversion of an upload directory.

use image::{ImageFormat, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use webp_press::batch::{BatchError, batch_convert};
use webp_press::config::{BatchConfig, PipelineConfig};
use webp_press::imaging::RustBackend;

fn write_image(path: &Path, format: ImageFormat, width: u32, height: u32) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    RgbImage::from_fn(width, height, |x, y| image::Rgb([x as u8, y as u8, 90]))
        .save_with_format(path, format)
        .unwrap();
}

fn names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}

#[test]
fn jpegs_get_webp_siblings_and_existing_webp_is_untouched() {
    let tmp = TempDir::new().unwrap();
    for name in ["a.jpg", "b.jpg", "c.jpg"] {
        write_image(&tmp.path().join(name), ImageFormat::Jpeg, 64, 48);
    }
    write_image(&tmp.path().join("d.webp"), ImageFormat::WebP, 10, 10);
    let existing = fs::read(tmp.path().join("d.webp")).unwrap();

    let report = batch_convert(&RustBackend::new(), &PipelineConfig::default(), tmp.path())
        .unwrap();

    assert_eq!(report.converted(), 3);
    assert_eq!(
        names(tmp.path()),
        vec!["a.jpg", "a.webp", "b.jpg", "b.webp", "c.jpg", "c.webp", "d.webp"]
    );
    assert_eq!(fs::read(tmp.path().join("d.webp")).unwrap(), existing);
}

#[test]
fn corrupt_jpeg_does_not_fail_the_run() {
    let tmp = TempDir::new().unwrap();
    write_image(&tmp.path().join("a.jpg"), ImageFormat::Jpeg, 64, 48);
    write_image(&tmp.path().join("c.jpg"), ImageFormat::Jpeg, 64, 48);
    // Valid JPEG header followed by nothing decodable.
    fs::write(
        tmp.path().join("b.jpg"),
        [0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'],
    )
    .unwrap();

    let report = batch_convert(&RustBackend::new(), &PipelineConfig::default(), tmp.path())
        .unwrap();

    assert_eq!(report.entries.len(), 3);
    assert_eq!(report.converted(), 2);
    assert_eq!(report.failed(), 1);
    assert!(!tmp.path().join("b.webp").exists());
}

#[test]
fn sources_are_not_modified() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("big.png");
    write_image(&path, ImageFormat::Png, 300, 200);
    let before = fs::read(&path).unwrap();

    batch_convert(&RustBackend::new(), &PipelineConfig::default(), tmp.path()).unwrap();

    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn nested_folders_need_recursive() {
    let tmp = TempDir::new().unwrap();
    write_image(&tmp.path().join("2024/05/deep.jpg"), ImageFormat::Jpeg, 16, 16);
    let recursive = PipelineConfig {
        batch: BatchConfig { recursive: true },
        ..PipelineConfig::default()
    };

    let flat = batch_convert(&RustBackend::new(), &PipelineConfig::default(), tmp.path())
        .unwrap();
    assert!(flat.entries.is_empty());

    let deep = batch_convert(&RustBackend::new(), &recursive, tmp.path()).unwrap();
    assert_eq!(deep.converted(), 1);
    assert!(tmp.path().join("2024/05/deep.webp").exists());
}

#[test]
fn missing_root_is_reported() {
    let tmp = TempDir::new().unwrap();

    let result = batch_convert(
        &RustBackend::new(),
        &PipelineConfig::default(),
        &tmp.path().join("missing"),
    );

    assert!(matches!(result, Err(BatchError::RootNotFound(_))));
}
