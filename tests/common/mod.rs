//! Common test utilities and fixtures shared by the integration tests

#![allow(dead_code)]

pub mod fixtures;

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Once;

use image::{ImageFormat, Rgb, RgbImage};
use tracing::Level;

static INIT: Once = Once::new();

/// Initialize tracing for tests
pub fn init() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .init();
    });
}

/// A fresh, empty directory under cargo's scratch space for integration tests
pub fn test_dir(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(name);
    if dir.exists() {
        std::fs::remove_dir_all(&dir).expect("Failed to clear test directory");
    }
    std::fs::create_dir_all(&dir).expect("Failed to create test directory");
    dir
}

/// PNG bytes of a single-colour image
pub fn solid_png(width: u32, height: u32, color: [u8; 3]) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(width, height, Rgb(color))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("Failed to encode test image");
    bytes
}

/// Write a single-colour PNG to `path`
pub fn write_png(path: &Path, width: u32, height: u32, color: [u8; 3]) {
    std::fs::write(path, solid_png(width, height, color)).expect("Failed to write test image");
}

/// Bold sans font shipped with the test fixtures
pub fn fixture_font() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/common/fixtures/DejaVuSans-Bold.ttf")
}
