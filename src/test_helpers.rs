//! Shared test utilities for the folder2doc test suite.
//!
//! Builds source folders on disk (fake files for scan-only tests, real
//! encoded images for emitter tests) and extracts names from scan results.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = TempDir::new().unwrap();
//! build_folder(tmp.path(), &[
//!     ("Beach", &[("a.png", 800, 600), ("b.jpg", 300, 900)]),
//!     ("City", &[("c.png", 50, 50)]),
//! ]);
//! let result = scan(tmp.path()).unwrap();
//! assert_eq!(section_names(&result), vec!["Beach", "City"]);
//! ```

use std::path::Path;

use crate::scan::{ScanResult, SourceSubdirectory};

// =========================================================================
// Fixture setup
// =========================================================================

/// Write placeholder bytes with an image extension. Enough for the scanner,
/// which only looks at names; any decoder rejects it.
pub fn write_fake_image(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"fake image").unwrap();
}

/// Write a real, decodable image. The format follows the extension.
pub fn write_image(path: &Path, width: u32, height: u32) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    image::RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 120])
    })
    .save(path)
    .unwrap();
}

/// Lay out `root/<dir>/<file>` with real images of the given sizes.
pub fn build_folder(root: &Path, dirs: &[(&str, &[(&str, u32, u32)])]) {
    for (dir, images) in dirs {
        std::fs::create_dir_all(root.join(dir)).unwrap();
        for &(name, w, h) in images.iter() {
            write_image(&root.join(dir).join(name), w, h);
        }
    }
}

// =========================================================================
// Bulk extractors
// =========================================================================

/// Qualifying subdirectory names in scan order.
pub fn section_names(result: &ScanResult) -> Vec<&str> {
    result
        .subdirectories
        .iter()
        .map(|d| d.name.as_str())
        .collect()
}

/// Image file names in directory order.
pub fn image_names(dir: &SourceSubdirectory) -> Vec<&str> {
    dir.images.iter().map(|i| i.file_name.as_str()).collect()
}
