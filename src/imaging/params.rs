//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. Emitters decide
//! the target size from their layout rules, then hand one of these to the
//! [`backend`](super::backend), which does the pixel work. Keeping the two
//! apart lets tests swap in a mock backend without touching layout logic.

use std::path::PathBuf;

/// Resize `source` to fit inside `max_width` x `max_height` and write a PNG.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub max_width: u32,
    pub max_height: u32,
}

/// Decode `source`, downscaled to fit inside the bounds if it is larger.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadParams {
    pub source: PathBuf,
    pub max_width: u32,
    pub max_height: u32,
}

impl LoadParams {
    pub fn new(source: impl Into<PathBuf>, bounds: (u32, u32)) -> Self {
        Self {
            source: source.into(),
            max_width: bounds.0,
            max_height: bounds.1,
        }
    }
}

/// Decoded 8-bit RGB samples, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbRaster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// An image re-encoded as PNG bytes, with its pixel size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngImage {
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_params_from_bounds() {
        let params = LoadParams::new("/a.png", (800, 600));
        assert_eq!(params.source, PathBuf::from("/a.png"));
        assert_eq!((params.max_width, params.max_height), (800, 600));
    }
}
