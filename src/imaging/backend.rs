//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the operations every emitter needs:
//! identify, resize-to-file, decode-to-RGB and re-encode-to-PNG.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate. Tests use the mock in this module's `tests` submodule.

use super::params::{LoadParams, PngImage, ResizeParams, RgbRaster};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot decode {path}: {reason}")]
    Decode { path: String, reason: String },
    #[error("Processing failed: {0}")]
    ProcessingFailed(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_f64(self) -> (f64, f64) {
        (self.width as f64, self.height as f64)
    }
}

/// Trait for image processing backends.
pub trait ImageBackend {
    /// Intrinsic pixel size, read from the header where possible.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Downscale into the bounds and write the result as PNG.
    fn resize(&self, params: &ResizeParams) -> Result<Dimensions, BackendError>;

    /// Decode to 8-bit RGB, downscaled into the bounds if needed.
    fn load_rgb(&self, params: &LoadParams) -> Result<RgbRaster, BackendError>;

    /// Decode and re-encode as PNG, downscaled into the bounds if needed.
    fn encode_png(&self, params: &LoadParams) -> Result<PngImage, BackendError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::calculations::fit_within_px;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Mock backend keyed by file name. Files without an entry fail to
    /// decode, which is how tests model corrupt images.
    #[derive(Default)]
    pub struct MockBackend {
        pub dimensions: HashMap<String, Dimensions>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Identify(String),
        Resize {
            source: String,
            output: String,
            max_width: u32,
            max_height: u32,
        },
        LoadRgb {
            source: String,
            max_width: u32,
            max_height: u32,
        },
        EncodePng {
            source: String,
            max_width: u32,
            max_height: u32,
        },
    }

    fn file_name(path: &Path) -> String {
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    impl MockBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_dimensions(entries: &[(&str, u32, u32)]) -> Self {
            Self {
                dimensions: entries
                    .iter()
                    .map(|&(name, width, height)| (name.to_string(), Dimensions { width, height }))
                    .collect(),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        fn lookup(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.dimensions
                .get(&file_name(path))
                .copied()
                .ok_or_else(|| BackendError::Decode {
                    path: path.display().to_string(),
                    reason: "no mock dimensions".to_string(),
                })
        }
    }

    impl ImageBackend for MockBackend {
        fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Identify(file_name(path)));
            self.lookup(path)
        }

        fn resize(&self, params: &ResizeParams) -> Result<Dimensions, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::Resize {
                source: file_name(&params.source),
                output: params.output.to_string_lossy().to_string(),
                max_width: params.max_width,
                max_height: params.max_height,
            });
            let dims = self.lookup(&params.source)?;
            let (width, height) = fit_within_px(
                (dims.width, dims.height),
                (params.max_width, params.max_height),
            );
            Ok(Dimensions { width, height })
        }

        fn load_rgb(&self, params: &LoadParams) -> Result<RgbRaster, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::LoadRgb {
                source: file_name(&params.source),
                max_width: params.max_width,
                max_height: params.max_height,
            });
            let dims = self.lookup(&params.source)?;
            let (width, height) = fit_within_px(
                (dims.width, dims.height),
                (params.max_width, params.max_height),
            );
            Ok(RgbRaster {
                width,
                height,
                pixels: vec![128; (width * height * 3) as usize],
            })
        }

        fn encode_png(&self, params: &LoadParams) -> Result<PngImage, BackendError> {
            self.operations.lock().unwrap().push(RecordedOp::EncodePng {
                source: file_name(&params.source),
                max_width: params.max_width,
                max_height: params.max_height,
            });
            let dims = self.lookup(&params.source)?;
            let (width, height) = fit_within_px(
                (dims.width, dims.height),
                (params.max_width, params.max_height),
            );
            Ok(PngImage {
                width,
                height,
                bytes: b"\x89PNG mock".to_vec(),
            })
        }
    }

    #[test]
    fn mock_records_identify() {
        let backend = MockBackend::with_dimensions(&[("a.jpg", 800, 600)]);

        let result = backend.identify(Path::new("/test/a.jpg")).unwrap();
        assert_eq!(result, Dimensions { width: 800, height: 600 });

        let ops = backend.get_operations();
        assert_eq!(ops, vec![RecordedOp::Identify("a.jpg".to_string())]);
    }

    #[test]
    fn mock_unknown_file_fails_to_decode() {
        let backend = MockBackend::new();
        let result = backend.identify(Path::new("/test/broken.png"));
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }

    #[test]
    fn mock_load_rgb_fits_bounds() {
        let backend = MockBackend::with_dimensions(&[("big.png", 2000, 1000)]);
        let raster = backend
            .load_rgb(&LoadParams::new("/x/big.png", (1000, 1400)))
            .unwrap();
        assert_eq!((raster.width, raster.height), (1000, 500));
        assert_eq!(raster.pixels.len(), 1000 * 500 * 3);
    }
}
