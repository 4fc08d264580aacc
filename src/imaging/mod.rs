//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `ImageReader::into_dimensions` |
//! | **Resize → PNG** | Lanczos3 + PNG encoder (spreadsheet temp files) |
//! | **Decode → RGB** | `image` decoders, alpha flattened (PDF) |
//! | **Re-encode → PNG bytes** | `image` decoders + PNG encoder (Word) |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for fit-within math (unit testable)
//! - **Parameters**: Data structures describing image operations
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
mod calculations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{fit_ratio, fit_within, fit_within_px, raster_bounds};
pub use params::{LoadParams, PngImage, ResizeParams, RgbRaster};
pub use rust_backend::RustBackend;
