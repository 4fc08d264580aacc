//! Pure Rust image processing backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only, no full decode) |
//! | Decode (JPEG, PNG, GIF, BMP, TIFF, WebP) | `image` crate decoders |
//! | Resize | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → PNG | `image::codecs::png` via `write_to` / `save_with_format` |
//!
//! Formats are sniffed from the file contents, so a PNG saved with a `.jpg`
//! extension still decodes.

use super::backend::{BackendError, Dimensions, ImageBackend};
use super::calculations::fit_within_px;
use super::params::{LoadParams, PngImage, ResizeParams, RgbRaster};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, RgbImage};
use std::io::Cursor;
use std::path::Path;

/// Backend using the `image` crate ecosystem.
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

fn decode_error(path: &Path, err: impl std::fmt::Display) -> BackendError {
    BackendError::Decode {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<std::io::BufReader<std::fs::File>>, BackendError> {
    Ok(ImageReader::open(path)?.with_guessed_format()?)
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    open_reader(path)?
        .decode()
        .map_err(|e| decode_error(path, e))
}

/// Decode, then shrink to fit the bounds. Images already inside the bounds
/// are returned untouched.
fn load_fitted(params: &LoadParams) -> Result<DynamicImage, BackendError> {
    let img = load_image(&params.source)?;
    let (w, h) = fit_within_px(
        (img.width(), img.height()),
        (params.max_width, params.max_height),
    );
    if (w, h) == (img.width(), img.height()) {
        Ok(img)
    } else {
        Ok(img.resize_exact(w, h, FilterType::Lanczos3))
    }
}

/// Composite any alpha channel onto white. PDF image XObjects here carry no
/// soft mask, so transparent pixels would otherwise turn black.
fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    if !img.color().has_alpha() {
        return img.to_rgb8();
    }
    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (dst, src) in rgb.pixels_mut().zip(rgba.pixels()) {
        let alpha = src[3] as u32;
        for c in 0..3 {
            dst[c] = ((src[c] as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        }
    }
    rgb
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError> {
        let (width, height) = open_reader(path)?
            .into_dimensions()
            .map_err(|e| decode_error(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn resize(&self, params: &ResizeParams) -> Result<Dimensions, BackendError> {
        let img = load_fitted(&LoadParams {
            source: params.source.clone(),
            max_width: params.max_width,
            max_height: params.max_height,
        })?;
        img.save_with_format(&params.output, ImageFormat::Png)
            .map_err(|e| {
                BackendError::ProcessingFailed(format!(
                    "Failed to write {}: {}",
                    params.output.display(),
                    e
                ))
            })?;
        Ok(Dimensions {
            width: img.width(),
            height: img.height(),
        })
    }

    fn load_rgb(&self, params: &LoadParams) -> Result<RgbRaster, BackendError> {
        let img = load_fitted(params)?;
        let rgb = flatten_on_white(&img);
        Ok(RgbRaster {
            width: rgb.width(),
            height: rgb.height(),
            pixels: rgb.into_raw(),
        })
    }

    fn encode_png(&self, params: &LoadParams) -> Result<PngImage, BackendError> {
        let img = load_fitted(params)?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| BackendError::ProcessingFailed(format!("PNG encode failed: {e}")))?;
        Ok(PngImage {
            width: img.width(),
            height: img.height(),
            bytes,
        })
    }
}
