//! Image extraction from PDF files.
//!
//! Every image XObject referenced from a page's resources (inherited
//! resources included) is written to the output directory as
//! `page_<N>_img_<M>.<ext>`, with N the 1-based page number and M the
//! 1-based position of the image among that page's XObjects.
//!
//! | Last filter | Written as |
//! |---|---|
//! | `DCTDecode` | `.jpg`, stream bytes as stored |
//! | `JPXDecode` | `.jpx`, stream bytes as stored |
//! | `JBIG2Decode` | `.jb2`, stream bytes as stored |
//! | none, `FlateDecode`, `LZWDecode` | `.png`, re-encoded from 8-bit Gray, RGB or CMYK samples |
//!
//! Earlier `FlateDecode` layers in a filter chain are inflated first, so a
//! `[/FlateDecode /DCTDecode]` stream is written as plain JPEG. Anything else
//! (other bit depths, indexed color, CCITT, other chained filters) is logged
//! and skipped, as is an image whose file cannot be written. A run that
//! writes nothing is an error.

use flate2::read::ZlibDecoder;
use image::{GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Output directory used when `-o` is not given.
pub const DEFAULT_OUTPUT_DIR: &str = "extracted_images";

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("PDF file not found: {0}")]
    NotFound(PathBuf),
    #[error("Cannot read PDF {path}: {source}")]
    Load { path: PathBuf, source: lopdf::Error },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("No images found in {0}")]
    NoImages(PathBuf),
}

/// One file written by [`extract`].
#[derive(Debug, Clone)]
pub struct ExtractedImage {
    pub page: u32,
    pub index: usize,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ExtractReport {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub pages: usize,
    pub images: Vec<ExtractedImage>,
    /// Image XObjects that could not be written.
    pub skipped: usize,
}

/// Encoded form of one image, ready to write.
#[derive(Debug, PartialEq)]
enum Payload {
    /// Stream bytes copied as-is, with the extension for the codec.
    Raw(&'static str, Vec<u8>),
    /// PNG re-encoded from decoded samples.
    Png(Vec<u8>),
}

impl Payload {
    fn extension(&self) -> &'static str {
        match self {
            Payload::Raw(ext, _) => *ext,
            Payload::Png(_) => "png",
        }
    }

    fn bytes(&self) -> &[u8] {
        match self {
            Payload::Raw(_, bytes) | Payload::Png(bytes) => bytes,
        }
    }
}

/// Per-image failure, logged and counted but not fatal.
#[derive(Error, Debug)]
enum ImageError {
    #[error("unsupported encoding: {0}")]
    Unsupported(String),
    #[error("{0}")]
    Pdf(#[from] lopdf::Error),
    #[error("{0}")]
    Image(#[from] image::ImageError),
    #[error("{0}")]
    Io(#[from] std::io::Error),
}

pub fn extract(pdf: &Path, output_dir: &Path) -> Result<ExtractReport, ExtractError> {
    if !pdf.is_file() {
        return Err(ExtractError::NotFound(pdf.to_path_buf()));
    }
    let is_pdf = pdf
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
    if !is_pdf {
        tracing::warn!("{} may not be a PDF file", pdf.display());
    }

    let doc = Document::load(pdf).map_err(|source| ExtractError::Load {
        path: pdf.to_path_buf(),
        source,
    })?;
    let pages = doc.get_pages();
    tracing::info!(pages = pages.len(), "reading {}", pdf.display());

    fs::create_dir_all(output_dir)?;

    let mut images = Vec::new();
    let mut skipped = 0;

    for (&page_number, &page_id) in &pages {
        let xobjects = page_images(&doc, page_id);
        if !xobjects.is_empty() {
            tracing::info!("page {}: {} images", page_number, xobjects.len());
        }

        for (i, stream) in xobjects.into_iter().enumerate() {
            let index = i + 1;
            match encode(&doc, stream) {
                Ok(payload) => {
                    let name = format!("page_{}_img_{}.{}", page_number, index, payload.extension());
                    let path = output_dir.join(&name);
                    if let Err(e) = fs::write(&path, payload.bytes()) {
                        tracing::error!("cannot write {}: {}, skipping", path.display(), e);
                        skipped += 1;
                        continue;
                    }
                    tracing::debug!("wrote {}", path.display());
                    images.push(ExtractedImage {
                        page: page_number,
                        index,
                        path,
                    });
                }
                Err(e) => {
                    tracing::warn!("page {} image {}: {}, skipping", page_number, index, e);
                    skipped += 1;
                }
            }
        }
    }

    if images.is_empty() {
        return Err(ExtractError::NoImages(pdf.to_path_buf()));
    }

    Ok(ExtractReport {
        source: pdf.to_path_buf(),
        output_dir: output_dir.to_path_buf(),
        pages: pages.len(),
        images,
        skipped,
    })
}

/// Follow references until a direct object is reached.
fn resolve<'a>(doc: &'a Document, mut object: &'a Object) -> Option<&'a Object> {
    for _ in 0..32 {
        match object {
            Object::Reference(id) => object = doc.get_object(*id).ok()?,
            direct => return Some(direct),
        }
    }
    None
}

fn dict_entry<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    resolve(doc, dict.get(key).ok()?)
}

/// Resources of a page, walking up the page tree for inherited ones.
fn page_resources(doc: &Document, page_id: ObjectId) -> Option<&Dictionary> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..32 {
        if let Some(Object::Dictionary(resources)) = dict_entry(doc, node, b"Resources") {
            return Some(resources);
        }
        match node.get(b"Parent").ok()? {
            Object::Reference(parent) => node = doc.get_dictionary(*parent).ok()?,
            _ => return None,
        }
    }
    None
}

/// Image XObject streams of a page, in resource dictionary order.
fn page_images(doc: &Document, page_id: ObjectId) -> Vec<&Stream> {
    let Some(resources) = page_resources(doc, page_id) else {
        return Vec::new();
    };
    let Some(Object::Dictionary(xobjects)) = dict_entry(doc, resources, b"XObject") else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(_, value)| match resolve(doc, value)? {
            Object::Stream(stream) => Some(stream),
            _ => None,
        })
        .filter(|stream| {
            matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
        })
        .collect()
}

/// Filters of the stream in decoding order. The last one names the codec.
fn filters(stream: &Stream) -> Vec<Vec<u8>> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => vec![name.clone()],
        Ok(Object::Array(filters)) => filters
            .iter()
            .filter_map(|f| f.as_name().ok().map(<[u8]>::to_vec))
            .collect(),
        _ => Vec::new(),
    }
}

/// Undo a chain of `FlateDecode` layers.
fn inflate_all(data: &[u8], filters: &[Vec<u8>]) -> Result<Vec<u8>, ImageError> {
    let mut out = data.to_vec();
    for filter in filters {
        if filter.as_slice() != b"FlateDecode" {
            return Err(ImageError::Unsupported(format!(
                "filter chain with {}",
                String::from_utf8_lossy(filter)
            )));
        }
        let mut decoded = Vec::new();
        ZlibDecoder::new(out.as_slice()).read_to_end(&mut decoded)?;
        out = decoded;
    }
    Ok(out)
}

fn int_entry(stream: &Stream, key: &[u8]) -> Option<i64> {
    stream.dict.get(key).ok()?.as_i64().ok()
}

/// Component count of a device or ICC-based color space.
fn color_components(doc: &Document, stream: &Stream) -> Option<u8> {
    match dict_entry(doc, &stream.dict, b"ColorSpace")? {
        Object::Name(name) => match name.as_slice() {
            b"DeviceGray" | b"G" => Some(1),
            b"DeviceRGB" | b"RGB" => Some(3),
            b"DeviceCMYK" | b"CMYK" => Some(4),
            _ => None,
        },
        // [/ICCBased <stream>]: the profile stream carries /N
        Object::Array(parts) if parts.first()?.as_name().ok()? == b"ICCBased" => {
            match resolve(doc, parts.get(1)?)? {
                Object::Stream(icc) => icc.dict.get(b"N").ok()?.as_i64().ok().map(|n| n as u8),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Decide how to write one image stream.
fn encode(doc: &Document, stream: &Stream) -> Result<Payload, ImageError> {
    let filters = filters(stream);
    let (last, leading) = match filters.split_last() {
        Some((last, leading)) => (Some(last.as_slice()), leading),
        None => (None, &[][..]),
    };
    let raw_extension = match last {
        Some(b"DCTDecode") => Some("jpg"),
        Some(b"JPXDecode") => Some("jpx"),
        Some(b"JBIG2Decode") => Some("jb2"),
        _ => None,
    };
    if let Some(ext) = raw_extension {
        return Ok(Payload::Raw(ext, inflate_all(&stream.content, leading)?));
    }
    match last {
        None | Some(b"FlateDecode") | Some(b"LZWDecode") => {}
        Some(other) => {
            return Err(ImageError::Unsupported(
                String::from_utf8_lossy(other).into_owned(),
            ));
        }
    }

    let width = int_entry(stream, b"Width").unwrap_or(0);
    let height = int_entry(stream, b"Height").unwrap_or(0);
    let bits = int_entry(stream, b"BitsPerComponent").unwrap_or(8);
    let components = color_components(doc, stream);
    let (Ok(width), Ok(height)) = (u32::try_from(width), u32::try_from(height)) else {
        return Err(ImageError::Unsupported("invalid size".into()));
    };
    if width == 0 || height == 0 || bits != 8 {
        return Err(ImageError::Unsupported(format!(
            "{width}x{height} at {bits} bits per component"
        )));
    }
    let Some(components) = components else {
        return Err(ImageError::Unsupported("color space".into()));
    };

    let samples = match last {
        None => stream.content.clone(),
        Some(_) if leading.is_empty() => stream.decompressed_content()?,
        Some(_) => inflate_all(&stream.content, &filters)?,
    };
    samples_to_png(width, height, components, samples)
}

/// Re-encode 8-bit samples as PNG.
fn samples_to_png(
    width: u32,
    height: u32,
    components: u8,
    mut samples: Vec<u8>,
) -> Result<Payload, ImageError> {
    let expected = width as usize * height as usize * components as usize;
    if samples.len() < expected {
        return Err(ImageError::Unsupported(format!(
            "{} bytes of samples, expected {}",
            samples.len(),
            expected
        )));
    }
    samples.truncate(expected);

    let mut png = std::io::Cursor::new(Vec::new());
    match components {
        1 => GrayImage::from_raw(width, height, samples)
            .ok_or_else(|| ImageError::Unsupported("sample buffer".into()))?
            .write_to(&mut png, ImageFormat::Png)?,
        3 => RgbImage::from_raw(width, height, samples)
            .ok_or_else(|| ImageError::Unsupported("sample buffer".into()))?
            .write_to(&mut png, ImageFormat::Png)?,
        4 => RgbImage::from_raw(width, height, cmyk_to_rgb(&samples))
            .ok_or_else(|| ImageError::Unsupported("sample buffer".into()))?
            .write_to(&mut png, ImageFormat::Png)?,
        n => return Err(ImageError::Unsupported(format!("{n} color components"))),
    }
    Ok(Payload::Png(png.into_inner()))
}

/// Naive CMYK → RGB, no color management.
fn cmyk_to_rgb(samples: &[u8]) -> Vec<u8> {
    samples
        .chunks_exact(4)
        .flat_map(|px| {
            let k = 255 - px[3] as u32;
            [
                ((255 - px[0] as u32) * k / 255) as u8,
                ((255 - px[1] as u32) * k / 255) as u8,
                ((255 - px[2] as u32) * k / 255) as u8,
            ]
        })
        .collect()
}
