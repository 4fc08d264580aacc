//! PDF output.
//!
//! Layout positions are measured from the top-left corner of an A4 page and
//! flipped to PDF's bottom-left origin only when operators are written.
//!
//! ```text
//! cover     "<root> - Image Document"  (200, 100) 24 pt
//!           "Contents"                 (100, 200) 20 pt
//!           "1. <dir> (<n> images)"    (120, 250 + 25k) 14 pt
//! section   "<dir>"                    (100, 80) 22 pt, new page
//!           image                      centered, top at the cursor
//!           "Image <i>: <file>"        10 pt gray, 10 pt below the image
//! failure   "Failed to load image: <file>"  12 pt red
//! ```
//!
//! Page breaks inside a section follow [`PageCursor`]. Pictures are stored
//! as Flate-compressed RGB XObjects rasterized at 2 px per point.

use crate::config::PdfConfig;
use crate::convert::{EmitError, Emitter};
use crate::imaging::{ImageBackend, LoadParams, RgbRaster, fit_within, raster_bounds};
use crate::layout::{PageCursor, toc_lines};
use crate::scan::{EmptyOutcome, ImageEntry, ScanResult, SourceSubdirectory};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};
use std::io::Write;
use std::path::Path;

/// Raster pixels per displayed point.
pub const PX_PER_POINT: f64 = 2.0;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

type Rgb = (f32, f32, f32);
const BLACK: Rgb = (0.0, 0.0, 0.0);
const GRAY: Rgb = (0.4, 0.4, 0.4);
const RED: Rgb = (0.8, 0.0, 0.0);

/// Encode text for a WinAnsi font. Characters outside the encoding become `?`.
pub fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            0x20AC => 0x80,
            0x2018 => 0x91,
            0x2019 => 0x92,
            0x201C => 0x93,
            0x201D => 0x94,
            0x2013 => 0x96,
            0x2014 => 0x97,
            _ => b'?',
        })
        .collect()
}

/// Operators and picture resources for one page.
#[derive(Default)]
struct PageBuilder {
    operations: Vec<Operation>,
    xobjects: Dictionary,
}

pub struct PdfEmitter<'a, B: ImageBackend> {
    backend: &'a B,
    config: &'a PdfConfig,
    doc: Document,
    pages_id: ObjectId,
    fonts: Dictionary,
    pages: Vec<PageBuilder>,
    cursor: PageCursor<'a>,
    image_count: usize,
}

impl<'a, B: ImageBackend> PdfEmitter<'a, B> {
    pub fn new(backend: &'a B, config: &'a PdfConfig) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut fonts = Dictionary::new();
        for (name, base) in [(REGULAR, "Helvetica"), (BOLD, "Helvetica-Bold")] {
            let id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => base,
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(name, id);
        }

        Self {
            backend,
            config,
            doc,
            pages_id,
            fonts,
            pages: Vec::new(),
            cursor: PageCursor::for_section(config),
            image_count: 0,
        }
    }

    fn new_page(&mut self) {
        self.pages.push(PageBuilder::default());
    }

    fn current(&mut self) -> &mut PageBuilder {
        if self.pages.is_empty() {
            self.pages.push(PageBuilder::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Flip a top-based y to PDF user space.
    fn pdf_y(&self, y: f64) -> f32 {
        (self.config.page_height - y) as f32
    }

    /// One line of text with its baseline at (`x`, `y`).
    fn text(&mut self, x: f64, y: f64, size: f32, font: &str, color: Rgb, text: &str) {
        let y = self.pdf_y(y);
        let ops = vec![
            Operation::new("BT", vec![]),
            Operation::new(
                "rg",
                vec![
                    Object::Real(color.0),
                    Object::Real(color.1),
                    Object::Real(color.2),
                ],
            ),
            Operation::new("Tf", vec![font.into(), Object::Real(size)]),
            Operation::new("Td", vec![Object::Real(x as f32), Object::Real(y)]),
            Operation::new(
                "Tj",
                vec![Object::String(win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ];
        self.current().operations.extend(ops);
    }

    /// Add `raster` as an image XObject and draw it at `x`, `top`, scaled to
    /// `width` x `height` points.
    fn draw_raster(
        &mut self,
        raster: RgbRaster,
        x: f64,
        top: f64,
        width: f64,
        height: f64,
    ) -> Result<(), EmitError> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raster.pixels)?;
        let compressed = encoder.finish()?;

        let stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => raster.width as i64,
                "Height" => raster.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8i64,
                "Filter" => "FlateDecode",
            },
            compressed,
        );
        let image_id = self.doc.add_object(stream);
        self.image_count += 1;
        let name = format!("Im{}", self.image_count);

        let bottom = self.pdf_y(top + height);
        let page = self.current();
        page.xobjects.set(name.as_str(), image_id);
        page.operations.extend([
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(width as f32),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(height as f32),
                    Object::Real(x as f32),
                    Object::Real(bottom),
                ],
            ),
            Operation::new("Do", vec![name.as_str().into()]),
            Operation::new("Q", vec![]),
        ]);
        Ok(())
    }

    /// Displayed size in points, falling back to the configured default when
    /// the dimensions cannot be read.
    fn size_for(&self, image: &ImageEntry) -> (f64, f64) {
        match self.backend.identify(&image.path) {
            Ok(dims) => fit_within(dims.as_f64(), (self.config.max_width, self.config.max_height)),
            Err(e) => {
                tracing::warn!("cannot read size of {}: {}, using default", image.file_name, e);
                (self.config.default_width, self.config.default_height)
            }
        }
    }

    fn page_tree(&mut self) -> Result<(), EmitError> {
        if self.pages.is_empty() {
            self.new_page();
        }
        let media_box = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(self.config.page_width as f32),
            Object::Real(self.config.page_height as f32),
        ];

        let mut kids = Vec::with_capacity(self.pages.len());
        for page in std::mem::take(&mut self.pages) {
            let content = Content {
                operations: page.operations,
            };
            let content_id = self
                .doc
                .add_object(Stream::new(dictionary! {}, content.encode()?));
            let mut resources = dictionary! {
                "Font" => self.fonts.clone(),
            };
            if !page.xobjects.is_empty() {
                resources.set("XObject", page.xobjects);
            }
            let page_id = self.doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "Contents" => content_id,
                "Resources" => resources,
            });
            kids.push(Object::Reference(page_id));
        }

        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => media_box,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        Ok(())
    }
}

impl<'a, B: ImageBackend> Emitter for PdfEmitter<'a, B> {
    fn write_empty(&mut self, outcome: EmptyOutcome) -> Result<(), EmitError> {
        self.new_page();
        self.text(200.0, 100.0, 24.0, BOLD, BLACK, "Image Document");
        self.text(100.0, 200.0, 14.0, REGULAR, BLACK, outcome.message());
        Ok(())
    }

    fn begin(&mut self, scan: &ScanResult) -> Result<(), EmitError> {
        self.new_page();
        let title = format!("{} - Image Document", scan.root_name);
        self.text(200.0, 100.0, 24.0, BOLD, BLACK, &title);
        self.text(100.0, 200.0, 20.0, BOLD, BLACK, "Contents");

        let lines = toc_lines(scan.subdirectories.len(), self.config);
        let mut page = 0;
        for (i, (section, line)) in scan.subdirectories.iter().zip(lines).enumerate() {
            if line.page != page {
                self.new_page();
                page = line.page;
            }
            let entry = format!("{}. {} ({} images)", i + 1, section.name, section.images.len());
            self.text(120.0, line.y, 14.0, REGULAR, BLACK, &entry);
        }
        Ok(())
    }

    fn begin_section(
        &mut self,
        _index: usize,
        section: &SourceSubdirectory,
    ) -> Result<(), EmitError> {
        self.new_page();
        self.text(100.0, 80.0, 22.0, BOLD, BLACK, &section.name);
        self.cursor = PageCursor::for_section(self.config);
        Ok(())
    }

    fn place_image(&mut self, index: usize, image: &ImageEntry) -> Result<(), EmitError> {
        let (width, height) = self.size_for(image);
        let slot = self.cursor.reserve(height);
        if slot.new_page {
            tracing::debug!("page break before {}", image.file_name);
            self.new_page();
        }

        let raster = self.backend.load_rgb(&LoadParams::new(
            &image.path,
            raster_bounds((width, height), PX_PER_POINT),
        ))?;
        let x = (self.config.page_width - width) / 2.0;
        self.draw_raster(raster, x, slot.top, width, height)?;

        let caption_y = self.cursor.finish_image(height);
        let caption = format!("Image {}: {}", index + 1, image.file_name);
        self.text(x, caption_y, 10.0, REGULAR, GRAY, &caption);
        Ok(())
    }

    fn place_failed(
        &mut self,
        _index: usize,
        image: &ImageEntry,
        _reason: &str,
    ) -> Result<(), EmitError> {
        let y = self.cursor.annotate();
        let note = format!("Failed to load image: {}", image.file_name);
        self.text(100.0, y, 12.0, REGULAR, RED, &note);
        Ok(())
    }

    fn end_section(&mut self, _index: usize, _is_last: bool) -> Result<(), EmitError> {
        Ok(())
    }

    fn save(mut self, path: &Path) -> Result<(), EmitError> {
        self.page_tree()?;
        self.doc.save(path)?;
        Ok(())
    }
}
