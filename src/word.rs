//! Word document output.
//!
//! ```text
//! <root> - Image Document          Title, centered
//! Contents                         centered, 22 pt
//! 1. <dir>
//! 2. <dir>
//! ── page break ──
//! <dir>                            Heading 1
//!        [image]                   centered paragraph
//!                                  empty spacing paragraph
//! ── page break ──                 between sections, not after the last
//! ```
//!
//! Pixel sizes are converted to inches at 96 DPI and fitted into the
//! configured box. The picture itself is re-encoded as PNG at 150 px per
//! displayed inch, which keeps documents small when sources are huge.

use crate::config::WordConfig;
use crate::convert::{EmitError, Emitter};
use crate::imaging::{ImageBackend, LoadParams, fit_within, raster_bounds};
use crate::scan::{EmptyOutcome, ImageEntry, ScanResult, SourceSubdirectory};
use docx_rs::{AlignmentType, BreakType, Docx, Paragraph, Pic, Run, Style, StyleType};
use std::fs::File;
use std::path::Path;

/// Source pixels per inch when sizing pictures.
pub const SOURCE_DPI: f64 = 96.0;
/// Raster resolution of embedded pictures.
pub const EMBED_PX_PER_INCH: f64 = 150.0;
const EMU_PER_INCH: f64 = 914_400.0;

/// Font sizes in half-points.
const TITLE_SIZE: usize = 52;
const HEADING_SIZE: usize = 44;
const ERROR_SIZE: usize = 20;

/// Displayed size in inches for an image of `pixels`.
pub fn display_size(pixels: (u32, u32), config: &WordConfig) -> (f64, f64) {
    let inches = (
        pixels.0 as f64 / SOURCE_DPI,
        pixels.1 as f64 / SOURCE_DPI,
    );
    fit_within(inches, (config.max_width_in, config.max_height_in))
}

fn emu(inches: f64) -> u32 {
    (inches * EMU_PER_INCH).round() as u32
}

fn text_paragraph(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn page_break() -> Paragraph {
    Paragraph::new().add_run(Run::new().add_break(BreakType::Page))
}

pub struct WordEmitter<'a, B: ImageBackend> {
    backend: &'a B,
    config: &'a WordConfig,
    paragraphs: Vec<Paragraph>,
}

impl<'a, B: ImageBackend> WordEmitter<'a, B> {
    pub fn new(backend: &'a B, config: &'a WordConfig) -> Self {
        Self {
            backend,
            config,
            paragraphs: Vec::new(),
        }
    }

    fn title(&mut self, text: &str) {
        self.paragraphs.push(
            Paragraph::new()
                .add_run(Run::new().add_text(text).size(TITLE_SIZE))
                .style("Title")
                .align(AlignmentType::Center),
        );
    }

    fn heading(&mut self, text: &str, align: AlignmentType) {
        self.paragraphs.push(
            Paragraph::new()
                .add_run(Run::new().add_text(text).size(HEADING_SIZE))
                .style("Heading1")
                .align(align),
        );
    }

    /// Displayed size, falling back to the configured default when the
    /// dimensions cannot be read.
    fn size_for(&self, image: &ImageEntry) -> (f64, f64) {
        match self.backend.identify(&image.path) {
            Ok(dims) => display_size((dims.width, dims.height), self.config),
            Err(e) => {
                tracing::warn!("cannot read size of {}: {}, using default", image.file_name, e);
                (self.config.default_width_in, self.config.default_height_in)
            }
        }
    }
}

impl<B: ImageBackend> Emitter for WordEmitter<'_, B> {
    fn write_empty(&mut self, outcome: EmptyOutcome) -> Result<(), EmitError> {
        self.title("Image Document");
        self.paragraphs.push(text_paragraph(outcome.message()));
        Ok(())
    }

    fn begin(&mut self, scan: &ScanResult) -> Result<(), EmitError> {
        self.title(&format!("{} - Image Document", scan.root_name));
        self.heading("Contents", AlignmentType::Center);
        for (i, section) in scan.subdirectories.iter().enumerate() {
            self.paragraphs
                .push(text_paragraph(&format!("{}. {}", i + 1, section.name)));
        }
        self.paragraphs.push(page_break());
        Ok(())
    }

    fn begin_section(
        &mut self,
        _index: usize,
        section: &SourceSubdirectory,
    ) -> Result<(), EmitError> {
        self.heading(&section.name, AlignmentType::Left);
        Ok(())
    }

    fn place_image(&mut self, _index: usize, image: &ImageEntry) -> Result<(), EmitError> {
        let (width_in, height_in) = self.size_for(image);
        let png = self.backend.encode_png(&LoadParams::new(
            &image.path,
            raster_bounds((width_in, height_in), EMBED_PX_PER_INCH),
        ))?;
        let pic = Pic::new_with_dimensions(png.bytes, png.width, png.height)
            .size(emu(width_in), emu(height_in));

        self.paragraphs.push(
            Paragraph::new()
                .add_run(Run::new().add_image(pic))
                .align(AlignmentType::Center),
        );
        self.paragraphs.push(Paragraph::new());
        Ok(())
    }

    fn place_failed(
        &mut self,
        _index: usize,
        image: &ImageEntry,
        reason: &str,
    ) -> Result<(), EmitError> {
        self.paragraphs.push(
            Paragraph::new().add_run(
                Run::new()
                    .add_text(format!(
                        "Failed to load image: {} (error: {})",
                        image.file_name, reason
                    ))
                    .color("FF0000")
                    .size(ERROR_SIZE),
            ),
        );
        Ok(())
    }

    fn end_section(&mut self, _index: usize, is_last: bool) -> Result<(), EmitError> {
        if !is_last {
            self.paragraphs.push(page_break());
        }
        Ok(())
    }

    fn save(self, path: &Path) -> Result<(), EmitError> {
        let mut docx = Docx::new()
            .add_style(
                Style::new("Title", StyleType::Paragraph)
                    .name("Title")
                    .size(TITLE_SIZE)
                    .bold(),
            )
            .add_style(
                Style::new("Heading1", StyleType::Paragraph)
                    .name("Heading 1")
                    .size(HEADING_SIZE)
                    .bold(),
            );
        for paragraph in self.paragraphs {
            docx = docx.add_paragraph(paragraph);
        }

        let file = File::create(path)?;
        docx.build()
            .pack(file)
            .map_err(|e| EmitError::Docx(e.to_string()))
    }
}
