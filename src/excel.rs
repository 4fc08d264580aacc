//! Spreadsheet output.
//!
//! One worksheet per subdirectory, named with [`unique_sheet_names`]:
//!
//! ```text
//! A1   <directory name>      bold 16 pt, centered
//! A3   image 1               row height 200 pt
//! A6   image 2
//! A9   image 3               ... every `row_spacing` rows
//! ```
//!
//! Images larger than the configured bounds, and formats the workbook
//! cannot embed (TIFF, WebP), are first written as PNG into a [`Scratch`]
//! directory. The scratch files are removed after the save, whether it
//! succeeded or not. An image that cannot be read is left out and does not
//! take up a row.

use crate::config::ExcelConfig;
use crate::convert::{EmitError, Emitter};
use crate::imaging::{ImageBackend, ResizeParams, fit_ratio};
use crate::naming::unique_sheet_names;
use crate::scan::{EmptyOutcome, ImageEntry, ScanResult, SourceSubdirectory};
use crate::scratch::Scratch;
use rust_xlsxwriter::{Format, FormatAlign, Image, Workbook, Worksheet};
use std::path::{Path, PathBuf};

/// Placeholder sheet name when the folder has nothing to show.
pub const EMPTY_SHEET_NAME: &str = "No Content";

/// Extensions the workbook embeds as-is.
const NATIVE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

pub struct ExcelEmitter<'a, B: ImageBackend> {
    backend: &'a B,
    config: &'a ExcelConfig,
    workbook: Workbook,
    scratch: Scratch,
    sheet_names: Vec<String>,
    sheet: Option<Worksheet>,
    row: u32,
}

impl<'a, B: ImageBackend> ExcelEmitter<'a, B> {
    pub fn new(backend: &'a B, config: &'a ExcelConfig) -> Result<Self, EmitError> {
        Ok(Self {
            backend,
            config,
            workbook: Workbook::new(),
            scratch: Scratch::new()?,
            sheet_names: Vec::new(),
            sheet: None,
            row: config.first_row,
        })
    }

    fn title_format() -> Format {
        Format::new()
            .set_bold()
            .set_font_size(16)
            .set_align(FormatAlign::Center)
    }

    /// New worksheet with the title row and column A sized for images.
    fn titled_sheet(&self, name: &str, title: &str) -> Result<Worksheet, EmitError> {
        let mut sheet = Worksheet::new();
        sheet.set_name(name)?;
        sheet.write_string_with_format(0, 0, title, &Self::title_format())?;
        sheet.set_column_width(0, self.config.column_width)?;
        Ok(sheet)
    }

    /// Path of the file to embed: the original, or a PNG copy in scratch.
    fn prepare(&mut self, image: &ImageEntry) -> Result<PathBuf, EmitError> {
        let dims = self.backend.identify(&image.path)?;
        let bounds = (self.config.max_width, self.config.max_height);
        let oversized = fit_ratio((dims.width, dims.height), bounds) < 1.0;
        let native = NATIVE_EXTENSIONS.contains(&image.extension.as_str());

        if !oversized && native {
            return Ok(image.path.clone());
        }

        let stem = image
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let output = self
            .scratch
            .path_for(&stem, "png")
            .ok_or_else(|| std::io::Error::other("scratch directory already released"))?;
        let resized = self.backend.resize(&ResizeParams {
            source: image.path.clone(),
            output: output.clone(),
            max_width: bounds.0,
            max_height: bounds.1,
        })?;
        tracing::debug!(
            "{} {}x{} -> {}x{}",
            image.file_name,
            dims.width,
            dims.height,
            resized.width,
            resized.height
        );
        Ok(output)
    }
}

impl<B: ImageBackend> Emitter for ExcelEmitter<'_, B> {
    fn write_empty(&mut self, outcome: EmptyOutcome) -> Result<(), EmitError> {
        let sheet = self.titled_sheet(EMPTY_SHEET_NAME, outcome.message())?;
        self.workbook.push_worksheet(sheet);
        Ok(())
    }

    fn begin(&mut self, scan: &ScanResult) -> Result<(), EmitError> {
        let names: Vec<&str> = scan
            .subdirectories
            .iter()
            .map(|d| d.name.as_str())
            .collect();
        self.sheet_names = unique_sheet_names(&names);
        for (raw, sheet) in names.iter().zip(&self.sheet_names) {
            if raw != sheet {
                tracing::debug!("sheet name {:?} -> {:?}", raw, sheet);
            }
        }
        Ok(())
    }

    fn begin_section(
        &mut self,
        index: usize,
        section: &SourceSubdirectory,
    ) -> Result<(), EmitError> {
        let name = self
            .sheet_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Sheet{}", index + 1));
        self.sheet = Some(self.titled_sheet(&name, &section.name)?);
        self.row = self.config.first_row;
        Ok(())
    }

    fn place_image(&mut self, _index: usize, image: &ImageEntry) -> Result<(), EmitError> {
        let path = self.prepare(image)?;
        let picture = Image::new(&path)?;
        let row = self.row;
        let row_height = self.config.row_height;
        if let Some(sheet) = self.sheet.as_mut() {
            sheet.insert_image(row, 0, &picture)?;
            sheet.set_row_height(row, row_height)?;
        }
        self.row += self.config.row_spacing;
        Ok(())
    }

    fn place_failed(
        &mut self,
        _index: usize,
        image: &ImageEntry,
        _reason: &str,
    ) -> Result<(), EmitError> {
        tracing::debug!("{} left out of the workbook", image.file_name);
        Ok(())
    }

    fn end_section(&mut self, _index: usize, _is_last: bool) -> Result<(), EmitError> {
        if let Some(sheet) = self.sheet.take() {
            self.workbook.push_worksheet(sheet);
        }
        Ok(())
    }

    fn save(mut self, path: &Path) -> Result<(), EmitError> {
        let result = self.workbook.save(path);
        self.scratch.release();
        Ok(result?)
    }
}
