//! The folder-to-document pipeline.
//!
//! ```text
//! scan(root) ──▶ ScanResult ──▶ convert(emitter) ──▶ emitter.save(output)
//!                                    │
//!                                    └── ConvertEvent ──▶ mpsc channel
//! ```
//!
//! [`convert`] walks the scan result in order and drives an [`Emitter`], the
//! format-specific half: the spreadsheet, Word and PDF writers each implement
//! it. The driver owns the failure policy so every format treats a bad image
//! the same way: log it, hand it to [`Emitter::place_failed`], and move on.
//! Only errors outside the per-image loop, and the final save, abort a run.
//!
//! Progress is reported as [`ConvertEvent`]s on an optional channel. The CLI
//! runs the conversion on a worker thread and prints the events from the
//! main thread.

use crate::config::ConvertConfig;
use crate::excel::ExcelEmitter;
use crate::imaging::{BackendError, ImageBackend, RustBackend};
use crate::pdf::PdfEmitter;
use crate::scan::{self, EmptyOutcome, ImageEntry, ScanError, ScanResult, SourceSubdirectory};
use crate::word::WordEmitter;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

/// Errors raised by an emitter while building or saving a document.
#[derive(Error, Debug)]
pub enum EmitError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] BackendError),
    #[error("Spreadsheet error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Word document error: {0}")]
    Docx(String),
}

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Scan(#[from] ScanError),
    #[error("Cannot build document: {0}")]
    Emit(#[from] EmitError),
    #[error("Cannot save {path}: {source}")]
    Save { path: PathBuf, source: EmitError },
}

/// The three document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Excel,
    Word,
    Pdf,
}

impl OutputFormat {
    /// Output file used when `-o` is not given.
    pub fn default_output(self) -> &'static str {
        match self {
            OutputFormat::Excel => "images.xlsx",
            OutputFormat::Word => "images.docx",
            OutputFormat::Pdf => "images.pdf",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OutputFormat::Excel => "Excel workbook",
            OutputFormat::Word => "Word document",
            OutputFormat::Pdf => "PDF",
        }
    }
}

/// Format-specific document construction.
///
/// Calls arrive in this order:
///
/// ```text
/// write_empty                          (nothing to place)
/// begin
///   begin_section  (per subdirectory)
///     place_image | place_failed       (per image)
///   end_section
/// save                                 (exactly once)
/// ```
///
/// Indexes are 0-based.
pub trait Emitter {
    /// Build the placeholder document stating why there is no content.
    fn write_empty(&mut self, outcome: EmptyOutcome) -> Result<(), EmitError>;

    /// Document-level front matter (title, contents list).
    fn begin(&mut self, scan: &ScanResult) -> Result<(), EmitError>;

    fn begin_section(&mut self, index: usize, section: &SourceSubdirectory)
    -> Result<(), EmitError>;

    /// Insert one image. An error here is recoverable: the driver logs it and
    /// calls [`Self::place_failed`] for the same image.
    fn place_image(&mut self, index: usize, image: &ImageEntry) -> Result<(), EmitError>;

    /// Record an image that could not be inserted.
    fn place_failed(
        &mut self,
        index: usize,
        image: &ImageEntry,
        reason: &str,
    ) -> Result<(), EmitError>;

    fn end_section(&mut self, index: usize, is_last: bool) -> Result<(), EmitError>;

    /// Write the finished document to `path`.
    fn save(self, path: &Path) -> Result<(), EmitError>;
}

/// Progress reported while a conversion runs.
#[derive(Debug, Clone, PartialEq)]
pub enum ConvertEvent {
    Started {
        sections: usize,
    },
    /// `index` is 1-based.
    SectionStarted {
        index: usize,
        total: usize,
        title: String,
        image_count: usize,
    },
    ImagePlaced {
        name: String,
    },
    ImageFailed {
        name: String,
        reason: String,
    },
    /// `index` is 1-based; `index / total` is the fraction complete.
    SectionFinished {
        index: usize,
        total: usize,
    },
    Saved {
        path: PathBuf,
        sections: usize,
        images: usize,
    },
}

/// Per-run context handed to the pipeline.
#[derive(Debug, Clone, Default)]
pub struct RunContext {
    pub events: Option<Sender<ConvertEvent>>,
}

impl RunContext {
    pub fn with_events(events: Sender<ConvertEvent>) -> Self {
        Self {
            events: Some(events),
        }
    }

    /// Send an event if anyone is listening. A dropped receiver is ignored.
    pub fn emit(&self, event: ConvertEvent) {
        if let Some(tx) = &self.events {
            tx.send(event).ok();
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedImage {
    pub path: PathBuf,
    pub reason: String,
}

/// What a finished conversion produced.
#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub output: PathBuf,
    pub sections: usize,
    pub images: usize,
    pub failed: Vec<FailedImage>,
    pub outcome: Option<EmptyOutcome>,
}

/// Drive `emitter` over `scan` and save the result to `output`.
pub fn convert<E: Emitter>(
    mut emitter: E,
    scan: &ScanResult,
    output: &Path,
    ctx: &RunContext,
) -> Result<ConvertReport, ConvertError> {
    let total = scan.subdirectories.len();
    let outcome = scan.empty_outcome();
    let mut images = 0;
    let mut failed = Vec::new();

    ctx.emit(ConvertEvent::Started { sections: total });

    if let Some(outcome) = outcome {
        tracing::warn!("{}", outcome.message());
        emitter.write_empty(outcome)?;
    } else {
        emitter.begin(scan)?;

        for (index, section) in scan.subdirectories.iter().enumerate() {
            tracing::info!(
                images = section.images.len(),
                "section {}/{}: {}",
                index + 1,
                total,
                section.name
            );
            ctx.emit(ConvertEvent::SectionStarted {
                index: index + 1,
                total,
                title: section.name.clone(),
                image_count: section.images.len(),
            });
            emitter.begin_section(index, section)?;

            for (i, image) in section.images.iter().enumerate() {
                match emitter.place_image(i, image) {
                    Ok(()) => {
                        tracing::debug!("placed {}", image.path.display());
                        images += 1;
                        ctx.emit(ConvertEvent::ImagePlaced {
                            name: image.file_name.clone(),
                        });
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        tracing::warn!("failed to place {}: {}", image.path.display(), reason);
                        emitter.place_failed(i, image, &reason)?;
                        ctx.emit(ConvertEvent::ImageFailed {
                            name: image.file_name.clone(),
                            reason: reason.clone(),
                        });
                        failed.push(FailedImage {
                            path: image.path.clone(),
                            reason,
                        });
                    }
                }
            }

            emitter.end_section(index, index + 1 == total)?;
            ctx.emit(ConvertEvent::SectionFinished {
                index: index + 1,
                total,
            });
        }
    }

    emitter.save(output).map_err(|source| ConvertError::Save {
        path: output.to_path_buf(),
        source,
    })?;
    tracing::info!("saved {}", output.display());

    ctx.emit(ConvertEvent::Saved {
        path: output.to_path_buf(),
        sections: total,
        images,
    });

    Ok(ConvertReport {
        output: output.to_path_buf(),
        sections: total,
        images,
        failed,
        outcome,
    })
}

/// Scan `source` and write it as `format` to `output`.
pub fn convert_folder(
    format: OutputFormat,
    source: &Path,
    output: &Path,
    config: &ConvertConfig,
    ctx: &RunContext,
) -> Result<ConvertReport, ConvertError> {
    let backend = RustBackend::new();
    convert_folder_with_backend(&backend, format, source, output, config, ctx)
}

/// [`convert_folder`] with a specific image backend (allows testing with mock).
pub fn convert_folder_with_backend(
    backend: &impl ImageBackend,
    format: OutputFormat,
    source: &Path,
    output: &Path,
    config: &ConvertConfig,
    ctx: &RunContext,
) -> Result<ConvertReport, ConvertError> {
    let scan = scan::scan(source)?;
    tracing::info!(
        sections = scan.subdirectories.len(),
        images = scan.image_count(),
        "writing {} to {}",
        format.label(),
        output.display()
    );

    match format {
        OutputFormat::Excel => {
            let emitter = ExcelEmitter::new(backend, &config.excel)?;
            convert(emitter, &scan, output, ctx)
        }
        OutputFormat::Word => convert(WordEmitter::new(backend, &config.word), &scan, output, ctx),
        OutputFormat::Pdf => convert(PdfEmitter::new(backend, &config.pdf), &scan, output, ctx),
    }
}
