//! # folder2doc
//!
//! Turns a folder of image subfolders into a document: an Excel workbook
//! with one sheet per subfolder, a Word document with one heading per
//! subfolder, or a paginated PDF with a contents page. A second command pulls
//! the embedded images back out of a PDF.
//!
//! # Architecture: One-Way Pipeline
//!
//! ```text
//! 1. Scan     photos/     →  ScanResult   (immediate subfolders + images, sorted)
//! 2. Layout   ScanResult  →  placements   (fit-within scaling, page cursor)
//! 3. Emit     placements  →  images.xlsx | images.docx | images.pdf
//! ```
//!
//! Data flows one way. The emitters share a single driver
//! ([`convert::convert`]) that owns ordering, progress events and the
//! per-image failure policy, so each format only decides how to draw.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Lists qualifying subdirectories and their images |
//! | [`imaging`] | Image backend trait, `image`-crate implementation, fit-within math |
//! | [`layout`] | PDF page cursor and overflow rule, contents-page line positions |
//! | [`naming`] | Spreadsheet sheet-name sanitizing and de-duplication |
//! | [`convert`] | [`convert::Emitter`] trait, pipeline driver, progress events |
//! | [`excel`] | Workbook emitter (`rust_xlsxwriter`) |
//! | [`word`] | Word emitter (`docx-rs`) |
//! | [`pdf`] | PDF emitter (`lopdf`) |
//! | [`extract`] | PDF image extraction (`lopdf`) |
//! | [`scratch`] | Temporary resized images, removed after the save |
//! | [`config`] | Sparse `folder2doc.toml` over stock layout defaults |
//! | [`logging`] | Per-run `tracing` subscriber |
//! | [`output`] | CLI output formatting |
//!
//! # Failure Policy
//!
//! | Failure | Effect |
//! |---------|--------|
//! | Source missing or unreadable | Fatal, non-zero exit |
//! | Subdirectory unreadable | Logged, subdirectory skipped |
//! | Image unreadable | Logged; annotated (Word, PDF) or left out (Excel) |
//! | No qualifying subdirectories | Placeholder document stating why, success |
//! | Document save fails | Fatal, non-zero exit |

pub mod config;
pub mod convert;
pub mod excel;
pub mod extract;
pub mod imaging;
pub mod layout;
pub mod logging;
pub mod naming;
pub mod output;
pub mod pdf;
pub mod scan;
pub mod scratch;
pub mod word;

#[cfg(test)]
pub(crate) mod test_helpers;
