//! Conversion configuration.
//!
//! Every layout constant the emitters use lives here with its stock default.
//! A `folder2doc.toml` file (passed with `--config`, or found in the source
//! folder) overrides any subset of them.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [excel]
//! max_width = 400        # Largest image width in pixels
//! max_height = 300       # Largest image height in pixels
//! first_row = 2          # 0-based row of the first image (row 3 in Excel)
//! row_spacing = 3        # Rows between consecutive images
//! row_height = 200.0     # Height of each image row, in points
//! column_width = 40.0    # Width of column A, in characters
//!
//! [word]
//! max_width_in = 6.0     # Largest image width in inches
//! max_height_in = 8.0    # Largest image height in inches
//! default_width_in = 4.0 # Used when dimensions cannot be read
//! default_height_in = 3.0
//!
//! [pdf]
//! page_width = 595.0     # A4 in points
//! page_height = 842.0
//! max_width = 500.0      # Largest image size in points
//! max_height = 700.0
//! default_width = 400.0  # Used when dimensions cannot be read
//! default_height = 300.0
//! page_limit = 800.0     # Content must end above this y (from the top)
//! top_margin = 80.0      # Cursor after an overflow page break
//! section_start = 120.0  # Cursor below a section title
//! caption_allowance = 100.0
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse. Override just the values you want:
//!
//! ```toml
//! [pdf]
//! max_height = 500.0
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name looked up in the source folder when `--config` is not given.
pub const CONFIG_FILENAME: &str = "folder2doc.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// All layout settings, one table per output format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConvertConfig {
    pub excel: ExcelConfig,
    pub word: WordConfig,
    pub pdf: PdfConfig,
}

/// Spreadsheet layout: one image per anchor row in column A.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcelConfig {
    pub max_width: u32,
    pub max_height: u32,
    pub first_row: u32,
    pub row_spacing: u32,
    pub row_height: f64,
    pub column_width: f64,
}

impl Default for ExcelConfig {
    fn default() -> Self {
        Self {
            max_width: 400,
            max_height: 300,
            first_row: 2,
            row_spacing: 3,
            row_height: 200.0,
            column_width: 40.0,
        }
    }
}

/// Word layout, in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WordConfig {
    pub max_width_in: f64,
    pub max_height_in: f64,
    pub default_width_in: f64,
    pub default_height_in: f64,
}

impl Default for WordConfig {
    fn default() -> Self {
        Self {
            max_width_in: 6.0,
            max_height_in: 8.0,
            default_width_in: 4.0,
            default_height_in: 3.0,
        }
    }
}

/// PDF page geometry, in points, measured from the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PdfConfig {
    pub page_width: f64,
    pub page_height: f64,
    pub max_width: f64,
    pub max_height: f64,
    pub default_width: f64,
    pub default_height: f64,
    pub page_limit: f64,
    pub top_margin: f64,
    pub section_start: f64,
    pub caption_allowance: f64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page_width: 595.0,
            page_height: 842.0,
            max_width: 500.0,
            max_height: 700.0,
            default_width: 400.0,
            default_height: 300.0,
            page_limit: 800.0,
            top_margin: 80.0,
            section_start: 120.0,
            caption_allowance: 100.0,
        }
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{name} must be positive")))
    }
}

impl ConvertConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let excel = &self.excel;
        if excel.max_width == 0 || excel.max_height == 0 {
            return Err(ConfigError::Validation(
                "excel.max_width and excel.max_height must be non-zero".into(),
            ));
        }
        if excel.row_spacing == 0 {
            return Err(ConfigError::Validation(
                "excel.row_spacing must be at least 1".into(),
            ));
        }
        positive("excel.row_height", excel.row_height)?;
        positive("excel.column_width", excel.column_width)?;

        let word = &self.word;
        positive("word.max_width_in", word.max_width_in)?;
        positive("word.max_height_in", word.max_height_in)?;
        positive("word.default_width_in", word.default_width_in)?;
        positive("word.default_height_in", word.default_height_in)?;

        let pdf = &self.pdf;
        positive("pdf.page_width", pdf.page_width)?;
        positive("pdf.page_height", pdf.page_height)?;
        positive("pdf.max_width", pdf.max_width)?;
        positive("pdf.max_height", pdf.max_height)?;
        positive("pdf.default_width", pdf.default_width)?;
        positive("pdf.default_height", pdf.default_height)?;
        if pdf.caption_allowance < 0.0 {
            return Err(ConfigError::Validation(
                "pdf.caption_allowance must not be negative".into(),
            ));
        }
        if pdf.page_limit <= pdf.top_margin || pdf.page_limit <= pdf.section_start {
            return Err(ConfigError::Validation(
                "pdf.page_limit must be greater than pdf.top_margin and pdf.section_start".into(),
            ));
        }
        if pdf.page_limit > pdf.page_height {
            return Err(ConfigError::Validation(
                "pdf.page_limit must not exceed pdf.page_height".into(),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(ConvertConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse a config file into a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and
/// validate.
pub fn resolve_config(overlay: Option<toml::Value>) -> Result<ConvertConfig, ConfigError> {
    let base = stock_defaults_value();
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: ConvertConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective config.
///
/// An explicit path must exist. Without one, `folder2doc.toml` in the source
/// folder is used if present, else the stock defaults.
pub fn load_config(explicit: Option<&Path>, source: &Path) -> Result<ConvertConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => Some(load_raw_config(path)?),
        None => {
            let candidate = source.join(CONFIG_FILENAME);
            if candidate.is_file() {
                tracing::debug!("using config {}", candidate.display());
                Some(load_raw_config(&candidate)?)
            } else {
                None
            }
        }
    };
    resolve_config(overlay)
}

/// Returns a fully-commented stock config with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# folder2doc configuration
# ========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys are an error.
#
# Pass the file with --config, or save it as folder2doc.toml in the
# source folder.

# ---------------------------------------------------------------------------
# Excel workbook: one sheet per folder, images stacked in column A
# ---------------------------------------------------------------------------
[excel]
# Images larger than this (pixels) are shrunk to fit, keeping aspect ratio.
max_width = 400
max_height = 300

# 0-based row of the first image; row 0 holds the folder title.
first_row = 2

# Rows between one image anchor and the next.
row_spacing = 3

# Height of each image anchor row, in points.
row_height = 200.0

# Width of column A, in character units.
column_width = 40.0

# ---------------------------------------------------------------------------
# Word document: one heading per folder, centered images
# ---------------------------------------------------------------------------
[word]
# Bounding box for images, in inches.
max_width_in = 6.0
max_height_in = 8.0

# Size used when an image's dimensions cannot be read.
default_width_in = 4.0
default_height_in = 3.0

# ---------------------------------------------------------------------------
# PDF: cover page with contents, then one section per folder
# ---------------------------------------------------------------------------
[pdf]
# Page size in points (A4).
page_width = 595.0
page_height = 842.0

# Bounding box for images, in points.
max_width = 500.0
max_height = 700.0

# Size used when an image's dimensions cannot be read.
default_width = 400.0
default_height = 300.0

# A new page starts when cursor + image height + caption_allowance would
# pass page_limit. Distances are measured from the top of the page.
page_limit = 800.0
caption_allowance = 100.0

# Cursor position on a continuation page, and below a section title.
top_margin = 80.0
section_start = 120.0
"##
}
