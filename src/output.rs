//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Scan
//!
//! ```text
//! Photos: 2 sections, 3 images
//! 001 Beach (2 images)
//!     Source: Beach/
//!     001 a.jpg
//!     002 b.png
//! 002 City (1 image)
//!     Source: City/
//!     001 c.png
//! ```
//!
//! ## Convert progress
//!
//! ```text
//! Converting 2 sections
//! 001 Beach (2 images)
//!     a.jpg
//!     b.png: failed (Cannot decode ...)
//!     [ 50%] 1/2 sections
//! 002 City (1 image)
//!     c.png
//!     [100%] 2/2 sections
//! Saved images.pdf (2 sections, 2 images)
//! ```
//!
//! ## Extract
//!
//! ```text
//! page_1_img_1.jpg
//! page_3_img_1.png
//! Extracted 2 images from 5 pages → extracted_images
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions do no I/O.

use crate::convert::{ConvertEvent, ConvertReport};
use crate::extract::ExtractReport;
use crate::scan::ScanResult;

// ============================================================================
// Shared helpers
// ============================================================================

/// `N image` / `N images`.
fn images(count: usize) -> String {
    if count == 1 {
        "1 image".to_string()
    } else {
        format!("{count} images")
    }
}

/// Header line: zero-padded position, title, image count.
fn entity_header(position: usize, title: &str, image_count: usize) -> String {
    format!("{:03} {} ({})", position, title, images(image_count))
}

/// Whole-number percent of `index` out of `total`.
pub fn percent(index: usize, total: usize) -> usize {
    if total == 0 {
        100
    } else {
        index * 100 / total
    }
}

// ============================================================================
// Scan output
// ============================================================================

pub fn format_scan_output(scan: &ScanResult) -> Vec<String> {
    let mut lines = vec![format!(
        "{}: {} sections, {}",
        scan.root_name,
        scan.subdirectories.len(),
        images(scan.image_count())
    )];

    if let Some(outcome) = scan.empty_outcome() {
        lines.push(format!("    {}", outcome.message()));
    }

    for (i, dir) in scan.subdirectories.iter().enumerate() {
        lines.push(entity_header(i + 1, &dir.name, dir.images.len()));
        lines.push(format!("    Source: {}/", dir.name));
        for (j, image) in dir.images.iter().enumerate() {
            lines.push(format!("    {:03} {}", j + 1, image.file_name));
        }
    }

    if !scan.skipped.is_empty() {
        lines.push("Skipped (unreadable)".to_string());
        for path in &scan.skipped {
            lines.push(format!("    {}", path.display()));
        }
    }

    lines
}

pub fn print_scan_output(scan: &ScanResult) {
    for line in format_scan_output(scan) {
        println!("{}", line);
    }
}

// ============================================================================
// Convert output
// ============================================================================

/// Format a single conversion progress event as display lines.
pub fn format_convert_event(event: &ConvertEvent) -> Vec<String> {
    match event {
        ConvertEvent::Started { sections } => vec![format!("Converting {} sections", sections)],
        ConvertEvent::SectionStarted {
            index,
            title,
            image_count,
            ..
        } => vec![entity_header(*index, title, *image_count)],
        ConvertEvent::ImagePlaced { name } => vec![format!("    {}", name)],
        ConvertEvent::ImageFailed { name, reason } => {
            vec![format!("    {}: failed ({})", name, reason)]
        }
        ConvertEvent::SectionFinished { index, total } => vec![format!(
            "    [{:>3}%] {}/{} sections",
            percent(*index, *total),
            index,
            total
        )],
        ConvertEvent::Saved {
            path,
            sections,
            images: placed,
        } => vec![format!(
            "Saved {} ({} sections, {})",
            path.display(),
            sections,
            images(*placed)
        )],
    }
}

pub fn format_convert_report(report: &ConvertReport) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(outcome) = report.outcome {
        lines.push(format!("{}: {}", report.output.display(), outcome.message()));
        return lines;
    }

    lines.push(format!(
        "{}: {} sections, {}, {} failed",
        report.output.display(),
        report.sections,
        images(report.images),
        report.failed.len()
    ));
    for failed in &report.failed {
        lines.push(format!("    Failed: {} ({})", failed.path.display(), failed.reason));
    }
    lines
}

pub fn print_convert_report(report: &ConvertReport) {
    for line in format_convert_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Extract output
// ============================================================================

pub fn format_extract_report(report: &ExtractReport) -> Vec<String> {
    let mut lines: Vec<String> = report
        .images
        .iter()
        .map(|image| {
            image
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
        .collect();

    lines.push(format!(
        "Extracted {} from {} pages \u{2192} {}",
        images(report.images.len()),
        report.pages,
        report.output_dir.display()
    ));
    if report.skipped > 0 {
        lines.push(format!("    {} skipped (unsupported encoding)", report.skipped));
    }
    lines
}

pub fn print_extract_report(report: &ExtractReport) {
    for line in format_extract_report(report) {
        println!("{}", line);
    }
}
