//! Vertical placement on fixed-height pages.
//!
//! The PDF emitter measures every position from the top of the page. A
//! [`PageCursor`] tracks the next free y offset within the current page and
//! decides, image by image, when a new page has to start:
//!
//! ```text
//! cursor + image_height + caption_allowance > page_limit  →  new page
//! ```
//!
//! After a page break the cursor restarts at the top margin. The check runs
//! before every image, so a long section spans as many pages as it needs and
//! a short one never leaves a blank page behind.

use crate::config::PdfConfig;

/// Gap between the bottom of an image and its caption baseline.
pub const CAPTION_GAP: f64 = 10.0;
/// Advance from the caption baseline to the next free position.
pub const CAPTION_ADVANCE: f64 = 30.0;
/// Advance after a failure annotation.
pub const ANNOTATION_ADVANCE: f64 = 30.0;

/// First contents line on the cover page, and the step between lines.
const TOC_START: f64 = 250.0;
const TOC_STEP: f64 = 25.0;

/// Where an image goes, decided before it is drawn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Slot {
    /// The image starts a fresh page.
    pub new_page: bool,
    /// Top edge of the image.
    pub top: f64,
}

/// True when an image of `height` placed at `cursor` would run past the
/// page limit once its caption is accounted for.
pub fn overflows(cursor: f64, height: f64, config: &PdfConfig) -> bool {
    cursor + height + config.caption_allowance > config.page_limit
}

#[derive(Debug, Clone)]
pub struct PageCursor<'a> {
    config: &'a PdfConfig,
    y: f64,
}

impl<'a> PageCursor<'a> {
    /// Cursor just below a section title.
    pub fn for_section(config: &'a PdfConfig) -> Self {
        Self {
            config,
            y: config.section_start,
        }
    }

    pub fn position(&self) -> f64 {
        self.y
    }

    /// Claim room for an image, breaking the page first if it would not fit.
    ///
    /// The cursor does not move past the image until [`Self::finish_image`]
    /// is called, so a failed insertion can annotate at `slot.top` instead.
    pub fn reserve(&mut self, height: f64) -> Slot {
        let new_page = overflows(self.y, height, self.config);
        if new_page {
            self.y = self.config.top_margin;
        }
        Slot {
            new_page,
            top: self.y,
        }
    }

    /// Advance past an image drawn at the cursor. Returns the caption y.
    pub fn finish_image(&mut self, height: f64) -> f64 {
        let caption_y = self.y + height + CAPTION_GAP;
        self.y = caption_y + CAPTION_ADVANCE;
        caption_y
    }

    /// Advance past a one-line failure annotation. Returns its y.
    pub fn annotate(&mut self) -> f64 {
        let y = self.y;
        self.y += ANNOTATION_ADVANCE;
        y
    }
}

/// Position of one line in the cover page contents list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TocLine {
    /// 0 for the cover page, 1 for the first continuation page, and so on.
    pub page: usize,
    pub y: f64,
}

/// Lay out `count` contents lines, starting at y = 250 with a 25 pt step.
/// A line that would pass the page limit moves to a new page, restarting at
/// the top margin.
pub fn toc_lines(count: usize, config: &PdfConfig) -> Vec<TocLine> {
    let mut lines = Vec::with_capacity(count);
    let mut page = 0;
    let mut y = TOC_START;
    for _ in 0..count {
        if y > config.page_limit {
            page += 1;
            y = config.top_margin;
        }
        lines.push(TocLine { page, y });
        y += TOC_STEP;
    }
    lines
}
