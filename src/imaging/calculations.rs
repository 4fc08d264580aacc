//! Pure calculation functions for image placement sizes.
//!
//! All functions here are pure and testable without any I/O or images.

/// Largest size with the source aspect ratio that fits inside both bounds.
///
/// The scale factor is `min(max_w / w, max_h / h)`, clamped to `1.0` so an
/// image is never enlarged. Units are whatever the caller uses for the
/// bounds: pixels, inches or points.
///
/// # Examples
/// ```
/// # use folder2doc::imaging::fit_within;
/// // 1000x500 into 400x300 → width is the binding bound
/// assert_eq!(fit_within((1000.0, 500.0), (400.0, 300.0)), (400.0, 200.0));
///
/// // Already small enough → unchanged
/// assert_eq!(fit_within((200.0, 100.0), (400.0, 300.0)), (200.0, 100.0));
/// ```
pub fn fit_within(source: (f64, f64), bounds: (f64, f64)) -> (f64, f64) {
    let (w, h) = source;
    let (max_w, max_h) = bounds;

    if w <= 0.0 || h <= 0.0 {
        return (0.0, 0.0);
    }

    let ratio = (max_w / w).min(max_h / h).min(1.0);
    (w * ratio, h * ratio)
}

/// Scale factor [`fit_within`] applies, exposed for callers that need to
/// know whether a resize is required at all.
pub fn fit_ratio(source: (u32, u32), bounds: (u32, u32)) -> f64 {
    let (w, h) = source;
    if w == 0 || h == 0 {
        return 1.0;
    }
    (bounds.0 as f64 / w as f64)
        .min(bounds.1 as f64 / h as f64)
        .min(1.0)
}

/// Pixel version of [`fit_within`].
///
/// Fractional pixels are truncated, and each dimension is at least 1 px so
/// an extreme aspect ratio never produces an empty raster.
pub fn fit_within_px(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let ratio = fit_ratio(source, bounds);
    if ratio >= 1.0 {
        return source;
    }
    let w = ((source.0 as f64 * ratio) as u32).max(1);
    let h = ((source.1 as f64 * ratio) as u32).max(1);
    (w, h)
}

/// Pixel bounds for rasterizing an image shown at `display` size.
///
/// `display` is in document units and `per_unit` is how many pixels one unit
/// should carry (e.g. 150 px per inch, 2 px per point). Rounded up.
pub fn raster_bounds(display: (f64, f64), per_unit: f64) -> (u32, u32) {
    let w = (display.0 * per_unit).ceil().max(1.0) as u32;
    let h = (display.1 * per_unit).ceil().max(1.0) as u32;
    (w, h)
}
