// src/export/paginate.rs
//! A4 page tiling of a single tall bitmap.

pub const PAGE_WIDTH_MM: f64 = 210.0;
pub const PAGE_HEIGHT_MM: f64 = 297.0;

/// Overshoot below this is treated as rounding noise, not a new page.
const PAGE_TOLERANCE_MM: f64 = 0.01;

/// Height in mm of a bitmap drawn at full page width, aspect preserved.
pub fn scaled_height_mm(width_px: u32, height_px: u32) -> f64 {
    if width_px == 0 {
        return 0.0;
    }
    f64::from(height_px) * PAGE_WIDTH_MM / f64::from(width_px)
}

/// Vertical offset of the image top for every page, relative to the page top.
///
/// The first page is at 0 and each following page shifts the image up by one
/// page height, so page `i` shows the band `[i * 297, (i + 1) * 297)` mm.
/// A document always gets at least one page.
pub fn page_offsets(image_height_mm: f64) -> Vec<f64> {
    let pages = ((image_height_mm - PAGE_TOLERANCE_MM) / PAGE_HEIGHT_MM)
        .ceil()
        .max(1.0) as usize;
    (0..pages).map(|i| -(i as f64) * PAGE_HEIGHT_MM).collect()
}
