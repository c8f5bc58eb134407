// src/export/pdf.rs
use crate::export::paginate::{scaled_height_mm, PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
use crate::export::raster::Bitmap;
use chrono::{Datelike, Timelike, Utc};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use pdf_writer::{Content, Date, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};
use std::io::Write;
use tracing::debug;

pub const MM_TO_PT: f32 = 72.0 / 25.4;
const PRODUCER: &str = "cv-builder";
const IMAGE_NAME: Name<'static> = Name(b"Im0");

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("bitmap is empty")]
    EmptyBitmap,
    #[error("bitmap holds {actual} bytes, expected {expected}")]
    BitmapSize { expected: usize, actual: usize },
    #[error("failed to compress page image: {0}")]
    Compress(#[from] std::io::Error),
}

fn compress(data: &[u8]) -> Result<Vec<u8>, PdfError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

fn creation_date() -> Date {
    let now = Utc::now();
    Date::new(now.year().clamp(0, 9999) as u16)
        .month(now.month() as u8)
        .day(now.day() as u8)
        .hour(now.hour() as u8)
        .minute(now.minute() as u8)
        .second(now.second() as u8)
        .utc_offset_hour(0)
}

/// Writes a portrait A4 document with one page per offset.
///
/// The bitmap is embedded once as a Flate-compressed image XObject and every
/// page draws it full-width, shifted by its offset (mm, relative to the page
/// top) so each page shows the next band of the image.
pub fn write_pdf(bitmap: &Bitmap, offsets_mm: &[f64], title: &str) -> Result<Vec<u8>, PdfError> {
    if bitmap.width == 0 || bitmap.height == 0 {
        return Err(PdfError::EmptyBitmap);
    }
    let expected = bitmap.width as usize * bitmap.height as usize * 3;
    if bitmap.rgb.len() != expected {
        return Err(PdfError::BitmapSize {
            expected,
            actual: bitmap.rgb.len(),
        });
    }

    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let image_id = Ref::new(3);
    let info_id = Ref::new(4);
    let page_ids: Vec<(Ref, Ref)> = (0..offsets_mm.len() as i32)
        .map(|i| (Ref::new(5 + 2 * i), Ref::new(6 + 2 * i)))
        .collect();

    let page_width_pt = (PAGE_WIDTH_MM as f32) * MM_TO_PT;
    let page_height_pt = (PAGE_HEIGHT_MM as f32) * MM_TO_PT;
    let image_height_mm = scaled_height_mm(bitmap.width, bitmap.height);
    let image_height_pt = (image_height_mm as f32) * MM_TO_PT;

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().map(|(page_id, _)| *page_id))
        .count(page_ids.len() as i32);

    let compressed = compress(&bitmap.rgb)?;
    let mut image = pdf.image_xobject(image_id, &compressed);
    image.filter(Filter::FlateDecode);
    image.width(bitmap.width as i32);
    image.height(bitmap.height as i32);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.finish();

    let media_box = Rect::new(0.0, 0.0, page_width_pt, page_height_pt);
    for ((page_id, content_id), offset_mm) in page_ids.iter().zip(offsets_mm) {
        let mut page = pdf.page(*page_id);
        page.media_box(media_box)
            .parent(page_tree_id)
            .contents(*content_id);
        page.resources().x_objects().pair(IMAGE_NAME, image_id);
        page.finish();

        // PDF space grows upward from the page bottom.
        let image_bottom_pt = page_height_pt - ((*offset_mm as f32) * MM_TO_PT + image_height_pt);
        let mut content = Content::new();
        content.save_state();
        content.transform([page_width_pt, 0.0, 0.0, image_height_pt, 0.0, image_bottom_pt]);
        content.x_object(IMAGE_NAME);
        content.restore_state();
        pdf.stream(*content_id, &content.finish());
    }

    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(PRODUCER))
        .creation_date(creation_date());

    let bytes = pdf.finish();
    debug!(
        "Wrote PDF: {} pages, {} bytes ({} compressed image bytes)",
        page_ids.len(),
        bytes.len(),
        compressed.len()
    );
    Ok(bytes)
}
