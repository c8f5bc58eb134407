// src/export/raster.rs
use crate::render::layout::{Paint, Snapshot};
use crate::render::style::is_rasterizable;
use crate::render::svg::to_svg;
use resvg::tiny_skia;
use std::sync::Arc;
use tracing::{debug, info};

/// Largest canvas side and area the rasterizer accepts.
pub const MAX_CANVAS_SIDE: u32 = 32_767;
pub const MAX_CANVAS_AREA: u64 = 268_435_456;

/// Opaque RGB bitmap, 8 bits per channel, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CaptureSettings {
    pub scale: f32,
    pub normalize_colors: bool,
}

impl CaptureSettings {
    pub const PRIMARY: CaptureSettings = CaptureSettings {
        scale: 2.0,
        normalize_colors: true,
    };

    pub const FALLBACK: CaptureSettings = CaptureSettings {
        scale: 1.0,
        normalize_colors: false,
    };
}

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("unsupported color value: {0}")]
    UnsupportedColor(String),
    #[error("canvas of {width}x{height} px exceeds the rasterizer limits")]
    CanvasTooLarge { width: u32, height: u32 },
    #[error("failed to parse rendered document: {0}")]
    Svg(String),
    #[error("rasterizer worker failed: {0}")]
    Worker(String),
}

pub trait Rasterizer: Send + Sync {
    /// Renders the snapshot onto a white canvas `scale` times its CSS size.
    fn rasterize(&self, snapshot: &Snapshot, scale: f32) -> Result<Bitmap, RasterError>;
}

pub fn canvas_size(snapshot: &Snapshot, scale: f32) -> Result<(u32, u32), RasterError> {
    let width = (snapshot.width * scale).ceil().max(1.0) as u32;
    let height = (snapshot.height * scale).ceil().max(1.0) as u32;
    if width > MAX_CANVAS_SIDE
        || height > MAX_CANVAS_SIDE
        || u64::from(width) * u64::from(height) > MAX_CANVAS_AREA
    {
        return Err(RasterError::CanvasTooLarge { width, height });
    }
    Ok((width, height))
}

pub struct ResvgRasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl ResvgRasterizer {
    /// Loads the system fonts once; reused by every export.
    pub fn new() -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        info!("Rasterizer loaded {} font faces", fontdb.len());
        Self::with_fonts(fontdb)
    }

    pub fn with_fonts(fontdb: usvg::fontdb::Database) -> Self {
        Self {
            fontdb: Arc::new(fontdb),
        }
    }
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for ResvgRasterizer {
    fn rasterize(&self, snapshot: &Snapshot, scale: f32) -> Result<Bitmap, RasterError> {
        if let Some(color) = snapshot
            .paints
            .iter()
            .filter_map(Paint::color)
            .find(|c| !is_rasterizable(c))
        {
            return Err(RasterError::UnsupportedColor(color.to_string()));
        }

        let (width, height) = canvas_size(snapshot, scale)?;

        let mut options = usvg::Options::default();
        options.fontdb = Arc::clone(&self.fontdb);
        let tree = usvg::Tree::from_str(&to_svg(snapshot), &options)
            .map_err(|e| RasterError::Svg(e.to_string()))?;

        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(RasterError::CanvasTooLarge { width, height })?;
        pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut pixmap.as_mut(),
        );

        // The canvas is opaque, so premultiplied RGBA equals straight RGB.
        let rgb = pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();

        debug!("Rasterized {}x{} px at {}x", width, height, scale);
        Ok(Bitmap { width, height, rgb })
    }
}
