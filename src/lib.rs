// src/lib.rs
//! Form-driven CV builder: edit a CV record, preview the rendered page and
//! export it as a multi-page A4 PDF.

pub mod cli;
pub mod environment;
pub mod export;
pub mod form_binder;
pub mod render;
pub mod session;
pub mod types;
pub mod utils;
pub mod web;

pub use export::raster::{Rasterizer, ResvgRasterizer};
pub use export::{ExportOutcome, ExportPipeline, ExportReport, ExportState};
pub use session::CvSession;
pub use types::{CvField, CvRecord};
pub use web::start_web_server;
