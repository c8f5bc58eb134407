// src/export/mod.rs
//! Export of the rendered CV to a paginated A4 PDF.
//!
//! The visible preview is cloned into an off-screen slot, rasterized,
//! and the bitmap is tiled onto pages. A failed capture is retried once
//! at native resolution without color normalization.

pub mod normalize;
pub mod paginate;
pub mod pdf;
pub mod raster;

use crate::export::normalize::normalize_colors;
use crate::export::paginate::{page_offsets, scaled_height_mm};
use crate::export::pdf::{write_pdf, PdfError};
use crate::export::raster::{Bitmap, CaptureSettings, RasterError, Rasterizer};
use crate::render::{lock_document, DocumentError, Node, NodeHandle, SharedDocument, VIEWPORT_WIDTH_PX};
use crate::utils::sanitize_file_stem;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

pub const DEFAULT_FILE_STEM: &str = "cv";
pub const FALLBACK_SUFFIX: &str = "-fallback";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExportState {
    Idle,
    Capturing,
    Paginating,
    Emitted,
    RasterizationFailed,
    RetryCapturing,
    Reported,
}

#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

#[derive(Debug)]
pub enum ExportOutcome {
    /// No attached target; nothing was produced.
    Skipped,
    Emitted(ExportArtifact),
    /// User-facing failure notice.
    Reported { message: String },
}

#[derive(Debug)]
pub struct ExportReport {
    pub export_id: Uuid,
    pub outcome: ExportOutcome,
    pub states: Vec<ExportState>,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error(transparent)]
    Pdf(#[from] PdfError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("the off-screen clone disappeared before it could be captured")]
    CloneLost,
}

/// Download name for a CV owner: `<name>.pdf`, `cv.pdf` when blank.
pub fn download_name(name: &str, fallback: bool) -> String {
    let stem = sanitize_file_stem(name);
    let stem = if stem.is_empty() {
        DEFAULT_FILE_STEM.to_string()
    } else {
        stem
    };
    if fallback {
        format!("{stem}{FALLBACK_SUFFIX}.pdf")
    } else {
        format!("{stem}.pdf")
    }
}

/// Detaches the off-screen clone when dropped, whatever the capture outcome.
struct OffscreenClone {
    document: SharedDocument,
    handle: NodeHandle,
}

impl Drop for OffscreenClone {
    fn drop(&mut self) {
        if lock_document(&self.document)
            .detach_offscreen(self.handle)
            .is_none()
        {
            warn!("Off-screen clone {:?} was already detached", self.handle);
        }
    }
}

#[derive(Clone)]
pub struct ExportPipeline {
    rasterizer: Arc<dyn Rasterizer>,
}

impl ExportPipeline {
    pub fn new(rasterizer: Arc<dyn Rasterizer>) -> Self {
        Self { rasterizer }
    }

    /// Exports the subtree behind `target` as a PDF named after `owner_name`.
    ///
    /// Never fails: errors end as [`ExportOutcome::Reported`], and the
    /// off-screen slot is empty again once this returns.
    pub async fn export_to_document(
        &self,
        document: &SharedDocument,
        target: Option<NodeHandle>,
        owner_name: &str,
    ) -> ExportReport {
        let pristine = target.and_then(|handle| lock_document(document).isolate(handle));
        self.export_isolated(document, pristine, owner_name).await
    }

    /// Exports a clone taken earlier with [`DocumentTree::isolate`], so the
    /// caller can isolate under the same lock it read the target with.
    ///
    /// [`DocumentTree::isolate`]: crate::render::DocumentTree::isolate
    pub async fn export_isolated(
        &self,
        document: &SharedDocument,
        pristine: Option<Node>,
        owner_name: &str,
    ) -> ExportReport {
        let export_id = Uuid::new_v4();
        let span = info_span!("cv_export", export_id = %export_id);
        let (outcome, states) = self
            .run(document, pristine, owner_name)
            .instrument(span)
            .await;
        ExportReport {
            export_id,
            outcome,
            states,
        }
    }

    async fn run(
        &self,
        document: &SharedDocument,
        pristine: Option<Node>,
        owner_name: &str,
    ) -> (ExportOutcome, Vec<ExportState>) {
        let mut states = vec![ExportState::Idle];

        let Some(pristine) = pristine else {
            debug!("Export requested without an attached target; skipping");
            return (ExportOutcome::Skipped, states);
        };

        states.push(ExportState::Capturing);
        let captured = match self
            .capture(document, pristine.clone(), CaptureSettings::PRIMARY)
            .await
        {
            Ok(bitmap) => Ok((bitmap, false)),
            Err(ExportError::Document(e)) => Err(ExportError::Document(e)),
            Err(primary) => {
                warn!("Primary capture failed: {}. Retrying without normalization", primary);
                states.push(ExportState::RasterizationFailed);
                states.push(ExportState::RetryCapturing);
                self.capture(document, pristine, CaptureSettings::FALLBACK)
                    .await
                    .map(|bitmap| (bitmap, true))
            }
        };

        let result = match captured {
            Ok((bitmap, fallback)) => {
                states.push(ExportState::Paginating);
                emit(&bitmap, owner_name, fallback).map_err(ExportError::from)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(artifact) => {
                info!(
                    "Exported {} ({} pages, {} bytes)",
                    artifact.file_name,
                    artifact.page_count,
                    artifact.bytes.len()
                );
                states.push(ExportState::Emitted);
                (ExportOutcome::Emitted(artifact), states)
            }
            Err(e) => {
                error!("Export failed: {}", e);
                states.push(ExportState::Reported);
                (
                    ExportOutcome::Reported {
                        message: format!("Failed to generate PDF: {e}"),
                    },
                    states,
                )
            }
        }
    }

    async fn capture(
        &self,
        document: &SharedDocument,
        mut clone: Node,
        settings: CaptureSettings,
    ) -> Result<Bitmap, ExportError> {
        if settings.normalize_colors {
            let patched = normalize_colors(&mut clone);
            debug!("Normalized {} color declarations", patched);
        }

        let handle = lock_document(document).attach_offscreen(clone)?;
        let _cleanup = OffscreenClone {
            document: Arc::clone(document),
            handle,
        };

        let snapshot = lock_document(document)
            .snapshot(handle, VIEWPORT_WIDTH_PX)
            .ok_or(ExportError::CloneLost)?;
        debug!(
            "Capturing {:.0}x{:.0} CSS px at {}x",
            snapshot.width, snapshot.height, settings.scale
        );

        let rasterizer = Arc::clone(&self.rasterizer);
        let scale = settings.scale;
        let bitmap = tokio::task::spawn_blocking(move || rasterizer.rasterize(&snapshot, scale))
            .await
            .map_err(|e| RasterError::Worker(e.to_string()))??;
        Ok(bitmap)
    }
}

fn emit(bitmap: &Bitmap, owner_name: &str, fallback: bool) -> Result<ExportArtifact, PdfError> {
    let offsets = page_offsets(scaled_height_mm(bitmap.width, bitmap.height));
    let title = match owner_name.trim() {
        "" => DEFAULT_FILE_STEM,
        name => name,
    };
    let bytes = write_pdf(bitmap, &offsets, title)?;
    Ok(ExportArtifact {
        file_name: download_name(owner_name, fallback),
        bytes,
        page_count: offsets.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::paginate::{PAGE_HEIGHT_MM, PAGE_WIDTH_MM};
    use crate::export::raster::ResvgRasterizer;
    use crate::render::layout::Snapshot;
    use crate::render::{render_cv, DocumentTree};
    use crate::types::CvRecord;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// Returns a white bitmap of fixed height, failing at chosen scales.
    struct FakeRasterizer {
        height_px: u32,
        failing_scales: Vec<f32>,
        calls: Mutex<Vec<f32>>,
        observed: Option<SharedDocument>,
        saw_clone: AtomicBool,
    }

    impl FakeRasterizer {
        fn new(height_px: u32) -> Self {
            Self {
                height_px,
                failing_scales: Vec::new(),
                calls: Mutex::new(Vec::new()),
                observed: None,
                saw_clone: AtomicBool::new(false),
            }
        }

        fn failing_at(mut self, scales: &[f32]) -> Self {
            self.failing_scales = scales.to_vec();
            self
        }

        fn observing(mut self, document: &SharedDocument) -> Self {
            self.observed = Some(Arc::clone(document));
            self
        }

        fn calls(&self) -> Vec<f32> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Rasterizer for FakeRasterizer {
        fn rasterize(&self, snapshot: &Snapshot, scale: f32) -> Result<Bitmap, RasterError> {
            self.calls.lock().unwrap().push(scale);
            if let Some(document) = &self.observed {
                if lock_document(document).has_offscreen() {
                    self.saw_clone.store(true, Ordering::SeqCst);
                }
            }
            if self.failing_scales.contains(&scale) {
                return Err(RasterError::UnsupportedColor(
                    "oklch(70.7% 0.022 261.325)".to_string(),
                ));
            }
            let width = (snapshot.width * scale).ceil() as u32;
            Ok(Bitmap {
                width,
                height: self.height_px,
                rgb: vec![255; (width * self.height_px * 3) as usize],
            })
        }
    }

    fn mounted(record: &CvRecord) -> (SharedDocument, NodeHandle) {
        let mut doc = DocumentTree::new();
        let handle = doc.mount(render_cv(record));
        (doc.shared(), handle)
    }

    fn jane() -> CvRecord {
        CvRecord {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            ..Default::default()
        }
    }

    fn artifact(report: &ExportReport) -> &ExportArtifact {
        match &report.outcome {
            ExportOutcome::Emitted(artifact) => artifact,
            other => panic!("expected an emitted PDF, got {other:?}"),
        }
    }

    #[test]
    fn test_download_name() {
        assert_eq!(download_name("Jane Doe", false), "Jane Doe.pdf");
        assert_eq!(download_name("", false), "cv.pdf");
        assert_eq!(download_name("   ", false), "cv.pdf");
        assert_eq!(download_name("Jane Doe", true), "Jane Doe-fallback.pdf");
        assert_eq!(download_name("", true), "cv-fallback.pdf");
        assert_eq!(download_name("a/b\\c", false), "a_b_c.pdf");
    }

    #[tokio::test]
    async fn test_missing_target_is_skipped() {
        let (document, _) = mounted(&jane());
        let fake = Arc::new(FakeRasterizer::new(100));
        let pipeline = ExportPipeline::new(fake.clone());

        let report = pipeline.export_to_document(&document, None, "Jane Doe").await;
        assert!(matches!(report.outcome, ExportOutcome::Skipped));
        assert_eq!(report.states, vec![ExportState::Idle]);
        assert!(fake.calls().is_empty());
    }

    #[tokio::test]
    async fn test_stale_target_is_skipped() {
        let (document, stale) = mounted(&jane());
        lock_document(&document).mount(render_cv(&CvRecord::default()));
        let pipeline = ExportPipeline::new(Arc::new(FakeRasterizer::new(100)));

        let report = pipeline
            .export_to_document(&document, Some(stale), "Jane Doe")
            .await;
        assert!(matches!(report.outcome, ExportOutcome::Skipped));
    }

    #[tokio::test]
    async fn test_isolated_clone_survives_remount() {
        let (document, target) = mounted(&jane());
        let pristine = lock_document(&document).isolate(target);
        lock_document(&document).mount(render_cv(&CvRecord::default()));
        assert!(!lock_document(&document).is_attached(target));
        let pipeline = ExportPipeline::new(Arc::new(FakeRasterizer::new(100)));

        let report = pipeline
            .export_isolated(&document, pristine, "Jane Doe")
            .await;
        assert_eq!(artifact(&report).file_name, "Jane Doe.pdf");
        assert!(!lock_document(&document).has_offscreen());
    }

    #[tokio::test]
    async fn test_primary_capture_emits_named_pdf() {
        let (document, target) = mounted(&jane());
        let fake = Arc::new(FakeRasterizer::new(400).observing(&document));
        let pipeline = ExportPipeline::new(fake.clone());

        let report = pipeline
            .export_to_document(&document, Some(target), "Jane Doe")
            .await;

        let pdf = artifact(&report);
        assert_eq!(pdf.file_name, "Jane Doe.pdf");
        assert_eq!(pdf.page_count, 1);
        assert!(pdf.bytes.starts_with(b"%PDF-"));
        assert_eq!(
            report.states,
            vec![
                ExportState::Idle,
                ExportState::Capturing,
                ExportState::Paginating,
                ExportState::Emitted
            ]
        );
        assert_eq!(fake.calls(), vec![2.0]);
        assert!(fake.saw_clone.load(Ordering::SeqCst));
        assert!(!lock_document(&document).has_offscreen());
        assert!(lock_document(&document).is_attached(target));
    }

    #[tokio::test]
    async fn test_blank_name_downloads_cv_pdf() {
        let (document, target) = mounted(&CvRecord::default());
        let pipeline = ExportPipeline::new(Arc::new(FakeRasterizer::new(100)));

        let report = pipeline.export_to_document(&document, Some(target), "").await;
        assert_eq!(artifact(&report).file_name, "cv.pdf");
    }

    #[tokio::test]
    async fn test_tall_capture_spans_three_pages() {
        let (document, target) = mounted(&jane());
        // 1588 px wide at 2x; two and a half A4 heights at that width.
        let height_px = (1588.0 * PAGE_HEIGHT_MM / PAGE_WIDTH_MM * 2.5).round() as u32;
        let pipeline = ExportPipeline::new(Arc::new(FakeRasterizer::new(height_px)));

        let report = pipeline
            .export_to_document(&document, Some(target), "Jane Doe")
            .await;
        assert_eq!(artifact(&report).page_count, 3);
    }

    #[tokio::test]
    async fn test_failed_primary_retries_once_with_fallback_name() {
        let (document, target) = mounted(&jane());
        let fake = Arc::new(FakeRasterizer::new(400).failing_at(&[2.0]));
        let pipeline = ExportPipeline::new(fake.clone());

        let report = pipeline
            .export_to_document(&document, Some(target), "Jane Doe")
            .await;

        assert_eq!(artifact(&report).file_name, "Jane Doe-fallback.pdf");
        assert_eq!(fake.calls(), vec![2.0, 1.0]);
        assert_eq!(
            report.states,
            vec![
                ExportState::Idle,
                ExportState::Capturing,
                ExportState::RasterizationFailed,
                ExportState::RetryCapturing,
                ExportState::Paginating,
                ExportState::Emitted
            ]
        );
        assert!(!lock_document(&document).has_offscreen());
    }

    #[tokio::test]
    async fn test_double_failure_is_reported_and_cleaned_up() {
        let (document, target) = mounted(&jane());
        let fake = Arc::new(FakeRasterizer::new(400).failing_at(&[2.0, 1.0]));
        let pipeline = ExportPipeline::new(fake.clone());

        let report = pipeline
            .export_to_document(&document, Some(target), "Jane Doe")
            .await;

        match &report.outcome {
            ExportOutcome::Reported { message } => {
                assert!(message.starts_with("Failed to generate PDF"));
                assert!(message.contains("oklch"));
            }
            other => panic!("expected a report, got {other:?}"),
        }
        assert_eq!(report.states.last(), Some(&ExportState::Reported));
        assert_eq!(fake.calls().len(), 2);
        assert!(!lock_document(&document).has_offscreen());
    }

    #[tokio::test]
    async fn test_busy_offscreen_slot_is_reported_without_retry() {
        let (document, target) = mounted(&jane());
        let squatter = lock_document(&document)
            .attach_offscreen(Node::block())
            .unwrap();
        let fake = Arc::new(FakeRasterizer::new(400));
        let pipeline = ExportPipeline::new(fake.clone());

        let report = pipeline
            .export_to_document(&document, Some(target), "Jane Doe")
            .await;

        assert!(matches!(report.outcome, ExportOutcome::Reported { .. }));
        assert!(fake.calls().is_empty());
        assert_eq!(lock_document(&document).layer_of(squatter), Some(crate::render::Layer::Offscreen));
    }

    #[tokio::test]
    async fn test_export_clone_hides_controls() {
        let (document, target) = mounted(&jane());
        let preview_texts = lock_document(&document)
            .preview_snapshot()
            .unwrap()
            .texts()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>();
        assert!(preview_texts.iter().any(|t| t == crate::render::template::EXPORT_BUTTON_LABEL));

        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        struct Recording(Arc<Mutex<Vec<String>>>);
        impl Rasterizer for Recording {
            fn rasterize(&self, snapshot: &Snapshot, scale: f32) -> Result<Bitmap, RasterError> {
                *self.0.lock().unwrap() = snapshot.texts().into_iter().map(str::to_string).collect();
                let width = (snapshot.width * scale).ceil() as u32;
                Ok(Bitmap {
                    width,
                    height: 10,
                    rgb: vec![255; (width * 10 * 3) as usize],
                })
            }
        }
        let pipeline = ExportPipeline::new(Arc::new(Recording(seen.clone())));
        pipeline
            .export_to_document(&document, Some(target), "Jane Doe")
            .await;

        let captured = seen.lock().unwrap().clone();
        assert!(captured.iter().any(|t| t == "Jane Doe"));
        assert!(!captured.iter().any(|t| t == crate::render::template::EXPORT_BUTTON_LABEL));
    }

    #[tokio::test]
    async fn test_real_rasterizer_exports_normalized_template() {
        let (document, target) = mounted(&jane());
        let rasterizer = ResvgRasterizer::with_fonts(usvg::fontdb::Database::new());
        let pipeline = ExportPipeline::new(Arc::new(rasterizer));

        let report = pipeline
            .export_to_document(&document, Some(target), "Jane Doe")
            .await;

        let pdf = artifact(&report);
        assert_eq!(pdf.file_name, "Jane Doe.pdf");
        assert_eq!(pdf.page_count, 1);
        assert!(!lock_document(&document).has_offscreen());
    }
}
