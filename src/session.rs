// src/session.rs
//! One editing session: the form-backed record and the document showing it.

use crate::export::{ExportPipeline, ExportReport};
use crate::form_binder::{apply_edit, apply_photo, encode_photo, FormError};
use crate::render::svg::to_svg;
use crate::render::{lock_document, render_cv, DocumentTree, Node, NodeHandle, SharedDocument};
use crate::types::{CvField, CvRecord};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

/// Locks are always taken record first, then document.
pub struct CvSession {
    record: Mutex<CvRecord>,
    document: SharedDocument,
}

impl Default for CvSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CvSession {
    /// Starts with an empty record, rendered so the placeholders show.
    pub fn new() -> Self {
        Self::with_record(CvRecord::new())
    }

    pub fn with_record(record: CvRecord) -> Self {
        let mut document = DocumentTree::new();
        document.mount(render_cv(&record));
        Self {
            record: Mutex::new(record),
            document: document.shared(),
        }
    }

    fn lock_record(&self) -> MutexGuard<'_, CvRecord> {
        self.record.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn rerender(&self, record: &CvRecord) {
        lock_document(&self.document).mount(render_cv(record));
    }

    pub fn record(&self) -> CvRecord {
        self.lock_record().clone()
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn preview_handle(&self) -> Option<NodeHandle> {
        lock_document(&self.document).preview()
    }

    /// Applies a text edit and re-renders the preview.
    pub fn edit(&self, field: &str, value: String) -> Result<CvField, FormError> {
        let mut record = self.lock_record();
        let field = apply_edit(&mut record, field, value)?;
        self.rerender(&record);
        Ok(field)
    }

    /// Encodes an uploaded photo into the record and re-renders.
    pub fn set_photo(&self, bytes: &[u8]) -> Result<(), FormError> {
        let data_url = encode_photo(bytes)?;
        let mut record = self.lock_record();
        apply_photo(&mut record, data_url);
        info!("Photo updated ({} bytes)", bytes.len());
        self.rerender(&record);
        Ok(())
    }

    /// Static SVG of the preview; the download control is left out.
    pub fn preview_svg(&self) -> Option<String> {
        lock_document(&self.document)
            .static_preview_snapshot()
            .map(|snapshot| to_svg(&snapshot))
    }

    /// Clone of the current preview with the owner name it was rendered from.
    fn isolate_preview(&self) -> (Option<Node>, String) {
        let record = self.lock_record();
        let document = lock_document(&self.document);
        let pristine = document
            .preview()
            .and_then(|handle| document.isolate(handle));
        (pristine, record.name.clone())
    }

    /// Exports whatever the preview shows at the time of the call.
    pub async fn export(&self, pipeline: &ExportPipeline) -> ExportReport {
        let (pristine, owner_name) = self.isolate_preview();
        pipeline
            .export_isolated(&self.document, pristine, &owner_name)
            .await
    }
}
