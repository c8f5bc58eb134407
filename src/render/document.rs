// src/render/document.rs
//! The live document: one visible mount for the preview plus one
//! off-screen slot used while exporting.

use crate::render::layout::{layout_node, Snapshot};
use crate::render::node::Node;
use crate::render::style::Computed;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use uuid::Uuid;

/// Preview width: 210mm at 96 CSS px per inch.
pub const VIEWPORT_WIDTH_PX: f32 = 794.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(Uuid);

impl NodeHandle {
    fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Visible,
    Offscreen,
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("the off-screen slot is already holding a clone")]
    OffscreenSlotOccupied,
}

#[derive(Debug)]
struct Mounted {
    handle: NodeHandle,
    node: Node,
}

#[derive(Debug)]
pub struct DocumentTree {
    root: Computed,
    visible: Option<Mounted>,
    offscreen: Option<Mounted>,
}

pub type SharedDocument = Arc<Mutex<DocumentTree>>;

/// Locks the shared document, recovering the tree if a holder panicked.
pub fn lock_document(document: &SharedDocument) -> MutexGuard<'_, DocumentTree> {
    document.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for DocumentTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentTree {
    pub fn new() -> Self {
        Self {
            root: Computed {
                color: "#111827".to_string(),
                font_family: "Helvetica, Arial, sans-serif".to_string(),
                font_size: 16.0,
                bold: false,
                italic: false,
            },
            visible: None,
            offscreen: None,
        }
    }

    pub fn shared(self) -> SharedDocument {
        Arc::new(Mutex::new(self))
    }

    /// Replaces the visible preview. Handles to the previous mount go stale.
    pub fn mount(&mut self, node: Node) -> NodeHandle {
        let handle = NodeHandle::fresh();
        self.visible = Some(Mounted { handle, node });
        handle
    }

    pub fn preview(&self) -> Option<NodeHandle> {
        self.visible.as_ref().map(|m| m.handle)
    }

    fn find(&self, handle: NodeHandle) -> Option<(&Mounted, Layer)> {
        if let Some(m) = self.visible.as_ref().filter(|m| m.handle == handle) {
            return Some((m, Layer::Visible));
        }
        self.offscreen
            .as_ref()
            .filter(|m| m.handle == handle)
            .map(|m| (m, Layer::Offscreen))
    }

    pub fn layer_of(&self, handle: NodeHandle) -> Option<Layer> {
        self.find(handle).map(|(_, layer)| layer)
    }

    pub fn is_attached(&self, handle: NodeHandle) -> bool {
        self.find(handle).is_some()
    }

    pub fn node(&self, handle: NodeHandle) -> Option<&Node> {
        self.find(handle).map(|(m, _)| &m.node)
    }

    pub fn has_offscreen(&self) -> bool {
        self.offscreen.is_some()
    }

    /// Deep copy of an attached node with its interactive controls hidden.
    pub fn isolate(&self, handle: NodeHandle) -> Option<Node> {
        let mut clone = self.node(handle)?.clone();
        clone.hide_controls();
        Some(clone)
    }

    pub fn attach_offscreen(&mut self, node: Node) -> Result<NodeHandle, DocumentError> {
        if self.offscreen.is_some() {
            return Err(DocumentError::OffscreenSlotOccupied);
        }
        let handle = NodeHandle::fresh();
        self.offscreen = Some(Mounted { handle, node });
        debug!("Attached off-screen clone {:?}", handle);
        Ok(handle)
    }

    /// Removes the off-screen clone if `handle` still owns the slot.
    pub fn detach_offscreen(&mut self, handle: NodeHandle) -> Option<Node> {
        if self.offscreen.as_ref().map(|m| m.handle) != Some(handle) {
            return None;
        }
        debug!("Detached off-screen clone {:?}", handle);
        self.offscreen.take().map(|m| m.node)
    }

    /// Lays out an attached node at `width_px`, resolving inherited
    /// styles from the document root.
    pub fn snapshot(&self, handle: NodeHandle, width_px: f32) -> Option<Snapshot> {
        let (mounted, _) = self.find(handle)?;
        Some(layout_node(&mounted.node, &self.root, width_px))
    }

    pub fn preview_snapshot(&self) -> Option<Snapshot> {
        self.snapshot(self.preview()?, VIEWPORT_WIDTH_PX)
    }

    /// The preview as a static picture shows it: controls are left out,
    /// since nothing drawn into an image can be clicked.
    pub fn static_preview_snapshot(&self) -> Option<Snapshot> {
        let clone = self.isolate(self.preview()?)?;
        Some(layout_node(&clone, &self.root, VIEWPORT_WIDTH_PX))
    }
}
