// src/render/mod.rs
//! Template rendering, the live document and its layout

pub mod document;
pub mod layout;
pub mod node;
pub mod style;
pub mod svg;
pub mod template;

pub use document::{
    lock_document, DocumentError, DocumentTree, Layer, NodeHandle, SharedDocument,
    VIEWPORT_WIDTH_PX,
};
pub use layout::{Paint, Snapshot};
pub use node::{Node, NodeKind};
pub use style::{CssColor, Style};
pub use template::render_cv;
