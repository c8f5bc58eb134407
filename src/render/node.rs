// src/render/node.rs
use crate::render::style::Style;

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Children stacked vertically.
    Block,
    /// Children flowed left to right, wrapping.
    Row,
    /// Text with preserved line breaks, wrapped to the available width.
    Text(String),
    /// Circular picture from a `data:` URL.
    Image { src: String },
    /// Interactive element such as the export button.
    Control { label: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub kind: NodeKind,
    pub style: Style,
    pub children: Vec<Node>,
}

impl Node {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            style: Style::default(),
            children: Vec::new(),
        }
    }

    pub fn block() -> Self {
        Self::new(NodeKind::Block)
    }

    pub fn row() -> Self {
        Self::new(NodeKind::Row)
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(content.into()))
    }

    pub fn image(src: impl Into<String>) -> Self {
        Self::new(NodeKind::Image { src: src.into() })
    }

    pub fn control(label: impl Into<String>) -> Self {
        Self::new(NodeKind::Control {
            label: label.into(),
        })
    }

    pub fn styled(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    pub fn child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Pre-order visit of this node and every descendant.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.walk_mut(f);
        }
    }

    pub fn walk(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Hides every interactive control in this subtree.
    pub fn hide_controls(&mut self) {
        self.walk_mut(&mut |node| {
            if matches!(node.kind, NodeKind::Control { .. }) {
                node.style.hidden = true;
            }
        });
    }

    /// Visible text content in document order.
    pub fn visible_texts(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_texts(self, &mut out);
        out
    }
}

fn collect_texts(node: &Node, out: &mut Vec<String>) {
    if node.style.hidden {
        return;
    }
    match &node.kind {
        NodeKind::Text(text) => out.push(text.clone()),
        NodeKind::Control { label } => out.push(label.clone()),
        _ => {}
    }
    for child in &node.children {
        collect_texts(child, out);
    }
}
