// src/render/layout.rs
//! Block/row layout in CSS pixels producing a flat display list.
//!
//! Text metrics are estimated from the font size (no shaping), which is
//! enough to size the document and wrap paragraphs consistently between
//! the preview and the export.

use crate::render::node::{Node, NodeKind};
use crate::render::style::{Border, Computed};

pub const LINE_HEIGHT: f32 = 1.5;
const DEFAULT_BORDER_COLOR: &str = "#e5e7eb";
const DEFAULT_IMAGE_SIZE: f32 = 128.0;
const EPSILON: f32 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        fill: String,
    },
    Outline {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        radius: f32,
        stroke: String,
        stroke_width: f32,
    },
    /// `y` is the baseline.
    Text {
        x: f32,
        y: f32,
        size: f32,
        bold: bool,
        italic: bool,
        color: String,
        family: String,
        content: String,
    },
    Image {
        x: f32,
        y: f32,
        size: f32,
        href: String,
    },
}

impl Paint {
    pub fn color(&self) -> Option<&str> {
        match self {
            Paint::Rect { fill, .. } => Some(fill.as_str()),
            Paint::Outline { stroke, .. } => Some(stroke.as_str()),
            Paint::Text { color, .. } => Some(color.as_str()),
            Paint::Image { .. } => None,
        }
    }
}

/// A laid out subtree, ready to serialize or rasterize.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub width: f32,
    pub height: f32,
    pub paints: Vec<Paint>,
}

impl Snapshot {
    pub fn texts(&self) -> Vec<&str> {
        self.paints
            .iter()
            .filter_map(|p| match p {
                Paint::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }
}

pub fn layout_node(node: &Node, root: &Computed, width: f32) -> Snapshot {
    let mut layouter = Layouter::default();
    let height = layouter.layout(node, root, 0.0, 0.0, width);
    Snapshot {
        width,
        height: height.max(1.0),
        paints: layouter.paints,
    }
}

fn glyph_width(c: &Computed) -> f32 {
    c.font_size * if c.bold { 0.58 } else { 0.52 }
}

fn text_width(text: &str, c: &Computed) -> f32 {
    text.chars().count() as f32 * glyph_width(c)
}

/// Width of one source line with whitespace collapsed.
fn line_width(line: &str, c: &Computed) -> f32 {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return 0.0;
    }
    let chars: usize = words.iter().map(|w| w.chars().count()).sum::<usize>() + words.len() - 1;
    chars as f32 * glyph_width(c)
}

/// Line breaks are kept, runs of spaces collapse, long lines wrap at word
/// boundaries.
pub fn wrap_lines(text: &str, c: &Computed, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in text.split('\n') {
        let mut current = String::new();
        for word in raw.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = text_width(&current, c) + glyph_width(c) + text_width(word, c);
            if candidate > max_width + EPSILON {
                lines.push(std::mem::take(&mut current));
                current.push_str(word);
            } else {
                current.push(' ');
                current.push_str(word);
            }
        }
        lines.push(current);
    }
    lines
}

fn visible_children(node: &Node) -> impl Iterator<Item = &Node> {
    node.children.iter().filter(|child| !child.style.hidden)
}

/// Intrinsic width of a node, capped at `max_width`.
fn measure(node: &Node, parent: &Computed, max_width: f32) -> f32 {
    let st = &node.style;
    if st.hidden {
        return 0.0;
    }
    if let Some(width) = st.width {
        return width;
    }
    let c = parent.inherit(st);
    let extra = st.padding.left + st.padding.right + st.border.left() + st.border.right();
    let content = match &node.kind {
        NodeKind::Text(text) => text
            .split('\n')
            .map(|line| line_width(line, &c))
            .fold(0.0, f32::max),
        NodeKind::Control { label } => line_width(label, &c),
        NodeKind::Image { .. } => DEFAULT_IMAGE_SIZE,
        NodeKind::Block => visible_children(node)
            .map(|child| measure(child, &c, max_width - extra))
            .fold(0.0, f32::max),
        NodeKind::Row => {
            let widths: Vec<f32> = visible_children(node)
                .map(|child| measure(child, &c, max_width - extra))
                .collect();
            let gaps = st.gap * widths.len().saturating_sub(1) as f32;
            widths.iter().sum::<f32>() + gaps
        }
    };
    (content + extra).min(max_width)
}

#[derive(Default)]
struct Layouter {
    paints: Vec<Paint>,
}

impl Layouter {
    /// Lays out `node` with its top-left corner at (`x`, `y`); returns the
    /// border-box height.
    fn layout(&mut self, node: &Node, parent: &Computed, x: f32, y: f32, width: f32) -> f32 {
        let st = &node.style;
        if st.hidden {
            return 0.0;
        }
        let c = parent.inherit(st);
        let w = match (st.width, &node.kind) {
            (Some(w), _) => w,
            (None, NodeKind::Control { .. }) => measure(node, parent, width),
            _ => width,
        };

        let inner_x = x + st.border.left() + st.padding.left;
        let inner_y = y + st.border.top() + st.padding.top;
        let inner_w = (w
            - st.border.left()
            - st.border.right()
            - st.padding.left
            - st.padding.right)
            .max(0.0);

        let start = self.paints.len();
        let content_h = match &node.kind {
            NodeKind::Block => self.stack(node, &c, inner_x, inner_y, inner_w),
            NodeKind::Row => self.flow(node, &c, inner_x, inner_y, inner_w),
            NodeKind::Text(text) => self.text(text, &c, inner_x, inner_y, inner_w),
            NodeKind::Control { label } => self.text(label, &c, inner_x, inner_y, inner_w),
            NodeKind::Image { src } => {
                self.paints.push(Paint::Image {
                    x: inner_x,
                    y: inner_y,
                    size: inner_w,
                    href: src.clone(),
                });
                inner_w
            }
        };

        let h = st.height.unwrap_or(
            content_h + st.padding.top + st.padding.bottom + st.border.top() + st.border.bottom(),
        );

        let border_color = st
            .border_color
            .as_ref()
            .map(|c| c.as_str())
            .unwrap_or(DEFAULT_BORDER_COLOR)
            .to_string();

        let mut decoration = Vec::new();
        if let Some(background) = &st.background {
            decoration.push(Paint::Rect {
                x,
                y,
                width: w,
                height: h,
                radius: st.radius,
                fill: background.as_str().to_string(),
            });
        }
        match st.border {
            Border::Bottom(bw) => decoration.push(Paint::Rect {
                x,
                y: y + h - bw,
                width: w,
                height: bw,
                radius: 0.0,
                fill: border_color.clone(),
            }),
            Border::Left(bw) => decoration.push(Paint::Rect {
                x,
                y,
                width: bw,
                height: h,
                radius: 0.0,
                fill: border_color.clone(),
            }),
            Border::All(_) | Border::None => {}
        }
        self.paints.splice(start..start, decoration);

        // Drawn last so it sits on top of clipped pictures.
        if let Border::All(bw) = st.border {
            self.paints.push(Paint::Outline {
                x,
                y,
                width: w,
                height: h,
                radius: st.radius,
                stroke: border_color,
                stroke_width: bw,
            });
        }

        h
    }

    fn stack(&mut self, node: &Node, c: &Computed, x: f32, y: f32, width: f32) -> f32 {
        let mut cy = y;
        for (i, child) in visible_children(node).enumerate() {
            if i > 0 {
                cy += node.style.gap;
            }
            let h = self.layout(child, c, x, cy, width);
            cy += h + child.style.margin_bottom;
        }
        cy - y
    }

    fn flow(&mut self, node: &Node, c: &Computed, x: f32, y: f32, width: f32) -> f32 {
        let gap = node.style.gap;
        let (mut cx, mut cy, mut line_h) = (x, y, 0.0f32);
        for child in visible_children(node) {
            let natural = (!child.style.grow).then(|| measure(child, c, width));
            let needed = natural.unwrap_or(0.0);
            if cx > x && cx + needed > x + width + EPSILON {
                cx = x;
                cy += line_h + gap;
                line_h = 0.0;
            }
            let cw = natural.unwrap_or((x + width - cx).max(0.0));
            let h = self.layout(child, c, cx, cy, cw);
            line_h = line_h.max(h + child.style.margin_bottom);
            cx += cw + gap;
        }
        cy + line_h - y
    }

    fn text(&mut self, text: &str, c: &Computed, x: f32, y: f32, width: f32) -> f32 {
        let line_h = c.font_size * LINE_HEIGHT;
        let lines = wrap_lines(text, c, width);
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let baseline = y + i as f32 * line_h + (line_h - c.font_size) / 2.0 + c.font_size * 0.8;
            self.paints.push(Paint::Text {
                x,
                y: baseline,
                size: c.font_size,
                bold: c.bold,
                italic: c.italic,
                color: c.color.clone(),
                family: c.font_family.clone(),
                content: line.clone(),
            });
        }
        lines.len() as f32 * line_h
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::style::{CssColor, Edges, Style};

    fn base() -> Computed {
        Computed::default()
    }

    #[test]
    fn test_wrap_preserves_line_breaks() {
        let lines = wrap_lines("first line\n\nthird   line", &base(), 10_000.0);
        assert_eq!(lines, vec!["first line", "", "third line"]);
    }

    #[test]
    fn test_wrap_breaks_at_words() {
        // 16px * 0.52 = 8.32px per glyph; "alpha beta" is 10 glyphs.
        let lines = wrap_lines("alpha beta gamma", &base(), 90.0);
        assert_eq!(lines, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn test_text_height_counts_lines() {
        let node = Node::text("a\nb\nc");
        let snapshot = layout_node(&node, &base(), 500.0);
        assert_eq!(snapshot.height, 3.0 * 16.0 * LINE_HEIGHT);
        assert_eq!(snapshot.texts(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_block_stacks_with_margins_and_padding() {
        let node = Node::block()
            .styled(Style {
                padding: Edges::all(10.0),
                ..Default::default()
            })
            .child(Node::text("one").styled(Style {
                margin_bottom: 5.0,
                ..Default::default()
            }))
            .child(Node::text("two"));
        let snapshot = layout_node(&node, &base(), 300.0);
        assert_eq!(snapshot.height, 10.0 + 24.0 + 5.0 + 24.0 + 10.0);
    }

    #[test]
    fn test_hidden_nodes_take_no_space() {
        let mut node = Node::block()
            .child(Node::control("Download PDF").styled(Style {
                margin_bottom: 24.0,
                ..Default::default()
            }))
            .child(Node::text("Jane"));
        node.hide_controls();
        let snapshot = layout_node(&node, &base(), 300.0);
        assert_eq!(snapshot.height, 24.0);
        assert_eq!(snapshot.texts(), vec!["Jane"]);
    }

    #[test]
    fn test_row_wraps_children() {
        let pill = |label: &str| {
            Node::block()
                .styled(Style {
                    width: Some(100.0),
                    ..Default::default()
                })
                .child(Node::text(label))
        };
        let node = Node::row()
            .styled(Style {
                gap: 10.0,
                ..Default::default()
            })
            .children(vec![pill("a"), pill("b"), pill("c")]);
        let snapshot = layout_node(&node, &base(), 250.0);
        // Two pills fit on the first line, the third wraps.
        assert_eq!(snapshot.height, 24.0 + 10.0 + 24.0);
    }

    #[test]
    fn test_background_and_border_colors_emitted() {
        let node = Node::block()
            .styled(Style {
                background: Some(CssColor::new("#ffffff")),
                border: Border::Bottom(2.0),
                border_color: Some(CssColor::new("#000000")),
                ..Default::default()
            })
            .child(Node::text("x"));
        let snapshot = layout_node(&node, &base(), 100.0);
        let colors: Vec<_> = snapshot.paints.iter().filter_map(Paint::color).collect();
        assert_eq!(colors, vec!["#ffffff", "#000000", "#000000"]);
    }
}
