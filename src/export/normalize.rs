// src/export/normalize.rs
//! Replaces colors the rasterizer cannot parse with plain fallbacks.

use crate::render::node::Node;
use crate::render::style::CssColor;

pub const FALLBACK_TEXT: &str = "#000000";
pub const FALLBACK_BACKGROUND: &str = "#ffffff";
pub const FALLBACK_BORDER: &str = "#e5e7eb";

fn patch(slot: &mut Option<CssColor>, fallback: &str) -> bool {
    match slot {
        Some(color) if !color.is_rasterizable() => {
            *slot = Some(CssColor::new(fallback));
            true
        }
        _ => false,
    }
}

/// Returns how many declarations were replaced.
pub fn normalize_colors(root: &mut Node) -> usize {
    let mut patched = 0;
    root.walk_mut(&mut |node| {
        let style = &mut node.style;
        patched += usize::from(patch(&mut style.color, FALLBACK_TEXT));
        patched += usize::from(patch(&mut style.background, FALLBACK_BACKGROUND));
        patched += usize::from(patch(&mut style.border_color, FALLBACK_BORDER));
    });
    patched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::style::Style;
    use crate::render::template::render_cv;
    use crate::types::CvRecord;

    #[test]
    fn test_unsupported_colors_replaced() {
        let mut node = Node::block()
            .styled(Style {
                color: Some(CssColor::new("oklch(27.8% 0.033 256.848)")),
                background: Some(CssColor::new("oklab(0.9 0 0)")),
                border_color: Some(CssColor::new("#123456")),
                ..Default::default()
            })
            .child(Node::text("x").styled(Style {
                border_color: Some(CssColor::new("lab(50% 40 59)")),
                ..Default::default()
            }));

        assert_eq!(normalize_colors(&mut node), 3);
        assert_eq!(node.style.color, Some(CssColor::new(FALLBACK_TEXT)));
        assert_eq!(node.style.background, Some(CssColor::new(FALLBACK_BACKGROUND)));
        assert_eq!(node.style.border_color, Some(CssColor::new("#123456")));
        assert_eq!(
            node.children[0].style.border_color,
            Some(CssColor::new(FALLBACK_BORDER))
        );
    }

    #[test]
    fn test_rendered_cv_is_rasterizable_after_normalizing() {
        let mut tree = render_cv(&CvRecord {
            name: "Jane Doe".to_string(),
            skills: "Rust, SQL".to_string(),
            ..Default::default()
        });
        assert!(normalize_colors(&mut tree) > 0);

        let mut leftovers = 0;
        tree.walk(&mut |node| {
            for color in [&node.style.color, &node.style.background, &node.style.border_color]
                .into_iter()
                .flatten()
            {
                if !color.is_rasterizable() {
                    leftovers += 1;
                }
            }
        });
        assert_eq!(leftovers, 0);
        assert_eq!(normalize_colors(&mut tree), 0);
    }
}
