// src/render/svg.rs
use crate::render::layout::{Paint, Snapshot};

pub fn escape_xml(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Serializes a snapshot as a standalone SVG document in CSS pixels.
pub fn to_svg(snapshot: &Snapshot) -> String {
    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w:.2}\" height=\"{h:.2}\" viewBox=\"0 0 {w:.2} {h:.2}\">\n",
        w = snapshot.width,
        h = snapshot.height
    ));

    for (index, paint) in snapshot.paints.iter().enumerate() {
        match paint {
            Paint::Rect {
                x,
                y,
                width,
                height,
                radius,
                fill,
            } => {
                svg.push_str(&format!(
                    "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" fill=\"{}\"/>\n",
                    x,
                    y,
                    width,
                    height,
                    radius.min(width / 2.0).min(height / 2.0),
                    escape_xml(fill)
                ));
            }
            Paint::Outline {
                x,
                y,
                width,
                height,
                radius,
                stroke,
                stroke_width,
            } => {
                // Stroke is centered on the path; inset it to stay inside the box.
                let half = stroke_width / 2.0;
                let (w, h) = (width - stroke_width, height - stroke_width);
                svg.push_str(&format!(
                    "  <rect x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" rx=\"{:.2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{:.2}\"/>\n",
                    x + half,
                    y + half,
                    w,
                    h,
                    (radius - half).max(0.0).min(w / 2.0).min(h / 2.0),
                    escape_xml(stroke),
                    stroke_width
                ));
            }
            Paint::Text {
                x,
                y,
                size,
                bold,
                italic,
                color,
                family,
                content,
            } => {
                let mut attrs = String::new();
                if *bold {
                    attrs.push_str(" font-weight=\"bold\"");
                }
                if *italic {
                    attrs.push_str(" font-style=\"italic\"");
                }
                svg.push_str(&format!(
                    "  <text x=\"{:.2}\" y=\"{:.2}\" font-family=\"{}\" font-size=\"{:.2}\" fill=\"{}\"{}>{}</text>\n",
                    x,
                    y,
                    escape_xml(family),
                    size,
                    escape_xml(color),
                    attrs,
                    escape_xml(content)
                ));
            }
            Paint::Image { x, y, size, href } => {
                let r = size / 2.0;
                svg.push_str(&format!(
                    "  <clipPath id=\"clip{index}\"><circle cx=\"{:.2}\" cy=\"{:.2}\" r=\"{:.2}\"/></clipPath>\n",
                    x + r,
                    y + r,
                    r
                ));
                svg.push_str(&format!(
                    "  <image x=\"{:.2}\" y=\"{:.2}\" width=\"{:.2}\" height=\"{:.2}\" preserveAspectRatio=\"xMidYMid slice\" clip-path=\"url(#clip{index})\" href=\"{}\"/>\n",
                    x,
                    y,
                    size,
                    size,
                    escape_xml(href)
                ));
            }
        }
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("R&D <team> \"x\""), "R&amp;D &lt;team&gt; &quot;x&quot;");
    }

    #[test]
    fn test_svg_contains_every_paint() {
        let snapshot = Snapshot {
            width: 100.0,
            height: 50.0,
            paints: vec![
                Paint::Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 100.0,
                    height: 50.0,
                    radius: 0.0,
                    fill: "#ffffff".to_string(),
                },
                Paint::Text {
                    x: 1.0,
                    y: 20.0,
                    size: 16.0,
                    bold: true,
                    italic: false,
                    color: "#000000".to_string(),
                    family: "sans-serif".to_string(),
                    content: "Jane & co".to_string(),
                },
                Paint::Image {
                    x: 0.0,
                    y: 0.0,
                    size: 10.0,
                    href: "data:image/png;base64,AAAA".to_string(),
                },
            ],
        };
        let svg = to_svg(&snapshot);
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"100.00\""));
        assert!(svg.contains("fill=\"#ffffff\""));
        assert!(svg.contains("font-weight=\"bold\""));
        assert!(svg.contains(">Jane &amp; co</text>"));
        assert!(svg.contains("clip-path=\"url(#clip2)\""));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
