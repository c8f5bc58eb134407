// src/render/template.rs
//! CV record to node tree. Pure: the same record always yields the same tree.

use crate::render::node::Node;
use crate::render::style::{Border, CssColor, Edges, Style};
use crate::types::CvRecord;

pub const EXPORT_BUTTON_LABEL: &str = "Download PDF";

// Theme tokens, written the way the stylesheet declares them.
const WHITE: &str = "#ffffff";
const GRAY_200: &str = "oklch(92.8% 0.006 264.531)";
const GRAY_500: &str = "oklch(55.1% 0.027 264.364)";
const GRAY_600: &str = "oklch(44.6% 0.03 256.802)";
const GRAY_700: &str = "oklch(37.3% 0.034 259.733)";
const GRAY_800: &str = "oklch(27.8% 0.033 256.848)";
const BLUE_100: &str = "oklch(93.2% 0.032 255.585)";
const BLUE_200: &str = "oklch(88.2% 0.059 254.128)";
const BLUE_600: &str = "oklch(54.6% 0.245 262.881)";
const BLUE_800: &str = "oklch(42.4% 0.199 265.638)";

const AVATAR_SIZE: f32 = 128.0;

fn color(value: &str) -> Option<CssColor> {
    Some(CssColor::new(value))
}

pub fn render_cv(record: &CvRecord) -> Node {
    let mut root = Node::block()
        .styled(Style {
            background: color(WHITE),
            padding: Edges::all(32.0),
            ..Default::default()
        })
        .child(export_button())
        .child(header(record));

    if !record.summary.is_empty() {
        root = root.child(section(
            "Professional Summary",
            Node::text(&record.summary).styled(body_text()),
        ));
    }

    root = root
        .child(section(
            "Education",
            bordered_or_placeholder(&record.education, "Your education details..."),
        ))
        .child(section(
            "Work Experience",
            bordered_or_placeholder(&record.experience, "Your experience details..."),
        ))
        .child(section("Skills", skills(record)));

    if !record.projects.is_empty() {
        root = root.child(section("Projects", bordered(&record.projects)));
    }
    if !record.certifications.is_empty() {
        root = root.child(section("Certifications", bordered(&record.certifications)));
    }

    root
}

fn export_button() -> Node {
    Node::control(EXPORT_BUTTON_LABEL).styled(Style {
        color: color(WHITE),
        background: color(BLUE_600),
        bold: Some(true),
        padding: Edges::xy(16.0, 8.0),
        radius: 8.0,
        margin_bottom: 24.0,
        ..Default::default()
    })
}

fn header(record: &CvRecord) -> Node {
    let avatar = if record.image.is_empty() {
        Node::block()
            .styled(Style {
                background: color(GRAY_200),
                border: Border::All(4.0),
                border_color: color(BLUE_100),
                radius: AVATAR_SIZE / 2.0,
                width: Some(AVATAR_SIZE),
                height: Some(AVATAR_SIZE),
                padding: Edges {
                    top: 48.0,
                    left: 16.0,
                    ..Default::default()
                },
                ..Default::default()
            })
            .child(Node::text("Upload Photo").styled(Style {
                color: color(GRAY_500),
                font_size: Some(14.0),
                ..Default::default()
            }))
    } else {
        Node::image(&record.image).styled(Style {
            border: Border::All(4.0),
            border_color: color(BLUE_100),
            radius: AVATAR_SIZE / 2.0,
            width: Some(AVATAR_SIZE),
            height: Some(AVATAR_SIZE),
            ..Default::default()
        })
    };

    let name = or_placeholder(&record.name, "Your Name");
    let title = or_placeholder(&record.title, "Professional Title");

    let mut details = Node::block()
        .styled(Style {
            grow: true,
            ..Default::default()
        })
        .child(Node::text(name).styled(Style {
            color: color(GRAY_800),
            font_size: Some(30.0),
            bold: Some(true),
            margin_bottom: 8.0,
            ..Default::default()
        }))
        .child(Node::text(title).styled(Style {
            color: color(GRAY_600),
            font_size: Some(18.0),
            margin_bottom: 12.0,
            ..Default::default()
        }));

    let contacts: Vec<Node> = [
        &record.email,
        &record.phone,
        &record.address,
        &record.linkedin,
    ]
    .into_iter()
    .filter(|value| !value.is_empty())
    .map(|value| {
        Node::text(value.as_str()).styled(Style {
            color: color(GRAY_700),
            ..Default::default()
        })
    })
    .collect();

    if !contacts.is_empty() {
        details = details.child(
            Node::row()
                .styled(Style {
                    gap: 16.0,
                    ..Default::default()
                })
                .children(contacts),
        );
    }

    Node::row()
        .styled(Style {
            gap: 24.0,
            margin_bottom: 32.0,
            ..Default::default()
        })
        .child(avatar)
        .child(details)
}

fn section(title: &str, content: Node) -> Node {
    Node::block()
        .styled(Style {
            margin_bottom: 32.0,
            ..Default::default()
        })
        .child(Node::text(title).styled(Style {
            color: color(GRAY_800),
            font_size: Some(20.0),
            bold: Some(true),
            border: Border::Bottom(2.0),
            border_color: color(BLUE_100),
            padding: Edges {
                bottom: 8.0,
                ..Default::default()
            },
            margin_bottom: 16.0,
            ..Default::default()
        }))
        .child(content)
}

fn body_text() -> Style {
    Style {
        color: color(GRAY_700),
        ..Default::default()
    }
}

fn bordered(text: &str) -> Node {
    Node::block()
        .styled(Style {
            border: Border::Left(4.0),
            border_color: color(BLUE_200),
            padding: Edges {
                left: 16.0,
                ..Default::default()
            },
            ..Default::default()
        })
        .child(Node::text(text).styled(body_text()))
}

fn bordered_or_placeholder(text: &str, placeholder: &str) -> Node {
    if text.is_empty() {
        placeholder_text(placeholder)
    } else {
        bordered(text)
    }
}

fn placeholder_text(text: &str) -> Node {
    Node::text(text).styled(Style {
        color: color(GRAY_500),
        italic: Some(true),
        ..Default::default()
    })
}

fn skills(record: &CvRecord) -> Node {
    let skills = record.skill_list();
    if skills.is_empty() {
        return placeholder_text("Your skills here...");
    }

    Node::row()
        .styled(Style {
            gap: 8.0,
            ..Default::default()
        })
        .children(skills.into_iter().map(|skill| {
            Node::block()
                .styled(Style {
                    background: color(BLUE_100),
                    color: color(BLUE_800),
                    font_size: Some(14.0),
                    bold: Some(true),
                    padding: Edges::xy(12.0, 4.0),
                    radius: 14.0,
                    ..Default::default()
                })
                .child(Node::text(skill))
        }))
}

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    if value.is_empty() {
        placeholder
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::node::NodeKind;

    fn sample() -> CvRecord {
        CvRecord {
            name: "Jane Doe".to_string(),
            title: "Staff Engineer".to_string(),
            email: "jane@example.com".to_string(),
            summary: "Builds things.".to_string(),
            skills: "A, B ,C".to_string(),
            ..Default::default()
        }
    }

    fn pill_texts(tree: &Node) -> Vec<String> {
        let mut pills = Vec::new();
        tree.walk(&mut |node| {
            if node.style.background == color(BLUE_100) {
                if let Some(Node {
                    kind: NodeKind::Text(text),
                    ..
                }) = node.children.first()
                {
                    pills.push(text.clone());
                }
            }
        });
        pills
    }

    #[test]
    fn test_render_is_pure() {
        let record = sample();
        assert_eq!(render_cv(&record), render_cv(&record));
    }

    #[test]
    fn test_skills_rendered_trimmed_in_order() {
        let tree = render_cv(&sample());
        assert_eq!(pill_texts(&tree), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_record_shows_placeholders() {
        let texts = render_cv(&CvRecord::new()).visible_texts();
        for expected in [
            "Your Name",
            "Professional Title",
            "Upload Photo",
            "Your education details...",
            "Your experience details...",
            "Your skills here...",
        ] {
            assert!(texts.iter().any(|t| t == expected), "missing {expected}");
        }
        assert!(!texts.iter().any(|t| t == "Professional Summary"));
        assert!(!texts.iter().any(|t| t == "Projects"));
        assert!(!texts.iter().any(|t| t == "Certifications"));
    }

    #[test]
    fn test_optional_sections_appear_when_filled() {
        let record = CvRecord {
            projects: "cv-builder".to_string(),
            certifications: "CKA".to_string(),
            ..sample()
        };
        let texts = render_cv(&record).visible_texts();
        for expected in [
            "Jane Doe",
            "Staff Engineer",
            "jane@example.com",
            "Professional Summary",
            "Builds things.",
            "Projects",
            "cv-builder",
            "Certifications",
            "CKA",
        ] {
            assert!(texts.iter().any(|t| t == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_photo_replaces_placeholder() {
        let record = CvRecord {
            image: "data:image/png;base64,AAAA".to_string(),
            ..Default::default()
        };
        let tree = render_cv(&record);
        let mut images = Vec::new();
        tree.walk(&mut |node| {
            if let NodeKind::Image { src } = &node.kind {
                images.push(src.clone());
            }
        });
        assert_eq!(images, vec!["data:image/png;base64,AAAA"]);
        assert!(!tree.visible_texts().iter().any(|t| t == "Upload Photo"));
    }

    #[test]
    fn test_export_button_is_a_control() {
        let tree = render_cv(&CvRecord::new());
        assert_eq!(
            tree.children[0].kind,
            NodeKind::Control {
                label: EXPORT_BUTTON_LABEL.to_string()
            }
        );
    }
}
