// src/render/style.rs
use serde::{Deserialize, Serialize};

/// Color functions the rasterizer's color parser rejects.
const UNSUPPORTED_COLOR_FUNCTIONS: &[&str] = &[
    "oklch(",
    "oklab(",
    "lab(",
    "lch(",
    "hwb(",
    "color(",
    "color-mix(",
];

/// A CSS color kept verbatim as written by the template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssColor(String);

impl CssColor {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Hex, `rgb()`, `rgba()`, `hsl()` and named colors pass; the newer
    /// color functions do not.
    pub fn is_rasterizable(&self) -> bool {
        is_rasterizable(&self.0)
    }
}

pub fn is_rasterizable(color: &str) -> bool {
    let normalized = color.trim().to_ascii_lowercase();
    !UNSUPPORTED_COLOR_FUNCTIONS
        .iter()
        .any(|func| normalized.starts_with(func))
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum Border {
    #[default]
    None,
    Bottom(f32),
    Left(f32),
    All(f32),
}

impl Border {
    pub fn top(&self) -> f32 {
        match self {
            Border::All(w) => *w,
            _ => 0.0,
        }
    }

    pub fn bottom(&self) -> f32 {
        match self {
            Border::All(w) | Border::Bottom(w) => *w,
            _ => 0.0,
        }
    }

    pub fn left(&self) -> f32 {
        match self {
            Border::All(w) | Border::Left(w) => *w,
            _ => 0.0,
        }
    }

    pub fn right(&self) -> f32 {
        self.top()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn xy(x: f32, y: f32) -> Self {
        Self {
            top: y,
            right: x,
            bottom: y,
            left: x,
        }
    }
}

/// Declared style of a node. `None` on an inherited property means
/// "take it from the parent".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Style {
    pub color: Option<CssColor>,
    pub background: Option<CssColor>,
    pub border_color: Option<CssColor>,
    pub border: Border,
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub padding: Edges,
    pub margin_bottom: f32,
    pub gap: f32,
    pub radius: f32,
    pub width: Option<f32>,
    pub height: Option<f32>,
    /// Takes the remaining width of a row.
    pub grow: bool,
    pub hidden: bool,
}

/// Inherited properties after cascading from the document root.
#[derive(Debug, Clone, PartialEq)]
pub struct Computed {
    pub color: String,
    pub font_family: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl Computed {
    pub fn inherit(&self, style: &Style) -> Computed {
        Computed {
            color: style
                .color
                .as_ref()
                .map(|c| c.as_str().to_string())
                .unwrap_or_else(|| self.color.clone()),
            font_family: style
                .font_family
                .clone()
                .unwrap_or_else(|| self.font_family.clone()),
            font_size: style.font_size.unwrap_or(self.font_size),
            bold: style.bold.unwrap_or(self.bold),
            italic: style.italic.unwrap_or(self.italic),
        }
    }
}

impl Default for Computed {
    fn default() -> Self {
        Self {
            color: "#000000".to_string(),
            font_family: "sans-serif".to_string(),
            font_size: 16.0,
            bold: false,
            italic: false,
        }
    }
}
