//! Annotation tools and their style settings

use pdf_canvas_core::{Color, EngineConfig, ShapeKind, SignatureType, Size};
use serde::{Deserialize, Serialize};

/// The active tool
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Select,
    Text,
    Shape(ShapeKind),
    Draw,
    Signature,
}

impl Tool {
    /// Whether clicks may pick extracted source text
    pub fn picks_source_text(&self) -> bool {
        matches!(self, Tool::Select | Tool::Text)
    }
}

/// Style applied to newly created elements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolStyle {
    pub stroke_color: Color,
    pub fill_color: Option<Color>,
    pub stroke_width: f32,
    pub font_size: f32,
    pub font_family: String,
    pub text_color: Color,
}

impl ToolStyle {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            stroke_color: Color::BLACK,
            fill_color: None,
            stroke_width: config.default_stroke_width,
            font_size: config.default_font_size,
            font_family: config.default_font_family.clone(),
            text_color: Color::BLACK,
        }
    }
}

impl Default for ToolStyle {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Signature supplied by the host's signature dialog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignaturePayload {
    pub signature_type: SignatureType,
    /// Image data URL for drawn or uploaded signatures
    pub data: String,
    #[serde(default)]
    pub text: Option<String>,
    /// Placed size in document units
    pub size: Size,
}
