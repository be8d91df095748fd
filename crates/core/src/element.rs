//! Annotation element data model
//!
//! An [`Element`] is one synthetic annotation placed on a page. Its kind is
//! never stored separately: it is derived from the [`ElementProperties`]
//! variant, so a text element always carries text properties, a draw element
//! always carries paths, and so on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::geometry::{Bounds, Color, Point};

/// Unique identifier for an element
///
/// Generated using UUID v4, stable for the element's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementId(Uuid);

impl ElementId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Discriminant of an element, derived from its properties
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Text,
    Rectangle,
    Circle,
    Line,
    Arrow,
    Draw,
    Image,
    Signature,
}

/// Shapes created by dragging out a box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
    Arrow,
}

impl From<ShapeKind> for ElementKind {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Rectangle => ElementKind::Rectangle,
            ShapeKind::Circle => ElementKind::Circle,
            ShapeKind::Line => ElementKind::Line,
            ShapeKind::Arrow => ElementKind::Arrow,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextProperties {
    pub text: String,
    /// Font size in document units
    pub font_size: f32,
    pub font_family: String,
    pub font_weight: String,
    pub color: Color,
    pub alignment: TextAlignment,
}

impl TextProperties {
    pub fn new(text: impl Into<String>, font_size: f32, font_family: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size,
            font_family: font_family.into(),
            font_weight: "normal".to_string(),
            color: Color::BLACK,
            alignment: TextAlignment::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeProperties {
    pub stroke_width: f32,
    pub stroke_color: Color,
    /// `None` renders a transparent interior
    pub fill_color: Option<Color>,
    /// Line dash pattern (empty for solid line)
    #[serde(default)]
    pub dash_pattern: Vec<f32>,
    /// Lines and arrows run from the left edge unless flipped
    #[serde(default)]
    pub flip_x: bool,
    /// Lines and arrows run from the top edge unless flipped
    #[serde(default)]
    pub flip_y: bool,
}

impl ShapeProperties {
    pub fn new(stroke_width: f32, stroke_color: Color) -> Self {
        Self {
            stroke_width,
            stroke_color,
            fill_color: None,
            dash_pattern: Vec::new(),
            flip_x: false,
            flip_y: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawProperties {
    /// Freehand strokes, relative to the element's bounds origin
    pub paths: Vec<Vec<Point>>,
    pub stroke_width: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageProperties {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureType {
    Drawn,
    Typed,
    Uploaded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureProperties {
    pub signature_type: SignatureType,
    /// Image data URL for drawn/uploaded signatures
    pub data: String,
    /// Rendered text for typed signatures
    #[serde(default)]
    pub text: Option<String>,
    pub stroke_width: f32,
    pub color: Color,
}

/// Type-specific payload of an element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementProperties {
    Text(TextProperties),
    Shape {
        kind: ShapeKind,
        #[serde(flatten)]
        style: ShapeProperties,
    },
    Draw(DrawProperties),
    Image(ImageProperties),
    Signature(SignatureProperties),
}

impl ElementProperties {
    pub fn kind(&self) -> ElementKind {
        match self {
            ElementProperties::Text(_) => ElementKind::Text,
            ElementProperties::Shape { kind, .. } => (*kind).into(),
            ElementProperties::Draw(_) => ElementKind::Draw,
            ElementProperties::Image(_) => ElementKind::Image,
            ElementProperties::Signature(_) => ElementKind::Signature,
        }
    }

    pub fn as_text(&self) -> Option<&TextProperties> {
        match self {
            ElementProperties::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// A new element before the store assigns id and timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewElement {
    pub page_index: usize,
    pub bounds: Bounds,
    pub properties: ElementProperties,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Rotation in degrees
    #[serde(default)]
    pub rotation: f32,
}

fn default_true() -> bool {
    true
}

fn default_opacity() -> f32 {
    1.0
}

impl NewElement {
    /// Visible, unlocked, fully opaque element
    pub fn new(page_index: usize, bounds: Bounds, properties: ElementProperties) -> Self {
        Self {
            page_index,
            bounds,
            properties,
            visible: true,
            locked: false,
            opacity: 1.0,
            rotation: 0.0,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.properties.kind()
    }
}

/// A stored annotation element
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub page_index: usize,
    pub bounds: Bounds,
    pub properties: ElementProperties,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub visible: bool,
    pub locked: bool,
    pub opacity: f32,
    pub rotation: f32,
}

impl Element {
    /// Materialize a new element with a generated id and current timestamps
    pub fn from_new(new: NewElement) -> Self {
        let now = Utc::now();
        Self {
            id: ElementId::new(),
            page_index: new.page_index,
            bounds: new.bounds.normalized(),
            properties: new.properties,
            created_at: now,
            updated_at: now,
            visible: new.visible,
            locked: new.locked,
            opacity: new.opacity.clamp(0.0, 1.0),
            rotation: new.rotation,
        }
    }

    pub fn kind(&self) -> ElementKind {
        self.properties.kind()
    }

    /// Fields a caller would pass to recreate this element
    pub fn to_new(&self) -> NewElement {
        NewElement {
            page_index: self.page_index,
            bounds: self.bounds,
            properties: self.properties.clone(),
            visible: self.visible,
            locked: self.locked,
            opacity: self.opacity,
            rotation: self.rotation,
        }
    }

    /// Apply a partial update
    ///
    /// Returns `false` without touching the element when the patch would
    /// change the element's kind.
    pub fn apply(&mut self, patch: &ElementPatch) -> bool {
        if let Some(properties) = &patch.properties {
            if properties.kind() != self.kind() {
                return false;
            }
        }

        if let Some(bounds) = patch.bounds {
            self.bounds = bounds.normalized();
        }
        if let Some(properties) = &patch.properties {
            self.properties = properties.clone();
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity.clamp(0.0, 1.0);
        }
        if let Some(rotation) = patch.rotation {
            self.rotation = rotation;
        }
        self.updated_at = Utc::now();
        true
    }
}

/// Partial element update; `None` fields are left unchanged
///
/// There is no page index: an element stays on the page it
/// was created on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPatch {
    #[serde(default)]
    pub bounds: Option<Bounds>,
    #[serde(default)]
    pub properties: Option<ElementProperties>,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default)]
    pub locked: Option<bool>,
    #[serde(default)]
    pub opacity: Option<f32>,
    #[serde(default)]
    pub rotation: Option<f32>,
}

impl ElementPatch {
    pub fn bounds(bounds: Bounds) -> Self {
        Self {
            bounds: Some(bounds),
            ..Default::default()
        }
    }

    pub fn properties(properties: ElementProperties) -> Self {
        Self {
            properties: Some(properties),
            ..Default::default()
        }
    }
}
