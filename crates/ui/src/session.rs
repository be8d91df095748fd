//! Edit sessions
//!
//! At most one session is open at a time. A session holds the transient
//! state of a gesture until it is committed into the element store or
//! discarded.

use pdf_canvas_core::{Bounds, ElementId, Point, RunKey, ShapeKind, Size, TextProperties};

/// Average glyph width as a fraction of the font size
const AVERAGE_GLYPH_WIDTH: f32 = 0.6;

/// Spaces inserted for Tab
pub const TAB_INSERT: &str = "    ";

/// What a text editor writes back to on commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// A text element that does not exist yet
    New,
    /// A run of the source document, masked while edited
    SourceRun(RunKey),
    /// An existing text element
    Element(ElementId),
}

/// Inline text editor state
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditor {
    pub page_index: usize,
    /// Editor box in page-local document units
    pub bounds: Bounds,
    pub target: EditTarget,
    /// Text when the editor opened
    pub original: String,
    /// Draft text lives in `properties.text`
    pub properties: TextProperties,
    pub line_height_factor: f32,
}

impl TextEditor {
    pub fn draft(&self) -> &str {
        &self.properties.text
    }

    pub fn insert(&mut self, text: &str) {
        self.properties.text.push_str(text);
    }

    pub fn backspace(&mut self) {
        self.properties.text.pop();
    }

    pub fn is_blank(&self) -> bool {
        self.properties.text.trim().is_empty()
    }

    pub fn is_modified(&self) -> bool {
        self.properties.text != self.original
    }

    /// Box for the committed text
    ///
    /// Width grows to fit the longest line; height only grows for multi-line
    /// drafts, so an edited run is replaced exactly over its original box.
    pub fn committed_bounds(&self) -> Bounds {
        let size = self.properties.font_size;
        let lines: Vec<&str> = self.properties.text.lines().collect();
        let longest = lines.iter().map(|line| line.chars().count()).max().unwrap_or(0);

        let width = self.bounds.width.max(longest as f32 * size * AVERAGE_GLYPH_WIDTH);
        let height = if lines.len() > 1 {
            self.bounds
                .height
                .max(lines.len() as f32 * size * self.line_height_factor)
        } else {
            self.bounds.height
        };
        Bounds::new(self.bounds.x, self.bounds.y, width, height)
    }
}

/// The gesture in progress
#[derive(Debug, Clone, PartialEq)]
pub enum EditSession {
    CreatingShape {
        kind: ShapeKind,
        page_index: usize,
        /// Page top edge in stack space, to map moves that leave the page
        page_offset: f32,
        /// Points are clamped to this page rectangle
        page_size: Size,
        start: Point,
        current: Point,
    },
    DrawingPath {
        page_index: usize,
        page_offset: f32,
        page_size: Size,
        points: Vec<Point>,
    },
    EditingText(TextEditor),
}

impl EditSession {
    pub fn page_index(&self) -> usize {
        match self {
            EditSession::CreatingShape { page_index, .. }
            | EditSession::DrawingPath { page_index, .. } => *page_index,
            EditSession::EditingText(editor) => editor.page_index,
        }
    }

    pub fn text_editor(&self) -> Option<&TextEditor> {
        match self {
            EditSession::EditingText(editor) => Some(editor),
            _ => None,
        }
    }

    /// Box of a shape being dragged out
    pub fn shape_preview(&self) -> Option<(ShapeKind, Bounds)> {
        match self {
            EditSession::CreatingShape {
                kind, start, current, ..
            } => Some((*kind, Bounds::from_corners(*start, *current))),
            _ => None,
        }
    }
}
