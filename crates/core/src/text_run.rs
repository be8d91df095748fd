//! Source-document text runs
//!
//! Text runs are extracted by the external renderer once a page's raster
//! surface is ready. They are read-only here: the engine only measures them
//! for hit testing, occlusion and in-place editing.

use serde::{Deserialize, Serialize};

use crate::geometry::Bounds;

/// Font size used when a run's transform carries no vertical scale
pub const FALLBACK_FONT_SIZE: f32 = 12.0;

/// Font family used when a run carries no font name
pub const FALLBACK_FONT_NAME: &str = "Arial";

/// A glyph run extracted from the source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    /// Affine transform `[a, b, c, d, e, f]` in the source's bottom-up space
    pub transform: [f32; 6],
    pub width: f32,
    pub height: f32,
    #[serde(default)]
    pub font_name: String,
}

impl TextRun {
    pub fn new(text: impl Into<String>, transform: [f32; 6], width: f32, height: f32) -> Self {
        Self {
            text: text.into(),
            transform,
            width,
            height,
            font_name: String::new(),
        }
    }

    pub fn with_font_name(mut self, font_name: impl Into<String>) -> Self {
        self.font_name = font_name.into();
        self
    }

    /// Box of this run in top-down document space
    ///
    /// The source origin sits at the baseline with y growing upwards, so the
    /// top edge is `viewport_height - f - height`.
    pub fn document_box(&self, viewport_height: f32) -> Bounds {
        let [_, _, _, _, e, f] = self.transform;
        Bounds::new(e, viewport_height - f - self.height, self.width, self.height)
    }

    /// Font size derived from the transform's vertical scale
    pub fn font_size(&self) -> f32 {
        let scale_y = self.transform[3].abs();
        if scale_y > 0.0 {
            scale_y
        } else {
            FALLBACK_FONT_SIZE
        }
    }

    pub fn font_family(&self) -> &str {
        if self.font_name.trim().is_empty() {
            FALLBACK_FONT_NAME
        } else {
            &self.font_name
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Read-only run list of one page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextRunIndex {
    runs: Vec<TextRun>,
}

impl TextRunIndex {
    pub fn new(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    pub fn get(&self, run_index: usize) -> Option<&TextRun> {
        self.runs.get(run_index)
    }

    pub fn runs(&self) -> &[TextRun] {
        &self.runs
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Iterate runs with their index and document-space box
    pub fn boxes(&self, viewport_height: f32) -> impl Iterator<Item = (usize, &TextRun, Bounds)> {
        self.runs
            .iter()
            .enumerate()
            .map(move |(index, run)| (index, run, run.document_box(viewport_height)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_box_flips_y() {
        let run = TextRun::new("Invoice", [12.0, 0.0, 0.0, 12.0, 72.0, 700.0], 48.0, 12.0);
        let b = run.document_box(792.0);
        assert_eq!(b, Bounds::new(72.0, 80.0, 48.0, 12.0));
    }

    #[test]
    fn test_font_size_and_fallbacks() {
        let run = TextRun::new("x", [10.0, 0.0, 0.0, -14.0, 0.0, 0.0], 5.0, 14.0);
        assert_eq!(run.font_size(), 14.0);
        assert_eq!(run.font_family(), FALLBACK_FONT_NAME);

        let flat = TextRun::new("x", [0.0; 6], 5.0, 5.0).with_font_name("Times-Roman");
        assert_eq!(flat.font_size(), FALLBACK_FONT_SIZE);
        assert_eq!(flat.font_family(), "Times-Roman");
    }

    #[test]
    fn test_blank_runs() {
        assert!(TextRun::new("   ", [0.0; 6], 1.0, 1.0).is_blank());
        assert!(!TextRun::new(" a ", [0.0; 6], 1.0, 1.0).is_blank());
    }

    #[test]
    fn test_index_boxes() {
        let index = TextRunIndex::new(vec![
            TextRun::new("a", [1.0, 0.0, 0.0, 10.0, 0.0, 90.0], 5.0, 10.0),
            TextRun::new("b", [1.0, 0.0, 0.0, 10.0, 20.0, 50.0], 5.0, 10.0),
        ]);
        let boxes: Vec<_> = index.boxes(100.0).map(|(i, _, b)| (i, b)).collect();
        assert_eq!(boxes[0], (0, Bounds::new(0.0, 0.0, 5.0, 10.0)));
        assert_eq!(boxes[1], (1, Bounds::new(20.0, 40.0, 5.0, 10.0)));
    }
}
