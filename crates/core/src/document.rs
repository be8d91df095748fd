//! Document and page state
//!
//! The external renderer owns rasterization and text extraction. The engine
//! only tracks, per page, whether that work has finished and keeps the
//! results it needs: the viewport, an opaque raster handle and the text runs.
//! Pages become ready independently and in any order.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{EngineError, Result};
use crate::geometry::Size;
use crate::layout::DocumentLayout;
use crate::text_run::{TextRun, TextRunIndex};

/// Opaque reference to a page's raster surface, owned by the host
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RasterHandle(pub String);

impl RasterHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }
}

/// Identifies one loaded document
///
/// Every load produces a new handle so late page completions for a replaced
/// document can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentHandle(u64);

impl DocumentHandle {
    pub fn first() -> Self {
        Self(1)
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for DocumentHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// Renderer output for one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageInput {
    pub viewport: Size,
    pub raster: RasterHandle,
    #[serde(default)]
    pub text_runs: Vec<TextRun>,
}

/// Page rendering state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageState {
    /// Renderer has not delivered the page yet
    Pending,
    Ready,
    /// Rendering failed; the page stays non-interactive
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub index: usize,
    pub viewport: Size,
    pub raster: Option<RasterHandle>,
    pub text_runs: TextRunIndex,
    pub state: PageState,
}

impl Page {
    fn pending(index: usize) -> Self {
        Self {
            index,
            viewport: Size::default(),
            raster: None,
            text_runs: TextRunIndex::default(),
            state: PageState::Pending,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == PageState::Ready
    }
}

/// Pages of the loaded document plus their stacked layout
#[derive(Debug, Clone)]
pub struct Document {
    handle: DocumentHandle,
    pages: Vec<Page>,
    layout: DocumentLayout,
    gap: f32,
    current_visible_page: usize,
}

impl Document {
    /// Create a document whose pages are all still pending
    pub fn loading(handle: DocumentHandle, page_count: usize, gap: f32) -> Self {
        let mut document = Self {
            handle,
            pages: (0..page_count).map(Page::pending).collect(),
            layout: DocumentLayout::default(),
            gap,
            current_visible_page: 0,
        };
        document.rebuild_layout();
        document
    }

    /// Create a document from pages that are already rendered
    ///
    /// A page with an unusable viewport is recorded as failed instead of
    /// rejecting the whole document.
    pub fn from_pages(handle: DocumentHandle, inputs: Vec<PageInput>, gap: f32) -> Self {
        let mut document = Self::loading(handle, inputs.len(), gap);
        for (index, input) in inputs.into_iter().enumerate() {
            if let Err(err) = document.mark_ready(index, input) {
                warn!(%handle, page = index, error = %err, "page not usable");
            }
        }
        document
    }

    pub fn handle(&self) -> DocumentHandle {
        self.handle
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// `true` only for ready pages; pending and failed pages take no input
    pub fn is_page_available(&self, index: usize) -> bool {
        self.page(index).is_some_and(Page::is_ready)
    }

    pub fn layout(&self) -> &DocumentLayout {
        &self.layout
    }

    pub fn current_visible_page(&self) -> usize {
        self.current_visible_page
    }

    /// Returns `true` when the value changed
    pub fn set_current_visible_page(&mut self, index: usize) -> bool {
        let index = index.min(self.pages.len().saturating_sub(1));
        if index == self.current_visible_page {
            return false;
        }
        self.current_visible_page = index;
        true
    }

    /// Store renderer output for a page and make it interactive
    pub fn mark_ready(&mut self, index: usize, input: PageInput) -> Result<()> {
        let count = self.pages.len();
        let page = self
            .pages
            .get_mut(index)
            .ok_or(EngineError::PageOutOfRange { page: index, count })?;

        let Size { width, height } = input.viewport;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            let reason = format!("invalid viewport {}x{}", width, height);
            page.state = PageState::Failed(reason.clone());
            self.rebuild_layout();
            return Err(EngineError::PageRender {
                page: index,
                reason,
            });
        }

        page.viewport = input.viewport;
        page.raster = Some(input.raster);
        page.text_runs = TextRunIndex::new(input.text_runs);
        page.state = PageState::Ready;
        debug!(handle = %self.handle, page = index, runs = page.text_runs.len(), "page ready");
        self.rebuild_layout();
        Ok(())
    }

    /// Record a rendering failure; the page keeps a zero-height slot
    pub fn mark_failed(&mut self, index: usize, reason: impl Into<String>) -> Result<()> {
        let count = self.pages.len();
        let page = self
            .pages
            .get_mut(index)
            .ok_or(EngineError::PageOutOfRange { page: index, count })?;
        let reason = reason.into();
        warn!(handle = %self.handle, page = index, %reason, "page failed to render");
        page.state = PageState::Failed(reason);
        page.raster = None;
        page.text_runs = TextRunIndex::default();
        self.rebuild_layout();
        Ok(())
    }

    fn rebuild_layout(&mut self) {
        let viewports: Vec<Option<Size>> = self
            .pages
            .iter()
            .map(|page| page.is_ready().then_some(page.viewport))
            .collect();
        self.layout = DocumentLayout::new(&viewports, self.gap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(width: f32, height: f32) -> PageInput {
        PageInput {
            viewport: Size::new(width, height),
            raster: RasterHandle::new("raster"),
            text_runs: vec![TextRun::new("Hello", [12.0, 0.0, 0.0, 12.0, 10.0, 10.0], 30.0, 12.0)],
        }
    }

    #[test]
    fn test_loading_document_has_no_available_pages() {
        let document = Document::loading(DocumentHandle::first(), 3, 20.0);
        assert_eq!(document.page_count(), 3);
        assert!(!document.is_page_available(0));
        assert_eq!(document.layout().page_at(0.0), None);
    }

    #[test]
    fn test_pages_ready_out_of_order() {
        let mut document = Document::loading(DocumentHandle::first(), 2, 20.0);
        document.mark_ready(1, input(600.0, 800.0)).unwrap();
        assert!(document.is_page_available(1));
        assert_eq!(document.layout().page_offset(1), Some(20.0));

        document.mark_ready(0, input(600.0, 800.0)).unwrap();
        assert_eq!(document.layout().page_offset(1), Some(820.0));
        assert_eq!(document.page(0).unwrap().text_runs.len(), 1);
    }

    #[test]
    fn test_mark_failed_collapses_slot() {
        let mut document =
            Document::from_pages(DocumentHandle::first(), vec![input(600.0, 800.0); 2], 20.0);
        document.mark_failed(0, "corrupt stream").unwrap();
        assert_eq!(
            document.page(0).unwrap().state,
            PageState::Failed("corrupt stream".to_string())
        );
        assert!(!document.is_page_available(0));
        assert_eq!(document.layout().page_offset(1), Some(20.0));
    }

    #[test]
    fn test_invalid_viewport_fails_page() {
        let document = Document::from_pages(
            DocumentHandle::first(),
            vec![input(600.0, 800.0), input(0.0, 800.0)],
            20.0,
        );
        assert!(document.is_page_available(0));
        assert!(matches!(document.page(1).unwrap().state, PageState::Failed(_)));
    }

    #[test]
    fn test_out_of_range_page() {
        let mut document = Document::loading(DocumentHandle::first(), 1, 20.0);
        let err = document.mark_ready(4, input(10.0, 10.0)).unwrap_err();
        assert!(matches!(err, EngineError::PageOutOfRange { page: 4, count: 1 }));
    }

    #[test]
    fn test_visible_page_clamped() {
        let mut document = Document::loading(DocumentHandle::first(), 2, 20.0);
        assert!(!document.set_current_visible_page(0));
        assert!(document.set_current_visible_page(9));
        assert_eq!(document.current_visible_page(), 1);
    }

    #[test]
    fn test_handles_advance() {
        let first = DocumentHandle::first();
        assert_ne!(first, first.next());
        assert_eq!(first.next().to_string(), "doc#2");
    }
}
