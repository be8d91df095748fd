//! Screen ↔ document coordinate mapping
//!
//! Screen points are raw pointer positions in the host's client space. The
//! canvas container sits at `origin` in that space and is scrolled by
//! `scroll`; pages are stacked by [`DocumentLayout`] and scaled by `zoom`.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::layout::DocumentLayout;

/// View parameters shared by both mapping directions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub zoom: f32,
    /// Container scroll offset in screen pixels
    pub scroll: Point,
    /// Container bounding-box origin in screen pixels
    pub origin: Point,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            scroll: Point::default(),
            origin: Point::default(),
        }
    }
}

/// Result of mapping a screen point into a page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentPosition {
    /// Point relative to the owning page's top-left corner
    pub point: Point,
    /// `None` when the point falls in a gap or on a page that is not ready
    pub page_index: Option<usize>,
}

/// Page-independent document point (stack space, zoom removed)
pub fn screen_to_stack(screen: Point, view: &ViewTransform) -> Point {
    let zoom = effective_zoom(view.zoom);
    Point::new(
        (screen.x - view.origin.x + view.scroll.x) / zoom,
        (screen.y - view.origin.y + view.scroll.y) / zoom,
    )
}

/// Map a pointer position to a page-local document point
///
/// With an empty layout the point is returned unmodified on page 0.
pub fn screen_to_document(
    screen: Point,
    view: &ViewTransform,
    layout: &DocumentLayout,
) -> DocumentPosition {
    if layout.is_empty() {
        return DocumentPosition {
            point: screen,
            page_index: Some(0),
        };
    }

    let stack = screen_to_stack(screen, view);
    let page_index = layout.page_at(stack.y);
    let offset = page_index
        .and_then(|index| layout.page_offset(index))
        .unwrap_or(0.0);

    DocumentPosition {
        point: Point::new(stack.x, stack.y - offset),
        page_index,
    }
}

/// Re-express a stack-space point relative to a given page
pub fn stack_to_page(stack: Point, page_index: usize, layout: &DocumentLayout) -> Point {
    let offset = layout.page_offset(page_index).unwrap_or(0.0);
    Point::new(stack.x, stack.y - offset)
}

/// Exact inverse of [`screen_to_document`], used to place overlays and editors
pub fn document_to_screen(
    point: Point,
    page_index: usize,
    view: &ViewTransform,
    layout: &DocumentLayout,
) -> Point {
    if layout.is_empty() {
        return point;
    }
    let zoom = effective_zoom(view.zoom);
    let offset = layout.page_offset(page_index).unwrap_or(0.0);
    Point::new(
        point.x * zoom + view.origin.x - view.scroll.x,
        (point.y + offset) * zoom + view.origin.y - view.scroll.y,
    )
}

fn effective_zoom(zoom: f32) -> f32 {
    if zoom > 0.0 && zoom.is_finite() {
        zoom
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Size;

    fn single_page() -> DocumentLayout {
        DocumentLayout::new(&[Some(Size::new(600.0, 800.0))], 20.0)
    }

    fn two_pages() -> DocumentLayout {
        DocumentLayout::new(
            &[Some(Size::new(600.0, 800.0)), Some(Size::new(600.0, 600.0))],
            20.0,
        )
    }

    #[test]
    fn test_identity_mapping_single_page() {
        let pos = screen_to_document(
            Point::new(100.0, 150.0),
            &ViewTransform::default(),
            &single_page(),
        );
        assert_eq!(pos.point, Point::new(100.0, 150.0));
        assert_eq!(pos.page_index, Some(0));
    }

    #[test]
    fn test_second_page_mapping() {
        let pos = screen_to_document(
            Point::new(40.0, 850.0),
            &ViewTransform::default(),
            &two_pages(),
        );
        assert_eq!(pos.page_index, Some(1));
        assert_eq!(pos.point, Point::new(40.0, 30.0));
    }

    #[test]
    fn test_zoom_scroll_and_origin() {
        let view = ViewTransform {
            zoom: 2.0,
            scroll: Point::new(0.0, 1000.0),
            origin: Point::new(10.0, 50.0),
        };
        // content y = 690 - 50 + 1000 = 1640 → stack 820 → page 1 at y 0
        let pos = screen_to_document(Point::new(210.0, 690.0), &view, &two_pages());
        assert_eq!(pos.page_index, Some(1));
        assert_eq!(pos.point, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_empty_layout_fallback() {
        let layout = DocumentLayout::new(&[], 20.0);
        let view = ViewTransform {
            zoom: 3.0,
            ..Default::default()
        };
        let pos = screen_to_document(Point::new(7.0, 9.0), &view, &layout);
        assert_eq!(pos.point, Point::new(7.0, 9.0));
        assert_eq!(pos.page_index, Some(0));
    }

    #[test]
    fn test_gap_has_no_page() {
        let pos = screen_to_document(
            Point::new(40.0, 810.0),
            &ViewTransform::default(),
            &two_pages(),
        );
        assert_eq!(pos.page_index, None);
    }

    #[test]
    fn test_document_to_screen_inverts() {
        let layout = two_pages();
        let view = ViewTransform {
            zoom: 1.25,
            scroll: Point::new(16.0, 300.0),
            origin: Point::new(8.0, 64.0),
        };
        let screen = Point::new(320.0, 1200.0);
        let pos = screen_to_document(screen, &view, &layout);
        let page = pos.page_index.unwrap();
        let back = document_to_screen(pos.point, page, &view, &layout);
        assert!((back.x - screen.x).abs() < 1e-3);
        assert!((back.y - screen.y).abs() < 1e-3);
    }

    #[test]
    fn test_stack_to_page() {
        let layout = two_pages();
        assert_eq!(
            stack_to_page(Point::new(5.0, 830.0), 1, &layout),
            Point::new(5.0, 10.0)
        );
    }
}
