//! Vertical page stacking
//!
//! Pages are laid out top to bottom in document units, each followed by a
//! fixed gap. A page that has not finished rendering (or failed) keeps its
//! slot in the stack but with zero height, so nothing can land on it.

use crate::geometry::Size;

/// Layout slot of one page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlot {
    /// Cumulative offset of the page's top edge
    pub offset: f32,
    pub width: f32,
    pub height: f32,
    pub available: bool,
}

impl PageSlot {
    fn contains_y(&self, y: f32) -> bool {
        self.available && y >= self.offset && y < self.offset + self.height
    }
}

/// Cumulative page offsets and page lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentLayout {
    gap: f32,
    slots: Vec<PageSlot>,
    total_height: f32,
    max_width: f32,
}

impl DocumentLayout {
    /// Build a layout from per-page viewports; `None` marks an unavailable page
    pub fn new(viewports: &[Option<Size>], gap: f32) -> Self {
        let mut slots = Vec::with_capacity(viewports.len());
        let mut offset = 0.0;
        let mut max_width: f32 = 0.0;

        for viewport in viewports {
            let (width, height, available) = match viewport {
                Some(size) => (size.width, size.height, true),
                None => (0.0, 0.0, false),
            };
            slots.push(PageSlot {
                offset,
                width,
                height,
                available,
            });
            max_width = max_width.max(width);
            offset += height + gap;
        }

        Self {
            gap,
            slots,
            total_height: offset,
            max_width,
        }
    }

    pub fn gap(&self) -> f32 {
        self.gap
    }

    pub fn page_count(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slot(&self, page_index: usize) -> Option<&PageSlot> {
        self.slots.get(page_index)
    }

    /// Top edge of a page in document units
    pub fn page_offset(&self, page_index: usize) -> Option<f32> {
        self.slots.get(page_index).map(|slot| slot.offset)
    }

    /// Height of the whole stack including the trailing gap
    pub fn total_height(&self) -> f32 {
        self.total_height
    }

    pub fn max_width(&self) -> f32 {
        self.max_width
    }

    /// Page owning a document-space y coordinate
    ///
    /// `y` beyond the stack clamps to the last page and `y` above it clamps to
    /// the first. Points inside an inter-page gap, or on a page whose slot is
    /// unavailable, have no owner.
    pub fn page_at(&self, y: f32) -> Option<usize> {
        let last = self.slots.len().checked_sub(1)?;
        if y >= self.total_height {
            return Some(last);
        }
        if y < 0.0 {
            return Some(0);
        }
        self.slots.iter().position(|slot| slot.contains_y(y))
    }

    /// Page considered "current" for a scroll position in screen pixels
    ///
    /// The first page whose midpoint (height plus gap, scaled by zoom) lies
    /// below `scroll_top` wins; past the end, the last page.
    pub fn visible_page_for_scroll(&self, scroll_top: f32, zoom: f32) -> usize {
        let mut cumulative = 0.0;
        for (index, slot) in self.slots.iter().enumerate() {
            let page_height = (slot.height + self.gap) * zoom;
            if scroll_top < cumulative + page_height / 2.0 {
                return index;
            }
            cumulative += page_height;
        }
        self.slots.len().saturating_sub(1)
    }

    /// Scrollable canvas size in screen pixels
    pub fn canvas_size(&self, zoom: f32) -> Size {
        Size::new(self.max_width * zoom, self.total_height * zoom)
    }
}
