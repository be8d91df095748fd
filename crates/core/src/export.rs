//! Element list export
//!
//! The engine hands its results to the host as a per-page element snapshot.
//! Writing them into a final document is the host's job.

use serde::{Deserialize, Serialize};

use crate::element::Element;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageExport {
    pub page_index: usize,
    /// Elements in z-order, bottom first
    pub elements: Vec<Element>,
}

/// Snapshot of every element, grouped by page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentExport {
    pub page_count: usize,
    pub pages: Vec<PageExport>,
}

impl DocumentExport {
    /// Group elements by page, keeping their relative z-order
    ///
    /// Every page gets an entry, even when it has no elements.
    pub fn from_elements(page_count: usize, elements: &[Element]) -> Self {
        let pages = (0..page_count)
            .map(|page_index| PageExport {
                page_index,
                elements: elements
                    .iter()
                    .filter(|element| element.page_index == page_index)
                    .cloned()
                    .collect(),
            })
            .collect();
        Self { page_count, pages }
    }

    pub fn element_count(&self) -> usize {
        self.pages.iter().map(|page| page.elements.len()).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
