//! Text occlusion
//!
//! While a source text run is being edited in place, its original glyphs must
//! not show through. The renderer asks this manager which runs are hidden and
//! paints an opaque patch over each one before compositing overlays.
//!
//! Every hidden run has a holder. An `Editing` hold lives exactly as long as
//! the edit session; a `Replaced` hold lives as long as the text element that
//! replaced the run. Nothing else can hide a run.

use std::collections::BTreeMap;

use crate::element::ElementId;
use crate::geometry::Bounds;
use crate::notify::{SubscriptionId, Subscribers};
use crate::text_run::TextRunIndex;

/// Identifies one text run in the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunKey {
    pub page_index: usize,
    pub run_index: usize,
}

impl RunKey {
    pub fn new(page_index: usize, run_index: usize) -> Self {
        Self {
            page_index,
            run_index,
        }
    }
}

/// Why a run is hidden
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OcclusionHolder {
    /// An edit session is open on the run
    Editing,
    /// A committed text element stands in for the run
    Replaced(ElementId),
}

type OcclusionListener = dyn FnMut(&[RunKey]);

#[derive(Debug, Default)]
pub struct TextOcclusionManager {
    hidden: BTreeMap<RunKey, OcclusionHolder>,
    listeners: Subscribers<OcclusionListener>,
}

impl TextOcclusionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Listener receives the full set of hidden keys after each change
    pub fn subscribe(&mut self, listener: impl FnMut(&[RunKey]) + 'static) -> SubscriptionId {
        self.listeners.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    pub fn hide(&mut self, key: RunKey, holder: OcclusionHolder) {
        if self.hidden.insert(key, holder) != Some(holder) {
            self.notify();
        }
    }

    /// Returns `true` if the run was hidden
    pub fn reveal(&mut self, key: RunKey) -> bool {
        let was_hidden = self.hidden.remove(&key).is_some();
        if was_hidden {
            self.notify();
        }
        was_hidden
    }

    pub fn is_hidden(&self, key: RunKey) -> bool {
        self.hidden.contains_key(&key)
    }

    pub fn holder(&self, key: RunKey) -> Option<OcclusionHolder> {
        self.hidden.get(&key).copied()
    }

    /// Reveal every run held by a removed replacement element
    pub fn release_element(&mut self, id: ElementId) -> Vec<RunKey> {
        let released: Vec<RunKey> = self
            .hidden
            .iter()
            .filter(|(_, holder)| **holder == OcclusionHolder::Replaced(id))
            .map(|(key, _)| *key)
            .collect();
        for key in &released {
            self.hidden.remove(key);
        }
        if !released.is_empty() {
            self.notify();
        }
        released
    }

    /// Drop all state (document replaced)
    pub fn clear(&mut self) {
        if !self.hidden.is_empty() {
            self.hidden.clear();
            self.notify();
        }
    }

    pub fn hidden_keys(&self) -> Vec<RunKey> {
        self.hidden.keys().copied().collect()
    }

    pub fn hidden_on_page(&self, page_index: usize) -> impl Iterator<Item = usize> + '_ {
        self.hidden
            .keys()
            .filter(move |key| key.page_index == page_index)
            .map(|key| key.run_index)
    }

    /// Opaque patches the renderer must paint over a page's raster surface
    pub fn patches(
        &self,
        page_index: usize,
        runs: &TextRunIndex,
        viewport_height: f32,
    ) -> Vec<Bounds> {
        self.hidden_on_page(page_index)
            .filter_map(|run_index| runs.get(run_index))
            .map(|run| run.document_box(viewport_height))
            .collect()
    }

    fn notify(&mut self) {
        let keys = self.hidden_keys();
        for listener in self.listeners.iter_mut() {
            listener(&keys);
        }
    }
}
