//! Authoritative element storage
//!
//! Elements are kept in insertion order, which doubles as z-order: the last
//! element is drawn on top and wins hit tests. Every mutation notifies
//! subscribers with the change and the full ordered element list.

use tracing::debug;

use crate::element::{Element, ElementId, ElementPatch, NewElement};
use crate::geometry::Bounds;
use crate::notify::{SubscriptionId, Subscribers};

/// What a store mutation did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Added,
    Updated,
    Removed,
    Cleared,
}

/// Notification payload for store subscribers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub kind: ChangeKind,
    pub ids: Vec<ElementId>,
}

type StoreListener = dyn FnMut(&StoreChange, &[Element]);

/// Ordered collection of annotation elements
#[derive(Debug, Default)]
pub struct ElementStore {
    elements: Vec<Element>,
    listeners: Subscribers<StoreListener>,
}

impl ElementStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a change listener
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&StoreChange, &[Element]) + 'static,
    ) -> SubscriptionId {
        self.listeners.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Append a new element on top of the z-order and return its id
    pub fn add(&mut self, new: NewElement) -> ElementId {
        let element = Element::from_new(new);
        let id = element.id;
        debug!(%id, kind = ?element.kind(), page = element.page_index, "element added");
        self.elements.push(element);
        self.notify(ChangeKind::Added, vec![id]);
        id
    }

    /// Apply a partial update; a missing id or a kind-changing patch is a no-op
    pub fn update(&mut self, id: ElementId, patch: &ElementPatch) -> bool {
        let Some(element) = self.elements.iter_mut().find(|e| e.id == id) else {
            debug!(%id, "update ignored: no such element");
            return false;
        };
        if !element.apply(patch) {
            debug!(%id, "update ignored: properties do not match element kind");
            return false;
        }
        self.notify(ChangeKind::Updated, vec![id]);
        true
    }

    /// Move several elements by the same delta with a single notification
    pub fn translate(&mut self, ids: &[ElementId], dx: f32, dy: f32) -> usize {
        let mut moved = Vec::new();
        for element in self.elements.iter_mut().filter(|e| ids.contains(&e.id)) {
            let patch = ElementPatch::bounds(element.bounds.translated(dx, dy));
            if element.apply(&patch) {
                moved.push(element.id);
            }
        }
        let count = moved.len();
        if count > 0 {
            self.notify(ChangeKind::Updated, moved);
        }
        count
    }

    /// Remove elements; absent ids are skipped. Returns what was removed.
    pub fn remove(&mut self, ids: &[ElementId]) -> Vec<Element> {
        let mut removed = Vec::new();
        self.elements.retain(|element| {
            if ids.contains(&element.id) {
                removed.push(element.clone());
                false
            } else {
                true
            }
        });

        if removed.len() < ids.len() {
            debug!(
                requested = ids.len(),
                removed = removed.len(),
                "remove skipped unknown ids"
            );
        }
        if !removed.is_empty() {
            self.notify(ChangeKind::Removed, removed.iter().map(|e| e.id).collect());
        }
        removed
    }

    /// Clone elements with fresh ids and timestamps; `place` picks each copy's bounds
    ///
    /// Copies are appended after all existing elements, in the order of the
    /// originals' z-order.
    pub fn duplicate(
        &mut self,
        ids: &[ElementId],
        place: impl Fn(&Element) -> Bounds,
    ) -> Vec<ElementId> {
        let copies: Vec<Element> = self
            .elements
            .iter()
            .filter(|e| ids.contains(&e.id))
            .map(|e| {
                let mut new = e.to_new();
                new.bounds = place(e);
                Element::from_new(new)
            })
            .collect();

        let new_ids: Vec<ElementId> = copies.iter().map(|e| e.id).collect();
        if new_ids.is_empty() {
            debug!("duplicate ignored: no matching elements");
            return new_ids;
        }
        self.elements.extend(copies);
        self.notify(ChangeKind::Added, new_ids.clone());
        new_ids
    }

    /// Drop every element (document replaced)
    pub fn clear(&mut self) {
        if self.elements.is_empty() {
            return;
        }
        let ids = self.elements.iter().map(|e| e.id).collect();
        self.elements.clear();
        self.notify(ChangeKind::Cleared, ids);
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Elements on one page, bottom to top
    pub fn list_for_page(&self, page_index: usize) -> Vec<&Element> {
        self.elements
            .iter()
            .filter(|e| e.page_index == page_index)
            .collect()
    }

    /// All elements in z-order
    pub fn all(&self) -> &[Element] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn notify(&mut self, kind: ChangeKind, ids: Vec<ElementId>) {
        let change = StoreChange { kind, ids };
        for listener in self.listeners.iter_mut() {
            listener(&change, &self.elements);
        }
    }
}
