//! Element selection
//!
//! Selection is an ordered set of element ids. Ids are pruned whenever their
//! elements are removed, so the selection never refers to a missing element.
//! A text edit session is not part of the selection.

use crate::element::ElementId;
use crate::notify::{SubscriptionId, Subscribers};

type SelectionListener = dyn FnMut(&[ElementId]);

#[derive(Debug, Default)]
pub struct SelectionManager {
    ids: Vec<ElementId>,
    listeners: Subscribers<SelectionListener>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&[ElementId]) + 'static) -> SubscriptionId {
        self.listeners.subscribe(Box::new(listener))
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.unsubscribe(id)
    }

    /// Replace the selection (duplicates collapse, first occurrence wins)
    pub fn select(&mut self, ids: &[ElementId]) {
        let mut next: Vec<ElementId> = Vec::with_capacity(ids.len());
        for id in ids {
            if !next.contains(id) {
                next.push(*id);
            }
        }
        self.replace(next);
    }

    /// Add the id if absent, remove it if present
    pub fn toggle(&mut self, id: ElementId) {
        let mut next = self.ids.clone();
        if let Some(pos) = next.iter().position(|existing| *existing == id) {
            next.remove(pos);
        } else {
            next.push(id);
        }
        self.replace(next);
    }

    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    /// Drop ids whose elements no longer exist
    pub fn prune(&mut self, removed: &[ElementId]) {
        let next = self
            .ids
            .iter()
            .copied()
            .filter(|id| !removed.contains(id))
            .collect();
        self.replace(next);
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn replace(&mut self, next: Vec<ElementId>) {
        if next == self.ids {
            return;
        }
        self.ids = next;
        for listener in self.listeners.iter_mut() {
            listener(&self.ids);
        }
    }
}
