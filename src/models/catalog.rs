use serde::{Deserialize, Serialize};

use crate::models::TrackedItem;

/// Ordered list of tracked items, persisted as a bare JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Catalog {
    items: Vec<TrackedItem>,
}

impl Catalog {
    pub fn new(items: Vec<TrackedItem>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, item: TrackedItem) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[TrackedItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrackedItem> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, TrackedItem> {
        self.items.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
