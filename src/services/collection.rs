use std::collections::HashSet;

use crate::models::Entity;

/// Ordered local cache of one entity type. Ids are unique within it.
#[derive(Debug, Clone)]
pub struct Collection<T: Entity> {
    items: Vec<T>,
}

impl<T: Entity> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Replaces everything with the server's view. Later duplicates are dropped.
    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = dedup_first(items);
    }

    /// Puts `item` at index 0, dropping any stale copy with the same id.
    pub fn prepend(&mut self, item: T) {
        self.items.retain(|existing| existing.id() != item.id());
        self.items.insert(0, item);
    }

    /// Puts a batch at the front, keeping the batch's own order.
    pub fn prepend_all(&mut self, batch: Vec<T>) {
        let batch = dedup_first(batch);
        let incoming: HashSet<&str> = batch.iter().map(|item| item.id()).collect();
        self.items.retain(|existing| !incoming.contains(existing.id()));
        self.items.splice(0..0, batch);
    }

    /// Swaps in a fresh copy of an entity already present. Returns false if absent.
    pub fn replace(&mut self, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => false,
        }
    }

    pub fn update<F: FnOnce(&mut T)>(&mut self, id: &str, f: F) -> bool {
        match self.items.iter_mut().find(|item| item.id() == id) {
            Some(item) => {
                f(item);
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        let index = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

fn dedup_first<T: Entity>(items: Vec<T>) -> Vec<T> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.id().to_string()))
        .collect()
}
