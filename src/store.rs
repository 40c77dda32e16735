//! In-memory keyed collections.
//!
//! Handles are cheap to clone and safe to share between concurrent requests;
//! each operation locks only the shard holding its key.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use uuid::Uuid;

pub struct Collection<T> {
    items: Arc<DashMap<Uuid, T>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self { items: Arc::clone(&self.items) }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Arc::new(DashMap::new()) }
    }
}

impl<T: Clone> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, id: Uuid, item: T) {
        self.items.insert(id, item);
    }

    pub fn get(&self, id: &Uuid) -> Option<T> {
        self.items.get(id).map(|entry| entry.value().clone())
    }

    /// Snapshot of every item matching `keep`.
    pub fn filter(&self, keep: impl Fn(&T) -> bool) -> Vec<T> {
        self.items.iter()
            .filter(|entry| keep(entry.value()))
            .map(|entry| entry.value().clone())
            .collect()
    }

    pub fn all(&self) -> Vec<T> {
        self.filter(|_| true)
    }

    /// Rewrites an existing item in place. Returns the new value, or `None`
    /// when `id` is unknown (nothing is inserted).
    pub fn update(&self, id: &Uuid, f: impl FnOnce(&mut T)) -> Option<T> {
        match self.items.entry(*id) {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Some(entry.get().clone())
            }
            Entry::Vacant(_) => None,
        }
    }

    pub fn remove(&self, id: &Uuid) -> Option<T> {
        self.items.remove(id).map(|(_, item)| item)
    }

    pub fn len(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
}
