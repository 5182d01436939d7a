use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Authoritative in-memory record store, keyed by identifier.
///
/// Holds the full records, including fields the index does not store.
#[derive(Clone)]
pub struct InMemoryStore<T: Clone + Send + Sync + 'static> {
    records: Arc<DashMap<String, T>>,
}

impl<T: Clone + Send + Sync + 'static> InMemoryStore<T> {
    pub fn new() -> Self {
        Self {
            records: Arc::new(DashMap::new()),
        }
    }

    /// Insert or replace a record. Returns the previous one, if any.
    pub fn put(&self, id: impl Into<String>, record: T) -> Option<T> {
        let id = id.into();
        tracing::debug!(id = %id, "Record saved");
        self.records.insert(id, record)
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    /// Run `f` on an existing record while holding its entry.
    ///
    /// Returns `None` without calling `f` if there is no such record.
    pub fn update_with<R>(&self, id: &str, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut entry = self.records.get_mut(id)?;
        let result = f(entry.value_mut());
        tracing::debug!(id, "Record updated");
        Some(result)
    }

    /// Remove an existing record once `f` succeeds, holding its entry
    /// throughout. The record stays if `f` fails.
    pub fn remove_with<E>(
        &self,
        id: &str,
        f: impl FnOnce(&T) -> Result<(), E>,
    ) -> Option<Result<T, E>> {
        match self.records.entry(id.to_string()) {
            Entry::Occupied(entry) => Some(f(entry.get()).map(|()| {
                tracing::debug!(id, "Record deleted");
                entry.remove()
            })),
            Entry::Vacant(_) => None,
        }
    }

    pub fn remove(&self, id: &str) -> Option<T> {
        let removed = self.records.remove(id).map(|(_, record)| record);
        if removed.is_some() {
            tracing::debug!(id, "Record deleted");
        }
        removed
    }

    pub fn clear(&self) {
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T: Clone + Send + Sync + 'static> Default for InMemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}
