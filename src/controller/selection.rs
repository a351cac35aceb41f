// src/controller/selection.rs

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;

use crate::utils::storage::KeyValueStore;

/// Set of selected entity ids, mirrored to the key-value store on every
/// change so a bulk selection survives leaving and reopening a page.
pub struct SelectionTracker {
    store: Arc<dyn KeyValueStore>,
    key: Option<String>,
    ids: BTreeSet<i64>,
}

impl SelectionTracker {
    /// Rehydrates from `key`. Missing or undecodable values start empty.
    /// Without a key the selection lives in memory only.
    pub fn load(store: Arc<dyn KeyValueStore>, key: Option<String>) -> Self {
        let ids = key
            .as_deref()
            .and_then(|k| match store.get(k) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!("Could not read selection {}: {}", k, e);
                    None
                }
            })
            .and_then(|value| serde_json::from_value::<BTreeSet<i64>>(value).ok())
            .unwrap_or_default();

        Self { store, key, ids }
    }

    pub fn toggle(&mut self, id: i64) {
        if !self.ids.remove(&id) {
            self.ids.insert(id);
        }
        self.persist();
    }

    /// Header checkbox: when every visible row is already selected the
    /// selection is cleared, otherwise it becomes exactly the visible rows.
    pub fn toggle_all(&mut self, visible: &[i64]) {
        let all_selected =
            !visible.is_empty() && visible.iter().all(|id| self.ids.contains(id));
        if all_selected || visible.is_empty() {
            self.clear();
            return;
        }
        self.ids = visible.iter().copied().collect();
        self.persist();
    }

    /// Empties the set and drops the stored copy.
    pub fn clear(&mut self) {
        self.ids.clear();
        if let Some(key) = &self.key {
            if let Err(e) = self.store.remove(key) {
                tracing::warn!("Could not clear selection {}: {}", key, e);
            }
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.ids.contains(&id)
    }

    /// Selected ids in ascending order.
    pub fn ids(&self) -> Vec<i64> {
        self.ids.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    fn persist(&self) {
        let Some(key) = &self.key else {
            return;
        };
        if let Err(e) = self.store.set(key, json!(self.ids)) {
            tracing::warn!("Could not persist selection {}: {}", key, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::storage::MemoryStore;

    fn tracker(store: &Arc<MemoryStore>) -> SelectionTracker {
        SelectionTracker::load(store.clone(), Some("sel".to_string()))
    }

    #[test]
    fn select_all_then_toggle_one_off() {
        let store = Arc::new(MemoryStore::new());
        let mut sel = tracker(&store);

        sel.toggle_all(&[1, 2, 3, 4]);
        assert_eq!(sel.ids(), vec![1, 2, 3, 4]);

        sel.toggle(3);
        assert_eq!(sel.ids(), vec![1, 2, 4]);
        assert_eq!(store.get("sel").unwrap(), Some(json!([1, 2, 4])));
    }

    #[test]
    fn select_all_twice_clears() {
        let store = Arc::new(MemoryStore::new());
        let mut sel = tracker(&store);
        sel.toggle_all(&[5, 6]);
        sel.toggle_all(&[5, 6]);
        assert!(sel.is_empty());
        assert_eq!(store.get("sel").unwrap(), None);
    }

    #[test]
    fn rehydrates_from_store() {
        let store = Arc::new(MemoryStore::new());
        store.set("sel", json!([9, 2])).unwrap();
        let sel = tracker(&store);
        assert_eq!(sel.ids(), vec![2, 9]);
        assert!(sel.contains(9));
    }

    #[test]
    fn garbage_in_store_starts_empty() {
        let store = Arc::new(MemoryStore::new());
        store.set("sel", json!({"not": "a list"})).unwrap();
        assert!(tracker(&store).is_empty());
    }
}
