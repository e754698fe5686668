use std::marker::PhantomData;

use anyhow::Result;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::store::json_store::KeyValueStore;

/// A persisted collection that is read once and written back whole.
pub trait Repository<T> {
    /// Never fails: a missing or unreadable value yields the empty collection.
    fn load(&self) -> T;
    fn save(&self, value: &T) -> Result<()>;
}

/// JSON-encoded value stored under a single key.
pub struct JsonRepository<S, T> {
    store: S,
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<S: KeyValueStore, T> JsonRepository<S, T> {
    pub fn new(store: S, key: &'static str) -> Self {
        Self {
            store,
            key,
            _marker: PhantomData,
        }
    }
}

impl<S, T> Repository<T> for JsonRepository<S, T>
where
    S: KeyValueStore,
    T: Serialize + DeserializeOwned + Default,
{
    fn load(&self) -> T {
        match self.store.get(self.key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(key = self.key, "discarding malformed stored value: {e}");
                    T::default()
                }
            },
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!(key = self.key, "failed to read stored value: {e:#}");
                T::default()
            }
        }
    }

    fn save(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        self.store.set(self.key, &json)?;
        tracing::debug!(key = self.key, bytes = json.len(), "saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::json_store::{JsonStore, MemoryStore};
    use tempfile::TempDir;

    #[test]
    fn absent_key_loads_empty() {
        let repo: JsonRepository<_, Vec<u32>> = JsonRepository::new(MemoryStore::new(), "ids");
        assert!(repo.load().is_empty());
    }

    #[test]
    fn malformed_json_loads_empty() {
        let store = MemoryStore::new();
        store.set("ids", "{not json").unwrap();
        let repo: JsonRepository<_, Vec<u32>> = JsonRepository::new(store, "ids");
        assert!(repo.load().is_empty());
    }

    #[test]
    fn save_then_load_through_files() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let repo: JsonRepository<_, Vec<u32>> = JsonRepository::new(store.clone(), "ids");
        repo.save(&vec![3, 1]).unwrap();

        let reopened: JsonRepository<_, Vec<u32>> = JsonRepository::new(store, "ids");
        assert_eq!(reopened.load(), vec![3, 1]);
    }
}
