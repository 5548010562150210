//! In-process record store.

use async_trait::async_trait;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio::sync::RwLock;

use super::{RecordStore, StoreError};

#[derive(Debug, Clone)]
enum Entry {
    Value(String),
    Set(FxHashSet<String>),
}

/// Record store held in process memory.
///
/// Mirrors the Redis semantics the engine relies on: sets vanish once their
/// last member is removed, and value and set operations refuse keys of the
/// other kind.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    entries: RwLock<FxHashMap<String, Entry>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys currently held.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no keys at all.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match self.entries.read().await.get(key) {
            Some(Entry::Value(value)) => Ok(Some(value.clone())),
            Some(Entry::Set(_)) => Err(StoreError::WrongType(key.to_owned())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_owned(), Entry::Value(value));

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;

        match entries
            .entry(key.to_owned())
            .or_insert_with(|| Entry::Set(FxHashSet::default()))
        {
            Entry::Set(members) => {
                members.insert(member.to_owned());

                Ok(())
            }
            Entry::Value(_) => Err(StoreError::WrongType(key.to_owned())),
        }
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut entries = self.entries.write().await;

        let now_empty = match entries.get_mut(key) {
            Some(Entry::Set(members)) => {
                members.remove(member);
                members.is_empty()
            }
            Some(Entry::Value(_)) => return Err(StoreError::WrongType(key.to_owned())),
            None => false,
        };

        if now_empty {
            entries.remove(key);
        }

        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<FxHashSet<String>, StoreError> {
        match self.entries.read().await.get(key) {
            Some(Entry::Set(members)) => Ok(members.clone()),
            Some(Entry::Value(_)) => Err(StoreError::WrongType(key.to_owned())),
            None => Ok(FxHashSet::default()),
        }
    }

    async fn set_intersect(&self, keys: &[String]) -> Result<FxHashSet<String>, StoreError> {
        let entries = self.entries.read().await;

        let mut sets = Vec::with_capacity(keys.len());

        for key in keys {
            match entries.get(key) {
                Some(Entry::Set(members)) => sets.push(members),
                Some(Entry::Value(_)) => return Err(StoreError::WrongType(key.clone())),
                None => return Ok(FxHashSet::default()),
            }
        }

        sets.sort_by_key(|members| members.len());

        let Some((smallest, rest)) = sets.split_first() else {
            return Ok(FxHashSet::default());
        };

        Ok(smallest
            .iter()
            .filter(|member| rest.iter().all(|members| members.contains(*member)))
            .cloned()
            .collect())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .await
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect();

        keys.sort_unstable();

        Ok(keys)
    }
}
