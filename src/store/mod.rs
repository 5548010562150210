//! Record Store
//!
//! The single I/O seam of the engine: whole-value get/set/delete plus the set
//! operations the secondary indexes are built from. Nothing here is
//! transactional; each call is an independent round trip, so a sequence of
//! calls may interleave with concurrent writers.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashSet;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

mod memory;
mod redis;

pub use memory::MemoryRecordStore;
pub use redis::RedisRecordStore;

/// Errors raised by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing Redis server rejected the command or the connection failed.
    #[error("redis backend error")]
    Backend(#[from] ::redis::RedisError),

    /// A stored value could not be encoded or decoded.
    #[error("record serialization failed")]
    Serialization(#[from] serde_json::Error),

    /// A value operation was issued against a set key or vice versa.
    #[error("operation against a key holding the wrong kind of value: {0}")]
    WrongType(String),
}

#[automock]
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Read the value stored at `key`.
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Store `value` at `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;

    /// Delete `key`, returning whether it existed.
    async fn delete(&self, key: &str) -> Result<bool, StoreError>;

    /// Add `member` to the set at `key`.
    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// Remove `member` from the set at `key`.
    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError>;

    /// All members of the set at `key`.
    async fn set_members(&self, key: &str) -> Result<FxHashSet<String>, StoreError>;

    /// Members present in every set named in `keys`. Empty when `keys` is.
    async fn set_intersect(&self, keys: &[String]) -> Result<FxHashSet<String>, StoreError>;

    /// Every key beginning with `prefix`.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Delete every key beginning with `prefix`, returning how many were removed.
    ///
    /// Enumerates first and deletes afterwards, so keys written concurrently
    /// may survive.
    async fn delete_with_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        let mut deleted = 0;

        for key in self.keys_with_prefix(prefix).await? {
            if self.delete(&key).await? {
                deleted += 1;
            }
        }

        Ok(deleted)
    }
}

/// Read and decode a JSON record stored at `key`.
pub(crate) async fn load_json<T>(store: &dyn RecordStore, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
{
    store
        .get(key)
        .await?
        .map(|value| serde_json::from_str(&value))
        .transpose()
        .map_err(StoreError::from)
}

/// Encode `record` as JSON and store it at `key`.
pub(crate) async fn store_json<T>(
    store: &dyn RecordStore,
    key: &str,
    record: &T,
) -> Result<(), StoreError>
where
    T: Serialize + Sync,
{
    let value = serde_json::to_string(record)?;

    store.set(key, value).await
}
