//! Redis-backed record store.

use std::fmt::{Debug, Formatter, Result as FmtResult};

use ::redis::{AsyncCommands, Client, aio::ConnectionManager, cmd};
use async_trait::async_trait;
use rustc_hash::FxHashSet;
use tracing::debug;

use super::{RecordStore, StoreError};

/// Keys fetched per `SCAN` round trip.
const SCAN_BATCH: usize = 256;

/// Record store talking to a Redis server through a multiplexed,
/// auto-reconnecting connection.
#[derive(Clone)]
pub struct RedisRecordStore {
    connection: ConnectionManager,
}

impl RedisRecordStore {
    #[must_use]
    pub fn new(connection: ConnectionManager) -> Self {
        Self { connection }
    }

    /// Connect to the Redis server at `url`.
    ///
    /// # Errors
    ///
    /// Returns an error when the URL is malformed or the server is unreachable.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = Client::open(url)?;
        let connection = ConnectionManager::new(client).await?;

        debug!("connected to redis");

        Ok(Self::new(connection))
    }
}

impl Debug for RedisRecordStore {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RedisRecordStore").finish_non_exhaustive()
    }
}

/// Escape glob metacharacters so a literal prefix can be used in `MATCH`.
fn escape_pattern(literal: &str) -> String {
    let mut escaped = String::with_capacity(literal.len());

    for ch in literal.chars() {
        if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }

    escaped
}

#[async_trait]
impl RecordStore for RedisRecordStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut connection = self.connection.clone();

        let value: Option<String> = connection.get(key).await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();

        let _: () = connection.set(key, value).await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, StoreError> {
        let mut connection = self.connection.clone();

        let removed: u64 = connection.del(key).await?;

        Ok(removed > 0)
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();

        let _: u64 = connection.sadd(key, member).await?;

        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<(), StoreError> {
        let mut connection = self.connection.clone();

        let _: u64 = connection.srem(key, member).await?;

        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<FxHashSet<String>, StoreError> {
        let mut connection = self.connection.clone();

        let members: Vec<String> = connection.smembers(key).await?;

        Ok(members.into_iter().collect())
    }

    async fn set_intersect(&self, keys: &[String]) -> Result<FxHashSet<String>, StoreError> {
        if keys.is_empty() {
            return Ok(FxHashSet::default());
        }

        let mut connection = self.connection.clone();

        let members: Vec<String> = connection.sinter(keys.to_vec()).await?;

        Ok(members.into_iter().collect())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut connection = self.connection.clone();
        let pattern = format!("{}*", escape_pattern(prefix));

        let mut keys = Vec::new();
        let mut cursor: u64 = 0;

        loop {
            let (next, batch): (u64, Vec<String>) = cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut connection)
                .await?;

            keys.extend(batch);

            if next == 0 {
                break;
            }

            cursor = next;
        }

        // SCAN may yield a key more than once across iterations.
        keys.sort_unstable();
        keys.dedup();

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_pattern_protects_glob_metacharacters() {
        assert_eq!(escape_pattern("cart:C1:"), "cart:C1:");
        assert_eq!(escape_pattern("cart:a*b?[c]\\"), "cart:a\\*b\\?\\[c\\]\\\\");
    }
}
