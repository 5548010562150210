//! Cart Index Repository
//!
//! Maintains the set-valued secondary indexes: one set per code, user, guid
//! and site value, each holding the codes of the carts carrying that value.

use smallvec::SmallVec;
use tracing::debug;

use crate::{
    domain::carts::records::CartRecord,
    keys,
    store::{RecordStore, StoreError},
};

type IndexKeys = SmallVec<[String; 4]>;

/// Keys of every index set `cart` should currently be a member of.
fn index_keys(cart: &CartRecord) -> IndexKeys {
    [
        keys::code_index_key(&cart.code),
        keys::user_index_key(&cart.user_id),
        cart.guid.as_deref().and_then(keys::guid_index_key),
        keys::site_index_key(&cart.site_id),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Keys `previous` is indexed under that `current` no longer is.
fn stale_index_keys(previous: &CartRecord, current: &CartRecord) -> IndexKeys {
    let current_keys = index_keys(current);

    index_keys(previous)
        .into_iter()
        .filter(|key| !current_keys.contains(key))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub(crate) struct StoreCartIndexesRepository;

impl StoreCartIndexesRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    /// Remove then re-add the cart's code in every index set for its current
    /// attribute values, so repeated saves leave membership unchanged.
    #[tracing::instrument(
        name = "carts.repository.reindex",
        skip(self, store, cart),
        fields(code = %cart.code, index_count = tracing::field::Empty),
        err
    )]
    pub(crate) async fn reindex(
        &self,
        store: &dyn RecordStore,
        cart: &CartRecord,
    ) -> Result<(), StoreError> {
        let index_keys = index_keys(cart);

        tracing::Span::current().record("index_count", index_keys.len());

        for key in &index_keys {
            store.set_remove(key, &cart.code).await?;
            store.set_add(key, &cart.code).await?;
        }

        Ok(())
    }

    /// Remove the cart's code from the index sets of attribute values it held
    /// in `previous` but no longer holds in `current`.
    #[tracing::instrument(
        name = "carts.repository.relocate",
        skip(self, store, previous, current),
        fields(code = %current.code, stale_count = tracing::field::Empty),
        err
    )]
    pub(crate) async fn relocate(
        &self,
        store: &dyn RecordStore,
        previous: &CartRecord,
        current: &CartRecord,
    ) -> Result<(), StoreError> {
        let stale_keys = stale_index_keys(previous, current);

        tracing::Span::current().record("stale_count", stale_keys.len());

        for key in &stale_keys {
            store.set_remove(key, &current.code).await?;

            debug!(key, "removed stale index entry");
        }

        Ok(())
    }

    /// Remove the cart's code from every index set derived from `cart`.
    #[tracing::instrument(
        name = "carts.repository.unindex",
        skip(self, store, cart),
        fields(code = %cart.code),
        err
    )]
    pub(crate) async fn unindex(
        &self,
        store: &dyn RecordStore,
        cart: &CartRecord,
    ) -> Result<(), StoreError> {
        for key in &index_keys(cart) {
            store.set_remove(key, &cart.code).await?;
        }

        Ok(())
    }

    /// Remove `code` from its own self-index set.
    pub(crate) async fn unindex_code(
        &self,
        store: &dyn RecordStore,
        code: &str,
    ) -> Result<(), StoreError> {
        if let Some(key) = keys::code_index_key(code) {
            store.set_remove(&key, code).await?;
        }

        Ok(())
    }

    /// Codes present in every index set in `index_keys`, sorted.
    ///
    /// A `None` key stands for a blank identifier and matches nothing.
    #[tracing::instrument(
        name = "carts.repository.candidates",
        skip(self, store),
        fields(candidate_count = tracing::field::Empty),
        err
    )]
    pub(crate) async fn candidates(
        &self,
        store: &dyn RecordStore,
        index_keys: &[Option<String>],
    ) -> Result<Vec<String>, StoreError> {
        let Some(index_keys) = index_keys.iter().cloned().collect::<Option<Vec<String>>>() else {
            return Ok(Vec::new());
        };

        let mut codes: Vec<String> = store.set_intersect(&index_keys).await?.into_iter().collect();

        codes.sort_unstable();

        tracing::Span::current().record("candidate_count", codes.len());

        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;

    use super::*;

    #[test]
    fn index_keys_skip_blank_attributes() {
        let mut cart = CartRecord::new("C1", "U1", " ", Timestamp::UNIX_EPOCH);

        assert_eq!(
            index_keys(&cart).into_vec(),
            vec!["cart:code:C1".to_owned(), "cart:userId:U1".to_owned()]
        );

        cart.guid = Some("G1".to_owned());
        cart.site_id = "S1".to_owned();

        assert_eq!(
            index_keys(&cart).into_vec(),
            vec![
                "cart:code:C1".to_owned(),
                "cart:userId:U1".to_owned(),
                "cart:guid:G1".to_owned(),
                "cart:siteId:S1".to_owned(),
            ]
        );
    }

    #[test]
    fn stale_keys_cover_only_changed_attributes() {
        let previous = CartRecord::new("C1", "U1", "S1", Timestamp::UNIX_EPOCH);
        let mut current = previous.clone();
        current.user_id = "U2".to_owned();

        assert_eq!(
            stale_index_keys(&previous, &current).into_vec(),
            vec!["cart:userId:U1".to_owned()]
        );
        assert!(stale_index_keys(&previous, &previous).is_empty());
    }
}
