//! Carts Repository

use tracing::{debug, warn};

use crate::{
    domain::carts::records::CartRecord,
    keys,
    store::{RecordStore, StoreError, load_json, store_json},
};

#[derive(Debug, Clone, Default)]
pub(crate) struct StoreCartsRepository;

impl StoreCartsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_cart(
        &self,
        store: &dyn RecordStore,
        code: &str,
    ) -> Result<Option<CartRecord>, StoreError> {
        let Some(key) = keys::cart_key(code) else {
            return Ok(None);
        };

        load_json(store, &key).await
    }

    #[tracing::instrument(
        name = "carts.repository.put_cart",
        skip(self, store, cart),
        fields(code = %cart.code),
        err
    )]
    pub(crate) async fn put_cart(
        &self,
        store: &dyn RecordStore,
        cart: &CartRecord,
    ) -> Result<bool, StoreError> {
        let Some(key) = keys::cart_key(&cart.code) else {
            return Ok(false);
        };

        store_json(store, &key, cart).await?;

        debug!(key, "cart saved");

        Ok(true)
    }

    pub(crate) async fn delete_cart(
        &self,
        store: &dyn RecordStore,
        code: &str,
    ) -> Result<bool, StoreError> {
        let Some(key) = keys::cart_key(code) else {
            return Ok(false);
        };

        let existed = store.delete(&key).await?;

        debug!(key, existed, "cart deleted");

        Ok(existed)
    }

    /// Load the carts behind `codes`, in order, skipping codes whose primary
    /// record no longer exists or no longer decodes.
    #[tracing::instrument(
        name = "carts.repository.resolve_carts",
        skip(self, store, codes),
        fields(
            candidate_count = codes.len(),
            dangling_count = tracing::field::Empty
        ),
        err
    )]
    pub(crate) async fn resolve_carts(
        &self,
        store: &dyn RecordStore,
        codes: &[String],
    ) -> Result<Vec<CartRecord>, StoreError> {
        let mut carts = Vec::with_capacity(codes.len());
        let mut dangling_count = 0_usize;

        for code in codes {
            match self.get_cart(store, code).await {
                Ok(Some(cart)) => carts.push(cart),
                Ok(None) => {
                    dangling_count += 1;

                    debug!(code, "skipping dangling index entry");
                }
                Err(StoreError::Serialization(error)) => {
                    warn!(code, %error, "skipping undecodable cart");
                }
                Err(error) => return Err(error),
            }
        }

        tracing::Span::current().record("dangling_count", dangling_count);

        Ok(carts)
    }

    /// Delete every promotion and voucher result stored under the cart's
    /// namespace.
    #[tracing::instrument(
        name = "carts.repository.delete_sub_records",
        skip(self, store),
        err
    )]
    pub(crate) async fn delete_sub_records(
        &self,
        store: &dyn RecordStore,
        code: &str,
    ) -> Result<usize, StoreError> {
        let prefixes = [
            keys::promotion_result_prefix(code),
            keys::voucher_result_prefix(code),
        ];

        let mut deleted = 0;

        for prefix in prefixes.iter().flatten() {
            deleted += store.delete_with_prefix(prefix).await?;
        }

        debug!(deleted, "deleted cart sub-records");

        Ok(deleted)
    }
}
