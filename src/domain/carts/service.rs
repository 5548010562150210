//! Carts service.
//!
//! The write path: stores cart snapshots at their primary key and keeps the
//! code, user, guid and site index sets in step with them. Updates are applied
//! one store call at a time with no rollback, so a failure part way through
//! leaves the primary record and some index sets updated and others not.
//! Callers that need strict consistency must serialise writes per cart code.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use mockall::automock;
use tracing::{debug, warn};

use crate::{
    domain::carts::{
        errors::CartsServiceError,
        records::CartRecord,
        repositories::{StoreCartIndexesRepository, StoreCartsRepository},
    },
    store::{RecordStore, StoreError},
};

/// Tuning for index maintenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOptions {
    /// Read the stored cart before each save and drop its code from index
    /// sets for attribute values it no longer has. When disabled, a cart whose
    /// user, guid or site changes stays listed under the old value too.
    pub relocate_stale_entries: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            relocate_stale_entries: true,
        }
    }
}

#[derive(Clone)]
pub struct StoreCartsService {
    store: Arc<dyn RecordStore>,
    options: IndexOptions,
    carts_repository: StoreCartsRepository,
    indexes_repository: StoreCartIndexesRepository,
}

impl StoreCartsService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>, options: IndexOptions) -> Self {
        Self {
            store,
            options,
            carts_repository: StoreCartsRepository::new(),
            indexes_repository: StoreCartIndexesRepository::new(),
        }
    }

    /// Read the stored cart for index bookkeeping. A value that no longer
    /// decodes counts as absent, so the cart can still be overwritten or
    /// removed.
    async fn stored_cart(&self, code: &str) -> Result<Option<CartRecord>, CartsServiceError> {
        match self.carts_repository.get_cart(&*self.store, code).await {
            Ok(cart) => Ok(cart),
            Err(StoreError::Serialization(error)) => {
                warn!(code, %error, "ignoring undecodable stored cart");

                Ok(None)
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn remove(
        &self,
        code: &str,
        held: Option<&CartRecord>,
    ) -> Result<Option<CartRecord>, CartsServiceError> {
        if code.trim().is_empty() {
            return Err(CartsServiceError::MissingCode);
        }

        let store = &*self.store;

        // Index identities come from the stored value, so it is read before
        // the primary key disappears.
        let stored = self.stored_cart(code).await?;

        self.carts_repository.delete_cart(store, code).await?;

        match stored.as_ref().or(held) {
            Some(cart) => self.indexes_repository.unindex(store, cart).await?,
            None => self.indexes_repository.unindex_code(store, code).await?,
        }

        self.carts_repository.delete_sub_records(store, code).await?;

        Ok(stored)
    }
}

impl Debug for StoreCartsService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StoreCartsService")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CartsService for StoreCartsService {
    #[tracing::instrument(
        name = "carts.service.save_cart",
        skip(self, cart),
        fields(code = %cart.code),
        err
    )]
    async fn save_cart(&self, cart: &CartRecord) -> Result<(), CartsServiceError> {
        if cart.code.trim().is_empty() {
            return Err(CartsServiceError::MissingCode);
        }

        let store = &*self.store;

        let previous = if self.options.relocate_stale_entries {
            self.stored_cart(&cart.code).await?
        } else {
            None
        };

        self.carts_repository.put_cart(store, cart).await?;

        if let Some(previous) = previous {
            self.indexes_repository
                .relocate(store, &previous, cart)
                .await?;
        }

        self.indexes_repository.reindex(store, cart).await?;

        Ok(())
    }

    #[tracing::instrument(name = "carts.service.delete_cart", skip(self), err)]
    async fn delete_cart(&self, code: &str) -> Result<Option<CartRecord>, CartsServiceError> {
        let removed = self.remove(code, None).await?;

        debug!(found = removed.is_some(), "cart removed");

        Ok(removed)
    }

    #[tracing::instrument(
        name = "carts.service.remove_cart",
        skip(self, cart),
        fields(code = %cart.code),
        err
    )]
    async fn remove_cart(&self, cart: &CartRecord) -> Result<Option<CartRecord>, CartsServiceError> {
        self.remove(&cart.code, Some(cart)).await
    }

    async fn get_cart(&self, code: &str) -> Result<Option<CartRecord>, CartsServiceError> {
        Ok(self.carts_repository.get_cart(&*self.store, code).await?)
    }
}

#[automock]
#[async_trait]
pub trait CartsService: Send + Sync {
    /// Store the cart snapshot and bring its index memberships up to date.
    async fn save_cart(&self, cart: &CartRecord) -> Result<(), CartsServiceError>;

    /// Delete the cart with the given code together with its index
    /// memberships and every promotion or voucher result stored under it.
    ///
    /// Returns the record as it was stored, if there was one.
    async fn delete_cart(&self, code: &str) -> Result<Option<CartRecord>, CartsServiceError>;

    /// Like [`CartsService::delete_cart`], using `cart` to locate index
    /// entries when no stored record remains.
    async fn remove_cart(&self, cart: &CartRecord) -> Result<Option<CartRecord>, CartsServiceError>;

    /// Retrieve a single cart by code.
    async fn get_cart(&self, code: &str) -> Result<Option<CartRecord>, CartsServiceError>;
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use testresult::TestResult;

    use crate::{
        keys,
        store::{MockRecordStore, StoreError},
        test::{TestContext, active_cart},
    };

    use super::*;

    async fn members(ctx: &TestContext, key: Option<String>) -> Result<Vec<String>, StoreError> {
        let Some(key) = key else {
            return Ok(Vec::new());
        };

        let mut members: Vec<String> = ctx.store.set_members(&key).await?.into_iter().collect();
        members.sort();

        Ok(members)
    }

    #[tokio::test]
    async fn save_writes_primary_record_and_indexes() -> TestResult {
        let ctx = TestContext::new();
        let mut cart = active_cart("C1", "U1", "S1", 0)?;
        cart.guid = Some("G1".to_owned());

        ctx.carts.save_cart(&cart).await?;

        assert_eq!(ctx.carts.get_cart("C1").await?, Some(cart));

        for key in [
            keys::code_index_key("C1"),
            keys::user_index_key("U1"),
            keys::guid_index_key("G1"),
            keys::site_index_key("S1"),
        ] {
            assert_eq!(members(&ctx, key).await?, vec!["C1".to_owned()]);
        }

        Ok(())
    }

    #[tokio::test]
    async fn saving_twice_is_idempotent() -> TestResult {
        let ctx = TestContext::new();
        let cart = active_cart("C1", "U1", "S1", 0)?;

        ctx.carts.save_cart(&cart).await?;
        let keys_after_first = ctx.store.keys_with_prefix("cart:").await?;

        ctx.carts.save_cart(&cart).await?;

        assert_eq!(ctx.store.keys_with_prefix("cart:").await?, keys_after_first);
        assert_eq!(
            members(&ctx, keys::user_index_key("U1")).await?,
            vec!["C1".to_owned()]
        );

        Ok(())
    }

    #[tokio::test]
    async fn changing_user_moves_the_index_entry() -> TestResult {
        let ctx = TestContext::new();
        let mut cart = active_cart("C1", "U1", "S1", 0)?;

        ctx.carts.save_cart(&cart).await?;

        cart.user_id = "U2".to_owned();
        ctx.carts.save_cart(&cart).await?;

        assert!(members(&ctx, keys::user_index_key("U1")).await?.is_empty());
        assert_eq!(
            members(&ctx, keys::user_index_key("U2")).await?,
            vec!["C1".to_owned()]
        );

        Ok(())
    }

    #[tokio::test]
    async fn legacy_updates_leave_the_old_index_entry() -> TestResult {
        let ctx = TestContext::with_options(IndexOptions {
            relocate_stale_entries: false,
        });
        let mut cart = active_cart("C1", "U1", "S1", 0)?;

        ctx.carts.save_cart(&cart).await?;

        cart.user_id = "U2".to_owned();
        ctx.carts.save_cart(&cart).await?;

        assert_eq!(
            members(&ctx, keys::user_index_key("U1")).await?,
            vec!["C1".to_owned()]
        );
        assert_eq!(
            members(&ctx, keys::user_index_key("U2")).await?,
            vec!["C1".to_owned()]
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_record_indexes_and_sub_records() -> TestResult {
        let ctx = TestContext::new();
        let mut cart = active_cart("C1", "U1", "S1", 0)?;
        cart.guid = Some("G1".to_owned());

        ctx.carts.save_cart(&cart).await?;
        ctx.carts.save_cart(&active_cart("C10", "U1", "S1", 0)?).await?;

        ctx.store
            .set("cart:C1:promotionResult:1", "{}".to_owned())
            .await?;
        ctx.store
            .set("cart:C1:voucherResult:V1", "{}".to_owned())
            .await?;
        ctx.store
            .set("cart:C10:promotionResult:1", "{}".to_owned())
            .await?;

        let removed = ctx.carts.delete_cart("C1").await?;

        assert_eq!(removed, Some(cart));
        assert!(ctx.carts.get_cart("C1").await?.is_none());

        for key in [
            keys::code_index_key("C1"),
            keys::guid_index_key("G1"),
        ] {
            assert!(members(&ctx, key).await?.is_empty());
        }
        for key in [keys::user_index_key("U1"), keys::site_index_key("S1")] {
            assert_eq!(members(&ctx, key).await?, vec!["C10".to_owned()]);
        }

        assert!(ctx.store.get("cart:C1:promotionResult:1").await?.is_none());
        assert!(ctx.store.get("cart:C1:voucherResult:V1").await?.is_none());
        assert!(ctx.store.get("cart:C10:promotionResult:1").await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn remove_falls_back_to_held_record_for_index_cleanup() -> TestResult {
        let ctx = TestContext::new();
        let cart = active_cart("C1", "U1", "S1", 0)?;

        ctx.carts.save_cart(&cart).await?;
        ctx.store.delete("cart:C1").await?;

        let removed = ctx.carts.remove_cart(&cart).await?;

        assert!(removed.is_none());
        assert!(members(&ctx, keys::user_index_key("U1")).await?.is_empty());
        assert!(ctx.store.is_empty().await);

        Ok(())
    }

    #[tokio::test]
    async fn save_overwrites_an_undecodable_stored_value() -> TestResult {
        let ctx = TestContext::new();
        let cart = active_cart("C1", "U1", "S1", 0)?;

        ctx.store
            .set("cart:C1", "\u{ac}\u{ed}serialized-elsewhere".to_owned())
            .await?;

        ctx.carts.save_cart(&cart).await?;

        assert_eq!(ctx.carts.get_cart("C1").await?, Some(cart));
        assert_eq!(
            members(&ctx, keys::user_index_key("U1")).await?,
            vec!["C1".to_owned()]
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_an_undecodable_stored_value() -> TestResult {
        let ctx = TestContext::new();

        ctx.store.set("cart:C1", "not json".to_owned()).await?;
        ctx.store.set_add("cart:code:C1", "C1").await?;
        ctx.store
            .set("cart:C1:promotionResult:1", "{}".to_owned())
            .await?;

        assert!(ctx.carts.delete_cart("C1").await?.is_none());
        assert!(ctx.store.is_empty().await);

        Ok(())
    }

    #[tokio::test]
    async fn remove_uses_held_record_when_stored_value_is_undecodable() -> TestResult {
        let ctx = TestContext::new();
        let cart = active_cart("C1", "U1", "S1", 0)?;

        ctx.carts.save_cart(&cart).await?;
        ctx.store.set("cart:C1", "not json".to_owned()).await?;

        assert!(ctx.carts.remove_cart(&cart).await?.is_none());
        assert!(members(&ctx, keys::user_index_key("U1")).await?.is_empty());
        assert!(ctx.store.is_empty().await);

        Ok(())
    }

    #[tokio::test]
    async fn blank_code_is_rejected() -> TestResult {
        let ctx = TestContext::new();
        let cart = CartRecord::new(" ", "U1", "S1", Timestamp::UNIX_EPOCH);

        assert!(matches!(
            ctx.carts.save_cart(&cart).await,
            Err(CartsServiceError::MissingCode)
        ));
        assert!(matches!(
            ctx.carts.delete_cart("").await,
            Err(CartsServiceError::MissingCode)
        ));
        assert!(ctx.store.is_empty().await);

        Ok(())
    }

    #[tokio::test]
    async fn store_failure_surfaces_after_partial_update() -> TestResult {
        let mut store = MockRecordStore::new();

        store.expect_get().returning(|_| Ok(None));
        store.expect_set().once().returning(|_, _| Ok(()));
        store.expect_set_remove().returning(|_, _| Ok(()));
        store
            .expect_set_add()
            .once()
            .returning(|_, _| Err(StoreError::WrongType("cart:code:C1".to_owned())));

        let service = StoreCartsService::new(Arc::new(store), IndexOptions::default());

        let result = service
            .save_cart(&active_cart("C1", "U1", "S1", 0)?)
            .await;

        assert!(matches!(
            result,
            Err(CartsServiceError::Store(StoreError::WrongType(_)))
        ));

        Ok(())
    }
}
