//! Promotion results service.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::Arc,
};

use async_trait::async_trait;
use mockall::automock;

use crate::{
    domain::promotions::{
        errors::PromotionResultsServiceError,
        records::PromotionResultRecord,
        repository::StorePromotionResultsRepository,
    },
    keys,
    store::RecordStore,
};

#[derive(Clone)]
pub struct StorePromotionResultsService {
    store: Arc<dyn RecordStore>,
    repository: StorePromotionResultsRepository,
}

impl StorePromotionResultsService {
    #[must_use]
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            repository: StorePromotionResultsRepository::new(),
        }
    }
}

impl Debug for StorePromotionResultsService {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("StorePromotionResultsService")
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PromotionResultsService for StorePromotionResultsService {
    async fn save_result(
        &self,
        result: &PromotionResultRecord,
    ) -> Result<(), PromotionResultsServiceError> {
        let key = keys::promotion_result_key(&result.cart_code, &result.id)
            .ok_or(PromotionResultsServiceError::MissingKey)?;

        self.repository
            .put_result(&*self.store, &key, result)
            .await?;

        Ok(())
    }

    #[tracing::instrument(name = "promotions.service.delete_result", skip(self), err)]
    async fn delete_result(
        &self,
        cart_code: &str,
        id: &str,
    ) -> Result<bool, PromotionResultsServiceError> {
        let key = keys::promotion_result_key(cart_code, id)
            .ok_or(PromotionResultsServiceError::MissingKey)?;

        Ok(self.repository.delete_result(&*self.store, &key).await?)
    }

    async fn get_result(
        &self,
        cart_code: &str,
        id: &str,
    ) -> Result<Option<PromotionResultRecord>, PromotionResultsServiceError> {
        let Some(key) = keys::promotion_result_key(cart_code, id) else {
            return Ok(None);
        };

        Ok(self.repository.get_result(&*self.store, &key).await?)
    }

    async fn results_for_cart(
        &self,
        cart_code: &str,
    ) -> Result<Vec<PromotionResultRecord>, PromotionResultsServiceError> {
        let Some(prefix) = keys::promotion_result_prefix(cart_code) else {
            return Ok(Vec::new());
        };

        Ok(self
            .repository
            .results_for_cart(&*self.store, &prefix)
            .await?)
    }
}

#[automock]
#[async_trait]
pub trait PromotionResultsService: Send + Sync {
    /// Store a promotion result under its cart, replacing any previous value
    /// with the same id.
    async fn save_result(
        &self,
        result: &PromotionResultRecord,
    ) -> Result<(), PromotionResultsServiceError>;

    /// Delete one result, reporting whether it existed.
    async fn delete_result(
        &self,
        cart_code: &str,
        id: &str,
    ) -> Result<bool, PromotionResultsServiceError>;

    async fn get_result(
        &self,
        cart_code: &str,
        id: &str,
    ) -> Result<Option<PromotionResultRecord>, PromotionResultsServiceError>;

    /// All results stored for the cart.
    async fn results_for_cart(
        &self,
        cart_code: &str,
    ) -> Result<Vec<PromotionResultRecord>, PromotionResultsServiceError>;
}
