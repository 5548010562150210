//! App Context

use std::sync::Arc;

use thiserror::Error;

use crate::{
    domain::{
        carts::{CartQueries, CartsService, IndexOptions, StoreCartQueries, StoreCartsService},
        hooks::{CartHooks, HookRegistry, PromotionResultHooks, RecordKind, Records},
        promotions::{PromotionResultsService, StorePromotionResultsService},
    },
    store::{RecordStore, RedisRecordStore, StoreError},
};

#[derive(Debug, Error)]
pub enum AppInitError {
    #[error("failed to connect to redis")]
    Store(#[source] StoreError),
}

#[derive(Clone)]
pub struct AppContext {
    pub carts: Arc<dyn CartsService>,
    pub queries: Arc<dyn CartQueries>,
    pub promotion_results: Arc<dyn PromotionResultsService>,
    pub records: Records,
}

impl AppContext {
    /// Build application context from a Redis URL.
    ///
    /// # Errors
    ///
    /// Returns an error when establishing the Redis connection fails.
    pub async fn from_redis_url(url: &str, options: IndexOptions) -> Result<Self, AppInitError> {
        let store = RedisRecordStore::connect(url)
            .await
            .map_err(AppInitError::Store)?;

        Ok(Self::from_store(Arc::new(store), options))
    }

    /// Build application context over an existing record store, registering
    /// the cart and promotion-result hooks.
    pub fn from_store(store: Arc<dyn RecordStore>, options: IndexOptions) -> Self {
        let carts: Arc<dyn CartsService> = Arc::new(StoreCartsService::new(store.clone(), options));
        let promotion_results: Arc<dyn PromotionResultsService> =
            Arc::new(StorePromotionResultsService::new(store.clone()));

        let registry = HookRegistry::new()
            .with(RecordKind::Cart, Arc::new(CartHooks::new(carts.clone())))
            .with(
                RecordKind::PromotionResult,
                Arc::new(PromotionResultHooks::new(promotion_results.clone())),
            );

        Self {
            queries: Arc::new(StoreCartQueries::new(store)),
            records: Records::new(registry),
            carts,
            promotion_results,
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("records", &self.records)
            .finish_non_exhaustive()
    }
}
