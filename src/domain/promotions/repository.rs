//! Promotion Results Repository

use tracing::debug;

use crate::{
    domain::promotions::records::PromotionResultRecord,
    keys,
    store::{RecordStore, StoreError, load_json, store_json},
};

#[derive(Debug, Clone, Default)]
pub(crate) struct StorePromotionResultsRepository;

impl StorePromotionResultsRepository {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self
    }

    pub(crate) async fn get_result(
        &self,
        store: &dyn RecordStore,
        key: &str,
    ) -> Result<Option<PromotionResultRecord>, StoreError> {
        load_json(store, key).await
    }

    #[tracing::instrument(
        name = "promotions.repository.put_result",
        skip(self, store, result),
        fields(id = %result.id),
        err
    )]
    pub(crate) async fn put_result(
        &self,
        store: &dyn RecordStore,
        key: &str,
        result: &PromotionResultRecord,
    ) -> Result<(), StoreError> {
        store_json(store, key, result).await?;

        debug!(key, "promotion result saved");

        Ok(())
    }

    pub(crate) async fn delete_result(
        &self,
        store: &dyn RecordStore,
        key: &str,
    ) -> Result<bool, StoreError> {
        store.delete(key).await
    }

    /// Every result stored under the cart's promotion-result prefix, ordered
    /// by key.
    #[tracing::instrument(
        name = "promotions.repository.results_for_cart",
        skip(self, store),
        fields(result_count = tracing::field::Empty),
        err
    )]
    pub(crate) async fn results_for_cart(
        &self,
        store: &dyn RecordStore,
        prefix: &str,
    ) -> Result<Vec<PromotionResultRecord>, StoreError> {
        let mut results = Vec::new();

        for key in store.keys_with_prefix(prefix).await? {
            if let Some(result) = self.get_result(store, &key).await? {
                results.push(result);
            }
        }

        tracing::Span::current().record("result_count", results.len());

        Ok(results)
    }
}
