//! Record hook handlers backed by the domain services.

use std::{
    fmt::{self, Debug, Formatter},
    sync::Arc,
};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{
    carts::CartsService,
    hooks::{
        errors::HooksError,
        registry::{Record, RecordHooks, RecordKind},
    },
    promotions::PromotionResultsService,
};

/// Persists carts through the index-maintaining carts service.
#[derive(Clone)]
pub struct CartHooks {
    carts: Arc<dyn CartsService>,
}

impl CartHooks {
    #[must_use]
    pub fn new(carts: Arc<dyn CartsService>) -> Self {
        Self { carts }
    }
}

impl Debug for CartHooks {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CartHooks").finish_non_exhaustive()
    }
}

#[async_trait]
impl RecordHooks for CartHooks {
    async fn save(&self, record: &Record) -> Result<(), HooksError> {
        let Record::Cart(cart) = record else {
            return Err(HooksError::KindMismatch {
                expected: RecordKind::Cart,
                found: record.kind(),
            });
        };

        self.carts.save_cart(cart).await?;

        Ok(())
    }

    async fn remove(&self, record: &Record) -> Result<(), HooksError> {
        let Record::Cart(cart) = record else {
            return Err(HooksError::KindMismatch {
                expected: RecordKind::Cart,
                found: record.kind(),
            });
        };

        let removed = self.carts.remove_cart(cart).await?;

        debug!(code = %cart.code, found = removed.is_some(), "cart removed");

        Ok(())
    }
}

/// Persists promotion results under their cart's key namespace.
#[derive(Clone)]
pub struct PromotionResultHooks {
    results: Arc<dyn PromotionResultsService>,
}

impl PromotionResultHooks {
    #[must_use]
    pub fn new(results: Arc<dyn PromotionResultsService>) -> Self {
        Self { results }
    }
}

impl Debug for PromotionResultHooks {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromotionResultHooks").finish_non_exhaustive()
    }
}

#[async_trait]
impl RecordHooks for PromotionResultHooks {
    async fn save(&self, record: &Record) -> Result<(), HooksError> {
        let Record::PromotionResult(result) = record else {
            return Err(HooksError::KindMismatch {
                expected: RecordKind::PromotionResult,
                found: record.kind(),
            });
        };

        self.results.save_result(result).await?;

        Ok(())
    }

    async fn remove(&self, record: &Record) -> Result<(), HooksError> {
        let Record::PromotionResult(result) = record else {
            return Err(HooksError::KindMismatch {
                expected: RecordKind::PromotionResult,
                found: record.kind(),
            });
        };

        self.results
            .delete_result(&result.cart_code, &result.id)
            .await?;

        Ok(())
    }
}
