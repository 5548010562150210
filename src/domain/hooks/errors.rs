//! Hook dispatch errors.

use thiserror::Error;

use crate::domain::{
    carts::CartsServiceError, hooks::registry::RecordKind,
    promotions::PromotionResultsServiceError,
};

#[derive(Debug, Error)]
pub enum HooksError {
    #[error("handler for {expected} records was given a {found} record")]
    KindMismatch {
        expected: RecordKind,
        found: RecordKind,
    },

    #[error("failed to persist cart")]
    Carts(#[from] CartsServiceError),

    #[error("failed to persist promotion result")]
    PromotionResults(#[from] PromotionResultsServiceError),
}
