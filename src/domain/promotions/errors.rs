//! Promotion results service errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum PromotionResultsServiceError {
    #[error("promotion result has no cart code or id")]
    MissingKey,

    #[error("storage error")]
    Store(#[from] StoreError),
}
