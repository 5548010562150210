//! Carts service errors.

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    #[error("cart has no code")]
    MissingCode,

    #[error("storage error")]
    Store(#[from] StoreError),
}
