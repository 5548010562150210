//! Carts

pub mod entries;
pub mod errors;
pub mod queries;
pub mod records;
mod repositories;
pub mod service;
pub mod sorting;

pub use errors::CartsServiceError;
pub use queries::*;
pub use service::*;
