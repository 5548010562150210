//! Promotion Results

mod errors;
pub mod records;
mod repository;
pub mod service;

pub use errors::PromotionResultsServiceError;
pub use service::*;
