//! Rediscart Domain Concerns

pub mod carts;
pub mod hooks;
pub mod promotions;
