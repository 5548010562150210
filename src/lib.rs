//! Rediscart
//!
//! Shopping carts kept as whole-value records in Redis, with set-based
//! secondary indexes on code, user, guest guid and site, and the lookup and
//! sweep queries built on intersecting them.

pub mod config;
pub mod context;
pub mod domain;
pub mod keys;
pub mod logging;
pub mod pagination;
pub mod store;

#[cfg(test)]
mod test;
