//! Cart Records

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a saved cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CartStatus {
    Created,
    OnValidation,
    Checked,
    Completed,
    Cancelled,
}

/// Serialized snapshot of a cart, stored whole at its primary key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartRecord {
    pub code: String,
    pub user_id: String,
    pub site_id: String,

    /// Set only for carts identified by a guest guid.
    #[serde(default)]
    pub guid: Option<String>,

    pub modified_at: Timestamp,

    /// Present when the cart was explicitly saved rather than being the
    /// user's active session cart.
    #[serde(default)]
    pub save_time: Option<Timestamp>,

    #[serde(default)]
    pub expiration_time: Option<Timestamp>,

    #[serde(default)]
    pub status: Option<CartStatus>,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// ISO 4217 currency code of the amounts below.
    #[serde(default)]
    pub currency: Option<String>,

    /// Cart total in minor units.
    #[serde(default)]
    pub total_price: u64,

    #[serde(default)]
    pub entries: Vec<CartEntryRecord>,
}

impl CartRecord {
    /// A new active cart with no entries.
    pub fn new(
        code: impl Into<String>,
        user_id: impl Into<String>,
        site_id: impl Into<String>,
        modified_at: Timestamp,
    ) -> Self {
        Self {
            code: code.into(),
            user_id: user_id.into(),
            site_id: site_id.into(),
            guid: None,
            modified_at,
            save_time: None,
            expiration_time: None,
            status: None,
            name: None,
            description: None,
            currency: None,
            total_price: 0,
            entries: Vec::new(),
        }
    }

    /// Whether this is a saved cart rather than an active one.
    pub fn is_saved(&self) -> bool {
        self.save_time.is_some()
    }

    /// Whether a saved cart has expired at `now` (inclusive).
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.is_saved() && self.expiration_time.is_some_and(|expires| expires <= now)
    }
}

/// Cart Entry Record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartEntryRecord {
    pub entry_number: u32,
    pub product_code: String,
    pub quantity: u64,

    /// Unit price in minor units.
    pub base_price: u64,

    /// Line total in minor units.
    pub total_price: u64,

    /// Store the entry is delivered to or picked up from, if any.
    #[serde(default)]
    pub point_of_service: Option<String>,

    #[serde(default = "saleable_default")]
    pub saleable: bool,
}

const fn saleable_default() -> bool {
    true
}

impl CartEntryRecord {
    pub fn new(entry_number: u32, product_code: impl Into<String>, quantity: u64) -> Self {
        Self {
            entry_number,
            product_code: product_code.into(),
            quantity,
            base_price: 0,
            total_price: 0,
            point_of_service: None,
            saleable: true,
        }
    }
}
