//! Test Helpers

use jiff::{SignedDuration, Timestamp};

use crate::domain::carts::records::{CartRecord, CartStatus};

/// `minutes` past the Unix epoch.
pub(crate) fn at_minute(minutes: i64) -> Result<Timestamp, jiff::Error> {
    Timestamp::UNIX_EPOCH.checked_add(SignedDuration::from_mins(minutes))
}

/// An active cart last modified `minutes` past the epoch.
pub(crate) fn active_cart(
    code: &str,
    user_id: &str,
    site_id: &str,
    minutes: i64,
) -> Result<CartRecord, jiff::Error> {
    Ok(CartRecord::new(code, user_id, site_id, at_minute(minutes)?))
}

/// A saved cart, saved and last modified `minutes` past the epoch, with no
/// expiry.
pub(crate) fn saved_cart(
    code: &str,
    user_id: &str,
    site_id: &str,
    minutes: i64,
) -> Result<CartRecord, jiff::Error> {
    let mut cart = active_cart(code, user_id, site_id, minutes)?;

    cart.save_time = Some(cart.modified_at);
    cart.name = Some(format!("Saved cart {code}"));
    cart.status = Some(CartStatus::Created);

    Ok(cart)
}
