//! Cart entry lookups over a resolved cart.

use crate::domain::carts::records::{CartEntryRecord, CartRecord};

/// Entries of `cart` for `product_code` delivered to `point_of_service`.
///
/// With no point of service only entries without one match; otherwise the
/// entry's point of service must be exactly the one given.
pub fn entries_for_product_and_point_of_service<'a>(
    cart: &'a CartRecord,
    product_code: &str,
    point_of_service: Option<&str>,
) -> Vec<&'a CartEntryRecord> {
    cart.entries
        .iter()
        .filter(|entry| entry.product_code == product_code)
        .filter(|entry| entry.point_of_service.as_deref() == point_of_service)
        .collect()
}

/// Entries of `cart` whose product can no longer be sold.
pub fn unsaleable_entries(cart: &CartRecord) -> Vec<&CartEntryRecord> {
    cart.entries.iter().filter(|entry| !entry.saleable).collect()
}
