//! Redis Key Generator
//!
//! Maps cart identifiers onto the namespaced keys used in the store. Every
//! function returns `None` for a blank identifier so callers can skip the
//! store round trip instead of touching a malformed key.
//!
//! The literal prefixes are part of the wire format shared with existing
//! store populations and must not change.

/// Prefix shared by every cart-scoped key.
pub const CART_PREFIX: &str = "cart:";

const CODE_INDEX_PREFIX: &str = "cart:code:";
const USER_INDEX_PREFIX: &str = "cart:userId:";
const GUID_INDEX_PREFIX: &str = "cart:guid:";
const SITE_INDEX_PREFIX: &str = "cart:siteId:";

const PROMOTION_RESULT_SEGMENT: &str = ":promotionResult:";
const VOUCHER_RESULT_SEGMENT: &str = ":voucherResult:";

fn non_blank(value: &str) -> Option<&str> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

fn prefixed(prefix: &str, value: &str) -> Option<String> {
    non_blank(value).map(|value| format!("{prefix}{value}"))
}

/// Primary record key for a cart: `cart:<code>`.
pub fn cart_key(code: &str) -> Option<String> {
    prefixed(CART_PREFIX, code)
}

/// Self-index key for a cart code: `cart:code:<code>`.
pub fn code_index_key(code: &str) -> Option<String> {
    prefixed(CODE_INDEX_PREFIX, code)
}

/// Index key for carts owned by a user: `cart:userId:<user_id>`.
pub fn user_index_key(user_id: &str) -> Option<String> {
    prefixed(USER_INDEX_PREFIX, user_id)
}

/// Index key for carts carrying a guest guid: `cart:guid:<guid>`.
pub fn guid_index_key(guid: &str) -> Option<String> {
    prefixed(GUID_INDEX_PREFIX, guid)
}

/// Index key for carts belonging to a site: `cart:siteId:<site_id>`.
pub fn site_index_key(site_id: &str) -> Option<String> {
    prefixed(SITE_INDEX_PREFIX, site_id)
}

/// Key prefix under which all promotion results of a cart live.
pub fn promotion_result_prefix(cart_code: &str) -> Option<String> {
    cart_key(cart_code).map(|key| format!("{key}{PROMOTION_RESULT_SEGMENT}"))
}

/// Key of a single promotion result:
/// `cart:<cart_code>:promotionResult:<result_id>`.
pub fn promotion_result_key(cart_code: &str, result_id: &str) -> Option<String> {
    let result_id = non_blank(result_id)?;

    promotion_result_prefix(cart_code).map(|prefix| format!("{prefix}{result_id}"))
}

/// Key prefix under which all voucher results of a cart live.
pub fn voucher_result_prefix(cart_code: &str) -> Option<String> {
    cart_key(cart_code).map(|key| format!("{key}{VOUCHER_RESULT_SEGMENT}"))
}

/// Key of a single voucher result: `cart:<cart_code>:voucherResult:<id>`.
pub fn voucher_result_key(cart_code: &str, voucher_id: &str) -> Option<String> {
    let voucher_id = non_blank(voucher_id)?;

    voucher_result_prefix(cart_code).map(|prefix| format!("{prefix}{voucher_id}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cart_keys_use_literal_prefixes() {
        assert_eq!(cart_key("C1").as_deref(), Some("cart:C1"));
        assert_eq!(code_index_key("C1").as_deref(), Some("cart:code:C1"));
        assert_eq!(user_index_key("U1").as_deref(), Some("cart:userId:U1"));
        assert_eq!(guid_index_key("G1").as_deref(), Some("cart:guid:G1"));
        assert_eq!(site_index_key("S1").as_deref(), Some("cart:siteId:S1"));
    }

    #[test]
    fn promotion_result_key_nests_under_cart_key() {
        assert_eq!(
            promotion_result_key("C1", "8796093055021").as_deref(),
            Some("cart:C1:promotionResult:8796093055021")
        );
        assert_eq!(
            voucher_result_key("C1", "V1").as_deref(),
            Some("cart:C1:voucherResult:V1")
        );
    }

    #[test]
    fn blank_identifiers_produce_no_key() {
        for blank in ["", " ", "\t\n"] {
            assert!(cart_key(blank).is_none(), "cart key for {blank:?}");
            assert!(code_index_key(blank).is_none(), "code key for {blank:?}");
            assert!(user_index_key(blank).is_none(), "user key for {blank:?}");
            assert!(guid_index_key(blank).is_none(), "guid key for {blank:?}");
            assert!(site_index_key(blank).is_none(), "site key for {blank:?}");
            assert!(
                promotion_result_key(blank, "1").is_none(),
                "promotion key for {blank:?}"
            );
            assert!(
                promotion_result_key("C1", blank).is_none(),
                "promotion key for result {blank:?}"
            );
        }
    }

    #[test]
    fn keys_are_injective_over_distinct_identifiers() {
        let ids = ["a", "b", "ab", "a:b", "A", " a", "1"];
        let functions: [fn(&str) -> Option<String>; 5] = [
            cart_key,
            code_index_key,
            user_index_key,
            guid_index_key,
            site_index_key,
        ];

        for function in functions {
            for (i, left) in ids.iter().enumerate() {
                for right in ids.iter().skip(i + 1) {
                    assert_ne!(function(left), function(right), "{left} vs {right}");
                }
            }
        }
    }
}
