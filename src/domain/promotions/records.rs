//! Promotion Result Records

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a fired promotion did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromotionActionKind {
    OrderDiscount,
    EntryDiscount,
    ShippingDiscount,
    FreeGift,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionActionRecord {
    pub guid: String,
    pub kind: PromotionActionKind,

    /// Discount in minor units; zero for gifts.
    #[serde(default)]
    pub amount: u64,
}

/// Outcome of evaluating one promotion against a cart, stored under the
/// cart's key namespace and removed with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionResultRecord {
    pub id: String,
    pub cart_code: String,
    pub promotion_code: String,

    /// 1.0 for fired promotions, below that for potential ones.
    pub certainty: f32,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub actions: Vec<PromotionActionRecord>,
}

impl PromotionResultRecord {
    /// A fired result with a fresh id and no actions.
    pub fn new(cart_code: impl Into<String>, promotion_code: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            cart_code: cart_code.into(),
            promotion_code: promotion_code.into(),
            certainty: 1.0,
            message: None,
            actions: Vec::new(),
        }
    }

    /// Whether the promotion actually fired, as opposed to being close.
    pub fn is_fired(&self) -> bool {
        self.certainty >= 1.0
    }

    /// Sum of the discount amounts of every action.
    pub fn total_discount(&self) -> u64 {
        self.actions
            .iter()
            .fold(0_u64, |total, action| total.saturating_add(action.amount))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn new_results_are_fired_with_distinct_ids() {
        let first = PromotionResultRecord::new("C1", "P1");
        let second = PromotionResultRecord::new("C1", "P1");

        assert!(first.is_fired());
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn total_discount_sums_actions() {
        let mut result = PromotionResultRecord::new("C1", "P1");
        result.actions = vec![
            PromotionActionRecord {
                guid: "A1".to_owned(),
                kind: PromotionActionKind::OrderDiscount,
                amount: 250,
            },
            PromotionActionRecord {
                guid: "A2".to_owned(),
                kind: PromotionActionKind::FreeGift,
                amount: 0,
            },
        ];

        assert_eq!(result.total_discount(), 250);
    }

    #[test]
    fn serialises_with_camel_case_fields() -> TestResult {
        let mut result = PromotionResultRecord::new("C1", "P1");
        result.certainty = 0.5;

        let json = serde_json::to_value(&result)?;

        assert_eq!(json.get("cartCode").and_then(|v| v.as_str()), Some("C1"));
        assert_eq!(json.get("promotionCode").and_then(|v| v.as_str()), Some("P1"));
        assert!(!result.is_fired());

        Ok(())
    }
}
