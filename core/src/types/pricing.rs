use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, DefaultOnNull};

use super::enums::MoveType;

/// A computed cost breakdown.
///
/// `details` breaks the amount down; `next_term` is the pricing of the
/// following billing period. Both only point forward in time, so the
/// structure is a tree.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Pricing {
    pub id_subscription: Option<i64>,
    pub id_feature: Option<i64>,
    pub is_customer_billable: Option<bool>,
    pub label_localized: Option<String>,
    pub pricing_localized: Option<String>,
    pub date_period_start: Option<DateTime<Utc>>,
    pub date_period_term: Option<DateTime<Utc>>,
    pub type_move: Option<MoveType>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub amount_subtotal: i32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub amount_total: i32,
    pub details: Option<Vec<Pricing>>,
    pub next_term: Option<Box<Pricing>>,
}

impl Pricing {
    /// Iterate this pricing and every following term.
    pub fn terms(&self) -> impl Iterator<Item = &Pricing> {
        std::iter::successors(Some(self), |p| p.next_term.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_terms_deserialize() {
        let json = r#"{
            "AmountTotal": 0,
            "TypeMove": "SubscriptionTrial",
            "Details": [{"AmountTotal": 0, "TypeMove": 230}],
            "NextTerm": {
                "AmountTotal": 1900,
                "TypeMove": "SubscriptionRecurringAmount",
                "NextTerm": {"AmountTotal": 1900}
            }
        }"#;
        let pricing: Pricing = serde_json::from_str(json).unwrap();
        assert_eq!(pricing.type_move, Some(MoveType::SubscriptionTrial));
        assert_eq!(
            pricing.details.as_ref().unwrap()[0].type_move,
            Some(MoveType::SubscriptionTrial)
        );
        let totals: Vec<i32> = pricing.terms().map(|p| p.amount_total).collect();
        assert_eq!(totals, vec![0, 1900, 1900]);
    }

    #[test]
    fn null_members_fall_back_to_defaults() {
        let json = r#"{"IdSubscription": null, "IdFeature": null,
            "AmountSubtotal": null, "AmountTotal": null, "Details": null}"#;
        let pricing: Pricing = serde_json::from_str(json).unwrap();
        assert_eq!(pricing.id_subscription, None);
        assert_eq!(pricing.id_feature, None);
        assert_eq!(pricing.amount_total, 0);
        assert!(pricing.details.is_none());
    }
}
