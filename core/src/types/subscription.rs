use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, DefaultOnNull};

use super::enums::{SubscriptionState, TimeUnit};
use super::feature::FeatureCharacteristics;
use super::list::Link;

/// A customer's live instantiation of an offer.
///
/// `state_subscription` is reported by the server and never computed here.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Subscription {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_customer: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_customer_buyer: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_offer: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_segment: i64,
    pub id_user_update: Option<i64>,
    pub reference_customer: Option<String>,
    pub reference_customer_buyer: Option<String>,
    pub reference_offer: Option<String>,
    pub reference_segment: Option<String>,
    pub state_subscription: Option<SubscriptionState>,
    pub title_localized: Option<String>,
    pub description_localized: Option<String>,

    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub amount_recurrence: i32,
    pub amount_up_front: Option<i32>,
    pub amount_termination: Option<i32>,
    pub amount_trial: Option<i32>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub duration_recurrence: i32,
    pub unit_recurrence: Option<TimeUnit>,
    pub duration_trial: Option<i32>,
    pub unit_trial: Option<TimeUnit>,
    pub count_recurrences: Option<i32>,
    pub count_min_recurrences: Option<i32>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub count_days_trial: i32,

    pub date_update: Option<DateTime<Utc>>,
    pub date_start: Option<DateTime<Utc>>,
    pub date_deadline: Option<DateTime<Utc>>,
    pub date_renewal: Option<DateTime<Utc>>,
    pub date_term: Option<DateTime<Utc>>,
    pub date_period_start: Option<DateTime<Utc>>,
    pub date_period_end: Option<DateTime<Utc>>,

    pub features: Option<Vec<SubscriptionFeature>>,
    pub links: Option<Vec<Link>>,
}

/// A feature as granted by one subscription.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SubscriptionFeature {
    #[serde(flatten)]
    pub characteristics: FeatureCharacteristics,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id: i64,
    pub title_localized: Option<String>,
    pub description_localized: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FeatureType;

    fn sample() -> Subscription {
        Subscription {
            id: 101,
            id_customer: 12,
            id_customer_buyer: 12,
            id_offer: 9,
            id_segment: 3,
            id_user_update: Some(1),
            reference_customer: Some("cust-42".to_string()),
            reference_customer_buyer: Some("cust-42".to_string()),
            reference_offer: Some("pro-monthly".to_string()),
            reference_segment: Some("default".to_string()),
            state_subscription: Some(SubscriptionState::Running),
            title_localized: Some("Pro".to_string()),
            description_localized: Some("Pro plan".to_string()),
            amount_recurrence: 1900,
            amount_up_front: Some(0),
            amount_termination: Some(500),
            amount_trial: Some(0),
            duration_recurrence: 1,
            unit_recurrence: Some(TimeUnit::Month),
            duration_trial: Some(14),
            unit_trial: Some(TimeUnit::Day),
            count_recurrences: None,
            count_min_recurrences: Some(3),
            count_days_trial: 14,
            date_update: Some("2024-03-01T10:00:00Z".parse().unwrap()),
            date_start: Some("2024-03-01T10:00:00Z".parse().unwrap()),
            date_deadline: None,
            date_renewal: Some("2024-04-01T10:00:00Z".parse().unwrap()),
            date_term: Some("2024-04-01T10:00:00Z".parse().unwrap()),
            date_period_start: Some("2024-03-01T10:00:00Z".parse().unwrap()),
            date_period_end: Some("2024-04-01T10:00:00Z".parse().unwrap()),
            features: Some(vec![SubscriptionFeature {
                characteristics: FeatureCharacteristics {
                    reference_feature: Some("seats".to_string()),
                    type_feature: Some(FeatureType::Limitation),
                    is_visible: true,
                    is_enabled: None,
                    is_included: Some(true),
                    quantity_current: Some(2),
                    quantity_included: Some(5),
                },
                id: 5,
                title_localized: Some("Seats".to_string()),
                description_localized: None,
            }]),
            links: Some(Vec::new()),
        }
    }

    #[test]
    fn roundtrip_preserves_all_fields() {
        let original = sample();
        let json = serde_json::to_string(&original).unwrap();
        let back: Subscription = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }

    #[test]
    fn state_is_serialized_by_name() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["StateSubscription"], "Running");
        assert_eq!(json["UnitTrial"], "Day");
        assert!(json.get("CountRecurrences").is_none());
    }

    #[test]
    fn sparse_payload_leaves_defaults() {
        let sub: Subscription = serde_json::from_str(r#"{"Id": 3}"#).unwrap();
        assert_eq!(sub.id, 3);
        assert_eq!(sub.state_subscription, None);
        assert_eq!(sub.features, None);
        assert_eq!(sub.amount_recurrence, 0);
    }
}
