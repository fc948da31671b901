use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, DefaultOnNull};

use super::enums::TimeUnit;
use super::feature::Feature;
use super::list::Link;

/// A purchasable plan template. Amounts are in cents of `currency`.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Offer {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_segment: i64,
    pub reference_offer: Option<String>,
    pub reference_segment: Option<String>,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub title_localized: Option<String>,
    pub description_localized: Option<String>,
    pub pricing_localized: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub is_visible: bool,
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
    pub features: Option<Vec<Feature>>,
    pub links: Option<Vec<Link>>,
}

/// An offer already linked to a subscription of the requesting customer.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SubscribableOffer {
    #[serde(flatten)]
    pub offer: Offer,
    pub id_subscription: Option<i64>,
    pub date_subscription: Option<DateTime<Utc>>,
}
