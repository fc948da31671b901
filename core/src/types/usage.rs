use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, DefaultOnNull};

use super::feature::FeatureCharacteristics;

/// Current consumption of a feature for a customer or a subscription.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Usage {
    #[serde(flatten)]
    pub characteristics: FeatureCharacteristics,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_segment: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_feature: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_customer: i64,
    pub id_subscription: Option<i64>,
    pub reference_segment: Option<String>,
    pub reference_customer: Option<String>,
    pub date_period_start: Option<DateTime<Utc>>,
    pub date_period_end: Option<DateTime<Utc>>,
}
