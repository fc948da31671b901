use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, DefaultOnNull};

use super::enums::FeatureType;

/// Field-set shared by [`Feature`], [`super::Usage`] and
/// [`super::SubscriptionFeature`].
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct FeatureCharacteristics {
    pub reference_feature: Option<String>,
    pub type_feature: Option<FeatureType>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub is_visible: bool,
    pub is_enabled: Option<bool>,
    pub is_included: Option<bool>,
    pub quantity_current: Option<i32>,
    pub quantity_included: Option<i32>,
}

/// A feature, optionally with the current usage of one customer when it was
/// requested for that customer.
#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Feature {
    #[serde(flatten)]
    pub characteristics: FeatureCharacteristics,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id: i64,
    pub title_localized: Option<String>,
    pub description_localized: Option<String>,
    pub pricing_localized: Option<String>,
    pub properties: Option<String>,
    pub date_period_start: Option<DateTime<Utc>>,
    pub date_period_end: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_reads_characteristics_from_same_level() {
        let json = r#"{
            "Id": 5,
            "ReferenceFeature": "seats",
            "TypeFeature": "Limitation",
            "IsVisible": true,
            "QuantityIncluded": 10,
            "QuantityCurrent": 3,
            "TitleLocalized": "Seats"
        }"#;
        let feature: Feature = serde_json::from_str(json).unwrap();
        assert_eq!(feature.id, 5);
        assert_eq!(feature.characteristics.reference_feature.as_deref(), Some("seats"));
        assert_eq!(feature.characteristics.type_feature, Some(FeatureType::Limitation));
        assert!(feature.characteristics.is_visible);
        assert_eq!(feature.characteristics.quantity_current, Some(3));
        assert_eq!(feature.characteristics.is_enabled, None);
        assert_eq!(feature.date_period_end, None);
    }
}
