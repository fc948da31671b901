use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, DefaultOnNull};

use super::enums::PaymentType;
use super::list::Link;

/// Editable customer properties, shared by every customer shape.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CustomerInfo {
    pub email: Option<String>,
    pub name: Option<String>,
    pub language: Option<String>,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Customer {
    #[serde(flatten)]
    pub info: CustomerInfo,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_segment: i64,
    pub reference_customer: Option<String>,
    pub reference_segment: Option<String>,
    pub links: Option<Vec<Link>>,
}

/// A customer together with its usage of one feature.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CustomerWithUsage {
    #[serde(flatten)]
    pub customer: Customer,
    pub quantity_included: Option<i32>,
    pub quantity_current: Option<i32>,
    pub is_included: Option<bool>,
    pub is_enabled: Option<bool>,
    pub date_period_start: Option<DateTime<Utc>>,
    pub date_period_end: Option<DateTime<Utc>>,
}

/// Billing or shipping address of a customer.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Address {
    pub company: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub address_line1: Option<String>,
    pub address_line2: Option<String>,
    pub zip_code: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub phone: Option<String>,
    pub tax_information: Option<String>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PaymentSettings {
    pub type_payment: Option<PaymentType>,
    pub is_billable: Option<bool>,
    pub date_next_billing: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn customer_flattens_info() {
        let json = r#"{
            "Id": 12,
            "IdSegment": 3,
            "ReferenceCustomer": "cust-42",
            "Name": "Ada",
            "Email": "ada@example.com",
            "Links": [{"rel": "hosted-home", "href": "https://example.com/home"}],
            "SomethingNew": true
        }"#;
        let customer: Customer = serde_json::from_str(json).unwrap();
        assert_eq!(customer.id, 12);
        assert_eq!(customer.info.name.as_deref(), Some("Ada"));
        assert_eq!(customer.info.language, None);
        assert_eq!(customer.links.unwrap()[0].rel.as_deref(), Some("hosted-home"));
    }

    #[test]
    fn address_omits_absent_members() {
        let address = Address {
            city: Some("Lyon".to_string()),
            ..Default::default()
        };
        let body = serde_json::to_value(&address).unwrap();
        assert_eq!(body, serde_json::json!({"City": "Lyon"}));
    }

    #[test]
    fn customer_with_usage_roundtrips() {
        let original = CustomerWithUsage {
            customer: Customer {
                info: CustomerInfo {
                    email: Some("ada@example.com".to_string()),
                    name: Some("Ada".to_string()),
                    language: Some("en".to_string()),
                },
                id: 7,
                id_segment: 2,
                reference_customer: Some("cust-7".to_string()),
                reference_segment: Some("seg".to_string()),
                links: Some(vec![Link {
                    rel: Some("self".to_string()),
                    href: Some("https://example.com".to_string()),
                }]),
            },
            quantity_included: Some(10),
            quantity_current: Some(4),
            is_included: Some(true),
            is_enabled: Some(false),
            date_period_start: Some("2024-01-01T00:00:00Z".parse().unwrap()),
            date_period_end: Some("2024-02-01T00:00:00Z".parse().unwrap()),
        };
        let json = serde_json::to_string(&original).unwrap();
        let back: CustomerWithUsage = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}
