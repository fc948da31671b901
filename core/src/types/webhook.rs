//! Inbound webhook payload.
//!
//! The client never calls a webhook endpoint; these shapes only describe the
//! JSON document the caller's own server receives out of band.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, skip_serializing_none, DefaultOnNull};

use super::customer::CustomerInfo;
use super::enums::{SubscriptionState, TimeUnit};
use crate::error::ApiError;

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WebhookCallbackMessage {
    pub code: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_business: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_webhook: i64,
    pub reference_segment: Option<String>,
    pub currency: Option<String>,
    pub date_trigger: Option<DateTime<Utc>>,
    pub type_trigger: Option<String>,
    pub customer: Option<WebhookCustomer>,
    pub customer_buyer: Option<WebhookCustomer>,
    pub offer: Option<WebhookOffer>,
    pub subscription: Option<WebhookSubscription>,
    pub invoice: Option<WebhookInvoice>,
}

impl WebhookCallbackMessage {
    /// Parse a webhook body as received by the caller's endpoint.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
    }
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WebhookCustomer {
    #[serde(flatten)]
    pub info: CustomerInfo,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id: i64,
    pub reference_customer: Option<String>,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WebhookOffer {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id: i64,
    pub reference_offer: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub is_visible: bool,
    pub name: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub amount_recurrence: i32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub duration_recurrence: i32,
    pub unit_recurrence: Option<TimeUnit>,
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WebhookSubscription {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id: i64,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id_segment: i64,
    /// Kept as received; states added server-side must not break parsing.
    pub state_subscription: Option<String>,
    pub date_start: Option<DateTime<Utc>>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub amount_recurrence: i32,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub duration_recurrence: i32,
    pub unit_recurrence: Option<TimeUnit>,
}

impl WebhookSubscription {
    /// The state as a known `SubscriptionState`, `None` when absent or unknown.
    pub fn state(&self) -> Option<SubscriptionState> {
        self.state_subscription.as_deref()?.parse().ok()
    }
}

#[serde_as]
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WebhookInvoice {
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub id: i64,
    pub reference_invoice: Option<String>,
    pub state_invoice: Option<String>,
    pub currency: Option<String>,
    #[serde_as(deserialize_as = "DefaultOnNull")]
    pub amount_total: i32,
    pub date_issue: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_subscription_started_message() {
        let body = r#"{
            "Code": "SubscriptionStarted",
            "Id": 4012,
            "IdBusiness": 7,
            "IdWebhook": 2,
            "ReferenceSegment": "default",
            "Currency": "EUR",
            "DateTrigger": "2024-05-02T08:30:00Z",
            "TypeTrigger": "Subscription",
            "Customer": {"Id": 12, "ReferenceCustomer": "cust-42", "Email": "ada@example.com"},
            "Offer": {"Id": 9, "ReferenceOffer": "pro-monthly", "IsVisible": true,
                      "AmountRecurrence": 1900, "DurationRecurrence": 1, "UnitRecurrence": "Month"},
            "Subscription": {"Id": 101, "IdSegment": 3, "StateSubscription": "Running",
                             "DateStart": "2024-05-02T08:30:00Z", "AmountRecurrence": 1900,
                             "DurationRecurrence": 1, "UnitRecurrence": "Month"}
        }"#;
        let message = WebhookCallbackMessage::from_json(body).unwrap();
        assert_eq!(message.code.as_deref(), Some("SubscriptionStarted"));
        let customer = message.customer.unwrap();
        assert_eq!(customer.reference_customer.as_deref(), Some("cust-42"));
        assert_eq!(customer.info.email.as_deref(), Some("ada@example.com"));
        let subscription = message.subscription.unwrap();
        assert_eq!(subscription.state_subscription.as_deref(), Some("Running"));
        assert_eq!(subscription.state(), Some(SubscriptionState::Running));
        assert!(message.customer_buyer.is_none());
        assert!(message.invoice.is_none());
    }

    #[test]
    fn unknown_subscription_state_still_parses() {
        let body = r#"{
            "Code": "SubscriptionUpdated",
            "Id": 4013,
            "Subscription": {"Id": 101, "StateSubscription": "PausedByPartner", "IdSegment": null}
        }"#;
        let message = WebhookCallbackMessage::from_json(body).unwrap();
        let subscription = message.subscription.unwrap();
        assert_eq!(subscription.id_segment, 0);
        assert_eq!(
            subscription.state_subscription.as_deref(),
            Some("PausedByPartner")
        );
        assert_eq!(subscription.state(), None);
    }

    #[test]
    fn malformed_body_is_a_deserialization_error() {
        let err = WebhookCallbackMessage::from_json("not json").unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }
}
