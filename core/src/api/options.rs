//! Optional parameters accepted by the catalogue methods.
//!
//! Every field is optional and omitted from the request when `None`. The
//! structs serialize with the API's PascalCase member names, so the same
//! value works as query parameters or as part of a JSON body.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_with::skip_serializing_none;

use crate::error::Result;
use crate::guard;
use crate::types::TimeUnit;

/// Largest page size the API accepts.
pub const MAX_SIZE_PAGE: u32 = 1000;

/// Page selection for list operations.
#[skip_serializing_none]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Pagination {
    /// 1-based page number.
    pub page: Option<u32>,
    pub size_page: Option<u32>,
}

impl Pagination {
    pub fn page(page: u32, size_page: u32) -> Self {
        Self {
            page: Some(page),
            size_page: Some(size_page),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(page) = self.page {
            guard::positive(page.into(), "page")?;
        }
        if let Some(size_page) = self.size_page {
            guard::in_range(size_page, 1, MAX_SIZE_PAGE, "sizePage")?;
        }
        Ok(())
    }
}

fn validate_language(language: Option<&str>) -> Result<()> {
    match language {
        Some(language) => guard::length_between(language, 2, 10, "language"),
        None => Ok(()),
    }
}

/// Options for retrieving a single feature.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeatureOptions {
    /// Segment used to pick the default language when `language` is absent.
    pub reference_segment: Option<String>,
    pub language: Option<String>,
    /// Localized texts as HTML rather than plain text.
    pub html: Option<bool>,
}

impl FeatureOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        validate_language(self.language.as_deref())
    }
}

/// Options for listing features.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct FeatureListOptions {
    pub reference_segment: Option<String>,
    pub is_visible: Option<bool>,
    pub language: Option<String>,
    pub html: Option<bool>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

impl FeatureListOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        validate_language(self.language.as_deref())?;
        self.pagination.validate()
    }
}

/// Options for retrieving offers.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OfferOptions {
    pub reference_segment: Option<String>,
    pub language: Option<String>,
    pub html: Option<bool>,
    /// Skip the feature list of each offer.
    pub ignore_features: Option<bool>,
    pub is_visible: Option<bool>,
    /// Include hosted-page links.
    pub links: Option<bool>,
}

impl OfferOptions {
    pub(crate) fn validate(&self) -> Result<()> {
        validate_language(self.language.as_deref())
    }
}

/// Filter for listing subscriptions.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SubscriptionListFilter {
    pub reference_customer: Option<String>,
    pub reference_customer_buyer: Option<String>,
    pub reference_segment: Option<String>,
    pub html: Option<bool>,
    #[serde(flatten)]
    pub pagination: Pagination,
}

/// Per-subscription overrides of an offer's terms.
///
/// Amounts are in cents of the offer currency.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct OfferOverrides {
    pub amount_up_front: Option<i32>,
    pub amount_trial: Option<i32>,
    pub unit_trial: Option<TimeUnit>,
    pub duration_trial: Option<i32>,
    pub amount_recurrence: Option<i32>,
    pub unit_recurrence: Option<TimeUnit>,
    pub duration_recurrence: Option<i32>,
    /// Number of billing periods; `None` renews forever.
    pub count_recurrences: Option<i32>,
    /// Commitment, in billing periods.
    pub count_min_recurrences: Option<i32>,
    pub amount_termination: Option<i32>,
}

impl OfferOverrides {
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(duration) = self.duration_recurrence {
            guard::positive(duration.into(), "durationRecurrence")?;
        }
        if let Some(count) = self.count_recurrences {
            guard::positive(count.into(), "countRecurrences")?;
        }
        if let Some(count) = self.count_min_recurrences {
            guard::positive(count.into(), "countMinRecurrences")?;
        }
        Ok(())
    }
}

/// A new subscription of a customer to an offer.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateSubscription {
    pub reference_customer: String,
    pub reference_offer: String,
    /// Paying customer, when it differs from the recipient.
    pub reference_customer_buyer: Option<String>,
    /// Force the start; fails if the offer is not free and the customer is
    /// not billable. Sent in the query string.
    #[serde(skip)]
    pub try_start: Option<bool>,
    /// Fail unless the customer is billable. Sent in the query string.
    #[serde(skip)]
    pub ensure_billable: Option<bool>,
    pub date_start: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub overrides: OfferOverrides,
    pub title_localized: Option<String>,
    pub description_localized: Option<String>,
    pub html: Option<bool>,
}

impl CreateSubscription {
    pub fn new(reference_customer: impl Into<String>, reference_offer: impl Into<String>) -> Self {
        Self {
            reference_customer: reference_customer.into(),
            reference_offer: reference_offer.into(),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        guard::not_empty(&self.reference_customer, "referenceCustomer")?;
        guard::not_empty(&self.reference_offer, "referenceOffer")?;
        self.overrides.validate()
    }
}

/// Price estimate of a prospective subscription.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EstimateSubscriptionPricing {
    pub reference_customer: String,
    pub reference_offer: String,
    pub reference_customer_buyer: Option<String>,
    pub try_start: Option<bool>,
    pub date_start: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub overrides: OfferOverrides,
    pub html: Option<bool>,
}

impl EstimateSubscriptionPricing {
    pub fn new(reference_customer: impl Into<String>, reference_offer: impl Into<String>) -> Self {
        Self {
            reference_customer: reference_customer.into(),
            reference_offer: reference_offer.into(),
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        guard::not_empty(&self.reference_customer, "referenceCustomer")?;
        guard::not_empty(&self.reference_offer, "referenceOffer")?;
        self.overrides.validate()
    }
}

/// How a usage update changes the current quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UsageChange {
    /// Add to the current quantity (negative values subtract).
    Increment(i32),
    /// Replace the current quantity.
    QuantityCurrent(i32),
    /// Enable or disable an on/off feature.
    IsEnabled(bool),
}
