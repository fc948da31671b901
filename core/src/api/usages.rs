use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_with::skip_serializing_none;

use super::{Pagination, ProAbonoApi, UsageChange};
use crate::error::Result;
use crate::guard;
use crate::mapper::{now_utc, Operation, PreparedRequest};
use crate::types::{PaginatedList, Usage};

/// Body shared by usage updates and their price estimates.
#[skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
pub(super) struct UsageChangeBody<'a> {
    reference_feature: &'a str,
    reference_customer: &'a str,
    #[serde(flatten)]
    change: UsageChange,
    date_stamp: DateTime<Utc>,
    id_subscription: Option<i64>,
    html: Option<bool>,
}

impl<'a> UsageChangeBody<'a> {
    pub(super) fn new(
        reference_customer: &'a str,
        reference_feature: &'a str,
        change: UsageChange,
        date_stamp: Option<DateTime<Utc>>,
        id_subscription: Option<i64>,
    ) -> Result<Self> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        guard::not_empty(reference_feature, "referenceFeature")?;
        Ok(Self {
            reference_feature,
            reference_customer,
            change,
            date_stamp: date_stamp.unwrap_or_else(now_utc),
            id_subscription,
            html: None,
        })
    }

    pub(super) fn with_html(mut self, html: Option<bool>) -> Self {
        self.html = html;
        self
    }
}

impl ProAbonoApi {
    /// Usages of a customer, optionally narrowed to one feature.
    ///
    /// With `aggregate`, usages of the customer's subscriptions are summed
    /// per feature.
    pub fn retrieve_usages_for_customer(
        &self,
        reference_customer: &str,
        reference_feature: Option<&str>,
        aggregate: bool,
        pagination: Pagination,
    ) -> Result<PreparedRequest<PaginatedList<Usage>>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        pagination.validate()?;
        Operation::get("retrieve usages for a customer", "/v1/Usages")
            .param("ReferenceCustomer", reference_customer)
            .opt_param("ReferenceFeature", reference_feature)
            .param("Aggregate", aggregate)
            .params(&pagination)?
            .expecting_list(&self.endpoint)
    }

    pub fn retrieve_usages_for_subscription(
        &self,
        id_subscription: i64,
        pagination: Pagination,
    ) -> Result<PreparedRequest<PaginatedList<Usage>>> {
        pagination.validate()?;
        Operation::get("retrieve usages for a subscription", "/v1/Usages")
            .param("IdSubscription", id_subscription)
            .params(&pagination)?
            .expecting_list(&self.endpoint)
    }

    pub fn retrieve_usages_for_feature(
        &self,
        reference_feature: &str,
        aggregate: bool,
        pagination: Pagination,
    ) -> Result<PreparedRequest<PaginatedList<Usage>>> {
        guard::not_empty(reference_feature, "referenceFeature")?;
        pagination.validate()?;
        Operation::get("retrieve usages for a feature", "/v1/Usages")
            .param("ReferenceFeature", reference_feature)
            .param("Aggregate", aggregate)
            .params(&pagination)?
            .expecting_list(&self.endpoint)
    }

    pub fn retrieve_usage_for_customer(
        &self,
        reference_customer: &str,
        reference_feature: &str,
    ) -> Result<PreparedRequest<Usage>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        guard::not_empty(reference_feature, "referenceFeature")?;
        Operation::get("retrieve usage for a customer", "/v1/Usage")
            .param("ReferenceFeature", reference_feature)
            .param("ReferenceCustomer", reference_customer)
            .expecting(&self.endpoint)
    }

    pub fn retrieve_usage_for_subscription(
        &self,
        id_subscription: i64,
        reference_feature: &str,
    ) -> Result<PreparedRequest<Usage>> {
        guard::not_empty(reference_feature, "referenceFeature")?;
        Operation::get("retrieve usage for a subscription", "/v1/Usage")
            .param("ReferenceFeature", reference_feature)
            .param("IdSubscription", id_subscription)
            .expecting(&self.endpoint)
    }

    /// Record a usage change. `date_stamp` defaults to now (UTC); the server
    /// uses it to order concurrent updates.
    pub fn update_usage(
        &self,
        reference_customer: &str,
        reference_feature: &str,
        change: UsageChange,
        date_stamp: Option<DateTime<Utc>>,
        id_subscription: Option<i64>,
    ) -> Result<PreparedRequest<Usage>> {
        let name = match change {
            UsageChange::Increment(_) => "update usage by increment",
            UsageChange::QuantityCurrent(_) => "update usage by current quantity",
            UsageChange::IsEnabled(_) => "update usage of onoff feature",
        };
        let body = UsageChangeBody::new(
            reference_customer,
            reference_feature,
            change,
            date_stamp,
            id_subscription,
        )?;
        Operation::post(name, "/v1/Usage")
            .json(&body)?
            .expecting(&self.endpoint)
    }

    pub fn update_usage_by_increment(
        &self,
        reference_customer: &str,
        reference_feature: &str,
        increment: i32,
        date_stamp: Option<DateTime<Utc>>,
        id_subscription: Option<i64>,
    ) -> Result<PreparedRequest<Usage>> {
        self.update_usage(
            reference_customer,
            reference_feature,
            UsageChange::Increment(increment),
            date_stamp,
            id_subscription,
        )
    }

    pub fn update_usage_by_current_quantity(
        &self,
        reference_customer: &str,
        reference_feature: &str,
        quantity_current: i32,
        date_stamp: Option<DateTime<Utc>>,
        id_subscription: Option<i64>,
    ) -> Result<PreparedRequest<Usage>> {
        self.update_usage(
            reference_customer,
            reference_feature,
            UsageChange::QuantityCurrent(quantity_current),
            date_stamp,
            id_subscription,
        )
    }

    /// Enable or disable an on/off feature.
    pub fn update_usage_by_activation(
        &self,
        reference_customer: &str,
        reference_feature: &str,
        is_enabled: bool,
        date_stamp: Option<DateTime<Utc>>,
        id_subscription: Option<i64>,
    ) -> Result<PreparedRequest<Usage>> {
        self.update_usage(
            reference_customer,
            reference_feature,
            UsageChange::IsEnabled(is_enabled),
            date_stamp,
            id_subscription,
        )
    }
}
