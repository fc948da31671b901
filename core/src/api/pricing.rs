use chrono::{DateTime, Utc};

use super::usages::UsageChangeBody;
use super::{EstimateSubscriptionPricing, ProAbonoApi, UsageChange};
use crate::error::Result;
use crate::mapper::{Operation, PreparedRequest};
use crate::types::Pricing;

impl ProAbonoApi {
    /// Price of a usage change, without recording it.
    pub fn estimate_usage_update(
        &self,
        reference_customer: &str,
        reference_feature: &str,
        change: UsageChange,
        id_subscription: Option<i64>,
        date_stamp: Option<DateTime<Utc>>,
        html: Option<bool>,
    ) -> Result<PreparedRequest<Pricing>> {
        let body = UsageChangeBody::new(
            reference_customer,
            reference_feature,
            change,
            date_stamp,
            id_subscription,
        )?
        .with_html(html);
        Operation::post("estimate pricing of an usage update", "/v1/PricingUsage")
            .json(&body)?
            .expecting(&self.endpoint)
    }

    pub fn estimate_usage_update_by_increment(
        &self,
        reference_customer: &str,
        reference_feature: &str,
        increment: i32,
        id_subscription: Option<i64>,
        date_stamp: Option<DateTime<Utc>>,
        html: Option<bool>,
    ) -> Result<PreparedRequest<Pricing>> {
        self.estimate_usage_update(
            reference_customer,
            reference_feature,
            UsageChange::Increment(increment),
            id_subscription,
            date_stamp,
            html,
        )
    }

    pub fn estimate_usage_update_by_current_quantity(
        &self,
        reference_customer: &str,
        reference_feature: &str,
        quantity_current: i32,
        id_subscription: Option<i64>,
        date_stamp: Option<DateTime<Utc>>,
        html: Option<bool>,
    ) -> Result<PreparedRequest<Pricing>> {
        self.estimate_usage_update(
            reference_customer,
            reference_feature,
            UsageChange::QuantityCurrent(quantity_current),
            id_subscription,
            date_stamp,
            html,
        )
    }

    pub fn estimate_usage_update_by_activation(
        &self,
        reference_customer: &str,
        reference_feature: &str,
        is_enabled: bool,
        id_subscription: Option<i64>,
        date_stamp: Option<DateTime<Utc>>,
        html: Option<bool>,
    ) -> Result<PreparedRequest<Pricing>> {
        self.estimate_usage_update(
            reference_customer,
            reference_feature,
            UsageChange::IsEnabled(is_enabled),
            id_subscription,
            date_stamp,
            html,
        )
    }

    /// Price of subscribing a customer to an offer. With a trial, the result
    /// holds the first period and the following term in `next_term`.
    pub fn estimate_subscription_pricing(
        &self,
        estimate: &EstimateSubscriptionPricing,
    ) -> Result<PreparedRequest<Pricing>> {
        estimate.validate()?;
        Operation::post("estimate pricing of a subscription", "/v1/PricingSubscription")
            .json(estimate)?
            .expecting(&self.endpoint)
    }
}
