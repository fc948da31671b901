use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CreateSubscription, ProAbonoApi, SubscriptionListFilter};
use crate::error::Result;
use crate::guard;
use crate::mapper::{Operation, PreparedRequest};
use crate::types::{PaginatedList, Subscription, SubscriptionState};

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct DateTermBody {
    date_term: DateTime<Utc>,
}

impl ProAbonoApi {
    /// Subscribe a customer to an offer.
    pub fn create_subscription(
        &self,
        subscription: &CreateSubscription,
    ) -> Result<PreparedRequest<Subscription>> {
        subscription.validate()?;
        Operation::post("create a subscription", "/v1/Subscription")
            .opt_param("tryStart", subscription.try_start)
            .opt_param("ensureBillable", subscription.ensure_billable)
            .json(subscription)?
            .expecting(&self.endpoint)
    }

    /// `None` when no subscription has this id.
    pub fn retrieve_subscription(
        &self,
        id_subscription: i64,
        html: Option<bool>,
    ) -> Result<PreparedRequest<Option<Subscription>>> {
        Operation::get("retrieve a subscription", "/v1/Subscription")
            .param("IdSubscription", id_subscription)
            .opt_param("Html", html)
            .expecting_optional(&self.endpoint)
    }

    /// The current subscription of a customer.
    pub fn retrieve_subscription_for_customer(
        &self,
        reference_customer: &str,
        html: Option<bool>,
    ) -> Result<PreparedRequest<Subscription>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        Operation::get("retrieve a subscription for a customer", "/v1/Subscription")
            .param("referenceCustomer", reference_customer)
            .opt_param("Html", html)
            .expecting(&self.endpoint)
    }

    /// Ask the server to suspend a subscription. Without a `state` the
    /// server suspends it as `SuspendedAgent`.
    pub fn suspend_subscription(
        &self,
        id_subscription: i64,
        state: Option<SubscriptionState>,
        html: Option<bool>,
    ) -> Result<PreparedRequest<Subscription>> {
        Operation::post(
            "suspend a subscription",
            "/v1/Subscription/{IdSubscription}/Suspension",
        )
        .segment("IdSubscription", id_subscription)
        .opt_param("StateSubscription", state)
        .opt_param("Html", html)
        .expecting(&self.endpoint)
    }

    pub fn start_subscription(
        &self,
        id_subscription: i64,
        html: Option<bool>,
    ) -> Result<PreparedRequest<Subscription>> {
        Operation::post("start a subscription", "/v1/Subscription/{IdSubscription}/Start")
            .segment("IdSubscription", id_subscription)
            .opt_param("Html", html)
            .expecting(&self.endpoint)
    }

    /// Terminate now (`immediate`) or at the end of the current period.
    /// `date_termination` backdates or schedules the termination.
    pub fn terminate_subscription(
        &self,
        id_subscription: i64,
        immediate: bool,
        date_termination: Option<DateTime<Utc>>,
        html: Option<bool>,
    ) -> Result<PreparedRequest<Subscription>> {
        Operation::post(
            "terminate a subscription",
            "/v1/Subscription/{IdSubscription}/Termination",
        )
        .segment("IdSubscription", id_subscription)
        .param("Immediate", immediate)
        .opt_param("DateTermination", date_termination)
        .opt_param("Html", html)
        .expecting(&self.endpoint)
    }

    /// Move a subscription to another offer.
    pub fn upgrade_subscription(
        &self,
        id_subscription: i64,
        reference_offer: &str,
        html: Option<bool>,
    ) -> Result<PreparedRequest<Subscription>> {
        guard::not_empty(reference_offer, "referenceOffer")?;
        Operation::post("upgrade a subscription", "/v1/Subscription/{IdSubscription}/Upgrade")
            .segment("IdSubscription", id_subscription)
            .param("ReferenceOffer", reference_offer)
            .opt_param("Html", html)
            .expecting(&self.endpoint)
    }

    /// Move the next renewal of a subscription. `date_term` must be in the
    /// future.
    pub fn update_subscription_renewal_date(
        &self,
        id_subscription: i64,
        date_term: DateTime<Utc>,
        html: Option<bool>,
    ) -> Result<PreparedRequest<Subscription>> {
        guard::future(date_term, "dateTerm")?;
        Operation::post(
            "change the renewal date of a subscription",
            "/v1/Subscription/{IdSubscription}/DateTerm",
        )
        .segment("IdSubscription", id_subscription)
        .opt_param("Html", html)
        .json(&DateTermBody { date_term })?
        .expecting(&self.endpoint)
    }

    pub fn list_subscriptions(
        &self,
        filter: &SubscriptionListFilter,
    ) -> Result<PreparedRequest<PaginatedList<Subscription>>> {
        filter.pagination.validate()?;
        Operation::get("list subscriptions", "/v1/Subscriptions")
            .params(filter)?
            .expecting_list(&self.endpoint)
    }
}
