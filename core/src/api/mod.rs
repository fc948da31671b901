//! Endpoint catalogue: one method per remote operation.
//!
//! # Design
//! `ProAbonoApi` holds only the endpoint and credentials. Each method runs
//! the local checks for its arguments, then returns a `PreparedRequest<T>`
//! describing the HTTP call and how to read its response. Nothing here
//! touches the network; execute the request with a `Transport`, through
//! `ProAbonoClient`, or with the caller's own HTTP stack.

mod customers;
mod features;
mod offers;
mod options;
mod pricing;
mod subscriptions;
mod usages;

pub use options::{
    CreateSubscription, EstimateSubscriptionPricing, FeatureListOptions, FeatureOptions,
    OfferOptions, OfferOverrides, Pagination, SubscriptionListFilter, UsageChange, MAX_SIZE_PAGE,
};

use crate::config::ClientConfig;
use crate::mapper::Endpoint;

/// Request builder for the ProAbono REST API.
#[derive(Debug, Clone)]
pub struct ProAbonoApi {
    endpoint: Endpoint,
}

impl ProAbonoApi {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            endpoint: Endpoint::new(config),
        }
    }

    pub fn base_url(&self) -> &str {
        self.endpoint.base_url()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::ProAbonoApi;
    use crate::config::ClientConfig;

    pub(crate) fn api() -> ProAbonoApi {
        let config = ClientConfig::with_base_url("https://api-acme.proabono.test")
            .unwrap()
            .with_credentials("agent", "secret");
        ProAbonoApi::new(&config)
    }
}
