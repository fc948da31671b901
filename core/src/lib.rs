//! Client core for the ProAbono subscription billing API.
//!
//! # Overview
//! Every remote operation is a method on [`ProAbonoApi`] that returns a
//! [`PreparedRequest`]: the `HttpRequest` to send plus the rule that turns the
//! `HttpResponse` into a typed result. The core never touches the network on
//! its own, so the caller may execute the request with any HTTP stack
//! (host-does-IO), or hand it to a [`Transport`] such as the bundled
//! [`UreqTransport`] through [`ProAbonoClient`].
//!
//! # Design
//! - `ProAbonoApi` is stateless. It holds only the endpoint and credentials.
//! - DTOs live in [`types`] and are defined independently from the
//!   mock-server crate; the integration tests catch schema drift.
//! - Every failure is one [`ApiError`]. Server error bodies are kept whole
//!   in `ApiError::Remote`.
//! - Documented "nothing there" outcomes are values: HTTP 204 on a list is
//!   an empty [`PaginatedList`], HTTP 404 on lookups returning `Option` is
//!   `None`.

pub mod api;
pub mod config;
pub mod error;
mod guard;
pub mod http;
mod mapper;
pub mod transport;
pub mod types;

pub use api::{
    CreateSubscription, EstimateSubscriptionPricing, FeatureListOptions, FeatureOptions,
    OfferOptions, OfferOverrides, Pagination, ProAbonoApi, SubscriptionListFilter, UsageChange,
};
pub use config::{ClientConfig, ConfigError, Credentials};
pub use error::{ApiError, ErrorRecord, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use mapper::PreparedRequest;
pub use transport::{ProAbonoClient, Transport};
#[cfg(feature = "ureq")]
pub use transport::UreqTransport;
pub use types::{
    Address, Customer, CustomerInfo, CustomerWithUsage, Feature, FeatureCharacteristics,
    FeatureType, Link, MoveType, Offer, PaginatedList, PaymentSettings, PaymentType, Pricing,
    SubscribableOffer, Subscription, SubscriptionFeature, SubscriptionState, TimeUnit, Usage,
    WebhookCallbackMessage,
};
