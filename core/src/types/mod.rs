//! Domain DTOs exchanged with the ProAbono API.
//!
//! # Design
//! The records carry no behavior. Shared field-sets (`CustomerInfo`,
//! `FeatureCharacteristics`) are embedded with `#[serde(flatten)]` so the wire
//! shape stays flat while the Rust shape is composed. Every record is
//! `#[serde(default)]`: members missing from a payload leave the field at
//! `None` or zero, and members unknown to the record are ignored.

mod customer;
mod enums;
mod feature;
mod list;
mod offer;
mod pricing;
mod subscription;
mod usage;
mod webhook;

pub use customer::{Address, Customer, CustomerInfo, CustomerWithUsage, PaymentSettings};
pub use enums::{FeatureType, MoveType, PaymentType, SubscriptionState, TimeUnit, UnknownVariant};
pub use feature::{Feature, FeatureCharacteristics};
pub use list::{Link, PaginatedList};
pub use offer::{Offer, SubscribableOffer};
pub use pricing::Pricing;
pub use subscription::{Subscription, SubscriptionFeature};
pub use usage::Usage;
pub use webhook::{
    WebhookCallbackMessage, WebhookCustomer, WebhookInvoice, WebhookOffer, WebhookSubscription,
};
