use super::{OfferOptions, Pagination, ProAbonoApi};
use crate::error::Result;
use crate::guard;
use crate::mapper::{Operation, PreparedRequest};
use crate::types::{Offer, PaginatedList, SubscribableOffer};

// Offers seen through a customer carry the subscription they are linked to,
// if any, so those operations return `SubscribableOffer`.
impl ProAbonoApi {
    pub fn retrieve_offer(
        &self,
        reference_offer: &str,
        options: &OfferOptions,
    ) -> Result<PreparedRequest<Offer>> {
        guard::not_empty(reference_offer, "referenceOffer")?;
        options.validate()?;
        Operation::get("retrieve an offer", "/v1/Offer")
            .param("ReferenceOffer", reference_offer)
            .params(options)?
            .expecting(&self.endpoint)
    }

    pub fn retrieve_offer_for_customer(
        &self,
        reference_customer: &str,
        reference_offer: &str,
        options: &OfferOptions,
    ) -> Result<PreparedRequest<SubscribableOffer>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        guard::not_empty(reference_offer, "referenceOffer")?;
        options.validate()?;
        Operation::get("retrieve an offer for a customer", "/v1/Offer")
            .param("ReferenceCustomer", reference_customer)
            .param("ReferenceOffer", reference_offer)
            .params(options)?
            .expecting(&self.endpoint)
    }

    pub fn retrieve_offers(
        &self,
        options: &OfferOptions,
        pagination: Pagination,
    ) -> Result<PreparedRequest<PaginatedList<Offer>>> {
        options.validate()?;
        pagination.validate()?;
        Operation::get("retrieve offers", "/v1/Offers")
            .params(options)?
            .params(&pagination)?
            .expecting_list(&self.endpoint)
    }

    pub fn retrieve_offers_for_customer(
        &self,
        reference_customer: &str,
        options: &OfferOptions,
        pagination: Pagination,
    ) -> Result<PreparedRequest<PaginatedList<SubscribableOffer>>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        options.validate()?;
        pagination.validate()?;
        Operation::get("retrieve offers for a customer", "/v1/Offers")
            .param("ReferenceCustomer", reference_customer)
            .params(options)?
            .params(&pagination)?
            .expecting_list(&self.endpoint)
    }

    /// An offer the customer's subscription can be upgraded to.
    pub fn retrieve_offer_to_upgrade_customer(
        &self,
        reference_customer: &str,
        reference_offer: &str,
        id_subscription: Option<i64>,
        options: &OfferOptions,
    ) -> Result<PreparedRequest<SubscribableOffer>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        guard::not_empty(reference_offer, "referenceOffer")?;
        options.validate()?;
        Operation::get("retrieve an offer to upgrade a customer", "/v1/Offer")
            .param("ReferenceCustomer", reference_customer)
            .param("ReferenceOffer", reference_offer)
            .param("Upgrade", true)
            .opt_param("IdSubscription", id_subscription)
            .params(options)?
            .expecting(&self.endpoint)
    }

    /// Offers the customer's subscription can be upgraded to.
    pub fn retrieve_offers_to_upgrade_customer(
        &self,
        reference_customer: &str,
        id_subscription: Option<i64>,
        options: &OfferOptions,
        pagination: Pagination,
    ) -> Result<PreparedRequest<PaginatedList<SubscribableOffer>>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        options.validate()?;
        pagination.validate()?;
        Operation::get("retrieve offers to upgrade a customer", "/v1/Offers")
            .param("ReferenceCustomer", reference_customer)
            .param("Upgrade", true)
            .opt_param("IdSubscription", id_subscription)
            .params(options)?
            .params(&pagination)?
            .expecting_list(&self.endpoint)
    }
}
