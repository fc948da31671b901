use serde::Serialize;
use serde_with::skip_serializing_none;

use super::{Pagination, ProAbonoApi};
use crate::error::Result;
use crate::guard;
use crate::mapper::{Operation, PreparedRequest};
use crate::types::{
    Address, Customer, CustomerInfo, CustomerWithUsage, PaginatedList, PaymentSettings,
};

#[skip_serializing_none]
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SaveCustomerBody<'a> {
    reference_segment: Option<&'a str>,
    reference_customer: &'a str,
    #[serde(flatten)]
    info: &'a CustomerInfo,
}

impl ProAbonoApi {
    /// Insert or update a customer.
    ///
    /// Without `reference_segment`, a new customer goes to the first segment.
    pub fn save_customer(
        &self,
        reference_customer: &str,
        info: &CustomerInfo,
        reference_segment: Option<&str>,
    ) -> Result<PreparedRequest<Customer>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        let body = SaveCustomerBody {
            reference_segment,
            reference_customer,
            info,
        };
        Operation::post("create a customer", "/v1/Customer")
            .json(&body)?
            .expecting(&self.endpoint)
    }

    pub fn retrieve_customer(&self, reference_customer: &str) -> Result<PreparedRequest<Customer>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        Operation::get("retrieve a customer", "/v1/Customer")
            .param("ReferenceCustomer", reference_customer)
            .expecting(&self.endpoint)
    }

    pub fn list_customers(
        &self,
        reference_segment: Option<&str>,
        pagination: Pagination,
    ) -> Result<PreparedRequest<PaginatedList<Customer>>> {
        pagination.validate()?;
        Operation::get("list customers", "/v1/Customers")
            .opt_param("ReferenceSegment", reference_segment)
            .params(&pagination)?
            .expecting_list(&self.endpoint)
    }

    /// Customers having a usage of the given feature.
    pub fn list_customers_by_feature(
        &self,
        reference_feature: &str,
        reference_segment: Option<&str>,
        pagination: Pagination,
    ) -> Result<PreparedRequest<PaginatedList<CustomerWithUsage>>> {
        guard::not_empty(reference_feature, "referenceFeature")?;
        pagination.validate()?;
        Operation::get("list customers by feature", "/v1/Customers")
            .param("ReferenceFeature", reference_feature)
            .opt_param("ReferenceSegment", reference_segment)
            .params(&pagination)?
            .expecting_list(&self.endpoint)
    }

    /// `None` when the customer has no billing address.
    pub fn retrieve_billing_address(
        &self,
        reference_customer: &str,
    ) -> Result<PreparedRequest<Option<Address>>> {
        self.retrieve_address(
            "retrieve a billing address",
            "/v1/CustomerBillingAddress",
            reference_customer,
        )
    }

    pub fn save_billing_address(
        &self,
        reference_customer: &str,
        address: &Address,
    ) -> Result<PreparedRequest<Address>> {
        self.save_address(
            "update a billing address",
            "/v1/CustomerBillingAddress",
            reference_customer,
            address,
        )
    }

    /// `None` when the customer has no shipping address.
    pub fn retrieve_shipping_address(
        &self,
        reference_customer: &str,
    ) -> Result<PreparedRequest<Option<Address>>> {
        self.retrieve_address(
            "retrieve a shipping address",
            "/v1/CustomerShippingAddress",
            reference_customer,
        )
    }

    pub fn save_shipping_address(
        &self,
        reference_customer: &str,
        address: &Address,
    ) -> Result<PreparedRequest<Address>> {
        self.save_address(
            "update a shipping address",
            "/v1/CustomerShippingAddress",
            reference_customer,
            address,
        )
    }

    fn retrieve_address(
        &self,
        name: &'static str,
        path: &str,
        reference_customer: &str,
    ) -> Result<PreparedRequest<Option<Address>>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        Operation::get(name, path)
            .param("ReferenceCustomer", reference_customer)
            .expecting_optional(&self.endpoint)
    }

    fn save_address(
        &self,
        name: &'static str,
        path: &str,
        reference_customer: &str,
        address: &Address,
    ) -> Result<PreparedRequest<Address>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        Operation::post(name, path)
            .param("ReferenceCustomer", reference_customer)
            .json(address)?
            .expecting(&self.endpoint)
    }

    /// `None` when no payment settings are recorded.
    pub fn retrieve_payment_settings(
        &self,
        reference_customer: &str,
    ) -> Result<PreparedRequest<Option<PaymentSettings>>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        Operation::get("retrieve payment settings", "/v1/CustomerSettingsPayment")
            .param("ReferenceCustomer", reference_customer)
            .expecting_optional(&self.endpoint)
    }

    pub fn save_payment_settings(
        &self,
        reference_customer: &str,
        settings: &PaymentSettings,
    ) -> Result<PreparedRequest<PaymentSettings>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        Operation::post("update payment settings", "/v1/CustomerSettingsPayment")
            .param("ReferenceCustomer", reference_customer)
            .json(settings)?
            .expecting(&self.endpoint)
    }

    /// Erase the personal data of a customer. Irreversible.
    pub fn anonymize_customer(
        &self,
        reference_customer: &str,
    ) -> Result<PreparedRequest<Customer>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        Operation::post("anonymize a customer", "/v1/Customer/Anonymization")
            .param("ReferenceCustomer", reference_customer)
            .expecting(&self.endpoint)
    }
}
