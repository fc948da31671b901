use super::{FeatureListOptions, FeatureOptions, ProAbonoApi};
use crate::error::Result;
use crate::guard;
use crate::mapper::{Operation, PreparedRequest};
use crate::types::{Feature, PaginatedList};

impl ProAbonoApi {
    /// A feature of the catalogue.
    pub fn retrieve_feature(
        &self,
        reference_feature: &str,
        options: &FeatureOptions,
    ) -> Result<PreparedRequest<Feature>> {
        guard::not_empty(reference_feature, "referenceFeature")?;
        options.validate()?;
        Operation::get("retrieve a feature", "/v1/Feature")
            .param("ReferenceFeature", reference_feature)
            .params(options)?
            .expecting(&self.endpoint)
    }

    /// A feature as seen by a customer, with its current usage.
    pub fn retrieve_feature_for_customer(
        &self,
        reference_feature: &str,
        reference_customer: &str,
        options: &FeatureOptions,
    ) -> Result<PreparedRequest<Feature>> {
        guard::not_empty(reference_feature, "referenceFeature")?;
        guard::not_empty(reference_customer, "referenceCustomer")?;
        options.validate()?;
        Operation::get("retrieve a feature for a customer", "/v1/Feature")
            .param("ReferenceFeature", reference_feature)
            .param("ReferenceCustomer", reference_customer)
            .params(options)?
            .expecting(&self.endpoint)
    }

    pub fn retrieve_features(
        &self,
        options: &FeatureListOptions,
    ) -> Result<PreparedRequest<PaginatedList<Feature>>> {
        options.validate()?;
        Operation::get("retrieve all features", "/v1/Features")
            .params(options)?
            .expecting_list(&self.endpoint)
    }

    pub fn retrieve_features_for_customer(
        &self,
        reference_customer: &str,
        options: &FeatureListOptions,
    ) -> Result<PreparedRequest<PaginatedList<Feature>>> {
        guard::not_empty(reference_customer, "referenceCustomer")?;
        options.validate()?;
        Operation::get("retrieve features for a customer", "/v1/Features")
            .param("ReferenceCustomer", reference_customer)
            .params(options)?
            .expecting_list(&self.endpoint)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::test_support::api;
    use crate::api::{FeatureListOptions, FeatureOptions, Pagination};
    use crate::error::ApiError;
    use crate::http::{HttpMethod, HttpResponse};

    #[test]
    fn feature_for_customer_without_language() {
        let prepared = api()
            .retrieve_feature_for_customer("seats", "cust-42", &FeatureOptions::default())
            .unwrap();
        let req = prepared.request();
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.url.starts_with("https://api-acme.proabono.test/v1/Feature?"));
        assert_eq!(req.query("ReferenceFeature").as_deref(), Some("seats"));
        assert_eq!(req.query("ReferenceCustomer").as_deref(), Some("cust-42"));
        assert!(req.query("Language").is_none());
        assert!(req.query("Html").is_none());
    }

    #[test]
    fn feature_options_become_query_params() {
        let options = FeatureOptions {
            reference_segment: Some("eu".to_string()),
            language: Some("fr".to_string()),
            html: Some(false),
        };
        let prepared = api().retrieve_feature("seats", &options).unwrap();
        let req = prepared.request();
        assert_eq!(req.query("ReferenceSegment").as_deref(), Some("eu"));
        assert_eq!(req.query("Language").as_deref(), Some("fr"));
        assert_eq!(req.query("Html").as_deref(), Some("false"));
    }

    #[test]
    fn empty_reference_is_rejected() {
        let err = api()
            .retrieve_feature("", &FeatureOptions::default())
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::InvalidArgument {
                parameter: "referenceFeature",
                ..
            }
        ));
    }

    #[test]
    fn feature_list_paging_and_no_content() {
        let options = FeatureListOptions {
            pagination: Pagination::page(3, 20),
            ..Default::default()
        };
        let prepared = api().retrieve_features(&options).unwrap();
        assert_eq!(prepared.request().query("Page").as_deref(), Some("3"));
        assert_eq!(prepared.request().query("SizePage").as_deref(), Some("20"));

        let list = prepared.parse(HttpResponse::new(204, "")).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.total_items, 0);
    }

    #[test]
    fn oversize_page_is_rejected_before_building() {
        let options = FeatureListOptions {
            pagination: Pagination::page(1, 5000),
            ..Default::default()
        };
        assert!(api().retrieve_features_for_customer("cust-42", &options).is_err());
    }

    #[test]
    fn feature_response_is_parsed() {
        let prepared = api()
            .retrieve_feature("seats", &FeatureOptions::default())
            .unwrap();
        let feature = prepared
            .parse(HttpResponse::new(
                200,
                r#"{"Id": 7, "ReferenceFeature": "seats", "TypeFeature": "Limitation",
                    "IsVisible": true, "QuantityIncluded": 10, "Unknown": 1}"#,
            ))
            .unwrap();
        assert_eq!(feature.id, 7);
        assert_eq!(feature.characteristics.reference_feature.as_deref(), Some("seats"));
        assert_eq!(feature.characteristics.quantity_included, Some(10));
    }
}
