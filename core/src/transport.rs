//! Executing prepared requests.
//!
//! # Design
//! `Transport` is the seam between the pure request/response mapping and the
//! network. `UreqTransport` (default `ureq` feature) is a blocking
//! implementation that returns every HTTP status as data, so status
//! interpretation stays in the mapper. `ProAbonoClient` pairs the catalogue
//! with a transport for callers who do not need the split.

#[cfg(feature = "ureq")]
use std::time::Duration;

use crate::api::ProAbonoApi;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{HttpRequest, HttpResponse};
use crate::mapper::PreparedRequest;

/// Performs one HTTP round-trip.
///
/// Implementations return non-2xx responses as `Ok`; only failures to obtain
/// a response at all are `ApiError::Transport`.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a shared `ureq::Agent`.
#[cfg(feature = "ureq")]
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

#[cfg(feature = "ureq")]
impl UreqTransport {
    pub fn new() -> Self {
        Self::from_config(
            ureq::Agent::config_builder()
                .http_status_as_error(false)
                .build(),
        )
    }

    /// Transport whose requests fail after `timeout` overall.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::from_config(
            ureq::Agent::config_builder()
                .http_status_as_error(false)
                .timeout_global(Some(timeout))
                .build(),
        )
    }

    fn from_config(config: ureq::config::Config) -> Self {
        Self {
            agent: config.new_agent(),
        }
    }
}

#[cfg(feature = "ureq")]
impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "ureq")]
impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        use crate::error::ApiError;
        use crate::http::HttpMethod;

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// The endpoint catalogue bound to a transport.
///
/// ```no_run
/// use proabono_core::{ClientConfig, FeatureOptions, ProAbonoClient};
///
/// # fn main() -> Result<(), proabono_core::ApiError> {
/// let client = ProAbonoClient::new(&ClientConfig::from_env()?);
/// let prepared = client
///     .api()
///     .retrieve_feature_for_customer("seats", "cust-42", &FeatureOptions::default())?;
/// let feature = client.send(prepared)?;
/// println!("{:?}", feature.characteristics.quantity_current);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ProAbonoClient<T> {
    api: ProAbonoApi,
    transport: T,
}

#[cfg(feature = "ureq")]
impl ProAbonoClient<UreqTransport> {
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> ProAbonoClient<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            api: ProAbonoApi::new(config),
            transport,
        }
    }

    pub fn api(&self) -> &ProAbonoApi {
        &self.api
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Execute a request built by [`api`](Self::api) and interpret the
    /// response.
    pub fn send<O>(&self, prepared: PreparedRequest<O>) -> Result<O> {
        prepared.execute(&self.transport)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::api::Pagination;
    use crate::error::ApiError;

    /// Replays canned responses and records the requests it saw.
    struct Replay {
        responses: RefCell<Vec<HttpResponse>>,
        seen: RefCell<Vec<HttpRequest>>,
    }

    impl Replay {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: RefCell::new(responses),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl Transport for Replay {
        fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
            self.seen.borrow_mut().push(request.clone());
            let mut responses = self.responses.borrow_mut();
            if responses.is_empty() {
                return Err(ApiError::Transport("connection refused".to_string()));
            }
            Ok(responses.remove(0))
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::with_base_url("http://localhost:3000")
            .unwrap()
            .with_credentials("agent", "key")
    }

    #[test]
    fn send_runs_request_and_interprets_response() {
        let replay = Replay::new(vec![HttpResponse::new(
            200,
            r#"{"Id": 1, "ReferenceCustomer": "cust-42", "Email": "a@b.c"}"#,
        )]);
        let client = ProAbonoClient::with_transport(&config(), &replay);

        let customer = client
            .send(client.api().retrieve_customer("cust-42").unwrap())
            .unwrap();
        assert_eq!(customer.info.email.as_deref(), Some("a@b.c"));

        let seen = replay.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].query("ReferenceCustomer").as_deref(), Some("cust-42"));
        assert!(seen[0].header("authorization").is_some());
    }

    #[test]
    fn transport_failure_is_propagated() {
        let client = ProAbonoClient::with_transport(&config(), Replay::new(Vec::new()));
        let err = client
            .send(client.api().list_customers(None, Pagination::default()).unwrap())
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
