//! Request/response mapping shared by every catalogue entry.
//!
//! # Design
//! An `Operation` collects the operation name, method, path template and the
//! tagged parameters (query, path segment, JSON body). Absent parameters are
//! dropped at this point, so the outgoing request only carries what the
//! caller supplied. `expecting*` pairs the built `HttpRequest` with the rule
//! that interprets the response, yielding a `PreparedRequest<T>` that can be
//! executed by any transport.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ErrorRecord, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{PaginatedList, SubscriptionState};

/// Base URL and authorization shared by all requests of one API handle.
#[derive(Clone)]
pub(crate) struct Endpoint {
    base_url: String,
    authorization: Option<String>,
}

impl Endpoint {
    pub(crate) fn new(config: &ClientConfig) -> Self {
        let authorization = config.credentials().map(|c| {
            let token = STANDARD.encode(format!("{}:{}", c.agent_key, c.api_key));
            format!("Basic {token}")
        });
        Self {
            base_url: config.base_url().to_string(),
            authorization,
        }
    }

    pub(crate) fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("base_url", &self.base_url)
            .field("authenticated", &self.authorization.is_some())
            .finish()
    }
}

/// A scalar that can be sent as a query-string value.
pub(crate) trait QueryValue {
    fn to_query(&self) -> String;
}

impl QueryValue for &str {
    fn to_query(&self) -> String {
        (*self).to_string()
    }
}

impl QueryValue for String {
    fn to_query(&self) -> String {
        self.clone()
    }
}

impl QueryValue for bool {
    fn to_query(&self) -> String {
        self.to_string()
    }
}

impl QueryValue for i64 {
    fn to_query(&self) -> String {
        self.to_string()
    }
}

impl QueryValue for DateTime<Utc> {
    fn to_query(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

impl QueryValue for SubscriptionState {
    fn to_query(&self) -> String {
        self.as_str().to_string()
    }
}

/// Current UTC time at millisecond precision, the default usage date stamp.
pub(crate) fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// A declared remote operation being assembled.
#[derive(Debug)]
pub(crate) struct Operation {
    name: &'static str,
    method: HttpMethod,
    path: String,
    query: Vec<(String, String)>,
    body: Option<String>,
}

impl Operation {
    pub(crate) fn get(name: &'static str, path: &str) -> Self {
        Self::new(name, HttpMethod::Get, path)
    }

    pub(crate) fn post(name: &'static str, path: &str) -> Self {
        Self::new(name, HttpMethod::Post, path)
    }

    fn new(name: &'static str, method: HttpMethod, path: &str) -> Self {
        Self {
            name,
            method,
            path: path.to_string(),
            query: Vec::new(),
            body: None,
        }
    }

    /// Add a query-string parameter.
    pub(crate) fn param<V: QueryValue>(mut self, key: &str, value: V) -> Self {
        self.query.push((key.to_string(), value.to_query()));
        self
    }

    /// Add a query-string parameter only when `value` is present.
    pub(crate) fn opt_param<V: QueryValue>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// Add every member of a serializable options struct as a query-string
    /// parameter. Null members are skipped; nested values are rejected.
    pub(crate) fn params<P: Serialize>(mut self, params: &P) -> Result<Self> {
        let value =
            serde_json::to_value(params).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let Value::Object(members) = value else {
            return Err(ApiError::Serialization(format!(
                "{}: query parameters must serialize to an object",
                self.name
            )));
        };
        for (key, value) in members {
            let text = match value {
                Value::Null => continue,
                Value::String(s) => s,
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(ApiError::Serialization(format!(
                        "{}: query parameter `{key}` is not a scalar",
                        self.name
                    )));
                }
            };
            self.query.push((key, text));
        }
        Ok(self)
    }

    /// Substitute a `{key}` path segment.
    pub(crate) fn segment(mut self, key: &str, value: i64) -> Self {
        self.path = self.path.replace(&format!("{{{key}}}"), &value.to_string());
        self
    }

    /// Attach a JSON body.
    pub(crate) fn json<B: Serialize>(mut self, body: &B) -> Result<Self> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        self.body = Some(body);
        Ok(self)
    }

    fn build(self, endpoint: &Endpoint) -> Result<(&'static str, HttpRequest)> {
        let mut url = url::Url::parse(&format!("{}{}", endpoint.base_url, self.path))
            .map_err(|e| ApiError::Serialization(format!("{}: invalid URL: {e}", self.name)))?;
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&self.query);
        }

        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if self.body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        if let Some(authorization) = &endpoint.authorization {
            headers.push(("authorization".to_string(), authorization.clone()));
        }

        Ok((
            self.name,
            HttpRequest {
                method: self.method,
                url: url.into(),
                headers,
                body: self.body,
            },
        ))
    }

    /// The response body is the declared entity.
    pub(crate) fn expecting<T: DeserializeOwned>(
        self,
        endpoint: &Endpoint,
    ) -> Result<PreparedRequest<T>> {
        let (operation, request) = self.build(endpoint)?;
        Ok(PreparedRequest {
            operation,
            request,
            interpret: expect_body::<T>,
        })
    }

    /// A paginated list; 204 No Content is the empty page.
    pub(crate) fn expecting_list<T: DeserializeOwned>(
        self,
        endpoint: &Endpoint,
    ) -> Result<PreparedRequest<PaginatedList<T>>> {
        let (operation, request) = self.build(endpoint)?;
        Ok(PreparedRequest {
            operation,
            request,
            interpret: expect_list::<T>,
        })
    }

    /// An entity that may not exist; 404 Not Found and 204 No Content are `None`.
    pub(crate) fn expecting_optional<T: DeserializeOwned>(
        self,
        endpoint: &Endpoint,
    ) -> Result<PreparedRequest<Option<T>>> {
        let (operation, request) = self.build(endpoint)?;
        Ok(PreparedRequest {
            operation,
            request,
            interpret: expect_optional::<T>,
        })
    }
}

/// A built request paired with the rule that interprets its response.
///
/// Execute `request()` with any HTTP stack and hand the outcome to `parse`,
/// or let a [`Transport`] do both through `execute`.
pub struct PreparedRequest<T> {
    operation: &'static str,
    request: HttpRequest,
    interpret: fn(HttpResponse) -> Result<T>,
}

impl<T> fmt::Debug for PreparedRequest<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreparedRequest")
            .field("operation", &self.operation)
            .field("method", &self.request.method)
            .field("url", &self.request.url)
            .finish()
    }
}

impl<T> PreparedRequest<T> {
    /// Human-readable operation name, e.g. "retrieve a feature".
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    pub fn request(&self) -> &HttpRequest {
        &self.request
    }

    /// Interpret the response to this request.
    pub fn parse(&self, response: HttpResponse) -> Result<T> {
        (self.interpret)(response)
    }

    /// Run the request through `transport` and interpret the response.
    #[instrument(skip_all, fields(operation = self.operation, method = %self.request.method))]
    pub fn execute<X: Transport + ?Sized>(self, transport: &X) -> Result<T> {
        debug!(url = %self.request.url, "sending request");
        let response = transport.execute(&self.request)?;
        debug!(status = response.status, "received response");
        self.parse(response)
    }
}

fn expect_body<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    if !response.is_success() {
        return Err(error_from_response(response));
    }
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn expect_list<T: DeserializeOwned>(response: HttpResponse) -> Result<PaginatedList<T>> {
    if response.status == 204 {
        return Ok(PaginatedList::default());
    }
    expect_body(response)
}

fn expect_optional<T: DeserializeOwned>(response: HttpResponse) -> Result<Option<T>> {
    match response.status {
        204 | 404 => Ok(None),
        _ => expect_body(response).map(Some),
    }
}

/// Turn a non-2xx response into an `ApiError`.
///
/// 422 bodies are an array of records (a lone object is accepted too); any
/// other status carries a single record. Every record is kept, but a body
/// whose records all lack both code and message becomes `UnexpectedStatus`.
pub(crate) fn error_from_response(response: HttpResponse) -> ApiError {
    let HttpResponse { status, body, .. } = response;
    let errors = parse_error_records(status, &body);

    if errors.iter().all(ErrorRecord::is_blank) {
        warn!(status, "error response without a readable error body");
        return ApiError::UnexpectedStatus { status, body };
    }

    warn!(
        status,
        count = errors.len(),
        code = errors.iter().find_map(|e| e.code.as_deref()).unwrap_or_default(),
        "server reported an error"
    );
    ApiError::Remote { status, errors }
}

fn parse_error_records(status: u16, body: &str) -> Vec<ErrorRecord> {
    if body.trim().is_empty() {
        return Vec::new();
    }
    if status == 422 {
        if let Ok(errors) = serde_json::from_str::<Vec<ErrorRecord>>(body) {
            return errors;
        }
    }
    serde_json::from_str::<ErrorRecord>(body)
        .map(|e| vec![e])
        .unwrap_or_default()
}
