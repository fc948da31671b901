//! Error types for the ProAbono client.
//!
//! # Design
//! Every failure surfaces as one `ApiError`. Server-reported failures land in
//! `Remote` with the HTTP status and all error records the server sent (one
//! record, or an array of records for 422 validation failures). A non-2xx
//! response whose body carries no parseable record becomes
//! `UnexpectedStatus` rather than being swallowed. The 204 and 404 outcomes
//! that some operations treat as normal never reach this type.

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ApiError>;

/// One error reported by the server.
#[skip_serializing_none]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ErrorRecord {
    /// Machine-readable error code, e.g. `Error.Customer.NotFound`.
    pub code: Option<String>,
    /// Human-readable message.
    pub message: Option<String>,
    /// Offending request member, for validation errors.
    #[serde(alias = "Target")]
    pub field: Option<String>,
}

impl ErrorRecord {
    /// Neither code nor message is set.
    pub fn is_blank(&self) -> bool {
        self.code.is_none() && self.message.is_none()
    }
}

/// Errors returned by `ProAbonoApi` builders and `PreparedRequest::parse`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A parameter failed a local check; no request was sent.
    #[error("invalid argument `{parameter}`: {reason}")]
    InvalidArgument { parameter: &'static str, reason: String },

    /// The server returned a non-2xx status with one or more error records.
    #[error("HTTP {status}: {}", summary(.errors))]
    Remote { status: u16, errors: Vec<ErrorRecord> },

    /// The server returned a non-2xx status without a readable error body.
    #[error("HTTP {status}: unexpected response")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The transport failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn summary(errors: &[ErrorRecord]) -> &str {
    errors
        .first()
        .and_then(|e| e.message.as_deref())
        .unwrap_or("remote error")
}

impl ApiError {
    pub(crate) fn invalid(parameter: &'static str, reason: impl Into<String>) -> Self {
        ApiError::InvalidArgument {
            parameter,
            reason: reason.into(),
        }
    }

    /// HTTP status of the response that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Remote { status, .. } | ApiError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// All error records reported by the server. Empty for local failures.
    pub fn errors(&self) -> &[ErrorRecord] {
        match self {
            ApiError::Remote { errors, .. } => errors,
            _ => &[],
        }
    }

    /// The first error record reported by the server.
    pub fn error(&self) -> Option<&ErrorRecord> {
        self.errors().first()
    }

    /// Whether this is a 422 validation failure reported by the server.
    pub fn is_validation(&self) -> bool {
        matches!(self, ApiError::Remote { status: 422, .. })
    }
}
