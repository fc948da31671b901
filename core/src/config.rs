//! Client configuration.
//!
//! The endpoint is `https://api-{businessId}.{domain}`. Tests and proxies can
//! replace it with an explicit base URL.

use std::fmt;

use thiserror::Error;

/// Default API domain.
pub const DEFAULT_DOMAIN: &str = "proabono.com";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing configuration value: {0}")]
    Missing(&'static str),

    #[error("invalid configuration value: {0}")]
    Invalid(&'static str),
}

/// HTTP Basic credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub agent_key: String,
    pub api_key: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("agent_key", &self.agent_key)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Where and how to reach the API.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_url: String,
    credentials: Option<Credentials>,
}

impl ClientConfig {
    /// Endpoint of a business on the default domain.
    pub fn for_business(business_id: &str) -> Result<Self, ConfigError> {
        Self::for_business_on(business_id, DEFAULT_DOMAIN)
    }

    pub fn for_business_on(business_id: &str, domain: &str) -> Result<Self, ConfigError> {
        if business_id.trim().is_empty() || business_id.contains(['/', '.', ':']) {
            return Err(ConfigError::Invalid("business_id"));
        }
        if domain.trim().is_empty() {
            return Err(ConfigError::Invalid("domain"));
        }
        Ok(Self {
            base_url: format!("https://api-{business_id}.{domain}"),
            credentials: None,
        })
    }

    /// Explicit endpoint, e.g. a local mock server.
    pub fn with_base_url(base_url: &str) -> Result<Self, ConfigError> {
        let parsed = url::Url::parse(base_url).map_err(|_| ConfigError::Invalid("base_url"))?;
        if parsed.cannot_be_a_base() {
            return Err(ConfigError::Invalid("base_url"));
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials: None,
        })
    }

    pub fn with_credentials(mut self, agent_key: &str, api_key: &str) -> Self {
        self.credentials = Some(Credentials {
            agent_key: agent_key.to_string(),
            api_key: api_key.to_string(),
        });
        self
    }

    /// Load configuration from environment variables.
    ///
    /// `PROABONO_BASE_URL` wins over `PROABONO_BUSINESS_ID` /
    /// `PROABONO_DOMAIN`. `PROABONO_AGENT_KEY` and `PROABONO_API_KEY` are
    /// required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = match lookup("PROABONO_BASE_URL") {
            Some(base_url) => Self::with_base_url(&base_url)?,
            None => {
                let business_id = lookup("PROABONO_BUSINESS_ID")
                    .ok_or(ConfigError::Missing("PROABONO_BUSINESS_ID"))?;
                let domain =
                    lookup("PROABONO_DOMAIN").unwrap_or_else(|| DEFAULT_DOMAIN.to_string());
                Self::for_business_on(&business_id, &domain)?
            }
        };

        let agent_key =
            lookup("PROABONO_AGENT_KEY").ok_or(ConfigError::Missing("PROABONO_AGENT_KEY"))?;
        let api_key = lookup("PROABONO_API_KEY").ok_or(ConfigError::Missing("PROABONO_API_KEY"))?;

        Ok(config.with_credentials(&agent_key, &api_key))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn business_endpoint() {
        let config = ClientConfig::for_business("acme").unwrap();
        assert_eq!(config.base_url(), "https://api-acme.proabono.com");
        assert!(config.credentials().is_none());
    }

    #[test]
    fn rejects_business_id_with_separators() {
        assert!(matches!(
            ClientConfig::for_business("acme.evil"),
            Err(ConfigError::Invalid("business_id"))
        ));
        assert!(ClientConfig::for_business("").is_err());
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let config = ClientConfig::with_base_url("http://127.0.0.1:3000/").unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:3000");
        assert!(ClientConfig::with_base_url("not a url").is_err());
    }

    #[test]
    fn env_lookup_builds_business_endpoint() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("PROABONO_BUSINESS_ID", "acme"),
            ("PROABONO_DOMAIN", "proabono.test"),
            ("PROABONO_AGENT_KEY", "agent"),
            ("PROABONO_API_KEY", "secret"),
        ]))
        .unwrap();
        assert_eq!(config.base_url(), "https://api-acme.proabono.test");
        assert_eq!(config.credentials().unwrap().agent_key, "agent");
    }

    #[test]
    fn env_lookup_requires_keys() {
        let err = ClientConfig::from_lookup(lookup(&[("PROABONO_BUSINESS_ID", "acme")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("PROABONO_AGENT_KEY")));

        let err = ClientConfig::from_lookup(lookup(&[("PROABONO_AGENT_KEY", "a")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("PROABONO_BUSINESS_ID")));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ClientConfig::for_business("acme")
            .unwrap()
            .with_credentials("agent", "super-secret");
        let debug = format!("{config:?}");
        assert!(debug.contains("agent"));
        assert!(!debug.contains("super-secret"));
    }
}
