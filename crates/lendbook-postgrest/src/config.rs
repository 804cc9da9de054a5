//! Connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PostgrestError;

/// Connection settings for the REST endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostgrestConfig {
    /// Project URL, e.g. `https://abc.example.co`.
    #[serde(default)]
    pub url: String,

    /// Public API key sent as `apikey`.
    #[serde(default)]
    pub api_key: String,

    /// User access token. Falls back to the API key for `Authorization`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Postgres schema to target instead of the default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// Ordering applied to range selects, e.g. `created_at.desc`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<String>,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub request_timeout_ms: u64,
}

fn default_timeout_ms() -> u64 {
    10_000
}

impl PostgrestConfig {
    /// Create settings for a project URL and API key.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            access_token: None,
            schema: None,
            order: None,
            request_timeout_ms: default_timeout_ms(),
        }
    }

    /// Authenticate as a signed-in user.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Target a non-default schema.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Order range selects.
    pub fn with_order(mut self, order: impl Into<String>) -> Self {
        self.order = Some(order.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Base URL of the REST API, without a trailing slash.
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.url.trim_end_matches('/'))
    }

    /// Token sent in the `Authorization` header.
    pub fn bearer_token(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.api_key)
    }

    /// Check the settings are complete.
    pub fn validate(&self) -> Result<(), PostgrestError> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(PostgrestError::InvalidConfig(format!(
                "url must start with http:// or https://, got '{}'",
                self.url
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(PostgrestError::InvalidConfig(
                "api_key is required".to_string(),
            ));
        }
        Ok(())
    }
}
