//! CLI configuration.

use anyhow::{Context, Result};
use lendbook_postgrest::PostgrestConfig;
use lendbook_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Environment variable overriding `backend.url`.
pub const ENV_URL: &str = "LENDBOOK_URL";
/// Environment variable overriding `backend.api_key`.
pub const ENV_API_KEY: &str = "LENDBOOK_API_KEY";
/// Environment variable overriding `backend.access_token`.
pub const ENV_ACCESS_TOKEN: &str = "LENDBOOK_ACCESS_TOKEN";

/// File names searched for, in order.
pub const CONFIG_NAMES: [&str; 3] = ["lendbook.toml", ".lendbook.toml", "lendbook.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LendbookConfig {
    /// REST backend connection.
    #[serde(default)]
    pub backend: PostgrestConfig,

    /// Retry and cache settings shared by every table.
    #[serde(default)]
    pub store: StoreConfig,
}

impl LendbookConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;
        Self::parse(path, &content)
    }

    /// Parse config text, as JSON when `path` ends in `.json` and TOML otherwise.
    pub fn parse(path: &str, content: &str) -> Result<Self> {
        if path.ends_with(".json") {
            serde_json::from_str(content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(content).with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Apply `LENDBOOK_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides looked up by variable name. Empty values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_URL) {
            self.backend.url = url;
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.backend.api_key = key;
        }
        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            self.backend.access_token = Some(token);
        }
    }

    /// Copy with secrets hidden, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.backend.api_key.is_empty() {
            config.backend.api_key = redact(&config.backend.api_key);
        }
        config.backend.access_token = config.backend.access_token.as_deref().map(redact);
        config
    }

    /// Check both sections, collecting every problem.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if let Err(e) = self.backend.validate() {
            problems.push(e.to_string());
        }
        if let Err(e) = self.store.for_table("borrowers").validate() {
            problems.push(e.to_string());
        }
        problems
    }
}

fn redact(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}…", visible)
}

/// Generate a default lendbook.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Lendbook configuration

[backend]
url = "https://your-project.example.co"
# Public API key. Can also be set with {api_key}.
api_key = ""
# access_token = ""
order = "created_at.desc"
request_timeout_ms = 10000

[store]
# Attempts per operation, including the first.
max_retries = 3
# Base delay between attempts.
retry_delay_ms = 1000
# "linear" (retry n waits n times the base), "fixed", "exponential" or "none"
backoff = "linear"
# Cap on one delay with exponential backoff.
max_retry_delay_ms = 30000
cache_ttl_ms = 300000
# "transient_only" or "always"
retry_mode = "transient_only"
"#,
        api_key = ENV_API_KEY
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use lendbook_store::{BackoffKind, RetryMode};
    use std::collections::HashMap;

    #[test]
    fn test_default_config_parses() {
        let config = LendbookConfig::parse("lendbook.toml", &generate_default_config()).unwrap();

        assert_eq!(config.backend.order.as_deref(), Some("created_at.desc"));
        assert_eq!(config.store.max_retries, 3);
        assert_eq!(config.store.retry_delay_ms, 1000);
        assert_eq!(config.store.cache_ttl_ms, 300_000);
        assert_eq!(config.store.backoff, BackoffKind::Linear);
        assert_eq!(config.store.retry_mode, RetryMode::TransientOnly);
        assert!(config.store.table.is_empty());
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = LendbookConfig::parse("lendbook.toml", "").unwrap();
        assert_eq!(config.store, StoreConfig::default());
        assert_eq!(config.backend.request_timeout_ms, 10_000);
    }

    #[test]
    fn test_json_config() {
        let config = LendbookConfig::parse(
            "lendbook.json",
            r#"{"backend": {"url": "https://x.example.co", "api_key": "k"}, "store": {"retry_mode": "always"}}"#,
        )
        .unwrap();
        assert_eq!(config.store.retry_mode, RetryMode::Always);
        assert!(config.problems().is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            (ENV_URL, "https://env.example.co"),
            (ENV_API_KEY, ""),
            (ENV_ACCESS_TOKEN, "jwt"),
        ]
        .into_iter()
        .collect();

        let mut config = LendbookConfig::default();
        config.backend.api_key = "file-key".to_string();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.backend.url, "https://env.example.co");
        assert_eq!(config.backend.api_key, "file-key");
        assert_eq!(config.backend.access_token.as_deref(), Some("jwt"));
    }

    #[test]
    fn test_redacted() {
        let mut config = LendbookConfig::default();
        config.backend.api_key = "abcdefgh".to_string();
        assert_eq!(config.redacted().backend.api_key, "abcd…");
    }

    #[test]
    fn test_problems() {
        let mut config = LendbookConfig::default();
        config.store.max_retries = 0;
        assert_eq!(config.problems().len(), 2);
    }
}
