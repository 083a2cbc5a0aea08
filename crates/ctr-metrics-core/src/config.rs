//! Client configuration, read once at construction.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `MOZ_API_KEY` | unset (synthetic-only mode) |
//! | `MOZ_API_SECRET` | unset (synthetic-only mode) |
//! | `MOZ_API_BASE_URL` | `https://lsapi.seomoz.com/v2` |
//! | `MOZ_TOKEN_URL` | `https://lsapi.seomoz.com/v2/oauth/token` |
//! | `MOZ_TIMEOUT_MS` | `10000` |
//! | `MOZ_MAX_RETRIES` | `0` |
//! | `MOZ_BREAKER_THRESHOLD` | `3` |
//! | `MOZ_BREAKER_COOLDOWN_SECS` | `30` |

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use crate::circuit_breaker::CircuitBreakerConfig;
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::retry::RetryConfig;
use crate::ValidationError;

pub const DEFAULT_BASE_URL: &str = "https://lsapi.seomoz.com/v2";
pub const DEFAULT_TOKEN_URL: &str = "https://lsapi.seomoz.com/v2/oauth/token";

const ENV_API_KEY: &str = "MOZ_API_KEY";
const ENV_API_SECRET: &str = "MOZ_API_SECRET";
const ENV_BASE_URL: &str = "MOZ_API_BASE_URL";
const ENV_TOKEN_URL: &str = "MOZ_TOKEN_URL";
const ENV_TIMEOUT_MS: &str = "MOZ_TIMEOUT_MS";
const ENV_MAX_RETRIES: &str = "MOZ_MAX_RETRIES";
const ENV_BREAKER_THRESHOLD: &str = "MOZ_BREAKER_THRESHOLD";
const ENV_BREAKER_COOLDOWN: &str = "MOZ_BREAKER_COOLDOWN_SECS";

/// Connection settings for the upstream metrics API.
#[derive(Clone, PartialEq)]
pub struct MetricsConfig {
    pub api_key: String,
    pub api_secret: String,
    pub base_url: String,
    pub token_url: String,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: String::from(DEFAULT_BASE_URL),
            token_url: String::from(DEFAULT_TOKEN_URL),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetryConfig::no_retry(),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

impl MetricsConfig {
    pub fn with_credentials(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Self::default()
        }
    }

    /// Reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when a numeric variable does not parse or a
    /// URL variable is not http(s).
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// Same as [`from_env`](Self::from_env).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();

        let base_url = match read(ENV_BASE_URL) {
            Some(value) => parse_url(ENV_BASE_URL, value)?,
            None => defaults.base_url,
        };
        let token_url = match read(ENV_TOKEN_URL) {
            Some(value) => parse_url(ENV_TOKEN_URL, value)?,
            None => defaults.token_url,
        };

        let timeout_ms = parse_number(ENV_TIMEOUT_MS, read(ENV_TIMEOUT_MS), defaults.timeout_ms)?;
        let max_retries = parse_number(ENV_MAX_RETRIES, read(ENV_MAX_RETRIES), 0)?;
        let failure_threshold = parse_number(
            ENV_BREAKER_THRESHOLD,
            read(ENV_BREAKER_THRESHOLD),
            u64::from(defaults.circuit_breaker.failure_threshold),
        )?;
        let cooldown_secs = parse_number(
            ENV_BREAKER_COOLDOWN,
            read(ENV_BREAKER_COOLDOWN),
            defaults.circuit_breaker.cooldown.as_secs(),
        )?;

        Ok(Self {
            api_key: read(ENV_API_KEY).unwrap_or_default(),
            api_secret: read(ENV_API_SECRET).unwrap_or_default(),
            base_url,
            token_url,
            timeout_ms,
            retry: RetryConfig::exponential(u32::try_from(max_retries).unwrap_or(u32::MAX)),
            circuit_breaker: CircuitBreakerConfig {
                failure_threshold: u32::try_from(failure_threshold.max(1)).unwrap_or(u32::MAX),
                cooldown: Duration::from_secs(cooldown_secs),
            },
        })
    }

    /// Both key and secret present; otherwise the client stays synthetic-only.
    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_secret.trim().is_empty()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }
}

impl Debug for MetricsConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .field("base_url", &self.base_url)
            .field("token_url", &self.token_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("retry", &self.retry)
            .field("circuit_breaker", &self.circuit_breaker)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<unset>"
    } else {
        "<redacted>"
    }
}

fn parse_number(name: &'static str, raw: Option<String>, default: u64) -> Result<u64, ValidationError> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .parse::<u64>()
            .map_err(|_| ValidationError::InvalidNumber { name, value }),
    }
}

fn parse_url(name: &'static str, value: String) -> Result<String, ValidationError> {
    if value.starts_with("https://") || value.starts_with("http://") {
        Ok(value)
    } else {
        Err(ValidationError::InvalidUrl { name, value })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn empty_environment_yields_synthetic_only_defaults() {
        let config = MetricsConfig::from_lookup(lookup_from(&[])).expect("defaults must load");
        assert!(!config.has_credentials());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(!config.retry.is_enabled());
    }

    #[test]
    fn blank_secret_counts_as_missing() {
        let config = MetricsConfig::from_lookup(lookup_from(&[
            ("MOZ_API_KEY", "key"),
            ("MOZ_API_SECRET", "   "),
        ]))
        .expect("config must load");
        assert!(!config.has_credentials());
    }

    #[test]
    fn reads_overrides() {
        let config = MetricsConfig::from_lookup(lookup_from(&[
            ("MOZ_API_KEY", "key"),
            ("MOZ_API_SECRET", "secret"),
            ("MOZ_API_BASE_URL", "http://localhost:8080/v2"),
            ("MOZ_TIMEOUT_MS", "2500"),
            ("MOZ_MAX_RETRIES", "2"),
            ("MOZ_BREAKER_COOLDOWN_SECS", "5"),
        ]))
        .expect("config must load");

        assert!(config.has_credentials());
        assert_eq!(config.base_url, "http://localhost:8080/v2");
        assert_eq!(config.timeout_ms, 2500);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.circuit_breaker.cooldown, Duration::from_secs(5));
    }

    #[test]
    fn rejects_non_numeric_timeout() {
        let err = MetricsConfig::from_lookup(lookup_from(&[("MOZ_TIMEOUT_MS", "soon")]))
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidNumber { name: "MOZ_TIMEOUT_MS", .. }));
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = MetricsConfig::from_lookup(lookup_from(&[("MOZ_API_BASE_URL", "ftp://x")]))
            .expect_err("must fail");
        assert!(matches!(err, ValidationError::InvalidUrl { .. }));
    }

    #[test]
    fn debug_output_never_shows_secrets() {
        let config = MetricsConfig::with_credentials("key-id", "top-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("top-secret"));
        assert!(!rendered.contains("key-id"));
        assert!(rendered.contains("<redacted>"));
    }
}
