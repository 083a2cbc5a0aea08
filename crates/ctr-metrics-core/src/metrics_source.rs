//! Real-data seam and its error taxonomy.
//!
//! A [`MetricsSource`] fetches and normalizes entities from an upstream API.
//! Every step returns a [`MetricsError`] on failure; the
//! [`MetricsClient`](crate::MetricsClient) facade is the only place those
//! errors are turned into synthetic output.
//!
//! # Error kinds
//!
//! | Kind | Code | Raised when |
//! |------|------|-------------|
//! | `Authentication` | `metrics.authentication` | token endpoint rejected the credentials or was unreachable |
//! | `Transport` | `metrics.transport` | the metrics call failed below HTTP |
//! | `Upstream` | `metrics.upstream` | the metrics endpoint answered non-2xx |
//! | `NoData` | `metrics.no_data` | the metrics endpoint answered with no results |
//! | `Decode` | `metrics.decode` | a response body was not the expected JSON |
//! | `CircuitOpen` | `metrics.circuit_open` | recent failures tripped the breaker |
//! | `MissingCredentials` | `metrics.missing_credentials` | key or secret not configured |
//! | `InvalidTarget` | `metrics.invalid_target` | the lookup key failed validation |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::{BacklinkProfile, DomainMetrics, PageMetrics, Target, ValidationError};

/// Upstream operation, used in log fields and error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DomainMetrics,
    PageMetrics,
    BacklinkProfile,
    KeywordMetrics,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DomainMetrics => "domain_metrics",
            Self::PageMetrics => "page_metrics",
            Self::BacklinkProfile => "backlink_profile",
            Self::KeywordMetrics => "keyword_metrics",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricsErrorKind {
    Authentication,
    Transport,
    Upstream,
    NoData,
    Decode,
    CircuitOpen,
    MissingCredentials,
    InvalidTarget,
}

/// Structured failure of one real-data step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsError {
    kind: MetricsErrorKind,
    message: String,
    status: Option<u16>,
    retryable: bool,
}

impl MetricsError {
    pub fn authentication(message: impl Into<String>) -> Self {
        Self {
            kind: MetricsErrorKind::Authentication,
            message: message.into(),
            status: None,
            retryable: false,
        }
    }

    pub fn transport(message: impl Into<String>, retryable: bool) -> Self {
        Self {
            kind: MetricsErrorKind::Transport,
            message: message.into(),
            status: None,
            retryable,
        }
    }

    pub fn upstream(status: u16, status_text: &str) -> Self {
        Self {
            kind: MetricsErrorKind::Upstream,
            message: format!("upstream returned status {status} {status_text}"),
            status: Some(status),
            retryable: false,
        }
    }

    pub fn no_data(target: &str) -> Self {
        Self {
            kind: MetricsErrorKind::NoData,
            message: format!("upstream returned no results for '{target}'"),
            status: None,
            retryable: false,
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: MetricsErrorKind::Decode,
            message: message.into(),
            status: None,
            retryable: false,
        }
    }

    pub fn circuit_open() -> Self {
        Self {
            kind: MetricsErrorKind::CircuitOpen,
            message: String::from("circuit breaker is open; skipping upstream call"),
            status: None,
            retryable: true,
        }
    }

    pub fn missing_credentials() -> Self {
        Self {
            kind: MetricsErrorKind::MissingCredentials,
            message: String::from("api key and secret are not configured"),
            status: None,
            retryable: false,
        }
    }

    pub fn invalid_target(error: &ValidationError) -> Self {
        Self {
            kind: MetricsErrorKind::InvalidTarget,
            message: error.to_string(),
            status: None,
            retryable: false,
        }
    }

    pub const fn kind(&self) -> MetricsErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// HTTP status for `Upstream` failures.
    pub const fn status(&self) -> Option<u16> {
        self.status
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            MetricsErrorKind::Authentication => "metrics.authentication",
            MetricsErrorKind::Transport => "metrics.transport",
            MetricsErrorKind::Upstream => "metrics.upstream",
            MetricsErrorKind::NoData => "metrics.no_data",
            MetricsErrorKind::Decode => "metrics.decode",
            MetricsErrorKind::CircuitOpen => "metrics.circuit_open",
            MetricsErrorKind::MissingCredentials => "metrics.missing_credentials",
            MetricsErrorKind::InvalidTarget => "metrics.invalid_target",
        }
    }
}

impl Display for MetricsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for MetricsError {}

/// Upstream adapter contract.
///
/// Implementations authenticate, fetch and normalize; they never synthesize.
/// Implementations must be `Send + Sync` since one instance is shared by
/// every caller in the process.
pub trait MetricsSource: Send + Sync {
    /// Short provider name used in log fields.
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Any failure of authentication, transport, upstream status or
    /// normalization, including an empty result set.
    fn domain_metrics<'a>(
        &'a self,
        domain: &'a Target,
    ) -> Pin<Box<dyn Future<Output = Result<DomainMetrics, MetricsError>> + Send + 'a>>;

    /// # Errors
    ///
    /// Same failure set as [`domain_metrics`](MetricsSource::domain_metrics).
    fn page_metrics<'a>(
        &'a self,
        url: &'a Target,
    ) -> Pin<Box<dyn Future<Output = Result<PageMetrics, MetricsError>> + Send + 'a>>;

    /// # Errors
    ///
    /// Same failure set as [`domain_metrics`](MetricsSource::domain_metrics).
    fn backlink_profile<'a>(
        &'a self,
        domain: &'a Target,
    ) -> Pin<Box<dyn Future<Output = Result<BacklinkProfile, MetricsError>> + Send + 'a>>;
}
