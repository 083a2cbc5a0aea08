//! # ctr-metrics-core
//!
//! Backlink and authority metrics for the CTR Reactor dashboard.
//!
//! The client exchanges API credentials for a bearer token, calls the Moz
//! Links API, and normalizes the loosely typed answers into fixed entities.
//! When credentials are missing or anything goes wrong upstream, it returns
//! synthetic data of the same shape instead, so callers never handle errors.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | [`MetricsClient`] facade with synthetic fallback |
//! | [`adapters`] | Moz implementation of [`MetricsSource`] |
//! | [`auth`] | Client-credentials token cache |
//! | [`executor`] | Authenticated GETs and query encoding |
//! | [`normalize`] | Raw records to typed entities |
//! | [`synthetic`] | Randomized stand-in entities |
//! | [`circuit_breaker`] | Skips the upstream after repeated failures |
//! | [`retry`] | Transport retry policy |
//! | [`config`] | Environment-driven settings |
//! | [`domain`] | Entities and validated inputs |
//!
//! ## Architecture
//!
//! ```text
//! MetricsClient ──► MetricsSource (MozSource)
//!      │               ├── TokenManager ──► token endpoint
//!      │               ├── CircuitBreaker
//!      │               └── RequestExecutor ──► url_metrics / anchor_text
//!      │                          │
//!      │                     normalize
//!      └── on any error ──► synthetic
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ctr_metrics_core::{MetricsClient, MetricsConfig};
//!
//! let client = MetricsClient::new(MetricsConfig::from_env()?);
//! let metrics = client.get_domain_metrics("example.com").await;
//! println!("DA {}", metrics.domain_authority);
//! ```

pub mod adapters;
pub mod auth;
pub mod circuit_breaker;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod http_client;
pub mod metrics_source;
pub mod normalize;
pub mod raw;
pub mod retry;
pub mod synthetic;

pub use adapters::MozSource;
pub use auth::TokenManager;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use client::MetricsClient;
pub use config::MetricsConfig;
pub use domain::{
    AnchorTextShare, BacklinkProfile, DomainMetrics, KeywordMetrics, LinkingDomain, LinkingPage,
    PageMetrics, RankingUrl, Target, UtcDateTime, MAX_ANCHOR_TEXTS, MAX_MOZ_RANK, MAX_SCORE,
    MAX_TOP_LINKING_DOMAINS, MAX_TOP_LINKING_PAGES,
};
pub use error::ValidationError;
pub use executor::{ParamValue, QueryParams, RequestExecutor};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use metrics_source::{Endpoint, MetricsError, MetricsErrorKind, MetricsSource};
pub use raw::{RawRecord, RawResponse};
pub use retry::{Backoff, RetryConfig};
