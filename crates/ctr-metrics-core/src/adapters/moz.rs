use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::auth::TokenManager;
use crate::circuit_breaker::{CircuitBreaker, CircuitState};
use crate::config::MetricsConfig;
use crate::executor::{ParamValue, QueryParams, RequestExecutor};
use crate::http_client::HttpClient;
use crate::metrics_source::{Endpoint, MetricsError, MetricsSource};
use crate::normalize;
use crate::raw::RawResponse;
use crate::{BacklinkProfile, DomainMetrics, PageMetrics, Target};

const URL_METRICS: &str = "url_metrics";
const ANCHOR_TEXT: &str = "anchor_text";
const ANCHOR_TEXT_LIMIT: i64 = 50;

#[derive(Debug, Clone, Copy)]
enum Scope {
    RootDomain,
    Page,
}

impl Scope {
    const fn as_str(self) -> &'static str {
        match self {
            Self::RootDomain => "root_domain",
            Self::Page => "page",
        }
    }
}

/// Moz Links API v2 adapter.
///
/// Every call is one token check plus one authenticated GET. Failures are
/// counted by the shared circuit breaker; a 401 from a metrics endpoint also
/// drops the cached token.
pub struct MozSource {
    tokens: TokenManager,
    executor: RequestExecutor,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl MozSource {
    pub fn new(config: &MetricsConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            tokens: TokenManager::new(
                config.token_url.as_str(),
                config.api_key.as_str(),
                config.api_secret.as_str(),
                config.timeout_ms,
            ),
            executor: RequestExecutor::new(
                http_client,
                config.base_url.as_str(),
                config.timeout_ms,
                config.retry,
            ),
            circuit_breaker: Arc::new(CircuitBreaker::new(config.circuit_breaker)),
        }
    }

    pub fn circuit_state(&self) -> CircuitState {
        self.circuit_breaker.state()
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    async fn fetch(
        &self,
        endpoint: Endpoint,
        path: &str,
        params: QueryParams,
    ) -> Result<RawResponse, MetricsError> {
        self.circuit_breaker.admit()?;

        let outcome = self.fetch_authenticated(path, &params).await;
        if let Some(failures) = self.circuit_breaker.observe(&outcome) {
            tracing::warn!(
                endpoint = %endpoint,
                failures,
                "moz circuit breaker opened; upstream calls paused"
            );
        }

        outcome
    }

    async fn fetch_authenticated(
        &self,
        path: &str,
        params: &QueryParams,
    ) -> Result<RawResponse, MetricsError> {
        let token = self
            .tokens
            .ensure_valid_token(self.executor.http_client())
            .await?;

        let result = self.executor.request(path, params, &token).await;
        if let Err(error) = &result {
            if error.status() == Some(401) {
                self.tokens.invalidate();
            }
        }
        result
    }
}

fn url_metrics_params(target: &Target, scope: Scope) -> QueryParams {
    let mut params = QueryParams::new();
    params.insert(String::from("target"), Some(ParamValue::from(target.as_str())));
    params.insert(String::from("scope"), Some(ParamValue::from(scope.as_str())));
    params
}

fn anchor_text_params(target: &Target) -> QueryParams {
    let mut params = url_metrics_params(target, Scope::RootDomain);
    params.insert(String::from("limit"), Some(ParamValue::from(ANCHOR_TEXT_LIMIT)));
    params
}

impl MetricsSource for MozSource {
    fn name(&self) -> &'static str {
        "moz"
    }

    fn domain_metrics<'a>(
        &'a self,
        domain: &'a Target,
    ) -> Pin<Box<dyn Future<Output = Result<DomainMetrics, MetricsError>> + Send + 'a>> {
        Box::pin(async move {
            let raw = self
                .fetch(
                    Endpoint::DomainMetrics,
                    URL_METRICS,
                    url_metrics_params(domain, Scope::RootDomain),
                )
                .await?;
            normalize::to_domain_metrics(domain.as_str(), &raw)
        })
    }

    fn page_metrics<'a>(
        &'a self,
        url: &'a Target,
    ) -> Pin<Box<dyn Future<Output = Result<PageMetrics, MetricsError>> + Send + 'a>> {
        Box::pin(async move {
            let raw = self
                .fetch(
                    Endpoint::PageMetrics,
                    URL_METRICS,
                    url_metrics_params(url, Scope::Page),
                )
                .await?;
            normalize::to_page_metrics(url.as_str(), &raw)
        })
    }

    fn backlink_profile<'a>(
        &'a self,
        domain: &'a Target,
    ) -> Pin<Box<dyn Future<Output = Result<BacklinkProfile, MetricsError>> + Send + 'a>> {
        Box::pin(async move {
            let raw = self
                .fetch(
                    Endpoint::BacklinkProfile,
                    ANCHOR_TEXT,
                    anchor_text_params(domain),
                )
                .await?;
            normalize::to_backlink_profile(domain.as_str(), &raw)
        })
    }
}

impl std::fmt::Debug for MozSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MozSource")
            .field("base_url", &self.executor.base_url())
            .field("tokens", &self.tokens)
            .field("circuit_state", &self.circuit_breaker.state())
            .finish()
    }
}
