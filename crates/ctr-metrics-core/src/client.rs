use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::adapters::MozSource;
use crate::config::MetricsConfig;
use crate::http_client::{HttpClient, ReqwestHttpClient};
use crate::metrics_source::{Endpoint, MetricsError, MetricsSource};
use crate::synthetic;
use crate::{BacklinkProfile, DomainMetrics, KeywordMetrics, PageMetrics, Target};

type SourceFuture<'t, T> = Pin<Box<dyn Future<Output = Result<T, MetricsError>> + Send + 't>>;

/// Entry point for consumers: four lookups that always produce data.
///
/// With credentials, each lookup goes to the live source; any failure is
/// logged at `warn` and replaced by synthetic output of the same shape.
/// Without credentials every lookup is synthetic and nothing touches the
/// network. Cloning is cheap and clones share the token cache and circuit
/// breaker.
#[derive(Clone)]
pub struct MetricsClient {
    source: Option<Arc<dyn MetricsSource>>,
    base_url: String,
    timeout_ms: u64,
}

impl MetricsClient {
    /// Builds a client over the default reqwest transport.
    pub fn new(config: MetricsConfig) -> Self {
        Self::with_http_client(config, Arc::new(ReqwestHttpClient::new()))
    }

    /// Builds a client over an arbitrary transport. Missing credentials leave
    /// the client synthetic-only and the transport unused.
    pub fn with_http_client(config: MetricsConfig, http_client: Arc<dyn HttpClient>) -> Self {
        let source = config
            .has_credentials()
            .then(|| Arc::new(MozSource::new(&config, http_client)) as Arc<dyn MetricsSource>);

        Self {
            source,
            base_url: config.base_url,
            timeout_ms: config.timeout_ms,
        }
    }

    pub fn with_source(config: &MetricsConfig, source: Arc<dyn MetricsSource>) -> Self {
        Self {
            source: Some(source),
            base_url: config.base_url.clone(),
            timeout_ms: config.timeout_ms,
        }
    }

    /// A client that never leaves the process.
    pub fn offline(config: &MetricsConfig) -> Self {
        Self {
            source: None,
            base_url: config.base_url.clone(),
            timeout_ms: config.timeout_ms,
        }
    }

    pub fn is_live(&self) -> bool {
        self.source.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub async fn get_domain_metrics(&self, domain: &str) -> DomainMetrics {
        self.resolve(
            Endpoint::DomainMetrics,
            domain,
            |source, target| source.domain_metrics(target),
            synthetic::mock_domain_metrics,
        )
        .await
    }

    pub async fn get_page_metrics(&self, url: &str) -> PageMetrics {
        self.resolve(
            Endpoint::PageMetrics,
            url,
            |source, target| source.page_metrics(target),
            synthetic::mock_page_metrics,
        )
        .await
    }

    pub async fn get_backlink_profile(&self, domain: &str) -> BacklinkProfile {
        self.resolve(
            Endpoint::BacklinkProfile,
            domain,
            |source, target| source.backlink_profile(target),
            synthetic::mock_backlink_profile,
        )
        .await
    }

    /// Keyword data has no upstream; the result is always synthetic.
    pub async fn get_keyword_metrics(&self, keyword: &str, domain: &str) -> KeywordMetrics {
        let keyword = keyword.trim();
        let domain = domain.trim();
        tracing::debug!(
            endpoint = %Endpoint::KeywordMetrics,
            keyword,
            domain,
            "serving synthetic keyword metrics"
        );
        synthetic::mock_keyword_metrics(keyword, domain)
    }

    async fn resolve<T, F>(
        &self,
        endpoint: Endpoint,
        input: &str,
        fetch: F,
        fallback: fn(&str) -> T,
    ) -> T
    where
        F: for<'t> FnOnce(&'t dyn MetricsSource, &'t Target) -> SourceFuture<'t, T>,
    {
        let target = match Target::parse(input) {
            Ok(target) => target,
            Err(error) => {
                let key = input.trim();
                log_fallback(endpoint, key, &MetricsError::invalid_target(&error));
                return fallback(key);
            }
        };

        let Some(source) = self.source.as_deref() else {
            return fallback(target.as_str());
        };

        match fetch(source, &target).await {
            Ok(value) => value,
            Err(error) => {
                log_fallback(endpoint, target.as_str(), &error);
                fallback(target.as_str())
            }
        }
    }
}

fn log_fallback(endpoint: Endpoint, target: &str, error: &MetricsError) {
    tracing::warn!(
        endpoint = %endpoint,
        target,
        code = error.code(),
        status = error.status(),
        error = error.message(),
        "metrics lookup failed; falling back to synthetic data"
    );
}

impl std::fmt::Debug for MetricsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsClient")
            .field("live", &self.is_live())
            .field("source", &self.source.as_ref().map(|source| source.name()))
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .finish()
    }
}
