//! Behavior-driven tests for bearer token reuse and refresh
//!
//! These tests verify HOW the client spends token exchanges across lookups:
//! once per validity window, again after expiry or rejection, never without
//! credentials.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use ctr_metrics_core::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, MetricsClient, MetricsConfig,
};

/// Scripted upstream: the token endpoint answers `token_body`, the metrics
/// endpoint answers from `metrics` in order and repeats the last entry.
struct TokenCountingUpstream {
    token_body: &'static str,
    metrics: Mutex<Vec<HttpResponse>>,
    token_exchanges: AtomicUsize,
    metric_calls: AtomicUsize,
    token_requests: Mutex<Vec<HttpRequest>>,
}

impl TokenCountingUpstream {
    fn new(token_body: &'static str, metrics: Vec<HttpResponse>) -> Arc<Self> {
        Arc::new(Self {
            token_body,
            metrics: Mutex::new(metrics),
            token_exchanges: AtomicUsize::new(0),
            metric_calls: AtomicUsize::new(0),
            token_requests: Mutex::new(Vec::new()),
        })
    }

    fn token_exchanges(&self) -> usize {
        self.token_exchanges.load(Ordering::SeqCst)
    }

    fn metric_calls(&self) -> usize {
        self.metric_calls.load(Ordering::SeqCst)
    }
}

impl HttpClient for TokenCountingUpstream {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let response = if request.url.ends_with("/oauth/token") {
            self.token_exchanges.fetch_add(1, Ordering::SeqCst);
            self.token_requests
                .lock()
                .expect("token log should not be poisoned")
                .push(request);
            HttpResponse::ok_json(self.token_body)
        } else {
            self.metric_calls.fetch_add(1, Ordering::SeqCst);
            let mut metrics = self.metrics.lock().expect("script should not be poisoned");
            if metrics.len() > 1 {
                metrics.remove(0)
            } else {
                metrics[0].clone()
            }
        };
        Box::pin(async move { Ok(response) })
    }
}

fn config() -> MetricsConfig {
    MetricsConfig::with_credentials("client-id", "client-secret")
        .with_base_url("https://moz.test/v2")
        .with_token_url("https://moz.test/v2/oauth/token")
}

fn metrics_ok() -> HttpResponse {
    HttpResponse::ok_json(r#"{"results":[{"domain_authority":50,"page_authority":40}]}"#)
}

#[tokio::test]
async fn two_lookups_within_the_validity_window_share_one_exchange() {
    // Given: A token valid for an hour
    let upstream = TokenCountingUpstream::new(
        r#"{"access_token":"hour-token","expires_in":3600}"#,
        vec![metrics_ok()],
    );
    let client = MetricsClient::with_http_client(config(), upstream.clone());

    // When: Two different operations run back to back
    client.get_domain_metrics("example.com").await;
    client.get_page_metrics("https://example.com/pricing").await;

    // Then: Exactly one token exchange happened
    assert_eq!(upstream.token_exchanges(), 1);
    assert_eq!(upstream.metric_calls(), 2);
}

#[tokio::test]
async fn fractional_expiry_still_yields_live_metrics() {
    // Given: A token endpoint that writes its lifetime as a float
    let upstream = TokenCountingUpstream::new(
        r#"{"access_token":"t","expires_in":3600.0}"#,
        vec![metrics_ok()],
    );
    let client = MetricsClient::with_http_client(config(), upstream.clone());

    // When: Two lookups run
    let first = client.get_domain_metrics("example.com").await;
    let second = client.get_domain_metrics("example.com").await;

    // Then: Both carry the upstream value and share one exchange
    assert_eq!(first.domain_authority, 50);
    assert_eq!(second.domain_authority, 50);
    assert_eq!(upstream.token_exchanges(), 1);
}

#[tokio::test]
async fn absurd_expiry_does_not_bring_the_lookup_down() {
    // Given: A token endpoint claiming a lifetime of u64::MAX seconds
    let upstream = TokenCountingUpstream::new(
        r#"{"access_token":"t","expires_in":18446744073709551615}"#,
        vec![metrics_ok()],
    );
    let client = MetricsClient::with_http_client(config(), upstream.clone());

    // When: A lookup runs
    let metrics = client.get_domain_metrics("example.com").await;

    // Then: The live value comes back
    assert_eq!(metrics.domain_authority, 50);
    assert_eq!(upstream.token_exchanges(), 1);
}

#[tokio::test]
async fn token_exchange_posts_client_credentials() {
    // Given: A live client
    let upstream = TokenCountingUpstream::new(r#"{"access_token":"t"}"#, vec![metrics_ok()]);
    let client = MetricsClient::with_http_client(config(), upstream.clone());

    // When: A lookup triggers the first exchange
    client.get_domain_metrics("example.com").await;

    // Then: The exchange is a form POST with the configured credentials
    let requests = upstream
        .token_requests
        .lock()
        .expect("token log should not be poisoned")
        .clone();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(
        requests[0].headers.get("content-type").map(String::as_str),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        requests[0].body.as_deref(),
        Some("grant_type=client_credentials&client_id=client-id&client_secret=client-secret")
    );
}

#[tokio::test]
async fn expired_token_is_exchanged_again() {
    // Given: A token endpoint issuing already-expired tokens
    let upstream = TokenCountingUpstream::new(
        r#"{"access_token":"instant","expires_in":0}"#,
        vec![metrics_ok()],
    );
    let client = MetricsClient::with_http_client(config(), upstream.clone());

    // When: Two lookups run
    client.get_domain_metrics("example.com").await;
    client.get_domain_metrics("example.com").await;

    // Then: Each lookup needed its own exchange
    assert_eq!(upstream.token_exchanges(), 2);
}

#[tokio::test]
async fn rejected_token_is_dropped_and_the_next_lookup_reauthenticates() {
    // Given: The metrics endpoint rejects the first token, then accepts
    let upstream = TokenCountingUpstream::new(
        r#"{"access_token":"revoked","expires_in":3600}"#,
        vec![HttpResponse::new(401, "token revoked"), metrics_ok()],
    );
    let client = MetricsClient::with_http_client(config(), upstream.clone());

    // When: The first lookup hits the 401 and a second lookup follows
    let first = client.get_domain_metrics("example.com").await;
    let second = client.get_domain_metrics("example.com").await;

    // Then: The first fell back, the second re-authenticated and got real data
    assert!((1..=100).contains(&first.domain_authority));
    assert_eq!(second.domain_authority, 50);
    assert_eq!(upstream.token_exchanges(), 2);
    assert_eq!(upstream.metric_calls(), 2);
}

#[tokio::test]
async fn token_endpoint_failure_falls_back_without_calling_metrics() {
    // Given: A token endpoint answering garbage
    let upstream = TokenCountingUpstream::new("not json", vec![metrics_ok()]);
    let client = MetricsClient::with_http_client(config(), upstream.clone());

    // When: A lookup runs
    let metrics = client.get_domain_metrics("example.com").await;

    // Then: Synthetic data is returned and the metrics endpoint was never hit
    assert!((1..=100).contains(&metrics.domain_authority));
    assert_eq!(upstream.token_exchanges(), 1);
    assert_eq!(upstream.metric_calls(), 0);
}
