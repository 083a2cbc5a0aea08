use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde::Deserialize;
use serde_json::Value;

use crate::http_client::{HttpClient, HttpRequest};
use crate::metrics_source::MetricsError;
use crate::raw::as_finite_number;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;
/// Upper bound on how long a token is trusted, whatever the endpoint claims.
const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 3600;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

impl CachedToken {
    fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<Value>,
}

impl TokenResponse {
    /// `expires_in` may come back as an integer, a float or a numeric string.
    /// Negative or unreadable lifetimes mean the token is already stale; a
    /// missing or null one falls back to the default.
    fn lifetime(&self) -> Duration {
        let secs = match &self.expires_in {
            None | Some(Value::Null) => DEFAULT_TOKEN_TTL_SECS as f64,
            Some(value) => as_finite_number(value).unwrap_or(0.0),
        };
        Duration::from_secs_f64(secs.clamp(0.0, MAX_TOKEN_TTL_SECS as f64))
    }
}

/// Caches the bearer token for the upstream API, re-running the
/// client-credentials exchange once it expires.
///
/// State lives in memory only and belongs to one client instance. The lock is
/// never held across the token exchange, so two callers that both find the
/// token expired may each refresh once; the later write wins.
pub struct TokenManager {
    token_url: String,
    client_id: String,
    client_secret: String,
    timeout_ms: u64,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenManager {
    pub fn new(
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        timeout_ms: u64,
    ) -> Self {
        Self {
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout_ms,
            cached: Mutex::new(None),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.client_id.trim().is_empty() && !self.client_secret.trim().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CachedToken>> {
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn valid_token(&self) -> Option<String> {
        self.lock()
            .as_ref()
            .filter(|token| token.is_valid())
            .map(|token| token.access_token.clone())
    }

    /// Returns a bearer token that is valid right now, exchanging credentials
    /// only when no unexpired token is cached.
    ///
    /// # Errors
    ///
    /// `MissingCredentials` without touching the network when key or secret is
    /// blank; `Authentication` when the exchange fails for any reason.
    pub async fn ensure_valid_token(
        &self,
        http_client: &Arc<dyn HttpClient>,
    ) -> Result<String, MetricsError> {
        if let Some(token) = self.valid_token() {
            return Ok(token);
        }

        if !self.has_credentials() {
            return Err(MetricsError::missing_credentials());
        }

        let fresh = self.exchange(http_client).await?;
        let access_token = fresh.access_token.clone();
        *self.lock() = Some(fresh);
        tracing::debug!(token_url = %self.token_url, "refreshed upstream access token");

        Ok(access_token)
    }

    /// Drops the cached token so the next call re-authenticates.
    pub fn invalidate(&self) {
        *self.lock() = None;
    }

    pub fn has_valid_token(&self) -> bool {
        self.valid_token().is_some()
    }

    async fn exchange(&self, http_client: &Arc<dyn HttpClient>) -> Result<CachedToken, MetricsError> {
        let request = HttpRequest::post(&self.token_url)
            .with_header("accept", "application/json")
            .with_form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .with_timeout_ms(self.timeout_ms);

        let requested_at = Instant::now();
        let response = http_client.execute(request).await.map_err(|error| {
            MetricsError::authentication(format!("token endpoint unreachable: {}", error.message()))
        })?;

        if !response.is_success() {
            return Err(MetricsError::authentication(format!(
                "token endpoint returned status {} {}",
                response.status,
                response.status_text()
            )));
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body).map_err(|error| {
            MetricsError::authentication(format!("token response was not understood: {error}"))
        })?;

        if parsed.access_token.trim().is_empty() {
            return Err(MetricsError::authentication(
                "token endpoint returned an empty access token",
            ));
        }

        let expires_at = requested_at
            .checked_add(parsed.lifetime())
            .unwrap_or(requested_at);
        Ok(CachedToken {
            access_token: parsed.access_token,
            expires_at,
        })
    }
}

impl std::fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenManager")
            .field("token_url", &self.token_url)
            .field("has_credentials", &self.has_credentials())
            .field("has_valid_token", &self.has_valid_token())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::metrics_source::MetricsErrorKind;

    struct TokenEndpoint {
        response: Result<HttpResponse, HttpError>,
        calls: AtomicUsize,
        last_body: Mutex<Option<String>>,
    }

    impl TokenEndpoint {
        fn answering(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
                last_body: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl HttpClient for TokenEndpoint {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_body.lock().expect("body store should not be poisoned") = request.body;
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    fn manager(secret: &str) -> TokenManager {
        TokenManager::new("https://auth.example.test/token", "client", secret, 1_000)
    }

    #[tokio::test]
    async fn reuses_token_within_validity_window() {
        let endpoint = TokenEndpoint::answering(Ok(HttpResponse::ok_json(
            r#"{"access_token":"abc","expires_in":3600}"#,
        )));
        let http: Arc<dyn HttpClient> = endpoint.clone();
        let tokens = manager("secret");

        let first = tokens.ensure_valid_token(&http).await.expect("first exchange");
        let second = tokens.ensure_valid_token(&http).await.expect("cached token");

        assert_eq!(first, "abc");
        assert_eq!(second, "abc");
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn sends_client_credentials_form() {
        let endpoint = TokenEndpoint::answering(Ok(HttpResponse::ok_json(r#"{"access_token":"abc"}"#)));
        let http: Arc<dyn HttpClient> = endpoint.clone();

        manager("s3cret").ensure_valid_token(&http).await.expect("exchange");

        let body = endpoint
            .last_body
            .lock()
            .expect("body store should not be poisoned")
            .clone();
        assert_eq!(
            body.as_deref(),
            Some("grant_type=client_credentials&client_id=client&client_secret=s3cret")
        );
    }

    #[tokio::test]
    async fn zero_lifetime_token_is_refreshed_every_time() {
        let endpoint = TokenEndpoint::answering(Ok(HttpResponse::ok_json(
            r#"{"access_token":"short","expires_in":0}"#,
        )));
        let http: Arc<dyn HttpClient> = endpoint.clone();
        let tokens = manager("secret");

        tokens.ensure_valid_token(&http).await.expect("first exchange");
        tokens.ensure_valid_token(&http).await.expect("second exchange");

        assert_eq!(endpoint.calls(), 2);
    }

    #[tokio::test]
    async fn fractional_lifetime_is_accepted() {
        let endpoint = TokenEndpoint::answering(Ok(HttpResponse::ok_json(
            r#"{"access_token":"t","expires_in":3600.0}"#,
        )));
        let http: Arc<dyn HttpClient> = endpoint.clone();
        let tokens = manager("secret");

        tokens.ensure_valid_token(&http).await.expect("first exchange");
        tokens.ensure_valid_token(&http).await.expect("cached token");

        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn oversized_lifetime_is_capped_instead_of_overflowing() {
        let endpoint = TokenEndpoint::answering(Ok(HttpResponse::ok_json(
            r#"{"access_token":"forever","expires_in":18446744073709551615}"#,
        )));
        let http: Arc<dyn HttpClient> = endpoint.clone();
        let tokens = manager("secret");

        let token = tokens.ensure_valid_token(&http).await.expect("exchange");

        assert_eq!(token, "forever");
        assert!(tokens.has_valid_token());
        assert_eq!(endpoint.calls(), 1);
    }

    #[tokio::test]
    async fn negative_or_garbled_lifetime_counts_as_expired() {
        for expires_in in ["-30", "\"soon\""] {
            let body = format!(r#"{{"access_token":"stale","expires_in":{expires_in}}}"#);
            let endpoint = TokenEndpoint::answering(Ok(HttpResponse::ok_json(body)));
            let http: Arc<dyn HttpClient> = endpoint.clone();
            let tokens = manager("secret");

            tokens.ensure_valid_token(&http).await.expect("first exchange");
            tokens.ensure_valid_token(&http).await.expect("second exchange");

            assert_eq!(endpoint.calls(), 2, "expires_in = {expires_in}");
        }
    }

    #[test]
    fn lifetime_reads_numeric_strings_and_defaults_when_absent() {
        let parse = |body: &str| -> Duration {
            serde_json::from_str::<TokenResponse>(body)
                .expect("token body")
                .lifetime()
        };

        assert_eq!(parse(r#"{"access_token":"a","expires_in":"120"}"#), Duration::from_secs(120));
        assert_eq!(parse(r#"{"access_token":"a","expires_in":null}"#), Duration::from_secs(3600));
        assert_eq!(parse(r#"{"access_token":"a"}"#), Duration::from_secs(3600));
        assert_eq!(
            parse(r#"{"access_token":"a","expires_in":1e12}"#),
            Duration::from_secs(MAX_TOKEN_TTL_SECS)
        );
    }

    #[tokio::test]
    async fn missing_secret_never_touches_the_network() {
        let endpoint = TokenEndpoint::answering(Ok(HttpResponse::ok_json("{}")));
        let http: Arc<dyn HttpClient> = endpoint.clone();

        let error = manager("").ensure_valid_token(&http).await.expect_err("must fail");

        assert_eq!(error.kind(), MetricsErrorKind::MissingCredentials);
        assert_eq!(endpoint.calls(), 0);
    }

    #[tokio::test]
    async fn rejected_credentials_are_an_authentication_error() {
        let endpoint = TokenEndpoint::answering(Ok(HttpResponse::new(401, "denied")));
        let http: Arc<dyn HttpClient> = endpoint.clone();

        let error = manager("wrong").ensure_valid_token(&http).await.expect_err("must fail");

        assert_eq!(error.kind(), MetricsErrorKind::Authentication);
        assert!(error.message().contains("401 Unauthorized"));
    }

    #[tokio::test]
    async fn unreachable_token_endpoint_is_an_authentication_error() {
        let endpoint = TokenEndpoint::answering(Err(HttpError::new("connection refused")));
        let http: Arc<dyn HttpClient> = endpoint.clone();

        let error = manager("secret").ensure_valid_token(&http).await.expect_err("must fail");

        assert_eq!(error.kind(), MetricsErrorKind::Authentication);
        assert!(error.message().contains("connection refused"));
    }

    #[tokio::test]
    async fn invalidate_forces_a_new_exchange() {
        let endpoint = TokenEndpoint::answering(Ok(HttpResponse::ok_json(r#"{"access_token":"abc"}"#)));
        let http: Arc<dyn HttpClient> = endpoint.clone();
        let tokens = manager("secret");

        tokens.ensure_valid_token(&http).await.expect("first exchange");
        assert!(tokens.has_valid_token());
        tokens.invalidate();
        assert!(!tokens.has_valid_token());
        tokens.ensure_valid_token(&http).await.expect("second exchange");

        assert_eq!(endpoint.calls(), 2);
    }
}
