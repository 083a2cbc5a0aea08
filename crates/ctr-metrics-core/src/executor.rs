use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::http_client::{HttpAuth, HttpClient, HttpRequest};
use crate::metrics_source::MetricsError;
use crate::raw::RawResponse;
use crate::retry::RetryConfig;

/// Query parameter value; `None` entries in [`QueryParams`] are skipped.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text(value) => f.write_str(value),
            Self::Integer(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

pub type QueryParams = BTreeMap<String, Option<ParamValue>>;

/// Issues authenticated GETs against the metrics API and parses the JSON body.
///
/// Field semantics are left to the normalizer; this layer only distinguishes
/// transport failures, non-2xx statuses and undecodable bodies.
pub struct RequestExecutor {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: u64,
    retry: RetryConfig,
}

impl RequestExecutor {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        base_url: impl Into<String>,
        timeout_ms: u64,
        retry: RetryConfig,
    ) -> Self {
        Self {
            http_client,
            base_url: base_url.into(),
            timeout_ms,
            retry,
        }
    }

    pub fn http_client(&self) -> &Arc<dyn HttpClient> {
        &self.http_client
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// # Errors
    ///
    /// `Transport` when the call fails below HTTP (after any configured
    /// retries), `Upstream` on a non-2xx status, `Decode` when the body is not
    /// a JSON object.
    pub async fn request(
        &self,
        endpoint: &str,
        params: &QueryParams,
        token: &str,
    ) -> Result<RawResponse, MetricsError> {
        let url = build_url(&self.base_url, endpoint, params);
        let auth = HttpAuth::BearerToken(token.to_owned());

        let mut attempt = 0_u32;
        let response = loop {
            let request = HttpRequest::get(url.as_str())
                .with_header("accept", "application/json")
                .with_auth(&auth)
                .with_timeout_ms(self.timeout_ms);

            match self.http_client.execute(request).await {
                Ok(response) => break response,
                Err(error) if error.retryable() && attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    attempt += 1;
                    tracing::debug!(
                        endpoint,
                        attempt,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = error.message(),
                        "retrying upstream call after transport error"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(error) => {
                    return Err(MetricsError::transport(
                        format!("{endpoint} request failed: {}", error.message()),
                        error.retryable(),
                    ));
                }
            }
        };

        if !response.is_success() {
            return Err(MetricsError::upstream(response.status, response.status_text()));
        }

        serde_json::from_str::<RawResponse>(&response.body).map_err(|error| {
            MetricsError::decode(format!("{endpoint} response was not valid JSON: {error}"))
        })
    }
}

/// Joins `base_url` and `endpoint` with exactly one slash and appends the
/// present parameters, URL-encoded, in key order.
pub fn build_url(base_url: &str, endpoint: &str, params: &QueryParams) -> String {
    let mut url = format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    );

    let query = params
        .iter()
        .filter_map(|(name, value)| {
            value.as_ref().map(|value| {
                format!(
                    "{}={}",
                    urlencoding::encode(name),
                    urlencoding::encode(&value.to_string())
                )
            })
        })
        .collect::<Vec<_>>();

    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.join("&"));
    }

    url
}
