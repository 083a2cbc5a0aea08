use ctr_metrics_core::{MetricsClient, MetricsConfig};
use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport<'a> {
    mode: &'static str,
    credentials_configured: bool,
    base_url: &'a str,
    token_url: &'a str,
    timeout_ms: u64,
    max_retries: u32,
    breaker_threshold: u32,
    breaker_cooldown_secs: u64,
}

pub fn run(client: &MetricsClient, config: &MetricsConfig) -> Result<Value, CliError> {
    let report = StatusReport {
        mode: if client.is_live() { "live" } else { "synthetic" },
        credentials_configured: config.has_credentials(),
        base_url: client.base_url(),
        token_url: &config.token_url,
        timeout_ms: client.timeout_ms(),
        max_retries: config.retry.max_retries,
        breaker_threshold: config.circuit_breaker.failure_threshold,
        breaker_cooldown_secs: config.circuit_breaker.cooldown.as_secs(),
    };
    Ok(serde_json::to_value(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_never_prints_secrets() {
        let config = MetricsConfig::with_credentials("key-123", "secret-456");
        let client = MetricsClient::offline(&config);

        let value = run(&client, &config).expect("status");
        let rendered = value.to_string();

        assert_eq!(value["mode"], "synthetic");
        assert_eq!(value["credentialsConfigured"], true);
        assert!(!rendered.contains("key-123"));
        assert!(!rendered.contains("secret-456"));
    }
}
