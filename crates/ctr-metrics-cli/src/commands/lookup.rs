use ctr_metrics_core::{MetricsClient, Target};
use serde_json::Value;

use crate::cli::TargetArgs;
use crate::error::CliError;

pub async fn domain(client: &MetricsClient, args: &TargetArgs) -> Result<Value, CliError> {
    let target = Target::parse(&args.target)?;
    let metrics = client.get_domain_metrics(target.as_str()).await;
    Ok(serde_json::to_value(metrics)?)
}

pub async fn page(client: &MetricsClient, args: &TargetArgs) -> Result<Value, CliError> {
    let target = Target::parse(&args.target)?;
    let metrics = client.get_page_metrics(target.as_str()).await;
    Ok(serde_json::to_value(metrics)?)
}

pub async fn backlinks(client: &MetricsClient, args: &TargetArgs) -> Result<Value, CliError> {
    let target = Target::parse(&args.target)?;
    let profile = client.get_backlink_profile(target.as_str()).await;
    Ok(serde_json::to_value(profile)?)
}
