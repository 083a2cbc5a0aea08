use ctr_metrics_core::{MetricsClient, Target};
use serde_json::Value;

use crate::cli::KeywordArgs;
use crate::error::CliError;

pub async fn run(client: &MetricsClient, args: &KeywordArgs) -> Result<Value, CliError> {
    let keyword = Target::keyword(&args.keyword)?;
    let domain = Target::parse(&args.domain)?;
    let metrics = client
        .get_keyword_metrics(keyword.as_str(), domain.as_str())
        .await;
    Ok(serde_json::to_value(metrics)?)
}
