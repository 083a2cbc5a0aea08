mod keyword;
mod lookup;
mod status;

use ctr_metrics_core::{MetricsClient, MetricsConfig};
use serde_json::Value;

use crate::cli::{Cli, Command};
use crate::error::CliError;

pub async fn run(cli: &Cli) -> Result<Value, CliError> {
    let config = load_config(cli)?;
    let client = if cli.offline {
        MetricsClient::offline(&config)
    } else {
        MetricsClient::new(config.clone())
    };
    tracing::debug!(live = client.is_live(), "metrics client ready");

    match &cli.command {
        Command::Domain(args) => lookup::domain(&client, args).await,
        Command::Page(args) => lookup::page(&client, args).await,
        Command::Backlinks(args) => lookup::backlinks(&client, args).await,
        Command::Keyword(args) => keyword::run(&client, args).await,
        Command::Status => status::run(&client, &config),
    }
}

fn load_config(cli: &Cli) -> Result<MetricsConfig, CliError> {
    let config = MetricsConfig::from_env()?;
    Ok(match cli.timeout_ms {
        Some(timeout_ms) => config.with_timeout_ms(timeout_ms),
        None => config,
    })
}
