//! CLI argument definitions for `ctr-metrics`.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `domain` | Authority and link counts for a domain |
//! | `page` | Authority and link counts for one URL |
//! | `backlinks` | Backlink profile for a domain |
//! | `keyword` | Simulated keyword metrics |
//! | `status` | Effective configuration, without secrets |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--offline` | `false` | Never call the upstream |
//! | `--timeout-ms` | `MOZ_TIMEOUT_MS` | Per-request timeout in ms |
//!
//! # Examples
//!
//! ```bash
//! ctr-metrics domain example.com --pretty
//! ctr-metrics keyword "running shoes" --domain acme.io
//! RUST_LOG=debug ctr-metrics backlinks example.com
//! ```

use clap::{Args, Parser, Subcommand};

/// Backlink and authority lookups with synthetic fallback.
///
/// Credentials are read from `MOZ_API_KEY` and `MOZ_API_SECRET` (a `.env`
/// file in the working directory is loaded first). Without them every
/// command answers with synthetic data.
#[derive(Debug, Parser)]
#[command(name = "ctr-metrics", author, version, about)]
pub struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Skip the upstream and answer with synthetic data only.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    /// Override the per-request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Domain authority, spam score and link counts.
    Domain(TargetArgs),
    /// Page authority and link counts for a URL.
    Page(TargetArgs),
    /// Link splits, top linking domains/pages and anchor distribution.
    Backlinks(TargetArgs),
    /// Simulated search volume, difficulty and ranking URLs.
    Keyword(KeywordArgs),
    /// Show the effective mode, base URL and timeout.
    Status,
}

#[derive(Debug, Args)]
pub struct TargetArgs {
    /// Domain or URL to look up.
    pub target: String,
}

#[derive(Debug, Args)]
pub struct KeywordArgs {
    /// Search phrase.
    pub keyword: String,

    /// Domain whose ranking is simulated.
    #[arg(long)]
    pub domain: String,
}
