//! PatentsView Fetch - Entry Point
//!
//! Downloads a date range of patents and writes one file per table.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use patentsview_fetch::formatters::{OutputFormat, write_tables};
use patentsview_fetch::{Config, Fetcher, Query, QueryInput};

#[derive(Parser, Debug)]
#[command(name = "patentsview-fetch")]
#[command(about = "Download PatentsView patent data for a date range as per-entity tables")]
#[command(version)]
struct Cli {
    /// Comma-separated PatentsView fields (e.g. patent_number,assignee_id)
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,

    /// First grant date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    start: Option<String>,

    /// Last grant date, exclusive (YYYY-MM-DD)
    #[arg(long)]
    end: Option<String>,

    /// Results per page (max 10000)
    #[arg(long)]
    per_page: Option<u32>,

    /// Retry automatically when a request fails (`--force-retry=false` turns it off)
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    force_retry: Option<bool>,

    /// Seconds to wait before retrying
    #[arg(long)]
    retry_delay: Option<u64>,

    /// Attempts per page, first try included
    #[arg(long, conflicts_with = "unbounded_retry")]
    max_attempts: Option<u32>,

    /// Keep retrying a failed page until it succeeds
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    unbounded_retry: Option<bool>,

    /// Split the range into windows of this many months
    #[arg(long)]
    window_months: Option<u32>,

    /// JSON file with query parameters; flags override its values
    #[arg(long)]
    query_file: Option<PathBuf>,

    /// Directory for the output files
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Prefix for output file names
    #[arg(long, default_value = "")]
    prefix: String,

    /// Output file format
    #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
    format: OutputFormat,

    /// Patent query endpoint
    #[arg(long, env = "PATENTSVIEW_QUERY_URL")]
    query_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    /// Merge the query file (if any) with command-line flags.
    fn query_input(&self) -> anyhow::Result<QueryInput> {
        let mut input = match &self.query_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("reading query file {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing query file {}", path.display()))?
            }
            None => QueryInput::default(),
        };

        if !self.fields.is_empty() {
            input.fields.clone_from(&self.fields);
        }
        if let Some(start) = &self.start {
            input.start_date.clone_from(start);
        }
        if let Some(end) = &self.end {
            input.end_date.clone_from(end);
        }
        if let Some(per_page) = self.per_page {
            input.per_page = per_page;
        }
        if let Some(delay) = self.retry_delay {
            input.retry_delay_secs = delay;
        }
        if let Some(max_attempts) = self.max_attempts {
            input.max_attempts = max_attempts;
        }
        if let Some(force_retry) = self.force_retry {
            input.force_retry = force_retry;
        }
        if let Some(unbounded_retry) = self.unbounded_retry {
            input.unbounded_retry = unbounded_retry;
        }

        Ok(input)
    }
}

fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        subscriber.with(tracing_subscriber::fmt::layer().compact()).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_level, cli.json_logs);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting PatentsView fetch");

    let query = Query::try_from(cli.query_input()?)?;

    let mut config = Config::from_env()?;
    if let Some(url) = &cli.query_url {
        config = config.with_query_url(url.clone());
    }
    let fetcher = Fetcher::from_config(config)?;

    let tables = match cli.window_months {
        Some(months) => fetcher.fetch_windowed(&query, months).await?,
        None => fetcher.fetch(&query).await?,
    };

    let written = write_tables(&tables, &cli.output_dir, &cli.prefix, cli.format)?;
    tracing::info!(files = written.len(), dir = %cli.output_dir.display(), "Export complete");

    Ok(())
}
