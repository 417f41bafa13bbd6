//! Thin driver for the scrape pipeline: parse arguments, run the
//! orchestrator, optionally persist the records, deliver to the sink.
//!
//! Per-platform failures never fail the process; the exit code is
//! non-zero only for startup faults and for runs where no platform
//! produced anything while delivery was expected.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pricelens_core::app_config::FetchMode;
use pricelens_core::{AppConfig, ProductRecord};
use pricelens_scraper::{
    Amazon, FetchClient, FetchStrategy, Flipkart, IdentityRotator, Orchestrator, RetryPolicy,
    SinkClient,
};

#[derive(Debug, Parser)]
#[command(name = "pricelens")]
#[command(about = "Scrape marketplace product listings and forward them to an ingestion endpoint")]
struct Cli {
    /// Product search query.
    query: String,

    /// Maximum results per platform.
    #[arg(long, default_value_t = 5)]
    limit: usize,

    /// Platform tags to scrape (default: all configured).
    #[arg(long, value_delimiter = ',')]
    platforms: Vec<String>,

    /// Ingestion endpoint, overriding PRICELENS_SINK_ENDPOINT.
    #[arg(long)]
    endpoint: Option<String>,

    /// Skip delivery to the ingestion endpoint.
    #[arg(long)]
    no_deliver: bool,

    /// Write the run's records to the configured output path.
    #[arg(long)]
    save: bool,

    /// Write the run's records to this path (implies --save).
    #[arg(long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = pricelens_core::load_app_config_from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    // The render capability is an injected collaborator; this binary
    // wires none, so a rendered fetch mode is a configuration fault.
    if config.fetch_mode == FetchMode::Rendered {
        anyhow::bail!(
            "PRICELENS_FETCH_MODE=rendered requires a renderer, and none is available in this binary"
        );
    }

    let orchestrator = build_orchestrator(&config);

    let platforms = if cli.platforms.is_empty() {
        orchestrator.platform_tags()
    } else {
        cli.platforms.clone()
    };

    tracing::info!(query = %cli.query, limit = cli.limit, ?platforms, "starting scrape run");
    let outcome = orchestrator.run(&cli.query, cli.limit, &platforms).await;

    for failure in &outcome.failures {
        eprintln!("warning: {failure}");
    }
    println!(
        "scraped {} records across {} platforms ({} failed)",
        outcome.records.len(),
        platforms.len(),
        outcome.failures.len()
    );

    if let Some(path) = resolve_output_path(cli.save, cli.output.clone(), &config) {
        write_records(&path, &outcome.records)?;
        println!("wrote {} records to {}", outcome.records.len(), path.display());
    }

    if cli.no_deliver {
        return Ok(());
    }

    if outcome.records.is_empty() {
        anyhow::bail!("no platform produced any result; nothing to deliver");
    }

    let endpoint = cli.endpoint.unwrap_or_else(|| config.sink_endpoint.clone());
    let sink = SinkClient::new(&endpoint, config.request_timeout_secs)
        .map_err(|e| anyhow::anyhow!("failed to build sink client: {e}"))?;
    let report = sink.deliver(&outcome.records).await;

    println!(
        "delivered {}/{} records to {endpoint}",
        report.sent,
        outcome.records.len()
    );
    for record_error in &report.errors {
        eprintln!(
            "warning: record {} failed delivery: {}",
            record_error.index, record_error.error
        );
    }

    Ok(())
}

fn build_orchestrator(config: &AppConfig) -> Orchestrator {
    let rotator = IdentityRotator::new(config.proxies.clone());
    let policy = RetryPolicy {
        max_attempts: config.max_retries,
        backoff_base_secs: config.retry_backoff_base_secs,
        backoff_cap_secs: config.retry_backoff_cap_secs,
        min_delay_secs: config.min_request_delay_secs,
        max_delay_secs: config.max_request_delay_secs,
    };
    let client = FetchClient::new(
        FetchStrategy::Static,
        rotator,
        policy,
        config.request_timeout_secs,
    );

    Orchestrator::new(client)
        .with_marketplace(Arc::new(Amazon::new()))
        .with_marketplace(Arc::new(Flipkart::new()))
}

/// `--output PATH` wins; bare `--save` falls back to the configured path.
fn resolve_output_path(save: bool, output: Option<PathBuf>, config: &AppConfig) -> Option<PathBuf> {
    output.or_else(|| save.then(|| config.output_path.clone()))
}

/// Writes the whole run as one JSON array in the sink's wire encoding.
fn write_records(path: &std::path::Path, records: &[ProductRecord]) -> anyhow::Result<()> {
    let payloads: Vec<_> = records.iter().map(ProductRecord::to_payload).collect();
    let json = serde_json::to_string_pretty(&payloads)?;
    std::fs::write(path, json)
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AppConfig {
        AppConfig {
            sink_endpoint: "http://localhost:3000/scrape".to_string(),
            log_level: "info".to_string(),
            output_path: PathBuf::from("scrape-output.json"),
            fetch_mode: FetchMode::Static,
            request_timeout_secs: 30,
            max_retries: 3,
            retry_backoff_base_secs: 2.0,
            retry_backoff_cap_secs: 10.0,
            min_request_delay_secs: 2.0,
            max_request_delay_secs: 5.0,
            render_timeout_secs: 30,
            render_wait_selector: None,
            proxies: vec![],
        }
    }

    #[test]
    fn parses_bare_query() {
        let cli = Cli::try_parse_from(["pricelens", "wireless mouse"])
            .expect("expected valid cli args");
        assert_eq!(cli.query, "wireless mouse");
        assert_eq!(cli.limit, 5);
        assert!(cli.platforms.is_empty());
        assert!(!cli.no_deliver);
        assert!(!cli.save);
    }

    #[test]
    fn parses_comma_separated_platforms() {
        let cli = Cli::try_parse_from(["pricelens", "mouse", "--platforms", "amazon,flipkart"])
            .expect("expected valid cli args");
        assert_eq!(cli.platforms, vec!["amazon", "flipkart"]);
    }

    #[test]
    fn parses_delivery_and_persistence_flags() {
        let cli = Cli::try_parse_from([
            "pricelens",
            "mouse",
            "--no-deliver",
            "--output",
            "run.json",
        ])
        .expect("expected valid cli args");
        assert!(cli.no_deliver);
        assert_eq!(cli.output.as_deref(), Some(std::path::Path::new("run.json")));
    }

    #[test]
    fn missing_query_is_an_error() {
        assert!(Cli::try_parse_from(["pricelens"]).is_err());
    }

    #[test]
    fn output_path_defaults_to_nothing() {
        assert!(resolve_output_path(false, None, &test_config()).is_none());
    }

    #[test]
    fn save_flag_uses_configured_path() {
        let path = resolve_output_path(true, None, &test_config());
        assert_eq!(path.as_deref(), Some(std::path::Path::new("scrape-output.json")));
    }

    #[test]
    fn explicit_output_path_wins_over_save() {
        let path = resolve_output_path(true, Some(PathBuf::from("custom.json")), &test_config());
        assert_eq!(path.as_deref(), Some(std::path::Path::new("custom.json")));
    }
}
