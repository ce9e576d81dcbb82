//! promdash
//!
//! Reads a Prometheus metrics endpoint, groups the metrics of one package by
//! their naming convention and publishes the resulting Grafana dashboard.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::*;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use promdash::dashboard::client::{GrafanaPublisher, HttpMetricsSource};
use promdash::dashboard::config::{Config, ConfigOverrides};
use promdash::dashboard::errors::RunError;
use promdash::dashboard::pipeline;

/// Generate a Grafana dashboard from a Prometheus metrics endpoint
#[derive(Parser)]
#[command(name = "promdash")]
#[command(version)]
#[command(about = "Generate a Grafana dashboard from Prometheus metrics", long_about = None)]
struct Cli {
    /// TOML file with default settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Metrics endpoint (Prometheus text format)
    #[arg(long, env = "PROMDASH_PROMETHEUS_URI")]
    prometheus_uri: Option<String>,

    /// Grafana dashboard API endpoint
    #[arg(long, env = "PROMDASH_GRAFANA_URI")]
    grafana_uri: Option<String>,

    /// Dashboard title
    #[arg(short, long, env = "PROMDASH_TITLE")]
    title: Option<String>,

    /// Dotted package whose metrics are dashboarded (e.g. ai.grakn.engine)
    #[arg(short, long, env = "PROMDASH_PKG")]
    pkg: Option<String>,

    /// Grafana API token
    #[arg(long, env = "PROMDASH_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Publish timeout in milliseconds
    #[arg(long)]
    publish_timeout_ms: Option<u64>,

    /// Datasource name used by every panel
    #[arg(long)]
    datasource: Option<String>,

    /// Store queries in `target` instead of `expr`
    #[arg(long)]
    graphite_targets: bool,

    /// Print the dashboard JSON instead of publishing it
    #[arg(long)]
    dry_run: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// No color output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn into_config(self) -> Result<Config, Box<dyn std::error::Error>> {
        let base = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        Ok(base.with_overrides(ConfigOverrides {
            prometheus_uri: self.prometheus_uri,
            grafana_uri: self.grafana_uri,
            title: self.title,
            pkg: self.pkg,
            token: self.token,
            publish_timeout_ms: self.publish_timeout_ms,
            datasource: self.datasource,
            graphite_targets: self.graphite_targets,
        }))
    }
}

fn execute(config: &Config, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let source = HttpMetricsSource::new(config.prometheus_uri.as_str()).map_err(RunError::from)?;

    if dry_run {
        let (dashboard, _) = pipeline::generate(&source, config)?;
        println!("{}", serde_json::to_string_pretty(&dashboard.publish_request())?);
        return Ok(());
    }

    let publisher = GrafanaPublisher::new(
        config.grafana_uri.as_str(),
        config.token.clone(),
        config.publish_timeout(),
    )
    .map_err(RunError::from)?;

    let summary = pipeline::run(&source, &publisher, config)?;
    println!(
        "{} Published '{}' ({} rows, {} panels)",
        "✓".green().bold(),
        config.title,
        summary.rows,
        summary.panels
    );

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // dry runs print the dashboard on stdout, keep the log quiet
    let level = if cli.verbose {
        LevelFilter::Debug
    } else if cli.dry_run {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let dry_run = cli.dry_run;
    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{} {}", "✗".red().bold(), e);
            process::exit(1);
        }
    };

    if let Err(e) = execute(&config, dry_run) {
        eprintln!("{} {}", "✗".red().bold(), e);
        process::exit(1);
    }
}
