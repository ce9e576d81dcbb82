//! Run configuration
//!
//! Values come from three layers: built-in defaults, an optional TOML file
//! and command line flags or environment variables (highest precedence).

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dashboard::errors::ConfigError;
use crate::dashboard::grafana_dashboards::{QueryField, DEFAULT_DATASOURCE};

pub const DEFAULT_PROMETHEUS_URI: &str = "http://localhost:4567/metrics?format=prometheus";
pub const DEFAULT_GRAFANA_URI: &str = "http://localhost:3000/api/dashboards/db";
pub const DEFAULT_TITLE: &str = "Grakn dashboard (test)";
pub const DEFAULT_PACKAGE: &str = "ai.grakn.engine";
pub const DEFAULT_PUBLISH_TIMEOUT_MS: u64 = 1000;

/// Settings for a single fetch, build and publish run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint serving the Prometheus text exposition
    pub prometheus_uri: String,
    /// Grafana dashboard API endpoint
    pub grafana_uri: String,
    /// Dashboard title
    pub title: String,
    /// Dotted package name scoping which metrics are dashboarded
    pub pkg: String,
    /// Bearer token for the Grafana API
    pub token: Option<String>,
    pub publish_timeout_ms: u64,
    /// Datasource name set on every panel
    pub datasource: String,
    /// Write queries to `target` instead of `expr`
    pub graphite_targets: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prometheus_uri: DEFAULT_PROMETHEUS_URI.to_string(),
            grafana_uri: DEFAULT_GRAFANA_URI.to_string(),
            title: DEFAULT_TITLE.to_string(),
            pkg: DEFAULT_PACKAGE.to_string(),
            token: None,
            publish_timeout_ms: DEFAULT_PUBLISH_TIMEOUT_MS,
            datasource: DEFAULT_DATASOURCE.to_string(),
            graphite_targets: false,
        }
    }
}

impl Config {
    /// Load a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Prefix stripped from metric names, derived from `pkg`
    pub fn package_prefix(&self) -> String {
        package_prefix(&self.pkg)
    }

    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }

    pub fn query_field(&self) -> QueryField {
        if self.graphite_targets {
            QueryField::Target
        } else {
            QueryField::Expr
        }
    }
}

/// Values given on the command line or through the environment.
///
/// `None` (or `false`) leaves the underlying value alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub prometheus_uri: Option<String>,
    pub grafana_uri: Option<String>,
    pub title: Option<String>,
    pub pkg: Option<String>,
    pub token: Option<String>,
    pub publish_timeout_ms: Option<u64>,
    pub datasource: Option<String>,
    pub graphite_targets: bool,
}

impl Config {
    /// Layer overrides on top of file or default values
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(uri) = overrides.prometheus_uri {
            self.prometheus_uri = uri;
        }
        if let Some(uri) = overrides.grafana_uri {
            self.grafana_uri = uri;
        }
        if let Some(title) = overrides.title {
            self.title = title;
        }
        if let Some(pkg) = overrides.pkg {
            self.pkg = pkg;
        }
        if overrides.token.is_some() {
            self.token = overrides.token;
        }
        if let Some(timeout) = overrides.publish_timeout_ms {
            self.publish_timeout_ms = timeout;
        }
        if let Some(datasource) = overrides.datasource {
            self.datasource = datasource;
        }
        if overrides.graphite_targets {
            self.graphite_targets = true;
        }

        self
    }
}

/// Turn a dotted package name into the metric name prefix it exports under,
/// e.g. `ai.grakn.engine` becomes `ai_grakn_engine_`.
pub fn package_prefix(pkg: &str) -> String {
    format!("{}_", pkg.replace('.', "_"))
}
