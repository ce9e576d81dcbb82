//! HTTP collaborators: reading the metrics exposition and publishing the
//! finished dashboard to Grafana

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::dashboard::errors::{PublishError, SourceError};
use crate::dashboard::grafana_dashboards::Dashboard;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Supplies raw Prometheus text exposition
pub trait MetricsSource {
    fn fetch(&self) -> Result<String, SourceError>;
}

/// Accepts a finished dashboard
pub trait DashboardPublisher {
    fn publish(&self, dashboard: &Dashboard) -> Result<(), PublishError>;
}

/// Reads metrics with a plain HTTP GET
pub struct HttpMetricsSource {
    uri: String,
    client: Client,
}

impl HttpMetricsSource {
    pub fn new(uri: impl Into<String>) -> Result<Self, SourceError> {
        let client = Client::builder().timeout(FETCH_TIMEOUT).build()?;

        Ok(Self {
            uri: uri.into(),
            client,
        })
    }
}

impl MetricsSource for HttpMetricsSource {
    fn fetch(&self) -> Result<String, SourceError> {
        log::info!("fetching metrics from {}", self.uri);

        let response = self.client.get(&self.uri).send()?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(SourceError::Status(status.as_u16()));
        }

        Ok(response.text()?)
    }
}

/// Posts dashboards to the Grafana dashboard API
pub struct GrafanaPublisher {
    uri: String,
    token: Option<String>,
    client: Client,
}

impl GrafanaPublisher {
    pub fn new(
        uri: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PublishError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            uri: uri.into(),
            token,
            client,
        })
    }
}

impl DashboardPublisher for GrafanaPublisher {
    fn publish(&self, dashboard: &Dashboard) -> Result<(), PublishError> {
        log::info!("publishing dashboard '{}' to {}", dashboard.title, self.uri);

        let mut request = self.client.post(&self.uri).json(&dashboard.publish_request());

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        match response.status() {
            StatusCode::OK | StatusCode::CREATED => Ok(()),
            status => {
                let body = response.text().unwrap_or_default();
                log::debug!("grafana rejected dashboard: {}", body);
                Err(PublishError::Status(status.as_u16()))
            }
        }
    }
}
