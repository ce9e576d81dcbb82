//! A dashboard run: fetch, classify, build, publish.
//!
//! Each stage gates the next. A failed fetch ends the run before anything is
//! built, and a failed publish is reported once without retrying.

use crate::dashboard::classifier::classify;
use crate::dashboard::client::{DashboardPublisher, MetricsSource};
use crate::dashboard::config::Config;
use crate::dashboard::errors::{RunError, RunResult};
use crate::dashboard::grafana_dashboards::{Dashboard, DashboardBuilder};

/// What a successful run produced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub metrics: usize,
    pub rows: usize,
    pub panels: usize,
}

/// Classify a raw exposition and build the dashboard for it
pub fn build_dashboard(raw_exposition: &str, config: &Config) -> (Dashboard, RunSummary) {
    let metrics = classify(raw_exposition, &config.package_prefix());
    if metrics.is_empty() {
        log::warn!("no metrics found for package {}", config.pkg);
    } else {
        log::info!("classified {} metrics", metrics.len());
    }

    let dashboard = DashboardBuilder::new()
        .with_datasource(config.datasource.as_str())
        .with_query_field(config.query_field())
        .build(&metrics, &config.title);

    let summary = RunSummary {
        metrics: metrics.len(),
        rows: dashboard.rows.len(),
        panels: dashboard.panel_count(),
    };
    log::debug!("built {} rows with {} panels", summary.rows, summary.panels);

    (dashboard, summary)
}

/// Fetch the exposition and build the dashboard without publishing it
pub fn generate(source: &dyn MetricsSource, config: &Config) -> RunResult<(Dashboard, RunSummary)> {
    let raw = source.fetch().map_err(|e| {
        log::error!("unable to fetch metrics: {}", e);
        if let Some(code) = e.status() {
            log::error!("metrics endpoint answered with status code {}", code);
        }
        RunError::SourceUnavailable(e)
    })?;

    Ok(build_dashboard(&raw, config))
}

/// Run every stage in order and publish the result
pub fn run(
    source: &dyn MetricsSource,
    publisher: &dyn DashboardPublisher,
    config: &Config,
) -> RunResult<RunSummary> {
    let (dashboard, summary) = generate(source, config)?;

    match publisher.publish(&dashboard) {
        Ok(()) => {
            log::info!("published the dashboard");
            Ok(summary)
        }
        Err(e) => {
            log::error!("unable to publish dashboard: {}", e);
            if let Some(code) = e.status() {
                log::error!("dashboard API answered with status code {}", code);
            }
            Err(RunError::PublishRejected(e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::errors::{PublishError, SourceError};
    use std::cell::RefCell;

    struct StaticSource(Result<&'static str, u16>);

    impl MetricsSource for StaticSource {
        fn fetch(&self) -> Result<String, SourceError> {
            self.0.map(str::to_string).map_err(SourceError::Status)
        }
    }

    #[derive(Default)]
    struct RecordingPublisher {
        published: RefCell<Vec<Dashboard>>,
        reject_with: Option<u16>,
    }

    impl DashboardPublisher for RecordingPublisher {
        fn publish(&self, dashboard: &Dashboard) -> Result<(), PublishError> {
            if let Some(code) = self.reject_with {
                return Err(PublishError::Status(code));
            }
            self.published.borrow_mut().push(dashboard.clone());
            Ok(())
        }
    }

    const EXPOSITION: &str = "\
# HELP ai_grakn_engine_Http_requests_count requests
# TYPE ai_grakn_engine_Http_requests_count counter
ai_grakn_engine_Http_requests_count 42
ai_grakn_engine_Http_latency{quantile=\"0.5\"} 0.2
ai_grakn_engine_Http_latency{quantile=\"0.99\"} 0.9
ai_grakn_engine_Http_latency_sum 12
ai_grakn_engine_Task_queue_depth 3
jvm_threads 12
";

    #[test]
    fn test_run_publishes_built_dashboard() {
        let source = StaticSource(Ok(EXPOSITION));
        let publisher = RecordingPublisher::default();

        let summary = run(&source, &publisher, &Config::default()).unwrap();
        assert_eq!(summary, RunSummary { metrics: 3, rows: 2, panels: 3 });

        let published = publisher.published.borrow();
        assert_eq!(published.len(), 1);
        assert_eq!(published[0].title, Config::default().title);
        assert_eq!(published[0].rows[0].title, "Http");
        assert_eq!(published[0].rows[1].title, "Task");
    }

    #[test]
    fn test_fetch_failure_skips_publish() {
        let source = StaticSource(Err(503));
        let publisher = RecordingPublisher::default();

        let result = run(&source, &publisher, &Config::default());
        assert!(matches!(
            result,
            Err(RunError::SourceUnavailable(SourceError::Status(503)))
        ));
        assert!(publisher.published.borrow().is_empty());
    }

    #[test]
    fn test_publish_rejection_is_reported() {
        let source = StaticSource(Ok(EXPOSITION));
        let publisher = RecordingPublisher {
            reject_with: Some(401),
            ..Default::default()
        };

        let result = run(&source, &publisher, &Config::default());
        assert!(matches!(
            result,
            Err(RunError::PublishRejected(PublishError::Status(401)))
        ));
    }

    #[test]
    fn test_no_matching_metrics_still_publishes() {
        let source = StaticSource(Ok("jvm_threads 12\n"));
        let publisher = RecordingPublisher::default();

        let summary = run(&source, &publisher, &Config::default()).unwrap();
        assert_eq!(summary, RunSummary { metrics: 0, rows: 0, panels: 0 });
        assert!(publisher.published.borrow()[0].rows.is_empty());
    }

    #[test]
    fn test_custom_package() {
        let config = Config {
            pkg: "my.app".to_string(),
            ..Config::default()
        };
        let (dashboard, _) = build_dashboard("my_app_db_Pool_active 4\n", &config);

        assert_eq!(dashboard.rows[0].title, "db Pool");
        assert_eq!(dashboard.rows[0].panels[0].targets[0].expression(), "my_app_db_Pool_active");
    }
}
