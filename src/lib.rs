//! Prometheus to Grafana dashboard generator
//!
//! Reads a Prometheus text exposition, infers a grouping of metrics from
//! their naming convention and publishes a row-based Grafana dashboard.
//!
//! # Features
//!
//! * Metric name decomposition into row groups and panel titles
//! * Graph panels with quantile, rate and plain gauge queries
//! * Publishing to the Grafana dashboard API with bearer authentication
//!
//! # Architecture
//!
//! Everything lives in the `dashboard` module; the `promdash` binary only
//! parses arguments, installs the logger and drives `dashboard::pipeline`.

/// Metric classification, dashboard synthesis and publishing
pub mod dashboard;
