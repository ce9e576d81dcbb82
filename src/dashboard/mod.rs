//! Dashboard Generation
//!
//! This module turns a flat Prometheus exposition into a Grafana dashboard:
//! * metric name parsing and grouping
//! * row/panel synthesis with per-metric query expressions
//! * fetching metrics and publishing dashboards over HTTP
//!
//! # Module Structure
//!
//! * `classifier` - Exposition parsing and metric name decomposition
//! * `grafana_dashboards` - Dashboard document model and builder
//! * `client` - Metrics source and dashboard publisher over HTTP
//! * `config` - Run configuration and package prefix handling
//! * `pipeline` - Sequential fetch, classify, build and publish run
//! * `errors` - Error types for fetching and publishing

/// Exposition parsing and metric name decomposition
pub mod classifier;

/// Dashboard document model and builder
pub mod grafana_dashboards;

/// HTTP collaborators for fetching metrics and publishing dashboards
pub mod client;

/// Run configuration
pub mod config;

/// Fetch, classify, build and publish
pub mod pipeline;

/// Error types for dashboard runs
pub mod errors;
