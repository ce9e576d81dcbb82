//! Grafana Dashboards
//!
//! Typed model of the row-based Grafana dashboard document and the builder
//! that synthesises it from classified metrics.
//!
//! # Layout
//!
//! * **Rows** - one per metric group, in the order groups were first seen
//! * **Panels** - one graph per metric, fixed span, compact legend
//! * **Targets** - query shape picked from the metric:
//!   quantile series get p50/p99, `_count` counters get a 5 minute rate,
//!   anything else is plotted as is

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::dashboard::classifier::{MetricClassification, MetricClassifications};

/// Width of every panel in grid columns (12 per row)
pub const PANEL_SPAN: u32 = 4;

/// Window used for counter rates
pub const RATE_WINDOW: &str = "5m";

/// Quantiles plotted for labelled series
pub const QUANTILES: [&str; 2] = ["0.5", "0.99"];

pub const DEFAULT_DATASOURCE: &str = "prometheus";

const ROW_HEIGHT: &str = "250px";
const SCHEMA_VERSION: u32 = 6;

/// Dashboard document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    /// Always null so the server assigns one
    pub id: Option<u32>,
    pub title: String,
    pub tags: Vec<String>,
    pub timezone: String,
    pub editable: bool,
    pub schema_version: u32,
    pub version: u32,
    pub time: TimeRange,
    pub rows: Vec<Row>,
}

/// Time range configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRange {
    pub from: String,
    pub to: String,
}

/// Horizontal group of panels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub title: String,
    pub show_title: bool,
    pub collapse: bool,
    pub editable: bool,
    pub height: String,
    pub panels: Vec<Panel>,
}

/// Graph panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Unique within the dashboard, starting at 1
    pub id: u32,
    #[serde(rename = "type")]
    pub panel_type: String,
    pub title: String,
    pub span: u32,
    pub datasource: String,
    pub targets: Vec<Target>,
    pub legend: Legend,
    pub lines: bool,
    pub fill: u32,
    pub linewidth: u32,
}

/// Legend settings; every summary statistic is off by default
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Legend {
    pub show: bool,
    pub values: bool,
    pub avg: bool,
    pub min: bool,
    pub max: bool,
    pub current: bool,
    pub total: bool,
}

/// Field a target stores its query expression in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    /// `expr`, used by Prometheus datasources
    Expr,
    /// `target`, used by Graphite datasources
    Target,
}

impl Default for QueryField {
    fn default() -> Self {
        QueryField::Expr
    }
}

/// Panel query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub ref_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default)]
    pub hide: bool,
}

impl Target {
    pub fn new(ref_id: impl Into<String>, expression: impl Into<String>, field: QueryField) -> Self {
        let expression = expression.into();
        let (expr, target) = match field {
            QueryField::Expr => (Some(expression), None),
            QueryField::Target => (None, Some(expression)),
        };

        Target {
            ref_id: ref_id.into(),
            expr,
            target,
            hide: false,
        }
    }

    /// The query expression, whichever field holds it
    pub fn expression(&self) -> &str {
        self.expr
            .as_deref()
            .or_else(|| self.target.as_deref())
            .unwrap_or_default()
    }
}

/// Body sent to the dashboard API
#[derive(Debug, Serialize)]
pub struct PublishRequest<'a> {
    pub dashboard: &'a Dashboard,
    pub overwrite: bool,
}

impl Dashboard {
    pub fn new(title: impl Into<String>) -> Self {
        Dashboard {
            id: None,
            title: title.into(),
            tags: Vec::new(),
            timezone: "browser".to_string(),
            editable: true,
            schema_version: SCHEMA_VERSION,
            version: 0,
            time: TimeRange {
                from: "now-6h".to_string(),
                to: "now".to_string(),
            },
            rows: Vec::new(),
        }
    }

    pub fn panel_count(&self) -> usize {
        self.rows.iter().map(|row| row.panels.len()).sum()
    }

    /// Wrap the dashboard for publishing, replacing any existing one
    pub fn publish_request(&self) -> PublishRequest<'_> {
        PublishRequest {
            dashboard: self,
            overwrite: true,
        }
    }
}

impl Row {
    pub fn new(title: impl Into<String>) -> Self {
        Row {
            title: title.into(),
            show_title: true,
            collapse: false,
            editable: true,
            height: ROW_HEIGHT.to_string(),
            panels: Vec::new(),
        }
    }
}

/// Pick the panel title and query expressions for a metric.
pub fn panel_queries(metric: &MetricClassification) -> (String, Vec<String>) {
    let full_name = &metric.full_name;

    if metric.has_quantile {
        let queries = QUANTILES
            .iter()
            .map(|q| format!("{}{{quantile=\"{}\"}}", full_name, q))
            .collect();
        (metric.display_name.clone(), queries)
    } else if full_name.ends_with("_count") {
        (
            format!("{} (rate)", metric.display_name),
            vec![format!("rate({}[{}])", full_name, RATE_WINDOW)],
        )
    } else {
        (metric.display_name.clone(), vec![full_name.clone()])
    }
}

fn ref_id(index: usize) -> String {
    let letter = (b'A' + (index % 26) as u8) as char;
    if index < 26 {
        letter.to_string()
    } else {
        format!("{}{}", letter, index / 26)
    }
}

/// Builds dashboards from classified metrics
#[derive(Debug, Clone)]
pub struct DashboardBuilder {
    datasource: String,
    query_field: QueryField,
}

impl Default for DashboardBuilder {
    fn default() -> Self {
        DashboardBuilder {
            datasource: DEFAULT_DATASOURCE.to_string(),
            query_field: QueryField::default(),
        }
    }
}

impl DashboardBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the datasource name every panel queries
    pub fn with_datasource(mut self, datasource: impl Into<String>) -> Self {
        self.datasource = datasource.into();
        self
    }

    /// Set the target field query expressions are written to
    pub fn with_query_field(mut self, field: QueryField) -> Self {
        self.query_field = field;
        self
    }

    /// Build one row per group and one panel per metric.
    ///
    /// Rows follow the order groups were first seen in, panels the order
    /// metrics were added to their group. Never fails: an empty input yields
    /// a dashboard without rows.
    pub fn build(&self, metrics: &MetricClassifications, title: &str) -> Dashboard {
        let mut groups: Vec<(&str, Vec<&MetricClassification>)> = Vec::new();
        let mut positions: HashMap<&str, usize> = HashMap::new();

        for metric in metrics.values() {
            let key = metric.group_key.as_str();
            match positions.get(key).copied() {
                Some(pos) => groups[pos].1.push(metric),
                None => {
                    positions.insert(key, groups.len());
                    groups.push((key, vec![metric]));
                }
            }
        }

        let mut dashboard = Dashboard::new(title);
        let mut next_id = 1;

        for (group_key, members) in groups {
            let mut row = Row::new(group_key);
            for metric in members {
                row.panels.push(self.make_panel(next_id, metric));
                next_id += 1;
            }
            dashboard.rows.push(row);
        }

        dashboard
    }

    fn make_panel(&self, id: u32, metric: &MetricClassification) -> Panel {
        let (title, queries) = panel_queries(metric);
        let targets = queries
            .into_iter()
            .enumerate()
            .map(|(i, query)| Target::new(ref_id(i), query, self.query_field))
            .collect();

        Panel {
            id,
            panel_type: "graph".to_string(),
            title,
            span: PANEL_SPAN,
            datasource: self.datasource.clone(),
            targets,
            legend: Legend::default(),
            lines: true,
            fill: 1,
            linewidth: 2,
        }
    }
}

/// Build a dashboard with the default Prometheus settings
pub fn build(metrics: &MetricClassifications, title: &str) -> Dashboard {
    DashboardBuilder::default().build(metrics, title)
}
