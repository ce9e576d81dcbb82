//! Metric Classifier
//!
//! Parses a Prometheus text exposition and decomposes every metric name that
//! belongs to the configured package into a row group and a panel title.
//!
//! # Naming convention
//!
//! Names are expected to read as lower-case snake tokens naming a subsystem,
//! then a capitalised row marker token, then the tokens naming the
//! measurement:
//!
//! ```text
//! engine_Http_requests_count  ->  group "engine Http", title "requests count"
//! ```
//!
//! This is a convention, not a grammar. A name without any marker token puts
//! every token into the group and leaves the title empty, so such metrics each
//! get a row of their own named after the whole metric.

use std::collections::HashMap;

/// Classification of a single metric name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricClassification {
    /// Row the metric is placed in
    pub group_key: String,
    /// Panel title, trimmed
    pub display_name: String,
    /// Package prefix plus bare name, used as the query subject
    pub full_name: String,
    /// Whether the first sample line carried a label block
    pub has_quantile: bool,
}

/// Classified metrics keyed by bare name, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricClassifications {
    entries: Vec<(String, MetricClassification)>,
    index: HashMap<String, usize>,
}

impl MetricClassifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a classification unless the key is already present.
    ///
    /// Returns `false` when the key was already classified; the existing
    /// entry is left untouched.
    pub fn insert(&mut self, key: String, classification: MetricClassification) -> bool {
        if self.index.contains_key(&key) {
            return false;
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, classification));
        true
    }

    pub fn get(&self, key: &str) -> Option<&MetricClassification> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricClassification)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterate over classifications only, in insertion order
    pub fn values(&self) -> impl Iterator<Item = &MetricClassification> {
        self.entries.iter().map(|(_, v)| v)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    AccumulatingGroup,
    AccumulatingName,
}

/// Return the part of `line` after the first occurrence of `prefix`.
pub fn strip_package_prefix<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    line.find(prefix).map(|start| &line[start + prefix.len()..])
}

/// Cut the metric name off at the label block or the value separator,
/// whichever comes first.
pub fn bare_metric_name(remainder: &str) -> &str {
    match remainder.find(|c: char| c == '{' || c == ' ') {
        Some(end) => &remainder[..end],
        None => remainder,
    }
}

/// A token ends the group part unless it starts with a lower-case letter.
/// Empty tokens have no first character and never end it.
fn is_row_marker(token: &str) -> bool {
    token.chars().next().map_or(false, |c| !c.is_lowercase())
}

/// Split a bare metric name into `(group_key, display_name)`.
///
/// Tokens are scanned left to right. Lower-case tokens are appended to the
/// group, space separated, until the first row marker token, which closes the
/// group. Every later token belongs to the display name.
pub fn split_metric_name(bare_name: &str) -> (String, String) {
    let mut state = ScanState::AccumulatingGroup;
    let mut group_key = String::new();
    let mut display_name = String::new();

    for token in bare_name.split('_') {
        match state {
            ScanState::AccumulatingGroup if is_row_marker(token) => {
                group_key.push_str(token);
                state = ScanState::AccumulatingName;
            }
            ScanState::AccumulatingGroup => {
                group_key.push_str(token);
                group_key.push(' ');
            }
            ScanState::AccumulatingName => {
                display_name.push_str(token);
                display_name.push(' ');
            }
        }
    }

    // no marker: drop the separator left after the last group token
    if state == ScanState::AccumulatingGroup {
        group_key.pop();
    }

    (group_key, display_name.trim().to_string())
}

/// Classify every metric of the package in a raw exposition.
///
/// Comment lines, lines outside the package, `_sum` aggregates and repeated
/// names are skipped. The first line seen for a name decides its
/// classification.
pub fn classify(raw_exposition: &str, package_prefix: &str) -> MetricClassifications {
    let mut metrics = MetricClassifications::new();

    for line in raw_exposition.lines() {
        if line.trim().starts_with('#') {
            continue;
        }

        let remainder = match strip_package_prefix(line, package_prefix) {
            Some(remainder) => remainder,
            None => continue,
        };

        let bare_name = bare_metric_name(remainder);
        if metrics.contains_key(bare_name) {
            continue;
        }
        if bare_name.ends_with("_sum") {
            log::debug!("skipping aggregate series {}{}", package_prefix, bare_name);
            continue;
        }

        let has_quantile = remainder[bare_name.len()..].starts_with('{');
        let (group_key, display_name) = split_metric_name(bare_name);

        metrics.insert(
            bare_name.to_string(),
            MetricClassification {
                group_key,
                display_name,
                full_name: format!("{}{}", package_prefix, bare_name),
                has_quantile,
            },
        );
    }

    metrics
}
