//! Property-based testing for metric classification using proptest

use proptest::prelude::*;
use promdash::dashboard::classifier::{classify, split_metric_name};
use promdash::dashboard::grafana_dashboards::build;

const PREFIX: &str = "p_";

// Strategy for snake-case metric names mixing lower-case and capitalised tokens
fn metric_name_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z][a-z0-9]{0,8}", 1..6).prop_map(|parts| parts.join("_"))
}

// Strategy for a single exposition sample line
fn sample_line_strategy() -> impl Strategy<Value = String> {
    (metric_name_strategy(), any::<bool>(), 0u32..10_000).prop_map(|(name, labelled, value)| {
        if labelled {
            format!("{}{}{{quantile=\"0.5\"}} {}", PREFIX, name, value)
        } else {
            format!("{}{} {}", PREFIX, name, value)
        }
    })
}

// Strategy for comment lines, possibly indented
fn comment_line_strategy() -> impl Strategy<Value = String> {
    (" {0,3}", metric_name_strategy())
        .prop_map(|(indent, name)| format!("{}# TYPE {}{} gauge", indent, PREFIX, name))
}

fn exposition_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        prop_oneof![sample_line_strategy(), comment_line_strategy()],
        0..30,
    )
}

proptest! {
    #[test]
    fn test_classification_is_deterministic(lines in exposition_strategy()) {
        let raw = lines.join("\n");
        prop_assert_eq!(classify(&raw, PREFIX), classify(&raw, PREFIX));
    }

    #[test]
    fn test_comment_lines_have_no_effect(lines in exposition_strategy()) {
        let raw = lines.join("\n");
        let without_comments: Vec<String> = lines
            .iter()
            .filter(|l| !l.trim().starts_with('#'))
            .cloned()
            .collect();

        prop_assert_eq!(classify(&raw, PREFIX), classify(&without_comments.join("\n"), PREFIX));
    }

    #[test]
    fn test_sum_series_never_classified(name in metric_name_strategy(), value in 0u32..100) {
        let raw = format!("{}{}_sum {}\n", PREFIX, name, value);
        let metrics = classify(&raw, PREFIX);

        prop_assert!(metrics.is_empty());
    }

    #[test]
    fn test_first_occurrence_wins(name in metric_name_strategy(), first_labelled in any::<bool>()) {
        prop_assume!(!name.ends_with("_sum"));
        let labelled = format!("{}{}{{quantile=\"0.99\"}} 1", PREFIX, name);
        let plain = format!("{}{} 2", PREFIX, name);
        let raw = if first_labelled {
            format!("{}\n{}", labelled, plain)
        } else {
            format!("{}\n{}", plain, labelled)
        };

        let metrics = classify(&raw, PREFIX);
        prop_assert_eq!(metrics.len(), 1);
        prop_assert_eq!(metrics.get(&name).unwrap().has_quantile, first_labelled);
    }

    #[test]
    fn test_split_keeps_every_token(name in metric_name_strategy()) {
        let (group, display) = split_metric_name(&name);
        let rejoined = format!("{} {}", group, display);
        let original_tokens: Vec<&str> = name.split('_').collect();
        let rejoined_tokens: Vec<&str> = rejoined.split_whitespace().collect();

        prop_assert_eq!(original_tokens, rejoined_tokens);
    }

    #[test]
    fn test_every_metric_gets_one_panel(lines in exposition_strategy()) {
        let metrics = classify(&lines.join("\n"), PREFIX);
        let dashboard = build(&metrics, "prop");

        prop_assert_eq!(dashboard.panel_count(), metrics.len());
        for row in &dashboard.rows {
            prop_assert!(!row.panels.is_empty());
        }
    }
}
