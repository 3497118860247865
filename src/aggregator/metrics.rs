//! Calculate hot labels and summary numbers from a timeline.
//!
//! Hot labels are the measurement names with the largest total duration.
//! Nested measurements are counted in full, so an outer label always
//! includes its children.

use crate::parser::schema::HotLabel;
use crate::timing::Measurement;
use log::debug;
use std::collections::HashMap;

/// Calculate the top `top_n` labels by total duration
///
/// **Public** - main entry point for metrics calculation
pub fn calculate_hot_labels(measurements: &[Measurement], top_n: usize) -> Vec<HotLabel> {
    debug!("Calculating top {} labels from {} measurements", top_n, measurements.len());

    let span = total_span_us(measurements);
    let mut totals: HashMap<&str, (u64, u64)> = HashMap::new();
    for m in measurements {
        let entry = totals.entry(m.name()).or_insert((0, 0));
        entry.0 += m.duration_us;
        entry.1 += 1;
    }

    let mut labels: Vec<HotLabel> = totals
        .into_iter()
        .map(|(label, (total_us, count))| HotLabel {
            label: label.to_string(),
            total_us,
            count,
            percentage: percentage(total_us, span),
        })
        .collect();

    labels.sort_by(|a, b| b.total_us.cmp(&a.total_us).then_with(|| a.label.cmp(&b.label)));
    labels.truncate(top_n);
    labels
}

/// Wall time covered by the timeline
pub fn total_span_us(measurements: &[Measurement]) -> u64 {
    let start = measurements.iter().map(|m| m.start_us).min();
    let end = measurements.iter().map(Measurement::end_us).max();
    match (start, end) {
        (Some(start), Some(end)) => end - start,
        _ => 0,
    }
}

/// Number of measurements carrying a warning annotation
pub fn count_warnings(measurements: &[Measurement]) -> usize {
    measurements.iter().filter(|m| m.warning().is_some()).count()
}

fn percentage(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        (part as f64 / whole as f64) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(label: &str, start_us: u64, duration_us: u64) -> Measurement {
        Measurement {
            label: label.to_string(),
            start_us,
            duration_us,
        }
    }

    #[test]
    fn test_calculate_hot_labels() {
        let timeline = vec![
            m("\u{269B} Row [mount]", 0, 10),
            m("\u{269B} Row [mount]", 10, 15),
            m("\u{269B} List [mount]", 0, 40),
            m("\u{269B} (Committing Changes)", 40, 10),
        ];

        let hot = calculate_hot_labels(&timeline, 2);

        assert_eq!(hot.len(), 2);
        assert_eq!(hot[0].label, "List [mount]");
        assert!((hot[0].percentage - 80.0).abs() < 1e-9);
        assert_eq!(hot[1].label, "Row [mount]");
        assert_eq!(hot[1].total_us, 25);
        assert_eq!(hot[1].count, 2);
    }

    #[test]
    fn test_count_warnings() {
        let timeline = vec![
            m("\u{26D4} (Committing Changes) Warning: Caused by a cascading update in earlier commit", 0, 1),
            m("\u{269B} App [mount]", 0, 1),
        ];
        assert_eq!(count_warnings(&timeline), 1);
    }

    #[test]
    fn test_empty_timeline() {
        assert_eq!(total_span_us(&[]), 0);
        assert!(calculate_hot_labels(&[], 5).is_empty());
    }
}
