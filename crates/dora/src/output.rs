use dora_core::model::entry::MetricsEntry;
use dora_core::model::snapshot::MetricsSnapshot;
use dora_core::time::format_timestamp;
use dora_render::BarChart;
use owo_colors::OwoColorize;
use serde_json::Value;

pub fn print_entry_human(entry: &MetricsEntry) {
    println!("{} {}", "saved".green(), format_entry(entry));
}

fn format_entry(entry: &MetricsEntry) -> String {
    format!(
        "{} deployment_frequency={} average_lead_time_hours={}",
        format_timestamp(entry.timestamp),
        entry.deployment_frequency,
        entry.average_lead_time_hours
    )
}

pub fn print_snapshot_human(snapshot: &MetricsSnapshot, chart: &BarChart) {
    let values = snapshot.values();
    for (label, value) in chart.labels.iter().zip(values.iter()) {
        println!("{:<22} {}", label.cyan(), format_value(value.as_ref()));
    }
    if let Some(dataset) = chart.datasets.first() {
        println!(
            "-- {} ({} of {} values drawable) --",
            dataset.label,
            dataset.bars().len(),
            dataset.data.len()
        );
    }
}

fn format_value(value: Option<&Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => format!("{other} (not numeric)"),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    #[test]
    fn format_value_variants() {
        assert_eq!(format_value(None), "-");
        assert_eq!(format_value(Some(&json!(12.5))), "12.5");
        assert_eq!(format_value(Some(&json!("x"))), "\"x\" (not numeric)");
    }

    #[test]
    fn entry_timestamp_matches_metrics_file() {
        let entry = MetricsEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 2, 10, 12, 0, 0).unwrap(),
            deployment_frequency: 2,
            average_lead_time_hours: 2.5,
        };
        let written = serde_json::to_value(&entry).unwrap();
        assert_eq!(written["timestamp"], "2026-02-10T12:00:00Z");
        assert_eq!(
            format_entry(&entry),
            "2026-02-10T12:00:00Z deployment_frequency=2 average_lead_time_hours=2.5"
        );
    }
}
