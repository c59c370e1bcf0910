use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{DoraError, Result};
use crate::model::entry::MetricsEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    Overwrite,
    Append,
}

impl WriteMode {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "overwrite" => Ok(Self::Overwrite),
            "append" => Ok(Self::Append),
            other => Err(DoraError::InvalidArgument(format!(
                "write mode must be overwrite or append, got {other}"
            ))),
        }
    }
}

pub fn write_entry(path: &Path, entry: &MetricsEntry, mode: WriteMode) -> Result<()> {
    let entry = serde_json::to_value(entry)
        .map_err(|e| DoraError::Internal(format!("serialize metrics entry: {e}")))?;
    let payload = match mode {
        WriteMode::Overwrite => entry,
        WriteMode::Append => {
            let mut history = load_history(path);
            history.push(entry);
            Value::Array(history)
        }
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|e| DoraError::Io(format!("create {}: {e}", parent.display())))?;
    }
    let raw = serde_json::to_string_pretty(&payload)
        .map_err(|e| DoraError::Internal(format!("serialize metrics file: {e}")))?;
    fs::write(path, raw).map_err(|e| DoraError::Io(format!("write {}: {e}", path.display())))
}

pub fn load_history(path: &Path) -> Vec<Value> {
    let Ok(raw) = fs::read_to_string(path) else {
        return Vec::new();
    };
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Array(items)) => items,
        Ok(other) => vec![other],
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "discarding unreadable metrics history");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::*;

    fn entry(freq: u64, lead: f64) -> MetricsEntry {
        MetricsEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
            deployment_frequency: freq,
            average_lead_time_hours: lead,
        }
    }

    #[test]
    fn write_mode_parse_variants() {
        assert_eq!(WriteMode::parse("append").unwrap(), WriteMode::Append);
        assert_eq!(WriteMode::parse("OVERWRITE").unwrap(), WriteMode::Overwrite);
        assert!(WriteMode::parse("merge").is_err());
    }

    #[test]
    fn overwrite_keeps_single_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dora_metrics.json");
        write_entry(&path, &entry(1, 1.0), WriteMode::Overwrite).unwrap();
        write_entry(&path, &entry(2, 3.5), WriteMode::Overwrite).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["deployment_frequency"], json!(2));
        assert_eq!(written["average_lead_time_hours"], json!(3.5));
        assert_eq!(written["timestamp"], json!("2026-02-01T12:00:00Z"));
    }

    #[test]
    fn append_wraps_existing_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dora_metrics.json");
        write_entry(&path, &entry(1, 1.0), WriteMode::Overwrite).unwrap();
        write_entry(&path, &entry(2, 2.0), WriteMode::Append).unwrap();

        let written: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let items = written.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["deployment_frequency"], json!(2));
    }

    #[test]
    fn append_discards_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dora_metrics.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{not json").unwrap();
        write_entry(&path, &entry(7, 0.5), WriteMode::Append).unwrap();

        let history = load_history(&path);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0]["deployment_frequency"], json!(7));
    }
}
