use dora_core::error::{DoraError, Result};
use dora_core::model::snapshot::MetricsSnapshot;
use serde::Serialize;
use serde_json::Value;

pub const LABELS: [&str; 2] = ["Deployment Frequency", "Lead Time (hrs)"];
pub const DATASET_LABEL: &str = "Latest DORA Metrics";
pub const COLORS: [&str; 2] = ["#4CAF50", "#FF9800"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarChart {
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub options: ChartOptions,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<Value>>,
    pub background_color: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChartOptions {
    pub responsive: bool,
    pub y_begin_at_zero: bool,
}

impl BarChart {
    pub fn from_snapshot(snapshot: &MetricsSnapshot) -> Self {
        Self {
            kind: ChartKind::Bar,
            labels: LABELS.iter().map(|l| l.to_string()).collect(),
            datasets: vec![Dataset {
                label: DATASET_LABEL.to_string(),
                data: snapshot.values().to_vec(),
                background_color: COLORS.iter().map(|c| c.to_string()).collect(),
            }],
            options: ChartOptions {
                responsive: true,
                y_begin_at_zero: true,
            },
        }
    }
}

impl Dataset {
    pub fn bars(&self) -> Vec<(usize, f64)> {
        self.data
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.as_ref().and_then(Value::as_f64).map(|v| (i, v)))
            .collect()
    }
}

pub fn parse_hex_color(hex: &str) -> Result<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.is_ascii() {
        return Err(DoraError::Render(format!("invalid color {hex}")));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|_| DoraError::Render(format!("invalid color {hex}")))
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}
