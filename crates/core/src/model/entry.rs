use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricsEntry {
    pub timestamp: DateTime<Utc>,
    pub deployment_frequency: u64,
    pub average_lead_time_hours: f64,
}
