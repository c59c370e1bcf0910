use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{DoraError, Result};

pub fn parse_github_time(input: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(input)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| DoraError::Parse(format!("invalid timestamp {input}: {e}")))
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn parse_duration_str(input: &str) -> Result<Duration> {
    humantime::parse_duration(input)
        .map_err(|e| DoraError::Parse(format!("invalid duration {input}: {e}")))
}
