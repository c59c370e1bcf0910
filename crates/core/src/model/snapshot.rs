use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{DoraError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub deployment_frequency: Option<Value>,
    pub average_lead_time_hours: Option<Value>,
}

impl MetricsSnapshot {
    pub fn parse(body: &[u8]) -> Result<Self> {
        let payload: Value = serde_json::from_slice(body)
            .map_err(|e| DoraError::Decode(format!("metrics payload is not JSON: {e}")))?;
        Ok(Self::from_payload(&payload))
    }

    pub fn from_payload(payload: &Value) -> Self {
        match payload {
            Value::Object(fields) => Self::from_fields(fields),
            Value::Array(items) => match items.last() {
                Some(Value::Object(fields)) => Self::from_fields(fields),
                _ => Self::default(),
            },
            _ => Self::default(),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            deployment_frequency: fields.get("deployment_frequency").cloned(),
            average_lead_time_hours: fields.get("average_lead_time_hours").cloned(),
        }
    }

    pub fn values(&self) -> [Option<Value>; 2] {
        [
            self.deployment_frequency.clone(),
            self.average_lead_time_hours.clone(),
        ]
    }
}
