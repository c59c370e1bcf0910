pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod model;
pub mod time;

pub use error::{DoraError, Result};

pub const METRICS_FILE: &str = "dora_metrics.json";

pub const CANVAS_ID: &str = "doraChart";
