use chrono::{DateTime, Utc};
use serde::Serialize;

/// One point of the equity trend chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquitySample {
    pub label: String,
    pub value: f64,
    pub received_at: DateTime<Utc>,
}

impl EquitySample {
    pub fn new(received_at: DateTime<Utc>, value: f64) -> Self {
        Self {
            label: received_at.format("%H:%M:%S").to_string(),
            value,
            received_at,
        }
    }
}
