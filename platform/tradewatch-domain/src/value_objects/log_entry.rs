use crate::services::diagnostics::{DiagnosticKind, FieldCheck};
use crate::value_objects::wire::Wire;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl LogLevel {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Some(LogLevel::Debug),
            "info" | "success" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warning),
            "error" | "critical" | "fatal" => Some(LogLevel::Error),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogPayload {
    pub timestamp: Wire<String>,
    pub level: Wire<String>,
    pub message: Wire<String>,
}

/// One line of the activity log. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    /// Missing timestamps fall back to the receive time; a missing level means info.
    pub fn from_payload(
        payload: &LogPayload,
        received_at: DateTime<Utc>,
        check: &mut FieldCheck<'_>,
    ) -> Self {
        let timestamp = check
            .optional_text("timestamp", &payload.timestamp)
            .unwrap_or_else(|| received_at.to_rfc3339());
        let level = match check.optional_text("level", &payload.level) {
            Some(raw) => LogLevel::parse(&raw).unwrap_or_else(|| {
                check.report(
                    DiagnosticKind::MalformedField,
                    format!("unknown level '{raw}', using info"),
                );
                LogLevel::Info
            }),
            None => LogLevel::Info,
        };
        let message = check.text("message", &payload.message).unwrap_or_default();
        Self {
            timestamp,
            level,
            message,
        }
    }
}
