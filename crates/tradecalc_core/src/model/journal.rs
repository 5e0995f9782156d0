//! Structured log entry model.
//!
//! # Invariants
//! - `timestamp` persists as RFC 3339 / ISO-8601 text in UTC.
//! - Entries without a readable timestamp are stamped with load time.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::{Display, Formatter};

/// Severity of one journal entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Parses a level name, case-insensitively. `warning` is accepted.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the application journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_value"
    )]
    pub context: Option<Value>,
}

/// Persisted shape, lenient about the timestamp.
#[derive(Debug, Deserialize)]
struct PersistedLogEntry {
    #[serde(default)]
    timestamp: Option<Value>,
    level: LogLevel,
    message: String,
    #[serde(default, deserialize_with = "present_value")]
    context: Option<Value>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, context: Option<Value>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            message: message.into(),
            context,
        }
    }

    /// Decodes one persisted element.
    ///
    /// `level` and `message` are required. A missing or unreadable
    /// `timestamp` (ISO text or epoch milliseconds) becomes `fallback`.
    pub fn from_persisted(value: Value, fallback: DateTime<Utc>) -> Result<Self, serde_json::Error> {
        let raw: PersistedLogEntry = serde_json::from_value(value)?;
        let timestamp = raw
            .timestamp
            .as_ref()
            .and_then(parse_timestamp)
            .unwrap_or(fallback);

        Ok(Self {
            timestamp,
            level: raw.level,
            message: raw.message,
            context: raw.context,
        })
    }
}

/// Absent context stays `None`; an explicit `null` becomes `Some(Null)`.
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(text) => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|parsed| parsed.with_timezone(&Utc)),
        Value::Number(number) => number
            .as_i64()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single()),
        _ => None,
    }
}
