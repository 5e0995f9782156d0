//! Uniform envelope returned by the mock remote service.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Outcome of a service call. Callers branch on `success`; business-rule
/// rejections are responses, not errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// `None` serializes as `null`.
    #[serde(default)]
    pub data: Option<T>,
    /// Milliseconds since the Unix epoch at which the response was built.
    pub timestamp: i64,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            timestamp: Utc::now().timestamp_millis(),
        }
    }
}
