//! Error types for the task manager client.
//!
//! # Design
//! `NotFound` gets a dedicated variant because callers frequently distinguish
//! "the resource does not exist" from "the server returned an unexpected
//! status." All other non-2xx responses land in `Http` with the status code,
//! the server's `detail` string when it sent one, and the raw body.
//! Validation failures are produced locally and never reach the network.

use serde::Deserialize;
use thiserror::Error;

use crate::validate::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response: connection refused, timeout.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found{}", fmt_detail(.detail))]
    NotFound { detail: Option<String> },

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}{}", fmt_detail(.detail))]
    Http {
        status: u16,
        detail: Option<String>,
        body: String,
    },

    /// The DTO failed client-side validation.
    #[error("{0}")]
    Validation(ValidationErrors),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Server-supplied detail message, if the error response carried one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::NotFound { detail } | ApiError::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound { .. } => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

fn fmt_detail(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {d}"),
        None => String::new(),
    }
}

/// Error body in the FastAPI style. `detail` is usually a string but
/// request-validation failures send a list of objects instead.
#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Pull a human-readable `detail` out of an error response body.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Null => None,
        serde_json::Value::Array(items) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(|m| m.as_str()).map(str::to_string))
                .collect();
            if messages.is_empty() {
                Some(serde_json::Value::Array(items).to_string())
            } else {
                Some(messages.join("; "))
            }
        }
        other => Some(other.to_string()),
    }
}
