use std::collections::HashMap;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("backend returned {status}: {}", .body.message)]
    Status { status: u16, body: ApiErrorBody },

    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl BackendError {
    /// HTTP status the backend answered with, if it answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// The backend never answered (connect, DNS, timeout, ...).
    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Validation message the backend attached to `field`, if any.
    pub fn field_message(&self, field: &str) -> Option<&str> {
        match self {
            Self::Status { body, .. } => body.field_message(field),
            _ => None,
        }
    }
}

/// Error body PocketBase sends with every non-2xx response:
/// `{"status":400,"message":"...","data":{"email":{"code":"...","message":"..."}}}`.
/// Older releases used `code` instead of `status`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, alias = "code")]
    pub status: u16,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: HashMap<String, FieldError>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FieldError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl ApiErrorBody {
    /// Decode an error body, keeping the raw text as the message when it is
    /// not the expected JSON shape.
    pub fn from_bytes(status: u16, bytes: &[u8]) -> Self {
        serde_json::from_slice::<ApiErrorBody>(bytes).unwrap_or_else(|_| ApiErrorBody {
            status,
            message: String::from_utf8_lossy(bytes).trim().to_string(),
            data: HashMap::new(),
        })
    }

    pub fn field_message(&self, field: &str) -> Option<&str> {
        self.data
            .get(field)
            .map(|f| f.message.as_str())
            .filter(|m| !m.is_empty())
    }
}
