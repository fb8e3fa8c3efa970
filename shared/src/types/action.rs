use serde::Serialize;
use serde_json::Value;

/// Result envelope returned by every form action (add, update, delete,
/// login, signup, logout).
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResponse {
    Success {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        redirect: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
    },
    Error {
        code: String,
        message: String,
    },
}

impl ActionResponse {
    pub fn success(message: &str) -> Self {
        Self::Success {
            message: message.to_string(),
            redirect: None,
            data: None,
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    pub fn with_redirect(self, to: &str) -> Self {
        match self {
            Self::Success { message, data, .. } => Self::Success {
                message,
                redirect: Some(to.to_string()),
                data,
            },
            err => err,
        }
    }

    pub fn with_data(self, value: Value) -> Self {
        match self {
            Self::Success {
                message, redirect, ..
            } => Self::Success {
                message,
                redirect,
                data: Some(value),
            },
            err => err,
        }
    }
}
