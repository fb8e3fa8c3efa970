use serde::Deserialize;

use super::action::ActionResponse;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupData {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(rename = "passwordConfirm", alias = "password_confirm")]
    pub password_confirm: String,
}

/// Error codes for signup
#[derive(Debug)]
pub enum SignupError {
    PasswordMismatch,
    MissingField(String),
    /// The backend refused the record; carries its validation message
    /// when one was available.
    Rejected(Option<String>),
    BackendUnavailable,
    InternalError,
}

impl SignupError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::PasswordMismatch => "PASSWORD_MISMATCH",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::Rejected(_) => "SIGNUP_REJECTED",
            Self::BackendUnavailable => "BACKEND_UNAVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::PasswordMismatch => "Passwords do not match.".to_string(),
            Self::MissingField(field) => format!("Missing required field: {}", field),
            Self::Rejected(Some(msg)) => msg.clone(),
            Self::Rejected(None) => "Failed to create account.".to_string(),
            Self::BackendUnavailable => "Sign-up is temporarily unavailable.".to_string(),
            Self::InternalError => "An internal error occurred".to_string(),
        }
    }

    pub fn to_response(&self) -> ActionResponse {
        ActionResponse::error(self.to_code(), &self.to_message())
    }
}
