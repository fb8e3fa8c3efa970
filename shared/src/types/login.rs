use serde::Deserialize;

use super::action::ActionResponse;

// ---------------------------------------------------------------------------
// Login wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginData {
    #[serde(alias = "identity")]
    pub email: String,
    pub password: String,
}

// ---------------------------------------------------------------------------
// Login errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum LoginError {
    InvalidCredentials,
    MissingField(String),
    BackendUnavailable,
    InternalError,
}

impl LoginError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::BackendUnavailable => "BACKEND_UNAVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    pub fn to_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Email address or password is incorrect.".to_string(),
            Self::MissingField(field) => format!("Missing required field: {}", field),
            Self::BackendUnavailable => "Sign-in is temporarily unavailable.".to_string(),
            Self::InternalError => "An internal error occurred".to_string(),
        }
    }

    pub fn to_response(&self) -> ActionResponse {
        ActionResponse::error(self.to_code(), &self.to_message())
    }
}
