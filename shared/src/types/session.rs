use serde::{Deserialize, Serialize};

use super::user::UserRecord;

/// JSON stored in the `pb_auth` cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub model: UserRecord,
}

/// Body of a successful `auth-with-password` call.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub record: UserRecord,
}

impl From<AuthResponse> for AuthPayload {
    fn from(resp: AuthResponse) -> Self {
        Self {
            token: resp.token,
            model: resp.record,
        }
    }
}
