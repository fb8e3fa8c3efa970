use serde::{Deserialize, Serialize};

/// Payload of a PocketBase auth token.
///
/// The server never trusts these claims for authorization; the backend
/// verifies the signature on every call. They are read only to recover an
/// identity id and expiry from legacy single-token cookies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Record id of the authenticated user.
    pub id: String,

    /// `"auth"` for user tokens.
    #[serde(rename = "type", default)]
    pub token_type: String,

    #[serde(rename = "collectionId", default)]
    pub collection_id: String,

    /// Expiry (Unix timestamp, seconds).
    pub exp: i64,

    #[serde(default)]
    pub refreshable: bool,
}

impl TokenClaims {
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.exp <= now
    }
}
