use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::jwt::TokenClaims;

/// A `users` record. Only the fields this server reads are typed; everything
/// else the backend sends is kept in `extra` so it survives the round trip
/// through the session cookie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub collection_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub collection_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub username: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Minimal identity recovered from token claims (legacy cookies).
    pub fn from_claims(claims: &TokenClaims) -> Self {
        Self {
            id: claims.id.clone(),
            collection_id: claims.collection_id.clone(),
            collection_name: String::new(),
            email: String::new(),
            username: String::new(),
            extra: Map::new(),
        }
    }

    pub fn username(&self) -> Option<&str> {
        Some(self.username.as_str()).filter(|u| !u.is_empty())
    }
}
