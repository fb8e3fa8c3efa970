//! Cookie-backed sessions.
//!
//! The `pb_auth` cookie carries the backend auth token together with the
//! user record, as JSON (optionally sealed). Nothing is stored server-side:
//! a request is authenticated by building a backend client with the token
//! from its cookie, and the backend checks the token on every call.

pub mod cookie;
pub mod seal;

pub use self::cookie::{CookieOptions, SameSite, get_cookie};
pub use self::seal::{CookieSealer, SealError};

use std::time::Duration;

use chrono::Utc;
use hyper::header::{HeaderMap, HeaderValue};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use thiserror::Error;
use tracing::{debug, info};

use shared::types::server_config::SessionConfig;
use shared::types::{AuthPayload, TokenClaims, UserRecord};

use crate::backend::{BackendClient, BackendError, USERS};

use self::cookie::InvalidCookie;

pub const AUTH_COOKIE: &str = "pb_auth";

/// An authenticated user and the token the backend issued for them.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserRecord,
}

impl From<AuthPayload> for Session {
    fn from(payload: AuthPayload) -> Self {
        Self {
            token: payload.token,
            user: payload.model,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Backend(BackendError),

    #[error("failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Seal(#[from] SealError),

    #[error(transparent)]
    Cookie(#[from] InvalidCookie),
}

impl From<BackendError> for AuthError {
    fn from(e: BackendError) -> Self {
        match e.status() {
            Some(400 | 401 | 403 | 404) => Self::InvalidCredentials,
            _ => Self::Backend(e),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionManager {
    sealer: Option<CookieSealer>,
    options: CookieOptions,
}

impl SessionManager {
    pub fn new(max_age: Duration, secure: bool, sealer: Option<CookieSealer>) -> Self {
        Self {
            sealer,
            options: CookieOptions {
                max_age: Some(max_age),
                path: "/",
                http_only: true,
                secure,
                same_site: SameSite::Lax,
            },
        }
    }

    pub fn from_config(config: &SessionConfig, secure: bool) -> Result<Self, SealError> {
        let sealer = config
            .resolved_cookie_key()
            .map(|key| CookieSealer::from_base64_key(&key))
            .transpose()?;

        if sealer.is_some() {
            info!("Session cookies will be sealed");
        }

        Ok(Self::new(
            Duration::from_secs(config.max_age_secs()),
            secure,
            sealer,
        ))
    }

    /// Sign in with email and password and build the cookie for the session.
    pub async fn establish(
        &self,
        client: &BackendClient,
        email: &str,
        password: &str,
    ) -> Result<(Session, HeaderValue), AuthError> {
        let auth = client
            .collection(USERS)
            .auth_with_password(email, password)
            .await?;

        let payload = AuthPayload::from(auth);
        let cookie = self.issue_cookie(&payload)?;
        info!("Session established for user {}", payload.model.id);

        Ok((Session::from(payload), cookie))
    }

    pub fn issue_cookie(&self, payload: &AuthPayload) -> Result<HeaderValue, AuthError> {
        let json = serde_json::to_string(payload)?;
        let value = match &self.sealer {
            Some(sealer) => sealer.seal(json.as_bytes())?,
            None => json,
        };
        Ok(cookie::set_cookie(
            AUTH_COOKIE,
            &urlencoding::encode(&value),
            &self.options,
        )?)
    }

    /// Recover the session from request headers. Anything unreadable yields
    /// an anonymous client.
    pub fn restore(
        &self,
        headers: &HeaderMap,
        anonymous: &BackendClient,
    ) -> (BackendClient, Option<Session>) {
        match get_cookie(headers, AUTH_COOKIE).and_then(|raw| self.decode(&raw)) {
            Some(session) => {
                let client = anonymous.clone().with_token(session.token.clone());
                (client, Some(session))
            }
            None => (anonymous.clone(), None),
        }
    }

    /// Decode a raw cookie value: sealed, plain JSON, or a bare token.
    pub fn decode(&self, raw: &str) -> Option<Session> {
        let value = match urlencoding::decode(raw) {
            Ok(v) => v.into_owned(),
            Err(e) => {
                debug!("Session cookie is not valid UTF-8: {}", e);
                return None;
            }
        };

        if value.is_empty() {
            return None;
        }

        let session = if seal::is_sealed(&value) {
            self.decode_sealed(&value)
        } else if value.starts_with('{') {
            decode_json(value.as_bytes())
        } else {
            decode_legacy_token(&value)
        };

        session.filter(|s| !s.token.is_empty())
    }

    fn decode_sealed(&self, value: &str) -> Option<Session> {
        let Some(sealer) = &self.sealer else {
            debug!("Sealed session cookie received but no cookie key is configured");
            return None;
        };
        match sealer.open(value) {
            Ok(plain) => decode_json(&plain),
            Err(e) => {
                debug!("Rejected sealed session cookie: {}", e);
                None
            }
        }
    }

    /// `Set-Cookie` that removes the session cookie.
    pub fn terminate(&self) -> Result<HeaderValue, AuthError> {
        Ok(cookie::delete_cookie(AUTH_COOKIE, &self.options)?)
    }
}

fn decode_json(bytes: &[u8]) -> Option<Session> {
    match serde_json::from_slice::<AuthPayload>(bytes) {
        Ok(payload) => Some(Session::from(payload)),
        Err(e) => {
            debug!("Session cookie is not a valid auth payload: {}", e);
            None
        }
    }
}

/// Older cookies held only the token. The signature is left to the backend;
/// the claims are read for the user id and must not be expired.
fn decode_legacy_token(token: &str) -> Option<Session> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let claims = match jsonwebtoken::decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(&[]),
        &validation,
    ) {
        Ok(data) => data.claims,
        Err(e) => {
            debug!("Session cookie is not a readable token: {}", e);
            return None;
        }
    };

    if claims.id.is_empty() {
        debug!("Legacy token carries no user id");
        return None;
    }
    if claims.is_expired_at(Utc::now().timestamp()) {
        debug!("Legacy session token for {} has expired", claims.id);
        return None;
    }

    Some(Session {
        token: token.to_string(),
        user: UserRecord::from_claims(&claims),
    })
}
