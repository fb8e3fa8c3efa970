use std::convert::Infallible;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use tracing::{error, info, warn};

use shared::types::{ActionResponse, LoginData, LoginError};

use crate::AppState;
use crate::handlers::http::utils::{decode_fields, deliver_action, read_fields};
use crate::session::AuthError;

/// Main login handler
pub async fn handle_login(
    req: Request<Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing login request");

    let (parts, body) = req.into_parts();
    let fields = match read_fields(&parts.headers, body).await {
        Ok(fields) => fields,
        Err(e) => {
            warn!("Login body rejected: {}", e);
            let action = ActionResponse::error(e.to_code(), &e.to_string());
            return deliver_action(&action, e.status(), None);
        }
    };

    let data: LoginData = decode_fields(&fields).unwrap_or_default();

    if let Err(login_error) = validate_login(&data) {
        warn!("Login validation failed: {}", login_error.to_code());
        return deliver_action(&login_error.to_response(), StatusCode::BAD_REQUEST, None);
    }

    let client = state.anonymous_client().await;
    match state
        .sessions
        .establish(&client, data.email.trim(), &data.password)
        .await
    {
        Ok((session, cookie)) => {
            info!("User {} signed in", session.user.id);
            let action = ActionResponse::success("Signed in")
                .with_redirect("/")
                .with_data(json!({ "user": session.user }));
            deliver_action(&action, StatusCode::OK, Some(cookie))
        }
        Err(e) => {
            let (login_error, status) = classify(&e);
            warn!("Login failed: {}", login_error.to_code());
            deliver_action(&login_error.to_response(), status, None)
        }
    }
}

fn validate_login(data: &LoginData) -> Result<(), LoginError> {
    if data.email.trim().is_empty() {
        return Err(LoginError::MissingField("email".to_string()));
    }

    if data.password.is_empty() {
        return Err(LoginError::MissingField("password".to_string()));
    }

    Ok(())
}

fn classify(e: &AuthError) -> (LoginError, StatusCode) {
    match e {
        AuthError::InvalidCredentials => (LoginError::InvalidCredentials, StatusCode::UNAUTHORIZED),
        AuthError::Backend(inner) if inner.is_unavailable() => {
            (LoginError::BackendUnavailable, StatusCode::BAD_GATEWAY)
        }
        other => {
            error!("Sign-in error: {}", other);
            (LoginError::InternalError, StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
