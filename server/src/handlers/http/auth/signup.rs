use std::convert::Infallible;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use tracing::{info, warn};

use shared::types::{ActionResponse, SignupData, SignupError};

use crate::AppState;
use crate::accounts;
use crate::handlers::http::utils::{decode_fields, deliver_action, read_fields};

pub async fn handle_signup(
    req: Request<Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing signup request");

    let (parts, body) = req.into_parts();
    let fields = match read_fields(&parts.headers, body).await {
        Ok(fields) => fields,
        Err(e) => {
            warn!("Signup body rejected: {}", e);
            let action = ActionResponse::error(e.to_code(), &e.to_string());
            return deliver_action(&action, e.status(), None);
        }
    };

    let data: SignupData = decode_fields(&fields).unwrap_or_default();
    let client = state.anonymous_client().await;

    match accounts::signup(&client, &state.sessions, &data).await {
        Ok((session, cookie)) => {
            info!("User {} signed up", session.user.id);
            let action = ActionResponse::success("Account created")
                .with_redirect("/")
                .with_data(json!({ "user": session.user }));
            deliver_action(&action, StatusCode::OK, Some(cookie))
        }
        Err(e) => {
            warn!("Signup failed: {}", e.to_code());
            deliver_action(&e.to_response(), status_for(&e), None)
        }
    }
}

fn status_for(e: &SignupError) -> StatusCode {
    match e {
        SignupError::PasswordMismatch
        | SignupError::MissingField(_)
        | SignupError::Rejected(_) => StatusCode::BAD_REQUEST,
        SignupError::BackendUnavailable => StatusCode::BAD_GATEWAY,
        SignupError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
