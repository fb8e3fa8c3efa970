use std::convert::Infallible;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming as IncomingBody;
use hyper::{Request, Response, StatusCode};
use tracing::info;

use shared::types::ActionResponse;

use crate::AppState;
use crate::handlers::http::utils::deliver_action;

/// Handle logout. Always succeeds, signed in or not.
pub async fn handle_logout(
    _req: Request<IncomingBody>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("User logged out");

    let clear_cookie = state
        .sessions
        .terminate()
        .context("Failed to build logout cookie")?;

    let action = ActionResponse::success("Logged out successfully").with_redirect("/login");
    deliver_action(&action, StatusCode::OK, Some(clear_cookie))
}
