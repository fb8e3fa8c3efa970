use std::convert::Infallible;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde_json::json;

use crate::AppState;
use crate::handlers::http::routes::RequestContext;
use crate::handlers::http::utils::{add_no_store, deliver_serialized_json};

/// Current user, or `null` when anonymous.
pub async fn handle_session(
    _req: Request<Incoming>,
    _state: AppState,
    ctx: RequestContext,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let user = ctx.session.map(|s| s.user);
    let body = json!({
        "status": "success",
        "authenticated": user.is_some(),
        "user": user,
    });
    deliver_serialized_json(&body, StatusCode::OK).map(add_no_store)
}
