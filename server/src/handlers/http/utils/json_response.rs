use std::convert::Infallible;

use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error};

use shared::types::ActionResponse;

use crate::handlers::http::utils::http::full;

/// Serialize any `Serialize` type and deliver it as a JSON response.
pub fn deliver_serialized_json<T: Serialize>(
    data: &T,
    status: StatusCode,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let json = serde_json::to_vec(data).context("Failed to serialize response")?;
    deliver_json(json, status)
}

/// Deliver pre-serialized JSON bytes.
pub fn deliver_json<T: Into<Bytes>>(
    json: T,
    status: StatusCode,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let bytes: Bytes = json.into();

    debug!("Delivering JSON response, size: {} bytes", bytes.len());

    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(full(bytes))
        .map_err(|e| anyhow!("Failed to build JSON response: {}", e))
}

/// `{"status":"error","code":...,"message":...}` with the given status.
pub fn deliver_error_json(
    error_code: &str,
    message: &str,
    status: StatusCode,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    if status.is_server_error() {
        error!("{} {}: {}", status.as_u16(), error_code, message);
    } else {
        debug!("{} {}: {}", status.as_u16(), error_code, message);
    }

    let body = json!({
        "status": "error",
        "code": error_code,
        "message": message,
    });
    deliver_serialized_json(&body, status)
}

/// Deliver an action result, attaching `Set-Cookie` when given.
pub fn deliver_action(
    action: &ActionResponse,
    status: StatusCode,
    cookie: Option<HeaderValue>,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let mut response = deliver_serialized_json(action, status)?;
    if let Some(cookie) = cookie {
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}
