//! Request body decoding shared by every form action.
//!
//! Bodies arrive either url-encoded (plain HTML forms) or as a flat JSON
//! object. Both are read into the same string map.

use std::collections::HashMap;

use http_body_util::{BodyExt, Limited};
use hyper::body::Body;
use hyper::StatusCode;
use hyper::header::{CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub const MAX_FORM_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum FormError {
    #[error("request body exceeds 64 KiB")]
    TooLarge,

    #[error("failed to read request body")]
    Read,

    #[error("request body is not a JSON object")]
    NotAnObject,
}

impl FormError {
    pub fn to_code(&self) -> &'static str {
        match self {
            Self::TooLarge => "PAYLOAD_TOO_LARGE",
            Self::Read => "BAD_REQUEST",
            Self::NotAnObject => "INVALID_BODY",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// Read a request body into field name → value.
pub async fn read_fields<B>(
    headers: &HeaderMap,
    body: B,
) -> Result<HashMap<String, String>, FormError>
where
    B: Body,
    B::Error: std::error::Error + Send + Sync + 'static,
{
    let bytes = Limited::new(body, MAX_FORM_BYTES)
        .collect()
        .await
        .map_err(|e| {
            if e.is::<http_body_util::LengthLimitError>() {
                FormError::TooLarge
            } else {
                debug!("Body read failed: {}", e);
                FormError::Read
            }
        })?
        .to_bytes();

    if is_json(headers) {
        parse_json_fields(&bytes)
    } else {
        Ok(form_urlencoded::parse(&bytes).into_owned().collect())
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim_start().starts_with("application/json"))
        .unwrap_or(false)
}

fn parse_json_fields(bytes: &[u8]) -> Result<HashMap<String, String>, FormError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(HashMap::new());
    }

    let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(bytes) else {
        return Err(FormError::NotAnObject);
    };

    Ok(map
        .into_iter()
        .filter_map(|(key, value)| {
            let text = match value {
                Value::String(s) => s,
                Value::Null => return None,
                other => other.to_string(),
            };
            Some((key, text))
        })
        .collect())
}

/// Deserialize a field map into a typed form.
pub fn decode_fields<T: DeserializeOwned>(
    fields: &HashMap<String, String>,
) -> Result<T, serde_json::Error> {
    serde_json::to_value(fields).and_then(serde_json::from_value)
}
