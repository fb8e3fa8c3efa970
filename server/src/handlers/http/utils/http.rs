use std::collections::HashMap;
use std::convert::Infallible;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty, Full, combinators::BoxBody};
use hyper::Response;
use hyper::header::{CACHE_CONTROL, HeaderValue};

/// Helper function to create an empty body
pub fn empty() -> BoxBody<Bytes, Infallible> {
    Empty::<Bytes>::new().boxed()
}

/// Helper function to create a full body from various types
pub fn full<T: Into<Bytes>>(chunk: T) -> BoxBody<Bytes, Infallible> {
    Full::new(chunk.into()).boxed()
}

/// `n`th `/`-separated segment of a path, e.g. `/api/posts/abc` → 3 → `abc`.
pub fn path_segment(path: &str, n: usize) -> Option<&str> {
    path.split('/').nth(n).filter(|s| !s.is_empty())
}

/// Percent-decoded record id from `/api/posts/{id}`.
pub fn path_id(path: &str) -> Option<String> {
    path_segment(path, 3)
        .and_then(|seg| urlencoding::decode(seg).ok())
        .map(|id| id.into_owned())
        .filter(|id| !id.is_empty())
}

/// Decoded query string parameters. Later duplicates win.
pub fn query_params(query: Option<&str>) -> HashMap<String, String> {
    query
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Responses that depend on the caller's cookie must not be stored by
/// shared caches.
pub fn add_no_store<T>(mut res: Response<T>) -> Response<T> {
    res.headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("private, no-store"));
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_segment() {
        assert_eq!(path_segment("/api/posts/abc", 3), Some("abc"));
        assert_eq!(path_segment("/api/posts/", 3), None);
        assert_eq!(path_segment("/api/posts", 3), None);
    }

    #[test]
    fn id_is_percent_decoded() {
        assert_eq!(path_id("/api/posts/a%20b"), Some("a b".to_string()));
        assert_eq!(path_id("/api/posts/abc123"), Some("abc123".to_string()));
        assert_eq!(path_id("/api/posts/"), None);
        assert_eq!(path_id("/api/posts/%FF"), None);
    }

    #[test]
    fn parses_query() {
        let q = query_params(Some("q=blue%20moon&platform=youtube&page=2"));
        assert_eq!(q.get("q").map(String::as_str), Some("blue moon"));
        assert_eq!(q.get("page").map(String::as_str), Some("2"));
        assert!(query_params(None).is_empty());
    }
}
