use std::fmt;
use std::time::Duration;

use hyper::header::{COOKIE, HeaderMap, HeaderValue};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "Strict"),
            Self::Lax => write!(f, "Lax"),
            Self::None => write!(f, "None"),
        }
    }
}

/// Attributes appended after `name=value`.
#[derive(Debug, Clone)]
pub struct CookieOptions {
    pub max_age: Option<Duration>,
    pub path: &'static str,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            max_age: None,
            path: "/",
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid cookie value for {name}")]
pub struct InvalidCookie {
    pub name: String,
}

/// Build a `Set-Cookie` header. `value` must already be cookie-safe.
pub fn set_cookie(
    name: &str,
    value: &str,
    options: &CookieOptions,
) -> Result<HeaderValue, InvalidCookie> {
    let mut cookie = format!("{}={}", name, value);

    if let Some(age) = options.max_age {
        cookie.push_str(&format!("; Max-Age={}", age.as_secs()));
    }

    cookie.push_str(&format!("; Path={}", options.path));

    if options.http_only {
        cookie.push_str("; HttpOnly");
    }

    if options.secure {
        cookie.push_str("; Secure");
    }

    cookie.push_str(&format!("; SameSite={}", options.same_site));

    debug!("Setting cookie: {}", name);

    HeaderValue::from_str(&cookie).map_err(|_| InvalidCookie {
        name: name.to_string(),
    })
}

/// Expire a cookie immediately, keeping the attributes it was set with.
pub fn delete_cookie(name: &str, options: &CookieOptions) -> Result<HeaderValue, InvalidCookie> {
    debug!("Deleting cookie: {}", name);
    let expired = CookieOptions {
        max_age: Some(Duration::ZERO),
        ..options.clone()
    };
    set_cookie(name, "", &expired)
}

/// Find a cookie by name across every `Cookie` header.
pub fn get_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (name, value) = cookie.trim().split_once('=')?;
            (name.trim() == cookie_name).then(|| value.trim().to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_order_is_stable() {
        let opts = CookieOptions {
            max_age: Some(Duration::from_secs(604_800)),
            ..CookieOptions::default()
        };
        let header = set_cookie("pb_auth", "abc", &opts).unwrap();
        assert_eq!(
            header.to_str().unwrap(),
            "pb_auth=abc; Max-Age=604800; Path=/; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn secure_flag_is_added() {
        let opts = CookieOptions {
            secure: true,
            ..CookieOptions::default()
        };
        let header = set_cookie("a", "b", &opts).unwrap();
        assert_eq!(header.to_str().unwrap(), "a=b; Path=/; HttpOnly; Secure; SameSite=Lax");
    }

    #[test]
    fn delete_sets_zero_max_age() {
        let header = delete_cookie("pb_auth", &CookieOptions::default()).unwrap();
        assert_eq!(
            header.to_str().unwrap(),
            "pb_auth=; Max-Age=0; Path=/; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn control_characters_are_rejected() {
        assert!(set_cookie("a", "b\nc", &CookieOptions::default()).is_err());
    }

    #[test]
    fn finds_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(COOKIE, HeaderValue::from_static("x=1; pb_auth=v%3D1; y=2"));
        assert_eq!(get_cookie(&headers, "pb_auth").as_deref(), Some("v%3D1"));
        assert_eq!(get_cookie(&headers, "missing"), None);
    }

    #[test]
    fn value_may_contain_equals() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("pb_auth=a=b"));
        assert_eq!(get_cookie(&headers, "pb_auth").as_deref(), Some("a=b"));
    }
}
