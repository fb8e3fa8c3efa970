use std::fmt;

use serde::Deserialize;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

// ---------------------------------------------------------------------------
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_connections: usize,
    pub request_timeout_secs: u64,
    /// Marks the deployment as production, which turns on `Secure` cookies.
    /// `APP_ENV=production` (or `NODE_ENV=production`) overrides a `false` here.
    pub production: bool,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the PocketBase instance. `POCKETBASE_URL` takes priority.
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    pub max_age_days: u64,
    /// Base64 encoded 32-byte key. When set, cookie payloads are sealed.
    ///
    /// Prefer `SESSION_COOKIE_KEY`; this field is the fallback for
    /// deployments that cannot inject env vars.
    pub cookie_key: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MetadataConfig {
    pub oembed_endpoint: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct FeedConfig {
    pub page_size: u32,
    pub cache_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub session: SessionConfig,
    pub metadata: MetadataConfig,
    pub feed: FeedConfig,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

impl ServerConfig {
    /// Full bind address, e.g. `"127.0.0.1:3000"`
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Whether cookies must carry the `Secure` attribute.
    pub fn is_production(&self) -> bool {
        let from_env = ["APP_ENV", "NODE_ENV"].iter().any(|key| {
            std::env::var(key)
                .map(|v| v.eq_ignore_ascii_case("production"))
                .unwrap_or(false)
        });
        from_env || self.production
    }
}

impl BackendConfig {
    /// Resolve the backend URL: `POCKETBASE_URL`, then the legacy
    /// `NEXT_PUBLIC_POCKETBASE_URL`, then the config field.
    pub fn resolved_url(&self) -> String {
        ["POCKETBASE_URL", "NEXT_PUBLIC_POCKETBASE_URL"]
            .iter()
            .find_map(|key| std::env::var(key).ok().filter(|s| !s.is_empty()))
            .unwrap_or_else(|| self.url.clone())
            .trim_end_matches('/')
            .to_string()
    }
}

// Keeps the cookie key out of config dumps in the logs.
impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("max_age_days", &self.max_age_days)
            .field("cookie_key", &self.cookie_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SessionConfig {
    /// Cookie `Max-Age` in seconds.
    pub fn max_age_secs(&self) -> u64 {
        self.max_age_days * 24 * 60 * 60
    }

    /// `SESSION_COOKIE_KEY` env var takes priority over the config field.
    pub fn resolved_cookie_key(&self) -> Option<String> {
        std::env::var("SESSION_COOKIE_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.cookie_key.clone())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Serde defaults
// ---------------------------------------------------------------------------

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8090";
pub const DEFAULT_OEMBED_ENDPOINT: &str = "https://www.youtube.com/oembed";

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            max_connections: 1000,
            request_timeout_secs: 30,
            production: false,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_BACKEND_URL.to_string(),
            timeout_secs: 15,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_age_days: 7,
            cookie_key: None,
        }
    }
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            oembed_endpoint: DEFAULT_OEMBED_ENDPOINT.to_string(),
            user_agent: "bot".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            cache_ttl_secs: 60,
        }
    }
}
