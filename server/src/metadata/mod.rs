//! Best-effort title and thumbnail lookup for a shared link.
//!
//! YouTube links go through the oEmbed endpoint; everything else is fetched
//! and scanned for `<title>` and `og:image`. [`MetadataExtractor::extract`]
//! never fails: anything that goes wrong leaves the affected field empty.

pub mod scanner;
pub mod youtube;

pub use self::scanner::{MarkupScanner, PatternScanner};
pub use self::youtube::VideoIdMatcher;

use std::time::Duration;

use reqwest::header::USER_AGENT;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use shared::types::post::is_youtube_url;
use shared::types::server_config::MetadataConfig;

use self::youtube::OEmbedResponse;

const APPLE_MUSIC_TITLE_SUFFIX: &str = " - Apple Music";
const ARTWORK_SIZE_PLACEHOLDER: &str = "{w}x{h}";
const ARTWORK_SIZE: &str = "600x600";
/// Only this much of a fetched page or oEmbed document is read.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metadata {
    pub title: String,
    pub thumbnail: String,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("invalid oEmbed document: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

pub struct MetadataExtractor {
    http: reqwest::Client,
    oembed_endpoint: String,
    user_agent: String,
    scanner: Box<dyn MarkupScanner>,
    video_ids: VideoIdMatcher,
}

impl MetadataExtractor {
    /// Build an extractor with its own HTTP client and the pattern scanner.
    pub fn new(config: &MetadataConfig) -> Result<Self, MetadataError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            oembed_endpoint: config.oembed_endpoint.clone(),
            user_agent: config.user_agent.clone(),
            scanner: Box::new(PatternScanner::new()?),
            video_ids: VideoIdMatcher::new()?,
        })
    }

    pub fn with_scanner(mut self, scanner: Box<dyn MarkupScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub async fn extract(&self, url: &str) -> Metadata {
        let result = if is_youtube_url(url) {
            self.from_oembed(url).await
        } else {
            self.from_page(url).await
        };

        match result {
            Ok(metadata) => {
                info!(
                    "Metadata for {}: title={:?} thumbnail={}",
                    url,
                    metadata.title,
                    !metadata.thumbnail.is_empty()
                );
                metadata
            }
            Err(e) => {
                warn!("Metadata fetch failed for {}: {}", url, e);
                Metadata::default()
            }
        }
    }

    async fn from_oembed(&self, url: &str) -> Result<Metadata, MetadataError> {
        let response = self
            .http
            .get(&self.oembed_endpoint)
            .query(&[("url", url), ("format", "json")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MetadataError::Status(response.status().as_u16()));
        }

        let body = read_capped(response).await?;
        let oembed: OEmbedResponse = serde_json::from_slice(&body)?;

        let thumbnail = match self.video_ids.video_id(url) {
            Some(id) => youtube::thumbnail_url(id),
            None => {
                debug!("No 11-character video id in {}", url);
                String::new()
            }
        };

        Ok(Metadata {
            title: oembed.title,
            thumbnail,
        })
    }

    async fn from_page(&self, url: &str) -> Result<Metadata, MetadataError> {
        let response = self
            .http
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(MetadataError::Status(response.status().as_u16()));
        }

        let body = read_capped(response).await?;
        let html = String::from_utf8_lossy(&body);

        let title = self
            .scanner
            .title(&html)
            .map(|raw| clean_title(&raw))
            .unwrap_or_default();
        let thumbnail = self
            .scanner
            .og_image(&html)
            .map(|raw| upscale_artwork(&raw))
            .unwrap_or_default();

        Ok(Metadata { title, thumbnail })
    }
}

/// Body bytes up to [`MAX_BODY_BYTES`]; the rest of the stream is dropped.
async fn read_capped(mut response: reqwest::Response) -> Result<Vec<u8>, MetadataError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = MAX_BODY_BYTES - body.len();
        if chunk.len() >= room {
            body.extend_from_slice(&chunk[..room]);
            debug!("Body truncated at {} bytes", MAX_BODY_BYTES);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Drop the storefront suffix Apple Music appends to page titles.
pub fn clean_title(raw: &str) -> String {
    raw.replacen(APPLE_MUSIC_TITLE_SUFFIX, "", 1)
        .trim()
        .to_string()
}

/// Apple Music artwork URLs carry a `{w}x{h}` size template.
pub fn upscale_artwork(raw: &str) -> String {
    raw.replacen(ARTWORK_SIZE_PLACEHOLDER, ARTWORK_SIZE, 1)
}
