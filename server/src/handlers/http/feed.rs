//! `GET /`: the newest posts, served from the feed cache.

use std::convert::Infallible;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::header::{self, HeaderValue};
use hyper::{Request, Response, StatusCode};
use tracing::{debug, warn};

use shared::types::{ListResult, MusicPost};

use crate::AppState;
use crate::cache::CachedPage;
use crate::handlers::http::utils::{deliver_json, deliver_serialized_json, empty};
use crate::posts::{FEED_PATH, ListQuery, PostRepository};

pub async fn handle_feed(
    req: Request<Incoming>,
    state: AppState,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    if let Some(page) = state.feed_cache.get(FEED_PATH).await {
        debug!("Feed served from cache (gen {})", page.generation);
        return deliver_page(&req, &page);
    }

    // Read before fetching so a write that lands mid-render wins.
    let generation = state.feed_cache.generation(FEED_PATH).await;
    let page_size = state.config.read().await.feed.page_size;
    let client = state.anonymous_client().await;
    let repo = PostRepository::new(&client, &state.feed_cache);

    let list = match repo.list(&ListQuery::newest(page_size)).await {
        Ok(list) => list,
        Err(e) => {
            warn!("Feed fetch failed, serving empty list: {}", e);
            let mut response =
                deliver_serialized_json(&ListResult::<MusicPost>::empty(1, page_size), StatusCode::OK)?;
            response
                .headers_mut()
                .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
            return Ok(response);
        }
    };

    let body = Bytes::from(serde_json::to_vec(&list).context("Failed to serialize feed")?);

    if state
        .feed_cache
        .store(FEED_PATH, body.clone(), generation)
        .await
    {
        if let Some(page) = state.feed_cache.get(FEED_PATH).await {
            return deliver_page(&req, &page);
        }
    }

    deliver_json(body, StatusCode::OK)
}

fn deliver_page(
    req: &Request<Incoming>,
    page: &CachedPage,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let etag = HeaderValue::from_str(&page.etag).context("Invalid feed ETag")?;

    if etag_matches(req, &page.etag) {
        debug!("Feed not modified ({})", page.etag);
        return Response::builder()
            .status(StatusCode::NOT_MODIFIED)
            .header(header::ETAG, etag)
            .body(empty())
            .context("Failed to build 304 response");
    }

    let mut response = deliver_json(page.body.clone(), StatusCode::OK)?;
    let headers = response.headers_mut();
    headers.insert(header::ETAG, etag);
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    Ok(response)
}

fn etag_matches(req: &Request<Incoming>, etag: &str) -> bool {
    req.headers()
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .any(|candidate| {
            let candidate = candidate.trim();
            candidate == "*" || candidate == etag
        })
}
