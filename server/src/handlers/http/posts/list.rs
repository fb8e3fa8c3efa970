use std::convert::Infallible;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use tracing::{debug, warn};

use shared::types::Platform;

use crate::AppState;
use crate::handlers::http::routes::RequestContext;
use crate::handlers::http::utils::{
    add_no_store, deliver_error_json, deliver_serialized_json, path_id, query_params,
};
use crate::posts::{ListQuery, PostRepository};

use super::status_for;

/// `GET /api/posts?q=&platform=&page=&per_page=`
pub async fn handle_list_posts(
    req: Request<Incoming>,
    state: AppState,
    ctx: RequestContext,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let params = query_params(req.uri().query());
    let default_size = state.config.read().await.feed.page_size;

    let page = params.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let per_page = params
        .get("per_page")
        .or_else(|| params.get("perPage"))
        .and_then(|p| p.parse().ok())
        .unwrap_or(default_size);
    let platform = params.get("platform").and_then(|p| Platform::parse(p));

    let query = ListQuery::newest(per_page)
        .page(page)
        .search(params.get("q").map(String::as_str), platform);
    debug!("Listing posts: {:?}", query);

    let repo = PostRepository::new(&ctx.client, &state.feed_cache);
    match repo.list(&query).await {
        Ok(list) => deliver_serialized_json(&list, StatusCode::OK).map(add_no_store),
        Err(e) => {
            warn!("Post list failed: {}", e);
            deliver_error_json("LIST_FAILED", "Failed to load posts", status_for(&e))
        }
    }
}

pub async fn handle_get_post(
    req: Request<Incoming>,
    state: AppState,
    ctx: RequestContext,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let Some(id) = path_id(req.uri().path()) else {
        return deliver_error_json("NOT_FOUND", "Post not found", StatusCode::NOT_FOUND);
    };

    let repo = PostRepository::new(&ctx.client, &state.feed_cache);
    match repo.get(&id).await {
        Ok(post) => deliver_serialized_json(&post, StatusCode::OK).map(add_no_store),
        Err(e) if e.is_not_found() => {
            deliver_error_json("NOT_FOUND", "Post not found", StatusCode::NOT_FOUND)
        }
        Err(e) => {
            warn!("Fetching post {} failed: {}", id, e);
            deliver_error_json("GET_FAILED", "Failed to load post", status_for(&e))
        }
    }
}
