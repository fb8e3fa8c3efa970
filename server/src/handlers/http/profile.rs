use std::convert::Infallible;

use anyhow::Result;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use tracing::{info, warn};

use shared::types::{ListResult, UserRecord};

use crate::AppState;
use crate::backend::{BackendClient, USERS};
use crate::handlers::http::utils::{add_no_store, deliver_serialized_json};
use crate::posts::{DEFAULT_PAGE_SIZE, ListQuery, PostRepository};
use crate::session::Session;

/// Signed-in user plus their newest posts and total post count.
pub async fn handle_get_profile(
    _req: Request<Incoming>,
    state: AppState,
    client: BackendClient,
    session: Session,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let user = resolve_user(&client, session.user).await;
    info!("Profile requested by {}", user.id);

    let posts = match user.username() {
        Some(username) => {
            let repo = PostRepository::new(&client, &state.feed_cache);
            let query = ListQuery::newest(DEFAULT_PAGE_SIZE).by_user(username);
            repo.list(&query).await.unwrap_or_else(|e| {
                warn!("Fetching posts for {} failed: {}", user.id, e);
                ListResult::empty(1, DEFAULT_PAGE_SIZE)
            })
        }
        None => ListResult::empty(1, DEFAULT_PAGE_SIZE),
    };

    let total = if posts.total_items > 0 {
        posts.total_items
    } else {
        posts.items.len() as i64
    };

    let body = json!({
        "status": "success",
        "user": user,
        "posts": posts.items,
        "totalItems": total,
    });
    deliver_serialized_json(&body, StatusCode::OK).map(add_no_store)
}

/// Cookies carrying only a token have no username; fetch the record.
async fn resolve_user(client: &BackendClient, user: UserRecord) -> UserRecord {
    if user.username().is_some() {
        return user;
    }
    match client.collection(USERS).get_one::<UserRecord>(&user.id).await {
        Ok(full) => full,
        Err(e) => {
            warn!("Could not load user record {}: {}", user.id, e);
            user
        }
    }
}
