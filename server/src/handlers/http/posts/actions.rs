use std::convert::Infallible;
use std::future::Future;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde_json::json;
use tracing::{info, warn};

use shared::types::ActionResponse;

use crate::AppState;
use crate::handlers::http::routes::RequestContext;
use crate::handlers::http::utils::{deliver_action, path_id, read_fields};
use crate::posts::{PostRepository, PostSubmission, build_draft};

use super::status_for;

/// Add a post from the submitted form.
pub async fn handle_add_post(
    req: Request<Incoming>,
    state: AppState,
    ctx: RequestContext,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    info!("Processing add post request");

    let submission = match read_submission(req).await? {
        Ok(submission) => submission,
        Err(response) => return Ok(response),
    };

    let created = run_detached(async move {
        let draft = build_draft(&submission, ctx.session.as_ref(), &state.extractor).await;
        PostRepository::new(&ctx.client, &state.feed_cache)
            .create(&draft)
            .await
    })
    .await?;

    match created {
        Ok(post) => {
            let action = ActionResponse::success("Post added")
                .with_redirect("/")
                .with_data(json!({ "post": post }));
            deliver_action(&action, StatusCode::CREATED, None)
        }
        Err(e) => deliver_action(
            &ActionResponse::error("ADD_FAILED", "Failed to add post"),
            status_for(&e),
            None,
        ),
    }
}

/// Replace url, comment and metadata of an existing post.
pub async fn handle_update_post(
    req: Request<Incoming>,
    state: AppState,
    ctx: RequestContext,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let id_from_path = path_id(req.uri().path());

    let submission = match read_submission(req).await? {
        Ok(submission) => submission,
        Err(response) => return Ok(response),
    };

    let Some(id) = id_from_path.or_else(|| submission.id.clone()) else {
        return deliver_action(
            &ActionResponse::error("MISSING_FIELD", "Missing required field: id"),
            StatusCode::BAD_REQUEST,
            None,
        );
    };
    info!("Processing update request for post {}", id);

    let updated = run_detached(async move {
        let draft = build_draft(&submission, ctx.session.as_ref(), &state.extractor).await;
        PostRepository::new(&ctx.client, &state.feed_cache)
            .update(&id, &draft)
            .await
    })
    .await?;

    match updated {
        Ok(post) => {
            let action = ActionResponse::success("Post updated")
                .with_redirect("/")
                .with_data(json!({ "post": post }));
            deliver_action(&action, StatusCode::OK, None)
        }
        Err(e) => deliver_action(
            &ActionResponse::error("UPDATE_FAILED", "Failed to update post"),
            status_for(&e),
            None,
        ),
    }
}

pub async fn handle_delete_post(
    req: Request<Incoming>,
    state: AppState,
    ctx: RequestContext,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let Some(id) = path_id(req.uri().path()) else {
        return deliver_action(
            &ActionResponse::error("MISSING_FIELD", "Missing required field: id"),
            StatusCode::BAD_REQUEST,
            None,
        );
    };
    info!("Processing delete request for post {}", id);

    let deleted = run_detached(async move {
        PostRepository::new(&ctx.client, &state.feed_cache)
            .delete(&id)
            .await
    })
    .await?;

    match deleted {
        Ok(()) => deliver_action(
            &ActionResponse::success("Post deleted").with_redirect("/"),
            StatusCode::OK,
            None,
        ),
        Err(e) => deliver_action(
            &ActionResponse::error("DELETE_FAILED", "Failed to delete post"),
            status_for(&e),
            None,
        ),
    }
}

/// Run a backend write and its feed invalidation on a separate task, so a
/// request that times out or disconnects cannot stop it halfway.
async fn run_detached<F>(write: F) -> Result<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::spawn(write).await.context("Post write task failed")
}

/// Read and validate the form. The inner `Err` is a ready 4xx response.
async fn read_submission(
    req: Request<Incoming>,
) -> Result<std::result::Result<PostSubmission, Response<BoxBody<Bytes, Infallible>>>> {
    let (parts, body) = req.into_parts();

    let fields = match read_fields(&parts.headers, body).await {
        Ok(fields) => fields,
        Err(e) => {
            warn!("Post body rejected: {}", e);
            let action = ActionResponse::error(e.to_code(), &e.to_string());
            return deliver_action(&action, e.status(), None).map(Err);
        }
    };

    match PostSubmission::from_fields(&fields) {
        Ok(submission) => Ok(Ok(submission)),
        Err(e) => {
            warn!("Post submission invalid: {}", e.to_code());
            let action = ActionResponse::error(e.to_code(), &e.to_message());
            deliver_action(&action, StatusCode::BAD_REQUEST, None).map(Err)
        }
    }
}
