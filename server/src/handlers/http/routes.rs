use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use tracing::{debug, error, warn};

use crate::AppState;
use crate::backend::BackendClient;
use crate::handlers::http::utils::{self, json_response};
use crate::handlers::http::{auth, feed, posts, profile};
use crate::session::Session;

// ---------------------------------------------------------------------------
// Handler type aliases
// ---------------------------------------------------------------------------
//
// Three tiers:
//
//   OpenHandler     no cookie read.  Receives (req, state).
//                   Use for: /health, the feed, login / signup / logout.
//
//   SessionHandler  cookie restored, may be anonymous.
//                   Receives (req, state, ctx).
//
//   AuthedHandler   cookie restored and a user is required; 401 otherwise.
//                   Receives (req, state, client, session).

type HandlerFuture =
    Pin<Box<dyn Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send>>;

type OpenHandler = Box<dyn Fn(Request<Incoming>, AppState) -> HandlerFuture + Send + Sync>;

type SessionHandler =
    Box<dyn Fn(Request<Incoming>, AppState, RequestContext) -> HandlerFuture + Send + Sync>;

type AuthedHandler = Box<
    dyn Fn(Request<Incoming>, AppState, BackendClient, Session) -> HandlerFuture + Send + Sync,
>;

/// Backend client for this request plus the session it was built from.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub client: BackendClient,
    pub session: Option<Session>,
}

enum RouteKind {
    Open(OpenHandler),
    Session(SessionHandler),
    Authed(AuthedHandler),
}

struct Route {
    method: Method,
    path: String,
    kind: RouteKind,
}

pub struct Router {
    routes: Vec<Route>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes_count", &self.routes.len())
            .finish()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    fn push(mut self, method: Method, path: &str, kind: RouteKind) -> Self {
        self.routes.push(Route {
            method,
            path: path.to_string(),
            kind,
        });
        self
    }

    // ── Open ─────────────────────────────────────────────────────────────────

    pub fn get<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        let kind = RouteKind::Open(Box::new(move |req, state| Box::pin(handler(req, state))));
        self.push(Method::GET, path, kind)
    }

    pub fn post<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, AppState) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        let kind = RouteKind::Open(Box::new(move |req, state| Box::pin(handler(req, state))));
        self.push(Method::POST, path, kind)
    }

    // ── Session (may be anonymous) ───────────────────────────────────────────

    /// Route whose handler receives the restored session, if any.
    pub fn session<F, Fut>(self, method: Method, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, AppState, RequestContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        let kind = RouteKind::Session(Box::new(move |req, state, ctx| {
            Box::pin(handler(req, state, ctx))
        }));
        self.push(method, path, kind)
    }

    // ── Authenticated ────────────────────────────────────────────────────────

    pub fn get_authed<F, Fut>(self, path: &str, handler: F) -> Self
    where
        F: Fn(Request<Incoming>, AppState, BackendClient, Session) -> Fut
            + Send
            + Sync
            + 'static,
        Fut: Future<Output = Result<Response<BoxBody<Bytes, Infallible>>>> + Send + 'static,
    {
        let kind = RouteKind::Authed(Box::new(move |req, state, client, session| {
            Box::pin(handler(req, state, client, session))
        }));
        self.push(Method::GET, path, kind)
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Route a request; handler errors become a 500 JSON response.
    pub async fn handle(
        &self,
        req: Request<Incoming>,
        state: AppState,
    ) -> Response<BoxBody<Bytes, Infallible>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        match self.route(req, state).await {
            Ok(response) => response,
            Err(e) => {
                error!("{} {} failed: {:#}", method, path, e);
                internal_error()
            }
        }
    }

    pub async fn route(
        &self,
        req: Request<Incoming>,
        state: AppState,
    ) -> Result<Response<BoxBody<Bytes, Infallible>>> {
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        let Some(route) = self
            .routes
            .iter()
            .find(|r| r.method == method && Self::path_matches(&r.path, &path))
        else {
            debug!("No route for {} {}", method, path);
            return json_response::deliver_error_json(
                "NOT_FOUND",
                "Endpoint not found",
                StatusCode::NOT_FOUND,
            )
            .context("Failed to deliver 404 response");
        };

        match &route.kind {
            RouteKind::Open(h) => h(req, state).await,

            RouteKind::Session(h) => {
                let anonymous = state.anonymous_client().await;
                let (client, session) = state.sessions.restore(req.headers(), &anonymous);
                h(req, state, RequestContext { client, session }).await
            }

            RouteKind::Authed(h) => {
                let anonymous = state.anonymous_client().await;
                match state.sessions.restore(req.headers(), &anonymous) {
                    (client, Some(session)) => h(req, state, client, session).await,
                    (_, None) => {
                        warn!("Unauthenticated request to {} {}", method, path);
                        unauthorized()
                    }
                }
            }
        }
    }

    // ── Path matching ────────────────────────────────────────────────────────

    pub fn path_matches(route_path: &str, request_path: &str) -> bool {
        let clean = request_path.split('?').next().unwrap_or(request_path);

        if route_path == clean {
            return true;
        }

        // `:param` segments match any single non-empty segment.
        let route_segs: Vec<&str> = route_path.split('/').collect();
        let path_segs: Vec<&str> = clean.split('/').collect();

        if route_segs.len() != path_segs.len() {
            return false;
        }

        route_segs
            .iter()
            .zip(path_segs.iter())
            .all(|(r, p)| (r.starts_with(':') && !p.is_empty()) || r == p)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn unauthorized() -> Result<Response<BoxBody<Bytes, Infallible>>> {
    json_response::deliver_error_json(
        "UNAUTHORIZED",
        "Authentication required",
        StatusCode::UNAUTHORIZED,
    )
    .context("Failed to deliver 401 response")
}

fn internal_error() -> Response<BoxBody<Bytes, Infallible>> {
    json_response::deliver_error_json(
        "INTERNAL_ERROR",
        "An internal error occurred",
        StatusCode::INTERNAL_SERVER_ERROR,
    )
    .unwrap_or_else(|_| {
        let mut response = Response::new(utils::full("Internal Server Error"));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    })
}

// ---------------------------------------------------------------------------
// Application router
// ---------------------------------------------------------------------------

pub fn build_router() -> Router {
    Router::new()
        // ── Open ────────────────────────────────────────────────────────────
        .get("/health", |_req, _state| async move {
            json_response::deliver_json(r#"{"status":"success","health":"ok"}"#, StatusCode::OK)
        })
        .get("/", |req, state| async move {
            feed::handle_feed(req, state).await.context("Feed failed")
        })
        .post("/api/login", |req, state| async move {
            auth::handle_login(req, state).await.context("Login failed")
        })
        .post("/api/signup", |req, state| async move {
            auth::handle_signup(req, state).await.context("Signup failed")
        })
        .post("/api/logout", |req, state| async move {
            auth::handle_logout(req, state).await.context("Logout failed")
        })
        // ── Session ─────────────────────────────────────────────────────────
        .session(Method::GET, "/api/session", |req, state, ctx| async move {
            auth::handle_session(req, state, ctx)
                .await
                .context("Session lookup failed")
        })
        .session(Method::GET, "/api/posts", |req, state, ctx| async move {
            posts::handle_list_posts(req, state, ctx)
                .await
                .context("Post list failed")
        })
        .session(Method::GET, "/api/posts/:id", |req, state, ctx| async move {
            posts::handle_get_post(req, state, ctx)
                .await
                .context("Post get failed")
        })
        .session(Method::POST, "/api/posts", |req, state, ctx| async move {
            posts::handle_add_post(req, state, ctx)
                .await
                .context("Add post failed")
        })
        .session(Method::POST, "/api/posts/:id", |req, state, ctx| async move {
            posts::handle_update_post(req, state, ctx)
                .await
                .context("Update post failed")
        })
        .session(Method::PUT, "/api/posts/:id", |req, state, ctx| async move {
            posts::handle_update_post(req, state, ctx)
                .await
                .context("Update post failed")
        })
        .session(Method::DELETE, "/api/posts/:id", |req, state, ctx| async move {
            posts::handle_delete_post(req, state, ctx)
                .await
                .context("Delete post failed")
        })
        // ── Authenticated ───────────────────────────────────────────────────
        .get_authed("/api/profile", |req, state, client, session| async move {
            profile::handle_get_profile(req, state, client, session)
                .await
                .context("Profile failed")
        })
}
