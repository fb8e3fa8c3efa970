pub mod accounts;
pub mod backend;
pub mod cache;
pub mod handlers;
pub mod metadata;
pub mod posts;
pub mod session;
pub mod tower_middle;

use std::convert::Infallible;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hyper::Request;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower::ServiceBuilder;
use tracing::{debug, info, warn};

use shared::config::LiveConfig;
use shared::types::server_config::AppConfig;

use crate::backend::BackendClient;
use crate::cache::FeedCache;
use crate::handlers::http::Router;
use crate::metadata::MetadataExtractor;
use crate::session::SessionManager;
use crate::tower_middle::{RequestLogLayer, TimeoutLayer};

/// Everything a handler needs, cheap to clone per request.
#[derive(Clone)]
pub struct AppState {
    pub config: LiveConfig,
    /// Connection pool for backend calls; clients are built per request.
    pub backend_http: reqwest::Client,
    pub extractor: Arc<MetadataExtractor>,
    pub feed_cache: FeedCache,
    /// Built once at startup; cookie settings do not hot-reload.
    pub sessions: Arc<SessionManager>,
}

impl AppState {
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let backend_http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.backend.timeout_secs))
            .build()
            .context("Failed to build backend HTTP client")?;

        let extractor = MetadataExtractor::new(&config.metadata)
            .context("Failed to build metadata extractor")?;

        let sessions = SessionManager::from_config(&config.session, config.server.is_production())
            .context("Invalid session cookie key")?;

        let feed_cache = FeedCache::new(Duration::from_secs(config.feed.cache_ttl_secs));

        Ok(Self {
            config: LiveConfig::new(config),
            backend_http,
            extractor: Arc::new(extractor),
            feed_cache,
            sessions: Arc::new(sessions),
        })
    }

    /// Backend client with no token, pointed at the configured base URL.
    pub async fn anonymous_client(&self) -> BackendClient {
        let base_url = self.config.read().await.backend.resolved_url();
        BackendClient::new(self.backend_http.clone(), base_url)
    }
}

/// Accept connections until `shutdown` resolves.
pub async fn serve<F>(
    listener: TcpListener,
    state: AppState,
    router: Arc<Router>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    let max_connections = state.config.read().await.server.max_connections;
    let permits = Arc::new(Semaphore::new(max_connections));
    tokio::pin!(shutdown);

    loop {
        let permit = tokio::select! {
            _ = &mut shutdown => break,
            permit = permits.clone().acquire_owned() => {
                permit.context("Connection semaphore closed")?
            }
        };

        let (stream, peer) = tokio::select! {
            _ = &mut shutdown => break,
            accepted = listener.accept() => match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Accept failed: {}", e);
                    continue;
                }
            },
        };

        let state = state.clone();
        let router = router.clone();

        tokio::task::spawn(async move {
            let _permit = permit;
            let timeout = Duration::from_secs(state.config.read().await.server.request_timeout_secs);

            let service = ServiceBuilder::new()
                .layer(RequestLogLayer::new())
                .layer(TimeoutLayer::new(timeout))
                .service(tower::service_fn(move |req: Request<Incoming>| {
                    let state = state.clone();
                    let router = router.clone();
                    async move { Ok::<_, Infallible>(router.handle(req, state).await) }
                }));

            if let Err(err) = http1::Builder::new()
                .timer(TokioTimer::new())
                .serve_connection(TokioIo::new(stream), TowerToHyperService::new(service))
                .await
            {
                debug!("Connection from {} ended with error: {:?}", peer, err);
            }
        });
    }

    info!("Listener stopped accepting connections");
    Ok(())
}
