//! Civic Reports API: REST endpoints over the Issue Service
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod metrics;
pub mod middleware;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, put},
    Router,
};
use civic_core::{DocumentStore, IssueService};
use config::ApiConfig;
use metrics::ApiMetrics;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: IssueService,
    pub metrics: Arc<ApiMetrics>,
}

impl AppState {
    pub fn new(service: IssueService) -> Result<Self, prometheus::Error> {
        Ok(Self {
            service,
            metrics: Arc::new(ApiMetrics::new()?),
        })
    }

    /// Opens the store named by `config.store_url` and wires the service to it.
    pub async fn from_config(config: &ApiConfig) -> anyhow::Result<Self> {
        let store = DocumentStore::connect(&config.store_url).await?;
        Self::new(IssueService::new(Arc::new(store)))
            .map_err(|err| anyhow::anyhow!("metrics registry: {err}"))
    }
}

pub fn create_app(state: AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(handlers::banner))
        .route(
            "/api/issues",
            get(handlers::list_issues).post(handlers::create_issue),
        )
        .route("/api/issues/{id}", put(handlers::update_issue))
        .route(
            "/api/issues/category/{category}",
            get(handlers::issues_by_category),
        )
        .route("/api/issues/status/{status}", get(handlers::issues_by_status))
        .route("/api/stats", get(handlers::stats))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(middleware::cors())
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}

pub async fn run(config: ApiConfig) -> anyhow::Result<()> {
    let addr = config.listen_addr()?;
    let state = AppState::from_config(&config).await?;
    let app = create_app(state, config.body_limit);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        environment = %config.environment,
        store = %config.store_url,
        "Civic Reports API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Civic Reports API stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
