//! HTTP server for the checklist and session API.
//!
//! | Method | Path | Handler |
//! |---|---|---|
//! | POST | `/checklists:merge` | merge feature checklists |
//! | GET | `/checklists/features` | list catalog features |
//! | POST | `/sessions:create` | create a session |
//! | GET | `/sessions/{sessionId}` | read a session |
//! | POST | `/sessions/{sessionId}/items:update` | update one item |
//! | GET | `/health` | version and session count |

mod error;
mod handlers;

pub use error::ApiError;

use crate::catalog::CatalogReader;
use crate::config::ResolvedConfig;
use crate::store::{MemorySessionStore, SessionStore};
use crate::{Error, Result};
use axum::Router;
use axum::routing::{get, post};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Shared application state, injected into every handler.
#[derive(Clone)]
pub struct AppState {
    /// Catalog the merge endpoint reads from
    pub catalog: Arc<CatalogReader>,
    /// Authoritative session items
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(catalog: CatalogReader, sessions: impl SessionStore + 'static) -> Self {
        Self {
            catalog: Arc::new(catalog),
            sessions: Arc::new(sessions),
        }
    }

    /// State for a fresh process: in-memory sessions over the configured catalog.
    pub fn from_config(config: &ResolvedConfig) -> Self {
        let catalog =
            CatalogReader::new(&config.catalog.value).with_cache(config.catalog_cache.value);
        Self::new(catalog, MemorySessionStore::new())
    }
}

/// Build the API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/checklists:merge", post(handlers::merge_checklists))
        .route("/checklists/features", get(handlers::list_features))
        .route("/sessions:create", post(handlers::create_session))
        .route("/sessions/{session_id}", get(handlers::get_session))
        .route(
            "/sessions/{session_id}/items:update",
            post(handlers::update_item),
        )
        .route("/health", get(handlers::health))
        .fallback(handlers::route_not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the API server and run until Ctrl+C.
pub async fn start_server(config: &ResolvedConfig) -> Result<()> {
    let state = AppState::from_config(config);

    // The catalog is re-read per request; a bad file at startup is only a warning
    match state.catalog.load() {
        Ok(catalog) => tracing::info!(
            path = %state.catalog.path().display(),
            features = catalog.features().len(),
            templates = catalog.template_count(),
            "catalog loaded"
        ),
        Err(e) => tracing::warn!(error = %e, "catalog not readable at startup"),
    }

    let host_addr: std::net::IpAddr = config.host.value.parse().map_err(|e| {
        Error::Config(format!("Invalid host address '{}': {}", config.host.value, e))
    })?;
    let addr = SocketAddr::from((host_addr, config.port.value));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    println!("Starting qatrace server at http://{}", addr);
    println!("Press Ctrl+C to stop");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
