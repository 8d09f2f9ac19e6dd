//! Axum server setup
//!
//! Server skeleton with:
//! - Localhost-only CORS by default
//! - Tracing middleware
//! - Graceful shutdown on SIGTERM/Ctrl+C

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::middleware::from_fn_with_state;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::error::signed_in_error_pages;
use super::routes;
use crate::db::BlogStore;
use crate::models::OBJECTS_PER_PAGE;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to (default: 127.0.0.1:8000)
    pub bind_addr: SocketAddr,

    /// Allow permissive CORS (default: false = localhost only)
    pub cors_permissive: bool,

    /// Site behaviour shared with handlers
    pub site: SiteConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            cors_permissive: false,
            site: SiteConfig::default(),
        }
    }
}

/// Settings the handlers read on every request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    /// Posts per feed page
    pub posts_per_page: u32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            posts_per_page: OBJECTS_PER_PAGE,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub store: Arc<dyn BlogStore>,
    pub site: SiteConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn BlogStore>, site: SiteConfig) -> Arc<Self> {
        Arc::new(Self { store, site })
    }
}

/// Build the application router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::feeds::router())
        .merge(routes::posts::router())
        .merge(routes::auth::router())
        .fallback(routes::not_found)
        .layer(from_fn_with_state(state.clone(), signed_in_error_pages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(permissive: bool, bind_addr: SocketAddr) -> CorsLayer {
    if permissive {
        tracing::warn!("CORS: Permissive mode enabled - all origins allowed");
        return CorsLayer::permissive();
    }

    // Localhost only
    let port = bind_addr.port();
    let origins: Vec<HeaderValue> = [
        format!("http://localhost:{port}"),
        format!("http://127.0.0.1:{port}"),
    ]
    .iter()
    .filter_map(|origin| HeaderValue::from_str(origin).ok())
    .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Run the HTTP server.
///
/// # Example
///
/// ```ignore
/// let store = Arc::new(PgStore::new(create_pool(&database_url).await?));
/// run_server(store, ServerConfig::default()).await?;
/// ```
pub async fn run_server(store: Arc<dyn BlogStore>, config: ServerConfig) -> Result<(), ServerError> {
    tracing::info!(
        posts_per_page = config.site.posts_per_page,
        "site config loaded"
    );
    let state = AppState::new(store, config.site.clone());

    let app = build_router(state).layer(cors_layer(config.cors_permissive, config.bind_addr));

    // Bind listener
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    // Run with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting shutdown");
        }
    }
}

/// Server error type
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), 8000);
        assert!(!config.cors_permissive);
        assert_eq!(config.site.posts_per_page, 10);
    }
}
