//! HTTP layer
//!
//! Axum server with:
//! - Server-rendered HTML pages
//! - Session-cookie sign-in
//! - Request tracing
//! - Graceful shutdown

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::{AppError, ErrorDetails};
pub use server::{build_router, run_server, AppState, ServerConfig, ServerError, SiteConfig};
