//! Route handlers organized by resource

pub mod auth;
pub mod feeds;
pub mod health;
pub mod posts;

use axum::http::Uri;

use super::error::AppError;

/// Fallback for unmatched paths
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound {
        resource: "page",
        id: uri.path().to_owned(),
    }
}
