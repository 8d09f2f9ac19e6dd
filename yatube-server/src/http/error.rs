//! Handler error type with IntoResponse
//!
//! Errors become HTML error pages with the matching status code, except
//! `LoginRequired`, which sends the visitor to the login form.
//!
//! `AppError` cannot see the session, so it renders the guest layout and
//! leaves [`ErrorDetails`] on the response; [`signed_in_error_pages`]
//! redraws the page for a signed-in visitor.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::server::AppState;
use crate::auth::{self, RegisterError};
use crate::db::DbError;
use crate::models::ValidationError;
use crate::render::{self, Chrome, ErrorPage};

/// Handler error with automatic HTTP status mapping
#[derive(Debug)]
pub enum AppError {
    /// Validation failed (400)
    Validation(ValidationError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: String },

    /// Anonymous visitor on a login-only page (303 to the login form)
    LoginRequired { next: String },

    /// Resource already exists (409)
    Conflict { resource: &'static str, id: String },

    /// Database error (500, logged)
    Database(DbError),

    /// Internal error (500, logged)
    Internal { message: String },
}

/// Status and message of an error page, kept on the response extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorDetails {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    /// Login URL that returns to `next` afterwards.
    pub fn login_url(next: &str) -> String {
        format!("/auth/login/?next={}", urlencoding::encode(next))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                format!("{} '{}' not found", resource, id),
            ),
            Self::LoginRequired { next } => {
                return Redirect::to(&Self::login_url(next)).into_response();
            }
            Self::Conflict { resource, id } => (
                StatusCode::CONFLICT,
                format!("{} '{}' already exists", resource, id),
            ),
            Self::Database(e) => {
                // Log the actual error, return generic message
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_owned(),
                )
            }
            Self::Internal { message } => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "an internal error occurred".to_owned(),
                )
            }
        };

        let body = render::page(&ErrorPage {
            chrome: Chrome::new(None),
            status,
            message: message.clone(),
        });
        let mut response = (status, body).into_response();
        response
            .extensions_mut()
            .insert(ErrorDetails { status, message });
        response
    }
}

/// Redraw error pages with the signed-in visitor's navigation.
pub async fn signed_in_error_pages(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let token = auth::session_token(request.headers());
    let mut response = next.run(request).await;

    let Some(token) = token else {
        return response;
    };
    let Some(details) = response.extensions_mut().remove::<ErrorDetails>() else {
        return response;
    };

    match state.store.session_user(&token).await {
        Ok(Some(user)) => {
            let body = render::page(&ErrorPage {
                chrome: Chrome::new(Some(&user)),
                status: details.status,
                message: details.message,
            });
            (details.status, body).into_response()
        }
        Ok(None) => response,
        Err(e) => {
            tracing::warn!("error page: session lookup failed: {}", e);
            response
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<RegisterError> for AppError {
    fn from(e: RegisterError) -> Self {
        match e {
            RegisterError::Store(e) => e.into(),
            RegisterError::Password(e) => Self::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl From<DbError> for AppError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::NotFound { resource, id } => Self::NotFound { resource, id },
            DbError::Conflict { resource, id } => Self::Conflict { resource, id },
            _ => Self::Database(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::http::header;

    #[tokio::test]
    async fn validation_error_is_400() {
        let err = AppError::Validation(ValidationError::Empty { field: "text" });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn not_found_is_404_html() {
        let err = AppError::NotFound {
            resource: "post",
            id: "9".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(body.contains("404 Not Found"));
    }

    #[tokio::test]
    async fn login_required_redirects_with_next() {
        let err = AppError::LoginRequired {
            next: "/create/".into(),
        };
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/auth/login/?next=%2Fcreate%2F"
        );
    }

    #[tokio::test]
    async fn database_error_hides_details() {
        let err = AppError::from(DbError::Sqlx(sqlx::Error::PoolTimedOut));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = String::from_utf8(body.to_vec()).unwrap();
        assert!(!body.contains("PoolTimedOut"));
    }

    #[test]
    fn error_details_left_on_response() {
        let response = AppError::NotFound {
            resource: "post",
            id: "9".into(),
        }
        .into_response();
        let details = response.extensions().get::<ErrorDetails>().unwrap();
        assert_eq!(details.status, StatusCode::NOT_FOUND);
        assert_eq!(details.message, "post '9' not found");
    }

    #[test]
    fn hashing_failure_is_internal() {
        let err = AppError::from(RegisterError::Password(
            crate::auth::PasswordError::Hashing("bad salt".into()),
        ));
        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[test]
    fn db_not_found_maps_to_not_found() {
        let err = AppError::from(DbError::NotFound {
            resource: "group",
            id: "nope".into(),
        });
        assert!(matches!(err, AppError::NotFound { resource: "group", .. }));
    }
}
