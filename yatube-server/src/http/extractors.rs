//! Custom Axum extractors

use std::sync::Arc;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use super::error::AppError;
use super::server::AppState;
use crate::auth;
use crate::db::User;

/// Signed-in user, if the session cookie names one
pub struct CurrentUser(pub Option<User>);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = auth::session_token(&parts.headers) else {
            return Ok(Self(None));
        };
        Ok(Self(state.store.session_user(&token).await?))
    }
}

/// Signed-in user; anonymous visitors are sent to the login form
pub struct RequireUser(pub User);

impl FromRequestParts<Arc<AppState>> for RequireUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        user.map(Self).ok_or_else(|| AppError::LoginRequired {
            next: parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str().to_owned())
                .unwrap_or_else(|| parts.uri.path().to_owned()),
        })
    }
}

/// Integer post id from the path; anything else is a missing page
pub struct PostId(pub i64);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::NotFound {
                resource: "post",
                id: String::new(),
            })?;

        raw.parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .map(Self)
            .ok_or(AppError::NotFound {
                resource: "post",
                id: raw,
            })
    }
}
