//! Sign in, sign out and sign up

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;

use crate::auth::{self, RegisterError};
use crate::db::{DbError, User};
use crate::http::error::AppError;
use crate::http::extractors::CurrentUser;
use crate::http::server::AppState;
use crate::models::{FormErrors, NewPassword, Username, ValidationError};
use crate::render::{self, Chrome, LoginPage, SignupPage};

#[derive(Debug, Default, Deserialize)]
pub struct NextParam {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Only same-site paths are followed after login.
fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => "/",
    }
}

/// Open a session for `user` and redirect with the cookie set.
async fn sign_in(state: &AppState, user: &User, target: &str) -> Result<Response, AppError> {
    let expired = state.store.clear_expired_sessions().await?;
    if expired > 0 {
        tracing::debug!(count = expired, "expired sessions cleared");
    }
    let token = state.store.create_session(user.id).await?;
    tracing::info!(username = %user.username, "user signed in");
    Ok((
        [(header::SET_COOKIE, auth::session_cookie(&token))],
        Redirect::to(target),
    )
        .into_response())
}

/// GET /auth/login/
async fn login_form(
    CurrentUser(user): CurrentUser,
    Query(params): Query<NextParam>,
) -> Html<String> {
    render::page(&LoginPage {
        chrome: Chrome::new(user.as_ref()),
        username: String::new(),
        next: params.next,
        error: None,
    })
}

/// POST /auth/login/
async fn login(
    State(state): State<Arc<AppState>>,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match auth::authenticate(state.store.as_ref(), form.username.trim(), &form.password).await? {
        Some(user) => sign_in(&state, &user, safe_next(form.next.as_deref())).await,
        None => {
            tracing::debug!(username = %form.username, "login refused");
            Ok(render::page(&LoginPage {
                chrome: Chrome::new(None),
                username: form.username,
                next: form.next,
                error: Some(
                    "Please enter a correct username and password. Both fields may be case-sensitive."
                        .to_owned(),
                ),
            })
            .into_response())
        }
    }
}

/// GET or POST /auth/logout/
async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Result<Response, AppError> {
    if let Some(token) = auth::session_token(&headers) {
        state.store.delete_session(&token).await?;
    }
    Ok((
        [(header::SET_COOKIE, auth::expired_session_cookie())],
        Redirect::to("/"),
    )
        .into_response())
}

/// GET /auth/signup/
async fn signup_form(CurrentUser(user): CurrentUser) -> Html<String> {
    render::page(&SignupPage {
        chrome: Chrome::new(user.as_ref()),
        username: String::new(),
        errors: FormErrors::new(),
    })
}

/// POST /auth/signup/ - create the account and sign it in
async fn signup(
    State(state): State<Arc<AppState>>,
    Form(form): Form<SignupForm>,
) -> Result<Response, AppError> {
    let mut errors = FormErrors::new();
    let username = Username::new(form.username.trim()).map_err(|e| errors.push(e)).ok();
    let password = NewPassword::new(&form.password1).map_err(|e| errors.push(e)).ok();
    if form.password1 != form.password2 {
        errors.push(ValidationError::InvalidFormat {
            field: "password confirmation",
            reason: "the two password fields didn't match",
        });
    }

    if let (Some(username), Some(password), true) = (&username, &password, errors.is_empty()) {
        match auth::register(state.store.as_ref(), username, password).await {
            Ok(user) => return sign_in(&state, &user, "/").await,
            Err(RegisterError::Store(DbError::Conflict { .. })) => errors.push(ValidationError::InvalidFormat {
                field: "username",
                reason: "a user with that username already exists",
            }),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(render::page(&SignupPage {
        chrome: Chrome::new(None),
        username: form.username,
        errors,
    })
    .into_response())
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login/", get(login_form).post(login))
        .route("/auth/logout/", get(logout).post(logout))
        .route("/auth/signup/", get(signup_form).post(signup))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_must_be_local_path() {
        assert_eq!(safe_next(Some("/create/")), "/create/");
        assert_eq!(safe_next(Some("/posts/1/edit/?x=1")), "/posts/1/edit/?x=1");
        assert_eq!(safe_next(Some("https://evil.example/")), "/");
        assert_eq!(safe_next(Some("//evil.example/")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
