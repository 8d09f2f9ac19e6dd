//! Accounts and sessions
//!
//! Just enough to know who is posting: password hashes, a session cookie
//! and a credential check. Pages live in `http::routes::auth`.

pub mod password;

use axum::http::{header, HeaderMap};

use crate::db::{session_max_age, BlogStore, DbError, User};
use crate::models::{NewPassword, Username};
pub use password::{hash_password, verify_password, PasswordError};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "sessionid";

/// Session token from the `Cookie` header, if any.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value that opens a session.
pub fn session_cookie(token: &str) -> String {
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        session_max_age().num_seconds()
    )
}

/// `Set-Cookie` value that clears the session.
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Check credentials; `None` for an unknown user or a wrong password.
pub async fn authenticate(
    store: &dyn BlogStore,
    username: &str,
    password: &str,
) -> Result<Option<User>, DbError> {
    let user = match store.user_by_username(username).await {
        Ok(user) => user,
        Err(DbError::NotFound { .. }) => return Ok(None),
        Err(e) => return Err(e),
    };

    match verify_password(password, &user.password_hash) {
        Ok(true) => Ok(Some(user)),
        Ok(false) => Ok(None),
        Err(e) => {
            tracing::warn!(username = %user.username, error = %e, "stored password hash unreadable");
            Ok(None)
        }
    }
}

/// Account creation failure
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error(transparent)]
    Store(#[from] DbError),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

/// Create an account with a freshly hashed password.
pub async fn register(
    store: &dyn BlogStore,
    username: &Username,
    password: &NewPassword,
) -> Result<User, RegisterError> {
    let hash = hash_password(password.as_str())?;
    let user = store.create_user(username, &hash).await?;
    tracing::info!(username = %user.username, "user registered");
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use axum::http::HeaderValue;

    #[test]
    fn reads_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; sessionid=abc123; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_cookie() {
        assert_eq!(session_token(&HeaderMap::new()), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("sessionid="));
        assert_eq!(session_token(&headers), None);
    }

    #[test]
    fn cookie_strings() {
        assert!(session_cookie("t").starts_with("sessionid=t;"));
        assert!(session_cookie("t").contains("Max-Age=1209600"));
        assert!(expired_session_cookie().contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn register_then_authenticate() {
        let store = MemoryStore::new();
        let username = Username::new("author_post").unwrap();
        let password = NewPassword::new("pass-word-1").unwrap();
        register(&store, &username, &password).await.unwrap();

        let user = authenticate(&store, "author_post", "pass-word-1")
            .await
            .unwrap();
        assert_eq!(user.unwrap().username, "author_post");

        assert!(authenticate(&store, "author_post", "nope").await.unwrap().is_none());
        assert!(authenticate(&store, "ghost", "pass-word-1").await.unwrap().is_none());
    }
}
