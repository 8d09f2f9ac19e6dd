//! Storage trait and the records it returns
//!
//! Handlers only talk to [`BlogStore`], so the same routes run against
//! Postgres in production and [`super::MemoryStore`] in tests.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::{truncate_display, NewGroup, Paginated, Pagination, PostInput, Username};

/// Registered author
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Community a post may belong to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl std::fmt::Display for Group {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(truncate_display(&self.title))
    }
}

/// Group columns joined onto a post row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

/// Post with its author and group already resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Post {
    pub id: i64,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub author_id: i64,
    pub author: String,
    pub group: Option<GroupRef>,
}

impl Post {
    /// Link to the detail page.
    pub fn absolute_url(&self) -> String {
        format!("/posts/{}/", self.id)
    }
}

impl std::fmt::Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(truncate_display(&self.text))
    }
}

/// Which posts a feed shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
    All,
    Group(i64),
    Author(i64),
}

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("already exists: {resource} '{id}'")]
    Conflict { resource: &'static str, id: String },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub(crate) fn conflict(resource: &'static str, id: impl ToString) -> Self {
        Self::Conflict {
            resource,
            id: id.to_string(),
        }
    }
}

/// Persistence operations used by the site
#[async_trait]
pub trait BlogStore: Send + Sync + 'static {
    // Users

    async fn create_user(&self, username: &Username, password_hash: &str) -> Result<User, DbError>;

    async fn user_by_username(&self, username: &str) -> Result<User, DbError>;

    /// Delete a user together with their posts and sessions.
    async fn delete_user(&self, username: &str) -> Result<(), DbError>;

    // Groups

    async fn create_group(&self, group: &NewGroup) -> Result<Group, DbError>;

    async fn group_by_slug(&self, slug: &str) -> Result<Group, DbError>;

    async fn group_by_id(&self, id: i64) -> Result<Group, DbError>;

    /// All groups ordered by title.
    async fn list_groups(&self) -> Result<Vec<Group>, DbError>;

    /// Delete a group; its posts stay, detached from any group.
    async fn delete_group(&self, slug: &str) -> Result<(), DbError>;

    // Posts

    async fn create_post(&self, author_id: i64, input: &PostInput) -> Result<Post, DbError>;

    /// Replace text and group. Author and publication date never change.
    async fn update_post(&self, id: i64, input: &PostInput) -> Result<Post, DbError>;

    async fn get_post(&self, id: i64) -> Result<Post, DbError>;

    /// Newest first; a page past the end returns the last page.
    async fn list_posts(
        &self,
        filter: PostFilter,
        page: Pagination,
    ) -> Result<Paginated<Post>, DbError>;

    // Sessions

    /// Open a session and return its token.
    async fn create_session(&self, user_id: i64) -> Result<String, DbError>;

    /// Owner of a session younger than the store's session max age.
    async fn session_user(&self, token: &str) -> Result<Option<User>, DbError>;

    async fn delete_session(&self, token: &str) -> Result<(), DbError>;

    /// Drop expired sessions; returns how many were removed.
    async fn clear_expired_sessions(&self) -> Result<u64, DbError>;
}

/// How long a session stays valid after sign-in
pub fn session_max_age() -> Duration {
    Duration::weeks(2)
}

/// Random opaque session token
pub(crate) fn new_session_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_truncates() {
        let group = Group {
            id: 1,
            title: "Тестовая группа с длинным именем".into(),
            slug: "test-slug".into(),
            description: "Тестовое описание".into(),
        };
        assert_eq!(group.to_string(), "Тестовая группа");
    }

    #[test]
    fn post_url() {
        let post = Post {
            id: 42,
            text: "hello".into(),
            pub_date: Utc::now(),
            author_id: 1,
            author: "author_post".into(),
            group: None,
        };
        assert_eq!(post.absolute_url(), "/posts/42/");
        assert_eq!(post.to_string(), "hello");
    }

    #[test]
    fn session_tokens_are_unique() {
        assert_ne!(new_session_token(), new_session_token());
        assert_eq!(new_session_token().len(), 32);
    }
}
