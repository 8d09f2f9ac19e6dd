//! Postgres-backed store
//!
//! Patterns:
//! - list: author and group JOINed in the same query (no N+1)
//! - create: rely on UNIQUE / FOREIGN KEY constraints, map violations (no check-then-insert)
//! - list: count and page read inside one transaction

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use super::store::{new_session_token, session_max_age, BlogStore, DbError, Group, GroupRef, Post, PostFilter, User};
use crate::models::{NewGroup, Paginated, Pagination, PostInput, Username};

const POST_SELECT: &str = r#"
    SELECT
        p.id,
        p.text,
        p.pub_date,
        p.author_id,
        u.username AS author,
        g.id AS group_id,
        g.title AS group_title,
        g.slug AS group_slug
    FROM posts p
    JOIN users u ON u.id = p.author_id
    LEFT JOIN post_groups g ON g.id = p.group_id
"#;

/// `$1` = group id filter, `$2` = author id filter; NULL disables a filter
const POST_FILTER: &str = r#"
    WHERE ($1::BIGINT IS NULL OR p.group_id = $1)
      AND ($2::BIGINT IS NULL OR p.author_id = $2)
"#;

fn post_from_row(row: &PgRow) -> Post {
    let group_id: Option<i64> = row.get("group_id");
    Post {
        id: row.get("id"),
        text: row.get("text"),
        pub_date: row.get("pub_date"),
        author_id: row.get("author_id"),
        author: row.get("author"),
        group: group_id.map(|id| GroupRef {
            id,
            title: row.get("group_title"),
            slug: row.get("group_slug"),
        }),
    }
}

fn filter_binds(filter: PostFilter) -> (Option<i64>, Option<i64>) {
    match filter {
        PostFilter::All => (None, None),
        PostFilter::Group(id) => (Some(id), None),
        PostFilter::Author(id) => (None, Some(id)),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

/// Postgres [`BlogStore`]
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    session_max_age: Duration,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            session_max_age: session_max_age(),
        }
    }

    pub fn with_session_max_age(mut self, max_age: Duration) -> Self {
        self.session_max_age = max_age;
        self
    }

    /// Sessions created at or before this instant have expired.
    fn session_cutoff(&self) -> DateTime<Utc> {
        Utc::now() - self.session_max_age
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BlogStore for PgStore {
    async fn create_user(&self, username: &Username, password_hash: &str) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, created_at
            "#,
        )
        .bind(username.as_str())
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::conflict("user", username.as_str())
            } else {
                e.into()
            }
        })
    }

    async fn user_by_username(&self, username: &str) -> Result<User, DbError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("user", username))
    }

    async fn delete_user(&self, username: &str) -> Result<(), DbError> {
        // posts and sessions go with the user via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("user", username));
        }
        Ok(())
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Group, DbError> {
        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO post_groups (title, slug, description)
            VALUES ($1, $2, $3)
            RETURNING id, title, slug, description
            "#,
        )
        .bind(group.title.as_str())
        .bind(group.slug.as_str())
        .bind(group.description.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DbError::conflict("group", group.slug.as_str())
            } else {
                e.into()
            }
        })
    }

    async fn group_by_slug(&self, slug: &str) -> Result<Group, DbError> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups WHERE slug = $1",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("group", slug))
    }

    async fn group_by_id(&self, id: i64) -> Result<Group, DbError> {
        sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("group", id))
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DbError> {
        let groups = sqlx::query_as::<_, Group>(
            "SELECT id, title, slug, description FROM post_groups ORDER BY title, id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(groups)
    }

    async fn delete_group(&self, slug: &str) -> Result<(), DbError> {
        // posts keep existing with group_id cleared via ON DELETE SET NULL
        let result = sqlx::query("DELETE FROM post_groups WHERE slug = $1")
            .bind(slug)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("group", slug));
        }
        Ok(())
    }

    async fn create_post(&self, author_id: i64, input: &PostInput) -> Result<Post, DbError> {
        let row = sqlx::query(
            r#"
            INSERT INTO posts (text, author_id, group_id)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(input.text.as_str())
        .bind(author_id)
        .bind(input.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                match input.group_id {
                    Some(group_id) => DbError::not_found("group", group_id),
                    None => DbError::not_found("user", author_id),
                }
            } else {
                e.into()
            }
        })?;

        self.get_post(row.get("id")).await
    }

    async fn update_post(&self, id: i64, input: &PostInput) -> Result<Post, DbError> {
        let updated = sqlx::query(
            r#"
            UPDATE posts
            SET text = $2, group_id = $3
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(input.text.as_str())
        .bind(input.group_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                DbError::not_found("group", input.group_id.unwrap_or_default())
            } else {
                e.into()
            }
        })?;

        if updated.is_none() {
            return Err(DbError::not_found("post", id));
        }
        self.get_post(id).await
    }

    async fn get_post(&self, id: i64) -> Result<Post, DbError> {
        let sql = format!("{POST_SELECT} WHERE p.id = $1");
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("post", id))?;
        Ok(post_from_row(&row))
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        page: Pagination,
    ) -> Result<Paginated<Post>, DbError> {
        let (group_id, author_id) = filter_binds(filter);
        let mut tx = self.pool.begin().await?;

        let count_sql = format!("SELECT COUNT(*) AS total FROM posts p {POST_FILTER}");
        let total: i64 = sqlx::query(&count_sql)
            .bind(group_id)
            .bind(author_id)
            .fetch_one(&mut *tx)
            .await?
            .get("total");

        let page = page.clamp_to(total);
        let list_sql = format!(
            "{POST_SELECT} {POST_FILTER} ORDER BY p.pub_date DESC, p.id DESC LIMIT $3 OFFSET $4"
        );
        let rows = sqlx::query(&list_sql)
            .bind(group_id)
            .bind(author_id)
            .bind(i64::from(page.limit()))
            .bind(page.offset() as i64)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Paginated {
            items: rows.iter().map(post_from_row).collect(),
            total,
            page: page.page,
            per_page: page.per_page,
        })
    }

    async fn create_session(&self, user_id: i64) -> Result<String, DbError> {
        let token = new_session_token();
        sqlx::query("INSERT INTO sessions (token, user_id) VALUES ($1, $2)")
            .bind(&token)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    DbError::not_found("user", user_id)
                } else {
                    e.into()
                }
            })?;
        Ok(token)
    }

    async fn session_user(&self, token: &str) -> Result<Option<User>, DbError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.id, u.username, u.password_hash, u.created_at
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token = $1 AND s.created_at > $2
            "#,
        )
        .bind(token)
        .bind(self.session_cutoff())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn delete_session(&self, token: &str) -> Result<(), DbError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn clear_expired_sessions(&self) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM sessions WHERE created_at <= $1")
            .bind(self.session_cutoff())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, migrations};
    use crate::models::PostText;

    // Integration tests - run with DATABASE_URL set
    // cargo test -p yatube-server -- --ignored

    async fn store() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = create_pool(&url).await.expect("pool creation failed");
        migrations::run(&pool).await.expect("migrations failed");
        PgStore::new(pool)
    }

    fn unique(prefix: &str) -> String {
        format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn group_delete_sets_post_group_null() {
        let store = store().await;
        let user = store
            .create_user(&Username::new(&unique("u")).unwrap(), "hash")
            .await
            .unwrap();
        let slug = unique("g");
        let group = store
            .create_group(&NewGroup::new("Group", &slug, "desc").unwrap())
            .await
            .unwrap();
        let post = store
            .create_post(
                user.id,
                &PostInput {
                    text: PostText::new("grouped").unwrap(),
                    group_id: Some(group.id),
                },
            )
            .await
            .unwrap();

        store.delete_group(&slug).await.unwrap();
        assert_eq!(store.get_post(post.id).await.unwrap().group, None);

        store.delete_user(&user.username).await.unwrap();
        assert!(matches!(
            store.get_post(post.id).await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn author_feed_is_paginated() {
        let store = store().await;
        let user = store
            .create_user(&Username::new(&unique("u")).unwrap(), "hash")
            .await
            .unwrap();
        for i in 0..13 {
            store
                .create_post(
                    user.id,
                    &PostInput {
                        text: PostText::new(&format!("post {i}")).unwrap(),
                        group_id: None,
                    },
                )
                .await
                .unwrap();
        }

        let second = store
            .list_posts(PostFilter::Author(user.id), Pagination::new(2, 10))
            .await
            .unwrap();
        assert_eq!(second.total, 13);
        assert_eq!(second.items.len(), 3);
        assert_eq!(second.items[2].text, "post 0");

        store.delete_user(&user.username).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn expired_session_is_not_honoured() {
        // Negative age puts the cutoff ahead of the server clock
        let store = store().await.with_session_max_age(Duration::seconds(-60));
        let user = store
            .create_user(&Username::new(&unique("u")).unwrap(), "hash")
            .await
            .unwrap();
        let token = store.create_session(user.id).await.unwrap();

        assert_eq!(store.session_user(&token).await.unwrap(), None);
        assert!(store.clear_expired_sessions().await.unwrap() >= 1);

        store.delete_user(&user.username).await.unwrap();
    }
}
