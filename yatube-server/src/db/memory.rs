//! In-process store with the same semantics as the Postgres one
//!
//! Used by the router tests and by `yatube serve --in-memory`.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::store::{new_session_token, session_max_age, BlogStore, DbError, Group, GroupRef, Post, PostFilter, User};
use crate::models::{NewGroup, Paginated, Pagination, PostInput, Username};

#[derive(Debug, Clone)]
struct PostRow {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    group_id: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
struct SessionRow {
    user_id: i64,
    created_at: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    posts: Vec<PostRow>,
    sessions: HashMap<String, SessionRow>,
    next_user_id: i64,
    next_group_id: i64,
    next_post_id: i64,
}

impl Tables {
    fn user(&self, id: i64) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn group(&self, id: i64) -> Option<&Group> {
        self.groups.iter().find(|g| g.id == id)
    }

    /// Join author and group onto a row, like the SQL listing does.
    fn resolve(&self, row: &PostRow) -> Post {
        Post {
            id: row.id,
            text: row.text.clone(),
            pub_date: row.pub_date,
            author_id: row.author_id,
            author: self
                .user(row.author_id)
                .map(|u| u.username.clone())
                .unwrap_or_default(),
            group: row.group_id.and_then(|id| self.group(id)).map(|g| GroupRef {
                id: g.id,
                title: g.title.clone(),
                slug: g.slug.clone(),
            }),
        }
    }

    fn check_group(&self, group_id: Option<i64>) -> Result<(), DbError> {
        match group_id {
            Some(id) if self.group(id).is_none() => Err(DbError::not_found("group", id)),
            _ => Ok(()),
        }
    }
}

/// In-memory [`BlogStore`]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    session_max_age: Duration,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            tables: RwLock::default(),
            session_max_age: session_max_age(),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session_max_age(mut self, max_age: Duration) -> Self {
        self.session_max_age = max_age;
        self
    }

    fn session_live(&self, session: &SessionRow, now: DateTime<Utc>) -> bool {
        now - session.created_at < self.session_max_age
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl BlogStore for MemoryStore {
    async fn create_user(&self, username: &Username, password_hash: &str) -> Result<User, DbError> {
        let mut t = self.write();
        if t.users.iter().any(|u| u.username == username.as_str()) {
            return Err(DbError::conflict("user", username.as_str()));
        }
        t.next_user_id += 1;
        let user = User {
            id: t.next_user_id,
            username: username.as_str().to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: Utc::now(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn user_by_username(&self, username: &str) -> Result<User, DbError> {
        self.read()
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned()
            .ok_or_else(|| DbError::not_found("user", username))
    }

    async fn delete_user(&self, username: &str) -> Result<(), DbError> {
        let mut t = self.write();
        let id = t
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.id)
            .ok_or_else(|| DbError::not_found("user", username))?;

        t.users.retain(|u| u.id != id);
        t.posts.retain(|p| p.author_id != id);
        t.sessions.retain(|_, session| session.user_id != id);
        Ok(())
    }

    async fn create_group(&self, group: &NewGroup) -> Result<Group, DbError> {
        let mut t = self.write();
        if t.groups.iter().any(|g| g.slug == group.slug.as_str()) {
            return Err(DbError::conflict("group", group.slug.as_str()));
        }
        t.next_group_id += 1;
        let group = Group {
            id: t.next_group_id,
            title: group.title.as_str().to_owned(),
            slug: group.slug.as_str().to_owned(),
            description: group.description.as_str().to_owned(),
        };
        t.groups.push(group.clone());
        Ok(group)
    }

    async fn group_by_slug(&self, slug: &str) -> Result<Group, DbError> {
        self.read()
            .groups
            .iter()
            .find(|g| g.slug == slug)
            .cloned()
            .ok_or_else(|| DbError::not_found("group", slug))
    }

    async fn group_by_id(&self, id: i64) -> Result<Group, DbError> {
        self.read()
            .group(id)
            .cloned()
            .ok_or_else(|| DbError::not_found("group", id))
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DbError> {
        let mut groups = self.read().groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn delete_group(&self, slug: &str) -> Result<(), DbError> {
        let mut t = self.write();
        let id = t
            .groups
            .iter()
            .find(|g| g.slug == slug)
            .map(|g| g.id)
            .ok_or_else(|| DbError::not_found("group", slug))?;

        t.groups.retain(|g| g.id != id);
        for post in t.posts.iter_mut().filter(|p| p.group_id == Some(id)) {
            post.group_id = None;
        }
        Ok(())
    }

    async fn create_post(&self, author_id: i64, input: &PostInput) -> Result<Post, DbError> {
        let mut t = self.write();
        if t.user(author_id).is_none() {
            return Err(DbError::not_found("user", author_id));
        }
        t.check_group(input.group_id)?;

        t.next_post_id += 1;
        let row = PostRow {
            id: t.next_post_id,
            text: input.text.as_str().to_owned(),
            pub_date: Utc::now(),
            author_id,
            group_id: input.group_id,
        };
        let post = t.resolve(&row);
        t.posts.push(row);
        Ok(post)
    }

    async fn update_post(&self, id: i64, input: &PostInput) -> Result<Post, DbError> {
        let mut t = self.write();
        t.check_group(input.group_id)?;

        let row = t
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DbError::not_found("post", id))?;
        row.text = input.text.as_str().to_owned();
        row.group_id = input.group_id;

        let row = row.clone();
        Ok(t.resolve(&row))
    }

    async fn get_post(&self, id: i64) -> Result<Post, DbError> {
        let t = self.read();
        t.posts
            .iter()
            .find(|p| p.id == id)
            .map(|row| t.resolve(row))
            .ok_or_else(|| DbError::not_found("post", id))
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        page: Pagination,
    ) -> Result<Paginated<Post>, DbError> {
        let t = self.read();
        let mut rows: Vec<&PostRow> = t
            .posts
            .iter()
            .filter(|p| match filter {
                PostFilter::All => true,
                PostFilter::Group(id) => p.group_id == Some(id),
                PostFilter::Author(id) => p.author_id == id,
            })
            .collect();
        rows.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));

        let posts: Vec<Post> = rows.into_iter().map(|row| t.resolve(row)).collect();
        Ok(Paginated::from_slice(&posts, page))
    }

    async fn create_session(&self, user_id: i64) -> Result<String, DbError> {
        let mut t = self.write();
        if t.user(user_id).is_none() {
            return Err(DbError::not_found("user", user_id));
        }
        let token = new_session_token();
        t.sessions.insert(
            token.clone(),
            SessionRow {
                user_id,
                created_at: Utc::now(),
            },
        );
        Ok(token)
    }

    async fn session_user(&self, token: &str) -> Result<Option<User>, DbError> {
        let t = self.read();
        let now = Utc::now();
        Ok(t.sessions
            .get(token)
            .filter(|session| self.session_live(session, now))
            .and_then(|session| t.user(session.user_id))
            .cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<(), DbError> {
        self.write().sessions.remove(token);
        Ok(())
    }

    async fn clear_expired_sessions(&self) -> Result<u64, DbError> {
        let mut t = self.write();
        let now = Utc::now();
        let before = t.sessions.len();
        t.sessions.retain(|_, session| self.session_live(session, now));
        Ok((before - t.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PostText, OBJECTS_PER_PAGE};

    fn input(text: &str, group_id: Option<i64>) -> PostInput {
        PostInput {
            text: PostText::new(text).unwrap(),
            group_id,
        }
    }

    async fn seeded() -> (MemoryStore, User, Group) {
        let store = MemoryStore::new();
        let user = store
            .create_user(&Username::new("author_post").unwrap(), "hash")
            .await
            .unwrap();
        let group = store
            .create_group(&NewGroup::new("Тестовая группа", "test-slug", "Тестовое описание").unwrap())
            .await
            .unwrap();
        (store, user, group)
    }

    #[tokio::test]
    async fn duplicate_slug_conflicts() {
        let (store, _, _) = seeded().await;
        let err = store
            .create_group(&NewGroup::new("Other", "test-slug", "desc").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { resource: "group", .. }));
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let (store, _, _) = seeded().await;
        let err = store
            .create_user(&Username::new("author_post").unwrap(), "hash")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { resource: "user", .. }));
    }

    #[tokio::test]
    async fn newest_post_first() {
        let (store, user, _) = seeded().await;
        for i in 0..3 {
            store
                .create_post(user.id, &input(&format!("post {i}"), None))
                .await
                .unwrap();
        }

        let page = store
            .list_posts(PostFilter::All, Pagination::default())
            .await
            .unwrap();
        let texts: Vec<_> = page.items.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(texts, vec!["post 2", "post 1", "post 0"]);
    }

    #[tokio::test]
    async fn feeds_filter_by_group_and_author() {
        let (store, user, group) = seeded().await;
        let other = store
            .create_user(&Username::new("NoName").unwrap(), "hash")
            .await
            .unwrap();
        store.create_post(user.id, &input("grouped", Some(group.id))).await.unwrap();
        store.create_post(other.id, &input("loose", None)).await.unwrap();

        let by_group = store
            .list_posts(PostFilter::Group(group.id), Pagination::default())
            .await
            .unwrap();
        assert_eq!(by_group.total, 1);
        assert_eq!(by_group.items[0].text, "grouped");
        assert_eq!(by_group.items[0].group.as_ref().unwrap().slug, "test-slug");

        let by_author = store
            .list_posts(PostFilter::Author(other.id), Pagination::default())
            .await
            .unwrap();
        assert_eq!(by_author.total, 1);
        assert_eq!(by_author.items[0].author, "NoName");
    }

    #[tokio::test]
    async fn page_past_the_end_is_last_page() {
        let (store, user, _) = seeded().await;
        for i in 0..13 {
            store
                .create_post(user.id, &input(&format!("post {i}"), None))
                .await
                .unwrap();
        }

        let page = store
            .list_posts(PostFilter::All, Pagination::new(7, OBJECTS_PER_PAGE))
            .await
            .unwrap();
        assert_eq!(page.page, 2);
        assert_eq!(page.items.len(), 3);
    }

    #[tokio::test]
    async fn deleting_group_detaches_posts() {
        let (store, user, group) = seeded().await;
        let post = store
            .create_post(user.id, &input("grouped", Some(group.id)))
            .await
            .unwrap();

        store.delete_group("test-slug").await.unwrap();

        let post = store.get_post(post.id).await.unwrap();
        assert_eq!(post.group, None);
        assert!(matches!(
            store.group_by_slug("test-slug").await.unwrap_err(),
            DbError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn deleting_user_cascades() {
        let (store, user, _) = seeded().await;
        let post = store.create_post(user.id, &input("mine", None)).await.unwrap();
        let token = store.create_session(user.id).await.unwrap();

        store.delete_user("author_post").await.unwrap();

        assert!(matches!(
            store.get_post(post.id).await.unwrap_err(),
            DbError::NotFound { resource: "post", .. }
        ));
        assert_eq!(store.session_user(&token).await.unwrap(), None);
    }

    #[tokio::test]
    async fn update_keeps_author_and_date() {
        let (store, user, group) = seeded().await;
        let post = store.create_post(user.id, &input("before", None)).await.unwrap();

        let updated = store
            .update_post(post.id, &input("after", Some(group.id)))
            .await
            .unwrap();
        assert_eq!(updated.text, "after");
        assert_eq!(updated.author_id, post.author_id);
        assert_eq!(updated.pub_date, post.pub_date);
        assert_eq!(updated.group.unwrap().id, group.id);
    }

    #[tokio::test]
    async fn post_with_unknown_group_rejected() {
        let (store, user, _) = seeded().await;
        let err = store
            .create_post(user.id, &input("text", Some(999)))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "group", .. }));
    }

    #[tokio::test]
    async fn sessions_round_trip() {
        let (store, user, _) = seeded().await;
        let token = store.create_session(user.id).await.unwrap();
        assert_eq!(store.session_user(&token).await.unwrap().unwrap().id, user.id);

        store.delete_session(&token).await.unwrap();
        assert_eq!(store.session_user(&token).await.unwrap(), None);
        assert_eq!(store.session_user("bogus").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_sessions_are_ignored_and_cleared() {
        let store = MemoryStore::new().with_session_max_age(Duration::zero());
        let user = store
            .create_user(&Username::new("author_post").unwrap(), "hash")
            .await
            .unwrap();
        let token = store.create_session(user.id).await.unwrap();

        assert_eq!(store.session_user(&token).await.unwrap(), None);
        assert_eq!(store.clear_expired_sessions().await.unwrap(), 1);
        assert_eq!(store.clear_expired_sessions().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn live_sessions_survive_clearing() {
        let (store, user, _) = seeded().await;
        let token = store.create_session(user.id).await.unwrap();

        assert_eq!(store.clear_expired_sessions().await.unwrap(), 0);
        assert_eq!(store.session_user(&token).await.unwrap().unwrap().id, user.id);
    }
}
