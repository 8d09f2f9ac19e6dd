//! Paginated feeds: site-wide, per group and per author

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::get,
    Router,
};

use crate::db::PostFilter;
use crate::http::error::AppError;
use crate::http::extractors::CurrentUser;
use crate::http::server::AppState;
use crate::models::{Pagination, PaginationParams};
use crate::render::{self, Chrome, GroupPage, IndexPage, ProfilePage};

/// GET / - every post, newest first
async fn index(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(params): Query<PaginationParams>,
) -> Result<Html<String>, AppError> {
    let page = Pagination::from_params(&params, state.site.posts_per_page);
    let page_obj = state.store.list_posts(PostFilter::All, page).await?;

    Ok(render::page(&IndexPage {
        chrome: Chrome::new(user.as_ref()),
        page_obj,
    }))
}

/// GET /group/{slug}/ - posts of one group
async fn group_posts(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(slug): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Html<String>, AppError> {
    let group = state.store.group_by_slug(&slug).await?;
    let page = Pagination::from_params(&params, state.site.posts_per_page);
    let page_obj = state
        .store
        .list_posts(PostFilter::Group(group.id), page)
        .await?;

    Ok(render::page(&GroupPage {
        chrome: Chrome::new(user.as_ref()),
        group,
        page_obj,
    }))
}

/// GET /profile/{username}/ - posts of one author
async fn profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(username): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Html<String>, AppError> {
    let author = state.store.user_by_username(&username).await?;
    let page = Pagination::from_params(&params, state.site.posts_per_page);
    let page_obj = state
        .store
        .list_posts(PostFilter::Author(author.id), page)
        .await?;

    Ok(render::page(&ProfilePage {
        chrome: Chrome::new(user.as_ref()),
        user_name: author.username,
        page_obj,
    }))
}

/// Feed routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/group/{slug}/", get(group_posts))
        .route("/profile/{username}/", get(profile))
}
