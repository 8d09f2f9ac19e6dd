//! Post detail, create and edit

use std::sync::Arc;

use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};

use crate::db::{Post, PostFilter, User};
use crate::http::error::AppError;
use crate::http::extractors::{CurrentUser, PostId, RequireUser};
use crate::http::server::AppState;
use crate::models::{FormErrors, Pagination, PostForm, PostInput};
use crate::render::{self, profile_url, Chrome, PostDetailPage, PostFormPage};

/// GET /posts/{id}/
async fn post_detail(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    PostId(id): PostId,
) -> Result<Html<String>, AppError> {
    let post = state.store.get_post(id).await?;
    let author_posts = state
        .store
        .list_posts(PostFilter::Author(post.author_id), Pagination::new(1, 1))
        .await?
        .total;
    let can_edit = user.as_ref().is_some_and(|u| u.id == post.author_id);

    Ok(render::page(&PostDetailPage {
        chrome: Chrome::new(user.as_ref()),
        post,
        author_posts,
        can_edit,
    }))
}

async fn form_page(
    state: &AppState,
    user: &User,
    form: PostForm,
    errors: FormErrors,
    editing: Option<&Post>,
) -> Result<Html<String>, AppError> {
    let groups = state.store.list_groups().await?;
    Ok(render::page(&PostFormPage {
        chrome: Chrome::new(Some(user)),
        form,
        errors,
        groups,
        is_edit: editing.is_some(),
        post_id: editing.map(|p| p.id),
    }))
}

/// Validate against the groups that exist right now.
async fn validate(
    state: &AppState,
    form: &PostForm,
) -> Result<Result<PostInput, FormErrors>, AppError> {
    let known: Vec<i64> = state
        .store
        .list_groups()
        .await?
        .iter()
        .map(|g| g.id)
        .collect();
    Ok(form.validate(&known))
}

/// GET /create/ - empty form
async fn create_form(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
) -> Result<Html<String>, AppError> {
    form_page(&state, &user, PostForm::default(), FormErrors::new(), None).await
}

/// POST /create/ - store the post and go to the author's profile
async fn create_post(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    match validate(&state, &form).await? {
        Ok(input) => {
            let post = state.store.create_post(user.id, &input).await?;
            tracing::info!(post_id = post.id, author = %user.username, "post created");
            Ok(Redirect::to(&profile_url(&user.username)).into_response())
        }
        Err(errors) => {
            tracing::debug!(author = %user.username, "post form rejected");
            Ok(form_page(&state, &user, form, errors, None)
                .await?
                .into_response())
        }
    }
}

/// Load the post and make sure the viewer wrote it.
///
/// `Err(Redirect)` sends anyone else back to the detail page.
async fn owned_post(
    state: &AppState,
    user: &User,
    id: i64,
) -> Result<Result<Post, Redirect>, AppError> {
    let post = state.store.get_post(id).await?;
    if post.author_id != user.id {
        tracing::debug!(post_id = id, user = %user.username, "edit by non-author refused");
        return Ok(Err(Redirect::to(&post.absolute_url())));
    }
    Ok(Ok(post))
}

/// GET /posts/{id}/edit/ - form filled with the current post
async fn edit_form(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    PostId(id): PostId,
) -> Result<Response, AppError> {
    let post = match owned_post(&state, &user, id).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    let form = PostForm {
        text: post.text.clone(),
        group: post.group.as_ref().map(|g| g.id.to_string()),
    };
    Ok(form_page(&state, &user, form, FormErrors::new(), Some(&post))
        .await?
        .into_response())
}

/// POST /posts/{id}/edit/ - save and return to the post
async fn edit_post(
    State(state): State<Arc<AppState>>,
    RequireUser(user): RequireUser,
    PostId(id): PostId,
    Form(form): Form<PostForm>,
) -> Result<Response, AppError> {
    let post = match owned_post(&state, &user, id).await? {
        Ok(post) => post,
        Err(redirect) => return Ok(redirect.into_response()),
    };

    match validate(&state, &form).await? {
        Ok(input) => {
            let post = state.store.update_post(post.id, &input).await?;
            tracing::info!(post_id = post.id, author = %user.username, "post updated");
            Ok(Redirect::to(&post.absolute_url()).into_response())
        }
        Err(errors) => Ok(form_page(&state, &user, form, errors, Some(&post))
            .await?
            .into_response()),
    }
}

/// Post routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create/", get(create_form).post(create_post))
        .route("/posts/{id}/", get(post_detail))
        .route("/posts/{id}/edit/", get(edit_form).post(edit_post))
}
