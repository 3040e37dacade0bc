//! Post handlers: the global feed, detail, and the post lifecycle.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use quill_core::access::{EditAccess, authorize_post_delete, post_edit_access};
use quill_core::domain::{Post, PostDraft};
use quill_core::ports::FeedFilter;
use quill_shared::dto::{PostDetailResponse, PostForm};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{PageQuery, comment_response, page_response, post_response, see_other};

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    query: web::Query<PageQuery>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let page = state
        .posts
        .feed(
            FeedFilter::Global,
            identity.viewer(),
            Utc::now(),
            query.number(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(page_response(page)))
}

/// GET /posts/{id}
///
/// A hidden post is indistinguishable from a missing one - except to its
/// author, who sees it in any state.
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();

    let view = state
        .posts
        .find_view(id)
        .await?
        .filter(|view| view.is_visible_to(identity.viewer(), Utc::now()))
        .ok_or_else(|| AppError::NotFound(format!("post with id {} not found", id)))?;

    let comments = state.comments.list_for_post(id).await?;

    Ok(HttpResponse::Ok().json(PostDetailResponse {
        post: post_response(view),
        comments: comments.into_iter().map(comment_response).collect(),
    }))
}

/// GET /posts/create - a blank form for an authenticated user.
pub async fn create_form(_identity: Identity) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(PostForm {
        title: String::new(),
        text: String::new(),
        pub_date: None,
        image: None,
        is_published: true,
        category_id: None,
        location_id: None,
    }))
}

/// POST /posts/create
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();

    let errors = validate(&form);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let post = Post::new(identity.user_id, to_draft(form));
    state.posts.insert(post).await?;

    Ok(see_other(format!("/profile/{}", identity.username)))
}

/// GET /posts/{id}/edit
///
/// The owner gets the prefilled form; anyone else is sent to the
/// read-only detail view instead of being rejected.
pub async fn edit_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = fetch_post(&state, id).await?;

    match post_edit_access(identity.viewer(), &post) {
        EditAccess::ReadOnly => Ok(see_other(format!("/posts/{}", id))),
        EditAccess::Granted => Ok(HttpResponse::Ok().json(form_of(&post))),
    }
}

/// POST /posts/{id}/edit
pub async fn edit_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: OptionalIdentity,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut post = fetch_post(&state, id).await?;

    if post_edit_access(identity.viewer(), &post) == EditAccess::ReadOnly {
        return Ok(see_other(format!("/posts/{}", id)));
    }

    let form = body.into_inner();
    let errors = validate(&form);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    post.apply(to_draft(form));
    state.posts.update(post).await?;

    Ok(see_other(format!("/posts/{}", id)))
}

/// GET /posts/{id}/delete - the post's data, as deletion confirmation
/// context for its owner.
pub async fn delete_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let post = fetch_post(&state, path.into_inner()).await?;
    authorize_post_delete(identity.viewer(), &post)?;

    Ok(HttpResponse::Ok().json(form_of(&post)))
}

/// POST /posts/{id}/delete
pub async fn delete_post(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let post = fetch_post(&state, id).await?;
    authorize_post_delete(identity.viewer(), &post)?;

    state.posts.delete(id).await?;

    Ok(see_other("/".to_string()))
}

async fn fetch_post(state: &AppState, id: Uuid) -> Result<Post, AppError> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post with id {} not found", id)))
}

fn validate(form: &PostForm) -> Vec<String> {
    let mut errors = Vec::new();
    if form.title.trim().is_empty() {
        errors.push("title: must not be empty".to_string());
    }
    if form.title.chars().count() > 256 {
        errors.push("title: must be at most 256 characters".to_string());
    }
    if form.text.trim().is_empty() {
        errors.push("text: must not be empty".to_string());
    }
    errors
}

fn to_draft(form: PostForm) -> PostDraft {
    PostDraft {
        title: form.title,
        text: form.text,
        pub_date: form.pub_date,
        image: form.image,
        is_published: form.is_published,
        category_id: form.category_id,
        location_id: form.location_id,
    }
}

fn form_of(post: &Post) -> PostForm {
    PostForm {
        title: post.title.clone(),
        text: post.text.clone(),
        pub_date: Some(post.pub_date),
        image: post.image.clone(),
        is_published: post.is_published,
        category_id: post.category_id,
        location_id: post.location_id,
    }
}
