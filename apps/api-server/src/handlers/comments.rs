//! Comment handlers. Author and target post always come from the
//! session and the route, never from the payload.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use quill_core::access::authorize_comment_change;
use quill_core::domain::{Comment, PostAuthor, Viewer};
use quill_shared::dto::{CommentForm, CommentResponse};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::see_other;

/// POST /posts/{id}/comment
///
/// The target post must be accessible to the commenter; a hidden post
/// stays a 404.
pub async fn add_comment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    identity: Identity,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();

    let view = state
        .posts
        .find_view(post_id)
        .await?
        .filter(|view| view.is_visible_to(identity.viewer(), Utc::now()))
        .ok_or_else(|| AppError::NotFound(format!("post with id {} not found", post_id)))?;

    let form = body.into_inner();
    let errors = validate(&form);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let comment = Comment::new(identity.user_id, view.post.id, form.text);
    state.comments.insert(comment).await?;

    Ok(see_other(format!("/posts/{}", post_id)))
}

/// GET /posts/{post_id}/edit_comment/{comment_id}
/// GET /posts/{post_id}/delete_comment/{comment_id}
///
/// The comment's data, as edit prefill or deletion confirmation context
/// for its owner.
pub async fn comment_form(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = comment_for_change(&state, identity.viewer(), post_id, comment_id).await?;

    Ok(HttpResponse::Ok().json(response_of(comment, &identity)))
}

/// POST /posts/{post_id}/edit_comment/{comment_id}
pub async fn edit_comment(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: Identity,
    body: web::Json<CommentForm>,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let mut comment = comment_for_change(&state, identity.viewer(), post_id, comment_id).await?;

    let form = body.into_inner();
    let errors = validate(&form);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    comment.text = form.text;
    state.comments.update(comment).await?;

    Ok(see_other(format!("/posts/{}", post_id)))
}

/// POST /posts/{post_id}/delete_comment/{comment_id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    path: web::Path<(Uuid, Uuid)>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let (post_id, comment_id) = path.into_inner();
    let comment = comment_for_change(&state, identity.viewer(), post_id, comment_id).await?;

    state.comments.delete(comment.id).await?;

    Ok(see_other(format!("/posts/{}", post_id)))
}

/// Resolve a comment for mutation: the post must exist, the comment must
/// live under it, and the viewer must own it. A wrong pairing is a 404,
/// a foreign comment a 403.
async fn comment_for_change(
    state: &AppState,
    viewer: Viewer,
    post_id: Uuid,
    comment_id: Uuid,
) -> Result<Comment, AppError> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post with id {} not found", post_id)))?;

    let comment = state
        .comments
        .find_in_post(post_id, comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("comment with id {} not found", comment_id)))?;

    authorize_comment_change(viewer, &comment)?;

    Ok(comment)
}

fn validate(form: &CommentForm) -> Vec<String> {
    let mut errors = Vec::new();
    if form.text.trim().is_empty() {
        errors.push("text: must not be empty".to_string());
    }
    errors
}

fn response_of(comment: Comment, identity: &Identity) -> CommentResponse {
    // Owner-only path: the comment's author is the acting identity.
    super::comment_response(quill_core::domain::CommentView {
        author: PostAuthor {
            id: comment.author_id,
            username: identity.username.clone(),
        },
        comment,
    })
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use quill_infra::database::entity::comment;

    use crate::handlers::configure_routes;
    use crate::handlers::test_support::{bearer, post_model, state, token_service};

    fn comment_model(id: Uuid, post_id: Uuid, author_id: Uuid) -> comment::Model {
        comment::Model {
            id,
            post_id,
            author_id,
            text: "mine".to_owned(),
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[actix_web::test]
    async fn deleting_a_foreign_comment_is_forbidden() {
        let post_id = Uuid::new_v4();
        let comment_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post_id, owner_id)]])
            .append_query_results(vec![vec![comment_model(comment_id, post_id, owner_id)]])
            .into_connection();

        let tokens = token_service();
        let auth = bearer(&tokens, Uuid::new_v4(), "brian");

        let app = test::init_service(
            App::new()
                .app_data(state(db))
                .app_data(tokens)
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{post_id}/delete_comment/{comment_id}"))
            .insert_header(("Authorization", auth))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn a_comment_under_the_wrong_post_is_not_found() {
        let post_id = Uuid::new_v4();
        let owner_id = Uuid::new_v4();

        // The post resolves, but no comment lives under it with that id.
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![post_model(post_id, owner_id)]])
            .append_query_results(vec![Vec::<comment::Model>::new()])
            .into_connection();

        let tokens = token_service();
        let auth = bearer(&tokens, owner_id, "ada");

        let app = test::init_service(
            App::new()
                .app_data(state(db))
                .app_data(tokens)
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!(
                "/posts/{post_id}/delete_comment/{}",
                Uuid::new_v4()
            ))
            .insert_header(("Authorization", auth))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn commenting_requires_authentication() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let app = test::init_service(
            App::new()
                .app_data(state(db))
                .app_data(token_service())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri(&format!("/posts/{}/comment", Uuid::new_v4()))
            .set_json(serde_json::json!({ "text": "hello" }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
