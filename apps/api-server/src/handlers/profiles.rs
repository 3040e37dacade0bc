//! Profile handlers: the author feed and profile editing.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use quill_core::domain::ProfileUpdate;
use quill_core::ports::FeedFilter;
use quill_shared::dto::{ProfileFeedResponse, ProfileForm, ProfileResponse};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{PageQuery, page_response, see_other};

/// GET /profile/{username}
///
/// The owner sees all of their posts here; everyone else sees only the
/// public ones.
pub async fn profile(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let username = path.into_inner();

    let user = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("profile '{}' not found", username)))?;

    let page = state
        .posts
        .feed(
            FeedFilter::Author(user.id),
            identity.viewer(),
            Utc::now(),
            query.number(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(ProfileFeedResponse {
        profile: ProfileResponse {
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            joined: user.created_at,
        },
        posts: page_response(page),
    }))
}

/// GET /edit_profile - the caller's current profile fields.
pub async fn edit_profile_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<HttpResponse> {
    let user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("account not found".to_string()))?;

    Ok(HttpResponse::Ok().json(ProfileForm {
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        email: user.email,
    }))
}

/// POST /edit_profile
///
/// Only username, first name, last name and email change here;
/// credentials are out of this form's reach.
pub async fn edit_profile(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<ProfileForm>,
) -> AppResult<HttpResponse> {
    let form = body.into_inner();

    let errors = validate(&form);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let mut user = state
        .users
        .find_by_id(identity.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("account not found".to_string()))?;

    if form.username != user.username
        && state
            .users
            .find_by_username(&form.username)
            .await?
            .is_some()
    {
        return Err(AppError::Conflict("Username already taken".to_string()));
    }

    user.apply_profile(ProfileUpdate {
        username: form.username,
        first_name: form.first_name,
        last_name: form.last_name,
        email: form.email,
    });
    let user = state.users.update(user).await?;

    Ok(see_other(format!("/profile/{}", user.username)))
}

fn validate(form: &ProfileForm) -> Vec<String> {
    let mut errors = Vec::new();
    if form.username.trim().is_empty() {
        errors.push("username: must not be empty".to_string());
    }
    if form.username.chars().count() > 150 {
        errors.push("username: must be at most 150 characters".to_string());
    }
    if form.email.is_empty() || !form.email.contains('@') {
        errors.push("email: must be a valid email address".to_string());
    }
    errors
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use quill_infra::database::entity::user;

    use crate::handlers::configure_routes;
    use crate::handlers::test_support::{bearer, state, token_service};

    fn user_model(id: Uuid, username: &str) -> user::Model {
        user::Model {
            id,
            username: username.to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[actix_web::test]
    async fn profile_edit_redirects_to_the_renamed_profile() {
        let user_id = Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            // current account, uniqueness probe, then the update
            .append_query_results(vec![vec![user_model(user_id, "ada")]])
            .append_query_results(vec![Vec::<user::Model>::new()])
            .append_query_results(vec![vec![user_model(user_id, "ada_l")]])
            .into_connection();

        let tokens = token_service();
        let auth = bearer(&tokens, user_id, "ada");

        let app = test::init_service(
            App::new()
                .app_data(state(db))
                .app_data(tokens)
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/edit_profile")
            .insert_header(("Authorization", auth))
            .set_json(serde_json::json!({
                "username": "ada_l",
                "first_name": "Ada",
                "last_name": "Lovelace",
                "email": "ada@example.com",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get("Location").unwrap(), "/profile/ada_l");
    }

    #[actix_web::test]
    async fn profile_edit_requires_authentication() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let app = test::init_service(
            App::new()
                .app_data(state(db))
                .app_data(token_service())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/edit_profile")
            .set_json(serde_json::json!({
                "username": "x",
                "email": "x@example.com",
            }))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
}
