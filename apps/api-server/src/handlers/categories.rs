//! Category feed handler.

use actix_web::{HttpResponse, web};
use chrono::Utc;

use quill_core::domain::Publishable;
use quill_core::ports::FeedFilter;
use quill_shared::dto::{CategoryFeedResponse, CategoryResponse};

use crate::middleware::auth::OptionalIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

use super::{PageQuery, page_response};

/// GET /category/{slug}
///
/// An unpublished category is a 404 for everyone, independent of the
/// per-post category check.
pub async fn category_posts(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();

    let category = state
        .categories
        .find_by_slug(&slug)
        .await?
        .filter(Publishable::is_published)
        .ok_or_else(|| AppError::NotFound(format!("category '{}' not found", slug)))?;

    let page = state
        .posts
        .feed(
            FeedFilter::Category(category.id),
            identity.viewer(),
            Utc::now(),
            query.number(),
        )
        .await?;

    Ok(HttpResponse::Ok().json(CategoryFeedResponse {
        category: CategoryResponse {
            id: category.id,
            title: category.title,
            description: category.description,
            slug: category.slug,
        },
        posts: page_response(page),
    }))
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::StatusCode, test};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use uuid::Uuid;

    use quill_infra::database::entity::category;

    use crate::handlers::configure_routes;
    use crate::handlers::test_support::{state, token_service};

    fn category_model(slug: &str, is_published: bool) -> category::Model {
        category::Model {
            id: Uuid::new_v4(),
            title: "Travel".to_owned(),
            description: "Places".to_owned(),
            slug: slug.to_owned(),
            is_published,
            created_at: Utc::now().fixed_offset(),
        }
    }

    #[actix_web::test]
    async fn an_unpublished_category_feed_is_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results(vec![vec![category_model("travel", false)]])
            .into_connection();

        let app = test::init_service(
            App::new()
                .app_data(state(db))
                .app_data(token_service())
                .configure(configure_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/category/travel").to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
