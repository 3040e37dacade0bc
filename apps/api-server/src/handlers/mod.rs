//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod comments;
mod health;
mod posts;
mod profiles;

use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;

use quill_core::domain::{CommentView, PostView};
use quill_core::pagination::Page;
use quill_shared::dto::{
    AuthorResponse, CommentResponse, LocationResponse, PageResponse, PostCategoryResponse,
    PostResponse,
};

/// Configure all application routes.
///
/// Literal segments are registered before `{id}` so `/posts/create`
/// resolves to the create handler.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(auth::register))
                .route("/login", web::post().to(auth::login))
                .route("/me", web::get().to(auth::me)),
        )
        .service(
            web::resource("/posts/create")
                .route(web::get().to(posts::create_form))
                .route(web::post().to(posts::create_post)),
        )
        .route("/posts/{id}", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{id}/edit")
                .route(web::get().to(posts::edit_form))
                .route(web::post().to(posts::edit_post)),
        )
        .service(
            web::resource("/posts/{id}/delete")
                .route(web::get().to(posts::delete_form))
                .route(web::post().to(posts::delete_post)),
        )
        .route("/posts/{id}/comment", web::post().to(comments::add_comment))
        .service(
            web::resource("/posts/{post_id}/edit_comment/{comment_id}")
                .route(web::get().to(comments::comment_form))
                .route(web::post().to(comments::edit_comment)),
        )
        .service(
            web::resource("/posts/{post_id}/delete_comment/{comment_id}")
                .route(web::get().to(comments::comment_form))
                .route(web::post().to(comments::delete_comment)),
        )
        .route("/category/{slug}", web::get().to(categories::category_posts))
        .route("/profile/{username}", web::get().to(profiles::profile))
        .service(
            web::resource("/edit_profile")
                .route(web::get().to(profiles::edit_profile_form))
                .route(web::post().to(profiles::edit_profile)),
        );
}

/// `?page=N` query. Parsed leniently: anything that is not a positive
/// number counts as absent and lands on the first page.
#[derive(Debug, Deserialize)]
pub(crate) struct PageQuery {
    page: Option<String>,
}

impl PageQuery {
    pub(crate) fn number(&self) -> Option<u64> {
        self.page.as_deref().and_then(|raw| raw.parse().ok())
    }
}

/// 303 redirect, the response of every successful mutation.
pub(crate) fn see_other(location: String) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

pub(crate) fn post_response(view: PostView) -> PostResponse {
    PostResponse {
        id: view.post.id,
        title: view.post.title,
        text: view.post.text,
        pub_date: view.post.pub_date,
        image: view.post.image,
        is_published: view.post.is_published,
        created_at: view.post.created_at,
        author: AuthorResponse {
            id: view.author.id,
            username: view.author.username,
        },
        category: view.category.map(|c| PostCategoryResponse {
            id: c.id,
            title: c.title,
            slug: c.slug,
        }),
        location: view.location.map(|l| LocationResponse {
            id: l.id,
            name: l.name,
        }),
        comment_count: view.comment_count,
    }
}

pub(crate) fn comment_response(view: CommentView) -> CommentResponse {
    CommentResponse {
        id: view.comment.id,
        post_id: view.comment.post_id,
        text: view.comment.text,
        created_at: view.comment.created_at,
        author: AuthorResponse {
            id: view.author.id,
            username: view.author.username,
        },
    }
}

pub(crate) fn page_response(page: Page<PostView>) -> PageResponse<PostResponse> {
    let has_previous = page.has_previous();
    let has_next = page.has_next();
    PageResponse {
        items: page.items.into_iter().map(post_response).collect(),
        page: page.number,
        num_pages: page.num_pages,
        total_items: page.total_items,
        has_previous,
        has_next,
    }
}
