//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Account requests

/// Request to register a new account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// The profile fields an account holder may change. Passwords are not
/// changed through this form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileForm {
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
}

// ---------------------------------------------------------------------------
// Content requests

/// Submitted fields of a post. The author is never part of a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub text: String,
    /// Absent on create means "now"; a future value defers publication.
    pub pub_date: Option<DateTime<Utc>>,
    pub image: Option<String>,
    #[serde(default = "default_published")]
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
}

fn default_published() -> bool {
    true
}

/// Submitted fields of a comment. Author and post come from the route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentForm {
    pub text: String,
}

// ---------------------------------------------------------------------------
// Responses

/// Response containing authentication tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// An account as seen by its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// An account as shown on its public profile page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub joined: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
}

/// Category as attached to a post in a listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostCategoryResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
}

/// Category as shown at the head of its own feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationResponse {
    pub id: Uuid,
    pub name: String,
}

/// A post in a feed or detail view, relations resolved, comment count
/// attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub author: AuthorResponse,
    pub category: Option<PostCategoryResponse>,
    pub location: Option<LocationResponse>,
    pub comment_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub author: AuthorResponse,
}

/// Post detail: the post plus its comments, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

/// One page of a feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub num_pages: u64,
    pub total_items: u64,
    pub has_previous: bool,
    pub has_next: bool,
}

/// Category feed: the category and one page of its posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryFeedResponse {
    pub category: CategoryResponse,
    pub posts: PageResponse<PostResponse>,
}

/// Profile page: public account data and one page of the author's posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFeedResponse {
    pub profile: ProfileResponse,
    pub posts: PageResponse<PostResponse>,
}
