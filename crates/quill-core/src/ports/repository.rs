use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{Category, Comment, CommentView, Post, PostView, User, Viewer};
use crate::error::RepoError;
use crate::pagination::Page;

/// Generic repository trait defining standard CRUD operations.
///
/// Create and update are distinct because they are distinct operations of
/// this system: inserts carry a caller-generated id, updates must hit an
/// existing row.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Persist a new entity.
    async fn insert(&self, entity: T) -> Result<T, RepoError>;

    /// Persist changes to an existing entity.
    async fn update(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Which posts a feed covers, before visibility is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedFilter {
    /// Every post on the site.
    Global,
    /// Posts under one category.
    Category(Uuid),
    /// Posts by one author.
    Author(Uuid),
}

/// User repository with account-specific lookups.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository: CRUD plus the composed feed and detail queries.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// One page of the ordered feed selected by `filter`, restricted to
    /// what `viewer` may see, each post carrying resolved relations and
    /// its comment count.
    async fn feed(
        &self,
        filter: FeedFilter,
        viewer: Viewer,
        now: DateTime<Utc>,
        page: Option<u64>,
    ) -> Result<Page<PostView>, RepoError>;

    /// A single post with resolved relations and comment count,
    /// regardless of visibility. Callers apply the visibility rule.
    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, RepoError>;
}

/// Category repository.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// A comment looked up under its parent post; a mismatched pairing
    /// resolves to nothing.
    async fn find_in_post(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, RepoError>;

    /// All comments of a post with authors resolved, oldest first.
    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError>;
}
