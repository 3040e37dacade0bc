//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{CategoryRepository, CommentRepository, PostRepository, UserRepository};
use quill_infra::database::{
    DbConn, PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresUserRepository,
};

/// Shared application state: one repository per entity, all backed by
/// the same connection pool.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl AppState {
    pub fn new(db: DbConn) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(db.clone())),
            posts: Arc::new(PostgresPostRepository::new(db.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(db.clone())),
            comments: Arc::new(PostgresCommentRepository::new(db)),
        }
    }
}
