use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::PostAuthor;

/// Comment entity - a reply attached to a post.
///
/// The creation timestamp is set once and never changes, including on
/// edit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Create a new comment. Author and target post are bound here,
    /// server-side, never from submitted data.
    pub fn new(author_id: Uuid, post_id: Uuid, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            post_id,
            author_id,
            text,
            created_at: Utc::now(),
        }
    }
}

/// A comment with its author resolved, as shown under a post detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentView {
    pub comment: Comment,
    pub author: PostAuthor,
}
