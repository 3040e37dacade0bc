//! Ownership-based authorization for post and comment mutations.
//!
//! Creation only needs an authenticated identity, which the HTTP layer
//! enforces before a handler runs. Everything here is about mutating
//! existing content.

use crate::domain::{Comment, Post, Viewer};
use crate::error::DomainError;

/// Outcome of an edit-post access check. A non-owner is not rejected -
/// the handler sends them to the read-only detail view instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditAccess {
    Granted,
    ReadOnly,
}

/// Edit access to a post: owner edits, everyone else gets the detail view.
pub fn post_edit_access(viewer: Viewer, post: &Post) -> EditAccess {
    if viewer.owns(post.author_id) {
        EditAccess::Granted
    } else {
        EditAccess::ReadOnly
    }
}

/// Deleting a post is owner-only; anyone else is an authorization failure.
pub fn authorize_post_delete(viewer: Viewer, post: &Post) -> Result<(), DomainError> {
    if viewer.owns(post.author_id) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}

/// Editing or deleting a comment is owner-only.
pub fn authorize_comment_change(viewer: Viewer, comment: &Comment) -> Result<(), DomainError> {
    if viewer.owns(comment.author_id) {
        Ok(())
    } else {
        Err(DomainError::Forbidden)
    }
}
