use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Publishable, Viewer};

/// Post entity - a publication owned by an author.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    /// Publication timestamp. Defaults to creation time; a future value
    /// keeps the post out of public feeds until it passes.
    pub pub_date: DateTime<Utc>,
    pub image: Option<String>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// The author-editable fields of a post, as accepted from a submission.
/// The author and the creation timestamp are never part of a draft.
#[derive(Debug, Clone)]
pub struct PostDraft {
    pub title: String,
    pub text: String,
    pub pub_date: Option<DateTime<Utc>>,
    pub image: Option<String>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
}

impl Post {
    /// Create a new post. The author is bound here, server-side; it is
    /// never taken from the submitted draft.
    pub fn new(author_id: Uuid, draft: PostDraft) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            title: draft.title,
            text: draft.text,
            pub_date: draft.pub_date.unwrap_or(now),
            image: draft.image,
            is_published: draft.is_published,
            category_id: draft.category_id,
            location_id: draft.location_id,
            created_at: now,
        }
    }

    /// Apply an edit. Identity, ownership and creation time survive;
    /// an absent pub_date keeps the current one.
    pub fn apply(&mut self, draft: PostDraft) {
        self.title = draft.title;
        self.text = draft.text;
        if let Some(pub_date) = draft.pub_date {
            self.pub_date = pub_date;
        }
        self.image = draft.image;
        self.is_published = draft.is_published;
        self.category_id = draft.category_id;
        self.location_id = draft.location_id;
    }
}

impl Publishable for Post {
    fn is_published(&self) -> bool {
        self.is_published
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Author data resolved alongside a post or comment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostAuthor {
    pub id: Uuid,
    pub username: String,
}

/// Category data resolved alongside a post. Carries the publish flag
/// because the category's state participates in the visibility rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostCategory {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub is_published: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostLocation {
    pub id: Uuid,
    pub name: String,
}

/// A post with its related data resolved eagerly and its comment count
/// attached - the unit every listing and detail view works with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostView {
    pub post: Post,
    pub author: PostAuthor,
    pub category: Option<PostCategory>,
    pub location: Option<PostLocation>,
    pub comment_count: i64,
}

impl PostView {
    /// The public-visibility invariant: published, publication time
    /// reached, and the category (when present) published as well.
    pub fn is_publicly_visible(&self, now: DateTime<Utc>) -> bool {
        self.post.is_published
            && self.post.pub_date <= now
            && self.category.as_ref().is_none_or(|c| c.is_published)
    }

    /// Visibility for a concrete viewer: the public invariant, with the
    /// owning author exempt from it.
    pub fn is_visible_to(&self, viewer: Viewer, now: DateTime<Utc>) -> bool {
        viewer.owns(self.post.author_id) || self.is_publicly_visible(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn draft() -> PostDraft {
        PostDraft {
            title: "First flight".into(),
            text: "body".into(),
            pub_date: None,
            image: None,
            is_published: true,
            category_id: None,
            location_id: None,
        }
    }

    fn view(post: Post) -> PostView {
        let author = PostAuthor {
            id: post.author_id,
            username: "ada".into(),
        };
        PostView {
            post,
            author,
            category: None,
            location: None,
            comment_count: 0,
        }
    }

    #[test]
    fn new_post_defaults_pub_date_to_creation_time() {
        let post = Post::new(Uuid::new_v4(), draft());
        assert_eq!(post.pub_date, post.created_at);
        assert!(post.is_published);
    }

    #[test]
    fn apply_preserves_author_and_creation_time() {
        let author_id = Uuid::new_v4();
        let mut post = Post::new(author_id, draft());
        let created_at = post.created_at;

        let mut edit = draft();
        edit.title = "Second thoughts".into();
        edit.is_published = false;
        post.apply(edit);

        assert_eq!(post.title, "Second thoughts");
        assert!(!post.is_published);
        assert_eq!(post.author_id, author_id);
        assert_eq!(post.created_at, created_at);
    }

    #[test]
    fn published_past_post_without_category_is_public() {
        let view = view(Post::new(Uuid::new_v4(), draft()));
        assert!(view.is_publicly_visible(Utc::now() + TimeDelta::seconds(1)));
    }

    #[test]
    fn unpublished_post_is_hidden_from_everyone_but_the_author() {
        let author_id = Uuid::new_v4();
        let mut d = draft();
        d.is_published = false;
        let view = view(Post::new(author_id, d));
        let now = Utc::now();

        assert!(!view.is_publicly_visible(now));
        assert!(!view.is_visible_to(Viewer::anonymous(), now));
        assert!(!view.is_visible_to(Viewer::user(Uuid::new_v4()), now));
        assert!(view.is_visible_to(Viewer::user(author_id), now));
    }

    #[test]
    fn future_dated_post_is_hidden_until_its_time_comes() {
        let author_id = Uuid::new_v4();
        let mut d = draft();
        d.pub_date = Some(Utc::now() + TimeDelta::hours(2));
        let view = view(Post::new(author_id, d));
        let now = Utc::now();

        assert!(!view.is_visible_to(Viewer::anonymous(), now));
        assert!(view.is_visible_to(Viewer::user(author_id), now));
        assert!(view.is_publicly_visible(now + TimeDelta::hours(3)));
    }

    #[test]
    fn unpublished_category_hides_the_post() {
        let mut v = view(Post::new(Uuid::new_v4(), draft()));
        v.category = Some(PostCategory {
            id: Uuid::new_v4(),
            title: "Drafts".into(),
            slug: "drafts".into(),
            is_published: false,
        });
        assert!(!v.is_publicly_visible(Utc::now()));

        v.category.as_mut().unwrap().is_published = true;
        assert!(v.is_publicly_visible(Utc::now()));
    }
}
