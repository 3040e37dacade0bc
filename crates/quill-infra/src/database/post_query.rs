//! The post visibility/query composer.
//!
//! Every listing and detail lookup is built from the same select: posts
//! with author, category and location resolved in one query and the
//! comment count aggregated over a joined comments table. Visibility is
//! a single composed condition - the public invariant (published,
//! publication time reached, category absent or published) OR ownership
//! by the viewer - so feeds and detail lookups cannot drift apart.

use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ColumnTrait, Condition, EntityTrait, FromQueryResult, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select,
};
use uuid::Uuid;

use quill_core::domain::{PostAuthor, PostCategory, PostLocation, PostView, Viewer};
use quill_core::ports::FeedFilter;

use super::entity::{category, comment, location, post, user};

/// The public-visibility invariant as a query condition.
fn public_condition(now: DateTime<Utc>) -> Condition {
    Condition::all()
        .add(post::Column::IsPublished.eq(true))
        .add(post::Column::PubDate.lte(now))
        .add(
            Condition::any()
                .add(post::Column::CategoryId.is_null())
                .add(category::Column::IsPublished.eq(true)),
        )
}

/// What `viewer` may see: public posts, plus their own in any state.
pub(crate) fn visible_condition(viewer: Viewer, now: DateTime<Utc>) -> Condition {
    let mut condition = Condition::any().add(public_condition(now));
    if let Some(user_id) = viewer.user_id() {
        condition = condition.add(post::Column::AuthorId.eq(user_id));
    }
    condition
}

/// Posts with author/category/location resolved and the comment count
/// aggregated. Grouping is by the joined primary keys; every selected
/// column is functionally dependent on one of them.
fn post_view_select() -> Select<post::Entity> {
    post::Entity::find()
        .join(JoinType::InnerJoin, post::Relation::User.def())
        .join(JoinType::LeftJoin, post::Relation::Category.def())
        .join(JoinType::LeftJoin, post::Relation::Location.def())
        .join(JoinType::LeftJoin, post::Relation::Comments.def())
        .column_as(user::Column::Username, "author_username")
        .column_as(category::Column::Title, "category_title")
        .column_as(category::Column::Slug, "category_slug")
        .column_as(category::Column::IsPublished, "category_is_published")
        .column_as(location::Column::Name, "location_name")
        .column_as(comment::Column::Id.count(), "comment_count")
        .group_by(post::Column::Id)
        .group_by(user::Column::Id)
        .group_by(category::Column::Id)
        .group_by(location::Column::Id)
}

/// The ordered feed select for one filter/viewer combination.
pub(crate) fn feed_select(
    filter: FeedFilter,
    viewer: Viewer,
    now: DateTime<Utc>,
) -> Select<post::Entity> {
    let select = post_view_select()
        .filter(visible_condition(viewer, now))
        .order_by_desc(post::Column::PubDate);

    match filter {
        FeedFilter::Global => select,
        FeedFilter::Category(category_id) => {
            select.filter(post::Column::CategoryId.eq(category_id))
        }
        FeedFilter::Author(author_id) => select.filter(post::Column::AuthorId.eq(author_id)),
    }
}

/// Single-post lookup with relations and comment count, no visibility
/// filter - callers decide what the viewer may see.
pub(crate) fn detail_select(id: Uuid) -> Select<post::Entity> {
    post_view_select().filter(post::Column::Id.eq(id))
}

/// Comments of one post with authors resolved, oldest first.
pub(crate) fn comments_select(post_id: Uuid) -> Select<comment::Entity> {
    comment::Entity::find()
        .filter(comment::Column::PostId.eq(post_id))
        .join(JoinType::InnerJoin, comment::Relation::User.def())
        .column_as(user::Column::Username, "author_username")
        .order_by_asc(comment::Column::CreatedAt)
}

/// Flat row shape produced by [`post_view_select`].
#[derive(Debug, FromQueryResult)]
pub(crate) struct PostRow {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub text: String,
    pub pub_date: DateTimeWithTimeZone,
    pub image: Option<String>,
    pub is_published: bool,
    pub category_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub author_username: String,
    pub category_title: Option<String>,
    pub category_slug: Option<String>,
    pub category_is_published: Option<bool>,
    pub location_name: Option<String>,
    pub comment_count: i64,
}

impl PostRow {
    pub(crate) fn into_view(self) -> PostView {
        let category = match (
            self.category_id,
            self.category_title,
            self.category_slug,
            self.category_is_published,
        ) {
            (Some(id), Some(title), Some(slug), Some(is_published)) => Some(PostCategory {
                id,
                title,
                slug,
                is_published,
            }),
            _ => None,
        };
        let location = match (self.location_id, self.location_name) {
            (Some(id), Some(name)) => Some(PostLocation { id, name }),
            _ => None,
        };

        PostView {
            post: quill_core::domain::Post {
                id: self.id,
                author_id: self.author_id,
                title: self.title,
                text: self.text,
                pub_date: self.pub_date.into(),
                image: self.image,
                is_published: self.is_published,
                category_id: self.category_id,
                location_id: self.location_id,
                created_at: self.created_at.into(),
            },
            author: PostAuthor {
                id: self.author_id,
                username: self.author_username,
            },
            category,
            location,
            comment_count: self.comment_count,
        }
    }
}

/// Flat row shape produced by [`comments_select`].
#[derive(Debug, FromQueryResult)]
pub(crate) struct CommentRow {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    pub created_at: DateTimeWithTimeZone,
    pub author_username: String,
}

impl CommentRow {
    pub(crate) fn into_view(self) -> quill_core::domain::CommentView {
        quill_core::domain::CommentView {
            comment: quill_core::domain::Comment {
                id: self.id,
                post_id: self.post_id,
                author_id: self.author_id,
                text: self.text,
                created_at: self.created_at.into(),
            },
            author: PostAuthor {
                id: self.author_id,
                username: self.author_username,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DbBackend, QueryTrait};

    fn sql(select: Select<post::Entity>) -> String {
        select.build(DbBackend::Postgres).to_string()
    }

    #[test]
    fn anonymous_feed_applies_the_public_invariant_only() {
        let built = sql(feed_select(
            FeedFilter::Global,
            Viewer::anonymous(),
            Utc::now(),
        ));

        assert!(built.contains(r#""posts"."is_published""#));
        assert!(built.contains(r#""posts"."pub_date" <="#));
        assert!(built.contains(r#""posts"."category_id" IS NULL"#));
        assert!(built.contains(r#""categories"."is_published""#));
        assert!(!built.contains(r#""posts"."author_id" ="#));
    }

    #[test]
    fn authenticated_feed_adds_the_owner_exception() {
        let built = sql(feed_select(
            FeedFilter::Global,
            Viewer::user(Uuid::new_v4()),
            Utc::now(),
        ));

        assert!(built.contains(r#""posts"."author_id" ="#));
    }

    #[test]
    fn feed_is_ordered_by_publication_time_descending() {
        let built = sql(feed_select(
            FeedFilter::Global,
            Viewer::anonymous(),
            Utc::now(),
        ));

        assert!(built.contains(r#"ORDER BY "posts"."pub_date" DESC"#));
    }

    #[test]
    fn feed_resolves_relations_and_counts_comments_in_one_query() {
        let built = sql(feed_select(
            FeedFilter::Global,
            Viewer::anonymous(),
            Utc::now(),
        ));

        assert!(built.contains(r#"INNER JOIN "users""#));
        assert!(built.contains(r#"LEFT JOIN "categories""#));
        assert!(built.contains(r#"LEFT JOIN "locations""#));
        assert!(built.contains(r#"LEFT JOIN "comments""#));
        assert!(built.contains(r#"COUNT("comments"."id") AS "comment_count""#));
        assert!(built.contains(r#"GROUP BY "posts"."id""#));
    }

    #[test]
    fn category_and_author_filters_compose_on_top() {
        let category_id = Uuid::new_v4();
        let built = sql(feed_select(
            FeedFilter::Category(category_id),
            Viewer::anonymous(),
            Utc::now(),
        ));
        assert!(built.contains(r#""posts"."category_id" ="#));

        let built = sql(feed_select(
            FeedFilter::Author(Uuid::new_v4()),
            Viewer::anonymous(),
            Utc::now(),
        ));
        assert!(built.contains(r#""posts"."author_id" ="#));
    }

    #[test]
    fn detail_select_has_no_visibility_filter() {
        let built = sql(detail_select(Uuid::new_v4()));

        assert!(built.contains(r#""posts"."id" ="#));
        assert!(!built.contains(r#""posts"."pub_date" <="#));
    }
}
