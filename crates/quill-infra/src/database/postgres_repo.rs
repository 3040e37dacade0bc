//! PostgreSQL repository implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ColumnTrait, EntityTrait, ItemsAndPagesNumber, PaginatorTrait, QueryFilter};
use uuid::Uuid;

use quill_core::domain::{Category, Comment, CommentView, PostView, User, Viewer};
use quill_core::error::RepoError;
use quill_core::pagination::{PAGE_SIZE, Page, clamp_page};
use quill_core::ports::{
    CategoryRepository, CommentRepository, FeedFilter, PostRepository, UserRepository,
};

use super::entity::{category, comment, post, user};
use super::post_query::{self, CommentRow, PostRow};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<user::Entity, user::ActiveModel>;

/// PostgreSQL post repository.
pub type PostgresPostRepository = PostgresBaseRepository<post::Entity, post::ActiveModel>;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository =
    PostgresBaseRepository<category::Entity, category::ActiveModel>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<comment::Entity, comment::ActiveModel>;

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(%username, "Finding user by username");

        let result = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn feed(
        &self,
        filter: FeedFilter,
        viewer: Viewer,
        now: DateTime<Utc>,
        page: Option<u64>,
    ) -> Result<Page<PostView>, RepoError> {
        let paginator = post_query::feed_select(filter, viewer, now)
            .into_model::<PostRow>()
            .paginate(&self.db, PAGE_SIZE);

        let ItemsAndPagesNumber {
            number_of_items,
            number_of_pages,
        } = paginator
            .num_items_and_pages()
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        let number = clamp_page(page, number_of_pages);
        // The paginator is 0-based; pages are presented 1-based.
        let rows = paginator
            .fetch_page(number - 1)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(Page {
            items: rows.into_iter().map(PostRow::into_view).collect(),
            number,
            num_pages: number_of_pages.max(1),
            total_items: number_of_items,
        })
    }

    async fn find_view(&self, id: Uuid) -> Result<Option<PostView>, RepoError> {
        let row = post_query::detail_select(id)
            .into_model::<PostRow>()
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(row.map(PostRow::into_view))
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Category>, RepoError> {
        let result = category::Entity::find()
            .filter(category::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn find_in_post(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Comment>, RepoError> {
        let result = comment::Entity::find_by_id(comment_id)
            .filter(comment::Column::PostId.eq(post_id))
            .one(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(result.map(Into::into))
    }

    async fn list_for_post(&self, post_id: Uuid) -> Result<Vec<CommentView>, RepoError> {
        let rows = post_query::comments_select(post_id)
            .into_model::<CommentRow>()
            .all(&self.db)
            .await
            .map_err(|e| RepoError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(CommentRow::into_view).collect())
    }
}
