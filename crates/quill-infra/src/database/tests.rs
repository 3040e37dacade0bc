use std::collections::BTreeMap;

use chrono::Utc;
use sea_orm::{DatabaseBackend, MockDatabase, Value};
use uuid::Uuid;

use quill_core::domain::Viewer;
use quill_core::ports::{
    BaseRepository, CommentRepository, FeedFilter, PostRepository, UserRepository,
};

use super::entity::user;
use super::postgres_repo::{
    PostgresCommentRepository, PostgresPostRepository, PostgresUserRepository,
};

fn post_row(id: Uuid, author_id: Uuid, username: &str, title: &str) -> BTreeMap<&'static str, Value> {
    let now = Utc::now().fixed_offset();
    BTreeMap::from([
        ("id", Value::from(id)),
        ("author_id", Value::from(author_id)),
        ("title", Value::from(title.to_owned())),
        ("text", Value::from("Body".to_owned())),
        ("pub_date", Value::from(now)),
        ("image", Value::String(None)),
        ("is_published", Value::from(true)),
        ("category_id", Value::Uuid(None)),
        ("location_id", Value::Uuid(None)),
        ("created_at", Value::from(now)),
        ("author_username", Value::from(username.to_owned())),
        ("category_title", Value::String(None)),
        ("category_slug", Value::String(None)),
        ("category_is_published", Value::Bool(None)),
        ("location_name", Value::String(None)),
        ("comment_count", Value::BigInt(Some(3))),
    ])
}

fn comment_row(
    id: Uuid,
    post_id: Uuid,
    author_id: Uuid,
    username: &str,
) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([
        ("id", Value::from(id)),
        ("post_id", Value::from(post_id)),
        ("author_id", Value::from(author_id)),
        ("text", Value::from("Nice one".to_owned())),
        ("created_at", Value::from(Utc::now().fixed_offset())),
        ("author_username", Value::from(username.to_owned())),
    ])
}

fn count_row(num_items: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(num_items)))])
}

#[tokio::test]
async fn find_view_maps_the_flat_row_into_a_post_view() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![post_row(post_id, author_id, "ada", "Test Post")]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let view = repo.find_view(post_id).await.unwrap().unwrap();

    assert_eq!(view.post.id, post_id);
    assert_eq!(view.post.title, "Test Post");
    assert_eq!(view.author.username, "ada");
    assert_eq!(view.author.id, author_id);
    assert!(view.category.is_none());
    assert!(view.location.is_none());
    assert_eq!(view.comment_count, 3);
}

#[tokio::test]
async fn feed_clamps_an_overshooting_page_to_the_last_one() {
    // 12 qualifying posts at page size 10 make two pages; page 9 lands
    // on page 2.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![count_row(12)]])
        .append_query_results(vec![vec![
            post_row(Uuid::new_v4(), Uuid::new_v4(), "ada", "Oldest"),
            post_row(Uuid::new_v4(), Uuid::new_v4(), "brian", "Older"),
        ]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let page = repo
        .feed(FeedFilter::Global, Viewer::anonymous(), Utc::now(), Some(9))
        .await
        .unwrap();

    assert_eq!(page.number, 2);
    assert_eq!(page.num_pages, 2);
    assert_eq!(page.total_items, 12);
    assert_eq!(page.items.len(), 2);
    assert!(page.has_previous());
    assert!(!page.has_next());
}

#[tokio::test]
async fn an_empty_feed_is_a_single_empty_page() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![count_row(0)]])
        .append_query_results(vec![Vec::<BTreeMap<&'static str, Value>>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let page = repo
        .feed(FeedFilter::Global, Viewer::anonymous(), Utc::now(), None)
        .await
        .unwrap();

    assert_eq!(page.number, 1);
    assert_eq!(page.num_pages, 1);
    assert_eq!(page.total_items, 0);
    assert!(page.items.is_empty());
}

#[tokio::test]
async fn find_by_username_maps_the_user_model() {
    let user_id = Uuid::new_v4();
    let now = Utc::now();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![user::Model {
            id: user_id,
            username: "ada".to_owned(),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            email: "ada@example.com".to_owned(),
            password_hash: "hash".to_owned(),
            created_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let found = repo.find_by_username("ada").await.unwrap().unwrap();

    assert_eq!(found.id, user_id);
    assert_eq!(found.username, "ada");
}

#[tokio::test]
async fn a_comment_under_the_wrong_post_resolves_to_nothing() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![Vec::<super::entity::comment::Model>::new()])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let found = repo
        .find_in_post(Uuid::new_v4(), Uuid::new_v4())
        .await
        .unwrap();

    assert!(found.is_none());
}

#[tokio::test]
async fn list_for_post_resolves_comment_authors() {
    let post_id = Uuid::new_v4();
    let author_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results(vec![vec![
            comment_row(Uuid::new_v4(), post_id, author_id, "brian"),
            comment_row(Uuid::new_v4(), post_id, author_id, "brian"),
        ]])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let comments = repo.list_for_post(post_id).await.unwrap();

    assert_eq!(comments.len(), 2);
    assert_eq!(comments[0].author.username, "brian");
    assert_eq!(comments[0].comment.post_id, post_id);
}

#[tokio::test]
async fn delete_of_a_missing_row_reports_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results(vec![sea_orm::MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result: Result<(), _> =
        BaseRepository::<quill_core::domain::Post, Uuid>::delete(&repo, Uuid::new_v4()).await;

    assert!(matches!(
        result,
        Err(quill_core::error::RepoError::NotFound)
    ));
}
