//! Database adapters: connection management, entities, and the
//! repository implementations built on the composed post queries.

mod connections;
pub mod entity;
mod post_query;
mod postgres_base;
pub mod postgres_repo;

pub use connections::{DatabaseConfig, connect};
pub use sea_orm::DbConn;
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresUserRepository,
};

#[cfg(test)]
mod tests;
