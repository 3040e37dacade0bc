//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`:
//! PostgreSQL repositories via SeaORM (including the composed
//! visibility/feed queries), JWT tokens and Argon2 password hashing.

pub mod auth;
pub mod database;

pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};
pub use database::{
    DatabaseConfig, PostgresCategoryRepository, PostgresCommentRepository, PostgresPostRepository,
    PostgresUserRepository,
};
