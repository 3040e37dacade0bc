//! # Quill Core
//!
//! The domain layer of the Quill blogging service.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! the entities, the post-visibility rules, the ownership guard, pagination
//! rules, and the ports that infrastructure adapters implement.

pub mod access;
pub mod domain;
pub mod error;
pub mod pagination;
pub mod ports;

pub use error::DomainError;
