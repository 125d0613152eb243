//! # Quill Core
//!
//! The domain layer of the Quill content backend.
//! Posts, users, the ports storage adapters implement, and the post use cases.
//! Nothing in here knows about SQL or HTTP.

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use error::{DomainError, RepoError};
