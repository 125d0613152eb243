//! SeaORM entities - the storage-shaped mirror of the domain model.
//!
//! These types never leave the adapter; repositories convert to and from
//! `quill_core::domain` at the boundary.

pub mod comment;
pub mod post;
pub mod user;
