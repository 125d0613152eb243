//! Domain entities - the core business objects.

mod post;
mod user;

pub use post::{CreatePostParam, Post, UpdatePostParam};
pub use user::User;
