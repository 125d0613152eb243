use async_trait::async_trait;

use crate::domain::{Post, User};
use crate::error::RepoError;

/// Post repository - persistence contract for the `Post` aggregate.
///
/// Every post returned carries a resolved author snapshot. Dropping a returned
/// future abandons the in-flight database work.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Page through visible posts, newest first.
    ///
    /// An empty page is not an error.
    async fn get_all(&self, limit: u64, offset: u64) -> Result<Vec<Post>, RepoError>;

    /// Fetch one visible post; `RepoError::NotFound` when there is none.
    async fn get_by_id(&self, id: i64) -> Result<Post, RepoError>;

    /// Insert a new row and return it with a generated id and a freshly read author.
    ///
    /// Any id on `post` is ignored.
    async fn create(&self, post: &Post) -> Result<Post, RepoError>;

    /// Overwrite every column of the row keyed by `post.id`.
    ///
    /// A missing row is a silent no-op; it shows up as `NotFound` on the next read.
    async fn update(&self, post: &Post) -> Result<Post, RepoError>;

    /// Remove the post and all of its comments atomically.
    ///
    /// Deleting an id that does not exist succeeds.
    async fn delete(&self, id: i64) -> Result<(), RepoError>;
}

/// User repository with the lookups the post and auth flows need.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by id; `RepoError::NotFound` when there is none.
    async fn get_by_id(&self, id: i64) -> Result<User, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Insert a new user and return it with its generated id.
    async fn create(&self, user: &User) -> Result<User, RepoError>;
}
