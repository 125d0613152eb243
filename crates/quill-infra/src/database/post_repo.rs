//! PostgreSQL post repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, DbConn, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

use quill_core::domain::Post;
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::user::{self, Entity as UserEntity};

/// PostgreSQL implementation of `PostRepository`.
///
/// Reads join the owning user in the same statement. Deletes remove comments
/// and the post inside one transaction.
pub struct PostgresPostRepository {
    pub(crate) db: Arc<DbConn>,
}

impl PostgresPostRepository {
    /// Adapters built from one `Arc` share the same pool.
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self { db: db.into() }
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn get_all(&self, limit: u64, offset: u64) -> Result<Vec<Post>, RepoError> {
        tracing::debug!(limit, offset, "Listing posts");

        let rows = PostEntity::find()
            .filter(post::Column::DeletedAt.is_null())
            .find_also_related(UserEntity)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(|e| RepoError::storage("failed to list posts", e))?;

        rows.into_iter().map(with_owner).collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Post, RepoError> {
        tracing::debug!(post_id = id, "Fetching post");

        let row = PostEntity::find_by_id(id)
            .filter(post::Column::DeletedAt.is_null())
            .find_also_related(UserEntity)
            .one(self.db.as_ref())
            .await
            .map_err(|e| RepoError::storage("failed to fetch post", e))?;

        row.ok_or(RepoError::NotFound).and_then(with_owner)
    }

    async fn create(&self, post: &Post) -> Result<Post, RepoError> {
        let saved = post::Model::from(post)
            .into_write_model()
            .insert(self.db.as_ref())
            .await
            .map_err(|e| RepoError::storage("failed to insert post", e))?;

        // Re-read the author instead of echoing the caller's snapshot.
        let owner = UserEntity::find_by_id(saved.user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| RepoError::storage("failed to fetch post owner", e))?
            .ok_or_else(|| {
                RepoError::storage(
                    "failed to fetch post owner",
                    format!("user {} does not exist", saved.user_id),
                )
            })?;

        tracing::debug!(post_id = saved.id, user_id = owner.id, "Post created");
        Ok(saved.into_domain(owner))
    }

    async fn update(&self, post: &Post) -> Result<Post, RepoError> {
        let model = post::Model::from(post);

        let result = PostEntity::update_many()
            .set(model.clone().into_write_model())
            .filter(post::Column::Id.eq(model.id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| RepoError::storage("failed to update post", e))?;

        if result.rows_affected == 0 {
            tracing::debug!(post_id = model.id, "Post update matched no rows");
        }

        Ok(model.into_domain(post.user.clone()))
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| RepoError::storage("failed to begin transaction", e))?;

        // Every exit below finalizes `txn` exactly once. If this future is
        // dropped mid-flight, dropping the transaction rolls it back.
        let outcome = delete_post_rows(&txn, id).await;
        match outcome {
            Ok((comments, posts)) => {
                txn.commit()
                    .await
                    .map_err(|e| RepoError::storage("failed to commit transaction", e))?;
                tracing::debug!(
                    post_id = id,
                    comments_deleted = comments,
                    posts_deleted = posts,
                    "Post deleted"
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(post_id = id, error = %err, "Rolling back post delete");
                if let Err(e) = txn.rollback().await {
                    tracing::error!(post_id = id, error = %e, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Children first: comments, then the post itself.
async fn delete_post_rows(txn: &DatabaseTransaction, id: i64) -> Result<(u64, u64), RepoError> {
    let comments = CommentEntity::delete_many()
        .filter(comment::Column::PostId.eq(id))
        .exec(txn)
        .await
        .map_err(|e| RepoError::storage("failed to delete comments", e))?;

    let posts = PostEntity::delete_by_id(id)
        .exec(txn)
        .await
        .map_err(|e| RepoError::storage("failed to delete post", e))?;

    Ok((comments.rows_affected, posts.rows_affected))
}

/// A joined row must carry its owner; a dangling reference is a storage fault.
fn with_owner((post, owner): (post::Model, Option<user::Model>)) -> Result<Post, RepoError> {
    match owner {
        Some(owner) => Ok(post.into_domain(owner)),
        None => Err(RepoError::storage(
            "failed to resolve post owner",
            format!("user {} referenced by post {} does not exist", post.user_id, post.id),
        )),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn row_without_owner_is_a_storage_failure() {
        let now = Utc::now();
        let row = post::Model {
            id: 3,
            user_id: 99,
            title: "Orphan".to_owned(),
            body: String::new(),
            created_at: now.into(),
            updated_at: now.into(),
            deleted_at: None,
        };

        let err = with_owner((row, None)).unwrap_err();

        assert!(matches!(
            err,
            RepoError::Storage {
                context: "failed to resolve post owner",
                ..
            }
        ));
    }
}
