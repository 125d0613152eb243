//! PostgreSQL user repository.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, ColumnTrait, DbConn, EntityTrait, QueryFilter};

use quill_core::domain::User;
use quill_core::error::RepoError;
use quill_core::ports::UserRepository;

use super::entity::user::{self, Entity as UserEntity};

/// PostgreSQL implementation of `UserRepository`.
pub struct PostgresUserRepository {
    pub(crate) db: Arc<DbConn>,
}

impl PostgresUserRepository {
    /// Adapters built from one `Arc` share the same pool.
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self { db: db.into() }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn get_by_id(&self, id: i64) -> Result<User, RepoError> {
        UserEntity::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| RepoError::storage("failed to fetch user", e))?
            .map(Into::into)
            .ok_or(RepoError::NotFound)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db.as_ref())
            .await
            .map_err(|e| RepoError::storage("failed to fetch user by email", e))?;

        Ok(result.map(Into::into))
    }

    async fn create(&self, user: &User) -> Result<User, RepoError> {
        let saved = user::ActiveModel::from(user)
            .insert(self.db.as_ref())
            .await
            .map_err(|e| RepoError::storage("failed to insert user", e))?;

        tracing::debug!(user_id = saved.id, "User created");
        Ok(saved.into())
    }
}

/// Keep addresses out of logs: `jane@example.com` becomes `j***@example.com`.
fn mask_email(email: &str) -> String {
    match email.find('@') {
        Some(at_pos) => {
            let (local, domain) = email.split_at(at_pos);
            match local.chars().next() {
                Some(first) if local.chars().count() > 1 => format!("{first}***{domain}"),
                _ => format!("***{domain}"),
            }
        }
        None => "***".to_string(),
    }
}
