use std::sync::Arc;

use chrono::Utc;

use crate::domain::{CreatePostParam, Post, UpdatePostParam};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostRepository, UserRepository};

/// Post use cases: validation, ownership checks and repository orchestration.
#[derive(Clone)]
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    pub async fn list(&self, limit: u64, offset: u64) -> Result<Vec<Post>, DomainError> {
        Ok(self.posts.get_all(limit, offset).await?)
    }

    pub async fn get(&self, id: i64) -> Result<Post, DomainError> {
        self.posts.get_by_id(id).await.map_err(|e| post_error(e, id))
    }

    pub async fn create(
        &self,
        author_id: i64,
        param: CreatePostParam,
    ) -> Result<Post, DomainError> {
        validate_title(&param.title)?;

        let author = self.users.get_by_id(author_id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "User",
                id: author_id,
            },
            other => other.into(),
        })?;

        let post = Post::new(param.title, param.body, author);
        Ok(self.posts.create(&post).await?)
    }

    pub async fn update(
        &self,
        actor_id: i64,
        id: i64,
        param: UpdatePostParam,
    ) -> Result<Post, DomainError> {
        validate_title(&param.title)?;

        let mut post = self.owned_post(actor_id, id).await?;
        post.title = param.title;
        post.body = param.body;
        post.updated_at = Utc::now();

        Ok(self.posts.update(&post).await?)
    }

    pub async fn delete(&self, actor_id: i64, id: i64) -> Result<(), DomainError> {
        self.owned_post(actor_id, id).await?;
        Ok(self.posts.delete(id).await?)
    }

    async fn owned_post(&self, actor_id: i64, id: i64) -> Result<Post, DomainError> {
        let post = self.get(id).await?;
        if !post.is_owned_by(actor_id) {
            return Err(DomainError::Forbidden);
        }
        Ok(post)
    }
}

fn post_error(err: RepoError, id: i64) -> DomainError {
    match err {
        RepoError::NotFound => DomainError::NotFound {
            entity_type: "Post",
            id,
        },
        other => other.into(),
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::Validation("title must not be empty".to_string()));
    }
    Ok(())
}
