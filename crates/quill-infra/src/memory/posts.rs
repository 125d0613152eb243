use async_trait::async_trait;

use quill_core::domain::Post;
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

use super::{InMemoryStore, PostRow, Tables};

/// In-memory implementation of `PostRepository`.
#[derive(Clone)]
pub struct InMemoryPostRepository {
    store: InMemoryStore,
}

impl InMemoryPostRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

impl PostRow {
    fn from_domain(id: i64, post: &Post) -> Self {
        Self {
            id,
            user_id: post.user.id,
            title: post.title.clone(),
            body: post.body.clone(),
            created_at: post.created_at,
            updated_at: post.updated_at,
            deleted_at: post.deleted_at,
        }
    }
}

impl Tables {
    fn resolve(&self, row: &PostRow) -> Result<Post, RepoError> {
        let owner = self.users.get(&row.user_id).ok_or_else(|| {
            RepoError::storage(
                "failed to resolve post owner",
                format!("user {} referenced by post {} does not exist", row.user_id, row.id),
            )
        })?;

        Ok(Post {
            id: row.id,
            title: row.title.clone(),
            body: row.body.clone(),
            user: owner.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn get_all(&self, limit: u64, offset: u64) -> Result<Vec<Post>, RepoError> {
        let tables = self.store.tables.read().await;

        let mut visible: Vec<&PostRow> = tables
            .posts
            .values()
            .filter(|row| row.deleted_at.is_none())
            .collect();
        visible.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        visible
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .map(|row| tables.resolve(row))
            .collect()
    }

    async fn get_by_id(&self, id: i64) -> Result<Post, RepoError> {
        let tables = self.store.tables.read().await;

        match tables.posts.get(&id) {
            Some(row) if row.deleted_at.is_none() => tables.resolve(row),
            _ => Err(RepoError::NotFound),
        }
    }

    async fn create(&self, post: &Post) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;

        if !tables.users.contains_key(&post.user.id) {
            return Err(RepoError::storage(
                "failed to insert post",
                format!("user {} does not exist", post.user.id),
            ));
        }

        tables.last_post_id += 1;
        let row = PostRow::from_domain(tables.last_post_id, post);
        tables.posts.insert(row.id, row.clone());

        tables.resolve(&row)
    }

    async fn update(&self, post: &Post) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;

        if let Some(row) = tables.posts.get_mut(&post.id) {
            *row = PostRow::from_domain(post.id, post);
        }

        Ok(post.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;

        tables.comments.retain(|_, comment| comment.post_id != id);
        tables.posts.remove(&id);

        Ok(())
    }
}
