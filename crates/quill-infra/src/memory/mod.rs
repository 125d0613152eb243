//! In-memory storage - the fallback when no database is configured.
//!
//! Rows are kept in the same shape the relational schema uses: posts hold
//! only their author's id, comments hold only their post's id. Every
//! operation runs under a single lock, so multi-row changes are atomic.
//! Note: data is lost on process restart.

mod posts;
mod users;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use quill_core::domain::User;

pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;

#[derive(Debug, Clone)]
struct PostRow {
    id: i64,
    user_id: i64,
    title: String,
    body: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
struct CommentRow {
    post_id: i64,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    posts: BTreeMap<i64, PostRow>,
    comments: BTreeMap<i64, CommentRow>,
    last_user_id: i64,
    last_post_id: i64,
    last_comment_id: i64,
}

/// Shared in-memory tables backing the in-memory repositories.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository::new(self.clone())
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository::new(self.clone())
    }

    /// Attach a comment row to a post and return its id.
    pub async fn add_comment(&self, post_id: i64) -> i64 {
        let mut tables = self.tables.write().await;
        tables.last_comment_id += 1;
        let id = tables.last_comment_id;
        tables.comments.insert(id, CommentRow { post_id });
        id
    }

    /// Number of comment rows referencing `post_id`.
    pub async fn comment_count(&self, post_id: i64) -> usize {
        let tables = self.tables.read().await;
        tables
            .comments
            .values()
            .filter(|c| c.post_id == post_id)
            .count()
    }

    /// Stamp the soft-delete marker on a post row, hiding it from reads.
    pub async fn mark_post_deleted(&self, post_id: i64, at: DateTime<Utc>) -> bool {
        let mut tables = self.tables.write().await;
        match tables.posts.get_mut(&post_id) {
            Some(row) => {
                row.deleted_at = Some(at);
                true
            }
            None => false,
        }
    }
}
