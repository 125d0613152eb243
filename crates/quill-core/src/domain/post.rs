use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::User;

/// Post aggregate - a published article together with a snapshot of its author.
///
/// A `Post` handed out by a repository always carries a fully populated `user`;
/// storage only keeps the author's id and re-attaches the snapshot on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Zero until the post has been persisted.
    pub id: i64,
    pub title: String,
    pub body: String,
    pub user: User,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Rows carrying a marker are hidden from every read path.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Post {
    /// Create a new, unsaved post owned by `user`.
    pub fn new(title: String, body: String, user: User) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            title,
            body,
            user,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Whether `user_id` is the author of this post.
    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.user.id == user_id
    }
}

/// Input for creating a post. The author comes from the signed-in identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePostParam {
    pub title: String,
    pub body: String,
}

/// Replacement values for a post's editable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePostParam {
    pub title: String,
    pub body: String,
}
