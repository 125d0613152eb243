//! Post entity for SeaORM.

use sea_orm::entity::prelude::*;
use sea_orm::{NotSet, Set};

use quill_core::domain::{Post, User};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
    pub deleted_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
    #[sea_orm(has_many = "super::comment::Entity")]
    Comments,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::comment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Comments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Build the domain aggregate. The owning user must already be resolved.
    pub fn into_domain(self, owner: impl Into<User>) -> Post {
        Post {
            id: self.id,
            title: self.title,
            body: self.body,
            user: owner.into(),
            created_at: self.created_at.into(),
            updated_at: self.updated_at.into(),
            deleted_at: self.deleted_at.map(Into::into),
        }
    }

    /// Column values for an insert or a full-row update.
    ///
    /// The primary key is left unset: inserts let the database assign it and
    /// updates select the row by an explicit filter.
    pub fn into_write_model(self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            user_id: Set(self.user_id),
            title: Set(self.title),
            body: Set(self.body),
            created_at: Set(self.created_at),
            updated_at: Set(self.updated_at),
            deleted_at: Set(self.deleted_at),
        }
    }
}

/// Conversion from Domain Post to SeaORM Model. Only the author's id is kept.
impl From<&Post> for Model {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            user_id: post.user.id,
            title: post.title.clone(),
            body: post.body.clone(),
            created_at: post.created_at.into(),
            updated_at: post.updated_at.into(),
            deleted_at: post.deleted_at.map(Into::into),
        }
    }
}
