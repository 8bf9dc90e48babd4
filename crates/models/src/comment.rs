//! Comments and their replies.
//!
//! `parent_id` is a self reference. Only top-level comments (null parent) may
//! be referenced by it, which keeps every thread exactly one level deep.

use sea_orm::{entity::prelude::*, sea_query::ForeignKeyAction, ConnectionTrait, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::errors;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "comment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub author: String,
    pub created_at: DateTimeWithTimeZone,
    #[sea_orm(default_value = 0)]
    pub likes: i32,
    #[sea_orm(indexed)]
    pub parent_id: Option<i32>,
}

impl Model {
    pub fn is_top_level(&self) -> bool { self.parent_id.is_none() }

    /// Id a reply to this comment has to hang off.
    pub fn thread_root(&self) -> i32 { self.parent_id.unwrap_or(self.id) }
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Parent }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Parent => Entity::belongs_to(Entity)
                .from(Column::ParentId)
                .to(Column::Id)
                .on_delete(ForeignKeyAction::NoAction)
                .into(),
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate(content: &str, author: &str) -> Result<(), errors::ModelError> {
    errors::required("content", content)?;
    errors::required("author", author)
}

/// Insert a comment under `parent_id` as given. A parent that does not exist
/// comes back as [`errors::ModelError::Reference`].
pub async fn create<C: ConnectionTrait>(
    db: &C,
    content: &str,
    author: &str,
    parent_id: Option<i32>,
) -> Result<Model, errors::ModelError> {
    validate(content, author)?;
    let am = ActiveModel {
        content: Set(content.to_string()),
        author: Set(author.to_string()),
        created_at: Set(Utc::now().into()),
        likes: Set(0),
        parent_id: Set(parent_id),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
