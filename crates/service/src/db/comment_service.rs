//! Comment threads: top-level comments with one level of replies.

use std::collections::HashMap;

use sea_orm::{
    sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait,
};
use tracing::{debug, info};
use models::comment;
use crate::errors::ServiceError;

/// Ordering of top-level comments. Replies are always newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Time,
    Likes,
}

impl SortOrder {
    /// `likes` selects [`SortOrder::Likes`]; anything else, including no
    /// value, falls back to time.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("likes") => SortOrder::Likes,
            _ => SortOrder::Time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread {
    pub comment: comment::Model,
    pub replies: Vec<comment::Model>,
}

/// Top-level comments with their direct replies. Ties in either sort key are
/// broken by id so the result is deterministic.
pub async fn list_threads(db: &DatabaseConnection, sort: SortOrder) -> Result<Vec<CommentThread>, ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;

    let top = comment::Entity::find().filter(comment::Column::ParentId.is_null());
    let top = match sort {
        SortOrder::Time => top.order_by_desc(comment::Column::CreatedAt),
        SortOrder::Likes => top.order_by_desc(comment::Column::Likes),
    };
    let parents = top
        .order_by_asc(comment::Column::Id)
        .all(&txn)
        .await
        .map_err(ServiceError::db)?;

    let mut replies_by_parent: HashMap<i32, Vec<comment::Model>> = HashMap::new();
    let ids: Vec<i32> = parents.iter().map(|c| c.id).collect();
    if !ids.is_empty() {
        let replies = comment::Entity::find()
            .filter(comment::Column::ParentId.is_in(ids))
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_asc(comment::Column::Id)
            .all(&txn)
            .await
            .map_err(ServiceError::db)?;
        for reply in replies {
            if let Some(pid) = reply.parent_id {
                replies_by_parent.entry(pid).or_default().push(reply);
            }
        }
    }
    txn.commit().await.map_err(ServiceError::db)?;

    Ok(parents
        .into_iter()
        .map(|comment| {
            let replies = replies_by_parent.remove(&comment.id).unwrap_or_default();
            CommentThread { comment, replies }
        })
        .collect())
}

/// Create a comment or a reply. A reply aimed at another reply is attached
/// to that reply's top-level comment instead.
///
/// The row is inserted under the requested parent first, then re-pointed at
/// the thread root, so the transaction starts with a write.
pub async fn create_comment(
    db: &DatabaseConnection,
    content: &str,
    author: &str,
    parent_id: Option<i32>,
) -> Result<comment::Model, ServiceError> {
    comment::validate(content, author)?;
    let missing_parent = || format!("parent comment {} does not exist", parent_id.unwrap_or_default());
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let mut created = comment::create(&txn, content, author, parent_id)
        .await
        .map_err(|e| ServiceError::from(e).naming_reference(missing_parent))?;
    if let Some(pid) = parent_id {
        let parent = comment::Entity::find_by_id(pid)
            .one(&txn)
            .await
            .map_err(ServiceError::db)?
            .ok_or_else(|| ServiceError::InvalidReference(missing_parent()))?;
        if !parent.is_top_level() {
            let root = parent.thread_root();
            comment::Entity::update_many()
                .col_expr(comment::Column::ParentId, Expr::value(root))
                .filter(comment::Column::Id.eq(created.id))
                .exec(&txn)
                .await
                .map_err(ServiceError::db)?;
            debug!(requested = pid, root, "reply to reply flattened");
            created.parent_id = Some(root);
        }
    }
    txn.commit().await.map_err(ServiceError::db)?;
    info!(id = created.id, parent_id = ?created.parent_id, "created comment");
    Ok(created)
}

/// Add one like inside the store and return the new count, or None when the
/// comment does not exist.
pub async fn like_comment(db: &DatabaseConnection, id: i32) -> Result<Option<i32>, ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let res = comment::Entity::update_many()
        .col_expr(comment::Column::Likes, Expr::col(comment::Column::Likes).add(1))
        .filter(comment::Column::Id.eq(id))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    if res.rows_affected == 0 {
        txn.rollback().await.map_err(ServiceError::db)?;
        return Ok(None);
    }
    let likes = comment::Entity::find_by_id(id)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .map(|c| c.likes);
    txn.commit().await.map_err(ServiceError::db)?;
    debug!(id, likes = ?likes, "liked comment");
    Ok(likes)
}

/// Delete a comment with its direct replies; returns false when the comment
/// does not exist, in which case nothing is removed.
pub async fn delete_comment(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let replies = comment::Entity::delete_many()
        .filter(comment::Column::ParentId.eq(id))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    let res = comment::Entity::delete_by_id(id).exec(&txn).await.map_err(ServiceError::db)?;
    if res.rows_affected == 0 {
        txn.rollback().await.map_err(ServiceError::db)?;
        return Ok(false);
    }
    txn.commit().await.map_err(ServiceError::db)?;
    info!(id, replies = replies.rows_affected, "deleted comment");
    Ok(true)
}
