use axum::{extract::{Path, Query, State}, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use service::db::comment_service::{self, CommentThread, SortOrder};

use common::types::Message;
use models::comment;
use crate::{errors::{required, JsonApiError}, routes::ServerState};

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct ListQuery {
    /// `time` (default) or `likes`
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct CreateCommentInput {
    pub content: Option<String>,
    pub author: Option<String>,
    pub parent_id: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct CommentView {
    pub id: i32,
    pub content: String,
    pub author: String,
    pub created_at: DateTimeWithTimeZone,
    pub likes: i32,
}

impl From<comment::Model> for CommentView {
    fn from(m: comment::Model) -> Self {
        Self { id: m.id, content: m.content, author: m.author, created_at: m.created_at, likes: m.likes }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentThreadView {
    #[serde(flatten)]
    pub comment: CommentView,
    pub replies: Vec<CommentView>,
}

impl From<CommentThread> for CommentThreadView {
    fn from(t: CommentThread) -> Self {
        Self {
            comment: t.comment.into(),
            replies: t.replies.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CommentList {
    pub comments: Vec<CommentThreadView>,
}

#[derive(Debug, Serialize)]
pub struct LikeCount {
    pub likes: i32,
}

#[utoipa::path(
    get, path = "/api/comments", tag = "comments",
    params(ListQuery),
    responses((status = 200, description = "Top-level comments with replies", body = crate::openapi::CommentListDoc))
)]
pub async fn list(State(state): State<ServerState>, Query(q): Query<ListQuery>) -> Result<Json<CommentList>, JsonApiError> {
    let sort = SortOrder::parse(q.sort.as_deref());
    let threads = comment_service::list_threads(&state.db, sort).await?;
    Ok(Json(CommentList { comments: threads.into_iter().map(Into::into).collect() }))
}

#[utoipa::path(
    post, path = "/api/comments", tag = "comments",
    request_body = crate::openapi::CreateCommentDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::CommentDoc),
        (status = 400, description = "Missing field or unknown parent")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): WithRejection<Json<CreateCommentInput>, JsonApiError>,
) -> Result<(StatusCode, Json<CommentView>), JsonApiError> {
    let content = required(input.content, "content")?;
    let author = required(input.author, "author")?;
    let created = comment_service::create_comment(&state.db, &content, &author, input.parent_id).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

#[utoipa::path(
    post, path = "/api/comments/{id}/like", tag = "comments",
    params(("id" = i32, Path, description = "Comment id")),
    responses(
        (status = 200, description = "New like count"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn like(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<LikeCount>, JsonApiError> {
    match comment_service::like_comment(&state.db, id).await? {
        Some(likes) => Ok(Json(LikeCount { likes })),
        None => Err(JsonApiError::not_found(format!("comment {} not found", id))),
    }
}

#[utoipa::path(
    delete, path = "/api/comments/{id}", tag = "comments",
    params(("id" = i32, Path, description = "Comment id")),
    responses(
        (status = 200, description = "Comment and its replies deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<Message>, JsonApiError> {
    if !comment_service::delete_comment(&state.db, id).await? {
        return Err(JsonApiError::not_found(format!("comment {} not found", id)));
    }
    Ok(Json(Message::new("评论删除成功")))
}
