use axum::{extract::{Path, State}, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use service::db::article_service::{self, ArticleWithCar};

use common::types::Message;
use crate::{errors::{required, JsonApiError}, routes::ServerState};

#[derive(Debug, Deserialize, Serialize)]
pub struct ArticleInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub car_id: Option<i32>,
}

struct ArticleFields {
    title: String,
    content: String,
    car_id: i32,
}

impl ArticleInput {
    fn into_fields(self) -> Result<ArticleFields, JsonApiError> {
        Ok(ArticleFields {
            title: required(self.title, "title")?,
            content: required(self.content, "content")?,
            car_id: required(self.car_id, "car_id")?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleView {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub car_id: i32,
    pub created_at: DateTimeWithTimeZone,
    pub car_name: Option<String>,
}

impl From<ArticleWithCar> for ArticleView {
    fn from(row: ArticleWithCar) -> Self {
        let a = row.article;
        Self {
            id: a.id,
            title: a.title,
            content: a.content,
            car_id: a.car_id,
            created_at: a.created_at,
            car_name: row.car_name,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleList {
    pub articles: Vec<ArticleView>,
}

#[utoipa::path(
    get, path = "/api/articles", tag = "articles",
    responses((status = 200, description = "All articles with car names", body = crate::openapi::ArticleListDoc))
)]
pub async fn list(State(state): State<ServerState>) -> Result<Json<ArticleList>, JsonApiError> {
    let rows = article_service::list_articles(&state.db).await?;
    Ok(Json(ArticleList { articles: rows.into_iter().map(Into::into).collect() }))
}

#[utoipa::path(
    get, path = "/api/articles/{id}", tag = "articles",
    params(("id" = i32, Path, description = "Article id")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::ArticleDoc),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<ArticleView>, JsonApiError> {
    match article_service::get_article(&state.db, id).await? {
        Some(row) => Ok(Json(row.into())),
        None => Err(JsonApiError::not_found(format!("article {} not found", id))),
    }
}

#[utoipa::path(
    post, path = "/api/articles", tag = "articles",
    request_body = crate::openapi::ArticleInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Missing field or unknown car")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): WithRejection<Json<ArticleInput>, JsonApiError>,
) -> Result<(StatusCode, Json<Message>), JsonApiError> {
    let f = input.into_fields()?;
    article_service::create_article(&state.db, &f.title, &f.content, f.car_id).await?;
    Ok((StatusCode::CREATED, Json(Message::new("Article created successfully"))))
}

#[utoipa::path(
    put, path = "/api/articles/{id}", tag = "articles",
    params(("id" = i32, Path, description = "Article id")),
    request_body = crate::openapi::ArticleInputDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Missing field or unknown car"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    WithRejection(Json(input), _): WithRejection<Json<ArticleInput>, JsonApiError>,
) -> Result<Json<Message>, JsonApiError> {
    let f = input.into_fields()?;
    article_service::update_article(&state.db, id, &f.title, &f.content, f.car_id).await?;
    Ok(Json(Message::new("Article updated successfully")))
}

#[utoipa::path(
    delete, path = "/api/articles/{id}", tag = "articles",
    params(("id" = i32, Path, description = "Article id")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<Message>, JsonApiError> {
    if !article_service::delete_article(&state.db, id).await? {
        return Err(JsonApiError::not_found(format!("article {} not found", id)));
    }
    Ok(Json(Message::new("Article deleted successfully")))
}
