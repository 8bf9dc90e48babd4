use axum::{extract::{Path, State}, http::StatusCode, Json};
use axum_extra::extract::WithRejection;
use serde::{Deserialize, Serialize};
use service::db::car_service;

use common::types::Message;
use models::{article, car};
use crate::{errors::{required, JsonApiError}, routes::ServerState};

/// Body of `POST /api/cars`, `PUT /api/cars/{id}` and the admin car forms.
/// Fields are optional here so that a missing one becomes a 400 instead of
/// an extractor rejection.
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct CarInput {
    pub name: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

pub struct CarFields {
    pub name: String,
    pub image: String,
    pub description: String,
}

impl CarInput {
    pub fn into_fields(self) -> Result<CarFields, JsonApiError> {
        Ok(CarFields {
            name: required(self.name, "name")?,
            image: required(self.image, "image")?,
            description: required(self.description, "description")?,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct CarView {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub description: String,
}

impl From<car::Model> for CarView {
    fn from(m: car::Model) -> Self {
        Self { id: m.id, name: m.name, image: m.image, description: m.description }
    }
}

#[derive(Debug, Serialize)]
pub struct ArticleSummary {
    pub id: i32,
    pub title: String,
    pub content: String,
}

impl From<article::Model> for ArticleSummary {
    fn from(m: article::Model) -> Self {
        Self { id: m.id, title: m.title, content: m.content }
    }
}

#[derive(Debug, Serialize)]
pub struct CarListItem {
    #[serde(flatten)]
    pub car: CarView,
    pub article: Option<ArticleSummary>,
}

#[derive(Debug, Serialize)]
pub struct CarList {
    pub cars: Vec<CarListItem>,
}

#[derive(Debug, Serialize)]
pub struct CarMessage {
    pub message: &'static str,
    pub car: CarView,
}

#[utoipa::path(
    get, path = "/api/geely-cars", tag = "cars",
    responses((status = 200, description = "Cars with their first article", body = crate::openapi::CarListDoc))
)]
pub async fn list_with_article(State(state): State<ServerState>) -> Result<Json<CarList>, JsonApiError> {
    let rows = car_service::list_cars_with_article(&state.db).await?;
    let cars = rows
        .into_iter()
        .map(|row| CarListItem { car: row.car.into(), article: row.article.map(Into::into) })
        .collect();
    Ok(Json(CarList { cars }))
}

#[utoipa::path(
    post, path = "/api/cars", tag = "cars",
    request_body = crate::openapi::CarInputDoc,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Missing field")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    WithRejection(Json(input), _): WithRejection<Json<CarInput>, JsonApiError>,
) -> Result<(StatusCode, Json<CarMessage>), JsonApiError> {
    let f = input.into_fields()?;
    let created = car_service::create_car(&state.db, &f.name, &f.image, &f.description).await?;
    Ok((StatusCode::CREATED, Json(CarMessage { message: "Car created successfully", car: created.into() })))
}

#[utoipa::path(
    put, path = "/api/cars/{id}", tag = "cars",
    params(("id" = i32, Path, description = "Car id")),
    request_body = crate::openapi::CarInputDoc,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Missing field"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    WithRejection(Json(input), _): WithRejection<Json<CarInput>, JsonApiError>,
) -> Result<Json<CarMessage>, JsonApiError> {
    let f = input.into_fields()?;
    let updated = car_service::update_car(&state.db, id, &f.name, &f.image, &f.description).await?;
    Ok(Json(CarMessage { message: "Car updated successfully", car: updated.into() }))
}

#[utoipa::path(
    delete, path = "/api/cars/{id}", tag = "cars",
    params(("id" = i32, Path, description = "Car id")),
    responses(
        (status = 200, description = "Car and its articles deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Json<Message>, JsonApiError> {
    if !car_service::delete_car(&state.db, id).await? {
        return Err(JsonApiError::not_found(format!("car {} not found", id)));
    }
    Ok(Json(Message::new("车辆及其文章已删除")))
}
