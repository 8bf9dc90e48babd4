//! Server-rendered admin page and the form endpoints it posts to.
//!
//! Accepted forms redirect back to `/admin`. An id that no longer exists is
//! logged and otherwise ignored; a form with a blank field is a 400.

use axum::{extract::{Path, State}, response::{Html, Redirect}, Form};
use axum_extra::extract::WithRejection;
use once_cell::sync::Lazy;
use service::{db::car_service, errors::ServiceError};
use tera::{Context, Tera};
use tracing::warn;

use crate::{errors::JsonApiError, routes::{cars::CarInput, ServerState}};

static TEMPLATES: Lazy<Result<Tera, tera::Error>> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_template("admin.html", include_str!("../../templates/admin.html"))?;
    Ok(tera)
});

fn render(name: &str, ctx: &Context) -> Result<Html<String>, JsonApiError> {
    let tera = TEMPLATES
        .as_ref()
        .map_err(|e| JsonApiError::internal(format!("template setup failed: {e}")))?;
    tera.render(name, ctx)
        .map(Html)
        .map_err(|e| JsonApiError::internal(format!("render {name} failed: {e}")))
}

pub async fn page(State(state): State<ServerState>) -> Result<Html<String>, JsonApiError> {
    let cars = car_service::list_cars(&state.db).await?;
    let mut ctx = Context::new();
    ctx.insert("cars", &cars);
    render("admin.html", &ctx)
}

pub async fn add_car(
    State(state): State<ServerState>,
    WithRejection(Form(input), _): WithRejection<Form<CarInput>, JsonApiError>,
) -> Result<Redirect, JsonApiError> {
    let f = input.into_fields()?;
    car_service::create_car(&state.db, &f.name, &f.image, &f.description).await?;
    Ok(Redirect::to("/admin"))
}

pub async fn update_car(
    State(state): State<ServerState>,
    Path(id): Path<i32>,
    WithRejection(Form(input), _): WithRejection<Form<CarInput>, JsonApiError>,
) -> Result<Redirect, JsonApiError> {
    let f = input.into_fields()?;
    match car_service::update_car(&state.db, id, &f.name, &f.image, &f.description).await {
        Ok(_) => {}
        Err(ServiceError::NotFound(_)) => warn!(id, "update-car form for missing car ignored"),
        Err(e) => return Err(e.into()),
    }
    Ok(Redirect::to("/admin"))
}

pub async fn delete_car(State(state): State<ServerState>, Path(id): Path<i32>) -> Result<Redirect, JsonApiError> {
    if !car_service::delete_car(&state.db, id).await? {
        warn!(id, "delete-car form for missing car ignored");
    }
    Ok(Redirect::to("/admin"))
}
