use axum::{
    routing::{get, post, put},
    Json, Router,
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::CorsLayer,
    trace::{TraceLayer, DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, DefaultOnFailure},
};
use tracing::Level;

use common::types::Health;

use crate::openapi;

pub mod admin;
pub mod articles;
pub mod cars;
pub mod comments;

/// Shared handler state. The connection pool is the only thing handlers
/// share; every request opens its own transaction on it.
#[derive(Clone)]
pub struct ServerState {
    pub db: DatabaseConnection,
}

#[utoipa::path(get, path = "/health", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health { status: "ok" })
}

/// Build the full application router: JSON API, admin page and form routes.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/api-docs/openapi.json", get(openapi::openapi_json));

    let api = Router::new()
        .route("/api/geely-cars", get(cars::list_with_article))
        .route("/api/cars", post(cars::create))
        .route("/api/cars/:id", put(cars::update).delete(cars::delete))
        .route("/api/comments", get(comments::list).post(comments::create))
        .route("/api/comments/:id", axum::routing::delete(comments::delete))
        .route("/api/comments/:id/like", post(comments::like))
        .route("/api/articles", get(articles::list).post(articles::create))
        .route(
            "/api/articles/:id",
            get(articles::get).put(articles::update).delete(articles::delete),
        );

    // 管理页面与表单提交；id 不存在时静默重定向回 /admin
    let admin_routes = Router::new()
        .route("/admin", get(admin::page))
        .route("/add-car", post(admin::add_car))
        .route("/update-car/:id", post(admin::update_car))
        .route("/delete-car/:id", post(admin::delete_car));

    public
        .merge(api)
        .merge(admin_routes)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
