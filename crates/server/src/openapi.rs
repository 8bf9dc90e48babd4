use axum::Json;
use utoipa::OpenApi;
use utoipa::ToSchema;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct CarInputDoc { pub name: String, pub image: String, pub description: String }

#[derive(ToSchema)]
pub struct ArticleSummaryDoc { pub id: i32, pub title: String, pub content: String }

#[derive(ToSchema)]
pub struct CarDoc {
    pub id: i32,
    pub name: String,
    pub image: String,
    pub description: String,
    pub article: Option<ArticleSummaryDoc>,
}

#[derive(ToSchema)]
pub struct CarListDoc { pub cars: Vec<CarDoc> }

#[derive(ToSchema)]
pub struct ArticleInputDoc { pub title: String, pub content: String, pub car_id: i32 }

#[derive(ToSchema)]
pub struct ArticleDoc {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub car_id: i32,
    /// ISO-8601 timestamp
    pub created_at: String,
    pub car_name: Option<String>,
}

#[derive(ToSchema)]
pub struct ArticleListDoc { pub articles: Vec<ArticleDoc> }

#[derive(ToSchema)]
pub struct CreateCommentDoc { pub content: String, pub author: String, pub parent_id: Option<i32> }

#[derive(ToSchema)]
pub struct CommentDoc {
    pub id: i32,
    pub content: String,
    pub author: String,
    /// ISO-8601 timestamp
    pub created_at: String,
    pub likes: i32,
}

#[derive(ToSchema)]
pub struct CommentThreadDoc {
    pub id: i32,
    pub content: String,
    pub author: String,
    pub created_at: String,
    pub likes: i32,
    pub replies: Vec<CommentDoc>,
}

#[derive(ToSchema)]
pub struct CommentListDoc { pub comments: Vec<CommentThreadDoc> }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::cars::list_with_article,
        crate::routes::cars::create,
        crate::routes::cars::update,
        crate::routes::cars::delete,
        crate::routes::comments::list,
        crate::routes::comments::create,
        crate::routes::comments::like,
        crate::routes::comments::delete,
        crate::routes::articles::list,
        crate::routes::articles::get,
        crate::routes::articles::create,
        crate::routes::articles::update,
        crate::routes::articles::delete,
    ),
    components(
        schemas(
            HealthResponse,
            CarInputDoc,
            ArticleSummaryDoc,
            CarDoc,
            CarListDoc,
            ArticleInputDoc,
            ArticleDoc,
            ArticleListDoc,
            CreateCommentDoc,
            CommentDoc,
            CommentThreadDoc,
            CommentListDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "cars", description = "Cars and their first article"),
        (name = "comments", description = "Threaded comments"),
        (name = "articles", description = "Articles attached to cars"),
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
