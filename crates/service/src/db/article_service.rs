use sea_orm::{sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use tracing::info;
use models::{article, car};
use crate::errors::ServiceError;

/// An article annotated with the name of the car it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleWithCar {
    pub article: article::Model,
    pub car_name: Option<String>,
}

impl From<(article::Model, Option<car::Model>)> for ArticleWithCar {
    fn from((article, car): (article::Model, Option<car::Model>)) -> Self {
        Self { article, car_name: car.map(|c| c.name) }
    }
}

fn missing_car(car_id: i32) -> String {
    format!("car {} does not exist", car_id)
}

/// List articles in id order with their car names.
pub async fn list_articles(db: &DatabaseConnection) -> Result<Vec<ArticleWithCar>, ServiceError> {
    let rows = article::Entity::find()
        .find_also_related(car::Entity)
        .order_by_asc(article::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(rows.into_iter().map(ArticleWithCar::from).collect())
}

pub async fn get_article(db: &DatabaseConnection, id: i32) -> Result<Option<ArticleWithCar>, ServiceError> {
    let row = article::Entity::find_by_id(id)
        .find_also_related(car::Entity)
        .one(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(row.map(ArticleWithCar::from))
}

/// Create an article for an existing car. The insert goes first and a
/// dangling `car_id` is reported by the store's foreign key.
pub async fn create_article(db: &DatabaseConnection, title: &str, content: &str, car_id: i32) -> Result<article::Model, ServiceError> {
    article::validate(title, content)?;
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let created = article::create(&txn, title, content, car_id)
        .await
        .map_err(|e| ServiceError::from(e).naming_reference(|| missing_car(car_id)))?;
    txn.commit().await.map_err(ServiceError::db)?;
    info!(id = created.id, car_id, "created article");
    Ok(created)
}

/// Replace title, content and car of an article. A missing article wins over
/// a dangling `car_id`: no row is touched, so the foreign key never fires.
pub async fn update_article(
    db: &DatabaseConnection,
    id: i32,
    title: &str,
    content: &str,
    car_id: i32,
) -> Result<article::Model, ServiceError> {
    article::validate(title, content)?;
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let res = article::Entity::update_many()
        .col_expr(article::Column::Title, Expr::value(title))
        .col_expr(article::Column::Content, Expr::value(content))
        .col_expr(article::Column::CarId, Expr::value(car_id))
        .filter(article::Column::Id.eq(id))
        .exec(&txn)
        .await
        .map_err(|e| ServiceError::db(e).naming_reference(|| missing_car(car_id)))?;
    if res.rows_affected == 0 {
        txn.rollback().await.map_err(ServiceError::db)?;
        return Err(ServiceError::not_found("article", id));
    }
    let updated = article::Entity::find_by_id(id)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("article", id))?;
    txn.commit().await.map_err(ServiceError::db)?;
    info!(id, car_id, "updated article");
    Ok(updated)
}

/// Delete an article; returns true if deleted.
pub async fn delete_article(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let res = article::Entity::delete_by_id(id).exec(db).await.map_err(ServiceError::db)?;
    if res.rows_affected > 0 {
        info!(id, "deleted article");
    }
    Ok(res.rows_affected > 0)
}
