use sea_orm::{sea_query::Expr, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use tracing::info;
use models::{article, car};
use crate::errors::ServiceError;

/// A car together with the first article written about it.
#[derive(Debug, Clone, PartialEq)]
pub struct CarWithArticle {
    pub car: car::Model,
    pub article: Option<article::Model>,
}

/// List cars in insertion (id) order.
pub async fn list_cars(db: &DatabaseConnection) -> Result<Vec<car::Model>, ServiceError> {
    car::Entity::find()
        .order_by_asc(car::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)
}

/// List cars in id order, each joined with its lowest-id article.
pub async fn list_cars_with_article(db: &DatabaseConnection) -> Result<Vec<CarWithArticle>, ServiceError> {
    let rows = car::Entity::find()
        .find_with_related(article::Entity)
        .order_by_asc(car::Column::Id)
        .order_by_asc(article::Column::Id)
        .all(db)
        .await
        .map_err(ServiceError::db)?;
    Ok(rows
        .into_iter()
        .map(|(car, articles)| CarWithArticle { car, article: articles.into_iter().next() })
        .collect())
}

pub async fn create_car(db: &DatabaseConnection, name: &str, image: &str, description: &str) -> Result<car::Model, ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let created = car::create(&txn, name, image, description).await?;
    txn.commit().await.map_err(ServiceError::db)?;
    info!(id = created.id, name = %created.name, "created car");
    Ok(created)
}

pub async fn update_car(
    db: &DatabaseConnection,
    id: i32,
    name: &str,
    image: &str,
    description: &str,
) -> Result<car::Model, ServiceError> {
    car::validate(name, image, description)?;
    // The UPDATE opens the transaction so SQLite takes the write lock up front.
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let res = car::Entity::update_many()
        .col_expr(car::Column::Name, Expr::value(name))
        .col_expr(car::Column::Image, Expr::value(image))
        .col_expr(car::Column::Description, Expr::value(description))
        .filter(car::Column::Id.eq(id))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    if res.rows_affected == 0 {
        txn.rollback().await.map_err(ServiceError::db)?;
        return Err(ServiceError::not_found("car", id));
    }
    let updated = car::Entity::find_by_id(id)
        .one(&txn)
        .await
        .map_err(ServiceError::db)?
        .ok_or_else(|| ServiceError::not_found("car", id))?;
    txn.commit().await.map_err(ServiceError::db)?;
    info!(id, "updated car");
    Ok(updated)
}

/// Delete a car and every article pointing at it; returns false when the car
/// does not exist, in which case nothing is removed.
pub async fn delete_car(db: &DatabaseConnection, id: i32) -> Result<bool, ServiceError> {
    let txn = db.begin().await.map_err(ServiceError::db)?;
    let articles = article::Entity::delete_many()
        .filter(article::Column::CarId.eq(id))
        .exec(&txn)
        .await
        .map_err(ServiceError::db)?;
    let res = car::Entity::delete_by_id(id).exec(&txn).await.map_err(ServiceError::db)?;
    if res.rows_affected == 0 {
        txn.rollback().await.map_err(ServiceError::db)?;
        return Ok(false);
    }
    txn.commit().await.map_err(ServiceError::db)?;
    info!(id, articles = articles.rows_affected, "deleted car");
    Ok(true)
}
