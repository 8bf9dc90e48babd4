use sea_orm::{entity::prelude::*, sea_query::ForeignKeyAction, ConnectionTrait, Set};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{car, errors};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "article")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    #[sea_orm(indexed)]
    pub car_id: i32,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Car }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Car => Entity::belongs_to(car::Entity)
                .from(Column::CarId)
                .to(car::Column::Id)
                .on_delete(ForeignKeyAction::Cascade)
                .on_update(ForeignKeyAction::Cascade)
                .into(),
        }
    }
}

impl Related<car::Entity> for Entity {
    fn to() -> RelationDef { Relation::Car.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate(title: &str, content: &str) -> Result<(), errors::ModelError> {
    errors::required("title", title)?;
    errors::required("content", content)
}

/// Insert an article. A `car_id` with no car behind it comes back as
/// [`errors::ModelError::Reference`].
pub async fn create<C: ConnectionTrait>(
    db: &C,
    title: &str,
    content: &str,
    car_id: i32,
) -> Result<Model, errors::ModelError> {
    validate(title, content)?;
    let am = ActiveModel {
        title: Set(title.to_string()),
        content: Set(content.to_string()),
        car_id: Set(car_id),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
