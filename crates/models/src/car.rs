use sea_orm::{entity::prelude::*, ConnectionTrait, Set};
use serde::{Deserialize, Serialize};

use crate::{article, errors};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "car")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(100))")]
    pub name: String,
    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub image: String,
    #[sea_orm(column_type = "String(StringLen::N(200))")]
    pub description: String,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation { Article }

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Article => Entity::has_many(article::Entity).into(),
        }
    }
}

impl Related<article::Entity> for Entity {
    fn to() -> RelationDef { Relation::Article.def() }
}

impl ActiveModelBehavior for ActiveModel {}

pub fn validate(name: &str, image: &str, description: &str) -> Result<(), errors::ModelError> {
    errors::required("name", name)?;
    errors::required("image", image)?;
    errors::required("description", description)
}

pub async fn create<C: ConnectionTrait>(
    db: &C,
    name: &str,
    image: &str,
    description: &str,
) -> Result<Model, errors::ModelError> {
    validate(name, image, description)?;
    let am = ActiveModel {
        name: Set(name.to_string()),
        image: Set(image.to_string()),
        description: Set(description.to_string()),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
