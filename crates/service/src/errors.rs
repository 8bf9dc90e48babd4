use models::errors::ModelError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// A foreign key in the request body points at a row that does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),
    #[error("database error: {0}")]
    Db(String),
    #[error("model error: {0}")]
    Model(ModelError),
}

impl From<ModelError> for ServiceError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Reference(msg) => Self::InvalidReference(msg),
            other => Self::Model(other),
        }
    }
}

impl ServiceError {
    pub fn not_found(entity: &str, id: i32) -> Self { Self::NotFound(format!("{} {} not found", entity, id)) }

    pub fn db(e: DbErr) -> Self {
        match e.sql_err() {
            Some(SqlErr::ForeignKeyConstraintViolation(msg)) => Self::InvalidReference(msg),
            _ => Self::Db(e.to_string()),
        }
    }

    /// Swap the store's generic foreign-key message for one naming the
    /// missing row; other errors pass through.
    pub fn naming_reference(self, describe: impl FnOnce() -> String) -> Self {
        match self {
            Self::InvalidReference(_) => Self::InvalidReference(describe()),
            other => other,
        }
    }
}
