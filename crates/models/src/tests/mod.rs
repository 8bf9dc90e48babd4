use sea_orm::DatabaseConnection;

use crate::db::{connect_with_config, ensure_schema, DatabaseConfig};




/// Fresh private in-memory database with the schema applied.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let db = connect_with_config(&DatabaseConfig::in_memory()).await?;
    ensure_schema(&db).await?;
    Ok(db)
}
