#![cfg(test)]
use chrono::{DateTime, FixedOffset};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use models::comment;
use tempfile::TempDir;
use models::db::{connect_with_config, ensure_schema, DatabaseConfig};

/// Fresh in-memory database per test; nothing is shared between tests.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let db = connect_with_config(&DatabaseConfig::in_memory()).await?;
    ensure_schema(&db).await?;
    Ok(db)
}

/// SQLite file in a temp dir behind the default multi-connection pool, so
/// concurrent calls really run side by side. Keep the dir alive for the test.
pub async fn get_file_db() -> Result<(TempDir, DatabaseConnection), anyhow::Error> {
    let dir = TempDir::new()?;
    let path = dir.path().join("cars.db");
    let cfg = DatabaseConfig {
        url: format!("sqlite://{}?mode=rwc", path.display()),
        ..DatabaseConfig::default()
    };
    assert!(cfg.max_connections > 1);
    let db = connect_with_config(&cfg).await?;
    ensure_schema(&db).await?;
    Ok((dir, db))
}

/// Insert a comment with a fixed timestamp and like count, bypassing the
/// service so ordering tests do not depend on the clock.
pub async fn insert_comment_at(
    db: &DatabaseConnection,
    content: &str,
    created_at: &str,
    likes: i32,
    parent_id: Option<i32>,
) -> Result<comment::Model, anyhow::Error> {
    let created_at: DateTime<FixedOffset> = DateTime::parse_from_rfc3339(created_at)?;
    let am = comment::ActiveModel {
        content: Set(content.to_string()),
        author: Set("tester".to_string()),
        created_at: Set(created_at),
        likes: Set(likes),
        parent_id: Set(parent_id),
        ..Default::default()
    };
    Ok(am.insert(db).await?)
}
