use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

/// Create the schema on an open pool. Safe to run repeatedly.
pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    // AUTOINCREMENT keeps ids from being reused after deletes
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            mood TEXT,
            summary TEXT NOT NULL,
            content_json TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date)")
        .execute(pool)
        .await?;

    Ok(())
}

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(&config.db.path).await?;
    migrate(&pool).await?;
    pool.close().await;
    Ok(())
}
