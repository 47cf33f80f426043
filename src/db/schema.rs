use tracing::info;

use super::core::Database;
use crate::TARGET_DB;

impl Database {
    pub(crate) async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.pool().acquire().await?;
        sqlx::query(
            r#"
            -- Reference tables, keyed by canonical name
            CREATE TABLE IF NOT EXISTS tags (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS locations (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                geolocation TEXT -- JSON [lat, lon]
            );

            -- One row per distinct source url
            CREATE TABLE IF NOT EXISTS articles (
                id TEXT PRIMARY KEY,
                publication_date TEXT,
                source_name TEXT,
                headline TEXT,
                url TEXT NOT NULL UNIQUE,
                author TEXT,
                coverage_level TEXT,
                tags TEXT NOT NULL DEFAULT '[]', -- JSON array of tag ids
                location TEXT,
                actors_mentioned TEXT NOT NULL DEFAULT '[]' -- JSON array of actor ids
            );
            CREATE INDEX IF NOT EXISTS idx_articles_location ON articles (location);

            CREATE TABLE IF NOT EXISTS actors (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                article_ids TEXT NOT NULL DEFAULT '[]' -- JSON array of article ids
            );
            "#,
        )
        .execute(&mut *conn)
        .await?;
        info!(target: TARGET_DB, "Tables ensured to exist");

        Ok(())
    }
}
