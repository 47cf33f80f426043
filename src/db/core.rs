use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    Pool, Sqlite,
};
use std::str::FromStr;
use tokio::time::Duration;
use tracing::{info, instrument};

use crate::entity::EntityKind;
use crate::TARGET_DB;

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Get access to the database pool
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

/// Number of stored entities per collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EntityCounts {
    pub tags: i64,
    pub locations: i64,
    pub articles: i64,
    pub actors: i64,
}

impl EntityCounts {
    pub fn get(&self, kind: EntityKind) -> i64 {
        match kind {
            EntityKind::Tag => self.tags,
            EntityKind::Location => self.locations,
            EntityKind::Article => self.articles,
            EntityKind::Actor => self.actors,
        }
    }
}

impl Database {
    /// Open (creating if needed) the SQLite database at `database_path`
    #[instrument(target = "db", level = "info")]
    pub async fn new(database_path: &str) -> Result<Self, sqlx::Error> {
        info!(target: TARGET_DB, "Creating database pool for: {}", database_path);

        let connect_options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", database_path))?
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5))
                .synchronous(SqliteSynchronous::Normal);

        // The importer is a single writer awaiting each statement in turn.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(connect_options)
            .await?;

        info!(target: TARGET_DB, "Database pool created");

        // Initialize schema
        let db = Database { pool };
        db.initialize_schema().await?;

        Ok(db)
    }

    /// Count stored entities in every collection
    pub async fn collect_stats(&self) -> Result<EntityCounts, sqlx::Error> {
        Ok(EntityCounts {
            tags: self.count_rows("tags").await?,
            locations: self.count_rows("locations").await?,
            articles: self.count_rows("articles").await?,
            actors: self.count_rows("actors").await?,
        })
    }

    async fn count_rows(&self, table: &str) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM {}", table);
        let count: i64 = sqlx::query_scalar(&query).fetch_one(self.pool()).await?;
        Ok(count)
    }
}

/// Serialize an id set into its JSON column form
pub(crate) fn encode_ids(ids: &[String]) -> Result<String, sqlx::Error> {
    serde_json::to_string(ids).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

/// Parse a JSON id set column
pub(crate) fn decode_ids(raw: &str) -> Result<Vec<String>, sqlx::Error> {
    serde_json::from_str(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))
}

/// Generate a fresh entity identifier
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
