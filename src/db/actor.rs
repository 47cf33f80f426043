use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error, instrument};

use super::core::{decode_ids, encode_ids, new_id, Database};
use crate::entity::Actor;
use crate::TARGET_DB;

fn actor_from_row(row: &SqliteRow) -> Result<Actor, sqlx::Error> {
    let article_ids: String = row.try_get("article_ids")?;

    Ok(Actor {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        article_ids: decode_ids(&article_ids)?,
    })
}

impl Database {
    /// Look up an actor by exact name
    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn find_actor_by_name(&self, name: &str) -> Result<Option<Actor>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM actors WHERE name = ?1")
            .bind(name)
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(actor_from_row).transpose()
    }

    /// Insert a new actor with a generated id
    #[instrument(target = "db", level = "debug", skip(self, article_ids))]
    pub async fn insert_actor(
        &self,
        name: &str,
        article_ids: &[String],
    ) -> Result<Actor, sqlx::Error> {
        let id = new_id();
        let encoded = encode_ids(article_ids)?;

        match sqlx::query("INSERT INTO actors (id, name, article_ids) VALUES (?1, ?2, ?3)")
            .bind(&id)
            .bind(name)
            .bind(encoded)
            .execute(self.pool())
            .await
        {
            Ok(_) => {
                debug!(target: TARGET_DB, "Actor added: {} with id {}", name, id);
                Ok(Actor {
                    id,
                    name: name.to_string(),
                    article_ids: article_ids.to_vec(),
                })
            }
            Err(err) => {
                error!(target: TARGET_DB, "Failed to add actor {}: {}", name, err);
                Err(err)
            }
        }
    }

    /// Replace only the article_ids set of an actor
    #[instrument(target = "db", level = "debug", skip(self, article_ids))]
    pub async fn update_actor_article_ids(
        &self,
        actor_id: &str,
        article_ids: &[String],
    ) -> Result<(), sqlx::Error> {
        let encoded = encode_ids(article_ids)?;

        let result = sqlx::query(
            r#"
            UPDATE actors
            SET article_ids = ?1
            WHERE id = ?2
            "#,
        )
        .bind(encoded)
        .bind(actor_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    /// Every stored actor, ordered by name
    pub async fn all_actors(&self) -> Result<Vec<Actor>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM actors ORDER BY name")
            .fetch_all(self.pool())
            .await?;

        rows.iter().map(actor_from_row).collect()
    }
}
