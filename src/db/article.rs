use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error, instrument};

use super::core::{decode_ids, encode_ids, new_id, Database};
use crate::entity::{Article, NewArticle};
use crate::TARGET_DB;

fn article_from_row(row: &SqliteRow) -> Result<Article, sqlx::Error> {
    let tags: String = row.try_get("tags")?;
    let actors_mentioned: String = row.try_get("actors_mentioned")?;

    Ok(Article {
        id: row.try_get("id")?,
        publication_date: row.try_get("publication_date")?,
        source_name: row.try_get("source_name")?,
        headline: row.try_get("headline")?,
        url: row.try_get("url")?,
        author: row.try_get("author")?,
        coverage_level: row.try_get("coverage_level")?,
        tags: decode_ids(&tags)?,
        location: row.try_get("location")?,
        actors_mentioned: decode_ids(&actors_mentioned)?,
    })
}

impl Database {
    /// Look up an article by its source url
    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn find_article_by_url(&self, url: &str) -> Result<Option<Article>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM articles WHERE url = ?1")
            .bind(url)
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(article_from_row).transpose()
    }

    /// Look up an article by id
    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn find_article_by_id(&self, article_id: &str) -> Result<Option<Article>, sqlx::Error> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = ?1")
            .bind(article_id)
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(article_from_row).transpose()
    }

    /// Insert a new article with a generated id and no actors mentioned
    #[instrument(target = "db", level = "debug", skip(self, article), fields(url = %article.url))]
    pub async fn insert_article(&self, article: &NewArticle) -> Result<Article, sqlx::Error> {
        let id = new_id();
        let tags = encode_ids(&article.tags)?;

        let result = sqlx::query(
            r#"
            INSERT INTO articles (id, publication_date, source_name, headline, url, author, coverage_level, tags, location, actors_mentioned)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, '[]')
            "#,
        )
        .bind(&id)
        .bind(&article.publication_date)
        .bind(&article.source_name)
        .bind(&article.headline)
        .bind(&article.url)
        .bind(&article.author)
        .bind(&article.coverage_level)
        .bind(&tags)
        .bind(&article.location)
        .execute(self.pool())
        .await;

        match result {
            Ok(_) => {
                debug!(target: TARGET_DB, "Article added: {} with id {}", article.url, id);
                Ok(Article {
                    id,
                    publication_date: article.publication_date.clone(),
                    source_name: article.source_name.clone(),
                    headline: article.headline.clone(),
                    url: article.url.clone(),
                    author: article.author.clone(),
                    coverage_level: article.coverage_level.clone(),
                    tags: article.tags.clone(),
                    location: article.location.clone(),
                    actors_mentioned: Vec::new(),
                })
            }
            Err(err) => {
                error!(target: TARGET_DB, "Failed to add article {}: {}", article.url, err);
                Err(err)
            }
        }
    }

    /// Replace only the actors_mentioned set of an article
    #[instrument(target = "db", level = "debug", skip(self, actors_mentioned))]
    pub async fn update_article_actors_mentioned(
        &self,
        article_id: &str,
        actors_mentioned: &[String],
    ) -> Result<(), sqlx::Error> {
        let encoded = encode_ids(actors_mentioned)?;

        let result = sqlx::query(
            r#"
            UPDATE articles
            SET actors_mentioned = ?1
            WHERE id = ?2
            "#,
        )
        .bind(encoded)
        .bind(article_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            return Err(sqlx::Error::RowNotFound);
        }

        Ok(())
    }

    /// Every stored article, in insertion order
    pub async fn all_articles(&self) -> Result<Vec<Article>, sqlx::Error> {
        let rows = sqlx::query("SELECT * FROM articles ORDER BY rowid")
            .fetch_all(self.pool())
            .await?;

        rows.iter().map(article_from_row).collect()
    }
}
