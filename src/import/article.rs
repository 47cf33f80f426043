use anyhow::{Context, Result};
use tracing::{debug, info};

use super::types::ImportRow;
use super::TARGET_IMPORT;
use crate::db::Database;
use crate::entity::Article;

/// Store one article per distinct url.
///
/// The first row seen for a url wins: a url already stored, by this call or an
/// earlier import, is never updated. Returns every stored article.
pub async fn upsert_articles(db: &Database, rows: &[ImportRow]) -> Result<Vec<Article>> {
    let mut created = 0;

    for row in rows {
        let existing = db
            .find_article_by_url(&row.url)
            .await
            .with_context(|| format!("Failed to look up article {}", row.url))?;

        if existing.is_some() {
            debug!(target: TARGET_IMPORT, "Article already stored, skipping: {}", row.url);
            continue;
        }

        db.insert_article(&row.to_new_article())
            .await
            .with_context(|| format!("Failed to create article {}", row.url))?;
        created += 1;
    }

    let current = db
        .all_articles()
        .await
        .context("Failed to load article collection")?;

    info!(
        target: TARGET_IMPORT,
        "ARTICLE: {} rows, {} created, {} stored",
        rows.len(),
        created,
        current.len()
    );

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::core::test_support::temp_database;
    use crate::import::types::EntityRef;

    fn row(url: &str, headline: &str) -> ImportRow {
        ImportRow {
            url: url.to_string(),
            headline: Some(headline.to_string()),
            tag: Some(EntityRef::Id("tag-1".to_string())),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_same_url_twice_keeps_first_values() {
        let (db, _dir) = temp_database().await;

        let first = upsert_articles(&db, &[row("u1", "First")]).await.unwrap();
        let second = upsert_articles(&db, &[row("u1", "Second")]).await.unwrap();

        assert_eq!(first.len(), 1);
        assert_eq!(second, first);
        assert_eq!(second[0].headline.as_deref(), Some("First"));
        assert_eq!(second[0].tags, vec!["tag-1".to_string()]);
    }

    #[tokio::test]
    async fn test_duplicate_url_within_one_batch() {
        let (db, _dir) = temp_database().await;

        let articles = upsert_articles(&db, &[row("u1", "First"), row("u1", "Later"), row("u2", "Other")])
            .await
            .unwrap();

        assert_eq!(articles.len(), 2);
        let u1 = articles.iter().find(|a| a.url == "u1").unwrap();
        assert_eq!(u1.headline.as_deref(), Some("First"));
    }
}
