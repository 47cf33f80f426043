use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use super::types::LinkStats;
use super::TARGET_IMPORT;
use crate::db::Database;
use crate::entity::Actor;

/// Write each actor's id onto every article in its article set.
///
/// An article that already lists the actor is left untouched, so running this
/// again over the same associations writes nothing. An article id that does
/// not exist is a referential inconsistency and fails the run.
pub async fn link_actors_to_articles(db: &Database, actors: &[Actor]) -> Result<LinkStats> {
    let mut stats = LinkStats {
        actors: actors.len(),
        ..Default::default()
    };

    for actor in actors {
        for article_id in &actor.article_ids {
            stats.pairs_checked += 1;

            let Some(mut article) = db
                .find_article_by_id(article_id)
                .await
                .with_context(|| format!("Failed to load article {}", article_id))?
            else {
                bail!(
                    "Actor '{}' ({}) references missing article {}",
                    actor.name,
                    actor.id,
                    article_id
                );
            };

            if article.mentions(&actor.id) {
                continue;
            }

            article.actors_mentioned.push(actor.id.clone());
            db.update_article_actors_mentioned(&article.id, &article.actors_mentioned)
                .await
                .with_context(|| {
                    format!("Failed to link actor {} to article {}", actor.id, article.id)
                })?;
            debug!(target: TARGET_IMPORT, "Linked actor '{}' to article {}", actor.name, article.url);
            stats.references_added += 1;
        }
    }

    info!(
        target: TARGET_IMPORT,
        "Back-references: {} actors, {} pairs checked, {} added",
        stats.actors,
        stats.pairs_checked,
        stats.references_added
    );

    Ok(stats)
}
