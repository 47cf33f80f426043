use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

use super::types::ImportRow;
use super::TARGET_IMPORT;
use crate::db::Database;
use crate::entity::{union_ids, Actor, Article};

/// Group rows by actor name. Rows without an actor belong to no group.
pub fn group_by_actor(rows: &[ImportRow]) -> BTreeMap<&str, Vec<&ImportRow>> {
    let mut groups: BTreeMap<&str, Vec<&ImportRow>> = BTreeMap::new();
    let mut without_actor = 0;

    for row in rows {
        match row.actor.as_deref() {
            Some(actor) => groups.entry(actor).or_default().push(row),
            None => without_actor += 1,
        }
    }

    if without_actor > 0 {
        debug!(target: TARGET_IMPORT, "{} rows have no actor", without_actor);
    }

    groups
}

/// Create or extend one actor per group.
///
/// Each group's urls are mapped to the ids in `articles`. A new actor gets
/// that id set; an existing actor gets the union of its stored set and the new
/// one, so associations are never dropped. Returns every stored actor.
pub async fn upsert_actors(
    db: &Database,
    groups: &BTreeMap<&str, Vec<&ImportRow>>,
    articles: &[Article],
) -> Result<Vec<Actor>> {
    let article_ids_by_url: HashMap<&str, &str> = articles
        .iter()
        .map(|a| (a.url.as_str(), a.id.as_str()))
        .collect();

    let mut created = 0;
    let mut extended = 0;

    for (name, rows) in groups {
        let mut article_ids: Vec<String> = Vec::with_capacity(rows.len());
        for row in rows {
            match article_ids_by_url.get(row.url.as_str()) {
                Some(id) => article_ids.push(id.to_string()),
                None => warn!(
                    target: TARGET_IMPORT,
                    "No stored article for {} (actor {})", row.url, name
                ),
            }
        }
        let article_ids = union_ids(&[], &article_ids);

        let existing = db
            .find_actor_by_name(name)
            .await
            .with_context(|| format!("Failed to look up actor '{}'", name))?;

        match existing {
            None => {
                db.insert_actor(name, &article_ids)
                    .await
                    .with_context(|| format!("Failed to create actor '{}'", name))?;
                created += 1;
            }
            Some(actor) => {
                let merged = union_ids(&actor.article_ids, &article_ids);
                if merged.len() == actor.article_ids.len() {
                    debug!(target: TARGET_IMPORT, "Actor '{}' already has all {} articles", name, merged.len());
                    continue;
                }

                db.update_actor_article_ids(&actor.id, &merged)
                    .await
                    .with_context(|| format!("Failed to update actor '{}'", name))?;
                debug!(
                    target: TARGET_IMPORT,
                    "Actor '{}' extended from {} to {} articles",
                    name,
                    actor.article_ids.len(),
                    merged.len()
                );
                extended += 1;
            }
        }
    }

    let current = db
        .all_actors()
        .await
        .context("Failed to load actor collection")?;

    info!(
        target: TARGET_IMPORT,
        "ACTOR: {} groups, {} created, {} extended, {} stored",
        groups.len(),
        created,
        extended,
        current.len()
    );

    Ok(current)
}
