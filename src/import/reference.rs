use anyhow::{Context, Result};
use std::collections::BTreeSet;
use tracing::{debug, info};

use super::TARGET_IMPORT;
use crate::db::{Database, ReferenceRecord};

/// Make sure every canonical name has exactly one stored entity.
///
/// Names are checked one at a time in sorted order and created only when no
/// entity with that exact name exists. Returns the whole collection as stored
/// after the call. The first store failure aborts; entities created before it
/// are kept.
pub async fn upsert_references<T: ReferenceRecord>(
    db: &Database,
    names: &BTreeSet<String>,
) -> Result<Vec<T>> {
    let mut created = 0;

    for name in names {
        let existing = db
            .find_reference::<T>(name)
            .await
            .with_context(|| format!("Failed to look up {} '{}'", T::KIND, name))?;

        if existing.is_some() {
            debug!(target: TARGET_IMPORT, "{} '{}' already exists", T::KIND, name);
            continue;
        }

        db.insert_reference::<T>(name)
            .await
            .with_context(|| format!("Failed to create {} '{}'", T::KIND, name))?;
        created += 1;
    }

    let current = db
        .all_references::<T>()
        .await
        .with_context(|| format!("Failed to load {} collection", T::KIND))?;

    info!(
        target: TARGET_IMPORT,
        "{}: {} candidates, {} created, {} stored",
        T::KIND,
        names.len(),
        created,
        current.len()
    );

    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::core::test_support::temp_database;
    use crate::entity::{Location, Tag};

    fn names(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[tokio::test]
    async fn test_upsert_twice_creates_one_entity_per_name() {
        let (db, _dir) = temp_database().await;
        let candidates = names(&["CRIME", "POLITICS"]);

        let first: Vec<Tag> = upsert_references(&db, &candidates).await.unwrap();
        let second: Vec<Tag> = upsert_references(&db, &candidates).await.unwrap();

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_result_includes_previously_stored_entities() {
        let (db, _dir) = temp_database().await;

        let paris: Vec<Location> = upsert_references(&db, &names(&["PARIS"])).await.unwrap();
        let both: Vec<Location> = upsert_references(&db, &names(&["LYON"])).await.unwrap();

        assert_eq!(both.len(), 2);
        assert!(both.contains(&paris[0]));
        assert!(both.iter().any(|l| l.name == "LYON"));
    }

    #[tokio::test]
    async fn test_empty_candidate_set() {
        let (db, _dir) = temp_database().await;
        let tags: Vec<Tag> = upsert_references(&db, &BTreeSet::new()).await.unwrap();
        assert!(tags.is_empty());
    }
}
