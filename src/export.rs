use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;

use crate::db::Database;
use crate::entity::{EntityKind, Location, Tag};

fn to_values<T: Serialize>(entities: &[T]) -> Result<Vec<Value>> {
    entities
        .iter()
        .map(|entity| serde_json::to_value(entity).context("Failed to serialize entity"))
        .collect()
}

/// Every stored entity of one collection as JSON objects
pub async fn export_collection(db: &Database, kind: EntityKind) -> Result<Vec<Value>> {
    let values = match kind {
        EntityKind::Tag => to_values(&db.all_references::<Tag>().await?)?,
        EntityKind::Location => to_values(&db.all_references::<Location>().await?)?,
        EntityKind::Article => to_values(&db.all_articles().await?)?,
        EntityKind::Actor => to_values(&db.all_actors().await?)?,
    };

    Ok(values)
}
