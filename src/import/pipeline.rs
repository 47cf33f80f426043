use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{info, instrument};

use super::actor::{group_by_actor, upsert_actors};
use super::article::upsert_articles;
use super::linker::link_actors_to_articles;
use super::reader::read_rows;
use super::reference::upsert_references;
use super::resolve::resolve_identifiers;
use super::types::{ImportSummary, LinkStats};
use super::TARGET_IMPORT;
use crate::db::Database;
use crate::entity::{Location, Tag};

pub const DEFAULT_ACTOR_COLUMN: &str = "actor";

/// Settings for one import run
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Source column holding the actor name rows are grouped by
    pub actor_column: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            actor_column: DEFAULT_ACTOR_COLUMN.to_string(),
        }
    }
}

/// Run the whole import over a CSV source.
///
/// Stages run strictly one after another, each store call awaited before the
/// next, and any failure aborts the rest of the run. Not safe to run
/// concurrently with another import against the same database.
pub async fn run_import<R: Read>(
    db: &Database,
    source: R,
    options: &ImportOptions,
) -> Result<ImportSummary> {
    let batch = read_rows(source, &options.actor_column)?;
    let mut rows = batch.rows;

    let tags: Vec<Tag> = upsert_references(db, &batch.names.tags).await?;
    let locations: Vec<Location> = upsert_references(db, &batch.names.locations).await?;

    resolve_identifiers(&mut rows, &tags, &locations);

    let articles = upsert_articles(db, &rows).await?;

    let groups = group_by_actor(&rows);
    let actors = upsert_actors(db, &groups, &articles).await?;

    let links = link_actors_to_articles(db, &actors).await?;

    let summary = ImportSummary {
        rows_read: rows.len() + batch.skipped,
        rows_skipped: batch.skipped,
        tags: tags.len(),
        locations: locations.len(),
        articles: articles.len(),
        actor_groups: groups.len(),
        actors: actors.len(),
        links,
    };

    info!(target: TARGET_IMPORT, "Import finished: {}", summary);

    Ok(summary)
}

/// Run the import over a CSV file on disk
#[instrument(target = "import", level = "info", skip(db, options))]
pub async fn import_csv_file(
    db: &Database,
    path: &Path,
    options: &ImportOptions,
) -> Result<ImportSummary> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file {}", path.display()))?;

    run_import(db, BufReader::new(file), options)
        .await
        .with_context(|| format!("Import of {} failed", path.display()))
}

/// Re-run only the back-reference pass over every stored actor
pub async fn relink_all(db: &Database) -> Result<LinkStats> {
    let actors = db
        .all_actors()
        .await
        .context("Failed to load actor collection")?;

    link_actors_to_articles(db, &actors).await
}
