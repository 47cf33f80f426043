use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::HashMap;
use std::io::Read;
use tracing::{debug, info, warn};

use super::types::{EntityRef, ImportRow, IngestBatch};
use super::TARGET_IMPORT;
use crate::entity::normalize_field;

// Source column names. Where several are listed the first non-empty wins.
const COL_PUBLICATION_DATE: &[&str] = &["publicationDate"];
const COL_SOURCE_NAME: &[&str] = &["name", "sourceName"];
const COL_HEADLINE: &[&str] = &["Headline", "headline"];
const COL_URL: &[&str] = &["url"];
const COL_AUTHOR: &[&str] = &["author"];
const COL_COVERAGE_LEVEL: &[&str] = &["coverageLevel"];
const COL_TAGS: &[&str] = &["tags"];
const COL_LOCATION: &[&str] = &["location"];

/// Column positions resolved from the header record
struct Columns {
    positions: HashMap<String, usize>,
    actor: String,
}

impl Columns {
    fn new(headers: &StringRecord, actor_column: &str) -> Self {
        let positions = headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.to_string(), idx))
            .collect();

        Self {
            positions,
            actor: actor_column.to_string(),
        }
    }

    fn value(&self, record: &StringRecord, names: &[&str]) -> Option<String> {
        names
            .iter()
            .filter_map(|name| self.positions.get(*name))
            .filter_map(|idx| record.get(*idx))
            .find(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn actor(&self, record: &StringRecord) -> Option<String> {
        self.value(record, &[self.actor.as_str()])
    }
}

/// Read every record of a CSV source.
///
/// Tags and locations are normalized as each row arrives and their distinct
/// canonical names collected. Rows without a url are skipped. The batch is
/// only returned once the source is exhausted, so nothing downstream starts
/// on a partial read.
pub fn read_rows<R: Read>(source: R, actor_column: &str) -> Result<IngestBatch> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(source);

    let headers = reader.headers().context("Failed to read CSV header")?.clone();
    let columns = Columns::new(&headers, actor_column);

    if !columns.positions.contains_key(COL_URL[0]) {
        warn!(target: TARGET_IMPORT, "Source has no '{}' column, every row will be skipped", COL_URL[0]);
    }
    if !columns.positions.contains_key(actor_column) {
        warn!(target: TARGET_IMPORT, "Source has no '{}' column, no actors will be imported", actor_column);
    }

    let mut batch = IngestBatch::default();

    for (index, record) in reader.records().enumerate() {
        // Header is line 1
        let line = index + 2;
        let record = record.with_context(|| format!("Malformed CSV record at line {}", line))?;

        let Some(url) = columns.value(&record, COL_URL) else {
            warn!(target: TARGET_IMPORT, "Skipping line {}: no url", line);
            batch.skipped += 1;
            continue;
        };

        let tag = normalize_field(columns.value(&record, COL_TAGS).as_deref());
        if let Some(tag) = &tag {
            batch.names.tags.insert(tag.clone());
        }

        let location = normalize_field(columns.value(&record, COL_LOCATION).as_deref());
        if let Some(location) = &location {
            batch.names.locations.insert(location.clone());
        }

        debug!(target: TARGET_IMPORT, "Read line {}: {}", line, url);

        batch.rows.push(ImportRow {
            publication_date: columns.value(&record, COL_PUBLICATION_DATE),
            source_name: columns.value(&record, COL_SOURCE_NAME),
            headline: columns.value(&record, COL_HEADLINE),
            url,
            author: columns.value(&record, COL_AUTHOR),
            coverage_level: columns.value(&record, COL_COVERAGE_LEVEL),
            tag: tag.map(EntityRef::Name),
            location: location.map(EntityRef::Name),
            actor: columns.actor(&record),
        });
    }

    info!(
        target: TARGET_IMPORT,
        "Read {} rows ({} skipped), {} distinct tags, {} distinct locations",
        batch.rows.len(),
        batch.skipped,
        batch.names.tags.len(),
        batch.names.locations.len()
    );

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
publicationDate,name,Headline,url,author,coverageLevel,tags,location,actor
2024-01-02,Gazette,Fire downtown,u1,Ann,local,Crime,\"café, Paris\",Jane Doe
2024-01-03,Herald,Trial begins,u2,,national,crime , Café  Paris,
";

    #[test]
    fn test_reads_rows_and_collects_names() {
        let batch = read_rows(SAMPLE.as_bytes(), "actor").unwrap();

        assert_eq!(batch.rows.len(), 2);
        assert_eq!(batch.skipped, 0);
        assert_eq!(
            batch.names.tags.iter().collect::<Vec<_>>(),
            vec!["CRIME"]
        );
        assert_eq!(
            batch.names.locations.iter().collect::<Vec<_>>(),
            vec!["CAFE_PARIS"]
        );

        let first = &batch.rows[0];
        assert_eq!(first.url, "u1");
        assert_eq!(first.source_name.as_deref(), Some("Gazette"));
        assert_eq!(first.headline.as_deref(), Some("Fire downtown"));
        assert_eq!(first.tag, Some(EntityRef::Name("CRIME".to_string())));
        assert_eq!(first.location, Some(EntityRef::Name("CAFE_PARIS".to_string())));
        assert_eq!(first.actor.as_deref(), Some("Jane Doe"));

        let second = &batch.rows[1];
        assert_eq!(second.author, None);
        assert_eq!(second.actor, None);
    }

    #[test]
    fn test_rows_without_url_are_skipped() {
        let source = "url,tags\n,Crime\nu1,\n";
        let batch = read_rows(source.as_bytes(), "actor").unwrap();

        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.skipped, 1);
        // The skipped row contributes no names
        assert!(batch.names.tags.is_empty());
        assert_eq!(batch.rows[0].tag, None);
    }

    #[test]
    fn test_fallback_columns_and_custom_actor_column() {
        let source = "sourceName,headline,url,person\nWire,Quiet day,u1,John Roe\n";
        let batch = read_rows(source.as_bytes(), "person").unwrap();

        let row = &batch.rows[0];
        assert_eq!(row.source_name.as_deref(), Some("Wire"));
        assert_eq!(row.headline.as_deref(), Some("Quiet day"));
        assert_eq!(row.actor.as_deref(), Some("John Roe"));
    }

    #[test]
    fn test_malformed_record_fails() {
        let source = "url,tags\nu1,Crime,extra\n";
        assert!(read_rows(source.as_bytes(), "actor").is_err());
    }
}
