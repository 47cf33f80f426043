use std::collections::BTreeSet;
use std::fmt;

use crate::entity::NewArticle;

/// A tag or location reference on a row, before and after resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityRef {
    /// Canonical name as read from the source
    Name(String),
    /// Identifier of the stored entity with that name
    Id(String),
}

impl EntityRef {
    pub fn resolved_id(&self) -> Option<&str> {
        match self {
            EntityRef::Id(id) => Some(id),
            EntityRef::Name(_) => None,
        }
    }
}

/// One record of the tabular source
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportRow {
    pub publication_date: Option<String>,
    pub source_name: Option<String>,
    pub headline: Option<String>,
    pub url: String,
    pub author: Option<String>,
    pub coverage_level: Option<String>,
    pub tag: Option<EntityRef>,
    pub location: Option<EntityRef>,
    pub actor: Option<String>,
}

impl ImportRow {
    /// Article fields for this row. Only resolved references are kept, and at
    /// most one tag is stored per article.
    pub fn to_new_article(&self) -> NewArticle {
        NewArticle {
            publication_date: self.publication_date.clone(),
            source_name: self.source_name.clone(),
            headline: self.headline.clone(),
            url: self.url.clone(),
            author: self.author.clone(),
            coverage_level: self.coverage_level.clone(),
            tags: self
                .tag
                .as_ref()
                .and_then(EntityRef::resolved_id)
                .map(|id| vec![id.to_string()])
                .unwrap_or_default(),
            location: self
                .location
                .as_ref()
                .and_then(EntityRef::resolved_id)
                .map(str::to_string),
        }
    }
}

/// Distinct canonical names seen while reading the source
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameAccumulator {
    pub tags: BTreeSet<String>,
    pub locations: BTreeSet<String>,
}

/// Everything read from the source, handed over once the stream has ended
#[derive(Debug, Clone, Default)]
pub struct IngestBatch {
    pub rows: Vec<ImportRow>,
    pub names: NameAccumulator,
    pub skipped: usize,
}

/// Outcome of the back-reference pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    pub actors: usize,
    pub pairs_checked: usize,
    pub references_added: usize,
}

/// Outcome of a full import run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub rows_read: usize,
    pub rows_skipped: usize,
    pub tags: usize,
    pub locations: usize,
    pub articles: usize,
    pub actor_groups: usize,
    pub actors: usize,
    pub links: LinkStats,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows read: {}, skipped: {}, tags: {}, locations: {}, articles: {}, actor groups: {}, actors: {}, back-references added: {}",
            self.rows_read,
            self.rows_skipped,
            self.tags,
            self.locations,
            self.articles,
            self.actor_groups,
            self.actors,
            self.links.references_added
        )
    }
}
