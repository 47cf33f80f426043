use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Collections maintained by the importer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Tag,
    Location,
    Article,
    Actor,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Tag => write!(f, "TAG"),
            EntityKind::Location => write!(f, "LOCATION"),
            EntityKind::Article => write!(f, "ARTICLE"),
            EntityKind::Actor => write!(f, "ACTOR"),
        }
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().trim_end_matches('S') {
            "TAG" => Ok(EntityKind::Tag),
            "LOCATION" => Ok(EntityKind::Location),
            "ARTICLE" => Ok(EntityKind::Article),
            "ACTOR" => Ok(EntityKind::Actor),
            _ => Err(format!(
                "unknown collection '{}', expected tag, location, article or actor",
                s
            )),
        }
    }
}

/// Topic label attached to articles, keyed by canonical name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
}

/// Place an article is about, keyed by canonical name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub id: String,
    pub name: String,

    // Latitude/longitude pair, only ever set explicitly
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geolocation: Option<[f64; 2]>,
}

/// A news article, unique by url
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub publication_date: Option<String>,
    pub source_name: Option<String>,
    pub headline: Option<String>,
    pub url: String,
    pub author: Option<String>,
    pub coverage_level: Option<String>,

    // Holds at most one tag id per article
    pub tags: Vec<String>,
    pub location: Option<String>,

    // Actor ids, no duplicates
    pub actors_mentioned: Vec<String>,
}

impl Article {
    pub fn mentions(&self, actor_id: &str) -> bool {
        self.actors_mentioned.iter().any(|id| id == actor_id)
    }
}

/// Field values for an article that has not been stored yet
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewArticle {
    pub publication_date: Option<String>,
    pub source_name: Option<String>,
    pub headline: Option<String>,
    pub url: String,
    pub author: Option<String>,
    pub coverage_level: Option<String>,
    pub tags: Vec<String>,
    pub location: Option<String>,
}

/// A person or organization mentioned across articles, unique by name
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    pub name: String,

    // Article ids, no duplicates, only ever grows
    pub article_ids: Vec<String>,
}

/// Union of two id sets. Keeps the order of `existing`, then appends unseen
/// ids from `incoming` in their order.
pub fn union_ids(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(existing.len() + incoming.len());
    for id in existing.iter().chain(incoming.iter()) {
        if !merged.contains(id) {
            merged.push(id.clone());
        }
    }
    merged
}
