//! # newsgraph
//!
//! Imports a CSV export of news articles into a deduplicated graph of tags,
//! locations, articles and actors.
//!
//! ## Usage
//!
//! ```text
//! # Import a CSV file
//! newsgraph import articles.csv
//!
//! # Group by a different actor column
//! newsgraph import articles.csv --actor-column person
//!
//! # Re-run only the actor -> article back-reference pass
//! newsgraph link
//!
//! # Show stored entity counts
//! newsgraph stats
//!
//! # Print every stored article as JSON lines
//! newsgraph dump article
//! ```
//!
//! ## Configuration
//!
//! - `DATABASE_PATH`: SQLite database file (default: "newsgraph.db")
//! - `LOG_DIR`: directory for daily log files (default: "logs")
//! - `ACTOR_COLUMN`: CSV column holding actor names (default: "actor")
//! - `RUST_LOG`: overrides the stdout log filter
//!
//! Only one import may run against a database at a time.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use newsgraph::db::Database;
use newsgraph::entity::{normalize, EntityKind, Location};
use newsgraph::environment;
use newsgraph::export::export_collection;
use newsgraph::import::{import_csv_file, relink_all, ImportOptions};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// SQLite database file, overrides DATABASE_PATH
    #[arg(short, long, global = true)]
    database: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a CSV file of articles
    Import {
        /// Path to the CSV file
        csv: PathBuf,

        /// Column holding the actor name, overrides ACTOR_COLUMN
        #[arg(short, long)]
        actor_column: Option<String>,
    },

    /// Write actor ids onto every article their actors reference
    Link,

    /// Display stored entity counts
    Stats,

    /// Print every entity of one collection as JSON lines
    Dump {
        /// Collection: tag, location, article or actor
        kind: EntityKind,
    },

    /// Print the canonical key for a tag or location
    Normalize {
        /// Free text to normalize
        text: String,
    },

    /// Set the latitude/longitude of a stored location
    Geolocate {
        /// Location name, normalized before lookup
        #[arg(short, long)]
        location: String,

        /// Latitude
        #[arg(long, allow_hyphen_values = true, value_parser = parse_coordinate)]
        lat: f64,

        /// Longitude
        #[arg(long, allow_hyphen_values = true, value_parser = parse_coordinate)]
        lon: f64,
    },
}

fn parse_coordinate(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{}", e))?;
    if !value.is_finite() {
        return Err(format!("'{}' is not a finite number", raw));
    }
    Ok(value)
}

async fn open_database(database_path: &str) -> Result<Database> {
    Database::new(database_path)
        .await
        .with_context(|| format!("Failed to open database {}", database_path))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    newsgraph::logging::configure_logging(&environment::log_dir());

    let database_path = cli.database.unwrap_or_else(environment::database_path);

    match cli.command {
        Commands::Import { csv, actor_column } => {
            let db = open_database(&database_path).await?;
            let options = ImportOptions {
                actor_column: actor_column.unwrap_or_else(environment::actor_column),
            };
            info!("Importing {} into {}", csv.display(), database_path);
            let summary = import_csv_file(&db, &csv, &options).await?;
            println!("{}", summary);
        }

        Commands::Link => {
            let db = open_database(&database_path).await?;
            let stats = relink_all(&db).await?;
            println!(
                "actors: {}, pairs checked: {}, back-references added: {}",
                stats.actors, stats.pairs_checked, stats.references_added
            );
        }

        Commands::Stats => {
            let db = open_database(&database_path).await?;
            let counts = db.collect_stats().await?;
            for kind in [
                EntityKind::Tag,
                EntityKind::Location,
                EntityKind::Article,
                EntityKind::Actor,
            ] {
                println!("{}: {}", kind, counts.get(kind));
            }
        }

        Commands::Dump { kind } => {
            let db = open_database(&database_path).await?;
            for value in export_collection(&db, kind).await? {
                println!("{}", value);
            }
        }

        Commands::Normalize { text } => {
            println!("{}", normalize(&text));
        }

        Commands::Geolocate { location, lat, lon } => {
            let db = open_database(&database_path).await?;
            let name = normalize(&location);
            let Some(stored) = db.find_reference::<Location>(&name).await? else {
                bail!("No location named {}", name);
            };
            if !db.set_location_geolocation(&stored.id, [lat, lon]).await? {
                bail!("Location {} ({}) disappeared before it could be updated", name, stored.id);
            }
            println!("{} ({}) -> [{}, {}]", stored.name, stored.id, lat, lon);
        }
    }

    Ok(())
}
