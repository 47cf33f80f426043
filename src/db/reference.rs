use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::{debug, error, instrument};

use super::core::{new_id, Database};
use crate::entity::{EntityKind, Location, Tag};
use crate::TARGET_DB;

/// A name-keyed reference collection (tags, locations)
pub trait ReferenceRecord: Sized + Send + Unpin {
    const KIND: EntityKind;
    const TABLE: &'static str;

    fn id(&self) -> &str;
    fn name(&self) -> &str;

    /// Record for a freshly inserted row
    fn created(id: String, name: String) -> Self;

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error>;
}

impl ReferenceRecord for Tag {
    const KIND: EntityKind = EntityKind::Tag;
    const TABLE: &'static str = "tags";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created(id: String, name: String) -> Self {
        Tag { id, name }
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Tag {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
        })
    }
}

impl ReferenceRecord for Location {
    const KIND: EntityKind = EntityKind::Location;
    const TABLE: &'static str = "locations";

    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn created(id: String, name: String) -> Self {
        Location {
            id,
            name,
            geolocation: None,
        }
    }

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let raw: Option<String> = row.try_get("geolocation")?;
        let geolocation = match raw {
            Some(raw) => Some(decode_geolocation(&raw)?),
            None => None,
        };

        Ok(Location {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            geolocation,
        })
    }
}

/// Parse a stored geolocation, which must be exactly two numbers
fn decode_geolocation(raw: &str) -> Result<[f64; 2], sqlx::Error> {
    let values: Vec<f64> =
        serde_json::from_str(raw).map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
    <[f64; 2]>::try_from(values).map_err(|values| {
        sqlx::Error::Decode(
            format!(
                "geolocation must hold exactly 2 numbers, found {}",
                values.len()
            )
            .into(),
        )
    })
}

impl Database {
    /// Look up a reference entity by exact name
    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn find_reference<T: ReferenceRecord>(
        &self,
        name: &str,
    ) -> Result<Option<T>, sqlx::Error> {
        let query = format!("SELECT * FROM {} WHERE name = ?1", T::TABLE);
        let row = sqlx::query(&query)
            .bind(name)
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(T::from_row).transpose()
    }

    /// Insert a reference entity with a freshly generated id
    #[instrument(target = "db", level = "debug", skip(self))]
    pub async fn insert_reference<T: ReferenceRecord>(&self, name: &str) -> Result<T, sqlx::Error> {
        let id = new_id();
        let query = format!("INSERT INTO {} (id, name) VALUES (?1, ?2)", T::TABLE);

        match sqlx::query(&query)
            .bind(&id)
            .bind(name)
            .execute(self.pool())
            .await
        {
            Ok(_) => {
                debug!(target: TARGET_DB, "{} created: {} with id {}", T::KIND, name, id);
                Ok(T::created(id, name.to_string()))
            }
            Err(err) => {
                error!(target: TARGET_DB, "Failed to create {} {}: {}", T::KIND, name, err);
                Err(err)
            }
        }
    }

    /// Every stored entity of one reference collection, ordered by name
    pub async fn all_references<T: ReferenceRecord>(&self) -> Result<Vec<T>, sqlx::Error> {
        let query = format!("SELECT * FROM {} ORDER BY name", T::TABLE);
        let rows = sqlx::query(&query).fetch_all(self.pool()).await?;

        rows.iter().map(T::from_row).collect()
    }

    /// Set the geolocation pair of a stored location
    #[instrument(target = "db", level = "info", skip(self))]
    pub async fn set_location_geolocation(
        &self,
        location_id: &str,
        geolocation: [f64; 2],
    ) -> Result<bool, sqlx::Error> {
        // JSON has no NaN or infinity; they would be stored as null.
        if !geolocation.iter().all(|v| v.is_finite()) {
            return Err(sqlx::Error::Encode(
                format!("geolocation must be finite, got {:?}", geolocation).into(),
            ));
        }

        let encoded =
            serde_json::to_string(&geolocation).map_err(|e| sqlx::Error::Encode(Box::new(e)))?;

        let result = sqlx::query(
            r#"
            UPDATE locations
            SET geolocation = ?1
            WHERE id = ?2
            "#,
        )
        .bind(encoded)
        .bind(location_id)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
