use std::collections::HashMap;
use tracing::{debug, info};

use super::types::{EntityRef, ImportRow};
use super::TARGET_IMPORT;
use crate::db::ReferenceRecord;
use crate::entity::{Location, Tag};

fn lookup_table<T: ReferenceRecord>(entities: &[T]) -> HashMap<&str, &str> {
    entities.iter().map(|e| (e.name(), e.id())).collect()
}

/// Swap a name reference for its id. Returns false when the name is unknown.
fn resolve(reference: &mut Option<EntityRef>, table: &HashMap<&str, &str>) -> bool {
    let Some(EntityRef::Name(name)) = reference.as_ref() else {
        return true;
    };
    let Some(id) = table.get(name.as_str()) else {
        return false;
    };
    *reference = Some(EntityRef::Id(id.to_string()));
    true
}

/// Replace every row's tag and location name with the stored entity id.
///
/// Rows with no tag or location are left alone, as are names missing from
/// the given collections.
pub fn resolve_identifiers(rows: &mut [ImportRow], tags: &[Tag], locations: &[Location]) {
    let tag_ids = lookup_table(tags);
    let location_ids = lookup_table(locations);
    let mut unresolved = 0;

    for row in rows.iter_mut() {
        if !resolve(&mut row.tag, &tag_ids) {
            debug!(target: TARGET_IMPORT, "No tag entity for {:?} on {}", row.tag, row.url);
            unresolved += 1;
        }
        if !resolve(&mut row.location, &location_ids) {
            debug!(target: TARGET_IMPORT, "No location entity for {:?} on {}", row.location, row.url);
            unresolved += 1;
        }
    }

    info!(
        target: TARGET_IMPORT,
        "Resolved references for {} rows ({} unresolved)",
        rows.len(),
        unresolved
    );
}
