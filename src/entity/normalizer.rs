use std::ops::RangeInclusive;
use tracing::trace;
use unicode_normalization::UnicodeNormalization;

use super::TARGET_ENTITY;

// Combining Diacritical Marks block
const COMBINING_MARKS: RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Canonicalize a free-text tag or location into its identity key.
///
/// Diacritics are dropped, the text is uppercased and trimmed, each run of
/// whitespace becomes a single `_` and commas are removed, so
/// `"café, Paris"` becomes `"CAFE_PARIS"`. Empty input stays empty.
pub fn normalize(raw: &str) -> String {
    // Marks are stripped after case mapping so the output is a fixed point.
    let stripped = raw
        .to_uppercase()
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .collect::<String>();

    let normalized = stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace(',', "");

    trace!(target: TARGET_ENTITY, "Normalized '{}' to '{}'", raw, normalized);
    normalized
}

/// Normalize an optional field, treating empty values as absent
pub fn normalize_field(raw: Option<&str>) -> Option<String> {
    raw.map(normalize).filter(|key| !key.is_empty())
}
