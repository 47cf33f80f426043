//! CSV to entity graph import.
//!
//! Rows are read in full first, then tags and locations are upserted,
//! references on the rows are resolved to ids, articles are upserted by url,
//! actors are grouped and merged, and finally actor ids are written back onto
//! the articles that mention them.

pub mod actor;
pub mod article;
pub mod linker;
pub mod pipeline;
pub mod reader;
pub mod reference;
pub mod resolve;
pub mod types;

#[cfg(test)]
mod tests;

pub use pipeline::{import_csv_file, relink_all, run_import, ImportOptions};
pub use types::*;

// Module-level constants
pub const TARGET_IMPORT: &str = "import";
