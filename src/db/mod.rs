mod actor;
mod article;
pub mod core;
pub mod reference;
mod schema;

// Re-export Database and essential traits
pub use self::core::{Database, EntityCounts};
pub use self::reference::ReferenceRecord;
