pub mod normalizer;
pub mod types;

pub use normalizer::{normalize, normalize_field};
pub use types::*;

// Module-level constants
pub const TARGET_ENTITY: &str = "entity";
