pub mod db;
pub mod entity;
pub mod environment;
pub mod export;
pub mod import;
pub mod logging;

pub const TARGET_DB: &str = "db_query";
