use std::env;

pub const DEFAULT_DATABASE_PATH: &str = "newsgraph.db";
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Retrieves an environment variable, falling back to `default` when it is
/// unset or blank.
pub fn get_env_var_or(var: &str, default: &str) -> String {
    env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Path of the SQLite database (`DATABASE_PATH`)
pub fn database_path() -> String {
    get_env_var_or("DATABASE_PATH", DEFAULT_DATABASE_PATH)
}

/// Directory for rolling log files (`LOG_DIR`)
pub fn log_dir() -> String {
    get_env_var_or("LOG_DIR", DEFAULT_LOG_DIR)
}

/// Source column holding actor names (`ACTOR_COLUMN`)
pub fn actor_column() -> String {
    get_env_var_or("ACTOR_COLUMN", crate::import::pipeline::DEFAULT_ACTOR_COLUMN)
}
