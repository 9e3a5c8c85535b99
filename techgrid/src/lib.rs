pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    DB_ENV_VAR, DEFAULT_DB_LOCATION, build_report, load_presence_table, lookup_urls,
    open_database, resolve_connection_string,
};
