//! Database schema definitions
//!
//! The results table name is configurable, so the schema is rendered per table.

use rusqlite::Connection;

/// Renders the schema for a results table
///
/// `table` must already be validated as a plain SQL identifier.
pub fn schema_sql(table: &str) -> String {
    format!(
        r#"
-- One row per processed page; re-processing after a resume appends again
CREATE TABLE IF NOT EXISTS {table} (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    url TEXT NOT NULL,
    source_url TEXT,
    depth INTEGER NOT NULL,
    title TEXT NOT NULL,
    links TEXT NOT NULL,
    topic TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_{table}_url ON {table}(url);
CREATE INDEX IF NOT EXISTS idx_{table}_topic ON {table}(topic);
"#
    )
}

/// Creates the results table and its indexes if they do not exist
pub fn initialize_schema(conn: &Connection, table: &str) -> Result<(), rusqlite::Error> {
    conn.execute_batch(&schema_sql(table))
}
