//! SQLite storage implementation
//!
//! This module provides a SQLite-backed [`ResultSink`].

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ResultSink, StorageError, StorageResult};
use crate::storage::PageRecord;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite storage backend
///
/// The connection sits behind a mutex so the sink can be shared by every
/// worker in a wave.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
    table: String,
}

impl SqliteStorage {
    /// Opens or creates the results database
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    /// * `table` - Name of the results table (a validated SQL identifier)
    pub fn new(path: &Path, table: &str) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn, table)?;

        Ok(Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
        })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory(table: &str) -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn, table)?;
        Ok(Self {
            conn: Mutex::new(conn),
            table: table.to_string(),
        })
    }

    /// Name of the results table
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Loads every stored record in insertion order
    pub fn load_records(&self) -> StorageResult<Vec<PageRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT url, source_url, depth, title, links, topic FROM {} ORDER BY id",
            self.table
        ))?;

        let records = stmt
            .query_map([], |row| {
                Ok(PageRecord {
                    url: row.get(0)?,
                    source_url: row.get(1)?,
                    depth: row.get(2)?,
                    title: row.get(3)?,
                    links: row.get(4)?,
                    topic: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Counts stored records
    pub fn count_records(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Counts distinct URLs among stored records
    pub fn count_unique_urls(&self) -> StorageResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row(
            &format!("SELECT COUNT(DISTINCT url) FROM {}", self.table),
            [],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// Gets record counts per topic, most frequent first
    pub fn get_topic_breakdown(&self) -> StorageResult<Vec<(String, u64)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT topic, COUNT(*) AS n FROM {} GROUP BY topic ORDER BY n DESC, topic",
            self.table
        ))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows)
    }

    /// Gets record counts per depth
    pub fn get_depth_breakdown(&self) -> StorageResult<BTreeMap<u32, u64>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT depth, COUNT(*) FROM {} GROUP BY depth",
            self.table
        ))?;

        let mut breakdown = BTreeMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, u32>(0)?, row.get::<_, i64>(1)? as u64))
        })?;
        for row in rows {
            let (depth, count) = row?;
            breakdown.insert(depth, count);
        }

        Ok(breakdown)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StorageError::Database("connection mutex poisoned".to_string()))
    }
}

impl ResultSink for SqliteStorage {
    fn insert(&self, record: &PageRecord) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let conn = self.lock()?;
        conn.execute(
            &format!(
                "INSERT INTO {} (url, source_url, depth, title, links, topic, recorded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                self.table
            ),
            params![
                record.url,
                record.source_url,
                record.depth,
                record.title,
                record.links,
                record.topic,
                now
            ],
        )?;
        Ok(())
    }
}
