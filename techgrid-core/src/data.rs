use crate::error::{Result, StoreError};
use crate::model::{AggregatedCount, DetectionRecord, NO_TECHNOLOGY, UNKNOWN_BASE_URL};
use rusqlite::{Connection, OpenFlags, params};
use std::path::Path;
use tracing::debug;

/// Logical database the collection belongs to; also the default file stem.
pub const DB_NAME: &str = "scraped_data";
/// Collection holding one row per detection record.
pub const COLLECTION_NAME: &str = "proctoring";

/// The two reads the dashboard performs against the detection store.
pub trait DetectionSource {
    /// Counts per (Base_URL, Technology), sorted by Base_URL then Technology.
    fn aggregate_counts(&self) -> Result<Vec<AggregatedCount>>;

    /// Every URL recorded for exactly this pair, in store order.
    fn urls_for(&self, base_url: &str, technology: &str) -> Result<Vec<String>>;
}

/// Handle on the detection store. Opened explicitly, passed by reference to
/// whatever reads from it, and closed with [`Database::close`] or on drop.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    /// Opens an existing store read-only. `connection_string` is either a
    /// filesystem path or an SQLite `file:` URI.
    pub fn open(connection_string: &str) -> Result<Self> {
        let connection_string = connection_string.trim();
        if connection_string.is_empty() {
            return Err(StoreError::InvalidConnectionString(
                "connection string is empty".to_string(),
            ));
        }

        let conn = Connection::open_with_flags(
            connection_string,
            OpenFlags::SQLITE_OPEN_READ_ONLY
                | OpenFlags::SQLITE_OPEN_URI
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.execute_batch("PRAGMA query_only = ON;")?;

        debug!(target: "techgrid::store", "opened {} read-only", connection_string);
        Ok(Database { conn })
    }

    /// Creates (or reopens) a writable store with the collection schema in
    /// place. Used to seed fixtures; the dashboard itself only calls `open`.
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {COLLECTION_NAME} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                Base_URL TEXT,
                Technology TEXT,
                URL TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_{COLLECTION_NAME}_pair
                ON {COLLECTION_NAME}(Base_URL, Technology);
            "
        ))?;
        Ok(())
    }

    pub fn insert_detection(&self, record: &DetectionRecord) -> Result<i64> {
        self.conn.execute(
            &format!(
                "INSERT INTO {COLLECTION_NAME} (Base_URL, Technology, URL) VALUES (?1, ?2, ?3)"
            ),
            params![&record.base_url, &record.technology, &record.url],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    pub fn count_detections(&self) -> Result<i64> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {COLLECTION_NAME}"),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| StoreError::from(e))
    }
}

impl DetectionSource for Database {
    fn aggregate_counts(&self) -> Result<Vec<AggregatedCount>> {
        // Missing fields group under the same keys the reshaper expects.
        let mut stmt = self.conn.prepare(&format!(
            "SELECT COALESCE(Base_URL, ?1) AS site, COALESCE(Technology, ?2) AS tech, COUNT(*)
             FROM {COLLECTION_NAME}
             GROUP BY site, tech
             ORDER BY site, tech"
        ))?;

        let counts = stmt
            .query_map(params![UNKNOWN_BASE_URL, NO_TECHNOLOGY], |row| {
                Ok(AggregatedCount {
                    base_url: row.get(0)?,
                    technology: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        debug!(target: "techgrid::store", "aggregated {} (site, technology) pairs", counts.len());
        Ok(counts)
    }

    fn urls_for(&self, base_url: &str, technology: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT URL FROM {COLLECTION_NAME}
             WHERE Base_URL = ?1 AND Technology = ?2 AND URL IS NOT NULL
             ORDER BY id"
        ))?;

        let urls = stmt
            .query_map(params![base_url, technology], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;

        debug!(
            target: "techgrid::store",
            "{} URLs for ({}, {})",
            urls.len(),
            base_url,
            technology
        );
        Ok(urls)
    }
}
