//! Database layer for the clinic.

mod patients;
mod schema;

#[allow(unused_imports)]
pub use patients::*;
pub use schema::*;

use rusqlite::Connection;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Database errors.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cannot decode column {column}: unknown value {value:?}")]
    Decode { column: &'static str, value: String },

    #[error("Constraint violation: {0}")]
    Constraint(String),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open database at path, creating if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        debug!(path = %path.as_ref().display(), "opening clinic database");
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema and check its revision.
    fn initialize(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        let version = self.schema_version()?;
        if version != SCHEMA_VERSION {
            return Err(DbError::Constraint(format!(
                "Unsupported schema version {} (expected {})",
                version, SCHEMA_VERSION
            )));
        }
        Ok(())
    }

    /// Schema revision stored in the file.
    pub fn schema_version(&self) -> DbResult<i64> {
        Ok(self
            .conn
            .query_row("SELECT schema_version FROM schema_meta WHERE id = 1", [], |row| {
                row.get(0)
            })?)
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }
}
