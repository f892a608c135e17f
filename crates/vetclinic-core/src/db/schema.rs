//! SQLite schema definition.

/// Schema revision written to `schema_meta`.
pub const SCHEMA_VERSION: i64 = 2;

/// Complete database schema for the clinic.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS app_patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,         -- assigned on insert, never reused
    name TEXT NOT NULL,
    type TEXT NOT NULL DEFAULT 'OTHER',           -- PatientType symbol
    custom_type TEXT,                             -- only for type = 'OTHER'
    sex TEXT NOT NULL DEFAULT 'UNKNOWN',          -- Sex symbol
    age_years INTEGER NOT NULL DEFAULT 0 CHECK (age_years >= 0),
    comment TEXT
);

-- ============================================================================
-- Schema Metadata
-- ============================================================================

CREATE TABLE IF NOT EXISTS schema_meta (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    schema_version INTEGER NOT NULL
);

INSERT OR IGNORE INTO schema_meta (id, schema_version) VALUES (1, 2);
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_valid() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.execute_batch(SCHEMA);
        assert!(result.is_ok(), "Schema should be valid SQL: {:?}", result);
    }

    #[test]
    fn test_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let version: i64 = conn
            .query_row("SELECT schema_version FROM schema_meta", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
    }

    #[test]
    fn test_autoincrement_ids() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        conn.execute("INSERT INTO app_patients (name) VALUES ('a')", [])
            .unwrap();
        let first = conn.last_insert_rowid();
        conn.execute("DELETE FROM app_patients WHERE id = ?", [first])
            .unwrap();
        conn.execute("INSERT INTO app_patients (name) VALUES ('b')", [])
            .unwrap();
        let second = conn.last_insert_rowid();

        assert_eq!(first, 1);
        assert!(second > first, "ids must not be reused");
    }

    #[test]
    fn test_negative_age_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();

        let result = conn.execute(
            "INSERT INTO app_patients (name, age_years) VALUES ('a', -1)",
            [],
        );
        assert!(result.is_err());
    }
}
