use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;

use super::DatabaseError;

/// Ordered schema steps for the intake ledger.
const MIGRATIONS: &[(i64, &str)] = &[(
    1,
    include_str!("../../resources/migrations/001_intake_ledger.sql"),
)];

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (or create) the ledger database at `path`, migrated to the latest schema.
pub fn open_database(path: &Path) -> Result<Connection, DatabaseError> {
    prepare(Connection::open(path)?)
}

/// Private in-memory ledger database, migrated to the latest schema.
pub fn open_memory_database() -> Result<Connection, DatabaseError> {
    prepare(Connection::open_in_memory()?)
}

fn prepare(conn: Connection) -> Result<Connection, DatabaseError> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    conn.execute_batch("PRAGMA journal_mode=DELETE;")?;
    run_migrations(&conn)?;
    Ok(conn)
}

/// Apply every migration newer than the stored schema version.
///
/// Each step commits on its own, so a failing step leaves the schema at
/// the previous version.
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current = schema_version(conn);

    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        tracing::info!(version, "Migrating intake ledger schema");
        let fail = |e: rusqlite::Error| DatabaseError::MigrationFailed {
            version,
            reason: e.to_string(),
        };
        let tx = conn.unchecked_transaction().map_err(fail)?;
        tx.execute_batch(sql).map_err(fail)?;
        tx.commit().map_err(fail)?;
    }

    Ok(())
}

/// Stored schema version; 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> i64 {
    conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| {
        row.get::<_, Option<i64>>(0)
    })
    .ok()
    .flatten()
    .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .unwrap();
        let names = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        names
    }

    #[test]
    fn fresh_database_has_ledger_tables() {
        let conn = open_memory_database().unwrap();
        assert_eq!(table_names(&conn), vec!["intake_records", "schema_version"]);
        assert_eq!(schema_version(&conn), 1);
    }

    #[test]
    fn unmigrated_database_reports_version_zero() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn), 0);
    }

    #[test]
    fn migration_idempotent() {
        let conn = open_memory_database().unwrap();
        run_migrations(&conn).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn failed_migration_rolls_back() {
        let conn = Connection::open_in_memory().unwrap();
        // a clashing table makes step 1 fail part way through
        conn.execute_batch("CREATE TABLE intake_records (x INTEGER);").unwrap();
        let err = run_migrations(&conn).unwrap_err();
        assert!(matches!(err, DatabaseError::MigrationFailed { version: 1, .. }));
        assert_eq!(table_names(&conn), vec!["intake_records"]);
        assert_eq!(schema_version(&conn), 0);
    }

    #[test]
    fn file_database_reopens_without_remigrating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.db");
        drop(open_database(&path).unwrap());
        let conn = open_database(&path).unwrap();
        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn intake_records_reject_unknown_status() {
        let conn = open_memory_database().unwrap();
        let result = conn.execute(
            "INSERT INTO intake_records (id, schedule_id, medicine_name, dosage,
             scheduled_time, actual_time, date, status)
             VALUES ('x', '1-0', 'A', '1 mg', '08:00', NULL, '2026-01-06', 'lost')",
            [],
        );
        assert!(result.is_err());
    }
}
