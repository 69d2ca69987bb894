use std::path::Path;
use std::str::FromStr;
use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use super::IntakeRepository;
use crate::db::{open_database, open_memory_database, DatabaseError};
use crate::error::WalletError;
use crate::models::{DoseTime, IntakeId, IntakeRecord, IntakeStatus, ScheduleId};

const SELECT_COLUMNS: &str = "SELECT id, schedule_id, medicine_name, dosage, scheduled_time,
     actual_time, date, status FROM intake_records";

/// Ledger backed by SQLite. Each append is one INSERT; each read is one SELECT.
#[derive(Debug)]
pub struct SqliteLedger {
    conn: Mutex<Connection>,
}

impl SqliteLedger {
    pub fn open(path: &Path) -> Result<Self, WalletError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = open_database(path)?;
        tracing::info!(path = %path.display(), "Opened SQLite intake ledger");
        Ok(Self::from_connection(conn))
    }

    pub fn in_memory() -> Result<Self, WalletError> {
        Ok(Self::from_connection(open_memory_database()?))
    }

    fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, WalletError>,
    ) -> Result<T, WalletError> {
        let conn = self.conn.lock().map_err(|_| WalletError::LockPoisoned)?;
        f(&conn)
    }
}

/// Raw column values before parsing.
struct IntakeRow {
    id: String,
    schedule_id: String,
    medicine_name: String,
    dosage: String,
    scheduled_time: String,
    actual_time: Option<String>,
    date: String,
    status: String,
}

fn intake_row_from_rusqlite(row: &rusqlite::Row<'_>) -> rusqlite::Result<IntakeRow> {
    Ok(IntakeRow {
        id: row.get(0)?,
        schedule_id: row.get(1)?,
        medicine_name: row.get(2)?,
        dosage: row.get(3)?,
        scheduled_time: row.get(4)?,
        actual_time: row.get(5)?,
        date: row.get(6)?,
        status: row.get(7)?,
    })
}

fn intake_from_row(row: IntakeRow) -> Result<IntakeRecord, WalletError> {
    let id = Uuid::parse_str(&row.id)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid intake id: {e}")))?;
    let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d")
        .map_err(|e| DatabaseError::ConstraintViolation(format!("Invalid intake date: {e}")))?;
    let actual_time = match row.actual_time.as_deref() {
        None | Some("") => None,
        Some(t) => Some(DoseTime::from_str(t)?),
    };

    Ok(IntakeRecord {
        id: IntakeId(id),
        schedule_id: ScheduleId::from_str(&row.schedule_id)?,
        medicine_name: row.medicine_name,
        dosage: row.dosage,
        scheduled_time: DoseTime::from_str(&row.scheduled_time)?,
        actual_time,
        date,
        status: IntakeStatus::from_str(&row.status)?,
    })
}

fn collect_records(
    conn: &Connection,
    sql: &str,
    params: &[&dyn rusqlite::types::ToSql],
) -> Result<Vec<IntakeRecord>, WalletError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, intake_row_from_rusqlite)?;

    let mut records = Vec::new();
    for row in rows {
        records.push(intake_from_row(row?)?);
    }
    Ok(records)
}

impl IntakeRepository for SqliteLedger {
    fn append(&self, record: IntakeRecord) -> Result<(), WalletError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO intake_records (id, schedule_id, medicine_name, dosage,
                 scheduled_time, actual_time, date, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    record.id.to_string(),
                    record.schedule_id.to_string(),
                    record.medicine_name,
                    record.dosage,
                    record.scheduled_time.to_string(),
                    record.actual_time.map(|t| t.to_string()),
                    record.date.to_string(),
                    record.status.as_str(),
                ],
            )?;
            Ok(())
        })
    }

    fn query(
        &self,
        schedule_id: &ScheduleId,
        date: NaiveDate,
    ) -> Result<Vec<IntakeRecord>, WalletError> {
        self.with_conn(|conn| {
            let sql = format!("{SELECT_COLUMNS} WHERE schedule_id = ?1 AND date = ?2 ORDER BY seq DESC");
            collect_records(
                conn,
                &sql,
                params![schedule_id.to_string(), date.to_string()],
            )
        })
    }

    fn all(&self) -> Result<Vec<IntakeRecord>, WalletError> {
        self.with_conn(|conn| {
            // HH:MM is zero-padded, so text order is clock order.
            let sql = format!(
                "{SELECT_COLUMNS} ORDER BY date DESC,
                 COALESCE(NULLIF(actual_time, ''), scheduled_time) DESC, seq DESC"
            );
            collect_records(conn, &sql, &[])
        })
    }

    fn len(&self) -> Result<usize, WalletError> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM intake_records", [], |row| row.get(0))?;
            Ok(usize::try_from(count).unwrap_or(0))
        })
    }
}
