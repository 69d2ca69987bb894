use thiserror::Error;

use crate::db::DatabaseError;
use crate::models::ScheduleId;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("Unknown schedule: {0}")]
    UnknownSchedule(ScheduleId),

    #[error("Invalid time of day: {0:?}")]
    InvalidTime(String),

    #[error("Invalid schedule id: {0:?}")]
    InvalidScheduleId(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for WalletError {
    fn from(e: rusqlite::Error) -> Self {
        WalletError::Database(DatabaseError::from(e))
    }
}
