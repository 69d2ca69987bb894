//! Intake ledger: append-only store of dose events.
//!
//! Two stores share one trait: `InMemoryLedger` (process lifetime only)
//! and `SqliteLedger` (a file or in-memory SQLite database). Neither
//! exposes update or delete.

mod memory;
mod sqlite;

pub use memory::InMemoryLedger;
pub use sqlite::SqliteLedger;

use chrono::NaiveDate;

use crate::error::WalletError;
use crate::models::{IntakeRecord, ScheduleId};

/// Base operations for an intake store.
pub trait IntakeRepository: Send + Sync {
    /// Add a record. It becomes the first entry of the ledger's own order.
    fn append(&self, record: IntakeRecord) -> Result<(), WalletError>;

    /// Records for one schedule on one date, most recently appended first.
    fn query(&self, schedule_id: &ScheduleId, date: NaiveDate)
        -> Result<Vec<IntakeRecord>, WalletError>;

    /// Every record, newest effective timestamp first.
    fn all(&self) -> Result<Vec<IntakeRecord>, WalletError>;

    fn len(&self) -> Result<usize, WalletError> {
        Ok(self.all()?.len())
    }

    fn is_empty(&self) -> Result<bool, WalletError> {
        Ok(self.len()? == 0)
    }

    /// Every record of one schedule, same order as `all`.
    fn for_schedule(&self, schedule_id: &ScheduleId) -> Result<Vec<IntakeRecord>, WalletError> {
        Ok(self
            .all()?
            .into_iter()
            .filter(|r| r.schedule_id == *schedule_id)
            .collect())
    }
}

/// Sort newest effective timestamp first. Stable, so ties keep append order.
pub(crate) fn sort_newest_first(records: &mut [IntakeRecord]) {
    records.sort_by(|a, b| b.effective_timestamp().cmp(&a.effective_timestamp()));
}
