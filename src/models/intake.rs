use std::fmt;
use std::sync::{LazyLock, Mutex, PoisonError};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::{ContextV7, Timestamp, Uuid};

use super::enums::IntakeStatus;
use super::schedule::{DoseTime, ScheduleId};

// One counter for the process, so ids minted within a millisecond stay ordered.
static ID_CONTEXT: LazyLock<Mutex<ContextV7>> = LazyLock::new(|| Mutex::new(ContextV7::new()));

/// Time-ordered identifier of an intake record (UUIDv7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntakeId(pub Uuid);

impl IntakeId {
    /// New id whose timestamp bits come from `at` (read as UTC).
    ///
    /// Ids are strictly increasing in creation order, even for equal or
    /// backwards `at` values.
    pub fn at(at: NaiveDateTime) -> Self {
        let utc = at.and_utc();
        let seconds = u64::try_from(utc.timestamp()).unwrap_or(0);
        let context = ID_CONTEXT.lock().unwrap_or_else(PoisonError::into_inner);
        let ts = Timestamp::from_unix(&*context, seconds, utc.timestamp_subsec_nanos());
        Self(Uuid::new_v7(ts))
    }
}

impl fmt::Display for IntakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One dose event in the ledger. Never mutated once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub id: IntakeId,
    pub schedule_id: ScheduleId,
    pub medicine_name: String,
    pub dosage: String,
    pub scheduled_time: DoseTime,
    /// `None` when the dose was not actually taken.
    pub actual_time: Option<DoseTime>,
    pub date: NaiveDate,
    pub status: IntakeStatus,
}

impl IntakeRecord {
    /// When the event happened, falling back to the slot time.
    pub fn effective_timestamp(&self) -> NaiveDateTime {
        self.actual_time.unwrap_or(self.scheduled_time).on(self.date)
    }

    /// Whether this record settles the given slot.
    pub fn matches_slot(&self, schedule_id: &ScheduleId, date: NaiveDate, time: DoseTime) -> bool {
        self.schedule_id == *schedule_id && self.date == date && self.scheduled_time == time
    }
}

/// Fields the caller supplies when recording a dose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntakeEntry {
    pub schedule_id: ScheduleId,
    pub medicine_name: String,
    pub dosage: String,
    pub scheduled_time: DoseTime,
}

impl IntakeEntry {
    pub fn new(
        schedule_id: ScheduleId,
        medicine_name: impl Into<String>,
        dosage: impl Into<String>,
        scheduled_time: DoseTime,
    ) -> Self {
        Self {
            schedule_id,
            medicine_name: medicine_name.into(),
            dosage: dosage.into(),
            scheduled_time,
        }
    }

    pub fn into_record(
        self,
        id: IntakeId,
        date: NaiveDate,
        actual_time: Option<DoseTime>,
        status: IntakeStatus,
    ) -> IntakeRecord {
        IntakeRecord {
            id,
            schedule_id: self.schedule_id,
            medicine_name: self.medicine_name,
            dosage: self.dosage,
            scheduled_time: self.scheduled_time,
            actual_time,
            date,
            status,
        }
    }
}
