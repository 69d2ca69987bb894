use std::sync::RwLock;

use chrono::NaiveDate;

use super::{sort_newest_first, IntakeRepository};
use crate::error::WalletError;
use crate::models::{IntakeRecord, ScheduleId};

/// Ledger held in process memory. Lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    /// Most recently appended first.
    records: RwLock<Vec<IntakeRecord>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger pre-loaded with existing records, given most recent first.
    pub fn with_records(records: Vec<IntakeRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl IntakeRepository for InMemoryLedger {
    fn append(&self, record: IntakeRecord) -> Result<(), WalletError> {
        let mut records = self.records.write().map_err(|_| WalletError::LockPoisoned)?;
        records.insert(0, record);
        Ok(())
    }

    fn query(
        &self,
        schedule_id: &ScheduleId,
        date: NaiveDate,
    ) -> Result<Vec<IntakeRecord>, WalletError> {
        let records = self.records.read().map_err(|_| WalletError::LockPoisoned)?;
        Ok(records
            .iter()
            .filter(|r| r.schedule_id == *schedule_id && r.date == date)
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<IntakeRecord>, WalletError> {
        let mut snapshot = self
            .records
            .read()
            .map_err(|_| WalletError::LockPoisoned)?
            .clone();
        sort_newest_first(&mut snapshot);
        Ok(snapshot)
    }

    fn len(&self) -> Result<usize, WalletError> {
        Ok(self.records.read().map_err(|_| WalletError::LockPoisoned)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DoseTime, IntakeId, IntakeStatus};

    fn record(
        schedule: &str,
        date: &str,
        scheduled: &str,
        actual: Option<&str>,
        status: IntakeStatus,
    ) -> IntakeRecord {
        IntakeRecord {
            id: IntakeId::at(chrono::Local::now().naive_local()),
            schedule_id: schedule.parse().unwrap(),
            medicine_name: "Amoxicillin".into(),
            dosage: "500 mg".into(),
            scheduled_time: scheduled.parse().unwrap(),
            actual_time: actual.map(|a| a.parse().unwrap()),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            status,
        }
    }

    #[test]
    fn empty_ledger() {
        let ledger = InMemoryLedger::new();
        assert!(ledger.is_empty().unwrap());
        assert!(ledger.all().unwrap().is_empty());
    }

    #[test]
    fn append_prepends() {
        let ledger = InMemoryLedger::new();
        let first = record("6-0", "2026-01-10", "08:00", Some("08:30"), IntakeStatus::Taken);
        let second = record("6-0", "2026-01-10", "08:00", Some("08:45"), IntakeStatus::Taken);
        ledger.append(first.clone()).unwrap();
        ledger.append(second.clone()).unwrap();

        let hits = ledger.query(&"6-0".parse().unwrap(), first.date).unwrap();
        assert_eq!(hits, vec![second, first]);
        assert_eq!(ledger.len().unwrap(), 2);
    }

    #[test]
    fn query_filters_by_schedule_and_date() {
        let ledger = InMemoryLedger::new();
        ledger.append(record("6-0", "2026-01-10", "08:00", Some("08:30"), IntakeStatus::Taken)).unwrap();
        ledger.append(record("6-0", "2026-01-09", "08:00", Some("08:30"), IntakeStatus::Taken)).unwrap();
        ledger.append(record("2-0", "2026-01-10", "20:00", Some("20:15"), IntakeStatus::Taken)).unwrap();

        let date = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
        let hits = ledger.query(&"6-0".parse().unwrap(), date).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].scheduled_time, DoseTime::MORNING);
    }

    #[test]
    fn all_sorts_by_effective_timestamp_descending() {
        let ledger = InMemoryLedger::with_records(vec![
            record("2-0", "2026-01-09", "20:00", Some("20:05"), IntakeStatus::Taken),
            record("6-0", "2026-01-10", "20:00", None, IntakeStatus::Missed),
            record("6-0", "2026-01-10", "08:00", Some("08:30"), IntakeStatus::Taken),
            record("2-0", "2026-01-10", "20:00", Some("20:15"), IntakeStatus::Taken),
        ]);

        let stamps: Vec<String> = ledger
            .all()
            .unwrap()
            .iter()
            .map(|r| r.effective_timestamp().format("%Y-%m-%d %H:%M").to_string())
            .collect();
        assert_eq!(
            stamps,
            vec![
                "2026-01-10 20:15",
                "2026-01-10 20:00",
                "2026-01-10 08:30",
                "2026-01-09 20:05",
            ]
        );
    }

    #[test]
    fn for_schedule_keeps_only_that_schedule() {
        let ledger = InMemoryLedger::new();
        ledger.append(record("6-0", "2026-01-10", "20:00", None, IntakeStatus::Missed)).unwrap();
        ledger.append(record("2-0", "2026-01-10", "20:00", Some("20:15"), IntakeStatus::Taken)).unwrap();
        let hits = ledger.for_schedule(&"6-0".parse().unwrap()).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].status, IntakeStatus::Missed);
    }
}
