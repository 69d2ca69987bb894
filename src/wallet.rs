//! Medicine Wallet service facade over schedules, ledger and clock.
//!
//! Every read takes one ledger snapshot and derives all figures from it,
//! so a single answer never mixes two ledger states.

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::clock::{Clock, SystemClock};
use crate::compensation::Compensation;
use crate::compliance::{compliance_stats, ComplianceStats};
use crate::config::{WalletConfig, GRID_DAYS};
use crate::error::WalletError;
use crate::ledger::{InMemoryLedger, IntakeRepository, SqliteLedger};
use crate::models::{
    DayStatus, DoseTime, IntakeEntry, IntakeId, IntakeRecord, IntakeStatus, Schedule,
    ScheduleId, TodayStatus,
};
use crate::schedule::generate_schedules;
use crate::source::PrescriptionSource;
use crate::status::{DoseSlot, ScheduleLedger};

// ═══════════════════════════════════════════
// View types serialised to the UI layer
// ═══════════════════════════════════════════

/// One dose slot in today's list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodayScheduleItem {
    pub schedule_id: ScheduleId,
    pub medicine_name: String,
    pub dosage: String,
    pub time: DoseTime,
    pub status: TodayStatus,
    pub intake_id: Option<IntakeId>,
}

/// Per-slot breakdown of one schedule on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayDetail {
    pub schedule_id: ScheduleId,
    pub date: NaiveDate,
    pub medicine_name: String,
    pub dosage: String,
    pub status: DayStatus,
    pub doses: Vec<DoseSlot>,
    pub missed_count: usize,
    pub extra_days: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub date: NaiveDate,
    pub status: DayStatus,
}

/// One medication's line in the adherence calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridRow {
    pub schedule_id: ScheduleId,
    pub medicine_name: String,
    pub dosage: String,
    pub doctor: String,
    pub scheduled_times: Vec<DoseTime>,
    pub missed_count: usize,
    pub extra_days: u64,
    pub extended_end_date: NaiveDate,
    pub cells: Vec<GridCell>,
}

/// Two-week calendar starting on a Sunday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdherenceGrid {
    pub dates: Vec<NaiveDate>,
    pub rows: Vec<GridRow>,
}

/// Everything one read needs, captured once.
struct Snapshot {
    now: NaiveDateTime,
    schedules: Vec<Schedule>,
    records: Vec<IntakeRecord>,
}

impl Snapshot {
    fn views(&self) -> impl Iterator<Item = ScheduleLedger<'_>> {
        self.schedules
            .iter()
            .map(|s| ScheduleLedger::new(s, &self.records))
    }

    fn view(&self, schedule_id: &ScheduleId) -> Result<ScheduleLedger<'_>, WalletError> {
        self.schedules
            .iter()
            .find(|s| s.id == *schedule_id)
            .map(|s| ScheduleLedger::new(s, &self.records))
            .ok_or(WalletError::UnknownSchedule(*schedule_id))
    }

    fn today_items(&self) -> Vec<TodayScheduleItem> {
        let today = self.now.date();
        let mut items: Vec<TodayScheduleItem> = self
            .views()
            .filter(|view| view.covers(today))
            .flat_map(|view| {
                let medication = &view.schedule.medication;
                view.dose_slots(today, self.now)
                    .into_iter()
                    .map(|slot| TodayScheduleItem {
                        schedule_id: view.schedule_id(),
                        medicine_name: medication.name.clone(),
                        dosage: medication.dosage.clone(),
                        time: slot.time,
                        status: TodayStatus::from(slot.status),
                        intake_id: slot.intake_id,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        items.sort_by_key(|item| item.time);
        items
    }
}

// ═══════════════════════════════════════════
// Service
// ═══════════════════════════════════════════

pub struct MedicineWallet {
    source: Box<dyn PrescriptionSource>,
    ledger: Box<dyn IntakeRepository>,
    clock: Arc<dyn Clock>,
    config: WalletConfig,
}

impl MedicineWallet {
    pub fn new(
        source: impl PrescriptionSource + 'static,
        ledger: impl IntakeRepository + 'static,
        clock: Arc<dyn Clock>,
        config: WalletConfig,
    ) -> Self {
        Self {
            source: Box::new(source),
            ledger: Box::new(ledger),
            clock,
            config,
        }
    }

    /// Wallet on the system clock, with the ledger store picked by `config`.
    pub fn from_config(
        source: impl PrescriptionSource + 'static,
        config: WalletConfig,
    ) -> Result<Self, WalletError> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let wallet = match &config.ledger_path {
            Some(path) => {
                let ledger = SqliteLedger::open(path)?;
                Self::new(source, ledger, clock, config)
            }
            None => Self::new(source, InMemoryLedger::new(), clock, config),
        };
        Ok(wallet)
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    fn schedules_at(&self, now: NaiveDateTime) -> Result<Vec<Schedule>, WalletError> {
        let prescriptions = self.source.active_prescriptions()?;
        Ok(generate_schedules(&prescriptions, now))
    }

    fn snapshot(&self) -> Result<Snapshot, WalletError> {
        let now = self.clock.now();
        let schedules = self.schedules_at(now)?;
        let records = self.ledger.all()?;
        tracing::debug!(
            schedules = schedules.len(),
            records = records.len(),
            "Took wallet snapshot"
        );
        Ok(Snapshot {
            now,
            schedules,
            records,
        })
    }

    // ── Reads ───────────────────────────────────────────────

    pub fn medicine_schedules(&self) -> Result<Vec<Schedule>, WalletError> {
        self.schedules_at(self.clock.now())
    }

    /// Today's dose slots across all schedules active today, in time order.
    pub fn today_schedule(&self) -> Result<Vec<TodayScheduleItem>, WalletError> {
        Ok(self.snapshot()?.today_items())
    }

    pub fn compliance_stats(&self) -> Result<ComplianceStats, WalletError> {
        let snapshot = self.snapshot()?;
        let today_statuses: Vec<TodayStatus> =
            snapshot.today_items().into_iter().map(|i| i.status).collect();
        Ok(compliance_stats(
            &snapshot.records,
            snapshot.now.date(),
            today_statuses,
        ))
    }

    /// Every intake record, most recent event first.
    pub fn intake_history(&self) -> Result<Vec<IntakeRecord>, WalletError> {
        self.ledger.all()
    }

    pub fn compensation(&self, schedule_id: &ScheduleId) -> Result<Compensation, WalletError> {
        let snapshot = self.snapshot()?;
        let view = snapshot.view(schedule_id)?;
        Ok(view.compensation)
    }

    pub fn day_status(
        &self,
        schedule_id: &ScheduleId,
        date: NaiveDate,
    ) -> Result<DayStatus, WalletError> {
        let snapshot = self.snapshot()?;
        let view = snapshot.view(schedule_id)?;
        Ok(view.day_status(date, snapshot.now))
    }

    pub fn day_detail(
        &self,
        schedule_id: &ScheduleId,
        date: NaiveDate,
    ) -> Result<DayDetail, WalletError> {
        let snapshot = self.snapshot()?;
        let view = snapshot.view(schedule_id)?;
        let medication = &view.schedule.medication;
        Ok(DayDetail {
            schedule_id: *schedule_id,
            date,
            medicine_name: medication.name.clone(),
            dosage: medication.dosage.clone(),
            status: view.day_status(date, snapshot.now),
            doses: view.dose_slots(date, snapshot.now),
            missed_count: view.compensation.missed_count,
            extra_days: view.compensation.extra_days,
        })
    }

    /// Fourteen days from the Sunday of the week holding `today + 7 * week_offset`.
    pub fn adherence_grid(&self, week_offset: i64) -> Result<AdherenceGrid, WalletError> {
        let snapshot = self.snapshot()?;
        let dates = grid_dates(snapshot.now.date(), week_offset);

        let rows = snapshot
            .views()
            .map(|view| {
                let schedule = view.schedule;
                GridRow {
                    schedule_id: schedule.id,
                    medicine_name: schedule.medication.name.clone(),
                    dosage: schedule.medication.dosage.clone(),
                    doctor: schedule.doctor.clone(),
                    scheduled_times: schedule.scheduled_times.clone(),
                    missed_count: view.compensation.missed_count,
                    extra_days: view.compensation.extra_days,
                    extended_end_date: view.extended_end_date(),
                    cells: dates
                        .iter()
                        .map(|&date| GridCell {
                            date,
                            status: view.day_status(date, snapshot.now),
                        })
                        .collect(),
                }
            })
            .collect();

        Ok(AdherenceGrid { dates, rows })
    }

    // ── Writes ──────────────────────────────────────────────

    /// Record the entry's dose as taken now.
    pub fn record_intake(&self, entry: IntakeEntry) -> Result<IntakeRecord, WalletError> {
        let now = self.clock.now();
        self.append(entry.into_record(
            IntakeId::at(now),
            now.date(),
            Some(DoseTime::of(now.time())),
            IntakeStatus::Taken,
        ))
    }

    /// Record that the entry's dose on `date` was missed. Counts toward compensation.
    pub fn record_missed(
        &self,
        entry: IntakeEntry,
        date: NaiveDate,
    ) -> Result<IntakeRecord, WalletError> {
        let id = IntakeId::at(self.clock.now());
        self.append(entry.into_record(id, date, None, IntakeStatus::Missed))
    }

    /// Record that the entry's dose on `date` was deliberately skipped.
    pub fn record_skipped(
        &self,
        entry: IntakeEntry,
        date: NaiveDate,
    ) -> Result<IntakeRecord, WalletError> {
        let id = IntakeId::at(self.clock.now());
        self.append(entry.into_record(id, date, None, IntakeStatus::Skipped))
    }

    fn append(&self, record: IntakeRecord) -> Result<IntakeRecord, WalletError> {
        let known = self
            .schedules_at(self.clock.now())?
            .iter()
            .any(|s| s.id == record.schedule_id);

        if !known {
            if self.config.strict_schedule_refs {
                return Err(WalletError::UnknownSchedule(record.schedule_id));
            }
            tracing::warn!(
                schedule_id = %record.schedule_id,
                "Recording intake for a schedule no prescription produces"
            );
        }

        self.ledger.append(record.clone())?;
        tracing::info!(
            schedule_id = %record.schedule_id,
            status = record.status.as_str(),
            date = %record.date,
            time = %record.scheduled_time,
            "Recorded intake"
        );
        Ok(record)
    }
}

/// Sunday-aligned run of `GRID_DAYS` dates around `today + 7 * week_offset`.
pub fn grid_dates(today: NaiveDate, week_offset: i64) -> Vec<NaiveDate> {
    let shift = Days::new(week_offset.unsigned_abs().saturating_mul(7));
    let anchor = if week_offset >= 0 {
        today.checked_add_days(shift)
    } else {
        today.checked_sub_days(shift)
    }
    .unwrap_or(today);
    let back = u64::from(anchor.weekday().num_days_from_sunday());
    let start = anchor.checked_sub_days(Days::new(back)).unwrap_or(anchor);
    start.iter_days().take(GRID_DAYS as usize).collect()
}
