//! Status classification for dose slots and schedule days.
//!
//! Everything here is a pure function of a schedule, a ledger snapshot
//! and "now". Nothing is cached; callers re-classify on every read.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::compensation::Compensation;
use crate::config::GRACE_PERIOD_MINUTES;
use crate::models::{
    DayStatus, DoseStatus, DoseTime, IntakeId, IntakeRecord, Schedule, ScheduleId,
};

/// Dose-level state machine.
///
/// `record` is the ledger entry settling this slot, if any.
pub fn classify_dose(
    record: Option<&IntakeRecord>,
    date: NaiveDate,
    time: DoseTime,
    now: NaiveDateTime,
) -> DoseStatus {
    if let Some(record) = record {
        return record.status.dose_status();
    }

    let today = now.date();
    if date > today {
        return DoseStatus::Upcoming;
    }
    if date < today {
        return DoseStatus::Missed;
    }

    let scheduled = time.minutes_of_day();
    let current = DoseTime::of(now.time()).minutes_of_day();
    if scheduled > current {
        DoseStatus::Upcoming
    } else if scheduled < current - GRACE_PERIOD_MINUTES {
        DoseStatus::Missed
    } else {
        DoseStatus::Pending
    }
}

/// One dose slot with its status and the record that settled it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DoseSlot {
    pub time: DoseTime,
    pub status: DoseStatus,
    pub actual_time: Option<DoseTime>,
    pub intake_id: Option<IntakeId>,
    /// Unsettled slot on a future day added by compensation.
    pub extended: bool,
}

/// A schedule paired with its slice of a ledger snapshot.
#[derive(Debug, Clone)]
pub struct ScheduleLedger<'a> {
    pub schedule: &'a Schedule,
    records: Vec<&'a IntakeRecord>,
    pub compensation: Compensation,
}

impl<'a> ScheduleLedger<'a> {
    /// `snapshot` is the whole ledger, newest first; it is filtered here.
    pub fn new(schedule: &'a Schedule, snapshot: &'a [IntakeRecord]) -> Self {
        let records = snapshot
            .iter()
            .filter(|r| r.schedule_id == schedule.id)
            .collect();
        Self {
            schedule,
            records,
            compensation: Compensation::for_schedule(schedule, snapshot),
        }
    }

    pub fn schedule_id(&self) -> ScheduleId {
        self.schedule.id
    }

    pub fn extended_end_date(&self) -> NaiveDate {
        self.compensation.extended_end_date
    }

    /// Whether the date lies in `[start_date, extended_end_date]`.
    pub fn covers(&self, date: NaiveDate) -> bool {
        date >= self.schedule.start_date && date <= self.extended_end_date()
    }

    /// Most recent record for a slot. Several records for one slot are possible.
    pub fn record_for(&self, date: NaiveDate, time: DoseTime) -> Option<&'a IntakeRecord> {
        self.records
            .iter()
            .copied()
            .find(|r| r.matches_slot(&self.schedule.id, date, time))
    }

    pub fn dose_status(&self, date: NaiveDate, time: DoseTime, now: NaiveDateTime) -> DoseStatus {
        classify_dose(self.record_for(date, time), date, time, now)
    }

    /// Every slot of the date, in time order.
    pub fn dose_slots(&self, date: NaiveDate, now: NaiveDateTime) -> Vec<DoseSlot> {
        let extension_ahead =
            date > now.date() && self.compensation.is_extension_day(self.schedule, date);
        self.schedule
            .scheduled_times
            .iter()
            .map(|&time| {
                let record = self.record_for(date, time);
                DoseSlot {
                    time,
                    status: classify_dose(record, date, time, now),
                    actual_time: record.and_then(|r| r.actual_time),
                    intake_id: record.map(|r| r.id),
                    extended: extension_ahead && record.is_none(),
                }
            })
            .collect()
    }

    /// Day-level status of this schedule on `date`.
    pub fn day_status(&self, date: NaiveDate, now: NaiveDateTime) -> DayStatus {
        if !self.covers(date) {
            return DayStatus::NotScheduled;
        }

        if date > now.date() {
            return if self.compensation.is_extension_day(self.schedule, date) {
                DayStatus::Extended
            } else {
                DayStatus::Upcoming
            };
        }

        let doses: Vec<DoseStatus> = self
            .dose_slots(date, now)
            .into_iter()
            .map(|slot| slot.status)
            .collect();
        DayStatus::from_doses(&doses)
    }
}
