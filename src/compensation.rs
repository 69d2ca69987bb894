//! Missed-dose compensation: extra days appended to a course.

use chrono::{Days, NaiveDate};
use serde::Serialize;

use crate::models::{IntakeRecord, IntakeStatus, Schedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Compensation {
    pub missed_count: usize,
    pub doses_per_day: usize,
    pub extra_days: u64,
    pub extended_end_date: NaiveDate,
}

impl Compensation {
    /// Only ledger records with status `missed` count; inferred misses do not.
    pub fn for_schedule(schedule: &Schedule, records: &[IntakeRecord]) -> Self {
        let missed_count = records
            .iter()
            .filter(|r| r.schedule_id == schedule.id && r.status == IntakeStatus::Missed)
            .count();
        let doses_per_day = schedule.doses_per_day().max(1);
        let extra_days = missed_count.div_ceil(doses_per_day) as u64;
        let extended_end_date = schedule
            .end_date
            .checked_add_days(Days::new(extra_days))
            .unwrap_or(NaiveDate::MAX);

        Self {
            missed_count,
            doses_per_day,
            extra_days,
            extended_end_date,
        }
    }

    /// Dates past the prescribed end that exist only to make up missed doses.
    pub fn is_extension_day(&self, schedule: &Schedule, date: NaiveDate) -> bool {
        date > schedule.end_date && date <= self.extended_end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DoseTime, IntakeId, Medication, ScheduleId};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn schedule(times: Vec<DoseTime>, start: &str, end: &str) -> Schedule {
        Schedule {
            id: ScheduleId::new(6, 0),
            prescription_id: 6,
            medication_index: 0,
            medication: Medication {
                name: "Amoxicillin".into(),
                dosage: "500 mg".into(),
                frequency: "2 times daily".into(),
                duration: "7 days".into(),
            },
            doctor: "Dr. Rao".into(),
            scheduled_times: times,
            start_date: date(start),
            end_date: date(end),
            days_remaining: 0,
        }
    }

    fn missed(schedule_id: ScheduleId, on: &str, time: DoseTime) -> IntakeRecord {
        IntakeRecord {
            id: IntakeId::at(time.on(date(on))),
            schedule_id,
            medicine_name: "Amoxicillin".into(),
            dosage: "500 mg".into(),
            scheduled_time: time,
            actual_time: None,
            date: date(on),
            status: IntakeStatus::Missed,
        }
    }

    #[test]
    fn no_misses_no_extension() {
        let s = schedule(vec![DoseTime::MORNING], "2026-01-06", "2026-01-13");
        let c = Compensation::for_schedule(&s, &[]);
        assert_eq!(c.extra_days, 0);
        assert_eq!(c.extended_end_date, s.end_date);
    }

    #[test]
    fn three_misses_at_two_per_day_is_two_days() {
        let s = schedule(vec![DoseTime::MORNING, DoseTime::EVENING], "2026-01-06", "2026-01-13");
        let records = vec![
            missed(s.id, "2026-01-06", DoseTime::MORNING),
            missed(s.id, "2026-01-06", DoseTime::EVENING),
            missed(s.id, "2026-01-07", DoseTime::MORNING),
        ];
        let c = Compensation::for_schedule(&s, &records);
        assert_eq!(c.missed_count, 3);
        assert_eq!(c.extra_days, 2);
        assert_eq!(c.extended_end_date, date("2026-01-15"));
        assert!(c.is_extension_day(&s, date("2026-01-14")));
        assert!(!c.is_extension_day(&s, date("2026-01-13")));
        assert!(!c.is_extension_day(&s, date("2026-01-16")));
    }

    #[test]
    fn other_schedules_and_statuses_are_ignored() {
        let s = schedule(vec![DoseTime::MORNING], "2026-01-06", "2026-01-13");
        let mut taken = missed(s.id, "2026-01-06", DoseTime::MORNING);
        taken.status = IntakeStatus::Taken;
        let mut skipped = missed(s.id, "2026-01-07", DoseTime::MORNING);
        skipped.status = IntakeStatus::Skipped;
        let foreign = missed(ScheduleId::new(2, 0), "2026-01-06", DoseTime::MORNING);

        let c = Compensation::for_schedule(&s, &[taken, skipped, foreign]);
        assert_eq!(c.missed_count, 0);
        assert_eq!(c.extra_days, 0);
    }
}
