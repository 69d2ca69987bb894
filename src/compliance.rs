//! Rolling adherence metrics over a ledger snapshot.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{COMPLIANCE_WINDOW_DAYS, STREAK_LOOKBACK_DAYS};
use crate::models::{IntakeRecord, IntakeStatus, TodayStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodayProgress {
    pub taken: usize,
    pub total: usize,
}

impl TodayProgress {
    pub fn from_statuses(statuses: impl IntoIterator<Item = TodayStatus>) -> Self {
        let mut progress = Self { taken: 0, total: 0 };
        for status in statuses {
            progress.total += 1;
            if status == TodayStatus::Taken {
                progress.taken += 1;
            }
        }
        progress
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceStats {
    /// 0–100.
    pub compliance_rate: u32,
    pub streak: u32,
    pub today_progress: TodayProgress,
    pub total_records: usize,
}

/// First day of the trailing compliance window ending on `today`.
pub fn window_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new((COMPLIANCE_WINDOW_DAYS - 1) as u64))
        .unwrap_or(NaiveDate::MIN)
}

/// Percentage of `taken` records dated within the trailing window.
///
/// An empty window reports 100: no data is read as fully compliant.
pub fn compliance_rate(records: &[IntakeRecord], today: NaiveDate) -> u32 {
    let from = window_start(today);
    let (taken, total) = records
        .iter()
        .filter(|r| r.date >= from && r.date <= today)
        .fold((0u64, 0u64), |(taken, total), r| {
            (taken + u64::from(r.status == IntakeStatus::Taken), total + 1)
        });

    if total == 0 {
        return 100;
    }
    // round half up
    ((taken * 200 + total) / (total * 2)) as u32
}

/// Consecutive days, counting back from today, with at least one record and
/// no `missed` record. An empty today does not break the run.
pub fn streak(records: &[IntakeRecord], today: NaiveDate) -> u32 {
    let mut streak = 0;

    for offset in 0..STREAK_LOOKBACK_DAYS as u64 {
        let Some(day) = today.checked_sub_days(Days::new(offset)) else {
            break;
        };
        let mut day_records = records.iter().filter(|r| r.date == day).peekable();

        if day_records.peek().is_none() {
            if offset > 0 {
                break;
            }
            continue;
        }
        if day_records.any(|r| r.status == IntakeStatus::Missed) {
            break;
        }
        streak += 1;
    }

    streak
}

pub fn compliance_stats(
    records: &[IntakeRecord],
    today: NaiveDate,
    today_statuses: impl IntoIterator<Item = TodayStatus>,
) -> ComplianceStats {
    ComplianceStats {
        compliance_rate: compliance_rate(records, today),
        streak: streak(records, today),
        today_progress: TodayProgress::from_statuses(today_statuses),
        total_records: records.len(),
    }
}
