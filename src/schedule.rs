//! Schedule generation: prescriptions in, dated dose plans out.
//!
//! Frequency and duration are free text written by prescribers, so both
//! parsers fall back to defaults instead of failing.

use std::sync::LazyLock;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::config::DEFAULT_DURATION_DAYS;
use crate::models::{DoseTime, Prescription, Schedule, ScheduleId};

static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Dosing pattern recognised in a frequency text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyPattern {
    ThreeTimesDaily,
    TwiceDaily,
    OnceAtNight,
    OnceInMorning,
    OnceDaily,
    /// PRN dosing. Mapped onto the 3x/day grid, which is questionable.
    AsNeeded,
    Unrecognized,
}

impl FrequencyPattern {
    /// Case-insensitive substring match; the first rule that hits wins.
    pub fn parse(frequency: &str) -> Self {
        let freq = frequency.to_lowercase();
        if freq.contains("3 times") {
            return Self::ThreeTimesDaily;
        }
        if freq.contains("2 times") {
            return Self::TwiceDaily;
        }
        if freq.contains("once") || freq.contains("1 time") {
            if freq.contains("night") || freq.contains("bedtime") {
                return Self::OnceAtNight;
            }
            if freq.contains("morning") || freq.contains("breakfast") {
                return Self::OnceInMorning;
            }
            return Self::OnceDaily;
        }
        if freq.contains("as needed") {
            return Self::AsNeeded;
        }
        Self::Unrecognized
    }

    pub fn times(self) -> Vec<DoseTime> {
        match self {
            Self::ThreeTimesDaily | Self::AsNeeded => {
                vec![DoseTime::MORNING, DoseTime::AFTERNOON, DoseTime::EVENING]
            }
            Self::TwiceDaily => vec![DoseTime::MORNING, DoseTime::EVENING],
            Self::OnceAtNight => vec![DoseTime::BEDTIME],
            Self::OnceInMorning => vec![DoseTime::MORNING],
            Self::OnceDaily | Self::Unrecognized => vec![DoseTime::DEFAULT],
        }
    }
}

/// Map a frequency text to its daily dose times.
pub fn parse_frequency_to_times(frequency: &str) -> Vec<DoseTime> {
    let pattern = FrequencyPattern::parse(frequency);
    match pattern {
        FrequencyPattern::Unrecognized => {
            tracing::debug!(frequency, "Unrecognized frequency, defaulting to one 09:00 dose");
        }
        FrequencyPattern::AsNeeded => {
            tracing::debug!(frequency, "As-needed frequency mapped to a fixed 3x/day grid");
        }
        _ => {}
    }
    pattern.times()
}

/// First integer in the duration text, or the default course length.
pub fn parse_duration_to_days(duration: &str) -> u64 {
    let parsed = FIRST_NUMBER
        .find(duration)
        .and_then(|m| m.as_str().parse::<u64>().ok());
    match parsed {
        Some(days) => days,
        None => {
            tracing::debug!(duration, "No day count in duration, defaulting");
            DEFAULT_DURATION_DAYS as u64
        }
    }
}

/// Whole days left until `end_date`, rounded up and never negative.
pub fn days_remaining(end_date: NaiveDate, now: NaiveDateTime) -> i64 {
    let seconds = (end_date.and_time(NaiveTime::MIN) - now).num_seconds();
    if seconds <= 0 {
        0
    } else {
        (seconds + 86_399) / 86_400
    }
}

/// Build one schedule per medication of every prescription.
///
/// Pure: the same prescriptions and the same `now` give the same output.
pub fn generate_schedules(prescriptions: &[Prescription], now: NaiveDateTime) -> Vec<Schedule> {
    let mut schedules = Vec::new();

    for prescription in prescriptions {
        for (idx, medication) in prescription.medications.iter().enumerate() {
            let duration_days = parse_duration_to_days(&medication.duration);
            let start_date = prescription.date;
            let end_date = start_date
                .checked_add_days(Days::new(duration_days))
                .unwrap_or(NaiveDate::MAX);

            schedules.push(Schedule {
                id: ScheduleId::new(prescription.id, idx),
                prescription_id: prescription.id,
                medication_index: idx,
                medication: medication.clone(),
                doctor: prescription.doctor.clone(),
                scheduled_times: parse_frequency_to_times(&medication.frequency),
                start_date,
                end_date,
                days_remaining: days_remaining(end_date, now),
            });
        }
    }

    schedules
}
