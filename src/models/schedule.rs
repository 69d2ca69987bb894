use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use super::prescription::{Medication, PrescriptionId};
use crate::error::WalletError;

// ═══════════════════════════════════════════
// DoseTime: time of day at minute precision
// ═══════════════════════════════════════════

/// A time of day, shown as 24-hour `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DoseTime {
    hour: u8,
    minute: u8,
}

impl DoseTime {
    pub const MORNING: DoseTime = DoseTime::at(8, 0);
    pub const DEFAULT: DoseTime = DoseTime::at(9, 0);
    pub const AFTERNOON: DoseTime = DoseTime::at(14, 0);
    pub const EVENING: DoseTime = DoseTime::at(20, 0);
    pub const BEDTIME: DoseTime = DoseTime::at(22, 0);

    const fn at(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    /// Truncates seconds.
    pub fn of(time: NaiveTime) -> Self {
        // hour() < 24 and minute() < 60 by construction
        Self::at(time.hour() as u8, time.minute() as u8)
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn minutes_of_day(self) -> i64 {
        i64::from(self.hour) * 60 + i64::from(self.minute)
    }

    pub fn as_naive_time(self) -> NaiveTime {
        NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
            .unwrap_or(NaiveTime::MIN)
    }

    /// The instant this dose time falls on for a given date.
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(self.as_naive_time())
    }
}

impl fmt::Display for DoseTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for DoseTime {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WalletError::InvalidTime(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        if m.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        DoseTime::new(hour, minute).ok_or_else(invalid)
    }
}

impl TryFrom<String> for DoseTime {
    type Error = WalletError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DoseTime> for String {
    fn from(value: DoseTime) -> Self {
        value.to_string()
    }
}

// ═══════════════════════════════════════════
// ScheduleId: prescription + medication position
// ═══════════════════════════════════════════

/// Stable identifier of a schedule: `"<prescription_id>-<medication_index>"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ScheduleId {
    pub prescription_id: PrescriptionId,
    pub medication_index: usize,
}

impl ScheduleId {
    pub fn new(prescription_id: PrescriptionId, medication_index: usize) -> Self {
        Self {
            prescription_id,
            medication_index,
        }
    }
}

impl fmt::Display for ScheduleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.prescription_id, self.medication_index)
    }
}

impl FromStr for ScheduleId {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WalletError::InvalidScheduleId(s.to_string());
        let (prescription, index) = s.trim().split_once('-').ok_or_else(invalid)?;
        Ok(Self {
            prescription_id: prescription.parse().map_err(|_| invalid())?,
            medication_index: index.parse().map_err(|_| invalid())?,
        })
    }
}

impl TryFrom<String> for ScheduleId {
    type Error = WalletError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ScheduleId> for String {
    fn from(value: ScheduleId) -> Self {
        value.to_string()
    }
}

// ═══════════════════════════════════════════
// Schedule
// ═══════════════════════════════════════════

/// Concrete dosing plan derived from one medication of one prescription.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: ScheduleId,
    pub prescription_id: PrescriptionId,
    pub medication_index: usize,
    pub medication: Medication,
    pub doctor: String,
    /// Ascending, never empty.
    pub scheduled_times: Vec<DoseTime>,
    pub start_date: NaiveDate,
    /// Last scheduled day, inclusive.
    pub end_date: NaiveDate,
    pub days_remaining: i64,
}

impl Schedule {
    pub fn doses_per_day(&self) -> usize {
        self.scheduled_times.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dose_time_parses_and_displays_zero_padded() {
        let t: DoseTime = "8:05".parse().unwrap();
        assert_eq!(t.to_string(), "08:05");
        assert_eq!(t.minutes_of_day(), 485);
    }

    #[test]
    fn dose_time_rejects_out_of_range() {
        assert!("24:00".parse::<DoseTime>().is_err());
        assert!("12:60".parse::<DoseTime>().is_err());
        assert!("noon".parse::<DoseTime>().is_err());
        assert!("12:5".parse::<DoseTime>().is_err());
    }

    #[test]
    fn dose_time_orders_by_clock() {
        let mut times = vec![DoseTime::EVENING, DoseTime::MORNING, DoseTime::AFTERNOON];
        times.sort();
        assert_eq!(times, vec![DoseTime::MORNING, DoseTime::AFTERNOON, DoseTime::EVENING]);
    }

    #[test]
    fn dose_time_of_truncates_seconds() {
        let t = DoseTime::of(NaiveTime::from_hms_opt(14, 59, 59).unwrap());
        assert_eq!(t.to_string(), "14:59");
    }

    #[test]
    fn dose_time_serialises_as_string() {
        let json = serde_json::to_string(&DoseTime::BEDTIME).unwrap();
        assert_eq!(json, "\"22:00\"");
        let back: DoseTime = serde_json::from_str("\"07:30\"").unwrap();
        assert_eq!(back, DoseTime::new(7, 30).unwrap());
    }

    #[test]
    fn schedule_id_round_trips_through_string() {
        let id = ScheduleId::new(6, 2);
        assert_eq!(id.to_string(), "6-2");
        assert_eq!("6-2".parse::<ScheduleId>().unwrap(), id);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"6-2\"");
    }

    #[test]
    fn schedule_id_rejects_garbage() {
        assert!("abc".parse::<ScheduleId>().is_err());
        assert!("1-x".parse::<ScheduleId>().is_err());
        assert!(serde_json::from_str::<ScheduleId>("\"7\"").is_err());
    }
}
