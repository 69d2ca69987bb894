use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "kebab-case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Ledger-side outcome of a dose event.
str_enum!(IntakeStatus {
    Taken => "taken",
    Missed => "missed",
    Skipped => "skipped",
});

// Status of one dose slot on one date.
str_enum!(DoseStatus {
    Upcoming => "upcoming",
    Pending => "pending",
    Missed => "missed",
    Taken => "taken",
});

// Status of all of a schedule's slots on one date.
str_enum!(DayStatus {
    Taken => "taken",
    Partial => "partial",
    Pending => "pending",
    Missed => "missed",
    Upcoming => "upcoming",
    Extended => "extended",
    NotScheduled => "not-scheduled",
});

// Reduced vocabulary for the today list.
str_enum!(TodayStatus {
    Pending => "pending",
    Taken => "taken",
    Missed => "missed",
});

impl IntakeStatus {
    /// How a ledger record settles its dose slot. Skipped counts as missed.
    pub fn dose_status(self) -> DoseStatus {
        match self {
            IntakeStatus::Taken => DoseStatus::Taken,
            IntakeStatus::Missed | IntakeStatus::Skipped => DoseStatus::Missed,
        }
    }
}

impl From<DoseStatus> for TodayStatus {
    /// The today list does not distinguish a dose that is not due yet.
    fn from(status: DoseStatus) -> Self {
        match status {
            DoseStatus::Upcoming | DoseStatus::Pending => TodayStatus::Pending,
            DoseStatus::Missed => TodayStatus::Missed,
            DoseStatus::Taken => TodayStatus::Taken,
        }
    }
}

impl DayStatus {
    /// Fold the dose statuses of one in-window, not-future date into a day status.
    ///
    /// - every slot taken: `Taken`
    /// - a missed slot next to a taken one: `Partial`
    /// - a missed slot and nothing taken: `Missed`
    /// - nothing missed yet: `Pending` (only reachable for today)
    pub fn from_doses(doses: &[DoseStatus]) -> Self {
        let taken = doses.iter().filter(|s| **s == DoseStatus::Taken).count();
        let missed = doses.iter().filter(|s| **s == DoseStatus::Missed).count();

        if !doses.is_empty() && taken == doses.len() {
            DayStatus::Taken
        } else if missed > 0 && taken > 0 {
            DayStatus::Partial
        } else if missed > 0 {
            DayStatus::Missed
        } else {
            DayStatus::Pending
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn intake_status_round_trips_through_str() {
        for status in [IntakeStatus::Taken, IntakeStatus::Missed, IntakeStatus::Skipped] {
            assert_eq!(IntakeStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unknown_value_is_invalid_enum() {
        let err = DayStatus::from_str("sideways").unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InvalidEnum { ref field, ref value }
                if field == "DayStatus" && value == "sideways"
        ));
    }

    #[test]
    fn serde_uses_kebab_case() {
        let json = serde_json::to_string(&DayStatus::NotScheduled).unwrap();
        assert_eq!(json, "\"not-scheduled\"");
        let back: DayStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, DayStatus::NotScheduled);
    }

    #[test]
    fn skipped_record_settles_as_missed() {
        assert_eq!(IntakeStatus::Skipped.dose_status(), DoseStatus::Missed);
        assert_eq!(IntakeStatus::Taken.dose_status(), DoseStatus::Taken);
    }

    #[test]
    fn upcoming_dose_shows_as_pending_today() {
        assert_eq!(TodayStatus::from(DoseStatus::Upcoming), TodayStatus::Pending);
        assert_eq!(TodayStatus::from(DoseStatus::Pending), TodayStatus::Pending);
        assert_eq!(TodayStatus::from(DoseStatus::Missed), TodayStatus::Missed);
    }

    #[test]
    fn day_from_doses_all_taken() {
        let doses = [DoseStatus::Taken, DoseStatus::Taken];
        assert_eq!(DayStatus::from_doses(&doses), DayStatus::Taken);
    }

    #[test]
    fn day_from_doses_partial_needs_a_taken_slot() {
        let doses = [DoseStatus::Taken, DoseStatus::Missed, DoseStatus::Upcoming];
        assert_eq!(DayStatus::from_doses(&doses), DayStatus::Partial);
        let doses = [DoseStatus::Missed, DoseStatus::Pending];
        assert_eq!(DayStatus::from_doses(&doses), DayStatus::Missed);
    }

    #[test]
    fn day_from_doses_pending_while_nothing_missed() {
        let doses = [DoseStatus::Taken, DoseStatus::Pending, DoseStatus::Upcoming];
        assert_eq!(DayStatus::from_doses(&doses), DayStatus::Pending);
    }
}
