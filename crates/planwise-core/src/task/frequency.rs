//! Recurrence patterns for daily tasks.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Which calendar days a daily task is active on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    Weekdays,
    MondayToSaturday,
    Weekends,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Frequency {
    pub const ALL: [Frequency; 11] = [
        Frequency::Daily,
        Frequency::Weekdays,
        Frequency::MondayToSaturday,
        Frequency::Weekends,
        Frequency::Monday,
        Frequency::Tuesday,
        Frequency::Wednesday,
        Frequency::Thursday,
        Frequency::Friday,
        Frequency::Saturday,
        Frequency::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekdays => "weekdays",
            Self::MondayToSaturday => "monday_to_saturday",
            Self::Weekends => "weekends",
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
            Self::Sunday => "sunday",
        }
    }

    /// Days this pattern covers.
    pub fn days(&self) -> WeekdaySet {
        match self {
            Self::Daily => WeekdaySet::ALL,
            Self::Weekdays => WeekdaySet::from_days(&[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ]),
            Self::MondayToSaturday => WeekdaySet::from_days(&[
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
            ]),
            Self::Weekends => WeekdaySet::from_days(&[Weekday::Sat, Weekday::Sun]),
            Self::Monday => WeekdaySet::single(Weekday::Mon),
            Self::Tuesday => WeekdaySet::single(Weekday::Tue),
            Self::Wednesday => WeekdaySet::single(Weekday::Wed),
            Self::Thursday => WeekdaySet::single(Weekday::Thu),
            Self::Friday => WeekdaySet::single(Weekday::Fri),
            Self::Saturday => WeekdaySet::single(Weekday::Sat),
            Self::Sunday => WeekdaySet::single(Weekday::Sun),
        }
    }

    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.days().contains(date.weekday())
    }

    /// Whether two patterns share at least one weekday.
    pub fn shares_day_with(&self, other: &Frequency) -> bool {
        self.days().intersects(other.days())
    }
}

impl Default for Frequency {
    fn default() -> Self {
        Frequency::Daily
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "frequency".to_string(),
                message: format!("unknown frequency '{s}'"),
            })
    }
}

/// Bit set of weekdays, bit 0 = Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct WeekdaySet(u8);

impl WeekdaySet {
    pub const ALL: WeekdaySet = WeekdaySet(0b111_1111);

    pub fn single(day: Weekday) -> Self {
        Self(1 << day.num_days_from_monday())
    }

    pub fn from_days(days: &[Weekday]) -> Self {
        days.iter()
            .fold(Self::default(), |set, day| Self(set.0 | Self::single(*day).0))
    }

    pub fn contains(&self, day: Weekday) -> bool {
        self.0 & Self::single(day).0 != 0
    }

    pub fn intersects(&self, other: WeekdaySet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}
