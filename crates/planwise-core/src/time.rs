//! Wall-clock time arithmetic shared by the conflict detector and the optimizer.
//!
//! Times are minutes since local midnight. Ranges are half-open, so a block
//! ending at `10:00` and one starting at `10:00` do not overlap.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minutes in one day.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Duration assumed for a task that has no explicit end time.
pub const DEFAULT_DURATION_MINUTES: u32 = 60;

/// Parse a zero-padded `HH:MM` string into minutes since midnight.
pub fn to_minutes(time: &str) -> Result<u32, ValidationError> {
    let invalid = || ValidationError::InvalidTime(time.to_string());

    let (hours, minutes) = time.split_once(':').ok_or_else(invalid)?;
    if hours.len() != 2 || minutes.len() != 2 {
        return Err(invalid());
    }
    if !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    Ok(hours * 60 + minutes)
}

/// Like [`to_minutes`], but also accepts `24:00` for a block that runs to
/// the end of the day.
pub fn to_end_minutes(time: &str) -> Result<u32, ValidationError> {
    if time == "24:00" {
        return Ok(MINUTES_PER_DAY);
    }
    to_minutes(time)
}

/// Format minutes since midnight as `HH:MM`.
///
/// Values past the end of the day wrap onto the next day, so `1500`
/// formats as `01:00` rather than `25:00`.
pub fn to_time_string(minutes: u32) -> String {
    let minutes = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// A half-open `[start, end)` span of minutes within a day.
///
/// `end` may exceed [`MINUTES_PER_DAY`] when a block runs past midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: u32,
    pub end: u32,
}

impl TimeRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// Range starting at `start` lasting `minutes`.
    pub fn with_duration(start: u32, minutes: u32) -> Self {
        Self {
            start,
            end: start.saturating_add(minutes),
        }
    }

    /// Build a range from task clock fields. A missing end means one hour.
    pub fn from_clock(start: &str, end: Option<&str>) -> Result<Self, ValidationError> {
        let start_minutes = to_minutes(start)?;
        let end_minutes = match end {
            Some(end) => to_minutes(end)?,
            None => start_minutes + DEFAULT_DURATION_MINUTES,
        };
        Ok(Self::new(start_minutes, end_minutes))
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Half-open intersection test.
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Whether `minutes` fit between the range start and its end.
    pub fn can_fit(&self, minutes: u32) -> bool {
        self.duration_minutes() >= minutes
    }

    pub fn start_string(&self) -> String {
        to_time_string(self.start)
    }

    pub fn end_string(&self) -> String {
        to_time_string(self.end)
    }
}

impl std::fmt::Display for TimeRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.start_string(), self.end_string())
    }
}
