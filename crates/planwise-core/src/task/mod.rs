//! Task model shared by every planner component.
//!
//! A task is one of three kinds:
//!
//! - `daily`: recurs on the days selected by its [`Frequency`], at a fixed time
//! - `once`: happens on a single date (missing date = today), at a fixed time
//! - `flexible`: has no time of its own; the optimizer proposes one
//!
//! The surrounding application owns and mutates tasks. The engines only read
//! them, apart from the optimizer's `suggested_time` write-back.

pub mod frequency;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::time::{self, TimeRange};

pub use frequency::{Frequency, WeekdaySet};

/// Format of the `date` field on once tasks.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Kind of task scheduling semantics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Recurring task active on days matching its frequency.
    Daily,
    /// Single occurrence anchored to a date.
    Once,
    /// No fixed time; eligible for automatic slot assignment.
    Flexible,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Once => "once",
            Self::Flexible => "flexible",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Self::Daily),
            "once" => Ok(Self::Once),
            "flexible" => Ok(Self::Flexible),
            other => Err(ValidationError::InvalidValue {
                field: "type".to_string(),
                message: format!("unknown task type '{other}'"),
            }),
        }
    }
}

/// Life area a task belongs to. Two colliding tasks of the same category
/// escalate a conflict from a warning to an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Medicine,
    Appointment,
    Work,
    Family,
    Personal,
    School,
}

impl TaskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medicine => "medicine",
            Self::Appointment => "appointment",
            Self::Work => "work",
            Self::Family => "family",
            Self::Personal => "personal",
            Self::School => "school",
        }
    }
}

impl Default for TaskCategory {
    fn default() -> Self {
        TaskCategory::Personal
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "medicine" => Ok(Self::Medicine),
            "appointment" => Ok(Self::Appointment),
            "work" => Ok(Self::Work),
            "family" => Ok(Self::Family),
            "personal" => Ok(Self::Personal),
            "school" => Ok(Self::School),
            other => Err(ValidationError::InvalidValue {
                field: "category".to_string(),
                message: format!("unknown category '{other}'"),
            }),
        }
    }
}

/// Horizon a flexible task should be done within. Metadata only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FlexibleDuration {
    Day,
    Week,
}

impl FlexibleDuration {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

impl FromStr for FlexibleDuration {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            other => Err(ValidationError::InvalidValue {
                field: "flexibleDuration".to_string(),
                message: format!("unknown flexible duration '{other}'"),
            }),
        }
    }
}

/// A planner task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Task kind
    #[serde(rename = "type")]
    pub task_type: TaskType,
    /// Completed tasks are ignored by every engine
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: TaskCategory,
    /// Recurrence (daily tasks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    /// Horizon (flexible tasks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flexible_duration: Option<FlexibleDuration>,
    /// `HH:MM` start (daily/once tasks)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// `HH:MM` end; one hour after start when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// ISO date (once tasks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// `HH:MM` proposed by the optimizer (flexible tasks only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_time: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a new task with no time fields set.
    pub fn new(title: impl Into<String>, task_type: TaskType, category: TaskCategory) -> Self {
        Task {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            task_type,
            completed: false,
            category,
            frequency: None,
            flexible_duration: None,
            start_time: None,
            end_time: None,
            date: None,
            suggested_time: None,
            created_at: Utc::now(),
        }
    }

    /// Daily task at `start`, recurring on `frequency`.
    pub fn daily(
        title: impl Into<String>,
        category: TaskCategory,
        frequency: Frequency,
        start: impl Into<String>,
    ) -> Self {
        Self::new(title, TaskType::Daily, category)
            .with_frequency(frequency)
            .with_start(start)
    }

    /// Once task at `start`; dated today unless [`Task::with_date`] is applied.
    pub fn once(title: impl Into<String>, category: TaskCategory, start: impl Into<String>) -> Self {
        Self::new(title, TaskType::Once, category).with_start(start)
    }

    /// Flexible task without a time.
    pub fn flexible(title: impl Into<String>, category: TaskCategory) -> Self {
        Self::new(title, TaskType::Flexible, category)
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_frequency(mut self, frequency: Frequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_start(mut self, start: impl Into<String>) -> Self {
        self.start_time = Some(start.into());
        self
    }

    pub fn with_end(mut self, end: impl Into<String>) -> Self {
        self.end_time = Some(end.into());
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date.format(DATE_FORMAT).to_string());
        self
    }

    pub fn with_flexible_duration(mut self, duration: FlexibleDuration) -> Self {
        self.flexible_duration = Some(duration);
        self
    }

    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    pub fn is_flexible(&self) -> bool {
        self.task_type == TaskType::Flexible
    }

    /// Not completed.
    pub fn is_active(&self) -> bool {
        !self.completed
    }

    /// Flip the completion flag.
    pub fn toggle_completed(&mut self) {
        self.completed = !self.completed;
    }

    /// The task's time window, if it has a usable start time.
    ///
    /// Malformed times are logged and treated as "no time".
    pub fn time_range(&self) -> Option<TimeRange> {
        let start = self.start_time.as_deref()?;
        match TimeRange::from_clock(start, self.end_time.as_deref()) {
            Ok(range) => Some(range),
            Err(e) => {
                tracing::warn!(task_id = %self.id, error = %e, "ignoring task with malformed time");
                None
            }
        }
    }

    /// The date a once task falls on, with a missing date meaning `reference`.
    ///
    /// Returns `None` if the stored date cannot be parsed.
    pub fn resolved_date(&self, reference: NaiveDate) -> Option<NaiveDate> {
        match self.date.as_deref() {
            None => Some(reference),
            Some(raw) => match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(_) => {
                    tracing::warn!(task_id = %self.id, date = raw, "ignoring malformed task date");
                    None
                }
            },
        }
    }

    /// Whether the task belongs on the agenda for `date`.
    ///
    /// Daily tasks without a frequency are always shown.
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        match self.task_type {
            TaskType::Daily => self.frequency.map_or(true, |f| f.is_active_on(date)),
            TaskType::Once => self.resolved_date(date) == Some(date),
            TaskType::Flexible => true,
        }
    }

    /// Check the data-model invariants. Call this before persisting.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "title".to_string(),
                message: "title must not be empty".to_string(),
            });
        }

        let not_allowed = |field: &str| ValidationError::FieldNotAllowed {
            field: field.to_string(),
            task_type: self.task_type.to_string(),
        };

        match self.task_type {
            TaskType::Flexible => {
                if self.start_time.is_some() {
                    return Err(not_allowed("startTime"));
                }
                if self.end_time.is_some() {
                    return Err(not_allowed("endTime"));
                }
                if self.frequency.is_some() {
                    return Err(not_allowed("frequency"));
                }
                if self.date.is_some() {
                    return Err(not_allowed("date"));
                }
            }
            TaskType::Daily | TaskType::Once => {
                if self.task_type == TaskType::Daily && self.date.is_some() {
                    return Err(not_allowed("date"));
                }
                if self.task_type == TaskType::Once && self.frequency.is_some() {
                    return Err(not_allowed("frequency"));
                }
                if self.flexible_duration.is_some() {
                    return Err(not_allowed("flexibleDuration"));
                }
                if self.suggested_time.is_some() {
                    return Err(not_allowed("suggestedTime"));
                }
                let start = self.start_time.as_deref().ok_or_else(|| ValidationError::MissingField {
                    field: "startTime".to_string(),
                    task_type: self.task_type.to_string(),
                })?;
                let start_minutes = time::to_minutes(start)?;
                if let Some(end) = self.end_time.as_deref() {
                    if time::to_minutes(end)? < start_minutes {
                        return Err(ValidationError::InvalidTimeRange {
                            start: start.to_string(),
                            end: end.to_string(),
                        });
                    }
                }
            }
        }

        if let Some(raw) = self.date.as_deref() {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_| ValidationError::InvalidDate(raw.to_string()))?;
        }
        if let Some(suggested) = self.suggested_time.as_deref() {
            time::to_minutes(suggested)?;
        }

        Ok(())
    }
}
