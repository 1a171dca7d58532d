//! Conflict detection for new or edited tasks.
//!
//! Given a candidate task and the rest of the collection, the detector:
//! - decides which existing tasks can co-occur with the candidate
//! - reports every one whose time window intersects the candidate's
//! - grades the result (`error` when a same-category task collides)
//! - proposes a later start by probing forward in fixed steps
//!
//! "Today" is injected as a reference date so results never depend on the
//! process clock.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::{Frequency, Task, TaskCategory, TaskType};
use crate::time::{self, TimeRange, MINUTES_PER_DAY};

/// How two daily tasks' frequencies must relate before they are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyMatch {
    /// Compare only identical frequencies.
    ///
    /// A daily task stored without a frequency still counts as `daily` here,
    /// so it matches a task whose frequency is `daily`.
    Exact,
    /// Compare whenever the two frequencies share a weekday.
    Overlapping,
}

impl Default for FrequencyMatch {
    fn default() -> Self {
        FrequencyMatch::Overlapping
    }
}

/// Detector tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConflictConfig {
    /// Distance between probed start times (minutes)
    pub probe_step_minutes: u32,
    /// Maximum number of probes, the first being the requested start
    pub probe_count: u32,
    /// Duration assumed for each probe (minutes)
    pub probe_duration_minutes: u32,
    pub frequency_match: FrequencyMatch,
}

impl Default for ConflictConfig {
    fn default() -> Self {
        Self {
            probe_step_minutes: 30,
            probe_count: 24,
            probe_duration_minutes: time::DEFAULT_DURATION_MINUTES,
            frequency_match: FrequencyMatch::default(),
        }
    }
}

/// Why two tasks collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// Time windows intersect.
    Overlap,
    /// Time windows intersect and both tasks share a category.
    Category,
}

/// Aggregate grade of a conflict report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    /// Save may proceed after warning the user.
    Warning,
    /// Save must be refused.
    Error,
}

impl ConflictKind {
    pub fn severity(&self) -> Severity {
        match self {
            Self::Overlap => Severity::Warning,
            Self::Category => Severity::Error,
        }
    }
}

/// One existing task that collides with the candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictEntry {
    pub task_id: String,
    pub title: String,
    pub kind: ConflictKind,
    pub category: TaskCategory,
    /// The colliding task's `HH:MM` start
    pub start_time: String,
    pub message: String,
}

impl ConflictEntry {
    fn new(other: &Task, start_time: String, kind: ConflictKind) -> Self {
        let message = match kind {
            ConflictKind::Category => format!("another {} task at {}", other.category, start_time),
            ConflictKind::Overlap => format!("another task at {}", start_time),
        };
        Self {
            task_id: other.id.clone(),
            title: other.title.clone(),
            kind,
            category: other.category,
            start_time,
            message,
        }
    }
}

/// Result of checking one candidate against the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub has_conflicts: bool,
    pub severity: Severity,
    pub conflicts: Vec<ConflictEntry>,
    /// Present whenever conflicts exist. Equal to the requested start when
    /// the probe horizon held no free slot; see `suggestion_verified`.
    pub suggested_start: Option<String>,
    /// True when `suggested_start` was checked to be conflict-free.
    pub suggestion_verified: bool,
}

impl ConflictReport {
    /// Report with no conflicts.
    pub fn clear() -> Self {
        Self {
            has_conflicts: false,
            severity: Severity::None,
            conflicts: Vec::new(),
            suggested_start: None,
            suggestion_verified: false,
        }
    }

    /// Whether the caller must refuse to persist the candidate.
    pub fn blocks_save(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Checks candidates against an existing task collection.
#[derive(Debug, Clone)]
pub struct ConflictDetector {
    config: ConflictConfig,
    reference_date: NaiveDate,
}

impl ConflictDetector {
    /// Detector with default settings, treating `reference_date` as today.
    pub fn new(reference_date: NaiveDate) -> Self {
        Self {
            config: ConflictConfig::default(),
            reference_date,
        }
    }

    /// Create with custom config
    pub fn with_config(config: ConflictConfig, reference_date: NaiveDate) -> Self {
        Self {
            config,
            reference_date,
        }
    }

    pub fn config(&self) -> &ConflictConfig {
        &self.config
    }

    /// Check `candidate` against `others`.
    ///
    /// `others` may contain the candidate itself (e.g. when editing); it is
    /// skipped by id.
    pub fn detect(&self, candidate: &Task, others: &[Task]) -> ConflictReport {
        let Some(candidate_range) = self.checkable_range(candidate) else {
            return ConflictReport::clear();
        };

        let eligible: Vec<(&Task, TimeRange)> = others
            .iter()
            .filter(|other| self.can_co_occur(candidate, other))
            .filter_map(|other| self.checkable_range(other).map(|range| (other, range)))
            .collect();

        let conflicts: Vec<ConflictEntry> = eligible
            .iter()
            .filter(|(_, range)| candidate_range.overlaps(range))
            .map(|(other, range)| {
                let kind = if other.category == candidate.category {
                    ConflictKind::Category
                } else {
                    ConflictKind::Overlap
                };
                ConflictEntry::new(other, time::to_time_string(range.start), kind)
            })
            .collect();

        if conflicts.is_empty() {
            return ConflictReport::clear();
        }

        let severity = conflicts
            .iter()
            .map(|c| c.kind.severity())
            .max()
            .unwrap_or(Severity::None);

        let ranges: Vec<TimeRange> = eligible.iter().map(|(_, range)| *range).collect();
        let found = self.find_free_start(candidate_range.start, &ranges);

        tracing::debug!(
            candidate = %candidate.id,
            conflicts = conflicts.len(),
            ?severity,
            suggested = ?found.map(time::to_time_string),
            "conflict check finished"
        );

        ConflictReport {
            has_conflicts: true,
            severity,
            conflicts,
            suggested_start: Some(time::to_time_string(
                found.unwrap_or(candidate_range.start),
            )),
            suggestion_verified: found.is_some(),
        }
    }

    /// First probed start whose probe window avoids every range.
    ///
    /// Probes run `start + step * k` for `k` in `0..probe_count` and stop at
    /// midnight.
    pub fn find_free_start(&self, start: u32, occupied: &[TimeRange]) -> Option<u32> {
        (0..self.config.probe_count)
            .map(|k| start.saturating_add(k.saturating_mul(self.config.probe_step_minutes)))
            .take_while(|probe| *probe < MINUTES_PER_DAY)
            .find(|probe| {
                let window = TimeRange::with_duration(*probe, self.config.probe_duration_minutes);
                occupied.iter().all(|range| !window.overlaps(range))
            })
    }

    /// Range of a task that takes part in conflict checking at all.
    fn checkable_range(&self, task: &Task) -> Option<TimeRange> {
        if task.completed || task.is_flexible() {
            return None;
        }
        task.time_range()
    }

    /// Whether `a` and `b` can happen on the same day.
    fn can_co_occur(&self, a: &Task, b: &Task) -> bool {
        if a.id == b.id || a.completed || b.completed {
            return false;
        }

        match (a.task_type, b.task_type) {
            (TaskType::Flexible, _) | (_, TaskType::Flexible) => false,
            (TaskType::Daily, TaskType::Daily) => {
                let fa = a.frequency.unwrap_or_default();
                let fb = b.frequency.unwrap_or_default();
                self.frequencies_match(fa, fb)
            }
            (TaskType::Once, TaskType::Once) => {
                let da = a.resolved_date(self.reference_date);
                da.is_some() && da == b.resolved_date(self.reference_date)
            }
            (TaskType::Daily, TaskType::Once) => self.is_today(b),
            (TaskType::Once, TaskType::Daily) => self.is_today(a),
        }
    }

    fn frequencies_match(&self, a: Frequency, b: Frequency) -> bool {
        match self.config.frequency_match {
            FrequencyMatch::Exact => a == b,
            FrequencyMatch::Overlapping => a.shares_day_with(&b),
        }
    }

    fn is_today(&self, once: &Task) -> bool {
        once.resolved_date(self.reference_date) == Some(self.reference_date)
    }
}

/// Convenience function to check a candidate with default settings.
pub fn detect_conflicts(candidate: &Task, others: &[Task], reference_date: NaiveDate) -> ConflictReport {
    ConflictDetector::new(reference_date).detect(candidate, others)
}
