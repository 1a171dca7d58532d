//! Daily optimizer: proposes times for flexible tasks.
//!
//! The optimizer:
//! - collects the day's occupied ranges (timed tasks plus fixed sleep and
//!   morning blocks)
//! - finds free gaps inside the working window
//! - places flexible tasks first-fit, in list order, one slot-length each
//!
//! Planning is pure; [`OptimizationOutcome::apply`] writes the result back
//! onto the caller's tasks.

mod gap;

pub use gap::GapFinder;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::task::Task;
use crate::time::{self, TimeRange};

/// A block of the day that is reserved unless a real task already sits there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedBlock {
    pub label: String,
    /// `HH:MM`
    pub start: String,
    /// `HH:MM`, or `24:00` for the end of the day
    pub end: String,
}

impl FixedBlock {
    pub fn new(label: impl Into<String>, start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            start: start.into(),
            end: end.into(),
        }
    }

    pub fn range(&self) -> Result<TimeRange, ValidationError> {
        let start = time::to_minutes(&self.start)?;
        let end = time::to_end_minutes(&self.end)?;
        if end <= start {
            return Err(ValidationError::InvalidTimeRange {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }
        Ok(TimeRange::new(start, end))
    }

    /// Late-evening sleep, morning sleep, morning routine.
    pub fn defaults() -> Vec<FixedBlock> {
        vec![
            FixedBlock::new("Sleep", "23:00", "24:00"),
            FixedBlock::new("Sleep", "00:00", "06:00"),
            FixedBlock::new("Morning routine", "06:00", "07:00"),
        ]
    }
}

/// Optimizer tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Earliest time a flexible task may be placed (`HH:MM`)
    pub window_start: String,
    /// End of the placement window (`HH:MM`, or `24:00`)
    pub window_end: String,
    /// Length reserved per flexible task; also the minimum usable gap
    pub slot_minutes: u32,
    pub fixed_blocks: Vec<FixedBlock>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            window_start: "07:00".to_string(),
            window_end: "23:00".to_string(),
            slot_minutes: time::DEFAULT_DURATION_MINUTES,
            fixed_blocks: FixedBlock::defaults(),
        }
    }
}

/// Suggested time for one flexible task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub suggested_time: String,
}

/// The result of one optimization pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulePlan {
    /// In the order the flexible tasks appear in the input.
    pub assignments: Vec<Assignment>,
    /// Active flexible tasks that got no slot; their suggestion is removed.
    pub cleared: Vec<String>,
    /// Free gaps found before any assignment.
    pub free_slots: Vec<TimeRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OptimizationOutcome {
    /// No active flexible tasks; nothing is changed.
    NothingToOptimize,
    Optimized(SchedulePlan),
}

impl OptimizationOutcome {
    pub fn plan(&self) -> Option<&SchedulePlan> {
        match self {
            Self::NothingToOptimize => None,
            Self::Optimized(plan) => Some(plan),
        }
    }

    /// Write suggestions onto `tasks`. Returns how many tasks changed.
    ///
    /// Only tasks named in the plan are touched.
    pub fn apply(&self, tasks: &mut [Task]) -> usize {
        let Some(plan) = self.plan() else {
            return 0;
        };

        let mut changed = 0;
        for task in tasks.iter_mut() {
            let next = if let Some(a) = plan.assignments.iter().find(|a| a.id == task.id) {
                Some(a.suggested_time.clone())
            } else if plan.cleared.contains(&task.id) {
                None
            } else {
                continue;
            };

            if task.suggested_time != next {
                task.suggested_time = next;
                changed += 1;
            }
        }
        changed
    }
}

/// Greedy first-fit placement of flexible tasks into free gaps.
#[derive(Debug, Clone)]
pub struct DailyOptimizer {
    window: TimeRange,
    slot_minutes: u32,
    fixed_blocks: Vec<TimeRange>,
}

impl DailyOptimizer {
    /// Optimizer with the default 07:00-23:00 window and sleep/morning blocks.
    pub fn new() -> Self {
        Self {
            window: TimeRange::new(7 * 60, 23 * 60),
            slot_minutes: time::DEFAULT_DURATION_MINUTES,
            fixed_blocks: vec![
                TimeRange::new(23 * 60, 24 * 60),
                TimeRange::new(0, 6 * 60),
                TimeRange::new(6 * 60, 7 * 60),
            ],
        }
    }

    /// Create with custom config, validating every time field.
    pub fn with_config(config: &OptimizerConfig) -> Result<Self, ValidationError> {
        let start = time::to_minutes(&config.window_start)?;
        let end = time::to_end_minutes(&config.window_end)?;
        if end <= start {
            return Err(ValidationError::InvalidTimeRange {
                start: config.window_start.clone(),
                end: config.window_end.clone(),
            });
        }
        if config.slot_minutes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "slot_minutes".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        let fixed_blocks = config
            .fixed_blocks
            .iter()
            .map(FixedBlock::range)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            window: TimeRange::new(start, end),
            slot_minutes: config.slot_minutes,
            fixed_blocks,
        })
    }

    pub fn window(&self) -> TimeRange {
        self.window
    }

    /// Compute suggestions without touching `tasks`.
    pub fn plan(&self, tasks: &[Task]) -> OptimizationOutcome {
        let flexible: Vec<&Task> = tasks
            .iter()
            .filter(|t| t.is_flexible() && t.is_active())
            .collect();

        if flexible.is_empty() {
            tracing::debug!("no active flexible tasks, nothing to optimize");
            return OptimizationOutcome::NothingToOptimize;
        }

        let occupied = self.occupied_ranges(tasks);
        let free_slots = GapFinder::new(self.window)
            .with_min_gap(self.slot_minutes)
            .find_gaps(&occupied);

        let mut slots = free_slots.clone();
        let mut assignments = Vec::new();
        for task in &flexible {
            let Some((start, remaining)) = take_first_fit(&slots, self.slot_minutes) else {
                tracing::debug!(task_id = %task.id, "no free slot left");
                break;
            };
            assignments.push(Assignment {
                id: task.id.clone(),
                suggested_time: time::to_time_string(start),
            });
            slots = remaining;
        }

        let cleared: Vec<String> = flexible
            .iter()
            .filter(|t| !assignments.iter().any(|a| a.id == t.id))
            .map(|t| t.id.clone())
            .collect();

        tracing::info!(
            flexible = flexible.len(),
            assigned = assignments.len(),
            cleared = cleared.len(),
            free_slots = free_slots.len(),
            "optimization pass finished"
        );

        OptimizationOutcome::Optimized(SchedulePlan {
            assignments,
            cleared,
            free_slots,
        })
    }

    /// Plan and apply in one step.
    pub fn optimize(&self, tasks: &mut [Task]) -> OptimizationOutcome {
        let outcome = self.plan(tasks);
        outcome.apply(tasks);
        outcome
    }

    /// Timed tasks plus every fixed block no real task overlaps, by start.
    fn occupied_ranges(&self, tasks: &[Task]) -> Vec<TimeRange> {
        let mut occupied: Vec<TimeRange> = tasks
            .iter()
            .filter(|t| t.is_active())
            .filter_map(Task::time_range)
            .collect();
        occupied.sort_by_key(|r| r.start);

        let free_blocks: Vec<TimeRange> = self
            .fixed_blocks
            .iter()
            .filter(|block| !occupied.iter().any(|r| r.overlaps(block)))
            .copied()
            .collect();

        occupied.extend(free_blocks);
        occupied.sort_by_key(|r| r.start);
        occupied
    }
}

impl Default for DailyOptimizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reserve `minutes` at the start of the first slot that can hold them.
///
/// Returns the reserved start and the slot list after the reservation; the
/// input is left as it was.
fn take_first_fit(slots: &[TimeRange], minutes: u32) -> Option<(u32, Vec<TimeRange>)> {
    let index = slots.iter().position(|slot| slot.can_fit(minutes))?;
    let start = slots[index].start;

    let remaining = slots
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            if i == index {
                TimeRange::new(slot.start + minutes, slot.end)
            } else {
                *slot
            }
        })
        .collect();

    Some((start, remaining))
}

/// Convenience function to plan with default settings.
pub fn optimize_day(tasks: &[Task]) -> OptimizationOutcome {
    DailyOptimizer::new().plan(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Frequency, TaskCategory};

    fn timed(id: &str, start: &str, end: &str) -> Task {
        Task::daily(id, TaskCategory::Work, Frequency::Daily, start)
            .with_end(end)
            .with_id(id)
    }

    fn flexible(id: &str) -> Task {
        Task::flexible(id, TaskCategory::Personal).with_id(id)
    }

    fn suggestions(tasks: &[Task]) -> Vec<Option<&str>> {
        tasks.iter().map(|t| t.suggested_time.as_deref()).collect()
    }

    #[test]
    fn first_gap_of_the_working_window_wins() {
        let mut tasks = vec![
            timed("a", "08:00", "09:00"),
            timed("b", "12:00", "13:00"),
            flexible("f"),
        ];

        let outcome = DailyOptimizer::new().optimize(&mut tasks);

        let plan = outcome.plan().unwrap();
        assert_eq!(
            plan.assignments,
            vec![Assignment {
                id: "f".to_string(),
                suggested_time: "07:00".to_string()
            }]
        );
        assert_eq!(
            plan.free_slots,
            vec![
                TimeRange::new(420, 480),
                TimeRange::new(540, 720),
                TimeRange::new(780, 1380)
            ]
        );
        assert_eq!(tasks[2].suggested_time.as_deref(), Some("07:00"));
    }

    #[test]
    fn nothing_to_optimize_leaves_tasks_alone() {
        let mut tasks = vec![
            timed("a", "08:00", "09:00"),
            flexible("done").with_completed(true),
        ];
        tasks[1].suggested_time = Some("10:00".to_string());
        let before = tasks.clone();

        let outcome = DailyOptimizer::new().optimize(&mut tasks);

        assert_eq!(outcome, OptimizationOutcome::NothingToOptimize);
        assert_eq!(tasks, before);
    }

    #[test]
    fn slots_shrink_as_tasks_are_placed() {
        let tasks = vec![
            timed("a", "09:00", "10:00"),
            flexible("f1"),
            flexible("f2"),
            flexible("f3"),
        ];

        let plan = optimize_day(&tasks);
        let times: Vec<&str> = plan
            .plan()
            .unwrap()
            .assignments
            .iter()
            .map(|a| a.suggested_time.as_str())
            .collect();

        assert_eq!(times, vec!["07:00", "08:00", "10:00"]);
    }

    #[test]
    fn exhausted_slots_clear_remaining_tasks() {
        // Only 07:00-09:00 is free.
        let mut tasks = vec![
            timed("a", "09:00", "23:00"),
            flexible("f1"),
            flexible("f2"),
            flexible("f3"),
        ];
        tasks[3].suggested_time = Some("15:00".to_string());

        let outcome = DailyOptimizer::new().optimize(&mut tasks);

        let plan = outcome.plan().unwrap();
        assert_eq!(plan.cleared, vec!["f3".to_string()]);
        assert_eq!(suggestions(&tasks), vec![None, Some("07:00"), Some("08:00"), None]);
    }

    #[test]
    fn partial_slots_are_skipped() {
        // 07:30-09:00 fits one task and leaves 30 minutes behind.
        let tasks = vec![
            timed("a", "07:00", "07:30"),
            timed("b", "09:00", "23:00"),
            flexible("f1"),
            flexible("f2"),
        ];

        let plan = optimize_day(&tasks);
        let plan = plan.plan().unwrap();

        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].suggested_time, "07:30");
        assert_eq!(plan.cleared, vec!["f2".to_string()]);
    }

    #[test]
    fn completed_and_timed_tasks_are_untouched() {
        let mut done = flexible("done").with_completed(true);
        done.suggested_time = Some("12:00".to_string());
        let mut tasks = vec![timed("a", "08:00", "09:00"), done, flexible("f")];

        DailyOptimizer::new().optimize(&mut tasks);

        assert_eq!(tasks[0].suggested_time, None);
        assert_eq!(tasks[1].suggested_time.as_deref(), Some("12:00"));
        assert_eq!(tasks[2].suggested_time.as_deref(), Some("07:00"));
    }

    #[test]
    fn completed_timed_tasks_free_their_time() {
        let tasks = vec![
            timed("a", "07:00", "08:00").with_completed(true),
            flexible("f"),
        ];
        let plan = optimize_day(&tasks);
        assert_eq!(plan.plan().unwrap().assignments[0].suggested_time, "07:00");
    }

    #[test]
    fn real_task_overlapping_a_fixed_block_replaces_it() {
        // A night-shift task covering 22:30-23:30 stands in for the 23:00 sleep block.
        let optimizer = DailyOptimizer::new();
        let tasks = vec![timed("night", "22:30", "23:30"), flexible("f")];

        let occupied = optimizer.occupied_ranges(&tasks);

        assert_eq!(
            occupied,
            vec![
                TimeRange::new(0, 360),
                TimeRange::new(360, 420),
                TimeRange::new(1350, 1410)
            ]
        );
    }

    #[test]
    fn optimizing_twice_gives_the_same_answer() {
        let mut tasks = vec![
            timed("a", "08:00", "09:00"),
            flexible("f1"),
            flexible("f2"),
        ];
        let optimizer = DailyOptimizer::new();

        let first = optimizer.optimize(&mut tasks);
        let snapshot = tasks.clone();
        let second = optimizer.optimize(&mut tasks);

        assert_eq!(first, second);
        assert_eq!(tasks, snapshot);
    }

    #[test]
    fn apply_reports_only_real_changes() {
        let mut tasks = vec![flexible("f")];
        let outcome = optimize_day(&tasks);
        assert_eq!(outcome.apply(&mut tasks), 1);
        assert_eq!(outcome.apply(&mut tasks), 0);
    }

    #[test]
    fn custom_config_changes_window_and_blocks() {
        let config = OptimizerConfig {
            window_start: "09:00".to_string(),
            window_end: "12:00".to_string(),
            slot_minutes: 90,
            fixed_blocks: vec![FixedBlock::new("Lunch", "10:30", "11:00")],
        };
        let optimizer = DailyOptimizer::with_config(&config).unwrap();
        let tasks = vec![flexible("f1"), flexible("f2")];

        let outcome = optimizer.plan(&tasks);
        let plan = outcome.plan().unwrap();

        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].suggested_time, "09:00");
        assert_eq!(plan.cleared, vec!["f2".to_string()]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = OptimizerConfig::default();
        config.window_end = "06:00".to_string();
        assert!(DailyOptimizer::with_config(&config).is_err());

        let mut config = OptimizerConfig::default();
        config.fixed_blocks.push(FixedBlock::new("Nap", "25:00", "26:00"));
        assert!(DailyOptimizer::with_config(&config).is_err());

        let mut config = OptimizerConfig::default();
        config.slot_minutes = 0;
        assert!(DailyOptimizer::with_config(&config).is_err());
    }

    #[test]
    fn default_config_matches_default_optimizer() {
        let from_config = DailyOptimizer::with_config(&OptimizerConfig::default()).unwrap();
        let default = DailyOptimizer::new();
        assert_eq!(from_config.window, default.window);
        assert_eq!(from_config.slot_minutes, default.slot_minutes);
        assert_eq!(from_config.fixed_blocks, default.fixed_blocks);
    }

    #[test]
    fn take_first_fit_does_not_mutate_input() {
        let slots = vec![TimeRange::new(420, 450), TimeRange::new(500, 620)];
        let (start, remaining) = take_first_fit(&slots, 60).unwrap();
        assert_eq!(start, 500);
        assert_eq!(remaining, vec![TimeRange::new(420, 450), TimeRange::new(560, 620)]);
        assert_eq!(slots[1], TimeRange::new(500, 620));
        assert!(take_first_fit(&remaining[..1], 60).is_none());
    }
}
