//! # Planwise Core Library
//!
//! This library provides the scheduling core of the Planwise personal task
//! planner. The `planwise` CLI is a thin shell over the same library: it owns
//! the task collection, calls into the engines, and stores the results.
//!
//! ## Architecture
//!
//! - **Time**: `HH:MM` arithmetic and half-open time ranges
//! - **Task**: daily / once / flexible tasks and their invariants
//! - **Conflict detection**: collisions, severity and a suggested start
//! - **Optimizer**: first-fit placement of flexible tasks into free gaps
//! - **Schedule**: the day's agenda view
//! - **Storage**: SQLite task store and TOML configuration
//!
//! The engines are pure functions of their inputs. "Today" is always passed
//! in as a date, never read from the clock.
//!
//! ## Key Components
//!
//! - [`ConflictDetector`]: checks a candidate task against the collection
//! - [`DailyOptimizer`]: proposes times for flexible tasks
//! - [`build_agenda`]: ordered agenda for one day
//! - [`TaskDb`]: task persistence
//! - [`Config`]: engine configuration

pub mod conflict;
pub mod error;
pub mod optimizer;
pub mod schedule;
pub mod storage;
pub mod task;
pub mod time;

pub use conflict::{
    detect_conflicts, ConflictConfig, ConflictDetector, ConflictEntry, ConflictKind,
    ConflictReport, FrequencyMatch, Severity,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use optimizer::{
    optimize_day, Assignment, DailyOptimizer, FixedBlock, OptimizationOutcome, OptimizerConfig,
    SchedulePlan,
};
pub use schedule::{build_agenda, ItemKind, ScheduleItem};
pub use storage::{Config, TaskDb};
pub use task::{FlexibleDuration, Frequency, Task, TaskCategory, TaskType};
pub use time::{to_minutes, to_time_string, TimeRange};
