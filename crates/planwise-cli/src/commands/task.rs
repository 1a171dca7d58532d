//! Task management commands for CLI.

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use planwise_core::storage::TaskDb;
use planwise_core::{
    Config, ConflictReport, FlexibleDuration, Frequency, Severity, Task, TaskCategory, TaskType,
};

/// Fields describing a task, shared by `task add` and `check`.
#[derive(Args)]
pub struct TaskFields {
    /// Task title
    pub title: String,
    /// Task type: daily, once or flexible
    #[arg(long = "type", default_value = "flexible")]
    pub task_type: TaskType,
    /// Category: medicine, appointment, work, family, personal or school
    #[arg(long, default_value = "personal")]
    pub category: TaskCategory,
    /// Recurrence for daily tasks (default: daily)
    #[arg(long)]
    pub frequency: Option<Frequency>,
    /// Start time (HH:MM)
    #[arg(long)]
    pub start: Option<String>,
    /// End time (HH:MM, default: one hour after start)
    #[arg(long)]
    pub end: Option<String>,
    /// Date for once tasks (YYYY-MM-DD, default: today)
    #[arg(long = "on")]
    pub on: Option<NaiveDate>,
    /// Horizon for flexible tasks: day or week
    #[arg(long)]
    pub flexible_duration: Option<FlexibleDuration>,
}

impl TaskFields {
    fn into_task(self, today: NaiveDate) -> Task {
        let mut task = Task::new(self.title, self.task_type, self.category);
        match self.task_type {
            TaskType::Daily => {
                task.frequency = Some(self.frequency.unwrap_or_default());
                task.date = self.on.map(|d| d.format(planwise_core::task::DATE_FORMAT).to_string());
            }
            TaskType::Once => {
                task.frequency = self.frequency;
                task = task.with_date(self.on.unwrap_or(today));
            }
            TaskType::Flexible => {
                task.frequency = self.frequency;
                task.date = self.on.map(|d| d.format(planwise_core::task::DATE_FORMAT).to_string());
                task.flexible_duration = Some(self.flexible_duration.unwrap_or(FlexibleDuration::Day));
            }
        }
        if task.task_type != TaskType::Flexible {
            task.flexible_duration = self.flexible_duration;
        }
        task.start_time = self.start;
        task.end_time = self.end;
        task
    }
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// Create a new task
    Add {
        #[command(flatten)]
        fields: TaskFields,
    },
    /// Edit an existing task
    Edit {
        /// Task ID
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New category
        #[arg(long)]
        category: Option<TaskCategory>,
        /// New recurrence (daily tasks)
        #[arg(long)]
        frequency: Option<Frequency>,
        /// New start time (HH:MM)
        #[arg(long)]
        start: Option<String>,
        /// New end time (HH:MM)
        #[arg(long)]
        end: Option<String>,
        /// Remove the end time
        #[arg(long, conflicts_with = "end")]
        clear_end: bool,
        /// New date (once tasks)
        #[arg(long = "on")]
        on: Option<NaiveDate>,
        /// New horizon (flexible tasks)
        #[arg(long)]
        flexible_duration: Option<FlexibleDuration>,
    },
    /// List tasks
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Get task details
    Get {
        /// Task ID
        id: String,
    },
    /// Mark a task done, or not done again
    Toggle {
        /// Task ID
        id: String,
    },
    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },
}

pub fn run(action: TaskAction, today: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let db = TaskDb::open()?;

    match action {
        TaskAction::Add { fields } => {
            let task = fields.into_task(today);
            task.validate()?;

            let config = Config::load_or_default();
            let existing = db.list_tasks()?;
            guard_conflicts(&task, &existing, today, &config)?;

            db.create_task(&task)?;
            tracing::debug!(id = %task.id, "task saved");
            println!("Task created: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::Edit {
            id,
            title,
            category,
            frequency,
            start,
            end,
            clear_end,
            on,
            flexible_duration,
        } => {
            let existing = db.list_tasks()?;
            let mut task = existing
                .iter()
                .find(|t| t.id == id)
                .cloned()
                .ok_or_else(|| format!("task not found: {id}"))?;

            if let Some(title) = title {
                task.title = title;
            }
            if let Some(category) = category {
                task.category = category;
            }
            if frequency.is_some() {
                task.frequency = frequency;
            }
            if start.is_some() {
                task.start_time = start;
            }
            if end.is_some() {
                task.end_time = end;
            }
            if clear_end {
                task.end_time = None;
            }
            if let Some(on) = on {
                task = task.with_date(on);
            }
            if flexible_duration.is_some() {
                task.flexible_duration = flexible_duration;
            }
            task.validate()?;

            let config = Config::load_or_default();
            guard_conflicts(&task, &existing, today, &config)?;

            db.update_task(&task)?;
            println!("Task updated: {}", task.id);
            println!("{}", serde_json::to_string_pretty(&task)?);
        }
        TaskAction::List { json } => {
            let tasks = db.list_tasks()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&tasks)?);
            } else if tasks.is_empty() {
                println!("No tasks.");
            } else {
                for task in &tasks {
                    println!("{}", summary_line(task));
                }
            }
        }
        TaskAction::Get { id } => match db.get_task(&id)? {
            Some(task) => println!("{}", serde_json::to_string_pretty(&task)?),
            None => return Err(format!("task not found: {id}").into()),
        },
        TaskAction::Toggle { id } => {
            let mut task = db
                .get_task(&id)?
                .ok_or_else(|| format!("task not found: {id}"))?;
            task.toggle_completed();
            db.update_task(&task)?;
            let state = if task.completed { "done" } else { "open" };
            println!("Task {id} marked {state}.");
        }
        TaskAction::Delete { id } => {
            db.delete_task(&id)?;
            println!("Task deleted: {id}");
        }
    }
    Ok(())
}

/// `check`: report conflicts for a would-be task without saving it.
pub fn check(fields: TaskFields, json: bool, today: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let task = fields.into_task(today);
    task.validate()?;

    let db = TaskDb::open()?;
    let config = Config::load_or_default();
    let report = config.conflict_detector(today).detect(&task, &db.list_tasks()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !report.has_conflicts {
        println!("No conflicts.");
        return Ok(());
    }
    println!("Severity: {}", severity_label(report.severity));
    for conflict in &report.conflicts {
        println!("  - {} ({})", conflict.message, conflict.title);
    }
    println!("{}", suggestion_line(&report));
    Ok(())
}

/// Refuse the save when the detector says so; otherwise print warnings.
fn guard_conflicts(
    candidate: &Task,
    existing: &[Task],
    today: NaiveDate,
    config: &Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let report = config.conflict_detector(today).detect(candidate, existing);
    if !report.has_conflicts {
        return Ok(());
    }

    for conflict in &report.conflicts {
        eprintln!(
            "{}: {} ({})",
            severity_label(conflict.kind.severity()),
            conflict.message,
            conflict.title
        );
    }

    if report.blocks_save() || config.cli.strict_warnings {
        return Err(format!("task not saved because of conflicts; {}", suggestion_line(&report)).into());
    }
    Ok(())
}

fn suggestion_line(report: &ConflictReport) -> String {
    match (&report.suggested_start, report.suggestion_verified) {
        (Some(start), true) => format!("suggested start: {start}"),
        _ => "no free start found in the search window".to_string(),
    }
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::None => "none",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

fn summary_line(task: &Task) -> String {
    let when = match (&task.start_time, &task.end_time) {
        (Some(start), Some(end)) => format!("{start}-{end}"),
        (Some(start), None) => start.clone(),
        _ => match &task.suggested_time {
            Some(suggested) => format!("~{suggested}"),
            None => "-".to_string(),
        },
    };
    let recurrence = match task.task_type {
        TaskType::Daily => task.frequency.map(|f| f.to_string()).unwrap_or_default(),
        TaskType::Once => task.date.clone().unwrap_or_default(),
        TaskType::Flexible => String::new(),
    };
    let done = if task.completed { " (done)" } else { "" };
    format!(
        "{}  {:<8} {:<11} {:<18} {} [{}]{}",
        task.id, task.task_type, when, recurrence, task.title, task.category, done
    )
}
