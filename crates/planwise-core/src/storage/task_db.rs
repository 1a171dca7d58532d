//! SQLite-based storage for the task collection.
//!
//! Rows are returned in insertion order, which is the order the optimizer
//! uses for first-fit placement.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::str::FromStr;

use super::data_dir;
use crate::error::{CoreError, DatabaseError, Result};
use crate::task::{FlexibleDuration, Frequency, Task, TaskCategory, TaskType};

const TASK_COLUMNS: &str = "id, title, task_type, completed, category, frequency, flexible_duration,
     start_time, end_time, date, suggested_time, created_at";

/// Raw column values of one `tasks` row.
struct TaskRow {
    id: String,
    title: String,
    task_type: String,
    completed: bool,
    category: String,
    frequency: Option<String>,
    flexible_duration: Option<String>,
    start_time: Option<String>,
    end_time: Option<String>,
    date: Option<String>,
    suggested_time: Option<String>,
    created_at: String,
}

impl TaskRow {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            task_type: row.get(2)?,
            completed: row.get(3)?,
            category: row.get(4)?,
            frequency: row.get(5)?,
            flexible_duration: row.get(6)?,
            start_time: row.get(7)?,
            end_time: row.get(8)?,
            date: row.get(9)?,
            suggested_time: row.get(10)?,
            created_at: row.get(11)?,
        })
    }

    fn into_task(self) -> Result<Task> {
        let corrupt = |message: String| DatabaseError::CorruptRow {
            id: self.id.clone(),
            message,
        };

        let task_type = TaskType::from_str(&self.task_type).map_err(|e| corrupt(e.to_string()))?;
        let category = TaskCategory::from_str(&self.category).map_err(|e| corrupt(e.to_string()))?;
        let frequency = self
            .frequency
            .as_deref()
            .map(Frequency::from_str)
            .transpose()
            .map_err(|e| corrupt(e.to_string()))?;
        let flexible_duration = self
            .flexible_duration
            .as_deref()
            .map(FlexibleDuration::from_str)
            .transpose()
            .map_err(|e| corrupt(e.to_string()))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(Task {
            id: self.id,
            title: self.title,
            task_type,
            completed: self.completed,
            category,
            frequency,
            flexible_duration,
            start_time: self.start_time,
            end_time: self.end_time,
            date: self.date,
            suggested_time: self.suggested_time,
            created_at,
        })
    }
}

/// Task collection persisted in SQLite.
pub struct TaskDb {
    conn: Connection,
}

impl TaskDb {
    /// Open the task database at `<data dir>/planwise.db`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("planwise.db"))
    }

    /// Open the task database at `path`, creating tables if needed.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tasks (
                id                 TEXT PRIMARY KEY,
                title              TEXT NOT NULL,
                task_type          TEXT NOT NULL,
                completed          INTEGER NOT NULL DEFAULT 0,
                category           TEXT NOT NULL,
                frequency          TEXT,
                flexible_duration  TEXT,
                start_time         TEXT,
                end_time           TEXT,
                date               TEXT,
                suggested_time     TEXT,
                created_at         TEXT NOT NULL
            );",
        )
    }

    /// Insert a new task. Fails if the id already exists.
    pub fn create_task(&self, task: &Task) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO tasks ({TASK_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                task.id,
                task.title,
                task.task_type.as_str(),
                task.completed,
                task.category.as_str(),
                task.frequency.map(|f| f.as_str()),
                task.flexible_duration.map(|d| d.as_str()),
                task.start_time,
                task.end_time,
                task.date,
                task.suggested_time,
                task.created_at.to_rfc3339(),
            ],
        )?;
        tracing::debug!(task_id = %task.id, "task created");
        Ok(())
    }

    /// Get a task by ID.
    pub fn get_task(&self, id: &str) -> Result<Option<Task>> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                TaskRow::from_row,
            )
            .optional()?;
        row.map(TaskRow::into_task).transpose()
    }

    /// All tasks in insertion order.
    pub fn list_tasks(&self) -> Result<Vec<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY rowid"))?;
        let rows = stmt
            .query_map([], TaskRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(TaskRow::into_task).collect()
    }

    /// Overwrite every stored field of an existing task.
    pub fn update_task(&self, task: &Task) -> Result<()> {
        let updated = self.conn.execute(
            "UPDATE tasks
             SET title = ?2, task_type = ?3, completed = ?4, category = ?5, frequency = ?6,
                 flexible_duration = ?7, start_time = ?8, end_time = ?9, date = ?10,
                 suggested_time = ?11
             WHERE id = ?1",
            params![
                task.id,
                task.title,
                task.task_type.as_str(),
                task.completed,
                task.category.as_str(),
                task.frequency.map(|f| f.as_str()),
                task.flexible_duration.map(|d| d.as_str()),
                task.start_time,
                task.end_time,
                task.date,
                task.suggested_time,
            ],
        )?;
        if updated == 0 {
            return Err(CoreError::TaskNotFound(task.id.clone()));
        }
        Ok(())
    }

    /// Delete a task by ID.
    pub fn delete_task(&self, id: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(CoreError::TaskNotFound(id.to_string()));
        }
        Ok(())
    }

    /// Store the `suggested_time` of every given task in a single transaction.
    pub fn save_suggestions(&self, tasks: &[Task]) -> Result<()> {
        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let result: Result<(), rusqlite::Error> = (|| {
            for task in tasks {
                self.conn.execute(
                    "UPDATE tasks SET suggested_time = ?2 WHERE id = ?1",
                    params![task.id, task.suggested_time],
                )?;
            }
            Ok(())
        })();

        match result {
            Ok(()) => {
                self.conn.execute_batch("COMMIT;")?;
                Ok(())
            }
            Err(e) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(e.into())
            }
        }
    }
}
