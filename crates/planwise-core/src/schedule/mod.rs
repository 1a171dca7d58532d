//! Agenda view for a single day.
//!
//! Time-bound tasks come first, ordered by start time; everything else is
//! listed afterwards as flexible.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// Type of agenda entry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Has its own start time
    Scheduled,
    /// No start time of its own
    Flexible,
}

/// One line of the agenda.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub display_time: String,
    pub task: Task,
    pub kind: ItemKind,
}

impl ScheduleItem {
    fn from_task(task: &Task) -> Self {
        match task.start_time.as_deref() {
            Some(start) => {
                let display_time = match task.end_time.as_deref() {
                    Some(end) => format!("{start} - {end}"),
                    None => start.to_string(),
                };
                Self {
                    display_time,
                    task: task.clone(),
                    kind: ItemKind::Scheduled,
                }
            }
            None => {
                let display_time = match task.suggested_time.as_deref() {
                    Some(suggested) => format!("Flexible (suggested {suggested})"),
                    None => "Flexible".to_string(),
                };
                Self {
                    display_time,
                    task: task.clone(),
                    kind: ItemKind::Flexible,
                }
            }
        }
    }
}

/// Build the agenda for `date` from the full task collection.
///
/// Completed tasks and tasks not active on `date` are left out.
pub fn build_agenda(tasks: &[Task], date: NaiveDate) -> Vec<ScheduleItem> {
    let visible: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.is_active() && t.is_active_on(date))
        .collect();

    let mut scheduled: Vec<&Task> = visible
        .iter()
        .copied()
        .filter(|t| t.start_time.is_some())
        .collect();
    // Zero-padded HH:MM sorts chronologically as text.
    scheduled.sort_by(|a, b| a.start_time.cmp(&b.start_time));

    scheduled
        .into_iter()
        .chain(visible.into_iter().filter(|t| t.start_time.is_none()))
        .map(ScheduleItem::from_task)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{Frequency, TaskCategory};

    // A Saturday.
    fn saturday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn titles(items: &[ScheduleItem]) -> Vec<&str> {
        items.iter().map(|i| i.task.title.as_str()).collect()
    }

    #[test]
    fn scheduled_items_sorted_then_flexible_in_input_order() {
        let tasks = vec![
            Task::flexible("Read", TaskCategory::Personal),
            Task::daily("Lunch", TaskCategory::Family, Frequency::Daily, "12:00"),
            Task::flexible("Tidy", TaskCategory::Personal),
            Task::once("Dentist", TaskCategory::Appointment, "09:30").with_end("10:15"),
            Task::daily("Pills", TaskCategory::Medicine, Frequency::Daily, "08:00"),
        ];

        let agenda = build_agenda(&tasks, saturday());

        assert_eq!(titles(&agenda), vec!["Pills", "Dentist", "Lunch", "Read", "Tidy"]);
        assert_eq!(agenda[1].display_time, "09:30 - 10:15");
        assert_eq!(agenda[2].display_time, "12:00");
        assert_eq!(agenda[3].display_time, "Flexible");
        assert_eq!(agenda[3].kind, ItemKind::Flexible);
        assert_eq!(agenda[0].kind, ItemKind::Scheduled);
    }

    #[test]
    fn inactive_and_completed_tasks_are_hidden() {
        let tomorrow = saturday().succ_opt().unwrap();
        let tasks = vec![
            Task::daily("Standup", TaskCategory::Work, Frequency::Weekdays, "09:00"),
            Task::daily("Hike", TaskCategory::Family, Frequency::Weekends, "10:00"),
            Task::daily("Piano", TaskCategory::School, Frequency::Saturday, "11:00"),
            Task::once("Party", TaskCategory::Family, "20:00").with_date(tomorrow),
            Task::once("Call", TaskCategory::Family, "18:00"),
            Task::flexible("Done", TaskCategory::Personal).with_completed(true),
        ];

        let agenda = build_agenda(&tasks, saturday());

        assert_eq!(titles(&agenda), vec!["Hike", "Piano", "Call"]);
    }

    #[test]
    fn daily_task_without_frequency_is_always_shown() {
        let mut legacy = Task::daily("Walk", TaskCategory::Personal, Frequency::Monday, "07:00");
        legacy.frequency = None;

        let agenda = build_agenda(&[legacy], saturday());

        assert_eq!(agenda.len(), 1);
    }

    #[test]
    fn flexible_item_shows_suggestion() {
        let mut task = Task::flexible("Read", TaskCategory::Personal);
        task.suggested_time = Some("07:00".to_string());

        let agenda = build_agenda(&[task], saturday());

        assert_eq!(agenda[0].display_time, "Flexible (suggested 07:00)");
    }

    #[test]
    fn empty_collection_gives_empty_agenda() {
        assert!(build_agenda(&[], saturday()).is_empty());
    }

    #[test]
    fn items_serialize_camel_case() {
        let task = Task::flexible("Read", TaskCategory::Personal);
        let json = serde_json::to_value(build_agenda(&[task], saturday())).unwrap();
        assert_eq!(json[0]["displayTime"], "Flexible");
        assert_eq!(json[0]["kind"], "flexible");
    }
}
