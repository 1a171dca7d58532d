//! Agenda command for CLI.

use chrono::NaiveDate;
use planwise_core::build_agenda;
use planwise_core::storage::TaskDb;

pub fn run(json: bool, today: NaiveDate) -> Result<(), Box<dyn std::error::Error>> {
    let db = TaskDb::open()?;
    let agenda = build_agenda(&db.list_tasks()?, today);

    if json {
        println!("{}", serde_json::to_string_pretty(&agenda)?);
        return Ok(());
    }

    println!("Agenda for {}", today.format("%A %Y-%m-%d"));
    if agenda.is_empty() {
        println!("  Nothing planned.");
    }
    for item in &agenda {
        println!(
            "  {:<28} {} [{}]",
            item.display_time, item.task.title, item.task.category
        );
    }
    Ok(())
}
