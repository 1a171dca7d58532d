//! Optimizer command for CLI.

use planwise_core::storage::TaskDb;
use planwise_core::{Config, OptimizationOutcome};

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let db = TaskDb::open()?;
    let optimizer = Config::load_or_default().optimizer()?;

    let mut tasks = db.list_tasks()?;
    let outcome = optimizer.optimize(&mut tasks);
    if let OptimizationOutcome::Optimized(plan) = &outcome {
        db.save_suggestions(&tasks)?;
        tracing::debug!(
            assigned = plan.assignments.len(),
            cleared = plan.cleared.len(),
            "suggestions saved"
        );
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let plan = match &outcome {
        OptimizationOutcome::NothingToOptimize => {
            println!("Nothing to optimize.");
            return Ok(());
        }
        OptimizationOutcome::Optimized(plan) => plan,
    };

    for assignment in &plan.assignments {
        let title = tasks
            .iter()
            .find(|t| t.id == assignment.id)
            .map(|t| t.title.as_str())
            .unwrap_or_default();
        println!("{}  {}", assignment.suggested_time, title);
    }
    for id in &plan.cleared {
        let title = tasks
            .iter()
            .find(|t| &t.id == id)
            .map(|t| t.title.as_str())
            .unwrap_or_default();
        println!("--:--  {title} (no free slot)");
    }
    Ok(())
}
