mod config;
pub mod task_db;

pub use config::{CliConfig, Config};
pub use task_db::TaskDb;

use std::path::PathBuf;

/// Returns the planner data directory, creating it if needed.
///
/// `PLANWISE_DATA_DIR` overrides the location entirely. Otherwise it is
/// `~/.config/planwise/`, or `~/.config/planwise-dev/` when `PLANWISE_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    if let Ok(dir) = std::env::var("PLANWISE_DATA_DIR") {
        let dir = PathBuf::from(dir);
        std::fs::create_dir_all(&dir)?;
        return Ok(dir);
    }

    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PLANWISE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("planwise-dev")
    } else {
        base_dir.join("planwise")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
