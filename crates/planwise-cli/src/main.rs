use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "planwise", version, about = "Planwise personal task planner")]
struct Cli {
    /// Treat this date (YYYY-MM-DD) as today
    #[arg(long, global = true)]
    date: Option<NaiveDate>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Task management
    Task {
        #[command(subcommand)]
        action: commands::task::TaskAction,
    },
    /// Check a would-be task for conflicts without saving it
    Check {
        #[command(flatten)]
        fields: commands::task::TaskFields,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Suggest times for flexible tasks
    Optimize {
        /// Print the outcome as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the agenda for the day
    Agenda {
        /// Print the agenda as JSON
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let today = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let result = match cli.command {
        Commands::Task { action } => commands::task::run(action, today),
        Commands::Check { fields, json } => commands::task::check(fields, json, today),
        Commands::Optimize { json } => commands::optimize::run(json),
        Commands::Agenda { json } => commands::agenda::run(json, today),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "planwise", &mut std::io::stdout());
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
