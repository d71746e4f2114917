use std::path::Path;

use clap::Parser;
use openissue::cli::commands::Cli;
use openissue::cli::handlers;
use openissue::io::project_io::discover_project;
use openissue::model::project::DATA_DIR;

/// Environment variable holding the log filter
const LOG_ENV: &str = "OPENISSUE_LOG";

fn main() {
    let cli = Cli::parse();

    // Logging goes to the project's data dir; stdout belongs to the TUI and command output
    if let Ok(start) = handlers::start_dir(cli.project_dir.as_deref())
        && let Ok(root) = discover_project(&start)
    {
        init_logging(&root.join(DATA_DIR));
    }

    if let Err(e) = handlers::dispatch(cli) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(data_dir: &Path) {
    let log_file = match std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(data_dir.join("openissue.log"))
    {
        Ok(f) => f,
        Err(_) => return,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| "warn".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .init();
}
