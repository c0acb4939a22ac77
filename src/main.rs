//! EventSphere command-line client
//!
//! Main application entry point

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use eventsphere::{
    config::Settings,
    handlers::{exit_code, handle_command, Cli},
    services::ServiceFactory,
    state::{ConsoleNavigator, FileSessionStore},
    utils::logging,
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "Startup failed");
            eprintln!("eventsphere: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    // Load configuration
    let mut settings = Settings::new().context("Failed to load configuration")?;
    if let Some(url) = &cli.api_url {
        settings.api.base_url = url.clone();
    }
    if let Some(path) = &cli.session_file {
        settings.session.storage_path = path.to_string_lossy().into_owned();
    }
    settings.validate()?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = logging::init_logging(&settings.logging)?;
    info!("Starting {}", eventsphere::info());

    // Restore the session and watch for changes made by other processes
    let store = Arc::new(
        FileSessionStore::open(&settings.session.storage_path)
            .await
            .context("Failed to open the session file")?,
    );
    let _watcher = store
        .clone()
        .spawn_watch(Duration::from_millis(settings.session.watch_interval_ms));

    let navigator = Arc::new(ConsoleNavigator::new(&cli.command.path()));
    let services = ServiceFactory::new(&settings, store, navigator)?;

    match services.startup_check().await {
        Ok(true) => {}
        Ok(false) => warn!("Stored session is no longer valid"),
        Err(e) if e.is_recoverable() => warn!(error = %e, "Session check skipped, server unreachable"),
        Err(e) => error!(error = %e, "Session check failed"),
    }

    let result = handle_command(cli.command, &services, &settings, cli.json).await;
    Ok(match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("Error: {}", failure);
            ExitCode::from(exit_code(&failure))
        }
    })
}
