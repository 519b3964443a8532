use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ccmon::config::{Config, Settings};
use ccmon::monitor::Poller;
use ccmon::ui::App;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Config::parse_args();

    // Setup logging; the TUI owns the terminal so it logs to a file
    if cli.is_once() {
        setup_logging(cli.debug, None)?;
    } else {
        let path = cli.log_file.clone().unwrap_or_else(default_log_path);
        setup_logging(cli.debug, Some(&path))?;
    }

    // Load settings
    let mut settings = Settings::load(cli.config.as_ref())?;
    settings.merge_cli(&cli);
    settings.validate();

    if cli.is_once() {
        return run_once(&settings).await;
    }

    // Run the application
    let mut app = App::new(settings);
    app.run().await
}

/// Run a single poll cycle and print the snapshot as JSON
async fn run_once(settings: &Settings) -> Result<()> {
    let mut poller = Poller::with_system(settings);
    let snapshot = poller.poll_once().await;
    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;
    println!("{}", json);
    Ok(())
}

fn default_log_path() -> PathBuf {
    std::env::temp_dir().join("ccmon").join("ccmon.log")
}

fn setup_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = if debug {
        EnvFilter::new("ccmon=debug,ccmon_core=debug")
    } else {
        EnvFilter::new("ccmon=info,ccmon_core=info")
    };

    let registry = tracing_subscriber::registry().with(filter);

    match log_file {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("Failed to create log directory: {:?}", dir))?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {:?}", path))?;

            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .init();
        }
        None => {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_target(false)
                        .with_writer(std::io::stderr),
                )
                .init();
        }
    }

    Ok(())
}
