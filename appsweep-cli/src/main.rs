//! appsweep CLI
//!
//! Signs in to the appstore console with the given credentials and deletes
//! every installed cloud app, sweeping the list until it stays quiet.
//!
//! Usage:
//!   appsweep <username> <password> [--webdriver-url http://localhost:4444] [--headless]
//!
//! The browser is driven through a WebDriver endpoint (geckodriver or
//! chromedriver) that must already be running.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use appsweep::{
    Credentials, DeletionRecord, EventSink, LocatorSet, SessionDriver, SweepConfig, SweepError,
    WebDriverSession,
};

#[derive(Parser)]
#[command(name = "appsweep")]
#[command(about = "Bulk-remove installed cloud apps from the appstore console")]
struct Cli {
    /// Account email address
    username: String,

    /// Account password
    password: String,

    /// WebDriver endpoint to drive the browser through
    #[arg(long, default_value = "http://localhost:4444")]
    webdriver_url: String,

    /// Run the browser headless
    #[arg(long)]
    headless: bool,

    /// Number of candidate row slots scanned per sweep
    #[arg(long, default_value_t = 10)]
    slots: usize,

    /// Idle window in seconds after which the run is declared complete
    #[arg(long, default_value_t = 20)]
    idle_secs: u64,

    /// Maximum consecutive transient sweep failures before aborting
    #[arg(long, default_value_t = 3)]
    max_retries: u32,

    /// Append-only diagnostic log file
    #[arg(long, default_value = "appsweep.log")]
    log_file: PathBuf,

    /// Print the final report as JSON
    #[arg(long)]
    json: bool,
}

/// Per-deletion progress and the stop notice, in the console format the
/// tool has always printed.
struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn deletion(&self, record: &DeletionRecord) {
        let at = chrono::DateTime::<Local>::from(record.at);
        println!("Deleting app: {}", record.name);
        println!(
            "Date and Time of deletion: {}",
            at.format("[Date: %Y-%m-%d] & [Time: %I:%M:%S %p]")
        );
        println!("Number of apps deleted: {}\n", record.total);
    }

    fn sweep_retry(&self, attempt: u32, max: u32, error: &SweepError) {
        println!("Transient failure: {error}. Refreshing and retrying sweep ({attempt}/{max})...");
    }

    fn idle_stop(&self, _total: u64) {
        println!("There are no apps to delete from the cloud. The execution has stopped.");
    }
}

fn init_logging(log_file: &Path) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let directory = match log_file.parent() {
        Some(parent) if parent != Path::new("") => parent,
        _ => Path::new("."),
    };
    let file_name = log_file
        .file_name()
        .context("log file path has no file name")?;
    let appender = tracing_appender::rolling::never(directory, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .init();
    Ok(guard)
}

fn format_elapsed(elapsed: Duration) -> String {
    let total_secs = elapsed.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours}h:{minutes}min:{seconds}sec")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&cli.log_file)?;

    let config = SweepConfig {
        slot_count: cli.slots,
        idle_threshold: Duration::from_secs(cli.idle_secs),
        max_retries: cli.max_retries,
        ..SweepConfig::default()
    };
    let credentials = Credentials::new(cli.username, cli.password);

    println!("Launching browser...");
    let session = match WebDriverSession::connect(&cli.webdriver_url, cli.headless).await {
        Ok(session) => session,
        Err(err) => {
            error!(error = %err, "could not open a browser session");
            eprintln!("Failed to launch a browser session: {err}");
            std::process::exit(1);
        }
    };

    let driver = SessionDriver::new(config, LocatorSet::default());
    match driver.run(&session, &credentials, &ConsoleSink).await {
        Ok(report) => {
            if report.deleted > 0 {
                println!("Total number of apps deleted: {}", report.deleted);
            }
            println!("Total Execution Time: {}", format_elapsed(report.elapsed));
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "run failed");
            match &err {
                SweepError::InvalidEmail(message) => {
                    eprintln!("{message}: You've given an incorrect email address!")
                }
                SweepError::InvalidPassword(message) => {
                    eprintln!("{message}: You've given an incorrect password!")
                }
                other => eprintln!("Error occurred: {other}"),
            }
            std::process::exit(1);
        }
    }
}
