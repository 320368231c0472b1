mod config;
mod job;
mod monitor;
mod notifier;
mod parser;
mod query;
mod report;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use config::Config;
use monitor::Monitor;
use notifier::{Dispatch, Notifier};
use query::{PowerShellQuery, StatusQuery};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Backup server address
    #[arg(long)]
    server: Option<String>,
    /// Sender email address
    #[arg(long)]
    from: Option<String>,
    /// Sender email password
    #[arg(long)]
    password: Option<String>,
    /// Recipient email address
    #[arg(long)]
    to: Option<String>,
    /// SMTP server address
    #[arg(long)]
    smtp: Option<String>,
    /// Path to configuration file
    #[arg(long, default_value = "config.json")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = setup_logging() {
        eprintln!("Error setting up logging: {:#}. Will log to console only.", e);
        setup_console_logging()?;
    }

    let mut config = match Config::from_file(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Error loading configuration: {:#}", e);
            log::warn!("Will use default values and command-line parameters");
            Config::default()
        }
    };

    if let Some(server) = cli.server {
        log::info!("Using backup server from command line: {}", server);
        config.server_address = server;
    }
    if let Some(from) = cli.from {
        log::info!("Using sender email from command line: {}", from);
        config.email_from = from;
    }
    if let Some(password) = cli.password {
        log::info!("Using email password from command line");
        config.email_password = password;
    }
    if let Some(to) = cli.to {
        log::info!("Using recipient email from command line: {}", to);
        config.email_to = vec![to];
    }
    if let Some(smtp) = cli.smtp {
        log::info!("Using SMTP server from command line: {}", smtp);
        config.smtp_server = smtp;
    }

    config.normalize();

    if config.server_address.is_empty() {
        log::warn!("No backup server address specified");
    }
    if !config.mail_settings_complete() {
        log::warn!("Email configuration incomplete. Notifications will not be sent.");
    }

    log::info!("Starting backup job monitoring service");

    let monitor = Monitor::new(PowerShellQuery);
    let notifier = Notifier::new();

    loop {
        log::info!("Checking backup job statuses...");

        run_cycle(&monitor, &notifier, &config);

        log::info!(
            "Sleeping for {} minutes until next check",
            config.check_interval_minutes
        );
        tokio::time::sleep(Duration::from_secs(config.check_interval_minutes as u64 * 60)).await;
    }
}

/// One poll cycle: classify every enabled category, and dispatch a digest
/// only when problems were found. A cycle with nothing to report makes no
/// dispatch attempt at all.
fn run_cycle<Q: StatusQuery, D: Dispatch>(monitor: &Monitor<Q>, dispatcher: &D, config: &Config) {
    let problematic = monitor.collect(config);

    if problematic.is_empty() {
        log::info!("No problematic jobs found");
        return;
    }

    let digest = report::build_digest(&problematic);
    match dispatcher.send(config, &digest) {
        Ok(()) => log::info!("Email alert sent successfully"),
        Err(e) => log::error!("Error sending email alert: {:#}", e),
    }
}

fn base_dispatch() -> fern::Dispatch {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "[{}][{}][{}] {}",
                chrono::Local::now().format("%Y-%m-%d][%H:%M:%S"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Info)
}

/// Log to stdout and a dated file under logs/. Any failure here is
/// reported to the caller so the daemon can fall back to console-only
/// logging instead of aborting.
fn setup_logging() -> Result<()> {
    std::fs::create_dir_all("logs").context("Failed to create logs directory")?;

    let log_path = format!(
        "logs/backmon-{}.log",
        chrono::Local::now().format("%Y-%m-%d")
    );

    base_dispatch()
        .chain(std::io::stdout())
        .chain(fern::log_file(&log_path).with_context(|| format!("Failed to open {}", log_path))?)
        .apply()?;

    Ok(())
}

fn setup_console_logging() -> Result<()> {
    base_dispatch().chain(std::io::stdout()).apply()?;
    Ok(())
}
