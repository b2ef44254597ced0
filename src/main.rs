//! Trafficd - four-way signalized intersection controller
//!
//! CLI entry point wiring the controller, the background generator, and the
//! dashboard together.

use std::fs;

use clap::Parser;
use eyre::{Context, Result};
use tokio::sync::watch;
use tracing::{info, warn};

use trafficd::cli::{Cli, Command, get_log_path};
use trafficd::config::Config;
use trafficd::controller::Controller;
use trafficd::inbox;
use trafficd::producer::VehicleGenerator;
use trafficd::tui;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_path = get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Setup tracing subscriber - write to log file, never stdout/stderr,
    // since the TUI owns the terminal
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        "Trafficd loaded config: green={}ms crossing={}ms all-red={}ms inbox={}",
        config.timing.green_duration_ms, config.timing.crossing_ms, config.timing.all_red_ms, config.inbox.capacity
    );

    match cli.command {
        Some(Command::Run { headless, seed }) => cmd_run(&config, headless, seed).await,
        None => cmd_run(&config, false, None).await,
    }
}

/// Run the intersection: controller + generator, dashboard or headless.
async fn cmd_run(config: &Config, headless: bool, seed: Option<u64>) -> Result<()> {
    let (sender, arrivals) = inbox::channel(config.inbox.capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let controller = Controller::new(config.timing.clone(), arrivals, shutdown_rx.clone());
    let handle = controller.handle();
    let controller_task = tokio::spawn(controller.run());

    let generator = VehicleGenerator::new(config.generator.clone(), sender.clone(), shutdown_rx, seed);
    let generator_task = tokio::spawn(generator.run());

    if headless {
        info!("Running headless. Press Ctrl+C to stop.");
        wait_for_signal().await?;
    } else {
        // Returns when the user quits; the terminal is restored by then.
        tui::run(handle, sender).await?;
    }

    info!("Shutting down...");
    let _ = shutdown_tx.send(true);

    // The controller finishes its in-flight crossing before exiting.
    let _ = controller_task.await;
    let _ = generator_task.await;

    info!("Shutdown complete");
    Ok(())
}

/// Block until SIGINT or SIGTERM.
async fn wait_for_signal() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        tokio::select! {
            _ = sigint.recv() => warn!("SIGINT received"),
            _ = sigterm.recv() => warn!("SIGTERM received"),
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        warn!("Ctrl+C received");
    }

    Ok(())
}
