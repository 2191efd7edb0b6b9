//! Command handlers for the junction client CLI
//!
//! This module implements the command handlers that connect CLI arguments to
//! the job orchestrator, the health monitor and the configuration layer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::app::{
    ApiClient, HealthMonitor, JobOrchestrator, JobPhase, JobState, VideoFile,
};
use crate::cli::output::{format_health, format_result, format_stats};
use crate::cli::progress::JobProgressDisplay;
use crate::cli::signals::shutdown_requested;
use crate::cli::{ConfigAction, ConfigArgs, HealthArgs, SubmitArgs};
use crate::config::AppConfig;
use crate::errors::{AppError, Result};

/// Handle the submit command
///
/// Builds the selection from the given paths, runs one job while rendering
/// its progress, and prints the timing result. A failed job is returned as
/// an error so the process exits non-zero.
pub async fn handle_submit(args: SubmitArgs, config: &AppConfig, quiet: bool) -> Result<()> {
    args.validate().map_err(AppError::generic)?;

    let mut job_config = config.job_config();
    if let Some(secs) = args.timeout {
        job_config = job_config.with_request_timeout(Duration::from_secs(secs));
    }
    if let Some(seed) = args.seed {
        job_config.progress = job_config.progress.clone().with_seed(seed);
    }

    let files = load_videos(&args.files).await?;
    for file in files.iter().filter(|f| !f.looks_like_video()) {
        warn!("{} does not look like a video file", file.name);
        if !quiet {
            println!(
                "⚠️  {} does not look like a video file; the backend may reject it",
                file.name
            );
        }
    }

    let client = Arc::new(ApiClient::new(&config.client_config())?);
    let orchestrator = JobOrchestrator::new(client, job_config);
    orchestrator.select_files(files);

    let started = Instant::now();
    orchestrator.submit()?;

    let mut display = JobProgressDisplay::new(quiet);
    let outcome = tokio::select! {
        state = follow_job(orchestrator.subscribe(), &mut display) => Some(state),
        _ = shutdown_requested() => None,
    };

    let Some(finished) = outcome else {
        display.abandon("🛑 Cancelled");
        orchestrator.shutdown();
        return Err(AppError::generic("Job cancelled"));
    };
    display.finish();
    info!("Job {} ended {} after {:?}", finished.job_id, finished.phase, started.elapsed());

    match (finished.phase, finished.result, finished.error) {
        (JobPhase::Completed, Some(result), _) => {
            print!("{}", format_result(&result));
            Ok(())
        }
        (_, _, Some(error)) => Err(AppError::Job(error)),
        (phase, _, _) => Err(AppError::generic(format!(
            "Job ended while {} without a result",
            phase
        ))),
    }
}

/// Render job updates until the job reaches a terminal phase
async fn follow_job(
    mut updates: watch::Receiver<JobState>,
    display: &mut JobProgressDisplay,
) -> JobState {
    loop {
        let state = updates.borrow_and_update().clone();
        display.update(&state);

        if state.phase.is_terminal() || updates.changed().await.is_err() {
            return state;
        }
    }
}

/// Build descriptors for every path, failing on the first unreadable one
async fn load_videos(paths: &[PathBuf]) -> Result<Vec<VideoFile>> {
    let mut files = Vec::with_capacity(paths.len());
    for path in paths {
        let file = VideoFile::from_path(path).await.map_err(|e| {
            AppError::generic(format!("Cannot read {}: {}", path.display(), e))
        })?;
        debug!("Selected {} ({} bytes, {})", file.name, file.size, file.mime_type);
        files.push(file);
    }
    Ok(files)
}

/// Handle the health command
///
/// Without `--watch` runs one check and prints it. With `--watch` polls on
/// the configured schedule and prints every completed check until CTRL-C.
pub async fn handle_health(args: HealthArgs, config: &AppConfig) -> Result<()> {
    let client = Arc::new(ApiClient::new(&config.client_config())?);
    let health_config = config.health_config();
    let poll_secs = health_config.poll_interval.as_secs();
    let monitor = HealthMonitor::new(client, health_config);

    if !args.watch {
        monitor.check_health().await;
        print!("{}", format_health(&monitor.snapshot()));
        return Ok(());
    }

    let mut updates = monitor.subscribe();
    monitor.start();
    println!("Watching backend health every {} s (Ctrl-C to stop)", poll_secs);

    let watch_changes = async {
        while updates.changed().await.is_ok() {
            let state = updates.borrow_and_update().clone();
            print!("{}", format_health(&state));
        }
    };

    tokio::select! {
        _ = watch_changes => {},
        _ = shutdown_requested() => {},
    }

    monitor.stop();
    Ok(())
}

/// Handle the stats command
pub async fn handle_stats(config: &AppConfig, quiet: bool) -> Result<()> {
    let client = ApiClient::new(&config.client_config())?;

    let spinner = (!quiet).then(|| spinner("Fetching statistics..."));
    let stats = client.stats().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    print!("{}", format_stats(&stats?));
    Ok(())
}

/// Handle configuration management
pub async fn handle_config(args: ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.action {
        ConfigAction::Init { path, force } => {
            let written = AppConfig::write_default(path, force).await?;
            println!("📁 Created default configuration file:");
            println!("   {}", written.display());
            println!("   You can customize settings by editing this file.");
            Ok(())
        }
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    match ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        Ok(style) => spinner.set_style(style.tick_strings(&["◐", "◓", "◑", "◒"])),
        Err(e) => debug!("Spinner template error: {}", e),
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
