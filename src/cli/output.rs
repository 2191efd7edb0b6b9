//! Text rendering of results, health and statistics
//!
//! Pure functions so the exact output can be tested without a terminal.

use std::fmt::Write;

use serde_json::Value;

use crate::app::{Direction, HealthState, HealthStatus, NormalizedResult, StatsSummary};
use crate::errors::{AppError, JobError};

/// Per-direction green times, the cycle length and any recommendation
pub fn format_result(result: &NormalizedResult) -> String {
    let mut out = String::from("🚦 Signal timing\n");
    for direction in Direction::ALL {
        let _ = writeln!(out, "  {:<6} {:>4} s", direction, result.seconds(direction));
    }
    let _ = writeln!(out, "  {:<6} {:>4} s", "Cycle", result.cycle_seconds());

    if let Some(recommendation) = &result.recommendation {
        let _ = write!(
            out,
            "\n💡 Recommendation: {} for {} s",
            recommendation.direction, recommendation.timer_seconds
        );
        if !recommendation.reason.is_empty() {
            let _ = write!(out, " ({})", recommendation.reason);
        }
        out.push('\n');
    }

    out
}

/// Error line with its kind, plus the backend's detail when it sent one
pub fn format_job_error(error: &JobError) -> String {
    let mut out = format!("[{}] {}", error.kind().as_str(), error.message());

    if let Some(detail) = error
        .body()
        .and_then(|body| body.get("detail"))
        .and_then(Value::as_str)
    {
        let _ = write!(out, "\n  Detail: {}", detail);
    }

    out
}

/// Any application error, with job failures in their detailed form
pub fn format_error(error: &AppError) -> String {
    match error {
        AppError::Job(job_error) => format_job_error(job_error),
        AppError::Config(config_error) => match std::error::Error::source(config_error) {
            Some(source) => format!("{}: {}", config_error, source),
            None => config_error.to_string(),
        },
        other => other.to_string(),
    }
}

/// Health status with component detail
pub fn format_health(state: &HealthState) -> String {
    let icon = match state.status {
        HealthStatus::Healthy => "🟢",
        HealthStatus::Degraded => "🟡",
        HealthStatus::Offline => "🔴",
        HealthStatus::Checking => "⏳",
    };

    let mut out = format!("{} Backend {}", icon, state.status);
    if let Some(checked) = state.last_checked {
        let _ = write!(out, " (checked {})", checked.format("%H:%M:%S UTC"));
    }
    out.push('\n');

    for (component, status) in &state.components {
        let _ = writeln!(out, "  {}: {}", component, status);
    }

    out
}

/// Summary of past analysis runs
pub fn format_stats(stats: &StatsSummary) -> String {
    let mut out = String::from("📊 Analysis statistics\n");
    let _ = writeln!(out, "  Total runs:        {}", stats.results.total_runs);
    let _ = writeln!(out, "  Average delay:     {:.2} s", stats.results.avg_delay);
    let _ = writeln!(out, "  Average runtime:   {:.2} s", stats.results.avg_elapsed);
    let _ = writeln!(
        out,
        "  Cars processed:    {}",
        stats.analytics.total_cars_processed
    );
    let _ = writeln!(
        out,
        "  Success rate:      {:.1}%",
        stats.analytics.success_rate
    );
    let _ = writeln!(
        out,
        "  Optimizations:     {}",
        stats.analytics.total_optimizations
    );

    if !stats.recent.is_empty() {
        out.push_str("\nRecent runs:\n");
        for run in &stats.recent {
            let cars = run
                .cars
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join("/");
            let _ = writeln!(
                out,
                "  delay {:>7.2} s  cars {:>5}  [{}]",
                run.delay, run.total_cars, cars
            );
        }
    }

    out
}
