//! Live progress display for a running job
//!
//! Renders the job's published state as an indicatif bar on a terminal, or
//! as one line per phase change when stderr is not a terminal.

use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use crate::app::{JobPhase, JobState};

/// Follows one job's state updates on stderr
pub struct JobProgressDisplay {
    bar: Option<ProgressBar>,
    quiet: bool,
    last_phase: Option<JobPhase>,
}

impl JobProgressDisplay {
    /// Create a display; the bar is used only on an interactive stderr
    pub fn new(quiet: bool) -> Self {
        let is_terminal = atty::is(atty::Stream::Stderr);
        let bar = if quiet || !is_terminal {
            None
        } else {
            Some(build_bar())
        };

        Self {
            bar,
            quiet,
            last_phase: None,
        }
    }

    /// Display without a bar, for pipes and tests
    pub fn text_only(quiet: bool) -> Self {
        Self {
            bar: None,
            quiet,
            last_phase: None,
        }
    }

    /// Render the latest state
    pub fn update(&mut self, state: &JobState) {
        let phase_changed = self.last_phase != Some(state.phase);
        self.last_phase = Some(state.phase);

        match &self.bar {
            Some(bar) => {
                bar.set_position(bar_position(state.progress));
                if phase_changed {
                    bar.set_message(phase_message(state.phase));
                }
            }
            None if phase_changed && !self.quiet => {
                eprintln!("{}", phase_message(state.phase));
            }
            None => {}
        }
    }

    /// Clear the bar once the job is over
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    /// Leave the bar where it stopped with a closing message
    pub fn abandon(&mut self, message: &'static str) {
        match self.bar.take() {
            Some(bar) => bar.abandon_with_message(message),
            None if !self.quiet => eprintln!("{}", message),
            None => {}
        }
    }

    /// Phase most recently rendered
    pub fn last_phase(&self) -> Option<JobPhase> {
        self.last_phase
    }
}

impl Drop for JobProgressDisplay {
    fn drop(&mut self) {
        self.finish();
    }
}

fn build_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
    {
        Ok(style) => bar.set_style(style.progress_chars("##-")),
        Err(e) => debug!("Progress bar template error: {}", e),
    }
    bar.enable_steady_tick(std::time::Duration::from_millis(120));
    bar
}

/// Whole-percent bar position for a progress value
pub fn bar_position(progress: f64) -> u64 {
    if progress.is_finite() {
        progress.clamp(0.0, 100.0).round() as u64
    } else {
        0
    }
}

/// One-line description of a phase
pub fn phase_message(phase: JobPhase) -> &'static str {
    match phase {
        JobPhase::Idle => "Waiting to submit",
        JobPhase::Uploading => "Uploading videos and analysing traffic...",
        JobPhase::Settling => "Analysis received",
        JobPhase::Completed => "Analysis complete",
        JobPhase::Failed => "Analysis failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_position() {
        assert_eq!(bar_position(0.0), 0);
        assert_eq!(bar_position(42.6), 43);
        assert_eq!(bar_position(100.0), 100);
        assert_eq!(bar_position(180.0), 100);
        assert_eq!(bar_position(f64::NAN), 0);
    }

    /// Test text mode phase tracking
    ///
    /// Repeated states in the same phase are rendered once.
    #[test]
    fn test_text_mode_tracks_phase() {
        let mut display = JobProgressDisplay::text_only(true);
        assert_eq!(display.last_phase(), None);

        let mut state = JobState {
            phase: JobPhase::Uploading,
            ..Default::default()
        };
        display.update(&state);
        state.progress = 30.0;
        display.update(&state);
        assert_eq!(display.last_phase(), Some(JobPhase::Uploading));

        state.phase = JobPhase::Completed;
        display.update(&state);
        assert_eq!(display.last_phase(), Some(JobPhase::Completed));

        display.finish();
        display.abandon("done");
    }

    #[test]
    fn test_phase_messages_are_distinct() {
        let phases = [
            JobPhase::Idle,
            JobPhase::Uploading,
            JobPhase::Settling,
            JobPhase::Completed,
            JobPhase::Failed,
        ];
        let messages: std::collections::HashSet<_> =
            phases.iter().map(|p| phase_message(*p)).collect();
        assert_eq!(messages.len(), phases.len());
    }
}
