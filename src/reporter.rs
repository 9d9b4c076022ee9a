use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use paperless_sync::{ProgressReporter, SyncReport, SyncState};

const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// CLI progress reporter using indicatif.
///
/// - Scan phase: spinner with a running directory count
/// - Apply phase: progress bar over the planned changes
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.replace(pb) {
            old.finish_and_clear();
        }
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            f(pb);
        }
    }
}

impl ProgressReporter for CliReporter {
    fn on_phase(&self, state: SyncState) {
        match state {
            SyncState::Scanning => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    ProgressStyle::with_template("{spinner:.cyan} {msg}")
                        .unwrap()
                        .tick_chars(TICK_CHARS),
                );
                pb.set_message("Scanning directories...");
                pb.enable_steady_tick(Duration::from_millis(80));
                self.set_bar(pb);
            }
            SyncState::Applying => {
                let pb = ProgressBar::new(0);
                pb.set_style(
                    ProgressStyle::with_template(
                        "  {spinner:.cyan} Applying [{bar:30.cyan/dim}] {pos}/{len} changes",
                    )
                    .unwrap()
                    .progress_chars("━╸─")
                    .tick_chars(TICK_CHARS),
                );
                pb.enable_steady_tick(Duration::from_millis(80));
                self.set_bar(pb);
            }
            SyncState::Committed | SyncState::Failed | SyncState::Idle => self.finish_bar(),
            SyncState::Projecting | SyncState::Diffing => {
                self.with_bar(|pb| pb.set_message(format!("{}...", state)));
            }
        }
    }

    fn on_scan_progress(&self, dirs_visited: usize, _current_dir: &Path) {
        self.with_bar(|pb| pb.set_message(format!("Scanning... {} directories", dirs_visited)));
    }

    fn on_apply_progress(&self, applied: usize, total: usize) {
        self.with_bar(|pb| {
            pb.set_length(total as u64);
            pb.set_position(applied as u64);
        });
    }

    fn on_complete(&self, report: &SyncReport) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Sync complete: {} created, {} removed in {:.2}s",
            report.created,
            report.removed,
            report.duration.as_secs_f64()
        );
    }
}
