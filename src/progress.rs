use std::path::Path;

use crate::sync::{SyncReport, SyncState};

/// Trait for reporting sync progress.
///
/// The CLI implements it with indicatif; library callers and tests use
/// [`SilentReporter`]. All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    fn on_phase(&self, _state: SyncState) {}
    fn on_scan_progress(&self, _dirs_visited: usize, _current_dir: &Path) {}
    fn on_apply_progress(&self, _applied: usize, _total: usize) {}
    fn on_complete(&self, _report: &SyncReport) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
