use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use diesel::Connection;
use tracing::{debug, info, warn};

use crate::db::crud::{self, EntityFilter};
use crate::db::{queries, DbConnection};
use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use crate::projector::project_tree;
use crate::scanner::scan_tree;
use crate::tree::path::decompose;
use crate::tree::TreeDiff;

/// Phases of one sync run, in the order they are entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Scanning,
    Projecting,
    Diffing,
    Applying,
    Committed,
    Failed,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncState::Idle => "idle",
            SyncState::Scanning => "scanning",
            SyncState::Projecting => "projecting",
            SyncState::Diffing => "diffing",
            SyncState::Applying => "applying",
            SyncState::Committed => "committed",
            SyncState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What has to change for the database to match the filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// On disk, missing from the database.
    pub to_add: TreeDiff,
    /// In the database, gone from disk.
    pub to_remove: TreeDiff,
}

impl SyncPlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }

    pub fn len(&self) -> usize {
        self.to_add.len() + self.to_remove.len()
    }
}

#[derive(Debug, Clone)]
pub struct SyncReport {
    pub plan: SyncPlan,
    pub created: usize,
    pub removed: usize,
    pub duration: Duration,
}

/// Seed the excluded directory names. Safe to call on every start; returns
/// how many names were not registered yet.
pub fn initialize_exclusions<S: AsRef<str>>(conn: &mut DbConnection, excluded: &[S]) -> Result<usize> {
    conn.transaction::<_, Error, _>(|conn| {
        let mut inserted = 0;
        for path in excluded {
            let (_, created) =
                crud::get_or_create(conn, &EntityFilter::ExcludedPath { path: path.as_ref() })?;
            if created {
                inserted += 1;
            }
        }
        Ok(inserted)
    })
}

/// Reconciles the database with the directory tree under one root.
pub struct SyncEngine {
    root: PathBuf,
    root_marker: Option<String>,
    excluded: BTreeSet<String>,
    state: SyncState,
}

impl SyncEngine {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            root_marker: None,
            excluded: BTreeSet::new(),
            state: SyncState::Idle,
        }
    }

    /// Directory name the hierarchy depth is counted from. Defaults to the
    /// last component of the root.
    pub fn with_root_marker(mut self, marker: impl Into<String>) -> Self {
        self.root_marker = Some(marker.into());
        self
    }

    /// Names skipped in addition to the ones stored in `excluded_paths`.
    pub fn with_excluded<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    fn root_marker(&self) -> Result<String> {
        if let Some(marker) = &self.root_marker {
            return Ok(marker.clone());
        }
        self.root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| Error::RootMarkerNotFound {
                path: self.root.clone(),
                marker: String::new(),
            })
    }

    fn enter(&mut self, state: SyncState, reporter: &dyn ProgressReporter) {
        debug!("Sync state: {} -> {}", self.state, state);
        self.state = state;
        reporter.on_phase(state);
    }

    /// Compute the changes a sync would apply, without applying them.
    pub fn plan(
        &mut self,
        conn: &mut DbConnection,
        reporter: &dyn ProgressReporter,
    ) -> Result<SyncPlan> {
        self.state = SyncState::Idle;
        let result = conn.transaction::<_, Error, _>(|conn| self.build_plan(conn, reporter));
        self.state = SyncState::Idle;
        result
    }

    /// Run a full reconciliation inside one transaction. Any error rolls the
    /// transaction back and leaves the database as it was.
    pub fn synchronize(
        &mut self,
        conn: &mut DbConnection,
        reporter: &dyn ProgressReporter,
    ) -> Result<SyncReport> {
        let start = Instant::now();
        self.state = SyncState::Idle;

        let result = conn.transaction::<_, Error, _>(|conn| {
            let plan = self.build_plan(conn, reporter)?;
            self.enter(SyncState::Applying, reporter);
            let (created, removed) = apply(conn, &plan, reporter)?;
            Ok((plan, created, removed))
        });

        match result {
            Ok((plan, created, removed)) => {
                self.enter(SyncState::Committed, reporter);
                let report = SyncReport {
                    plan,
                    created,
                    removed,
                    duration: start.elapsed(),
                };
                info!(
                    "Sync committed in {:.2}s: {} created, {} removed",
                    report.duration.as_secs_f64(),
                    report.created,
                    report.removed
                );
                reporter.on_complete(&report);
                Ok(report)
            }
            Err(err) => {
                warn!("Sync failed while {}, rolled back: {}", self.state, err);
                self.enter(SyncState::Failed, reporter);
                Err(err)
            }
        }
    }

    fn build_plan(
        &mut self,
        conn: &mut DbConnection,
        reporter: &dyn ProgressReporter,
    ) -> Result<SyncPlan> {
        let root_marker = self.root_marker()?;

        self.enter(SyncState::Scanning, reporter);
        let mut excluded: BTreeSet<String> = queries::excluded_paths(conn)?.into_iter().collect();
        excluded.extend(self.excluded.iter().cloned());
        info!("Scanning {} ({} excluded names)", self.root.display(), excluded.len());
        let real = scan_tree(&self.root, &root_marker, &excluded, reporter)?;

        self.enter(SyncState::Projecting, reporter);
        info!("Reading current tree from the database");
        let db = project_tree(conn)?;

        self.enter(SyncState::Diffing, reporter);
        let plan = SyncPlan {
            to_add: &real - &db,
            to_remove: &db - &real,
        };
        info!(
            "{} entries to add, {} to remove",
            plan.to_add.len(),
            plan.to_remove.len()
        );
        Ok(plan)
    }
}

/// Apply `plan` through the get-or-create / remove primitives.
///
/// Level entities are created before the paths that reference them, and
/// paths are removed before the level entities they reference.
fn apply(
    conn: &mut DbConnection,
    plan: &SyncPlan,
    reporter: &dyn ProgressReporter,
) -> Result<(usize, usize)> {
    let total = plan.len();
    let mut applied = 0;
    let mut created = 0;
    let mut removed = 0;

    for (level, names) in plan.to_add.iter_levels() {
        for name in names {
            let (_, inserted) = crud::get_or_create(conn, &EntityFilter::for_level(level, name)?)?;
            if inserted {
                created += 1;
            }
            applied += 1;
            reporter.on_apply_progress(applied, total);
        }
    }

    for composite in plan.to_add.paths() {
        let (_, inserted) = crud::get_or_create_path(conn, &decompose(composite)?)?;
        if inserted {
            created += 1;
        }
        applied += 1;
        reporter.on_apply_progress(applied, total);
    }

    for composite in plan.to_remove.paths() {
        if crud::remove_path(conn, &decompose(composite)?)?.is_some() {
            removed += 1;
        }
        applied += 1;
        reporter.on_apply_progress(applied, total);
    }

    for (level, names) in plan.to_remove.iter_levels() {
        for name in names {
            if crud::remove(conn, &EntityFilter::for_level(level, name)?)?.is_some() {
                removed += 1;
            }
            applied += 1;
            reporter.on_apply_progress(applied, total);
        }
    }

    Ok((created, removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::establish_connection;
    use crate::progress::SilentReporter;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingReporter {
        phases: Mutex<Vec<SyncState>>,
    }

    impl ProgressReporter for RecordingReporter {
        fn on_phase(&self, state: SyncState) {
            self.phases.lock().unwrap().push(state);
        }
    }

    #[test]
    fn test_states_in_order() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("_amministrazione");
        fs::create_dir_all(root.join("Banca/Enel/2023/default/Bolletta")).unwrap();

        let mut conn = establish_connection(":memory:").unwrap();
        let reporter = RecordingReporter::default();
        let mut engine = SyncEngine::new(&root);
        assert_eq!(engine.state(), SyncState::Idle);

        engine.synchronize(&mut conn, &reporter).unwrap();

        assert_eq!(engine.state(), SyncState::Committed);
        assert_eq!(
            *reporter.phases.lock().unwrap(),
            vec![
                SyncState::Scanning,
                SyncState::Projecting,
                SyncState::Diffing,
                SyncState::Applying,
                SyncState::Committed,
            ]
        );
    }

    #[test]
    fn test_failed_state_on_missing_root() {
        let tmp = tempdir().unwrap();
        let mut conn = establish_connection(":memory:").unwrap();
        let mut engine = SyncEngine::new(tmp.path().join("_amministrazione"));

        let err = engine.synchronize(&mut conn, &SilentReporter).unwrap_err();
        assert!(matches!(err, Error::ScanRootNotFound(_)));
        assert_eq!(engine.state(), SyncState::Failed);
    }

    #[test]
    fn test_initialize_exclusions_is_idempotent() {
        let mut conn = establish_connection(":memory:").unwrap();
        let excluded = ["Altro", "Smistatore"];

        assert_eq!(initialize_exclusions(&mut conn, &excluded).unwrap(), 2);
        assert_eq!(initialize_exclusions(&mut conn, &["Altro", "Archivio"]).unwrap(), 1);

        assert_eq!(
            queries::excluded_paths(&mut conn).unwrap(),
            vec!["Altro".to_string(), "Archivio".to_string(), "Smistatore".to_string()]
        );
    }

    #[test]
    fn test_plan_skips_engine_exclusions_without_seeding() {
        let tmp = tempdir().unwrap();
        let root = tmp.path().join("_amministrazione");
        fs::create_dir_all(root.join("Altro/Varie/2022/default/Appunti")).unwrap();
        fs::create_dir_all(root.join("Banca/Enel/2023/default/Bolletta")).unwrap();

        let mut conn = establish_connection(":memory:").unwrap();
        let mut engine = SyncEngine::new(&root).with_excluded(["Altro"]);
        let plan = engine.plan(&mut conn, &SilentReporter).unwrap();

        assert_eq!(
            plan.to_add.paths().iter().collect::<Vec<_>>(),
            vec!["Banca/Enel/2023/default/Bolletta"]
        );
        assert!(!plan.to_add.level(crate::tree::Level::Category).contains("Altro"));
        assert!(queries::excluded_paths(&mut conn).unwrap().is_empty());

        let report = engine.synchronize(&mut conn, &SilentReporter).unwrap();
        assert_eq!(report.plan, plan);
        assert_eq!(report.created, plan.to_add.len());
    }
}
