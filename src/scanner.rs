use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::progress::ProgressReporter;
use crate::tree::path;
use crate::tree::{Level, TreeSnapshot, LEVEL_COUNT};

/// Build a snapshot of the directory hierarchy under `root`.
///
/// Every directory is classified by the number of segments between it and
/// the last `root_marker` component of `root`: depth 1 is a category, depth 5
/// a document, whose full relative path also becomes a composite path. Below
/// `root` the depth comes from the walk itself, so directories sharing the
/// marker's name never shift it. Directories whose name, or
/// the name of any ancestor below the marker, is in `excluded` contribute
/// nothing. Files and directories deeper than five levels are ignored.
pub fn scan_tree(
    root: &Path,
    root_marker: &str,
    excluded: &BTreeSet<String>,
    reporter: &dyn ProgressReporter,
) -> Result<TreeSnapshot> {
    check_root(root)?;
    let base = path::normalize(root, root_marker)?;

    let mut snapshot = TreeSnapshot::new();
    let mut dirs_visited = 0;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Skipping unreadable entry: {}", err);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        dirs_visited += 1;
        reporter.on_scan_progress(dirs_visited, entry.path());

        let parts = relative_parts(&base, root, entry.path());
        if let Some(name) = parts.iter().find(|part| excluded.contains(*part)) {
            debug!("Excluded ({}): {}", name, entry.path().display());
            continue;
        }

        let Some(level) = Level::from_depth(parts.len()) else {
            continue;
        };
        snapshot.add(level, parts[parts.len() - 1].clone());

        if level == Level::Document {
            let segments: &[String; LEVEL_COUNT] = parts
                .as_slice()
                .try_into()
                .map_err(|_| Error::MalformedPath(parts.join("/")))?;
            snapshot.add_path(path::compose(segments));
        }
    }

    debug!("Scanned {} directories under {}", dirs_visited, root.display());
    Ok(snapshot)
}

/// Segments of `dir` below the root marker, given the segments `base` that
/// already separate the marker from `root`.
fn relative_parts(base: &[String], root: &Path, dir: &Path) -> Vec<String> {
    let mut parts = base.to_vec();
    if let Ok(relative) = dir.strip_prefix(root) {
        parts.extend(relative.components().filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        }));
    }
    parts
}

fn check_root(root: &Path) -> Result<()> {
    let not_found = || Error::ScanRootNotFound(root.to_path_buf());

    let metadata = fs::metadata(root).map_err(|_| not_found())?;
    if !metadata.is_dir() {
        return Err(not_found());
    }
    fs::read_dir(root).map_err(|_| not_found())?;
    Ok(())
}
