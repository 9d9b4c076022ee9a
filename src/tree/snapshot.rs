use std::collections::BTreeSet;
use std::fmt;
use std::ops::Sub;

use crate::error::Result;
use crate::tree::{Level, LEVEL_COUNT};

/// Tag used alongside the level tags to address the composite path set.
pub const PATHS_KEY: &str = "paths";

/// Names seen at each level plus every complete five-level path.
///
/// Built either from the directory tree on disk or from the database rows;
/// the two are only meaningful when compared with each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSnapshot {
    levels: [BTreeSet<String>; LEVEL_COUNT],
    paths: BTreeSet<String>,
}

impl TreeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, level: Level, name: impl Into<String>) -> bool {
        self.levels[level.index()].insert(name.into())
    }

    pub fn add_path(&mut self, composite: impl Into<String>) -> bool {
        self.paths.insert(composite.into())
    }

    /// String-keyed insert: `key` is a level tag or [`PATHS_KEY`].
    pub fn add_named(&mut self, key: &str, value: impl Into<String>) -> Result<bool> {
        if key == PATHS_KEY {
            return Ok(self.add_path(value));
        }
        let level: Level = key.parse()?;
        Ok(self.add(level, value))
    }

    pub fn level(&self, level: Level) -> &BTreeSet<String> {
        &self.levels[level.index()]
    }

    pub fn paths(&self) -> &BTreeSet<String> {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty() && self.levels.iter().all(BTreeSet::is_empty)
    }

    /// Elements of `self` missing from `other`, per level and for paths.
    pub fn difference(&self, other: &TreeSnapshot) -> TreeDiff {
        let mut diff = TreeDiff::default();
        for level in Level::ALL {
            diff.levels[level.index()] = self
                .level(level)
                .difference(other.level(level))
                .cloned()
                .collect();
        }
        diff.paths = self.paths.difference(&other.paths).cloned().collect();
        diff
    }
}

impl Sub for &TreeSnapshot {
    type Output = TreeDiff;

    fn sub(self, other: &TreeSnapshot) -> TreeDiff {
        self.difference(other)
    }
}

impl fmt::Display for TreeSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for level in Level::ALL {
            writeln!(f, "{}: {:?}", level, self.level(level))?;
        }
        write!(f, "{}: {:?}", PATHS_KEY, self.paths)
    }
}

/// Result of subtracting one snapshot from another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeDiff {
    levels: [BTreeSet<String>; LEVEL_COUNT],
    paths: BTreeSet<String>,
}

impl TreeDiff {
    pub fn level(&self, level: Level) -> &BTreeSet<String> {
        &self.levels[level.index()]
    }

    pub fn paths(&self) -> &BTreeSet<String> {
        &self.paths
    }

    /// Lookup by level tag or [`PATHS_KEY`].
    pub fn get(&self, key: &str) -> Result<&BTreeSet<String>> {
        if key == PATHS_KEY {
            return Ok(&self.paths);
        }
        let level: Level = key.parse()?;
        Ok(self.level(level))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of entries across all levels and paths.
    pub fn len(&self) -> usize {
        self.paths.len() + self.levels.iter().map(BTreeSet::len).sum::<usize>()
    }

    pub fn iter_levels(&self) -> impl Iterator<Item = (Level, &BTreeSet<String>)> {
        Level::ALL.into_iter().zip(self.levels.iter())
    }
}
