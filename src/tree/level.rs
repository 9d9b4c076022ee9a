use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub const LEVEL_COUNT: usize = 5;

/// One of the five fixed classification dimensions of the archive.
///
/// Declaration order is the directory order: a category directory sits at
/// depth 1 below the administration root, a document directory at depth 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Category,
    Utility,
    Year,
    DocumentType,
    Document,
}

impl Level {
    pub const ALL: [Level; LEVEL_COUNT] = [
        Level::Category,
        Level::Utility,
        Level::Year,
        Level::DocumentType,
        Level::Document,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Category => "category",
            Level::Utility => "utility",
            Level::Year => "year",
            Level::DocumentType => "document_type",
            Level::Document => "document",
        }
    }

    /// Zero-based position, usable as an index into per-level arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Directory depth relative to the administration root (1..=5).
    pub fn depth(self) -> usize {
        self.index() + 1
    }

    pub fn from_depth(depth: usize) -> Option<Level> {
        depth
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index).copied())
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str() == tag)
            .ok_or_else(|| Error::UnknownLevel(tag.to_string()))
    }
}
