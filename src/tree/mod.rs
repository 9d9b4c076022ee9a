//! In-memory model of the archive hierarchy: the five levels, the composite
//! path codec and the set-based snapshots compared during a sync.

mod level;
pub mod path;
mod snapshot;

pub use level::{Level, LEVEL_COUNT};
pub use path::CompositePath;
pub use snapshot::{TreeDiff, TreeSnapshot, PATHS_KEY};
