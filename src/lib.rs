pub mod config;
pub mod db;
pub mod error;
pub mod progress;
pub mod projector;
pub mod scanner;
pub mod sync;
pub mod tree;

pub use crate::config::AppConfig;
pub use error::Error;
pub use progress::{ProgressReporter, SilentReporter};
pub use sync::{initialize_exclusions, SyncEngine, SyncPlan, SyncReport, SyncState};
pub use tree::{Level, TreeDiff, TreeSnapshot};
