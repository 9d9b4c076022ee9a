use std::path::PathBuf;

use thiserror::Error;

use crate::tree::Level;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Scan root not found or unreadable: {}", .0.display())]
    ScanRootNotFound(PathBuf),

    #[error("Root marker '{marker}' not found in path {}", .path.display())]
    RootMarkerNotFound { path: PathBuf, marker: String },

    #[error("Malformed composite path '{0}': expected 5 segments")]
    MalformedPath(String),

    #[error("Unknown hierarchy level '{0}'")]
    UnknownLevel(String),

    #[error("No {level} named '{name}' in the database")]
    DanglingReference { level: Level, name: String },

    #[error("Year directory '{0}' is not a year from 2000 on")]
    InvalidYear(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("Database connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
