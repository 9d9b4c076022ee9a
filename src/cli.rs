use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "paperless-sync")]
#[command(about = "Keeps the paperless database in step with the archive folders", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Seed the excluded directory names
    Init,
    /// Reconcile the database with the administration directory
    Sync {
        /// Administration root, overriding the configured one
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Show what a sync would change without applying it
    Diff {
        /// Administration root, overriding the configured one
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Write all stored paths to a CSV file
    ExportPaths {
        #[arg(short, long, default_value = "paths.csv")]
        output: PathBuf,
    },
    /// Print configuration values
    PrintConfig,
    /// Delete all rows from the database
    TruncateDb,
}
