mod cli;
mod logging;
mod reporter;
mod utils;

use std::path::{Path, PathBuf};
use std::process;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use colored::*;
use dotenv::dotenv;
use paperless_sync::db::{self, export, DbConnection};
use paperless_sync::{AppConfig, SilentReporter, SyncEngine, SyncPlan};
use reporter::CliReporter;
use tracing::{error, info};
use utils::prompt::prompt_confirm;

fn main() {
    dotenv().ok();

    let args = Cli::parse();

    let guard = logging::init_logger();

    let config = match paperless_sync::config::load_configuration() {
        Ok(config) => config,
        Err(err) => {
            error!("Error loading configuration: {}", err);
            drop(guard);
            process::exit(1);
        }
    };

    let result = match args.command {
        Some(Commands::Init) => run_init(&config),
        Some(Commands::Sync { root }) => run_sync(&config, root),
        Some(Commands::Diff { root }) => run_diff(&config, root),
        Some(Commands::ExportPaths { output }) => run_export(&config, &output),
        Some(Commands::PrintConfig) => {
            println!("Configuration: {:#?}", config);
            Ok(())
        }
        Some(Commands::TruncateDb) => run_truncate(&config),
        None => {
            let _ = Cli::command().print_long_help();
            Ok(())
        }
    };

    if let Err(err) = result {
        error!("Error: {:#}", err);
        drop(guard);
        process::exit(1);
    }
}

fn connect(config: &AppConfig) -> anyhow::Result<DbConnection> {
    Ok(db::establish_connection(&config.database_url)?)
}

fn engine_for(config: &AppConfig, root: Option<PathBuf>) -> SyncEngine {
    let excluded = config.excluded.iter().cloned();
    if let Some(root) = root {
        return SyncEngine::new(root).with_excluded(excluded);
    }
    let engine = SyncEngine::new(config.admin_path.clone()).with_excluded(excluded);
    match config.root_marker() {
        Some(marker) => engine.with_root_marker(marker),
        None => engine,
    }
}

fn run_init(config: &AppConfig) -> anyhow::Result<()> {
    let mut conn = connect(config)?;
    let seeded = paperless_sync::initialize_exclusions(&mut conn, &config.excluded)?;
    info!("{} excluded paths registered", seeded);
    Ok(())
}

fn run_sync(config: &AppConfig, root: Option<PathBuf>) -> anyhow::Result<()> {
    let mut conn = connect(config)?;
    paperless_sync::initialize_exclusions(&mut conn, &config.excluded)?;

    let mut engine = engine_for(config, root);
    let report = engine.synchronize(&mut conn, &CliReporter::new())?;

    print_plan(&report.plan);
    Ok(())
}

fn run_diff(config: &AppConfig, root: Option<PathBuf>) -> anyhow::Result<()> {
    let mut conn = connect(config)?;
    let mut engine = engine_for(config, root);
    let plan = engine.plan(&mut conn, &SilentReporter)?;

    print_plan(&plan);
    Ok(())
}

fn run_export(config: &AppConfig, output: &Path) -> anyhow::Result<()> {
    let mut conn = connect(config)?;
    let count = export::write_paths_to_csv(&mut conn, output)?;
    println!("{} paths written to {}", count.to_string().green(), output.display());
    Ok(())
}

fn run_truncate(config: &AppConfig) -> anyhow::Result<()> {
    if !prompt_confirm(
        "Are you SURE you want to COMPLETELY DELETE the Database?",
        Some(false),
    )? {
        return Ok(());
    }
    let mut conn = connect(config)?;
    let rows = db::truncate_tables(&mut conn)?;
    println!("All tables truncated ({} rows)", rows);
    Ok(())
}

fn print_plan(plan: &SyncPlan) {
    if plan.is_empty() {
        println!("{}", "Database already matches the filesystem".green());
        return;
    }

    for (level, names) in plan.to_add.iter_levels() {
        for name in names {
            println!("{} {:<14} {}", "+".green(), level, name);
        }
    }
    for path in plan.to_add.paths() {
        println!("{} {:<14} {}", "+".green(), "path", path);
    }
    for path in plan.to_remove.paths() {
        println!("{} {:<14} {}", "-".red(), "path", path);
    }
    for (level, names) in plan.to_remove.iter_levels() {
        for name in names {
            println!("{} {:<14} {}", "-".red(), level, name);
        }
    }

    println!(
        "{} to add, {} to remove",
        plan.to_add.len().to_string().green(),
        plan.to_remove.len().to_string().red()
    );
}
