pub mod crud;
pub mod export;
pub mod models;
pub mod queries;
pub mod schema;

use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::debug;

use crate::error::{Error, Result};

pub type DbConnection = SqliteConnection;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Open the database at `database_url` (a file path or `:memory:`), enable
/// foreign keys and bring the schema up to date.
pub fn establish_connection(database_url: &str) -> Result<DbConnection> {
    let mut connection = SqliteConnection::establish(database_url)?;

    diesel::sql_query("PRAGMA foreign_keys = ON").execute(&mut connection)?;
    run_migrations(&mut connection)?;

    debug!("Connected to {}", database_url);
    Ok(connection)
}

pub fn run_migrations(connection: &mut DbConnection) -> Result<()> {
    let applied = connection
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| Error::Migration(err.to_string()))?;
    for version in applied {
        debug!("Applied migration {}", version);
    }
    Ok(())
}

/// Delete every row, children before parents.
pub fn truncate_tables(connection: &mut DbConnection) -> Result<usize> {
    use schema::*;

    connection.transaction::<_, Error, _>(|conn| {
        let mut rows = 0;
        debug!("Truncating table: paths");
        rows += diesel::delete(paths::table).execute(conn)?;
        debug!("Truncating table: categories");
        rows += diesel::delete(categories::table).execute(conn)?;
        debug!("Truncating table: utilities");
        rows += diesel::delete(utilities::table).execute(conn)?;
        debug!("Truncating table: years");
        rows += diesel::delete(years::table).execute(conn)?;
        debug!("Truncating table: document_types");
        rows += diesel::delete(document_types::table).execute(conn)?;
        debug!("Truncating table: documents");
        rows += diesel::delete(documents::table).execute(conn)?;
        debug!("Truncating table: excluded_paths");
        rows += diesel::delete(excluded_paths::table).execute(conn)?;
        Ok(rows)
    })
}
