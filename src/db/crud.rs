//! Lookup-then-branch primitives behind every mutation of a sync run.
//!
//! Each mutation first looks the row up with [`find_existing`], then either
//! returns it, creates it or deletes it. Rows are addressed by their natural
//! key through a typed [`EntityFilter`].

use std::fmt;

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::models::{ExcludedPath, LevelEntity, NewExcludedPath, PathIds, PathRow, Year};
use super::schema::{
    categories, document_types, documents, excluded_paths, paths, utilities, years,
};
use super::DbConnection;
use crate::error::{Error, Result};
use crate::tree::{CompositePath, Level, LEVEL_COUNT};

/// Natural key of one row, per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityFilter<'a> {
    Category { name: &'a str },
    Utility { name: &'a str },
    Year { name: i32 },
    DocumentType { name: &'a str },
    Document { name: &'a str },
    Path(PathIds),
    ExcludedPath { path: &'a str },
}

impl<'a> EntityFilter<'a> {
    /// Filter on the entity called `name` in the table backing `level`.
    pub fn for_level(level: Level, name: &'a str) -> Result<Self> {
        let filter = match level {
            Level::Category => EntityFilter::Category { name },
            Level::Utility => EntityFilter::Utility { name },
            Level::Year => EntityFilter::Year {
                name: parse_year(name)?,
            },
            Level::DocumentType => EntityFilter::DocumentType { name },
            Level::Document => EntityFilter::Document { name },
        };
        Ok(filter)
    }

    pub fn model(&self) -> &'static str {
        match self {
            EntityFilter::Category { .. } => "Category",
            EntityFilter::Utility { .. } => "Utility",
            EntityFilter::Year { .. } => "Year",
            EntityFilter::DocumentType { .. } => "DocumentType",
            EntityFilter::Document { .. } => "Document",
            EntityFilter::Path(_) => "Path",
            EntityFilter::ExcludedPath { .. } => "ExcludedPath",
        }
    }
}

impl fmt::Display for EntityFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityFilter::Category { name }
            | EntityFilter::Utility { name }
            | EntityFilter::DocumentType { name }
            | EntityFilter::Document { name } => write!(f, "{}(name={:?})", self.model(), name),
            EntityFilter::Year { name } => write!(f, "{}(name={})", self.model(), name),
            EntityFilter::Path(ids) => write!(f, "{}({})", self.model(), ids),
            EntityFilter::ExcludedPath { path } => write!(f, "{}(path={:?})", self.model(), path),
        }
    }
}

/// Lowest year the `years` table accepts.
pub const MIN_YEAR: i32 = 2000;

/// Year directories must be spelled exactly as the integer they store,
/// otherwise the stringified database value would never match again.
pub fn parse_year(name: &str) -> Result<i32> {
    match name.parse::<i32>() {
        Ok(year) if year >= MIN_YEAR && year.to_string() == name => Ok(year),
        _ => Err(Error::InvalidYear(name.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Level(LevelEntity),
    Path(PathRow),
    ExcludedPath(ExcludedPath),
}

impl Row {
    pub fn id(&self) -> i32 {
        match self {
            Row::Level(entity) => entity.id,
            Row::Path(path) => path.id,
            Row::ExcludedPath(excluded) => excluded.id,
        }
    }
}

macro_rules! find_named {
    ($table:ident, $name:expr, $conn:expr) => {
        $table::table
            .filter($table::name.eq($name))
            .select(($table::id, $table::name, $table::description))
            .first::<LevelEntity>($conn)
            .optional()?
            .map(Row::Level)
    };
}

macro_rules! insert_named {
    ($table:ident, $name:expr, $conn:expr) => {
        diesel::insert_into($table::table)
            .values($table::name.eq($name))
            .execute($conn)?
    };
}

pub fn find_existing(conn: &mut DbConnection, filter: &EntityFilter) -> Result<Option<Row>> {
    debug!("{}: lookup", filter);

    let row = match *filter {
        EntityFilter::Category { name } => find_named!(categories, name, conn),
        EntityFilter::Utility { name } => find_named!(utilities, name, conn),
        EntityFilter::DocumentType { name } => find_named!(document_types, name, conn),
        EntityFilter::Document { name } => find_named!(documents, name, conn),
        EntityFilter::Year { name } => years::table
            .filter(years::name.eq(name))
            .select(Year::as_select())
            .first(conn)
            .optional()?
            .map(|year| Row::Level(year.into())),
        EntityFilter::Path(ids) => paths::table
            .filter(paths::category.eq(ids.category))
            .filter(paths::utility.eq(ids.utility))
            .filter(paths::year.eq(ids.year))
            .filter(paths::document_type.eq(ids.document_type))
            .filter(paths::document.eq(ids.document))
            .select(PathRow::as_select())
            .first(conn)
            .optional()?
            .map(Row::Path),
        EntityFilter::ExcludedPath { path } => excluded_paths::table
            .filter(excluded_paths::path.eq(path))
            .select(ExcludedPath::as_select())
            .first(conn)
            .optional()?
            .map(Row::ExcludedPath),
    };

    match &row {
        Some(found) => debug!("\tfound: {:?}", found),
        None => debug!("\tno match"),
    }
    Ok(row)
}

fn insert(conn: &mut DbConnection, filter: &EntityFilter) -> Result<usize> {
    let rows = match *filter {
        EntityFilter::Category { name } => insert_named!(categories, name, conn),
        EntityFilter::Utility { name } => insert_named!(utilities, name, conn),
        EntityFilter::DocumentType { name } => insert_named!(document_types, name, conn),
        EntityFilter::Document { name } => insert_named!(documents, name, conn),
        EntityFilter::Year { name } => insert_named!(years, name, conn),
        EntityFilter::Path(ids) => diesel::insert_into(paths::table)
            .values(&ids)
            .execute(conn)?,
        EntityFilter::ExcludedPath { path } => diesel::insert_into(excluded_paths::table)
            .values(&NewExcludedPath { path, reason: None })
            .execute(conn)?,
    };
    Ok(rows)
}

fn delete(conn: &mut DbConnection, filter: &EntityFilter, id: i32) -> Result<usize> {
    let rows = match filter {
        EntityFilter::Category { .. } => diesel::delete(categories::table.find(id)).execute(conn)?,
        EntityFilter::Utility { .. } => diesel::delete(utilities::table.find(id)).execute(conn)?,
        EntityFilter::Year { .. } => diesel::delete(years::table.find(id)).execute(conn)?,
        EntityFilter::DocumentType { .. } => {
            diesel::delete(document_types::table.find(id)).execute(conn)?
        }
        EntityFilter::Document { .. } => diesel::delete(documents::table.find(id)).execute(conn)?,
        EntityFilter::Path(_) => diesel::delete(paths::table.find(id)).execute(conn)?,
        EntityFilter::ExcludedPath { .. } => {
            diesel::delete(excluded_paths::table.find(id)).execute(conn)?
        }
    };
    Ok(rows)
}

/// Return the row matching `filter`, creating it first if it is missing.
/// The flag is `true` only when this call inserted the row.
pub fn get_or_create(conn: &mut DbConnection, filter: &EntityFilter) -> Result<(Row, bool)> {
    if let Some(row) = find_existing(conn, filter)? {
        return Ok((row, false));
    }
    create_or_reread(conn, filter)
}

/// Insert inside a savepoint; a unique violation rolls back only the
/// savepoint and the existing row is read back instead.
fn create_or_reread(conn: &mut DbConnection, filter: &EntityFilter) -> Result<(Row, bool)> {
    let created = match conn.transaction::<_, Error, _>(|conn| insert(conn, filter)) {
        Ok(_) => {
            debug!("\t\tcreated: {}", filter);
            true
        }
        Err(Error::Database(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _))) => {
            debug!("\t\t{} already present, re-reading", filter);
            false
        }
        Err(err) => return Err(err),
    };

    let row = find_existing(conn, filter)?.ok_or(Error::Database(DieselError::NotFound))?;
    Ok((row, created))
}

/// Delete the row matching `filter` if there is one.
pub fn remove(conn: &mut DbConnection, filter: &EntityFilter) -> Result<Option<Row>> {
    let Some(row) = find_existing(conn, filter)? else {
        return Ok(None);
    };

    delete(conn, filter, row.id())?;
    debug!("\t\tremoved: {:?}", row);
    Ok(Some(row))
}

/// Map every segment of `path` to the id of its entity.
pub fn resolve_path_ids(conn: &mut DbConnection, path: &CompositePath) -> Result<PathIds> {
    let mut ids = [0; LEVEL_COUNT];
    for (level, name) in path.segments() {
        let filter = EntityFilter::for_level(level, name)?;
        let row = find_existing(conn, &filter)?.ok_or_else(|| Error::DanglingReference {
            level,
            name: name.to_string(),
        })?;
        ids[level.index()] = row.id();
    }

    Ok(PathIds {
        category: ids[Level::Category.index()],
        utility: ids[Level::Utility.index()],
        year: ids[Level::Year.index()],
        document_type: ids[Level::DocumentType.index()],
        document: ids[Level::Document.index()],
    })
}

pub fn get_or_create_path(conn: &mut DbConnection, path: &CompositePath) -> Result<(Row, bool)> {
    let ids = resolve_path_ids(conn, path)?;
    get_or_create(conn, &EntityFilter::Path(ids))
}

pub fn remove_path(conn: &mut DbConnection, path: &CompositePath) -> Result<Option<Row>> {
    let ids = resolve_path_ids(conn, path)?;
    remove(conn, &EntityFilter::Path(ids))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::establish_connection;
    use crate::tree::path::decompose;

    fn test_db() -> DbConnection {
        establish_connection(":memory:").unwrap()
    }

    #[test]
    fn test_parse_year() {
        assert_eq!(parse_year("2023").unwrap(), 2023);
        assert_eq!(parse_year("2000").unwrap(), MIN_YEAR);
        for bad in ["duemila", "+2023", "02023", " 2023", "", "1999", "-2023"] {
            assert!(matches!(parse_year(bad), Err(Error::InvalidYear(_))), "{:?}", bad);
        }
    }

    #[test]
    fn test_get_or_create_is_idempotent() {
        let mut conn = test_db();
        let filter = EntityFilter::for_level(Level::Category, "Banca").unwrap();

        let (first, created) = get_or_create(&mut conn, &filter).unwrap();
        assert!(created);
        let (second, created) = get_or_create(&mut conn, &filter).unwrap();
        assert!(!created);
        assert_eq!(first, second);

        let count: i64 = categories::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_year_rows_read_back_as_text() {
        let mut conn = test_db();
        let filter = EntityFilter::for_level(Level::Year, "2023").unwrap();

        match get_or_create(&mut conn, &filter).unwrap().0 {
            Row::Level(entity) => assert_eq!(entity.name, "2023"),
            other => panic!("unexpected row {:?}", other),
        }
    }

    #[test]
    fn test_create_after_concurrent_insert_rereads() {
        let mut conn = test_db();
        let filter = EntityFilter::Utility { name: "Enel" };

        conn.transaction::<_, Error, _>(|conn| {
            insert(conn, &filter)?;
            // The fast path is skipped on purpose: the insert must hit the
            // unique constraint and fall back to the existing row.
            let (row, created) = create_or_reread(conn, &filter)?;
            assert!(matches!(row, Row::Level(ref entity) if entity.name == "Enel"));
            assert!(!created);

            // The outer transaction is still usable afterwards.
            get_or_create(conn, &EntityFilter::Utility { name: "Acea" })?;
            Ok(())
        })
        .unwrap();

        let count: i64 = utilities::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 2);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut conn = test_db();
        let filter = EntityFilter::Document { name: "Bolletta" };
        get_or_create(&mut conn, &filter).unwrap();

        assert!(remove(&mut conn, &filter).unwrap().is_some());
        assert!(remove(&mut conn, &filter).unwrap().is_none());
        assert!(find_existing(&mut conn, &filter).unwrap().is_none());
    }

    #[test]
    fn test_path_requires_level_entities() {
        let mut conn = test_db();
        let path = decompose("Banca/Enel/2023/default/Bolletta").unwrap();

        for level in [Level::Category, Level::Utility, Level::Year] {
            let filter = EntityFilter::for_level(level, path.segment(level)).unwrap();
            get_or_create(&mut conn, &filter).unwrap();
        }

        let err = get_or_create_path(&mut conn, &path).unwrap_err();
        assert!(matches!(
            err,
            Error::DanglingReference { level: Level::DocumentType, ref name } if name == "default"
        ));
    }

    #[test]
    fn test_path_round_trip() {
        let mut conn = test_db();
        let path = decompose("Banca/Enel/2023/default/Bolletta").unwrap();
        for (level, name) in path.segments() {
            get_or_create(&mut conn, &EntityFilter::for_level(level, name).unwrap()).unwrap();
        }

        let (created, _) = get_or_create_path(&mut conn, &path).unwrap();
        let (again, inserted) = get_or_create_path(&mut conn, &path).unwrap();
        assert_eq!(created.id(), again.id());
        assert!(!inserted);

        assert!(remove_path(&mut conn, &path).unwrap().is_some());
        assert!(remove_path(&mut conn, &path).unwrap().is_none());
    }
}
