use std::fmt;

use diesel::prelude::*;

use super::schema;
use crate::tree::{Level, LEVEL_COUNT};

/// Table backing each hierarchy level.
pub const LEVEL_TABLES: [(Level, &str); LEVEL_COUNT] = [
    (Level::Category, "categories"),
    (Level::Utility, "utilities"),
    (Level::Year, "years"),
    (Level::DocumentType, "document_types"),
    (Level::Document, "documents"),
];

pub fn level_table(level: Level) -> &'static str {
    LEVEL_TABLES[level.index()].1
}

/// A category, utility, document type or document row. Years are folded
/// into this shape with their integer name rendered as text.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct LevelEntity {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = schema::years)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Year {
    pub id: i32,
    pub name: i32,
}

impl From<Year> for LevelEntity {
    fn from(year: Year) -> Self {
        LevelEntity {
            id: year.id,
            name: year.name.to_string(),
            description: None,
        }
    }
}

/// Foreign keys of one composite path, in level order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Insertable)]
#[diesel(table_name = schema::paths)]
pub struct PathIds {
    pub category: i32,
    pub utility: i32,
    pub year: i32,
    pub document_type: i32,
    pub document: i32,
}

impl fmt::Display for PathIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "category={}, utility={}, year={}, document_type={}, document={}",
            self.category, self.utility, self.year, self.document_type, self.document
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = schema::paths)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PathRow {
    pub id: i32,
    pub category: i32,
    pub utility: i32,
    pub year: i32,
    pub document_type: i32,
    pub document: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable)]
#[diesel(table_name = schema::excluded_paths)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ExcludedPath {
    pub id: i32,
    pub path: String,
    pub reason: Option<String>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = schema::excluded_paths)]
pub struct NewExcludedPath<'a> {
    pub path: &'a str,
    pub reason: Option<&'a str>,
}

/// Human readable names of one composite path, as loaded by the five-way join.
#[derive(Debug, Clone, PartialEq, Eq, Queryable)]
pub struct PathLabels {
    pub category: String,
    pub utility: String,
    pub year: i32,
    pub document_type: String,
    pub document: String,
}

impl PathLabels {
    pub fn segments(&self) -> [String; LEVEL_COUNT] {
        [
            self.category.clone(),
            self.utility.clone(),
            self.year.to_string(),
            self.document_type.clone(),
            self.document.clone(),
        ]
    }
}
