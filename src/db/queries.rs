use diesel::prelude::*;

use super::models::PathLabels;
use super::schema::{
    categories, document_types, documents, excluded_paths, paths, utilities, years,
};
use super::DbConnection;
use crate::error::Result;
use crate::tree::Level;

/// Distinct entity names stored for `level`. Years come back as text.
pub fn level_names(conn: &mut DbConnection, level: Level) -> Result<Vec<String>> {
    let names = match level {
        Level::Category => categories::table
            .select(categories::name)
            .distinct()
            .load::<String>(conn)?,
        Level::Utility => utilities::table
            .select(utilities::name)
            .distinct()
            .load::<String>(conn)?,
        Level::Year => years::table
            .select(years::name)
            .distinct()
            .load::<i32>(conn)?
            .into_iter()
            .map(|year| year.to_string())
            .collect(),
        Level::DocumentType => document_types::table
            .select(document_types::name)
            .distinct()
            .load::<String>(conn)?,
        Level::Document => documents::table
            .select(documents::name)
            .distinct()
            .load::<String>(conn)?,
    };
    Ok(names)
}

/// Every composite path row with its foreign keys replaced by entity names.
///
/// Equivalent SQL:
///
/// ```sql
/// SELECT c.name, u.name, y.name, dt.name, d.name
/// FROM paths p
/// JOIN categories c ON p.category = c.id
/// JOIN utilities u ON p.utility = u.id
/// JOIN years y ON p.year = y.id
/// JOIN document_types dt ON p.document_type = dt.id
/// JOIN documents d ON p.document = d.id
/// ```
pub fn path_labels(conn: &mut DbConnection) -> Result<Vec<PathLabels>> {
    let labels = paths::table
        .inner_join(categories::table)
        .inner_join(utilities::table)
        .inner_join(years::table)
        .inner_join(document_types::table)
        .inner_join(documents::table)
        .select((
            categories::name,
            utilities::name,
            years::name,
            document_types::name,
            documents::name,
        ))
        .order(paths::id)
        .load::<PathLabels>(conn)?;
    Ok(labels)
}

pub fn excluded_paths(conn: &mut DbConnection) -> Result<Vec<String>> {
    let excluded = excluded_paths::table
        .select(excluded_paths::path)
        .order(excluded_paths::path)
        .load::<String>(conn)?;
    Ok(excluded)
}
