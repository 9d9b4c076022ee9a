use tracing::debug;

use crate::db::models::level_table;
use crate::db::{queries, DbConnection};
use crate::error::Result;
use crate::tree::{path, Level, TreeSnapshot};

/// Build a snapshot of what the database currently records, in the same
/// shape [`crate::scanner::scan_tree`] produces for the directory tree.
pub fn project_tree(conn: &mut DbConnection) -> Result<TreeSnapshot> {
    let mut snapshot = TreeSnapshot::new();

    for level in Level::ALL {
        let names = queries::level_names(conn, level)?;
        debug!("{} names in {}", names.len(), level_table(level));
        for name in names {
            snapshot.add(level, name);
        }
    }

    let labels = queries::path_labels(conn)?;
    debug!("{} paths in the database", labels.len());
    for label in labels {
        snapshot.add_path(path::compose(&label.segments()));
    }

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::crud::{get_or_create, get_or_create_path, EntityFilter};
    use crate::db::establish_connection;
    use crate::tree::path::decompose;

    #[test]
    fn test_project_empty_database() {
        let mut conn = establish_connection(":memory:").unwrap();
        assert!(project_tree(&mut conn).unwrap().is_empty());
    }

    #[test]
    fn test_project_stringifies_years_and_joins_paths() {
        let mut conn = establish_connection(":memory:").unwrap();
        let path = decompose("Banca/Enel/2023/default/Bolletta").unwrap();
        for (level, name) in path.segments() {
            get_or_create(&mut conn, &EntityFilter::for_level(level, name).unwrap()).unwrap();
        }
        get_or_create_path(&mut conn, &path).unwrap();
        get_or_create(&mut conn, &EntityFilter::Year { name: 2024 }).unwrap();

        let snapshot = project_tree(&mut conn).unwrap();
        assert_eq!(
            snapshot.level(Level::Year).iter().collect::<Vec<_>>(),
            vec!["2023", "2024"]
        );
        assert!(snapshot.level(Level::DocumentType).contains("default"));
        assert_eq!(
            snapshot.paths().iter().collect::<Vec<_>>(),
            vec!["Banca/Enel/2023/default/Bolletta"]
        );
    }
}
