use std::path::Path;

use csv::Writer;
use tracing::info;

use super::queries;
use super::DbConnection;
use crate::error::Result;
use crate::tree::{path, Level};

/// Write every composite path stored in the database to `file_path` as CSV,
/// one column per level plus the composite identifier.
pub fn write_paths_to_csv(conn: &mut DbConnection, file_path: &Path) -> Result<usize> {
    let labels = queries::path_labels(conn)?;
    let mut writer = Writer::from_path(file_path)?;

    let mut headers: Vec<&str> = Level::ALL.iter().map(|level| level.as_str()).collect();
    headers.push("path");
    writer.write_record(&headers)?;

    for label in &labels {
        let segments = label.segments();
        let mut record = segments.to_vec();
        record.push(path::compose(&segments));
        writer.write_record(&record)?;
    }

    writer.flush()?;
    info!("Exported {} paths to {}", labels.len(), file_path.display());

    Ok(labels.len())
}
