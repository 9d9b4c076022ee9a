use std::path::{Component, Path};

use crate::error::{Error, Result};
use crate::tree::{Level, LEVEL_COUNT};

pub const SEPARATOR: char = '/';

/// One name per hierarchy level, in level order.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositePath {
    segments: [String; LEVEL_COUNT],
}

impl CompositePath {
    pub fn new(segments: [String; LEVEL_COUNT]) -> Self {
        CompositePath { segments }
    }

    pub fn segment(&self, level: Level) -> &str {
        &self.segments[level.index()]
    }

    pub fn segments(&self) -> impl Iterator<Item = (Level, &str)> {
        Level::ALL
            .into_iter()
            .zip(self.segments.iter().map(String::as_str))
    }

    pub fn compose(&self) -> String {
        compose(&self.segments)
    }
}

/// Join five level names into the canonical composite identifier.
pub fn compose<S: AsRef<str>>(segments: &[S; LEVEL_COUNT]) -> String {
    let mut composite = String::new();
    for (i, segment) in segments.iter().enumerate() {
        if i > 0 {
            composite.push(SEPARATOR);
        }
        composite.push_str(segment.as_ref());
    }
    composite
}

/// Split a composite identifier into its five level names.
pub fn decompose(path: &str) -> Result<CompositePath> {
    let parts: Vec<String> = path.split(SEPARATOR).map(str::to_string).collect();
    if parts.iter().any(String::is_empty) {
        return Err(Error::MalformedPath(path.to_string()));
    }

    let segments: [String; LEVEL_COUNT] = parts
        .try_into()
        .map_err(|_| Error::MalformedPath(path.to_string()))?;

    Ok(CompositePath::new(segments))
}

/// Segments of `raw` that follow the last segment equal to `root_marker`.
///
/// `/Volumes/ws/amministrazione/Banca/Enel` with marker `amministrazione`
/// yields `["Banca", "Enel"]`.
pub fn normalize(raw: &Path, root_marker: &str) -> Result<Vec<String>> {
    let segments: Vec<String> = raw
        .components()
        .filter_map(|component| match component {
            Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    match segments.iter().rposition(|segment| segment == root_marker) {
        Some(index) => Ok(segments[index + 1..].to_vec()),
        None => Err(Error::RootMarkerNotFound {
            path: raw.to_path_buf(),
            marker: root_marker.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_compose_decompose_round_trip() {
        let composites = [
            "Banca/Enel/2023/default/Bolletta",
            "Salute/ASL Roma/2019/paid/Referto 12-03",
            "Casa/Condominio/2024/not_paid/Rata.2",
        ];
        for composite in composites {
            assert_eq!(decompose(composite).unwrap().compose(), composite);
        }
    }

    #[test]
    fn test_decompose_segments_in_level_order() {
        let path = decompose("Banca/Enel/2023/default/Bolletta").unwrap();
        assert_eq!(path.segment(Level::Category), "Banca");
        assert_eq!(path.segment(Level::Year), "2023");
        assert_eq!(path.segment(Level::Document), "Bolletta");

        let levels: Vec<Level> = path.segments().map(|(level, _)| level).collect();
        assert_eq!(levels, Level::ALL.to_vec());
    }

    #[test]
    fn test_decompose_rejects_wrong_segment_count() {
        for malformed in [
            "",
            "Banca/Enel/2023/default",
            "Banca/Enel/2023/default/Bolletta/extra",
            "Banca//2023/default/Bolletta",
            "/Banca/Enel/2023/default",
        ] {
            let err = decompose(malformed).unwrap_err();
            assert!(
                matches!(err, Error::MalformedPath(ref p) if p == malformed),
                "expected MalformedPath for {:?}",
                malformed
            );
        }
    }

    #[test]
    fn test_normalize_strips_prefix() {
        let raw = PathBuf::from("/Users/vale/_amministrazione/Banca/Deutsche");
        assert_eq!(
            normalize(&raw, "_amministrazione").unwrap(),
            vec!["Banca".to_string(), "Deutsche".to_string()]
        );

        let root = PathBuf::from("/Users/vale/_amministrazione");
        assert!(normalize(&root, "_amministrazione").unwrap().is_empty());
    }

    #[test]
    fn test_normalize_uses_last_marker() {
        let raw = PathBuf::from("/srv/archivio/backup/archivio/Banca");
        assert_eq!(normalize(&raw, "archivio").unwrap(), vec!["Banca".to_string()]);
    }

    #[test]
    fn test_normalize_missing_marker() {
        let raw = PathBuf::from("/Users/vale/documenti/Banca");
        let err = normalize(&raw, "_amministrazione").unwrap_err();
        assert!(matches!(
            err,
            Error::RootMarkerNotFound { ref marker, .. } if marker == "_amministrazione"
        ));
    }
}
