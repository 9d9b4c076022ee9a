use std::env;
use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

/// Directory names never treated as part of the hierarchy.
pub const DEFAULT_EXCLUDED: [&str; 6] = [
    ".Nuove Acquisizioni_backup",
    "Altro",
    "Nuove Acquisizioni",
    "Smistatore",
    "amministrazione",
    "_amministrazione",
];

pub const DEFAULT_DATABASE_URL: &str = "paperless.db";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Administration root holding the category directories.
    pub admin_path: PathBuf,
    /// Directory name depth is counted from; the root's own name if unset.
    #[serde(default)]
    pub root_marker: Option<String>,
    #[serde(default = "default_excluded")]
    pub excluded: Vec<String>,
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

impl AppConfig {
    pub fn root_marker(&self) -> Option<String> {
        self.root_marker.clone().or_else(|| {
            self.admin_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
        })
    }
}

fn default_excluded() -> Vec<String> {
    DEFAULT_EXCLUDED.iter().map(|name| name.to_string()).collect()
}

fn default_database_url() -> String {
    env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Load `Config.toml` from the working directory, overlaid by `PAPERLESS_*`
/// environment variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    load_configuration_from("Config")
}

pub fn load_configuration_from(name: &str) -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name(name).required(false))
        .add_source(
            Environment::with_prefix("PAPERLESS")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("excluded"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_from_file_with_defaults() {
        let tmp = tempdir().unwrap();
        fs::write(
            tmp.path().join("Settings.toml"),
            "admin_path = \"/Volumes/working space/amministrazione\"\n",
        )
        .unwrap();

        let name = tmp.path().join("Settings");
        let config = load_configuration_from(name.to_str().unwrap()).unwrap();

        assert_eq!(
            config.admin_path,
            PathBuf::from("/Volumes/working space/amministrazione")
        );
        assert_eq!(config.root_marker().as_deref(), Some("amministrazione"));
        assert_eq!(config.excluded.len(), DEFAULT_EXCLUDED.len());
        assert!(config.excluded.contains(&"Altro".to_string()));
    }

    #[test]
    fn test_explicit_values_override_defaults() {
        let tmp = tempdir().unwrap();
        fs::write(
            tmp.path().join("Settings.toml"),
            r#"
admin_path = "/srv/archivio"
root_marker = "archivio"
excluded = ["Temp"]
database_url = "/srv/paperless.db"
"#,
        )
        .unwrap();

        let name = tmp.path().join("Settings");
        let config = load_configuration_from(name.to_str().unwrap()).unwrap();

        assert_eq!(config.root_marker().as_deref(), Some("archivio"));
        assert_eq!(config.excluded, vec!["Temp".to_string()]);
        assert_eq!(config.database_url, "/srv/paperless.db");
    }
}
