use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PREVIEW_LENGTH: usize = 150;
pub const DEFAULT_SCRIPT_SRC: &str = "https://platform.twitter.com/widgets.js";
pub const DEFAULT_CANONICAL_BASE: &str = "https://x.com/i/status";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {field} in {config_path}: {reason}")]
    InvalidValue {
        config_path: PathBuf,
        field: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding one JSON file per activity.
    pub store_path: PathBuf,
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
    #[serde(default)]
    pub embed: EmbedConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedConfig {
    #[serde(default = "default_script_src")]
    pub script_src: String,
    #[serde(default = "default_canonical_base")]
    pub canonical_base: String,
}

fn default_preview_length() -> usize {
    DEFAULT_PREVIEW_LENGTH
}

fn default_script_src() -> String {
    DEFAULT_SCRIPT_SRC.to_string()
}

fn default_canonical_base() -> String {
    DEFAULT_CANONICAL_BASE.to_string()
}

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            script_src: default_script_src(),
            canonical_base: default_canonical_base(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let store_dir = shellexpand::tilde("~/.local/share/folio/activities");
        Self {
            store_path: PathBuf::from(store_dir.as_ref()),
            preview_length: DEFAULT_PREVIEW_LENGTH,
            embed: EmbedConfig::default(),
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        if config.preview_length == 0 {
            return Err(ConfigError::InvalidValue {
                config_path: config_path.to_path_buf(),
                field: "preview_length",
                reason: "must be greater than zero".to_string(),
            });
        }

        // Expand shell variables and tilde in the loaded store path
        config.store_path = Self::expand_path(&config.store_path).unwrap_or(config.store_path);

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    /// The configured file, or the defaults when there is none.
    pub fn load_or_default() -> Result<Self, ConfigError> {
        Ok(Self::load()?.unwrap_or_default())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/folio");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/folio/config.toml"));
    }

    #[test]
    fn test_config_serialization_roundtrip() {
        let original = Config {
            store_path: PathBuf::from("/tmp/test-activities"),
            preview_length: 90,
            embed: EmbedConfig {
                script_src: "https://widgets.example/w.js".to_string(),
                canonical_base: "https://example.com/status".to_string(),
            },
        };

        let toml_str = toml::to_string(&original).unwrap();
        let deserialized: Config = toml::from_str(&toml_str).unwrap();

        assert_eq!(original, deserialized);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: Config = toml::from_str(r#"store_path = "/srv/activities""#).unwrap();

        assert_eq!(config.preview_length, DEFAULT_PREVIEW_LENGTH);
        assert_eq!(config.embed, EmbedConfig::default());
    }

    #[test]
    fn test_partial_embed_table() {
        let config: Config = toml::from_str(
            r#"
store_path = "/srv/activities"

[embed]
canonical_base = "https://example.com/status"
"#,
        )
        .unwrap();

        assert_eq!(config.embed.script_src, DEFAULT_SCRIPT_SRC);
        assert_eq!(config.embed.canonical_base, "https://example.com/status");
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let path = PathBuf::from("~/test/path");
        let expanded = Config::expand_path(&path);

        assert!(expanded.is_some());
        let expanded = expanded.unwrap();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("FOLIO_TEST_VAR", "/test/env/path");
        }

        let path = PathBuf::from("$FOLIO_TEST_VAR/subdir");
        let expanded = Config::expand_path(&path);

        assert_eq!(expanded, Some(PathBuf::from("/test/env/path/subdir")));

        unsafe {
            env::remove_var("FOLIO_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_with_absolute_path() {
        let path = PathBuf::from("/absolute/path");
        let expanded = Config::expand_path(&path).unwrap();

        assert_eq!(expanded, path);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_load_rejects_zero_preview_length() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(
            &config_file,
            "store_path = \"/tmp/a\"\npreview_length = 0\n",
        )
        .unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "preview_length",
                ..
            }
        ));
    }

    #[test]
    fn test_load_reports_parse_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "store_path = [").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config {
            store_path: PathBuf::from("/tmp/test-activities"),
            ..Config::default()
        };

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_store_path_with_env_var_in_toml() {
        unsafe {
            env::set_var("FOLIO_DATA", "/custom/data");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "store_path = \"$FOLIO_DATA/activities\"\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(config.store_path, PathBuf::from("/custom/data/activities"));

        unsafe {
            env::remove_var("FOLIO_DATA");
        }
    }
}
