use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::draw::parse_hex_color;

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "labdeck";

pub const VALID_KEYS: &str =
    "defaults.theme, defaults.pen_color, defaults.experiment, defaults.export_dir";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    /// Initial pen color, `#rrggbb`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pen_color: Option<String>,

    /// Experiment id used when `--exp` is not given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experiment: Option<String>,

    /// Where PNG and PDF captures are written. Defaults to the working directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `labdeck config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        match Self::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::debug!("using default config: {e}");
                Self::default()
            }
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# LabDeck configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let defaults = self.defaults.get_or_insert_with(DefaultsConfig::default);
        match key {
            "defaults.theme" => {
                match value {
                    "light" | "dark" => {}
                    _ => anyhow::bail!("Invalid theme: {value}. Must be 'light' or 'dark'."),
                }
                defaults.theme = Some(value.to_string());
            }
            "defaults.pen_color" => {
                if parse_hex_color(value).is_none() {
                    anyhow::bail!("Invalid pen color: {value}. Must be a hex color like '#000000'.");
                }
                defaults.pen_color = Some(value.to_lowercase());
            }
            "defaults.experiment" => {
                if value.is_empty() || value.chars().any(char::is_whitespace) {
                    anyhow::bail!("Invalid experiment id: {value:?}. Must be non-empty with no spaces.");
                }
                defaults.experiment = Some(value.to_string());
            }
            "defaults.export_dir" => {
                if value.is_empty() {
                    anyhow::bail!("Invalid export_dir: must not be empty.");
                }
                defaults.export_dir = Some(PathBuf::from(value));
            }
            _ => anyhow::bail!("Unknown config key: {key}. Valid keys: {VALID_KEYS}"),
        }
        Ok(())
    }

    pub fn theme(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.theme.as_deref())
    }

    pub fn pen_color(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.pen_color.as_deref())
    }

    pub fn experiment(&self) -> Option<&str> {
        self.defaults.as_ref().and_then(|d| d.experiment.as_deref())
    }

    pub fn export_dir(&self) -> Option<&Path> {
        self.defaults.as_ref().and_then(|d| d.export_dir.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_valid_values() {
        let mut config = Config::default();
        config.set("defaults.theme", "dark").expect("theme");
        config.set("defaults.pen_color", "#BFA032").expect("pen color");
        config.set("defaults.experiment", "exp3").expect("experiment");
        config.set("defaults.export_dir", "/tmp/captures").expect("export dir");

        assert_eq!(config.theme(), Some("dark"));
        assert_eq!(config.pen_color(), Some("#bfa032"));
        assert_eq!(config.experiment(), Some("exp3"));
        assert_eq!(config.export_dir(), Some(Path::new("/tmp/captures")));
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = Config::default();
        assert!(config.set("defaults.theme", "sepia").is_err());
        assert!(config.set("defaults.pen_color", "black").is_err());
        assert!(config.set("defaults.experiment", "exp 1").is_err());
        assert!(config.set("defaults.export_dir", "").is_err());
        let err = config.set("defaults.aspect", "16:9").expect_err("unknown key");
        assert!(err.to_string().contains("Unknown config key"));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("labdeck").join(FILENAME);
        let mut config = Config::default();
        config.set("defaults.experiment", "exp2").expect("set");
        config.save_to(&path).expect("save");

        let loaded = Config::load_from(&path).expect("load");
        assert_eq!(loaded.experiment(), Some("exp2"));
        assert_eq!(loaded.theme(), None);
    }

    #[test]
    fn test_missing_file_message() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = Config::load_from(&dir.path().join("nope.yaml")).expect_err("missing");
        assert!(err.to_string().contains("labdeck config show"));
    }
}
