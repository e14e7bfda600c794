//! Policy configuration stored as `config.yaml` in the data directory.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::render::RenderOptions;
use crate::title::TitlePolicy;
use crate::Result;

pub const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletePolicy {
    /// Ask before deleting the current note.
    pub confirm: bool,
}

impl Default for DeletePolicy {
    fn default() -> Self {
        Self { confirm: true }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub titles: TitlePolicy,
    pub delete: DeletePolicy,
    pub preview: RenderOptions,
}

impl Config {
    /// Load from `dir`, falling back to defaults when no file exists.
    pub fn load(dir: &Path) -> Result<Self> {
        match fs::read_to_string(dir.join(CONFIG_FILE)) {
            Ok(raw) if raw.trim().is_empty() => Ok(Self::default()),
            Ok(raw) => Ok(serde_yaml::from_str(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(dir.join(CONFIG_FILE), yaml)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.titles.strip_markdown);
        assert!(config.delete.confirm);
        assert!(config.preview.line_breaks);
        assert!(!config.preview.allow_html);
    }

    #[test]
    fn test_missing_file_is_default() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(Config::load(tmp.path()).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "delete:\n  confirm: false\npreview:\n  allow_html: true\n",
        )
        .unwrap();

        let config = Config::load(tmp.path()).unwrap();
        assert!(!config.delete.confirm);
        assert!(config.preview.allow_html);
        assert!(config.preview.line_breaks);
        assert!(config.titles.strip_markdown);
    }

    #[test]
    fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let mut config = Config::default();
        config.titles = TitlePolicy::plain();
        config.save(tmp.path()).unwrap();

        assert_eq!(Config::load(tmp.path()).unwrap(), config);
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "delete: [unclosed").unwrap();
        assert!(Config::load(tmp.path()).is_err());
    }
}
