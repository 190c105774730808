//! Shared configuration file
//!
//! All tools read one JSON document (~/.config/mindmate/config.json). Each tool
//! owns a top-level section and deserializes it into its own settings type:
//!
//! ```json
//! {
//!   "breathe":   { "default_pattern": "box", "tick_policy": "exact" },
//!   "companion": { "store": "jsonl" }
//! }
//! ```
//!
//! A missing file or a missing section yields the settings type's defaults.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::Paths;

/// Parsed configuration document
#[derive(Debug, Clone, Default)]
pub struct Config {
    path: Option<PathBuf>,
    sections: Map<String, Value>,
}

impl Config {
    /// Load the shared config from the standard location
    pub fn load() -> Result<Self> {
        Self::load_from(&Paths::new().config_file())
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self {
                path: Some(path.to_path_buf()),
                sections: Map::new(),
            });
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let sections = if content.trim().is_empty() {
            Map::new()
        } else {
            match serde_json::from_str::<Value>(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?
            {
                Value::Object(map) => map,
                _ => anyhow::bail!("Config file must contain a JSON object: {}", path.display()),
            }
        };

        Ok(Self {
            path: Some(path.to_path_buf()),
            sections,
        })
    }

    /// Path this config was loaded from, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Deserialize one section, falling back to defaults when absent
    pub fn section<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T> {
        match self.sections.get(name) {
            None | Some(Value::Null) => Ok(T::default()),
            Some(value) => serde_json::from_value(value.clone())
                .with_context(|| format!("Invalid '{}' section in config", name)),
        }
    }

    /// Replace one section with a serialized value
    pub fn set_section<T: Serialize>(&mut self, name: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)
            .with_context(|| format!("Failed to serialize '{}' section", name))?;
        self.sections.insert(name.to_string(), value);
        Ok(())
    }

    /// Write the config back to the file it was loaded from
    pub fn save(&self) -> Result<()> {
        let path = self
            .path
            .as_deref()
            .context("Config has no backing file")?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let content = serde_json::to_string_pretty(&Value::Object(self.sections.clone()))
            .context("Failed to serialize config")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        let sample: Sample = config.section("sample").unwrap();
        assert_eq!(sample, Sample::default());
    }

    #[test]
    fn test_section_partial_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"sample": {"count": 3}}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        let sample: Sample = config.section("sample").unwrap();
        assert_eq!(sample.count, 3);
        assert_eq!(sample.name, "");
    }

    #[test]
    fn test_rejects_non_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::load_from(&path).unwrap();
        let sample = Sample {
            name: "box".into(),
            count: 4,
        };
        config.set_section("sample", &sample).unwrap();
        config.save().unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.section::<Sample>("sample").unwrap(), sample);
    }
}
