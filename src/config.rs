use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings read from an optional TOML file; command-line flags layer on top.
///
/// ```toml
/// identity_attributes = ["id", "key"]
/// keep_whitespace_text = true
/// log_level = "info"
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub identity_attributes: Vec<String>,
    pub keep_whitespace_text: bool,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            identity_attributes: Vec::new(),
            keep_whitespace_text: true,
            log_level: None,
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in {}", path.display()))
    }

    /// Appends identity attributes given on the command line, skipping duplicates.
    pub fn with_identity(mut self, extra: &[String]) -> Self {
        for name in extra {
            if !self.identity_attributes.contains(name) {
                self.identity_attributes.push(name.clone());
            }
        }
        self
    }

    /// Effective log filter: `-v` flags win over the file, the file over the default.
    pub fn log_filter(&self, verbose: u8) -> String {
        match verbose {
            0 => self.log_level.clone().unwrap_or_else(|| "warn".to_string()),
            1 => "info".to_string(),
            2 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    }
}
