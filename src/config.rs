//! Environment-scoped settings.
//!
//! One YAML file maps environment names (stage, preprod, prod, ...) to the
//! values that differ between them: API endpoint, key, and database file.

use crate::error::TesterError;
use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub base_url: String,
    pub api_key: String,
    pub db_name: String,
}

impl Settings {
    /// Pick the section for `env` out of a YAML document.
    pub fn from_yaml(text: &str, env: &str) -> Result<Self> {
        let mut environments: HashMap<String, Settings> = serde_yaml::from_str(text)?;
        environments.remove(env).ok_or_else(|| {
            TesterError::InvalidArgument(format!("unknown environment '{env}'")).into()
        })
    }

    /// Load settings for `env` from the config file at `path`.
    pub fn load(path: &Path, env: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text, env)
    }

    /// Database file path, resolved next to the config file.
    pub fn db_path(&self, config_path: &Path) -> PathBuf {
        let dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        dir.join(&self.db_name)
    }
}
