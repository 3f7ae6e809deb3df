//! Configuration file support.
//!
//! Settings are read from an optional TOML file; command-line flags override
//! them in `main.rs`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DbError, Result};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "flatdb.toml";

/// How select results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Formatted table output.
    #[default]
    Table,
    /// JSON array of row objects.
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Drop a table's cached selects after every write to it. When `false`,
    /// a select may return rows as they were before later writes.
    #[serde(default = "default_true")]
    pub invalidate_on_write: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            invalidate_on_write: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the metadata document and the table documents.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Metadata document name, relative to `data_dir`.
    #[serde(default = "default_meta_file")]
    pub meta_file: String,

    /// Ask before `drop_table` and `delete`.
    #[serde(default = "default_true")]
    pub confirm_destructive: bool,

    /// Print how long inserts and selects took.
    #[serde(default = "default_true")]
    pub timing: bool,

    #[serde(default)]
    pub output: OutputFormat,

    #[serde(default)]
    pub cache: CacheConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_meta_file() -> String {
    "db_meta.json".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            meta_file: default_meta_file(),
            confirm_destructive: true,
            timing: true,
            output: OutputFormat::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Loads configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| DbError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DbError::Config(e.to_string()))
    }

    /// Loads `path` if given, otherwise `flatdb.toml` in the working directory
    /// when present, otherwise the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn meta_path(&self) -> PathBuf {
        self.data_dir.join(&self.meta_file)
    }
}
