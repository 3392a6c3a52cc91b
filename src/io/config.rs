//! Build configuration loaded from `config.yml`
//!
//! The configuration is a flat YAML mapping read once at the start of a
//! build. Relative paths in it are resolved against the directory holding
//! the configuration file. Every key, known or not, is visible to templates
//! as `config`.

use crate::error::{GendokuError, Result};
use crate::io::fs;
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Default configuration file name
pub const CONFIG_FILE: &str = "config.yml";

/// Keys every configuration must provide
pub const REQUIRED_KEYS: [&str; 3] = ["templatedir", "document", "title"];

const DEFAULT_CONTENT_DIR: &str = "content";
const DEFAULT_FILTER_DIR: &str = "filters";
const DEFAULT_PANDOC: &str = "pandoc";

/// Read-only build configuration
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    values: Mapping,
}

impl Config {
    /// Load and validate a configuration file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_yaml_str(&content, root)
    }

    /// Parse configuration text; `root` anchors relative paths
    pub fn from_yaml_str(content: &str, root: impl Into<PathBuf>) -> Result<Self> {
        let value: Value = serde_yaml::from_str(content)
            .map_err(|e| GendokuError::config(format!("invalid YAML: {e}")))?;
        match value {
            Value::Mapping(values) => Self::new(values, root),
            _ => Err(GendokuError::config("expected a mapping at the top level")),
        }
    }

    /// Create a configuration from a mapping, checking required keys
    pub fn new(values: Mapping, root: impl Into<PathBuf>) -> Result<Self> {
        let config = Self {
            root: root.into(),
            values,
        };
        for key in REQUIRED_KEYS {
            config.require_str(key)?;
        }
        Ok(config)
    }

    /// Directory relative paths are resolved against
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// All configuration values
    pub fn values(&self) -> &Mapping {
        &self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// String value of a key that must be present
    pub fn require_str(&self, key: &str) -> Result<&str> {
        match self.get(key) {
            None => Err(GendokuError::missing_key(key)),
            Some(Value::String(s)) => Ok(s.as_str()),
            Some(_) => Err(GendokuError::config(format!("`{key}` must be a string"))),
        }
    }

    /// Optional list of strings; a single string counts as a one-item list
    pub fn string_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        let invalid = || GendokuError::config(format!("`{key}` must be a list of strings"));
        match self.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Sequence(items)) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(_) => Err(invalid()),
        }
    }

    /// Resolve a configured path against the configuration root
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Template search root
    pub fn templatedir(&self) -> Result<PathBuf> {
        Ok(self.resolve(self.require_str("templatedir")?))
    }

    /// Name of the top-level template, relative to the template directory
    pub fn document(&self) -> Result<&str> {
        self.require_str("document")
    }

    pub fn title(&self) -> Result<&str> {
        self.require_str("title")
    }

    /// Content root, `content` unless configured
    pub fn contentdir(&self) -> PathBuf {
        self.resolve(self.get_str("contentdir").unwrap_or(DEFAULT_CONTENT_DIR))
    }

    pub fn builddir(&self) -> Result<PathBuf> {
        Ok(self.resolve(self.require_str("builddir")?))
    }

    /// Final artifact path inside the build directory
    pub fn output(&self) -> Result<PathBuf> {
        Ok(self.builddir()?.join(self.require_str("output")?))
    }

    /// Reference document handed to the compiler for styles
    pub fn reference(&self) -> Result<PathBuf> {
        Ok(self.resolve(self.require_str("reference")?))
    }

    /// Directory holding Lua filter scripts
    pub fn filterdir(&self) -> PathBuf {
        self.resolve(self.get_str("filterdir").unwrap_or(DEFAULT_FILTER_DIR))
    }

    /// Compiler executable
    pub fn pandoc(&self) -> &str {
        self.get_str("pandoc").unwrap_or(DEFAULT_PANDOC)
    }
}
