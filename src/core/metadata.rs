//! Parsed front matter of a document
//!
//! Metadata is a YAML mapping with arbitrary keys and structured values. The
//! composer consumes two keys itself, `extends` and `default_block`; all
//! other keys are passed through to templates.

use crate::core::key_path::KeyPath;
use crate::error::{GendokuError, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Key naming the parent template of a document
pub const EXTENDS_KEY: &str = "extends";
/// Key naming the block a document's body is placed into
pub const DEFAULT_BLOCK_KEY: &str = "default_block";

/// Front matter mapping of a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    inner: Mapping,
}

impl Metadata {
    /// Create empty metadata
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse header text into metadata.
    ///
    /// Empty or null headers give empty metadata. Anything that is not a
    /// mapping is rejected.
    pub fn from_yaml_str(header: &str, path: &Path) -> Result<Self> {
        let value: Value = serde_yaml::from_str(header)
            .map_err(|e| GendokuError::metadata_parse(path, e.to_string()))?;
        Self::from_yaml_value(value, path)
    }

    /// Create metadata from an already parsed YAML value
    pub fn from_yaml_value(value: Value, path: &Path) -> Result<Self> {
        match value {
            Value::Null => Ok(Self::new()),
            Value::Mapping(inner) => Ok(Self { inner }),
            other => Err(GendokuError::metadata_parse(
                path,
                format!("expected a mapping, found {}", kind_name(&other)),
            )),
        }
    }

    /// Top-level value for a key
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.inner.get(key)
    }

    /// Top-level string value for a key
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Nested value along a key path, failing for unknown keys
    pub fn lookup(&self, path: &KeyPath) -> Result<&Value> {
        let mut segments = path.segments().iter();
        let first = segments
            .next()
            .ok_or_else(|| GendokuError::missing_key(path.to_string()))?;
        let mut current = self
            .inner
            .get(first.as_str())
            .ok_or_else(|| GendokuError::missing_key(path.to_string()))?;

        for segment in segments {
            let next = match current {
                Value::Mapping(map) => map.get(segment.as_str()),
                Value::Sequence(seq) => segment.parse::<usize>().ok().and_then(|i| seq.get(i)),
                _ => None,
            };
            current = next.ok_or_else(|| GendokuError::missing_key(path.to_string()))?;
        }

        Ok(current)
    }

    /// Parent template declared with `extends`
    pub fn extends(&self) -> Option<&str> {
        self.get_str(EXTENDS_KEY)
    }

    /// Block name declared with `default_block`
    pub fn default_block(&self) -> Option<&str> {
        self.get_str(DEFAULT_BLOCK_KEY)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
