use crate::error::{GendokuError, Result};
use std::fs;
use std::path::Path;

pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| GendokuError::file_system(path, e))
}

/// Write a file, creating its parent directories first
pub fn write(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_dir_all(parent)?;
    }
    fs::write(path, content).map_err(|e| GendokuError::file_system(path, e))
}

pub fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| GendokuError::file_system(path, e))
}

pub fn copy(from: &Path, to: &Path) -> Result<()> {
    fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| GendokuError::file_system(from, e))
}
