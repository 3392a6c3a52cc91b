//! Recursive discovery of content files
//!
//! The walker yields one parsed [`Document`] per regular file below a
//! content root, including symbolic links to regular files. Entries are
//! visited in file name order at every level, so the sequence is the same on
//! every platform.

use crate::core::{Document, TypeRegistry};
use crate::error::{GendokuError, Result};
use crate::io::fs;
use log::debug;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// Configuration for content discovery
#[derive(Debug, Clone, Default)]
pub struct WalkerConfig {
    /// Descend into symbolic links to directories
    pub follow_links: bool,
    /// Skip hidden files and directories (starting with .)
    pub skip_hidden: bool,
}

/// Walks a content root and parses every file it finds
pub struct Walker<'a> {
    types: &'a TypeRegistry,
    config: WalkerConfig,
}

impl<'a> Walker<'a> {
    /// Create a walker with default configuration
    pub fn new(types: &'a TypeRegistry) -> Self {
        Self::with_config(types, WalkerConfig::default())
    }

    /// Create a walker with custom configuration
    pub fn with_config(types: &'a TypeRegistry, config: WalkerConfig) -> Self {
        Self { types, config }
    }

    /// Lazily parse every regular file below `root`.
    ///
    /// Each document's logical path starts with the name of `root` itself.
    pub fn walk(&self, root: &'a Path) -> impl Iterator<Item = Result<Document>> + 'a {
        let root_name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| ".".to_string());
        let skip_hidden = self.config.skip_hidden;
        let types = self.types;

        WalkDir::new(root)
            .follow_links(self.config.follow_links)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| !skip_hidden || entry.depth() == 0 || !is_hidden(entry))
            .filter_map(move |entry| match entry {
                Ok(entry) if is_regular_file(&entry) => {
                    Some(read_document(types, root, &root_name, &entry))
                }
                Ok(_) => None,
                Err(e) => Some(Err(walk_error(root, e))),
            })
    }
}

fn read_document(
    types: &TypeRegistry,
    root: &Path,
    root_name: &str,
    entry: &DirEntry,
) -> Result<Document> {
    let source = entry.path();
    let relative = source.strip_prefix(root).unwrap_or(source);
    let mut logical = root_name.to_string();
    for component in relative.components() {
        logical.push('/');
        logical.push_str(&component.as_os_str().to_string_lossy());
    }

    debug!("Reading {}", source.display());
    let content = fs::read_to_string(source)?;
    let filename = entry.file_name().to_string_lossy();
    let typeconfig = types.get_typeconfig(&filename);
    Document::parse(logical, source, &content, typeconfig.as_deref())
}

fn is_regular_file(entry: &DirEntry) -> bool {
    entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| name.starts_with('.'))
        .unwrap_or(false)
}

fn walk_error(root: &Path, error: walkdir::Error) -> GendokuError {
    let path = error.path().unwrap_or(root).to_path_buf();
    let message = error.to_string();
    let source = error
        .into_io_error()
        .unwrap_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, message));
    GendokuError::file_system(path, source)
}
