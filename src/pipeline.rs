//! Scan and render, end to end
//!
//! ```rust,no_run
//! use gendoku::{Pipeline, Result};
//!
//! fn main() -> Result<()> {
//!     let pipeline = Pipeline::from_config_file("config.yml")?;
//!     let rendered = pipeline.run()?;
//!     println!("{rendered}");
//!     Ok(())
//! }
//! ```

use crate::core::{DocumentTree, TypeRegistry};
use crate::error::Result;
use crate::io::{Config, Walker, WalkerConfig};
use crate::render::TemplateComposer;
use log::{debug, info};
use std::path::Path;
use std::sync::Arc;

/// Configuration plus file type rules, ready to build
pub struct Pipeline {
    config: Arc<Config>,
    types: TypeRegistry,
    walker_config: WalkerConfig,
}

impl Pipeline {
    /// Pipeline with the default file types
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            types: TypeRegistry::with_defaults(),
            walker_config: WalkerConfig::default(),
        }
    }

    /// Load `config.yml` (or another file) and build a pipeline from it
    pub fn from_config_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());
        Config::load(path).map(Self::new)
    }

    /// Replace the file type rules
    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    pub fn with_walker_config(mut self, walker_config: WalkerConfig) -> Self {
        self.walker_config = walker_config;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Walk the content directory into a fresh tree.
    ///
    /// Every file is parsed before anything is inserted, so a malformed file
    /// aborts the scan without a partial tree.
    pub fn scan(&self) -> Result<DocumentTree> {
        let root = self.config.contentdir();
        info!("Scanning {}", root.display());

        let walker = Walker::with_config(&self.types, self.walker_config.clone());
        let documents = walker.walk(&root).collect::<Result<Vec<_>>>()?;

        let root_name = root
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut tree = DocumentTree::new(root_name);
        let count = documents.len();
        for doc in documents {
            tree.add(doc)?;
        }

        info!("Found {count} documents");
        Ok(tree)
    }

    /// Render the top-level template over a scanned tree
    pub fn render(&self, tree: DocumentTree) -> Result<String> {
        let composer = TemplateComposer::new(Arc::clone(&self.config), Arc::new(tree))?;
        composer.render()
    }

    /// Scan, then render
    pub fn run(&self) -> Result<String> {
        let tree = self.scan()?;
        self.render(tree)
    }
}
