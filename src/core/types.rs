//! Per-extension front matter rules

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Delimiter rule for a set of file extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeConfig {
    extensions: BTreeSet<String>,
    header_open: String,
    header_close: String,
}

impl TypeConfig {
    /// Create a rule; extensions are given with their leading dot (`.md`)
    pub fn new<I, S>(
        extensions: I,
        header_open: impl Into<String>,
        header_close: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            header_open: header_open.into(),
            header_close: header_close.into(),
        }
    }

    pub fn extensions(&self) -> &BTreeSet<String> {
        &self.extensions
    }

    pub fn header_open(&self) -> &str {
        &self.header_open
    }

    pub fn header_close(&self) -> &str {
        &self.header_close
    }
}

/// Maps file extensions to their [`TypeConfig`]
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    registry: HashMap<String, Arc<TypeConfig>>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with `.md` and `.rst`, both using `---` delimiters
    pub fn with_defaults() -> Self {
        let mut types = Self::new();
        types.add(TypeConfig::new([".md"], "---", "---"));
        types.add(TypeConfig::new([".rst"], "---", "---"));
        types
    }

    /// Register a rule under each of its extensions; later registrations win
    pub fn add(&mut self, typeconfig: TypeConfig) {
        let typeconfig = Arc::new(typeconfig);
        for ext in typeconfig.extensions() {
            self.registry.insert(ext.clone(), Arc::clone(&typeconfig));
        }
    }

    /// Rule for a filename, keyed on the text after its final `.`
    ///
    /// A name without a dot is looked up as `"." + name`.
    pub fn get_typeconfig(&self, filename: &str) -> Option<Arc<TypeConfig>> {
        let suffix = filename.rsplit('.').next().unwrap_or(filename);
        self.registry.get(&format!(".{suffix}")).cloned()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }
}
