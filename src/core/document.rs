//! A parsed content file
//!
//! A document knows its logical path (`<content root>/<relative path>`,
//! always `/`-separated), where it was read from, its front matter and its
//! raw body. The rendered body is never stored; the composer computes it on
//! every request.

use crate::core::front_matter;
use crate::core::metadata::Metadata;
use crate::core::types::TypeConfig;
use crate::error::Result;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// One content file with its front matter split off
#[derive(Clone, Serialize)]
pub struct Document {
    path: String,
    #[serde(skip)]
    source: PathBuf,
    metadata: Metadata,
    #[serde(skip)]
    raw_body: String,
}

impl Document {
    /// Parse a document from its text.
    ///
    /// `path` is the logical path used for tree placement, `source` the file
    /// it was read from.
    pub fn parse(
        path: impl Into<String>,
        source: impl Into<PathBuf>,
        content: &str,
        typeconfig: Option<&TypeConfig>,
    ) -> Result<Self> {
        let source = source.into();
        let (metadata, raw_body) = front_matter::parse(content, typeconfig, &source)?;
        Ok(Self {
            path: path.into(),
            source,
            metadata,
            raw_body,
        })
    }

    /// Create a document from already split parts
    pub fn from_parts(path: impl Into<String>, metadata: Metadata, raw_body: String) -> Self {
        let path = path.into();
        Self {
            source: PathBuf::from(&path),
            path,
            metadata,
            raw_body,
        }
    }

    /// Logical path, e.g. `content/guide/intro.md`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File the document was read from
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Logical directory, e.g. `content/guide`
    pub fn dirname(&self) -> &str {
        self.path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
    }

    /// File name, e.g. `intro.md`
    pub fn filename(&self) -> &str {
        self.path
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.path)
    }

    /// Text after the final `.` of the file name
    pub fn extension(&self) -> &str {
        let filename = self.filename();
        filename.rsplit('.').next().unwrap_or(filename)
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Body text after the front matter, exactly as read
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// Directory segments below the content root
    pub fn tree_dirs(&self) -> impl Iterator<Item = &str> {
        self.dirname().split('/').skip(1).filter(|s| !s.is_empty())
    }

    /// Segments addressing this document in a tree, filename last
    pub fn tree_segments(&self) -> Vec<String> {
        self.tree_dirs()
            .chain(std::iter::once(self.filename()))
            .map(str::to_string)
            .collect()
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Document \"{}\">", self.filename())
    }
}
