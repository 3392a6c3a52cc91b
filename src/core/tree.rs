//! Hierarchical namespace of documents mirroring the content directory
//!
//! The root node stands for the content root itself. Each node maps a single
//! path segment to either a subtree (directory) or a document (file).

use crate::core::document::Document;
use crate::error::{GendokuError, Result};
use log::{debug, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A child of a [`DocumentTree`] node
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Node {
    Tree(DocumentTree),
    Document(Document),
}

impl Node {
    pub fn as_tree(&self) -> Option<&DocumentTree> {
        match self {
            Node::Tree(tree) => Some(tree),
            Node::Document(_) => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Node::Document(doc) => Some(doc),
            Node::Tree(_) => None,
        }
    }
}

/// A directory node of the document tree
#[derive(Clone, Serialize)]
pub struct DocumentTree {
    #[serde(skip)]
    name: String,
    #[serde(flatten)]
    children: BTreeMap<String, Node>,
}

impl DocumentTree {
    /// Create an empty node
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Insert a document below the node for its directory.
    ///
    /// The first segment of the document's directory (the content root) is
    /// dropped; missing intermediate nodes are created. A document already
    /// stored at the same path is replaced and returned.
    pub fn add(&mut self, doc: Document) -> Result<Option<Document>> {
        let mut current = self;
        for segment in doc.tree_dirs() {
            let child = current
                .children
                .entry(segment.to_string())
                .or_insert_with(|| {
                    debug!("Creating tree node {segment}");
                    Node::Tree(DocumentTree::new(segment))
                });
            current = match child {
                Node::Tree(tree) => tree,
                Node::Document(_) => return Err(GendokuError::tree_conflict(doc.path())),
            };
        }

        let filename = doc.filename().to_string();
        if let Some(Node::Tree(_)) = current.children.get(&filename) {
            return Err(GendokuError::tree_conflict(doc.path()));
        }

        match current.children.insert(filename, Node::Document(doc)) {
            Some(Node::Document(previous)) => {
                warn!("{} is defined twice, keeping the last one", previous.path());
                Ok(Some(previous))
            }
            _ => Ok(None),
        }
    }

    /// Child by exact segment name
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Child directory by name
    pub fn get_dir(&self, name: &str) -> Option<&DocumentTree> {
        self.get(name).and_then(Node::as_tree)
    }

    /// Child document by name
    pub fn get_file(&self, name: &str) -> Option<&Document> {
        self.get(name).and_then(Node::as_document)
    }

    /// Node at a `/`-separated path relative to this node
    pub fn lookup(&self, path: &str) -> Option<&Node> {
        self.lookup_segments(path.split('/').filter(|s| !s.is_empty()))
    }

    /// Node at a sequence of segments relative to this node
    pub fn lookup_segments<'a, I>(&self, segments: I) -> Option<&Node>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut segments = segments.into_iter().peekable();
        let mut current = self;
        while let Some(segment) = segments.next() {
            let node = current.get(segment)?;
            if segments.peek().is_none() {
                return Some(node);
            }
            current = node.as_tree()?;
        }
        None
    }

    /// Immediate subdirectories
    pub fn dirs(&self) -> BTreeMap<&str, &DocumentTree> {
        self.children
            .iter()
            .filter_map(|(name, node)| node.as_tree().map(|tree| (name.as_str(), tree)))
            .collect()
    }

    /// Immediate documents
    pub fn files(&self) -> BTreeMap<&str, &Document> {
        self.children
            .iter()
            .filter_map(|(name, node)| node.as_document().map(|doc| (name.as_str(), doc)))
            .collect()
    }

    /// Names of all immediate children in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }

    /// All documents below this node, depth first in name order
    pub fn documents(&self) -> Vec<&Document> {
        let mut out = Vec::new();
        self.collect_documents(&mut out);
        out
    }

    fn collect_documents<'a>(&'a self, out: &mut Vec<&'a Document>) {
        for node in self.children.values() {
            match node {
                Node::Document(doc) => out.push(doc),
                Node::Tree(tree) => tree.collect_documents(out),
            }
        }
    }

    /// Number of immediate children
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

impl fmt::Debug for DocumentTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<DocumentTree \"{}\">", self.name)
    }
}
