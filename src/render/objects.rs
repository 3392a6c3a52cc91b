//! Tree and document handles exposed to templates
//!
//! Handles address their node by path segments from the tree root and look
//! it up again on every access, so they only hold the shared composer.
//!
//! Tree nodes answer item/attribute lookup by child name, iterate over their
//! child names and provide `get(name)`, `dirs()`, `files()` and `name()`.
//! Documents expose `path`, `dirname`, `filename`, `extension`, `metadata`
//! (also `meta`) and `raw_body`, plus `render()` (also `body()`) and
//! `get(key_path)`.

use crate::core::{DocumentTree, KeyPath, Node};
use crate::render::composer::TemplateComposer;
use minijinja::value::{from_args, Enumerator, Object, ObjectRepr, Value};
use minijinja::{Error, ErrorKind, State};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

const DOCUMENT_ATTRIBUTES: &[&str] = &[
    "path",
    "dirname",
    "filename",
    "extension",
    "metadata",
    "raw_body",
];

/// Template value for the node at `segments`, if there is one
pub(crate) fn node_value(composer: &Arc<TemplateComposer>, segments: Vec<String>) -> Option<Value> {
    let is_tree = match composer
        .tree()
        .lookup_segments(segments.iter().map(String::as_str))
    {
        None if segments.is_empty() => true,
        None => return None,
        Some(Node::Tree(_)) => true,
        Some(Node::Document(_)) => false,
    };

    let composer = Arc::clone(composer);
    Some(if is_tree {
        Value::from_object(TreeObject { composer, segments })
    } else {
        Value::from_object(DocumentObject { composer, segments })
    })
}

fn no_args(args: &[Value]) -> Result<(), Error> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(Error::from(ErrorKind::TooManyArguments))
    }
}

fn gendoku_error(err: crate::error::GendokuError) -> Error {
    Error::new(ErrorKind::InvalidOperation, err.to_string()).with_source(err)
}

pub(crate) struct TreeObject {
    composer: Arc<TemplateComposer>,
    segments: Vec<String>,
}

impl TreeObject {
    fn node(&self) -> Option<&DocumentTree> {
        if self.segments.is_empty() {
            return Some(self.composer.tree());
        }
        self.composer
            .tree()
            .lookup_segments(self.segments.iter().map(String::as_str))
            .and_then(Node::as_tree)
    }

    fn child(&self, name: &str) -> Option<Value> {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        node_value(&self.composer, segments)
    }

    fn children_where(&self, want_tree: bool) -> Value {
        let Some(node) = self.node() else {
            return Value::from(());
        };
        let children: BTreeMap<String, Value> = node
            .names()
            .filter(|name| node.get(name).map(|n| n.as_tree().is_some()) == Some(want_tree))
            .filter_map(|name| self.child(name).map(|value| (name.to_string(), value)))
            .collect();
        Value::from_serialize(&children)
    }
}

impl fmt::Debug for TreeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<DocumentTree \"{}\">", self.segments.join("/"))
    }
}

impl Object for TreeObject {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Map
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        self.child(key.as_str()?)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        match self.node() {
            Some(node) => Enumerator::Values(node.names().map(Value::from).collect()),
            None => Enumerator::Empty,
        }
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "get" => {
                let (name,): (&str,) = from_args(args)?;
                Ok(self.child(name).unwrap_or_else(|| Value::from(())))
            }
            "dirs" => {
                no_args(args)?;
                Ok(self.children_where(true))
            }
            "files" => {
                no_args(args)?;
                Ok(self.children_where(false))
            }
            "name" => {
                no_args(args)?;
                Ok(Value::from(self.node().map(DocumentTree::name).unwrap_or_default()))
            }
            _ => Err(Error::from(ErrorKind::UnknownMethod)),
        }
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_ref(), f)
    }
}

pub(crate) struct DocumentObject {
    composer: Arc<TemplateComposer>,
    segments: Vec<String>,
}

impl DocumentObject {
    fn document(&self) -> Option<&crate::core::Document> {
        self.composer
            .tree()
            .lookup_segments(self.segments.iter().map(String::as_str))
            .and_then(Node::as_document)
    }
}

impl fmt::Debug for DocumentObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.segments.last().map(String::as_str).unwrap_or_default();
        write!(f, "<Document \"{name}\">")
    }
}

impl Object for DocumentObject {
    fn repr(self: &Arc<Self>) -> ObjectRepr {
        ObjectRepr::Map
    }

    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let doc = self.document()?;
        let value = match key.as_str()? {
            "path" => Value::from(doc.path()),
            "dirname" => Value::from(doc.dirname()),
            "filename" => Value::from(doc.filename()),
            "extension" => Value::from(doc.extension()),
            "metadata" | "meta" => Value::from_serialize(doc.metadata()),
            "raw_body" => Value::from(doc.raw_body()),
            _ => return None,
        };
        Some(value)
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(DOCUMENT_ATTRIBUTES)
    }

    fn call_method(
        self: &Arc<Self>,
        _state: &State<'_, '_>,
        method: &str,
        args: &[Value],
    ) -> Result<Value, Error> {
        match method {
            "render" | "body" => {
                no_args(args)?;
                self.composer
                    .render_segments(&self.segments)
                    .map(Value::from)
                    .map_err(gendoku_error)
            }
            "get" => {
                let (key,): (&str,) = from_args(args)?;
                let doc = self
                    .document()
                    .ok_or_else(|| Error::new(ErrorKind::InvalidOperation, "document vanished"))?;
                KeyPath::parse(key)
                    .and_then(|path| doc.metadata().lookup(&path).map(Value::from_serialize))
                    .map_err(gendoku_error)
            }
            _ => Err(Error::from(ErrorKind::UnknownMethod)),
        }
    }

    fn render(self: &Arc<Self>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_ref(), f)
    }
}
