//! Template composition
//!
//! A document's rendered body is its raw body wrapped according to its
//! inheritance metadata and rendered as a template:
//!
//! - `extends: base.html` prepends `{% extends "base.html" %}`
//! - `default_block: body` wraps the raw body in `{% block body %}`
//!
//! Every template sees `config` and `doctree`; per-document renders also see
//! the document itself as `resource`. Rendering is never cached.
//!
//! The top-level template named by `config.document` is loaded from the
//! template directory and rendered once; it pulls in document bodies through
//! whatever it dereferences.

use crate::core::metadata::{DEFAULT_BLOCK_KEY, EXTENDS_KEY};
use crate::core::{Document, DocumentTree};
use crate::error::{GendokuError, Result};
use crate::io::Config;
use crate::render::filters;
use crate::render::objects;
use log::{debug, info};
use minijinja::{context, path_loader, AutoEscape, Environment, UndefinedBehavior, Value};
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

/// Deepest chain of documents rendering other documents
pub const MAX_RENDER_DEPTH: usize = 16;

static BLOCK_NAME: OnceLock<Regex> = OnceLock::new();

fn block_name_regex() -> &'static Regex {
    BLOCK_NAME.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

/// Renders documents and the top-level template against a finished tree
pub struct TemplateComposer {
    env: Environment<'static>,
    config: Arc<Config>,
    tree: Arc<DocumentTree>,
    depth: AtomicUsize,
}

impl TemplateComposer {
    /// Set up the template environment for a finished tree
    pub fn new(config: Arc<Config>, tree: Arc<DocumentTree>) -> Result<Arc<Self>> {
        let templatedir = config.templatedir()?;
        debug!("Loading templates from {}", templatedir.display());

        let mut env = Environment::new();
        env.set_loader(path_loader(templatedir));
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("dateformat", filters::dateformat_filter);

        Ok(Arc::new(Self {
            env,
            config,
            tree,
            depth: AtomicUsize::new(0),
        }))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tree(&self) -> &DocumentTree {
        &self.tree
    }

    /// Template source for a document: its raw body wrapped per its metadata
    pub fn document_source(doc: &Document) -> Result<String> {
        let mut source = String::new();

        if let Some(parent) = string_key(doc, EXTENDS_KEY)? {
            let quoted = serde_json::to_string(parent)
                .map_err(|e| GendokuError::template_render(doc.path(), e.to_string()))?;
            source.push_str(&format!("{{% extends {quoted} %}}"));
        }

        match string_key(doc, DEFAULT_BLOCK_KEY)? {
            Some(block) => {
                if !block_name_regex().is_match(block) {
                    return Err(GendokuError::template_render(
                        doc.path(),
                        format!("{block:?} is not a valid block name"),
                    ));
                }
                source.push_str(&format!(
                    "{{% block {block} %}}{}{{% endblock {block} %}}",
                    doc.raw_body()
                ));
            }
            None => source.push_str(doc.raw_body()),
        }

        Ok(source)
    }

    /// Render a document of the tree
    pub fn render_document(self: &Arc<Self>, doc: &Document) -> Result<String> {
        self.render_segments(&doc.tree_segments())
    }

    /// Render the document at a `/`-separated path below the content root
    pub fn render_path(self: &Arc<Self>, path: &str) -> Result<String> {
        let segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self.render_segments(&segments)
    }

    pub(crate) fn render_segments(self: &Arc<Self>, segments: &[String]) -> Result<String> {
        let doc = self
            .tree
            .lookup_segments(segments.iter().map(String::as_str))
            .and_then(|node| node.as_document())
            .ok_or_else(|| {
                GendokuError::template_render(segments.join("/"), "no such document in the tree")
            })?;

        let _guard = DepthGuard::enter(&self.depth, doc)?;
        debug!("Rendering {}", doc.path());

        let source = Self::document_source(doc)?;
        let resource = objects::node_value(self, segments.to_vec()).unwrap_or_default();
        let ctx = context! {
            config => self.config_value(),
            doctree => self.tree_value(),
            resource => resource,
        };
        self.env
            .render_named_str(doc.path(), &source, ctx)
            .map_err(|e| template_error(doc.path(), e))
    }

    /// Render the top-level template with the whole tree
    pub fn render(self: &Arc<Self>) -> Result<String> {
        let name = self.config.document()?;
        info!("Rendering top-level template {name}");

        let template = self
            .env
            .get_template(name)
            .map_err(|e| template_error(name, e))?;
        template
            .render(context! {
                doctree => self.tree_value(),
                config => self.config_value(),
            })
            .map_err(|e| template_error(name, e))
    }

    fn tree_value(self: &Arc<Self>) -> Value {
        objects::node_value(self, Vec::new()).unwrap_or_default()
    }

    fn config_value(&self) -> Value {
        Value::from_serialize(self.config.values())
    }
}

/// String value of a composer key; present but not a string is an error
fn string_key<'a>(doc: &'a Document, key: &str) -> Result<Option<&'a str>> {
    match doc.metadata().get(key) {
        None => Ok(None),
        Some(value) => value.as_str().map(Some).ok_or_else(|| {
            GendokuError::template_render(doc.path(), format!("`{key}` must be a string"))
        }),
    }
}

/// Convert an engine error into one naming the template at fault.
///
/// Render and date errors from nested documents and filters already carry
/// their origin and pass through; any other gendoku error is reported
/// against `origin`.
fn template_error(origin: &str, err: minijinja::Error) -> GendokuError {
    match GendokuError::find_in_chain(&err) {
        Some(inner @ (GendokuError::TemplateRender { .. } | GendokuError::DateParse { .. })) => {
            inner.clone()
        }
        Some(inner) => GendokuError::template_render(origin, inner.to_string()),
        None => {
            debug!("{}", err.display_debug_info());
            GendokuError::template_render(origin, err.to_string())
        }
    }
}

struct DepthGuard<'a>(&'a AtomicUsize);

impl<'a> DepthGuard<'a> {
    fn enter(depth: &'a AtomicUsize, doc: &Document) -> Result<Self> {
        if depth.fetch_add(1, Ordering::SeqCst) >= MAX_RENDER_DEPTH {
            depth.fetch_sub(1, Ordering::SeqCst);
            return Err(GendokuError::template_render(
                doc.path(),
                "documents render each other too deeply",
            ));
        }
        Ok(Self(depth))
    }
}

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Metadata;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn doc(path: &str, front_matter: &str, body: &str) -> Document {
        let metadata = Metadata::from_yaml_str(front_matter, Path::new(path)).unwrap();
        Document::from_parts(path, metadata, body.to_string())
    }

    fn setup(templates: &[(&str, &str)], docs: Vec<Document>) -> (TempDir, Arc<TemplateComposer>) {
        let temp = TempDir::new().unwrap();
        let templatedir = temp.path().join("templates");
        fs::create_dir_all(&templatedir).unwrap();
        for (name, source) in templates {
            fs::write(templatedir.join(name), source).unwrap();
        }

        let yaml = "templatedir: templates\ndocument: document.md\ntitle: Manual\n";
        let config = Config::from_yaml_str(yaml, temp.path()).unwrap();
        let mut tree = DocumentTree::new("content");
        for d in docs {
            tree.add(d).unwrap();
        }
        let composer = TemplateComposer::new(Arc::new(config), Arc::new(tree)).unwrap();
        (temp, composer)
    }

    #[test]
    fn test_document_source_wrapping() {
        let plain = doc("content/a.md", "", "Hello");
        assert_eq!(TemplateComposer::document_source(&plain).unwrap(), "Hello");

        let wrapped = doc("content/a.md", "extends: base.html\ndefault_block: body", "Hello");
        assert_eq!(
            TemplateComposer::document_source(&wrapped).unwrap(),
            "{% extends \"base.html\" %}{% block body %}Hello{% endblock body %}"
        );

        let block_only = doc("content/a.md", "default_block: main", "Hi");
        assert_eq!(
            TemplateComposer::document_source(&block_only).unwrap(),
            "{% block main %}Hi{% endblock main %}"
        );
    }

    #[test]
    fn test_invalid_block_name() {
        let bad = doc("content/a.md", "default_block: \"not valid\"", "x");
        let err = TemplateComposer::document_source(&bad).unwrap_err();
        assert!(matches!(err, GendokuError::TemplateRender { origin, .. } if origin == "content/a.md"));

        let not_string = doc("content/a.md", "extends: [a, b]", "x");
        assert!(TemplateComposer::document_source(&not_string).is_err());
    }

    #[test]
    fn test_extends_and_default_block() {
        let (_temp, composer) = setup(
            &[("base.html", "<main>{% block body %}{% endblock %}</main>")],
            vec![doc(
                "content/guide/intro.md",
                "extends: base.html\ndefault_block: body",
                "Hello",
            )],
        );
        assert_eq!(composer.render_path("guide/intro.md").unwrap(), "<main>Hello</main>");
    }

    #[test]
    fn test_render_document() {
        let (_temp, composer) = setup(
            &[],
            vec![
                doc("content/a.md", "", "A at {{ resource.path }}"),
                doc("content/sub/b.md", "", "B in {{ resource.dirname }}"),
            ],
        );
        let rendered: Vec<_> = composer
            .tree()
            .documents()
            .into_iter()
            .map(|d| composer.render_document(d).unwrap())
            .collect();
        assert_eq!(rendered, vec!["A at content/a.md", "B in content/sub"]);

        let stray = doc("content/elsewhere.md", "", "x");
        let err = composer.render_document(&stray).unwrap_err();
        assert!(matches!(err, GendokuError::TemplateRender { .. }));
    }

    #[test]
    fn test_render_is_repeatable() {
        let (_temp, composer) = setup(
            &[],
            vec![doc("content/a.md", "title: A", "# {{ resource.metadata.title }} ({{ config.title }})")],
        );
        let first = composer.render_path("a.md").unwrap();
        let second = composer.render_path("a.md").unwrap();
        assert_eq!(first, "# A (Manual)");
        assert_eq!(first, second);
    }

    #[test]
    fn test_resource_attributes() {
        let (_temp, composer) = setup(
            &[],
            vec![doc(
                "content/sub/b.md",
                "author:\n  name: Ada",
                "{{ resource.path }}|{{ resource.filename }}|{{ resource.extension }}|{{ resource.get('author.name') }}",
            )],
        );
        assert_eq!(composer.render_path("sub/b.md").unwrap(), "content/sub/b.md|b.md|md|Ada");
    }

    #[test]
    fn test_cross_document_lookup() {
        let (_temp, composer) = setup(
            &[],
            vec![
                doc("content/a.md", "", "See: {{ doctree.sub['b.md'].render() }}"),
                doc("content/sub/b.md", "", "{{ resource.filename }} says hi"),
            ],
        );
        assert_eq!(composer.render_path("a.md").unwrap(), "See: b.md says hi");
    }

    #[test]
    fn test_undefined_variable_names_document() {
        let (_temp, composer) = setup(&[], vec![doc("content/a.md", "", "{{ nope }}")]);
        let err = composer.render_path("a.md").unwrap_err();
        assert!(matches!(err, GendokuError::TemplateRender { origin, .. } if origin == "content/a.md"));
    }

    #[test]
    fn test_unknown_attribute_fails() {
        let (_temp, composer) = setup(&[], vec![doc("content/a.md", "", "{{ resource.metadata.missing }}")]);
        assert!(composer.render_path("a.md").is_err());
    }

    #[test]
    fn test_missing_key_names_document() {
        let (_temp, composer) = setup(
            &[("document.md", "{{ doctree.sub['b.md'].render() }}")],
            vec![doc(
                "content/sub/b.md",
                "author:\n  name: Ada",
                "{{ resource.get('author.email') }}",
            )],
        );
        let err = composer.render().unwrap_err();
        match &err {
            GendokuError::TemplateRender { origin, reason } => {
                assert_eq!(origin, "content/sub/b.md");
                assert!(reason.contains("author.email"), "{reason}");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("content/sub/b.md"));
    }

    #[test]
    fn test_missing_parent_template() {
        let (_temp, composer) = setup(&[], vec![doc("content/a.md", "extends: nowhere.html", "x")]);
        let err = composer.render_path("a.md").unwrap_err();
        assert!(matches!(err, GendokuError::TemplateRender { origin, .. } if origin == "content/a.md"));
    }

    #[test]
    fn test_nested_error_keeps_inner_path() {
        let (_temp, composer) = setup(
            &[("document.md", "{{ doctree['a.md'].render() }}")],
            vec![
                doc("content/a.md", "", "{{ doctree.sub['b.md'].render() }}"),
                doc("content/sub/b.md", "", "{{ broken }}"),
            ],
        );
        let err = composer.render().unwrap_err();
        assert!(matches!(err, GendokuError::TemplateRender { origin, .. } if origin == "content/sub/b.md"));
    }

    #[test]
    fn test_date_error_surfaces() {
        let (_temp, composer) = setup(
            &[("document.md", "{{ doctree['a.md'].render() }}")],
            vec![doc("content/a.md", "date: someday", "{{ resource.metadata.date | dateformat }}")],
        );
        let err = composer.render().unwrap_err();
        assert!(matches!(err, GendokuError::DateParse { value } if value == "someday"));
    }

    #[test]
    fn test_self_reference_is_bounded() {
        let (_temp, composer) = setup(&[], vec![doc("content/a.md", "", "{{ resource.render() }}")]);
        let err = composer.render_path("a.md").unwrap_err();
        assert!(matches!(err, GendokuError::TemplateRender { .. }));
    }

    #[test]
    fn test_top_level_render() {
        let (_temp, composer) = setup(
            &[(
                "document.md",
                "# {{ config.title }}\n{% for name, d in doctree.files()|items %}{{ name }}: {{ d.render() }}\n{% endfor %}{% for name in doctree.dirs() %}[{{ name }}]{% endfor %}",
            )],
            vec![
                doc("content/a.md", "date: 2024-03-01", "{{ resource.metadata.date | dateformat }}"),
                doc("content/b.md", "", "B"),
                doc("content/sub/c.md", "", "C"),
            ],
        );
        assert_eq!(
            composer.render().unwrap(),
            "# Manual\na.md: 1st March 2024\nb.md: B\n[sub]"
        );
    }

    #[test]
    fn test_missing_top_level_template() {
        let (_temp, composer) = setup(&[], vec![]);
        let err = composer.render().unwrap_err();
        assert!(matches!(err, GendokuError::TemplateRender { origin, .. } if origin == "document.md"));
    }
}
