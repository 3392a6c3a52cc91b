//! gendoku: build documents from a tree of front-matter content files
//!
//! gendoku scans a content directory, splits each file into YAML front matter
//! and a raw body, arranges the documents into a tree that mirrors the
//! directory layout and renders a top-level template over that tree. The
//! rendered text is then handed to pandoc to produce the final artifact.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use gendoku::{BuildDriver, Pipeline, Result};
//!
//! fn main() -> Result<()> {
//!     let pipeline = Pipeline::from_config_file("config.yml")?;
//!     let rendered = pipeline.run()?;
//!
//!     let driver = BuildDriver::from_config(pipeline.config())?;
//!     driver.run(&rendered)?;
//!     Ok(())
//! }
//! ```
//!
//! ## Working with the tree
//!
//! ```rust,no_run
//! use gendoku::{Pipeline, Result};
//!
//! fn main() -> Result<()> {
//!     let tree = Pipeline::from_config_file("config.yml")?.scan()?;
//!     for doc in tree.documents() {
//!         println!("{} {:?}", doc.path(), doc.metadata().get_str("title"));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Templates
//!
//! Templates see `config` (every key of `config.yml`) and `doctree`, the
//! scanned tree. Document bodies are templates too and additionally see
//! themselves as `resource`. A document whose front matter sets `extends`
//! and `default_block` is rendered as a child of that template with its body
//! as the named block. Dates are formatted with the `dateformat` filter.
//!
//! # Architecture
//!
//! - [`core`]: file type rules, front matter, documents and the tree
//! - [`io`]: configuration, content discovery and file helpers
//! - [`render`]: template composition and filters
//! - [`pipeline`]: scan and render, end to end
//! - [`driver`]: staging and the pandoc invocation
//! - [`error`]: the error type shared by all of the above

pub use error::{GendokuError, Result};

pub use core::{Document, DocumentTree, KeyPath, Metadata, Node, TypeConfig, TypeRegistry};

pub use io::{Config, Walker, WalkerConfig, CONFIG_FILE};

pub use driver::{BuildDriver, FilterSet, Invocation};
pub use pipeline::Pipeline;
pub use render::TemplateComposer;

pub mod core;
pub mod driver;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod render;

// CLI components are available only in the binary, not as part of the library API
