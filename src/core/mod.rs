//! Core document model: type rules, front matter, documents and the tree
//!
//! - [`TypeRegistry`]: which delimiters bound the front matter of a file type
//! - [`front_matter`]: the header/body split
//! - [`Metadata`] and [`KeyPath`]: parsed front matter and nested lookups
//! - [`Document`]: one parsed content file
//! - [`DocumentTree`]: documents arranged by directory

pub mod document;
pub mod front_matter;
pub mod key_path;
pub mod metadata;
pub mod tree;
pub mod types;

pub use document::Document;
pub use key_path::KeyPath;
pub use metadata::Metadata;
pub use tree::{DocumentTree, Node};
pub use types::{TypeConfig, TypeRegistry};
