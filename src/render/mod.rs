//! Rendering of documents and the top-level template

pub mod composer;
pub mod filters;
mod objects;

pub use composer::{TemplateComposer, MAX_RENDER_DEPTH};
pub use filters::{dateformat, ordinal_suffix, parse_date, DEFAULT_DATE_FORMAT};
