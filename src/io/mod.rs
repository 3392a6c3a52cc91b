//! File system access: configuration, content discovery and file helpers

pub mod config;
pub mod fs;
pub mod walker;

pub use config::{Config, CONFIG_FILE};
pub use walker::{Walker, WalkerConfig};
