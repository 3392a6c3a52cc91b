//! CLI module for the gendoku command-line interface
//!
//! Argument parsing and the command handlers that bridge it to the library.

pub mod args;
pub mod commands;
