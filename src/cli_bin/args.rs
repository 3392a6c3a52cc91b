//! Command-line argument definitions and parsing

use clap::{Args, Parser, Subcommand};
use gendoku::CONFIG_FILE;
use std::path::PathBuf;

/// Main CLI application
#[derive(Parser)]
#[command(
    name = "gendoku",
    version,
    about = "Build documents from front-matter content files, templates and pandoc",
    long_about = "gendoku scans a content directory, renders the document tree through a \
                  top-level template and hands the result to pandoc."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file
    #[arg(short, long, global = true, value_name = "FILE", default_value = CONFIG_FILE)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Scan, render and run the compiler
    Build(BuildArgs),
    /// Scan and render without running the compiler
    Render(RenderArgs),
    /// Print the discovered document tree
    Tree(TreeArgs),
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,
}

/// Arguments for the render command
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Write the rendered document here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,
}

/// Arguments for the tree command
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Print the tree as JSON, documents with their metadata
    #[arg(long)]
    pub json: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_config_path() {
        let cli = Cli::try_parse_from(["gendoku", "tree"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config.yml"));
        assert!(matches!(cli.command, Commands::Tree(TreeArgs { json: false, .. })));
    }

    #[test]
    fn test_render_output() {
        let cli =
            Cli::try_parse_from(["gendoku", "-c", "site/config.yml", "render", "-o", "out.md"])
                .unwrap();
        assert_eq!(cli.config, PathBuf::from("site/config.yml"));
        match cli.command {
            Commands::Render(args) => assert_eq!(args.output, Some(PathBuf::from("out.md"))),
            _ => panic!("expected render"),
        }
    }

    #[test]
    fn test_skip_hidden_is_opt_in() {
        let cli = Cli::try_parse_from(["gendoku", "build"]).unwrap();
        assert!(matches!(cli.command, Commands::Build(BuildArgs { skip_hidden: false })));

        let cli = Cli::try_parse_from(["gendoku", "tree", "--skip-hidden"]).unwrap();
        assert!(matches!(cli.command, Commands::Tree(TreeArgs { skip_hidden: true, .. })));
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["gendoku", "-v", "-q", "build"]).is_err());
    }
}
