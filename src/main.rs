use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

mod cli_bin;

use cli_bin::args::{Cli, Commands};
use cli_bin::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Build(args) => commands::build_command(&cli.config, args),
        Commands::Render(args) => commands::render_command(&cli.config, args),
        Commands::Tree(args) => commands::tree_command(&cli.config, args),
    }
}

/// `-v` and `-q` win over `RUST_LOG`; without either, `RUST_LOG` or `info`
fn init_logging(verbose: bool, quiet: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if quiet {
        builder.filter_level(LevelFilter::Error);
    }
    builder.format_timestamp(None).init();
}
