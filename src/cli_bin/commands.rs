//! CLI command handlers that bridge CLI arguments to library operations

use crate::cli_bin::args::*;
use anyhow::{Context, Result};
use gendoku::{BuildDriver, DocumentTree, Node, Pipeline, WalkerConfig};
use log::{debug, info};
use std::path::Path;

/// Execute the build command
pub fn build_command(config: &Path, args: BuildArgs) -> Result<()> {
    debug!("Executing build command with args: {:?}", args);

    let pipeline = load_pipeline(config, args.skip_hidden)?;
    let rendered = pipeline.run()?;
    let driver = BuildDriver::from_config(pipeline.config())?;
    driver.run(&rendered)?;
    Ok(())
}

/// Execute the render command
pub fn render_command(config: &Path, args: RenderArgs) -> Result<()> {
    debug!("Executing render command with args: {:?}", args);

    let pipeline = load_pipeline(config, args.skip_hidden)?;
    let rendered = pipeline.run()?;

    match args.output {
        Some(path) => {
            gendoku::io::fs::write(&path, &rendered)?;
            info!("Wrote {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Execute the tree command
pub fn tree_command(config: &Path, args: TreeArgs) -> Result<()> {
    debug!("Executing tree command with args: {:?}", args);

    let pipeline = load_pipeline(config, args.skip_hidden)?;
    let tree = pipeline.scan()?;

    if args.json {
        let output =
            serde_json::to_string_pretty(&tree).context("Failed to serialize document tree")?;
        println!("{output}");
    } else {
        print!("{}", format_tree(&tree));
    }
    Ok(())
}

fn load_pipeline(config: &Path, skip_hidden: bool) -> Result<Pipeline> {
    let pipeline = Pipeline::from_config_file(config)
        .with_context(|| format!("Failed to load {}", config.display()))?;
    Ok(pipeline.with_walker_config(WalkerConfig {
        skip_hidden,
        ..Default::default()
    }))
}

/// Indented listing, directories marked with a trailing `/`
fn format_tree(tree: &DocumentTree) -> String {
    let mut out = format!("{}/\n", tree.name());
    write_children(tree, 1, &mut out);
    out
}

fn write_children(tree: &DocumentTree, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for name in tree.names() {
        match tree.get(name) {
            Some(Node::Tree(sub)) => {
                out.push_str(&format!("{indent}{name}/\n"));
                write_children(sub, depth + 1, out);
            }
            Some(Node::Document(doc)) => match doc.metadata().get_str("title") {
                Some(title) => out.push_str(&format!("{indent}{name}  ({title})\n")),
                None => out.push_str(&format!("{indent}{name}\n")),
            },
            None => {}
        }
    }
}
