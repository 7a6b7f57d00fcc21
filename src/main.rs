//! # pkgviz CLI Entry Point
//!
//! `pkgviz <config_file_path>` resolves the configured package's dependencies,
//! writes a PlantUML diagram and runs the renderer on it.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;
use std::path::PathBuf;
use std::time::Duration;

use pkgviz::config;
use pkgviz::fetch::HttpSource;
use pkgviz::render::{self, RenderCommand};
use pkgviz::resolver::Resolver;
use pkgviz::tree;

#[derive(Parser)]
#[command(name = "pkgviz")]
#[command(about = "Draw a package's dependency graph as a PlantUML diagram", version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
struct Cli {
    /// Path to the configuration file
    config_file_path: PathBuf,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let config = config::load_configuration(&cli.config_file_path)
        .with_context(|| format!("Failed to load {}", cli.config_file_path.display()))?;
    debug!("Config: {:?}", config);

    let source = HttpSource::new(config.timeout);
    let resolver = Resolver::new(&source, config.max_depth).with_merge_policy(config.merge_policy);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", ""]),
    );
    pb.set_message(format!(
        "Resolving {} (depth {})...",
        config.package_url, config.max_depth
    ));
    pb.enable_steady_tick(Duration::from_millis(100));

    let resolution = resolver.resolve(&config.package_url);
    pb.finish_and_clear();
    let resolution = resolution.context("Failed to resolve dependencies")?;

    print!("{}", tree::format_tree(&resolution));

    let diagram = render::render_diagram(&resolution);
    render::write_diagram(&config.output, &diagram)?;
    println!(
        "{} Wrote {}",
        "✓".green(),
        config.output.display().to_string().cyan()
    );

    RenderCommand::new(&config.java, &config.renderer_path, &config.output)
        .run()
        .context("Diagram rendering failed")?;

    println!("{} Diagram created successfully!", "✓".green());
    Ok(())
}
