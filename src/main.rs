//! fenceplay - a live playground for fenced html/css/js/ts blocks.

mod actor;
mod assemble;
mod cli;
mod config;
mod core;
mod embed;
mod extract;
mod logger;
mod preview;
mod reload;
mod surface;
mod transform;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let overrides = cli.overrides();
    let loaded = config::load_settings(&cli.config, &overrides)?;
    let settings = config::init_settings(loaded, &cli.config);
    crate::debug!("config"; "{:?}", settings);

    match &cli.command {
        Commands::Render { file, output } => {
            cli::render::render_file(file, output.as_deref(), &settings)
        }
        Commands::Extract { file, json } => cli::render::extract_file(file, *json),
        Commands::Watch { file, output } => {
            cli::watch::watch_file(file, output, &cli.config, overrides)
        }
        Commands::Serve {
            file,
            interface,
            port,
        } => cli::serve::serve_file(file, *interface, *port, &cli.config, overrides),
    }
}
