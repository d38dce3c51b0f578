//! Fardel - fingerprinted asset bundles for web projects.

mod cli;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    fardel::logger::set_verbose(cli.verbose);

    let mut settings = cli::load_settings(&cli)?;

    match &cli.command {
        Commands::Build { compress, names } => {
            if let Some(enable) = compress {
                settings.compress.enable = *enable;
            }
            cli::build::build_bundles(Arc::new(settings), names).map(|_| ())
        }
        Commands::List { json, names } => cli::list::list_bundles(&settings, names, *json),
        Commands::Lint { targets } => {
            let dirty = cli::lint::lint_files(&settings, targets)?;
            if dirty > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Watch => cli::watch::watch_bundles(settings),
        Commands::Prune { keep } => cli::prune::prune_artifacts(&settings, *keep).map(|_| ()),
    }
}
