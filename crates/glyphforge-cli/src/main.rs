//! Glyphforge CLI - inspect fonts, shape text and dump glyph atlases

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Info(args) => commands::info::run(&args),
        Commands::Shape(args) => commands::shape::run(&args),
        Commands::Prepare(args) => commands::prepare::run(&args),
    }
}

/// Debug logging with `--verbose`, warnings otherwise; `RUST_LOG` wins
fn init_logger(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}
