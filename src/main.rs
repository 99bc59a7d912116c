//! config-loader
//!
//! Loads a service's configuration the way the service would and prints
//! values from it.

use anyhow::Result;
use clap::Parser;
use config_loader::cli::{Cli, Command};
use config_loader::config::Configuration;
use config_loader::format::{format_sources_markdown, render};
use config_loader::logging::{self, LogTarget};
use std::io::Write;
use std::process::ExitCode;
use tracing::debug;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let paths = cli.config_paths();
    debug!(?paths, "Resolved configuration paths");
    let config = Configuration::load_with_paths(paths)?;

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Get { path, format } => {
            let value = config.get(&path)?;
            stdout.write_all(render(value, format)?.as_bytes())?;
        }
        Command::Has { path } => {
            if !config.contains(&path)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Dump { format } => {
            stdout.write_all(render(config.document().root(), format)?.as_bytes())?;
        }
        Command::Sources => {
            stdout.write_all(format_sources_markdown(&config).as_bytes())?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
