//! CLI command definitions for config-loader
//!
//! This module defines the CLI structure using clap's derive macros.
//! The main entry point is the `Cli` struct which contains subcommands.

use crate::config::{ConfigPaths, loader::DEFAULT_BASE_NAME};
use crate::format::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect the configuration a service would load
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Base name of the local config file (`<NAME>.yaml`)
    #[arg(short, long, default_value = DEFAULT_BASE_NAME, global = true)]
    pub base_name: String,

    /// Directory searched for the local config file (repeatable, replaces the defaults)
    #[arg(short, long = "search-dir", value_name = "DIR", global = true)]
    pub search_dirs: Vec<PathBuf>,

    /// Config directory used when no local file is found
    #[arg(long, value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    /// Secrets directory used when no local file is found
    #[arg(long, value_name = "DIR", global = true)]
    pub secrets_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Source locations after applying the command-line overrides.
    pub fn config_paths(&self) -> ConfigPaths {
        let mut paths = ConfigPaths::discover(&self.base_name);
        if !self.search_dirs.is_empty() {
            paths = paths.with_search_dirs(self.search_dirs.clone());
        }
        if let Some(ref dir) = self.config_dir {
            paths = paths.with_config_dir(dir);
        }
        if let Some(ref dir) = self.secrets_dir {
            paths = paths.with_secrets_dir(dir);
        }
        paths
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the value at a dotted path
    Get {
        /// Dotted path, e.g. `db.host`
        path: String,

        /// Output format: text (default), yaml, or json
        #[arg(short, long, default_value = "text", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// Exit with status 0 if the dotted path exists, 1 otherwise
    Has {
        /// Dotted path, e.g. `db.host`
        path: String,
    },

    /// Print the whole merged configuration
    Dump {
        /// Output format: yaml (default) or json
        #[arg(short, long, default_value = "yaml", value_name = "FORMAT")]
        format: OutputFormat,
    },

    /// List the sources that were merged, lowest precedence first
    Sources,
}
