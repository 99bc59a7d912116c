//! Hierarchical configuration loader
//!
//! Merges a local YAML file, or container-mounted config and secret files,
//! with environment overrides into one tree addressed by dotted paths.
//!
//! ```no_run
//! use config_loader::config::Configuration;
//!
//! let config = Configuration::load()?;
//! let host = config.get("db.host")?;
//! # Ok::<(), config_loader::error::ConfigError>(())
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
