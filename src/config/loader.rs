//! Configuration assembly with precedence-ordered sources.
//!
//! Sources are merged lowest to highest:
//! 1. A local `<base_name>.yaml` file, or in container mode the files of the
//!    config directory in name order
//! 2. The files of the secrets directory in name order (container mode only)
//! 3. Environment variables carrying the configured prefix

use super::document::Document;
use super::files::{FileKind, find_local_file, list_files};
use super::value::ConfigValue;
use crate::error::{ConfigError, Result};
use serde::de::DeserializeOwned;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Base name of the local config file.
pub const DEFAULT_BASE_NAME: &str = "backend";

/// Config map mount point used in container mode.
pub const DEFAULT_CONFIG_DIR: &str = "/code/config";

/// Secrets mount point used in container mode.
pub const DEFAULT_SECRETS_DIR: &str = "/code/secrets";

/// Extensions of files parsed as YAML documents.
pub const DEFAULT_EXTENSIONS: [&str; 2] = [".yaml", ".yml"];

/// Source tier priority (lowest to highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SourceTier {
    /// Local config file found in a search directory
    LocalFile = 0,
    /// Container config directory
    ConfigDir = 1,
    /// Container secrets directory
    SecretsDir = 2,
    /// Environment variables (highest priority)
    Environment = 3,
}

impl std::fmt::Display for SourceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceTier::LocalFile => write!(f, "local"),
            SourceTier::ConfigDir => write!(f, "config"),
            SourceTier::SecretsDir => write!(f, "secrets"),
            SourceTier::Environment => write!(f, "environment"),
        }
    }
}

/// Whether a local file was found or the container mounts were used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Local,
    Container,
}

impl std::fmt::Display for LoadMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadMode::Local => write!(f, "local"),
            LoadMode::Container => write!(f, "container"),
        }
    }
}

/// One source merged into the configuration, in merge order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedSource {
    pub tier: SourceTier,
    /// File the values came from; `None` for the environment
    pub path: Option<PathBuf>,
    /// How the file was read; `None` for the environment
    pub kind: Option<FileKind>,
    /// Prefix the environment was matched against; `None` for files
    pub prefix: Option<String>,
}

/// Where each source is looked for.
#[derive(Debug, Clone)]
pub struct ConfigPaths {
    /// File stem of the local config file
    pub base_name: String,
    /// Directories searched for the local file, in order
    pub search_dirs: Vec<PathBuf>,
    /// Structured file extensions, with leading dot, in order
    pub extensions: Vec<String>,
    /// Mandatory directory in container mode
    pub config_dir: PathBuf,
    /// Optional secrets directory in container mode
    pub secrets_dir: PathBuf,
}

impl Default for ConfigPaths {
    fn default() -> Self {
        Self::discover(DEFAULT_BASE_NAME)
    }
}

impl ConfigPaths {
    /// Default locations for `base_name`.
    pub fn discover(base_name: &str) -> Self {
        Self {
            base_name: base_name.to_string(),
            search_dirs: Self::default_search_dirs(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            secrets_dir: PathBuf::from(DEFAULT_SECRETS_DIR),
        }
    }

    /// `~/etc`, the project root, then the current directory.
    ///
    /// The project root is two levels above the running executable, which is
    /// the checkout for binaries run from `target/<profile>/`.
    pub fn default_search_dirs() -> Vec<PathBuf> {
        let mut search = Vec::new();
        if let Some(home) = dirs::home_dir() {
            search.push(home.join("etc"));
        }
        if let Some(root) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent()?.parent().map(Path::to_path_buf))
        {
            search.push(root);
        }
        search.push(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        search
    }

    /// Container-only layout: no local file search.
    pub fn container(config_dir: impl Into<PathBuf>, secrets_dir: impl Into<PathBuf>) -> Self {
        Self {
            search_dirs: Vec::new(),
            config_dir: config_dir.into(),
            secrets_dir: secrets_dir.into(),
            ..Self::discover(DEFAULT_BASE_NAME)
        }
    }

    pub fn with_base_name(mut self, base_name: impl Into<String>) -> Self {
        self.base_name = base_name.into();
        self
    }

    pub fn with_search_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.search_dirs = dirs;
        self
    }

    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self
    }

    pub fn with_secrets_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.secrets_dir = dir.into();
        self
    }

    /// The local file that would be used, if any.
    pub fn local_file(&self) -> Option<PathBuf> {
        find_local_file(&self.search_dirs, &self.base_name, &self.extensions)
    }
}

/// A fully assembled configuration.
///
/// Built once at startup; treat it as read-only afterwards.
#[derive(Debug, Clone)]
pub struct Configuration {
    paths: ConfigPaths,
    document: Document,
    sources: Vec<LoadedSource>,
    mode: LoadMode,
}

impl Configuration {
    /// Load from the default locations and the process environment.
    pub fn load() -> Result<Self> {
        Self::load_with_paths(ConfigPaths::default())
    }

    /// Load from explicit locations and the process environment.
    pub fn load_with_paths(paths: ConfigPaths) -> Result<Self> {
        Self::load_with(paths, process_env())
    }

    /// Load from explicit locations and an explicit environment.
    pub fn load_with(
        paths: ConfigPaths,
        env: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        let local_file = paths.local_file();
        let mode = if local_file.is_some() {
            LoadMode::Local
        } else {
            LoadMode::Container
        };
        let mut config = Self {
            paths,
            document: Document::new(),
            sources: Vec::new(),
            mode,
        };

        match local_file {
            Some(path) => {
                info!(file = %path.display(), "Loading local configuration file");
                config.merge_file(&path, SourceTier::LocalFile)?;
            }
            None => {
                info!(
                    config_dir = %config.paths.config_dir.display(),
                    "No local configuration file, loading container mounts"
                );
                config.load_container()?;
            }
        }

        // Resolved before the merge, since a variable may set the prefix key itself.
        let prefix = config.document.environment_prefix();
        config.document.merge_environment_with_prefix(env, &prefix)?;
        config.sources.push(LoadedSource {
            tier: SourceTier::Environment,
            path: None,
            kind: None,
            prefix: Some(prefix),
        });

        Ok(config)
    }

    fn load_container(&mut self) -> Result<()> {
        let config_dir = self.paths.config_dir.clone();
        let files = list_files(&config_dir)
            .map_err(|e| ConfigError::source_missing(&config_dir, e.to_string()))?;
        for path in &files {
            self.merge_file(path, SourceTier::ConfigDir)?;
        }
        if files.is_empty() || self.document.is_empty() {
            return Err(ConfigError::source_missing(
                &config_dir,
                "no configuration values found",
            ));
        }

        let secrets_dir = self.paths.secrets_dir.clone();
        match list_files(&secrets_dir) {
            Ok(files) => {
                for path in &files {
                    self.merge_file(path, SourceTier::SecretsDir)?;
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(
                    secrets_dir = %secrets_dir.display(),
                    "Secrets directory not found, relying on environment"
                );
            }
            Err(e) => return Err(ConfigError::io(secrets_dir, e)),
        }
        Ok(())
    }

    fn merge_file(&mut self, path: &Path, tier: SourceTier) -> Result<()> {
        let kind = FileKind::of(path, &self.paths.extensions);
        debug!(file = %path.display(), %tier, %kind, "Merging configuration file");
        match kind {
            FileKind::Structured => self.document.merge_yaml_file(path)?,
            FileKind::Opaque => self.document.add_file(path)?,
        };
        self.sources.push(LoadedSource {
            tier,
            path: Some(path.to_path_buf()),
            kind: Some(kind),
            prefix: None,
        });
        Ok(())
    }

    /// Look up a value by dotted path.
    pub fn get(&self, path: &str) -> Result<&ConfigValue> {
        self.document.get(path)
    }

    /// Whether `path` resolves; see [`Document::contains`].
    pub fn contains(&self, path: &str) -> Result<bool> {
        self.document.contains(path)
    }

    /// Deserialize the value at `path` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let value = self.get(path)?;
        serde_json::to_value(value)
            .and_then(serde_json::from_value)
            .map_err(|source| ConfigError::Deserialize {
                path: path.to_string(),
                source,
            })
    }

    /// Merge further values on top of everything loaded so far.
    pub fn merge(&mut self, items: impl IntoIterator<Item = ConfigValue>) -> Result<&mut Self> {
        self.document.merge(items)?;
        Ok(self)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn into_document(self) -> Document {
        self.document
    }

    pub fn paths(&self) -> &ConfigPaths {
        &self.paths
    }

    pub fn mode(&self) -> LoadMode {
        self.mode
    }

    /// Sources in the order they were merged.
    pub fn sources(&self) -> &[LoadedSource] {
        &self.sources
    }

    /// The local config file, when one was used.
    pub fn config_file(&self) -> Option<&Path> {
        self.sources
            .iter()
            .find(|s| s.tier == SourceTier::LocalFile)
            .and_then(|s| s.path.as_deref())
    }
}

/// Process environment sorted by name, skipping variables that are not valid UTF-8.
///
/// The platform gives no ordering guarantee, so sorting keeps colliding
/// overrides such as `CONFIG_A` and `CONFIG_A__B` deterministic.
pub fn process_env() -> Vec<(String, String)> {
    let mut vars: Vec<(String, String)> = std::env::vars_os()
        .filter_map(|(name, value)| Some((name.into_string().ok()?, value.into_string().ok()?)))
        .collect();
    vars.sort_by(|a, b| a.0.cmp(&b.0));
    vars
}
