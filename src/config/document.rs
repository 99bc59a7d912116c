//! The accumulated configuration tree.
//!
//! A [`Document`] starts out as `Null` and grows by merging delinearized
//! sources into it. Lookups walk the tree along a dotted path.

use super::delinearize::delinearize;
use super::merge::{check, merge};
use super::value::{ConfigValue, Mapping};
use crate::error::{ConfigError, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Environment variable prefix used when the document does not set one.
pub const DEFAULT_ENV_PREFIX: &str = "CONFIG_";

/// Top-level key that overrides [`DEFAULT_ENV_PREFIX`].
pub const ENV_PREFIX_KEY: &str = "environment_prefix";

/// Separator for lookup paths.
pub const PATH_SEPARATOR: char = '.';

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    root: ConfigValue,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an existing tree without delinearizing it.
    pub fn from_value(root: ConfigValue) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &ConfigValue {
        &self.root
    }

    pub fn into_value(self) -> ConfigValue {
        self.root
    }

    /// True when nothing has been merged, or only empty mappings.
    pub fn is_empty(&self) -> bool {
        match &self.root {
            ConfigValue::Null => true,
            ConfigValue::Mapping(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Fold each item into the root, left to right.
    ///
    /// Items are merged as given; callers delinearize flat sources first.
    /// A failing item leaves the root as it was before that item.
    pub fn merge(&mut self, items: impl IntoIterator<Item = ConfigValue>) -> Result<&mut Self> {
        for item in items {
            // Conflicts are found before the root is taken apart.
            check(&self.root, &item)?;
            self.root = merge(std::mem::take(&mut self.root), item)?;
        }
        Ok(self)
    }

    /// Merge a single value.
    pub fn merge_value(&mut self, item: ConfigValue) -> Result<&mut Self> {
        self.merge([item])
    }

    /// Parse a YAML document, delinearize its top level, and merge it.
    ///
    /// YAML merge keys (`<<`) are expanded. An empty document merges nothing.
    /// Any root other than a mapping is rejected.
    pub fn merge_yaml_str(&mut self, name: &str, text: &str) -> Result<&mut Self> {
        let parse_error = |source| ConfigError::Parse {
            name: name.to_string(),
            source,
        };
        let mut parsed: serde_yaml::Value = serde_yaml::from_str(text).map_err(parse_error)?;
        // Expand `<<: *anchor` merge keys.
        parsed.apply_merge().map_err(parse_error)?;
        match ConfigValue::from_yaml(parsed) {
            ConfigValue::Null => {
                debug!(source = %name, "Empty document, nothing to merge");
                Ok(self)
            }
            ConfigValue::Mapping(map) => {
                debug!(source = %name, keys = map.len(), "Merging structured document");
                self.merge_value(delinearize(map))
            }
            other => Err(ConfigError::NonMappingDocument {
                name: name.to_string(),
                found: other.type_name(),
            }),
        }
    }

    /// Read a YAML file from disk and merge it.
    pub fn merge_yaml_file(&mut self, path: &Path) -> Result<&mut Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        self.merge_yaml_str(&path.display().to_string(), &text)
    }

    /// Merge a file whose whole content is one value, keyed by its base name.
    ///
    /// Orchestrators mount config maps and secrets this way: `db__password`
    /// containing `hunter2` becomes `db.password = "hunter2"`.
    pub fn add_file(&mut self, path: &Path) -> Result<&mut Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.add_file_content(&name, content)
    }

    /// [`add_file`](Self::add_file) with the content already in hand.
    pub fn add_file_content(&mut self, name: &str, content: impl Into<String>) -> Result<&mut Self> {
        debug!(file = %name, "Merging single-value file");
        let mut item = Mapping::new();
        item.insert(name.to_string(), ConfigValue::String(content.into()));
        self.merge_value(delinearize(item))
    }

    /// The prefix environment overrides must carry.
    ///
    /// Taken from the top-level `environment_prefix` string when present.
    pub fn environment_prefix(&self) -> String {
        let configured = self
            .root
            .as_mapping()
            .and_then(|map| map.get(ENV_PREFIX_KEY));
        match configured {
            Some(ConfigValue::String(prefix)) => prefix.clone(),
            None | Some(ConfigValue::Null) => DEFAULT_ENV_PREFIX.to_string(),
            Some(other) => {
                warn!(
                    key = ENV_PREFIX_KEY,
                    found = other.type_name(),
                    "Ignoring non-string environment prefix, using {}",
                    DEFAULT_ENV_PREFIX
                );
                DEFAULT_ENV_PREFIX.to_string()
            }
        }
    }

    /// Merge environment overrides using [`environment_prefix`](Self::environment_prefix).
    pub fn merge_environment(
        &mut self,
        env: impl IntoIterator<Item = (String, String)>,
    ) -> Result<&mut Self> {
        let prefix = self.environment_prefix();
        self.merge_environment_with_prefix(env, &prefix)
    }

    /// Merge every variable whose name starts with `prefix`.
    ///
    /// The prefix is stripped and the rest lowercased, so `CONFIG_DB__HOST`
    /// sets `db.host`. Variables are applied in the order given; when two
    /// collide, the later one wins.
    pub fn merge_environment_with_prefix(
        &mut self,
        env: impl IntoIterator<Item = (String, String)>,
        prefix: &str,
    ) -> Result<&mut Self> {
        let matched: Vec<(String, String)> = env
            .into_iter()
            .filter_map(|(name, value)| {
                name.strip_prefix(prefix)
                    .map(|rest| (rest.to_lowercase(), value))
            })
            .collect();

        debug!(prefix = %prefix, count = matched.len(), "Merging environment overrides");

        let items: Mapping = matched
            .into_iter()
            .map(|(key, value)| (key, ConfigValue::String(value)))
            .collect();
        self.merge_value(delinearize(items))
    }

    /// Look up a value by dotted path.
    ///
    /// Fails with `PathNotFound` when a segment is missing and with
    /// `InvalidPath` when the walk hits a value that is not a mapping.
    /// A document nothing was merged into behaves like an empty mapping.
    pub fn get(&self, path: &str) -> Result<&ConfigValue> {
        let mut current = &self.root;
        let mut walked = String::new();
        for segment in path.split(PATH_SEPARATOR) {
            let map = match current {
                ConfigValue::Mapping(map) => map,
                ConfigValue::Null if walked.is_empty() => {
                    return Err(not_found(path, segment));
                }
                other => {
                    let at = if walked.is_empty() {
                        "<root>".to_string()
                    } else {
                        walked
                    };
                    return Err(ConfigError::InvalidPath {
                        path: path.to_string(),
                        at,
                        found: other.type_name(),
                    });
                }
            };
            current = map.get(segment).ok_or_else(|| not_found(path, segment))?;
            if !walked.is_empty() {
                walked.push(PATH_SEPARATOR);
            }
            walked.push_str(segment);
        }
        Ok(current)
    }

    /// Whether `path` resolves. Only a missing segment counts as absent;
    /// walking through a non-mapping is still an error.
    pub fn contains(&self, path: &str) -> Result<bool> {
        match self.get(path) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

fn not_found(path: &str, segment: &str) -> ConfigError {
    ConfigError::PathNotFound {
        path: path.to_string(),
        segment: segment.to_string(),
    }
}
