//! Recursive merge of configuration trees.
//!
//! Dispatch is driven by the type of the existing value:
//! - Scalars (including `Null`) are replaced by the incoming value
//! - Sequences are extended by an incoming sequence, or get a non-sequence appended
//! - Mappings are merged key by key; the incoming value must be a mapping too
//!
//! Later operands therefore win on scalar conflicts and extend, never replace,
//! sequences and mappings.

use super::value::ConfigValue;
use crate::error::{ConfigError, Result};

/// Merge `incoming` into `existing`, returning the combined value.
///
/// # Example
/// ```
/// use config_loader::config::{ConfigValue, merge};
///
/// let base = ConfigValue::from_yaml(serde_yaml::from_str("db: {host: a, port: 1}").unwrap());
/// let overlay = ConfigValue::from_yaml(serde_yaml::from_str("db: {host: b}").unwrap());
/// let merged = merge(base, overlay).unwrap();
/// // Result: { db: { host: b, port: 1 } }
/// # assert_eq!(merged.as_mapping().unwrap()["db"].as_mapping().unwrap()["host"], ConfigValue::from("b"));
/// ```
pub fn merge(existing: ConfigValue, incoming: ConfigValue) -> Result<ConfigValue> {
    merge_at(existing, incoming, "")
}

/// Merge values in order, with later values taking precedence.
///
/// Equivalent to folding [`merge`] over the list, starting from `Null`.
pub fn merge_all(values: impl IntoIterator<Item = ConfigValue>) -> Result<ConfigValue> {
    values.into_iter().try_fold(ConfigValue::Null, merge)
}

/// Report the error [`merge`] would return, without consuming either value.
///
/// Only keys present on both sides are visited, so the cost follows the size
/// of `incoming` rather than of `existing`.
pub fn check(existing: &ConfigValue, incoming: &ConfigValue) -> Result<()> {
    check_at(existing, incoming, "")
}

fn check_at(existing: &ConfigValue, incoming: &ConfigValue, key: &str) -> Result<()> {
    let ConfigValue::Mapping(map) = existing else {
        return Ok(());
    };
    let ConfigValue::Mapping(overlay) = incoming else {
        return Err(non_map_into_map(key, incoming));
    };
    for (name, value) in overlay {
        if let Some(current) = map.get(name) {
            check_at(current, value, &child_key(key, name))?;
        }
    }
    Ok(())
}

fn non_map_into_map(key: &str, incoming: &ConfigValue) -> ConfigError {
    ConfigError::Merge {
        key: key.to_string(),
        existing: "mapping",
        incoming: incoming.type_name(),
        reason: "cannot merge non-map into map",
    }
}

fn merge_at(existing: ConfigValue, incoming: ConfigValue, key: &str) -> Result<ConfigValue> {
    match existing {
        ConfigValue::Null
        | ConfigValue::Bool(_)
        | ConfigValue::Integer(_)
        | ConfigValue::Float(_)
        | ConfigValue::String(_) => Ok(incoming),
        ConfigValue::Sequence(mut items) => {
            match incoming {
                ConfigValue::Sequence(more) => items.extend(more),
                other => items.push(other),
            }
            Ok(ConfigValue::Sequence(items))
        }
        ConfigValue::Mapping(mut map) => {
            let ConfigValue::Mapping(overlay) = incoming else {
                return Err(non_map_into_map(key, &incoming));
            };
            for (name, value) in overlay {
                match map.get_mut(&name) {
                    Some(slot) => {
                        // Take the old value out so the key keeps its position.
                        let current = std::mem::take(slot);
                        *slot = merge_at(current, value, &child_key(key, &name))?;
                    }
                    None => {
                        map.insert(name, value);
                    }
                }
            }
            Ok(ConfigValue::Mapping(map))
        }
    }
}

fn child_key(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}
