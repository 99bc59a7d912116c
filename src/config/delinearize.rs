//! Expansion of flat `a__b__c` keys into nested mappings.
//!
//! Environment variables and mounted files can only carry a flat name, so a
//! double underscore stands in for one level of nesting.

use super::value::{ConfigValue, Mapping};

/// Separator between path segments in a flat key.
pub const KEY_DELIMITER: &str = "__";

/// String value that is read as `Null`.
pub const NULL_LITERAL: &str = "null";

/// Build a tree from a flat mapping.
///
/// Sequence and mapping values are copied through under their original key.
/// Scalar keys are split on [`KEY_DELIMITER`] and the value is stored at the
/// end of the resulting path; the string `"null"` becomes `Null`. Entries are
/// applied in input order, so a later leaf overwrites an earlier one and a
/// path running through an earlier leaf replaces it with a mapping.
pub fn delinearize(items: Mapping) -> ConfigValue {
    let mut result = Mapping::new();
    for (key, value) in items {
        if !value.is_scalar() {
            result.insert(key, value);
            continue;
        }

        let value = match value {
            ConfigValue::String(s) if s == NULL_LITERAL => ConfigValue::Null,
            other => other,
        };

        let mut segments: Vec<&str> = key.split(KEY_DELIMITER).collect();
        // `split` always yields at least one segment.
        let leaf = segments.pop().unwrap_or_default();
        let mut node = &mut result;
        for segment in segments {
            node = descend(node, segment);
        }
        node.insert(leaf.to_string(), value);
    }
    ConfigValue::Mapping(result)
}

/// Delinearize a mapping; any other value is returned untouched.
pub fn delinearize_value(value: ConfigValue) -> ConfigValue {
    match value {
        ConfigValue::Mapping(map) => delinearize(map),
        other => other,
    }
}

fn descend<'a>(node: &'a mut Mapping, segment: &str) -> &'a mut Mapping {
    let slot = node
        .entry(segment.to_string())
        .or_insert_with(ConfigValue::mapping);
    if !matches!(slot, ConfigValue::Mapping(_)) {
        *slot = ConfigValue::mapping();
    }
    match slot {
        ConfigValue::Mapping(child) => child,
        _ => unreachable!("slot was just set to a mapping"),
    }
}
