//! The configuration tree node type.
//!
//! Every source (YAML documents, mounted files, environment variables) is
//! converted into a [`ConfigValue`] before it reaches the merge engine.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Insertion-ordered mapping used for every level of the tree.
pub type Mapping = IndexMap<String, ConfigValue>;

/// A node in the configuration tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Absent value; also the root of a document nothing was merged into.
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Sequence(Vec<ConfigValue>),
    Mapping(Mapping),
}

impl ConfigValue {
    /// Name of the variant, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "bool",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Sequence(_) => "sequence",
            ConfigValue::Mapping(_) => "mapping",
        }
    }

    /// An empty mapping.
    pub fn mapping() -> Self {
        ConfigValue::Mapping(Mapping::new())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// True for `Null` and every primitive; these are replaced wholesale on merge.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, ConfigValue::Sequence(_) | ConfigValue::Mapping(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            ConfigValue::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Convert a parsed YAML value into a configuration tree.
    ///
    /// Tags are dropped in favour of the tagged value. Mapping keys that are
    /// not strings are stringified; unsigned integers beyond `i64::MAX` become
    /// floats.
    pub fn from_yaml(value: serde_yaml::Value) -> Self {
        match value {
            serde_yaml::Value::Null => ConfigValue::Null,
            serde_yaml::Value::Bool(b) => ConfigValue::Bool(b),
            serde_yaml::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ConfigValue::Integer(i)
                } else {
                    ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_yaml::Value::String(s) => ConfigValue::String(s),
            serde_yaml::Value::Sequence(items) => {
                ConfigValue::Sequence(items.into_iter().map(Self::from_yaml).collect())
            }
            serde_yaml::Value::Mapping(map) => ConfigValue::Mapping(
                map.into_iter()
                    .map(|(k, v)| (yaml_key(k), Self::from_yaml(v)))
                    .collect(),
            ),
            serde_yaml::Value::Tagged(tagged) => Self::from_yaml(tagged.value),
        }
    }
}

fn yaml_key(key: serde_yaml::Value) -> String {
    match key {
        serde_yaml::Value::String(s) => s,
        serde_yaml::Value::Null => "null".to_string(),
        serde_yaml::Value::Bool(b) => b.to_string(),
        serde_yaml::Value::Number(n) => n.to_string(),
        serde_yaml::Value::Tagged(tagged) => yaml_key(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

/// Scalars print bare; containers print as compact JSON.
impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Null => write!(f, "null"),
            ConfigValue::Bool(b) => write!(f, "{}", b),
            ConfigValue::Integer(i) => write!(f, "{}", i),
            ConfigValue::Float(x) => write!(f, "{}", x),
            ConfigValue::String(s) => write!(f, "{}", s),
            container => {
                let json = serde_json::to_string(container).map_err(|_| fmt::Error)?;
                write!(f, "{}", json)
            }
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

impl From<i64> for ConfigValue {
    fn from(i: i64) -> Self {
        ConfigValue::Integer(i)
    }
}

impl From<f64> for ConfigValue {
    fn from(x: f64) -> Self {
        ConfigValue::Float(x)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        ConfigValue::Sequence(items)
    }
}

impl From<Mapping> for ConfigValue {
    fn from(map: Mapping) -> Self {
        ConfigValue::Mapping(map)
    }
}

impl From<serde_yaml::Value> for ConfigValue {
    fn from(value: serde_yaml::Value) -> Self {
        ConfigValue::from_yaml(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> ConfigValue {
        ConfigValue::from_yaml(serde_yaml::from_str(text).unwrap())
    }

    #[test]
    fn test_from_yaml_scalars() {
        let value = yaml("a: 1\nb: 1.5\nc: true\nd: text\ne: ~\n");
        let map = value.as_mapping().unwrap();
        assert_eq!(map["a"], ConfigValue::Integer(1));
        assert_eq!(map["b"], ConfigValue::Float(1.5));
        assert_eq!(map["c"], ConfigValue::Bool(true));
        assert_eq!(map["d"], ConfigValue::from("text"));
        assert_eq!(map["e"], ConfigValue::Null);
    }

    #[test]
    fn test_from_yaml_preserves_key_order() {
        let value = yaml("zeta: 1\nalpha: 2\nmid: 3\n");
        let keys: Vec<&str> = value
            .as_mapping()
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_from_yaml_stringifies_keys() {
        let value = yaml("1: one\ntrue: yes\n");
        let map = value.as_mapping().unwrap();
        assert_eq!(map["1"], ConfigValue::from("one"));
        assert!(map.contains_key("true"));
    }

    #[test]
    fn test_from_yaml_unwraps_tags() {
        let value = yaml("secret: !vault token\n");
        assert_eq!(value.as_mapping().unwrap()["secret"], ConfigValue::from("token"));
    }

    #[test]
    fn test_display() {
        assert_eq!(ConfigValue::from("plain").to_string(), "plain");
        assert_eq!(ConfigValue::Integer(5).to_string(), "5");
        assert_eq!(ConfigValue::Null.to_string(), "null");
        let seq = ConfigValue::Sequence(vec![ConfigValue::Integer(1), "x".into()]);
        assert_eq!(seq.to_string(), r#"[1,"x"]"#);
    }

    #[test]
    fn test_scalar_classification() {
        assert!(ConfigValue::Null.is_scalar());
        assert!(ConfigValue::Float(0.5).is_scalar());
        assert!(!ConfigValue::mapping().is_scalar());
        assert!(!ConfigValue::Sequence(vec![]).is_scalar());
        assert_eq!(ConfigValue::Integer(2).as_f64(), Some(2.0));
    }
}
