//! Output formatting for configuration values and load reports.

use crate::config::{ConfigValue, Configuration, DEFAULT_ENV_PREFIX};
use anyhow::Result;

/// Output format for rendered values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Scalars bare, containers as YAML
    #[default]
    Text,
    Yaml,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "yaml" | "yml" => Ok(OutputFormat::Yaml),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!(
                "Invalid format '{}'. Valid options: text, yaml, json",
                s
            )),
        }
    }
}

/// Render a value in the requested format. Output ends with a newline.
pub fn render(value: &ConfigValue, format: OutputFormat) -> Result<String> {
    let mut out = match format {
        OutputFormat::Text if value.is_scalar() => value.to_string(),
        OutputFormat::Text | OutputFormat::Yaml => serde_yaml::to_string(value)?,
        OutputFormat::Json => serde_json::to_string_pretty(value)?,
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Format the merged sources of a configuration as markdown.
pub fn format_sources_markdown(config: &Configuration) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Sources ({} mode)\n\n", config.mode()));
    for (index, source) in config.sources().iter().enumerate() {
        match (&source.path, source.kind) {
            (Some(path), Some(kind)) => md.push_str(&format!(
                "{}. **{}** `{}` ({})\n",
                index + 1,
                source.tier,
                path.display(),
                kind
            )),
            _ => md.push_str(&format!(
                "{}. **{}** prefix `{}`\n",
                index + 1,
                source.tier,
                source.prefix.as_deref().unwrap_or(DEFAULT_ENV_PREFIX)
            )),
        }
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> ConfigValue {
        ConfigValue::from_yaml(serde_yaml::from_str(text).unwrap())
    }

    #[test]
    fn test_sources_markdown_shows_matched_prefix() {
        use crate::config::ConfigPaths;

        let temp = tempfile::TempDir::new().unwrap();
        std::fs::write(temp.path().join("backend.yaml"), "name: api\n").unwrap();
        let paths = ConfigPaths::container(temp.path().join("c"), temp.path().join("s"))
            .with_search_dirs(vec![temp.path().to_path_buf()]);
        let env = vec![("CONFIG_ENVIRONMENT_PREFIX".to_string(), "APP_".to_string())];
        let config = Configuration::load_with(paths, env).unwrap();

        let md = format_sources_markdown(&config);
        assert!(md.starts_with("# Sources (local mode)"));
        assert!(md.contains("**environment** prefix `CONFIG_`"), "{md}");
        assert!(!md.contains("`APP_`"));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("yml".parse::<OutputFormat>().unwrap(), OutputFormat::Yaml);
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_render_scalar_text() {
        let out = render(&ConfigValue::from("localhost"), OutputFormat::Text).unwrap();
        assert_eq!(out, "localhost\n");
    }

    #[test]
    fn test_render_mapping_yaml() {
        let out = render(&yaml("db: {host: a, port: 1}"), OutputFormat::Text).unwrap();
        assert_eq!(out, "db:\n  host: a\n  port: 1\n");
    }

    #[test]
    fn test_render_json_keeps_order() {
        let out = render(&yaml("z: 1\na: 2"), OutputFormat::Json).unwrap();
        assert_eq!(out, "{\n  \"z\": 1,\n  \"a\": 2\n}\n");
    }
}
