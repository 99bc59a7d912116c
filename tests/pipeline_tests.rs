//! Integration tests for the configuration source pipeline.
//!
//! Tests Configuration::load_with() against temporary directory layouts:
//! - Local file mode vs container mode
//! - Precedence of config files, secret files and environment variables
//! - Error reporting for missing sources and bad lookups

use config_loader::config::{ConfigPaths, ConfigValue, Configuration, LoadMode, SourceTier};
use config_loader::error::{ConfigError, ErrorCode};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Temp layout with `config/`, `secrets/` and `local/` directories.
struct Layout {
    temp: TempDir,
}

impl Layout {
    fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp dir");
        for dir in ["config", "secrets", "local"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        Self { temp }
    }

    fn dir(&self, name: &str) -> PathBuf {
        self.temp.path().join(name)
    }

    fn write(&self, dir: &str, file: &str, content: &str) {
        fs::write(self.dir(dir).join(file), content).unwrap();
    }

    fn paths(&self) -> ConfigPaths {
        ConfigPaths::container(self.dir("config"), self.dir("secrets"))
            .with_search_dirs(vec![self.dir("local")])
    }
}

fn env(vars: &[(&str, &str)]) -> Vec<(String, String)> {
    vars.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn string(s: &str) -> ConfigValue {
    ConfigValue::from(s)
}

#[test]
fn environment_overrides_secrets_override_config() {
    let layout = Layout::new();
    layout.write("config", "app.yaml", "db:\n  host: file\n  port: 5432\n");
    layout.write("secrets", "db__host", "secret");

    let config =
        Configuration::load_with(layout.paths(), env(&[("CONFIG_DB__HOST", "env")])).unwrap();
    assert_eq!(config.get("db.host").unwrap(), &string("env"));
    assert_eq!(config.get("db.port").unwrap(), &ConfigValue::Integer(5432));

    let config = Configuration::load_with(layout.paths(), env(&[])).unwrap();
    assert_eq!(config.get("db.host").unwrap(), &string("secret"));
}

#[test]
fn local_file_overridden_by_environment() {
    let layout = Layout::new();
    layout.write("local", "backend.yaml", "db:\n  host: file\n");
    // Never read in local mode.
    layout.write("secrets", "db__host", "secret");

    let config =
        Configuration::load_with(layout.paths(), env(&[("CONFIG_DB__HOST", "env")])).unwrap();
    assert_eq!(config.mode(), LoadMode::Local);
    assert_eq!(config.get("db.host").unwrap(), &string("env"));

    let config = Configuration::load_with(layout.paths(), env(&[])).unwrap();
    assert_eq!(config.get("db.host").unwrap(), &string("file"));
}

#[test]
fn local_file_extension_order() {
    let layout = Layout::new();
    layout.write("local", "backend.yml", "source: yml\n");
    layout.write("local", "backend.yaml", "source: yaml\n");

    let config = Configuration::load_with(layout.paths(), env(&[])).unwrap();
    assert_eq!(config.get("source").unwrap(), &string("yaml"));
}

#[test]
fn custom_base_name() {
    let layout = Layout::new();
    layout.write("local", "worker.yml", "queue: jobs\n");
    layout.write("config", "base.yaml", "queue: container\n");

    let config =
        Configuration::load_with(layout.paths().with_base_name("worker"), env(&[])).unwrap();
    assert_eq!(config.get("queue").unwrap(), &string("jobs"));

    // `backend.yaml` does not exist, so the container mounts are used.
    let config = Configuration::load_with(layout.paths(), env(&[])).unwrap();
    assert_eq!(config.get("queue").unwrap(), &string("container"));
}

#[test]
fn config_files_merge_in_name_order() {
    let layout = Layout::new();
    layout.write("config", "20-override.yaml", "log:\n  level: debug\n");
    layout.write("config", "10-base.yaml", "log:\n  level: info\n  format: json\n");

    let config = Configuration::load_with(layout.paths(), env(&[])).unwrap();
    assert_eq!(config.get("log.level").unwrap(), &string("debug"));
    assert_eq!(config.get("log.format").unwrap(), &string("json"));
}

#[test]
fn sequences_accumulate_across_files() {
    let layout = Layout::new();
    layout.write("config", "a.yaml", "hosts: [one]\n");
    layout.write("config", "b.yml", "hosts: [two, three]\n");

    let config = Configuration::load_with(layout.paths(), env(&[])).unwrap();
    let hosts: Vec<String> = config.get_as("hosts").unwrap();
    assert_eq!(hosts, vec!["one", "two", "three"]);
}

#[test]
fn opaque_files_become_leaves() {
    let layout = Layout::new();
    layout.write("config", "app.yaml", "name: api\n");
    layout.write("config", "feature__enabled", "true");
    layout.write("secrets", "tls.key", "KEY\n");

    let config = Configuration::load_with(layout.paths(), env(&[])).unwrap();
    // Opaque content is always a string, even when it looks like a bool.
    assert_eq!(config.get("feature.enabled").unwrap(), &string("true"));
    let root = config.document().root().as_mapping().unwrap();
    assert_eq!(root["tls.key"], string("KEY\n"));
}

#[test]
fn opaque_null_file_clears_value() {
    let layout = Layout::new();
    layout.write("config", "app.yaml", "cache:\n  url: redis://\n");
    layout.write("secrets", "cache__url", "null");

    let config = Configuration::load_with(layout.paths(), env(&[])).unwrap();
    assert_eq!(config.get("cache.url").unwrap(), &ConfigValue::Null);
    assert!(config.contains("cache.url").unwrap());
}

#[test]
fn missing_secrets_dir_is_tolerated() {
    let layout = Layout::new();
    layout.write("config", "app.yaml", "a: 1\n");
    let paths = layout.paths().with_secrets_dir(layout.dir("nowhere"));

    let config = Configuration::load_with(paths, env(&[])).unwrap();
    assert_eq!(config.get("a").unwrap(), &ConfigValue::Integer(1));
    assert!(
        config
            .sources()
            .iter()
            .all(|s| s.tier != SourceTier::SecretsDir)
    );
}

#[test]
fn missing_config_dir_is_source_error() {
    let layout = Layout::new();
    let paths = layout.paths().with_config_dir(layout.dir("nowhere"));

    let err = Configuration::load_with(paths, env(&[("CONFIG_A", "1")])).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ConfigSourceMissing);
}

#[test]
fn empty_config_dir_is_source_error() {
    let layout = Layout::new();
    // Secrets alone do not satisfy the config directory.
    layout.write("secrets", "token", "abc");

    let err = Configuration::load_with(layout.paths(), env(&[])).unwrap_err();
    assert!(matches!(err, ConfigError::Source { .. }));
}

#[test]
fn non_mapping_document_fails() {
    let layout = Layout::new();
    layout.write("config", "list.yaml", "- a\n- b\n");

    let err = Configuration::load_with(layout.paths(), env(&[])).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NonMappingDocument);
}

#[test]
fn incompatible_sources_fail_to_merge() {
    let layout = Layout::new();
    layout.write("config", "app.yaml", "db:\n  host: file\n");
    layout.write("secrets", "db", "flat-string");

    let err = Configuration::load_with(layout.paths(), env(&[])).unwrap_err();
    match err {
        ConfigError::Merge { key, .. } => assert_eq!(key, "db"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn environment_prefix_from_config() {
    let layout = Layout::new();
    layout.write("config", "app.yaml", "environment_prefix: SVC_\nport: 80\n");

    let config = Configuration::load_with(
        layout.paths(),
        env(&[("SVC_PORT", "8080"), ("CONFIG_PORT", "9090")]),
    )
    .unwrap();
    assert_eq!(config.get("port").unwrap(), &string("8080"));
}

#[test]
fn environment_prefix_from_secret_file() {
    let layout = Layout::new();
    layout.write("config", "app.yaml", "port: 80\n");
    layout.write("secrets", "environment_prefix", "SVC_");

    let config =
        Configuration::load_with(layout.paths(), env(&[("SVC_PORT", "8080")])).unwrap();
    assert_eq!(config.get("port").unwrap(), &string("8080"));
}

#[test]
fn lookup_errors() {
    let layout = Layout::new();
    layout.write("config", "app.yaml", "a:\n  b: 5\n");

    let config = Configuration::load_with(layout.paths(), env(&[])).unwrap();
    assert_eq!(
        config.get("a.b.c").unwrap_err().code(),
        ErrorCode::InvalidPath
    );
    assert_eq!(config.get("a.x").unwrap_err().code(), ErrorCode::PathNotFound);
    assert!(!config.contains("a.x").unwrap());
    assert!(config.contains("a.b.c").is_err());
}

#[test]
fn sources_report_merge_order() {
    let layout = Layout::new();
    layout.write("config", "b.yaml", "b: 1\n");
    layout.write("config", "a.yaml", "a: 1\n");
    layout.write("secrets", "s", "x");

    let config = Configuration::load_with(layout.paths(), env(&[])).unwrap();
    let files: Vec<String> = config
        .sources()
        .iter()
        .filter_map(|s| s.path.as_ref())
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files, vec!["a.yaml", "b.yaml", "s"]);
    assert_eq!(
        config.sources().last().map(|s| s.tier),
        Some(SourceTier::Environment)
    );
}
