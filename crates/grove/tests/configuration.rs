//! Configuration-driven registry tests.
//!
//! Builds registries from YAML files on disk and checks which grammars
//! they expose.

use std::fs;

use grove::{CONFIG_FILE_NAME, Error, GrammarEntry, GrammarRegistry, Parser, RegistryConfig};
use tempfile::TempDir;

/// Write a configuration file into a fresh temporary directory.
fn config_file(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    fs::write(&path, content).expect("should write config");
    (dir, path)
}

#[test]
fn registry_from_config_file_exposes_configured_names() {
    let (_dir, path) = config_file(
        "\
grammars:
  - name: javascript
    aliases: [node, mjs]
  - name: shell
    provider: bash
",
    );

    let config = RegistryConfig::load(&path).expect("config should load");
    let registry = GrammarRegistry::from_config(&config).expect("registry should build");

    assert_eq!(registry.names(), vec!["javascript", "shell"]);
    assert_eq!(registry.load("mjs").expect("should load").name(), "javascript");
    assert_eq!(registry.load("js").expect("should load").name(), "javascript");
    assert!(!registry.is_registered("bash"));

    let mut parser = Parser::new();
    parser
        .set_grammar(&registry.load("shell").expect("should load"))
        .expect("grammar should bind");
    let tree = parser.parse(b"echo hi").expect("parse should succeed");
    assert_eq!(tree.grammar().name(), "shell");
    assert_eq!(
        tree.root_node().to_sexp(),
        "(program (command (command_name (word)) (word)))"
    );
}

#[test]
fn default_config_matches_builtin_registry() {
    let from_default = GrammarRegistry::from_config(&RegistryConfig::default())
        .expect("registry should build");
    let builtins = GrammarRegistry::with_builtins();

    assert_eq!(from_default.names(), builtins.names());
    for alias in ["js", "sh", "c++", "rs", "cs"] {
        assert!(from_default.is_registered(alias), "{alias} should be registered");
    }
}

#[test]
fn conflicting_aliases_are_rejected() {
    let config = RegistryConfig {
        grammars: vec![
            GrammarEntry::new("javascript"),
            GrammarEntry::new("typescript-ish")
                .with_provider("javascript")
                .with_aliases(["js"]),
        ],
    };

    let result = GrammarRegistry::from_config(&config);

    assert!(matches!(result, Err(Error::Config(message)) if message.contains("js")));
}

#[test]
fn saved_config_builds_the_same_registry() {
    let dir = tempfile::tempdir().expect("should create temp dir");
    let path = dir.path().join(CONFIG_FILE_NAME);
    let config = RegistryConfig {
        grammars: vec![
            GrammarEntry::new("rust"),
            GrammarEntry::new("cxx-legacy").with_provider("cpp"),
        ],
    };

    config.save(&path).expect("should save");
    let registry = GrammarRegistry::from_config(&RegistryConfig::load(&path).expect("should load"))
        .expect("registry should build");

    assert_eq!(registry.names(), vec!["cxx-legacy", "rust"]);
}

#[test]
fn invalid_yaml_file_is_config_error() {
    let (_dir, path) = config_file("grammars:\n  - aliases: [x]\n");

    let result = RegistryConfig::load(&path);

    assert!(matches!(result, Err(Error::Config(_))), "entry without a name is invalid");
}
