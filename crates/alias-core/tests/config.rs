//! Building aliases from configuration

use alias_convert::Value;
use alias_core::{AliasConfig, AliasError, Aliases, ConfigError, DiagnosticCode, PlainText};
use alias_kb::{ConnectionMode, KnowledgeBaseRegistry};
use alias_test_utils::{fixture_source, init_tracing, named_location, version};
use pretty_assertions::assert_eq;
use std::io::Write;
use std::sync::Arc;

const CONFIG: &str = r#"
version = "12.2.1.4"
mode = "online"

[path_tokens]
DOMAIN_HOME = "/u01/domains/base"

[merge_policies]
"Server/Notes" = "list_union"
"#;

fn write_config(text: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file
}

#[test]
fn from_config_file() {
    init_tracing();
    let file = write_config(CONFIG);
    let config = AliasConfig::from_file(file.path()).unwrap();
    let aliases = Aliases::from_config(&config, &fixture_source(), Arc::new(PlainText)).unwrap();

    assert_eq!(aliases.knowledge_base().mode(), ConnectionMode::Online);
    assert_eq!(aliases.knowledge_base().version(), &version("12.2.1.4"));

    let server = named_location("Server", "SERVER", "AdminServer");
    let notes = aliases
        .model_to_provider(&server, "Notes", &Value::from("b"), Some(&Value::from("a")))
        .unwrap()
        .unwrap();
    assert_eq!(notes.value, Value::from("a,b"));

    let root = aliases
        .model_to_provider(&server, "RootDirectory", &Value::from("@@DOMAIN_HOME@@/servers"), None)
        .unwrap()
        .unwrap();
    assert_eq!(root.value, Value::from("/u01/domains/base/servers"));
}

#[test]
fn scalar_without_binding_is_replaced() {
    let aliases = Aliases::from_config(&AliasConfig::new(), &fixture_source(), Arc::new(PlainText)).unwrap();
    let server = named_location("Server", "SERVER", "AdminServer");
    let notes = aliases
        .model_to_provider(&server, "Notes", &Value::from("b"), Some(&Value::from("a")))
        .unwrap()
        .unwrap();
    assert_eq!(notes.value, Value::from("b"));
}

#[test]
fn registry_shares_knowledge_bases() {
    let registry = KnowledgeBaseRegistry::new(Arc::new(fixture_source()));
    let config = AliasConfig::new().with_version("12.2.1.4");

    let first = Aliases::from_registry(&registry, &config, Arc::new(PlainText)).unwrap();
    let second = Aliases::from_registry(&registry, &config, Arc::new(PlainText)).unwrap();
    assert!(Arc::ptr_eq(first.knowledge_base(), second.knowledge_base()));
    assert_eq!(registry.len(), 1);

    let online = config.with_mode(ConnectionMode::Online);
    Aliases::from_registry(&registry, &online, Arc::new(PlainText)).unwrap();
    assert_eq!(registry.len(), 2);
}

#[test]
fn unknown_merge_policy_is_a_config_error() {
    let config = AliasConfig::new().with_merge_policy("Server", "Notes", "concatenate");
    let err = Aliases::from_config(&config, &fixture_source(), Arc::new(PlainText)).unwrap_err();
    assert!(matches!(err, AliasError::Config(ConfigError::MergePolicy { .. })));
    assert_eq!(err.code(), DiagnosticCode::ConfigInvalid);
}

#[test]
fn invalid_version_is_a_config_error() {
    let file = write_config("version = \"twelve\"\n");
    assert!(matches!(
        AliasConfig::from_file(file.path()),
        Err(ConfigError::Version(_))
    ));

    let config = AliasConfig::new().with_version("twelve");
    let err = Aliases::from_config(&config, &fixture_source(), Arc::new(PlainText)).unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::ConfigInvalid);
}

#[test]
fn metadata_read_from_path() {
    let config = AliasConfig::new();
    let dir = tempfile::tempdir().unwrap();
    let source = alias_kb::DocumentSource::from_path(dir.path().join("missing.yaml"));
    assert!(source.is_err());

    let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    std::fs::write(file.path(), alias_test_utils::FIXTURE).unwrap();
    let source = alias_kb::DocumentSource::from_path(file.path()).unwrap();
    let aliases = Aliases::from_config(&config, &source, Arc::new(PlainText)).unwrap();
    assert_eq!(aliases.knowledge_base().mode(), ConnectionMode::Offline);
}
