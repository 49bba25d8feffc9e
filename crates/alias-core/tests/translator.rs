//! Attribute translation over the shared fixture

use alias_convert::{Delimiter, ElementType, TypedArray, Value};
use alias_core::{
    AliasError, DiagnosticCode, EncryptionConfig, EncryptionError, Location, PasswordDecryptor,
    PathTokens, PASSWORD_PLACEHOLDER,
};
use alias_kb::ConnectionMode;
use alias_test_utils::{aliases, domain_location, init_tracing, named_location, offline, online, strings};
use mockall::mock;
use pretty_assertions::assert_eq;
use std::sync::Arc;

mock! {
    Decryptor {}

    impl PasswordDecryptor for Decryptor {
        fn is_plain_or_unencrypted(&self, text: &str) -> bool;
        fn decrypt(&self, text: &str, passphrase: &str) -> Result<String, EncryptionError>;
    }
}

fn pool() -> Location {
    named_location("Pool", "POOL", "pool-1")
}

fn server() -> Location {
    named_location("Server", "SERVER", "AdminServer")
}

fn server_start() -> Location {
    let mut location = server();
    location.append("ServerStart");
    location
}

fn datasource_params() -> Location {
    let mut location = named_location("JDBCSystemResource", "JDBCSYSTEMRESOURCE", "my-datasource");
    location.append_all(["JdbcResource", "JDBCDataSourceParams"]);
    location
}

#[test]
fn pool_size_scenario() {
    init_tracing();
    let aliases = offline();

    let written = aliases
        .model_to_provider(&pool(), "Size", &Value::from("5"), None)
        .unwrap()
        .unwrap();
    assert_eq!(written.name, "Size");
    assert_eq!(written.value, Value::Integer(5));

    let read = aliases
        .provider_to_model(&pool(), "Size", Some(&Value::Integer(0)))
        .unwrap()
        .unwrap();
    assert_eq!(read.name, "Size");
    assert_eq!(read.value, None);

    let read = aliases
        .provider_to_model(&pool(), "Size", Some(&Value::Integer(5)))
        .unwrap()
        .unwrap();
    assert_eq!(read.value, Some(Value::Integer(5)));
}

#[test]
fn unknown_model_attribute_is_typed() {
    let err = offline()
        .model_to_provider(&pool(), "Colour", &Value::from("red"), None)
        .unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::AttributeNotFound);
}

#[test]
fn conversion_failure_is_typed() {
    let err = offline()
        .model_to_provider(&pool(), "Size", &Value::from("lots"), None)
        .unwrap_err();
    assert!(matches!(err, AliasError::Conversion { ref name, .. } if name == "Size"));
}

#[test]
fn read_only_attributes_are_never_written() {
    let aliases = offline();
    let datasource = named_location("JDBCSystemResource", "JDBCSYSTEMRESOURCE", "ds");
    assert_eq!(
        aliases
            .model_to_provider(&datasource, "DescriptorFileName", &Value::from("x.xml"), None)
            .unwrap(),
        None
    );
    assert_eq!(
        aliases
            .translator()
            .provider_attribute_name(&datasource, "DescriptorFileName")
            .unwrap(),
        None
    );
    assert_eq!(
        aliases.translator().provider_attribute_name(&datasource, "Target").unwrap().as_deref(),
        Some("Target")
    );
}

#[test]
fn list_merge_is_ordered_union() {
    let aliases = offline();
    let existing = strings(&["a", "b"]);

    let merged = aliases
        .model_to_provider(&pool(), "Members", &strings(&["b", "c"]), Some(&existing))
        .unwrap()
        .unwrap();
    assert_eq!(merged.value, strings(&["a", "b", "c"]));

    let same = aliases
        .model_to_provider(&pool(), "Members", &strings(&["a", "b"]), Some(&existing))
        .unwrap()
        .unwrap();
    assert_eq!(same.value, existing);
}

#[test]
fn merge_disabled_replaces() {
    let replaced = offline()
        .model_to_provider(&pool(), "Labels", &strings(&["c"]), Some(&strings(&["a", "b"])))
        .unwrap()
        .unwrap();
    assert_eq!(replaced.value, strings(&["c"]));
}

#[test]
fn null_existing_behaves_as_empty() {
    let written = offline()
        .model_to_provider(&pool(), "Members", &Value::from("x, y"), None)
        .unwrap()
        .unwrap();
    assert_eq!(written.value, strings(&["x", "y"]));
}

#[test]
fn properties_merge_by_key() {
    let existing = Value::properties([("a", "1"), ("b", "2")]);
    let merged = offline()
        .model_to_provider(&pool(), "Params", &Value::from("b=3, c=4"), Some(&existing))
        .unwrap()
        .unwrap();
    assert_eq!(merged.value, Value::properties([("a", "1"), ("b", "3"), ("c", "4")]));
}

#[test]
fn delimited_string_merge_writes_one_string() {
    let datasource = named_location("JDBCSystemResource", "JDBCSYSTEMRESOURCE", "ds");
    let merged = offline()
        .model_to_provider(
            &datasource,
            "Target",
            &Value::from("cluster1,AdminServer"),
            Some(&Value::from("AdminServer")),
        )
        .unwrap()
        .unwrap();
    assert_eq!(merged.value, Value::from("AdminServer,cluster1"));
}

#[test]
fn start_arguments_merge_by_flag() {
    let merged = offline()
        .model_to_provider(
            &server_start(),
            "Arguments",
            &Value::from("-Xmx1g -Dbaz=1"),
            Some(&Value::from("-Xmx512m -Dfoo=bar")),
        )
        .unwrap()
        .unwrap();
    assert_eq!(merged.value, Value::from("-Xmx1g -Dfoo=bar -Dbaz=1"));
}

#[test]
fn start_argument_with_comma_stays_whole() {
    let merged = offline()
        .model_to_provider(
            &server_start(),
            "Arguments",
            &Value::from("-Dweblogic.hosts=a,b"),
            Some(&Value::from("-Xmx512m")),
        )
        .unwrap()
        .unwrap();
    assert_eq!(merged.value, Value::from("-Xmx512m -Dweblogic.hosts=a,b"));
}

#[test]
fn delimited_read_back_as_list_and_elided_when_empty() {
    let aliases = offline();
    let datasource = named_location("JDBCSystemResource", "JDBCSYSTEMRESOURCE", "ds");

    let read = aliases
        .provider_to_model(&datasource, "Target", Some(&Value::from("AdminServer,cluster1")))
        .unwrap()
        .unwrap();
    assert_eq!(read.value, Some(strings(&["AdminServer", "cluster1"])));

    let read = aliases
        .provider_to_model(&datasource, "Target", Some(&Value::from("")))
        .unwrap()
        .unwrap();
    assert_eq!(read.value, None);
}

#[test]
fn jndi_names_follow_mode_variant() {
    let offline = offline()
        .model_to_provider(&datasource_params(), "JNDIName", &Value::from("jdbc/a, jdbc/b"), None)
        .unwrap()
        .unwrap();
    assert_eq!(offline.name, "JNDINames");
    assert_eq!(offline.value, Value::from("jdbc/a,jdbc/b"));

    let online = online()
        .model_to_provider(&datasource_params(), "JNDIName", &Value::from("jdbc/a, jdbc/b"), None)
        .unwrap()
        .unwrap();
    assert_eq!(
        online.value,
        Value::Array(TypedArray::new(
            ElementType::String,
            vec![Value::from("jdbc/a"), Value::from("jdbc/b")]
        ))
    );
}

#[test]
fn boolean_without_default_compares_to_false() {
    let aliases = offline();
    let read = aliases
        .provider_to_model(&pool(), "Enabled", Some(&Value::Bool(false)))
        .unwrap()
        .unwrap();
    assert_eq!(read.value, None);

    let read = aliases
        .provider_to_model(&pool(), "Enabled", Some(&Value::from("true")))
        .unwrap()
        .unwrap();
    assert_eq!(read.value, Some(Value::Bool(true)));
}

#[test]
fn identity_fields_are_ignored() {
    let aliases = offline();
    for name in ["Name", "Id", "Tag"] {
        assert_eq!(
            aliases
                .provider_to_model(&server(), name, Some(&Value::from("x")))
                .unwrap(),
            None
        );
    }
    let err = aliases
        .provider_to_model(&server(), "Colour", Some(&Value::from("x")))
        .unwrap_err();
    assert_eq!(err.code(), DiagnosticCode::ProviderAttributeNotFound);
}

#[test]
fn discovered_password_is_never_reconstructed() {
    let aliases = offline();
    let read = aliases
        .provider_to_model(&server_start(), "PasswordEncrypted", Some(&Value::from("{AES}abc")))
        .unwrap()
        .unwrap();
    assert_eq!(read.name, "Password");
    assert_eq!(read.value, Some(Value::from(PASSWORD_PLACEHOLDER)));

    let read = aliases
        .provider_to_model(&server_start(), "PasswordEncrypted", Some(&Value::from("")))
        .unwrap()
        .unwrap();
    assert_eq!(read.value, None);
}

#[test]
fn encrypted_password_is_decrypted() {
    let mut decryptor = MockDecryptor::new();
    decryptor
        .expect_is_plain_or_unencrypted()
        .returning(|text| !text.starts_with("{AES}"));
    decryptor
        .expect_decrypt()
        .withf(|text, passphrase| text == "{AES}abc" && passphrase == "welcome1")
        .times(1)
        .returning(|_, _| Ok("clear".to_string()));

    let aliases = offline().with_encryption(
        EncryptionConfig::with_passphrase("welcome1"),
        Arc::new(decryptor),
    );

    let written = aliases
        .model_to_provider(&server_start(), "Password", &Value::from("{AES}abc"), None)
        .unwrap()
        .unwrap();
    assert_eq!(written.name, "PasswordEncrypted");
    assert_eq!(written.value, Value::from("clear"));

    let plain = aliases
        .model_to_provider(&server_start(), "Password", &Value::from("plain"), None)
        .unwrap()
        .unwrap();
    assert_eq!(plain.value, Value::from("plain"));
}

#[test]
fn decryption_failure_propagates() {
    let mut decryptor = MockDecryptor::new();
    decryptor.expect_is_plain_or_unencrypted().return_const(false);
    decryptor
        .expect_decrypt()
        .returning(|_, _| Err(EncryptionError::DecryptionFailed("bad padding".to_string())));

    let aliases = offline().with_encryption(
        EncryptionConfig::with_passphrase("wrong"),
        Arc::new(decryptor),
    );
    let err = aliases
        .model_to_provider(&server_start(), "Password", &Value::from("{AES}abc"), None)
        .unwrap_err();

    assert_eq!(err.code(), DiagnosticCode::EncryptionFailed);
    assert!(matches!(
        err,
        AliasError::Encryption { source: EncryptionError::DecryptionFailed(_), .. }
    ));
}

#[test]
fn missing_passphrase_is_an_error() {
    let mut decryptor = MockDecryptor::new();
    decryptor.expect_is_plain_or_unencrypted().return_const(false);

    let config = EncryptionConfig {
        enabled: true,
        passphrase: None,
    };
    let aliases = offline().with_encryption(config, Arc::new(decryptor));
    let err = aliases
        .model_to_provider(&server_start(), "Password", &Value::from("{AES}abc"), None)
        .unwrap_err();
    assert!(matches!(
        err,
        AliasError::Encryption { source: EncryptionError::MissingPassphrase, .. }
    ));
}

#[test]
fn disabled_encryption_never_calls_decryptor() {
    let aliases = offline().with_encryption(EncryptionConfig::default(), Arc::new(MockDecryptor::new()));
    let written = aliases
        .model_to_provider(&server_start(), "Password", &Value::from("{AES}abc"), None)
        .unwrap()
        .unwrap();
    assert_eq!(written.value, Value::from("{AES}abc"));
}

#[test]
fn path_tokens_round_trip() {
    let tokens = PathTokens::new().with_token("DOMAIN_HOME", "/u01/domains/base");
    let aliases = offline().with_path_tokens(tokens);

    let written = aliases
        .model_to_provider(&server(), "RootDirectory", &Value::from("@@DOMAIN_HOME@@/servers"), None)
        .unwrap()
        .unwrap();
    assert_eq!(written.value, Value::from("/u01/domains/base/servers"));

    let read = aliases
        .provider_to_model(&server(), "RootDirectory", Some(&written.value))
        .unwrap()
        .unwrap();
    assert_eq!(read.value, Some(Value::from("@@DOMAIN_HOME@@/servers")));
}

#[test]
fn class_path_uses_path_separator() {
    let tokens = PathTokens::new().with_token("DOMAIN_HOME", "/u01/domains/base");
    let aliases = offline().with_path_tokens(tokens);

    let written = aliases
        .model_to_provider(
            &server_start(),
            "ClassPath",
            &strings(&["@@DOMAIN_HOME@@/lib/a.jar", "/opt/b.jar"]),
            None,
        )
        .unwrap()
        .unwrap();
    let separator = Delimiter::PathSeparator.as_str();
    assert_eq!(
        written.value,
        Value::from(format!("/u01/domains/base/lib/a.jar{separator}/opt/b.jar"))
    );
}

#[test]
fn versioned_attribute_variants() {
    let location = server();

    let old = aliases("11.0", ConnectionMode::Offline);
    let written = old
        .model_to_provider(&location, "ListenDelaySecs", &Value::from("30"), None)
        .unwrap()
        .unwrap();
    assert_eq!(written.value, Value::Integer(30));

    let current = offline();
    let written = current
        .model_to_provider(&location, "ListenDelaySecs", &Value::from("30"), None)
        .unwrap()
        .unwrap();
    assert_eq!(written.value, Value::Long(30));
}

#[test]
fn introspection_lists() {
    let aliases = offline();
    let translator = aliases.translator();

    assert_eq!(aliases.get_required_attribute_names(&server()).unwrap(), vec!["State", "Cluster"]);
    assert_eq!(
        online().get_required_attribute_names(&server()).unwrap(),
        vec!["State", "Cluster", "HealthState"]
    );
    assert_eq!(
        translator.lsa_required_attribute_names(&server()).unwrap(),
        vec!["ListenPort", "ListenAddress", "Notes", "RootDirectory", "Machine", "ListenDelaySecs"]
    );
    assert_eq!(
        aliases.restart_required_attribute_names(&server()).unwrap(),
        vec!["ListenPort", "RootDirectory"]
    );
    assert_eq!(aliases.password_attribute_names(&server_start()).unwrap(), vec!["Password"]);
    assert_eq!(aliases.merge_required_attribute_names(&pool()).unwrap(), vec!["Members", "Params"]);

    let returns = translator.returns_sub_object_attribute_names_and_types(&server()).unwrap();
    assert_eq!(returns.get("Cluster").map(String::as_str), Some("Cluster"));
    let setters = translator.sub_object_set_method_attribute_names_and_types(&server()).unwrap();
    assert_eq!(setters.get("Machine").map(String::as_str), Some("Machine"));

    let root = domain_location();
    assert_eq!(
        translator.get_required_provider_attribute_names(&root).unwrap(),
        vec!["DomainVersion"]
    );
    assert_eq!(
        translator.model_attribute_name(&root, "AdminPasswordEncrypted").unwrap().as_deref(),
        Some("AdminPassword")
    );
}

#[test]
fn values_equal_only_when_default() {
    let translator = offline();
    let translator = translator.translator();
    let port = Value::Integer(7001);
    assert!(translator
        .attribute_values_are_equal(&server(), "ListenPort", Some(&Value::from("7001")), Some(&port))
        .unwrap());
    let other = Value::Integer(8001);
    assert!(!translator
        .attribute_values_are_equal(&server(), "ListenPort", Some(&other), Some(&other))
        .unwrap());
}
