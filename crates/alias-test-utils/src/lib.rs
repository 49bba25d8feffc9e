//! Testing utilities for the alias resolver workspace
//!
//! Shared fixture metadata, pre-built knowledge bases and locations, and
//! tracing setup.

#![allow(missing_docs)]

use alias_convert::Value;
use alias_core::{Aliases, Location};
use alias_kb::{ConnectionMode, DocumentSource, KnowledgeBase, ProviderVersion};
use std::sync::Arc;

pub const FIXTURE: &str = include_str!("../fixtures/aliases.yaml");

pub const FIXTURE_VERSION: &str = "12.2.1.4";

pub const DOMAIN_NAME: &str = "base_domain";

pub fn fixture_source() -> DocumentSource {
    DocumentSource::from_yaml_str("fixtures/aliases.yaml", FIXTURE).unwrap()
}

pub fn version(version: &str) -> ProviderVersion {
    version.parse().unwrap()
}

pub fn knowledge_base(version_text: &str, mode: ConnectionMode) -> Arc<KnowledgeBase> {
    Arc::new(KnowledgeBase::load(&fixture_source(), version(version_text), mode).unwrap())
}

pub fn aliases(version_text: &str, mode: ConnectionMode) -> Aliases {
    Aliases::new(knowledge_base(version_text, mode))
}

pub fn offline() -> Aliases {
    aliases(FIXTURE_VERSION, ConnectionMode::Offline)
}

pub fn online() -> Aliases {
    aliases(FIXTURE_VERSION, ConnectionMode::Online)
}

/// Root location with the domain name bound
pub fn domain_location() -> Location {
    let mut location = Location::new();
    location.bind_token("DOMAIN", DOMAIN_NAME);
    location
}

/// `folder` under the root, bound to `name` through `token`
pub fn named_location(folder: &str, token: &str, name: &str) -> Location {
    let mut location = domain_location();
    location.append(folder).bind_token(token, name);
    location
}

/// Driver property `property` of data source `datasource`
pub fn jdbc_property_location(datasource: &str, property: &str) -> Location {
    let mut location = named_location("JDBCSystemResource", "JDBCSYSTEMRESOURCE", datasource);
    location.append_all(["JdbcResource", "JDBCDriverParams"]);
    location.append("Properties").bind_token("PROPERTY", property);
    location
}

/// Shutdown trigger of work manager `work_manager`
pub fn shutdown_trigger_location(self_tuning: Option<&str>, work_manager: &str) -> Location {
    let mut location = domain_location();
    location.append("SelfTuning");
    if let Some(name) = self_tuning {
        location.bind_token("SELFTUNING", name);
    }
    location.append("WorkManager").bind_token("WORKMANAGER", work_manager);
    location.append("WorkManagerShutdownTrigger");
    location
}

/// Authentication provider `provider` of realm `realm`, optionally with its type subfolder
pub fn auth_provider_location(realm: &str, provider: &str, type_folder: Option<&str>) -> Location {
    let mut location = domain_location();
    location.append("SecurityConfiguration");
    location.append("Realm").bind_token("REALM", realm);
    location
        .append("AuthenticationProvider")
        .bind_token("PROVIDER", provider);
    if let Some(type_folder) = type_folder {
        location.append(type_folder);
    }
    location
}

pub fn strings(items: &[&str]) -> Value {
    Value::string_list(items.iter().copied())
}

/// Install a test subscriber honouring `RUST_LOG`; later calls are no-ops
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
