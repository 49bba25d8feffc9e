//! Alias configuration
//!
//! [`AliasConfig`] selects the provider version and connection mode, and
//! carries decryption settings, path tokens and extra merge-policy bindings.
//!
//! ```toml
//! version = "12.2.1.4"
//! mode = "online"
//!
//! [encryption]
//! enabled = true
//! passphrase = "welcome1"
//!
//! [path_tokens]
//! ORACLE_HOME = "/u01/oracle"
//!
//! [merge_policies]
//! "Server/Notes" = "list_union"
//! ```

use alias_convert::MergePolicyRegistry;
use alias_kb::{ConnectionMode, ProviderVersion};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::encryption::EncryptionConfig;
use crate::error::ConfigError;
use crate::tokens::PathTokens;

/// Alias configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AliasConfig {
    /// Provider release version
    pub version: String,
    /// Connection mode
    pub mode: ConnectionMode,
    /// Password decryption
    pub encryption: EncryptionConfig,
    /// Path token name → replacement
    pub path_tokens: IndexMap<String, String>,
    /// `Folder/Attribute` → merge policy name
    pub merge_policies: IndexMap<String, String>,
}

impl AliasConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With provider version
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// With connection mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: ConnectionMode) -> Self {
        self.mode = mode;
        self
    }

    /// With decryption enabled using `passphrase`
    #[inline]
    #[must_use]
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.encryption = EncryptionConfig::with_passphrase(passphrase);
        self
    }

    /// With path token
    #[inline]
    #[must_use]
    pub fn with_path_token(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_tokens.insert(name.into(), value.into());
        self
    }

    /// With merge policy bound to `folder`/`attribute`
    #[inline]
    #[must_use]
    pub fn with_merge_policy(mut self, folder: &str, attribute: &str, policy: impl Into<String>) -> Self {
        self.merge_policies
            .insert(format!("{folder}/{attribute}"), policy.into());
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] on malformed TOML or unknown keys, and
    /// [`ConfigError::Version`] on an invalid version
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.provider_version()?;
        Ok(config)
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`Self::from_toml_str`]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Parsed provider version
    ///
    /// # Errors
    /// Returns [`ConfigError::Version`] if `version` is not a dotted number
    pub fn provider_version(&self) -> Result<ProviderVersion, ConfigError> {
        Ok(self.version.parse()?)
    }

    /// Path token table
    #[must_use]
    pub fn path_tokens(&self) -> PathTokens {
        self.path_tokens
            .iter()
            .fold(PathTokens::new(), |tokens, (name, value)| {
                tokens.with_token(name, value.clone())
            })
    }

    /// Merge-policy registry: built-in policies plus configured bindings
    ///
    /// # Errors
    /// Returns [`ConfigError`] for a malformed key or an unknown policy
    pub fn merge_registry(&self) -> Result<MergePolicyRegistry, ConfigError> {
        let mut registry = MergePolicyRegistry::with_defaults();
        for (key, policy) in &self.merge_policies {
            let (folder, attribute) = key
                .split_once('/')
                .filter(|(f, a)| !f.is_empty() && !a.is_empty())
                .ok_or_else(|| ConfigError::MergePolicyKey(key.clone()))?;
            registry
                .bind(folder, attribute, policy)
                .map_err(|source| ConfigError::MergePolicy {
                    key: key.clone(),
                    source,
                })?;
        }
        Ok(registry)
    }
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            version: "12.2.1".to_string(),
            mode: ConnectionMode::Offline,
            encryption: EncryptionConfig::default(),
            path_tokens: IndexMap::new(),
            merge_policies: IndexMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TOML: &str = r#"
version = "12.2.1.4"
mode = "online"

[encryption]
enabled = true
passphrase = "welcome1"

[path_tokens]
ORACLE_HOME = "/u01/oracle"

[merge_policies]
"Server/Notes" = "list_union"
"#;

    #[test]
    fn parses_full_config() {
        let config = AliasConfig::from_toml_str(TOML).unwrap();
        assert_eq!(config.mode, ConnectionMode::Online);
        assert_eq!(
            config.provider_version().unwrap(),
            "12.2.1.4".parse::<ProviderVersion>().unwrap()
        );
        assert_eq!(config.encryption.passphrase.as_deref(), Some("welcome1"));
        assert_eq!(config.path_tokens().get("ORACLE_HOME"), Some("/u01/oracle"));
        assert!(config.merge_registry().unwrap().select(
            "Server",
            "Notes",
            alias_convert::DataType::String
        ).is_some());
    }

    #[test]
    fn defaults_when_empty() {
        let config = AliasConfig::from_toml_str("").unwrap();
        assert_eq!(config, AliasConfig::default());
    }

    #[test]
    fn rejects_bad_version() {
        assert!(matches!(
            AliasConfig::from_toml_str("version = \"twelve\""),
            Err(ConfigError::Version(_))
        ));
    }

    #[test]
    fn rejects_unknown_key() {
        assert!(matches!(
            AliasConfig::from_toml_str("flavour = \"vanilla\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn rejects_bad_merge_policy() {
        let config = AliasConfig::new().with_merge_policy("Server", "Notes", "concat");
        assert!(matches!(
            config.merge_registry(),
            Err(ConfigError::MergePolicy { .. })
        ));

        let mut config = AliasConfig::new();
        config.merge_policies.insert("Notes".to_string(), "list_union".to_string());
        assert!(matches!(
            config.merge_registry(),
            Err(ConfigError::MergePolicyKey(_))
        ));
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TOML.as_bytes()).unwrap();
        let config = AliasConfig::from_file(file.path()).unwrap();
        assert_eq!(config.version, "12.2.1.4");
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            AliasConfig::from_file("/nonexistent/alias.toml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
