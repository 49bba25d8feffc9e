//! Attribute translation
//!
//! [`AttributeTranslator`] moves one attribute between the model and the
//! provider.
//!
//! # Model to provider
//!
//! 1. Look up the attribute by model name
//! 2. Skip read-only attributes
//! 3. Resolve path tokens
//! 4. Decrypt encrypted passwords
//! 5. Merge collections with the existing provider value
//! 6. Convert to the declared type
//!
//! # Provider to model
//!
//! 1. Look up the attribute by provider name; identity fields are ignored
//! 2. Convert to the read type
//! 3. Elide values equal to the default
//! 4. Replace non-default passwords with a placeholder
//! 5. Restore path tokens

use alias_convert::{
    convert, convert_with, to_boolean, to_list, to_properties, typed_eq, ConvertError,
    ConvertOptions, DataType, MergePolicyRegistry, Value,
};
use alias_kb::{AttributeMetadata, GetMethod, KnowledgeBase};
use indexmap::IndexMap;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;
use tracing::{debug, trace, warn, Span};

use crate::encryption::{EncryptionConfig, PasswordDecryptor, PlainText};
use crate::error::{AliasError, EncryptionError, Result};
use crate::location::Location;
use crate::tokens::PathTokens;

/// Model value surfaced for a password the provider holds
pub const PASSWORD_PLACEHOLDER: &str = "--FIX ME--";

/// Provider identity fields that have no model attribute
pub const IGNORED_PROVIDER_ATTRIBUTES: &[&str] = &["Id", "Tag", "Name"];

/// Attribute in provider vocabulary
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderAttribute {
    /// Provider attribute name
    pub name: String,
    /// Converted value
    pub value: Value,
}

/// Attribute in model vocabulary
///
/// A `None` value tells the caller to leave the attribute out of the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelAttribute {
    /// Model attribute name
    pub name: String,
    /// Model value, `None` when default or absent
    pub value: Option<Value>,
}

/// Bidirectional attribute translator
#[derive(Clone)]
pub struct AttributeTranslator {
    kb: Arc<KnowledgeBase>,
    merge: Arc<MergePolicyRegistry>,
    tokens: PathTokens,
    encryption: EncryptionConfig,
    decryptor: Arc<dyn PasswordDecryptor>,
    span: Span,
}

impl Debug for AttributeTranslator {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeTranslator")
            .field("version", self.kb.version())
            .field("mode", &self.kb.mode())
            .field("merge_policies", &self.merge.names())
            .field("path_tokens", &self.tokens.len())
            .field("encryption", &self.encryption.enabled)
            .finish_non_exhaustive()
    }
}

impl AttributeTranslator {
    /// Create translator with built-in merge policies, no path tokens and
    /// decryption disabled
    #[must_use]
    pub fn new(kb: Arc<KnowledgeBase>, span: Span) -> Self {
        Self {
            kb,
            merge: Arc::new(MergePolicyRegistry::with_defaults()),
            tokens: PathTokens::new(),
            encryption: EncryptionConfig::default(),
            decryptor: Arc::new(PlainText),
            span,
        }
    }

    /// With span events are emitted under
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// With merge-policy registry
    #[must_use]
    pub fn with_merge_registry(mut self, registry: MergePolicyRegistry) -> Self {
        self.merge = Arc::new(registry);
        self
    }

    /// With path tokens
    #[must_use]
    pub fn with_path_tokens(mut self, tokens: PathTokens) -> Self {
        self.tokens = tokens;
        self
    }

    /// With decryption settings and collaborator
    #[must_use]
    pub fn with_encryption(
        mut self,
        config: EncryptionConfig,
        decryptor: Arc<dyn PasswordDecryptor>,
    ) -> Self {
        self.encryption = config;
        self.decryptor = decryptor;
        self
    }

    /// Path tokens in use
    #[inline]
    #[must_use]
    pub fn path_tokens(&self) -> &PathTokens {
        &self.tokens
    }

    /// Merge-policy registry in use
    #[inline]
    #[must_use]
    pub fn merge_registry(&self) -> &MergePolicyRegistry {
        &self.merge
    }

    /// Translate a model attribute for writing
    ///
    /// Returns `None` for read-only attributes. `existing` is the value the
    /// provider currently holds; collection attributes with merge enabled are
    /// merged into it.
    ///
    /// # Errors
    /// - [`AliasError::Kb`] if the folder or attribute is unknown
    /// - [`AliasError::Encryption`] if a password cannot be decrypted
    /// - [`AliasError::Conversion`] if the value does not fit the declared type
    pub fn model_to_provider(
        &self,
        location: &Location,
        model_name: &str,
        model_value: &Value,
        existing: Option<&Value>,
    ) -> Result<Option<ProviderAttribute>> {
        let attribute = self.kb.attribute(&location.folder_names(), model_name)?;
        if attribute.is_read_only() {
            trace!(parent: &self.span, %location, attribute = model_name, "skipping read-only attribute");
            return Ok(None);
        }

        let mut value = if attribute.uses_path_tokens {
            self.tokens.resolve_value(model_value)
        } else {
            model_value.clone()
        };

        if attribute.data_type == DataType::Password {
            value = self.decrypt(location, attribute, value)?;
        }

        if let (true, Some(existing)) = (attribute.merge, existing) {
            let folder = location.last_folder().unwrap_or_default();
            if let Some(policy) = self.merge.select(folder, model_name, attribute.data_type) {
                debug!(parent: &self.span, %location, attribute = model_name, policy = policy.name(), "merging with existing value");
                value = policy
                    .merge(&value, Some(existing))
                    .map_err(|source| conversion(location, attribute, source))?;
            }
        }

        let options = ConvertOptions::new().with_element(attribute.element_type.clone());
        let value = convert_with(attribute.data_type, &value, &options)
            .map_err(|source| conversion(location, attribute, source))?;

        debug!(parent: &self.span, %location, attribute = model_name, provider_name = %attribute.provider_name, "translated to provider");
        Ok(Some(ProviderAttribute {
            name: attribute.provider_name.clone(),
            value,
        }))
    }

    /// Translate a provider attribute for discovery
    ///
    /// Returns `None` for ignored identity fields. The model value is `None`
    /// when the provider value is absent or equals the default.
    ///
    /// # Errors
    /// - [`AliasError::UnknownProviderAttribute`] if the name is not recognized
    /// - [`AliasError::Conversion`] if the value does not fit the read type
    pub fn provider_to_model(
        &self,
        location: &Location,
        provider_name: &str,
        provider_value: Option<&Value>,
    ) -> Result<Option<ModelAttribute>> {
        let names = location.folder_names();
        let Some(attribute) = self.kb.attribute_by_provider_name(&names, provider_name)? else {
            if IGNORED_PROVIDER_ATTRIBUTES.contains(&provider_name) {
                trace!(parent: &self.span, %location, provider_name, "ignoring identity attribute");
                return Ok(None);
            }
            return Err(AliasError::UnknownProviderAttribute {
                path: location.to_string(),
                name: provider_name.to_string(),
            });
        };

        let value = match provider_value {
            Some(raw) => self.read_value(location, attribute, raw)?,
            None => None,
        };
        let value = value.map(|v| {
            if attribute.uses_path_tokens {
                self.tokens.tokenize_value(&v)
            } else {
                v
            }
        });

        if value.is_none() {
            trace!(parent: &self.span, %location, attribute = %attribute.model_name, "eliding default value");
        }
        Ok(Some(ModelAttribute {
            name: attribute.model_name.clone(),
            value,
        }))
    }

    /// Provider name of a model attribute, `None` when read-only
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder or attribute is unknown
    pub fn provider_attribute_name(&self, location: &Location, model_name: &str) -> Result<Option<String>> {
        let attribute = self.kb.attribute(&location.folder_names(), model_name)?;
        Ok((!attribute.is_read_only()).then(|| attribute.provider_name.clone()))
    }

    /// Model name of a provider attribute, `None` when unknown
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn model_attribute_name(&self, location: &Location, provider_name: &str) -> Result<Option<String>> {
        Ok(self
            .kb
            .attribute_by_provider_name(&location.folder_names(), provider_name)?
            .map(|a| a.model_name.clone()))
    }

    /// Model names of the folder's attributes
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn model_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.select(location, |a| Some(a.model_name.clone()))
    }

    /// Model attribute names mapped to their model types
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn model_attribute_names_and_types(&self, location: &Location) -> Result<IndexMap<String, DataType>> {
        self.select_pairs(location, |a| Some((a.model_name.clone(), a.model_type())))
    }

    /// Model names of attributes read with an individual getter
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn get_required_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.select(location, |a| (a.get_method == GetMethod::Get).then(|| a.model_name.clone()))
    }

    /// Provider names of attributes read with an individual getter
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn get_required_provider_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.select(location, |a| (a.get_method == GetMethod::Get).then(|| a.provider_name.clone()))
    }

    /// Model names of attributes read through bulk listing
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn lsa_required_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.select(location, |a| (a.get_method == GetMethod::Lsa).then(|| a.model_name.clone()))
    }

    /// Provider names of attributes read through bulk listing
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn lsa_required_provider_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.select(location, |a| (a.get_method == GetMethod::Lsa).then(|| a.provider_name.clone()))
    }

    /// Model names of password attributes
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn password_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.select(location, |a| (a.data_type == DataType::Password).then(|| a.model_name.clone()))
    }

    /// Model names of attributes whose change requires a restart
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn restart_required_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.select(location, |a| a.restart_required.then(|| a.model_name.clone()))
    }

    /// Model names of collection attributes merged on write
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn merge_required_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.select(location, |a| a.requires_merge().then(|| a.model_name.clone()))
    }

    /// Model names of attributes whose getter returns a sub-object, mapped to its provider type
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn returns_sub_object_attribute_names_and_types(&self, location: &Location) -> Result<IndexMap<String, String>> {
        self.select_pairs(location, |a| {
            a.returns_type.clone().map(|t| (a.model_name.clone(), t))
        })
    }

    /// As [`Self::returns_sub_object_attribute_names_and_types`], keyed by provider name
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn returns_sub_object_provider_attribute_names_and_types(
        &self,
        location: &Location,
    ) -> Result<IndexMap<String, String>> {
        self.select_pairs(location, |a| {
            a.returns_type.clone().map(|t| (a.provider_name.clone(), t))
        })
    }

    /// Model names of attributes set through a sub-object reference, mapped to its provider type
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn sub_object_set_method_attribute_names_and_types(
        &self,
        location: &Location,
    ) -> Result<IndexMap<String, String>> {
        self.select_pairs(location, |a| {
            a.set_mbean_type.clone().map(|t| (a.model_name.clone(), t))
        })
    }

    /// True when the model and provider values are equal to each other and to the default
    ///
    /// Unknown attributes are never equal.
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is unknown
    pub fn attribute_values_are_equal(
        &self,
        location: &Location,
        model_name: &str,
        model_value: Option<&Value>,
        provider_value: Option<&Value>,
    ) -> Result<bool> {
        let folder = self.kb.folder(&location.folder_names())?;
        let Some(attribute) = folder.attribute(model_name) else {
            return Ok(false);
        };

        let data_type = attribute.data_type;
        let same = |a: Option<&Value>, b: Option<&Value>| match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => typed_eq(data_type, a, b),
            _ => false,
        };
        Ok(same(model_value, provider_value) && same(model_value, attribute.default.as_ref()))
    }

    fn select<T>(
        &self,
        location: &Location,
        pick: impl Fn(&AttributeMetadata) -> Option<T>,
    ) -> Result<Vec<T>> {
        Ok(self
            .kb
            .folder(&location.folder_names())?
            .attributes()
            .filter_map(pick)
            .collect())
    }

    fn select_pairs<V>(
        &self,
        location: &Location,
        pick: impl Fn(&AttributeMetadata) -> Option<(String, V)>,
    ) -> Result<IndexMap<String, V>> {
        Ok(self.select(location, pick)?.into_iter().collect())
    }

    fn decrypt(&self, location: &Location, attribute: &AttributeMetadata, value: Value) -> Result<Value> {
        if !self.encryption.enabled {
            return Ok(value);
        }
        let Some(text) = value.as_str() else {
            return Ok(value);
        };
        if self.decryptor.is_plain_or_unencrypted(text) {
            return Ok(value);
        }

        let encryption = |source: EncryptionError| AliasError::Encryption {
            path: location.to_string(),
            name: attribute.model_name.clone(),
            source,
        };
        let passphrase = self
            .encryption
            .passphrase
            .as_deref()
            .ok_or_else(|| encryption(EncryptionError::MissingPassphrase))?;
        let clear = self.decryptor.decrypt(text, passphrase).map_err(encryption)?;
        Ok(Value::String(clear))
    }

    fn read_value(&self, location: &Location, attribute: &AttributeMetadata, raw: &Value) -> Result<Option<Value>> {
        let err = |source: ConvertError| conversion(location, attribute, source);
        let default = attribute.default.as_ref();

        let data_type = match (attribute.read_type(), raw) {
            (DataType::String, Value::List(_) | Value::Array(_)) => DataType::List,
            (data_type, _) => data_type,
        };

        let value = match data_type {
            DataType::Password => {
                let is_default = default.is_some_and(|d| typed_eq(DataType::String, d, raw));
                let is_empty = raw.as_str().is_some_and(str::is_empty);
                if is_default || is_empty {
                    None
                } else {
                    warn!(parent: &self.span, %location, attribute = %attribute.model_name, "password requires manual resolution");
                    Some(Value::string(PASSWORD_PLACEHOLDER))
                }
            }
            DataType::Boolean => {
                let actual = to_boolean(raw).map_err(err)?;
                let default = default.map(to_boolean).transpose().map_err(err)?.unwrap_or(false);
                (actual != default).then_some(Value::Bool(actual))
            }
            DataType::Properties => {
                let props = to_properties(raw).map_err(err)?;
                let default = default.map(to_properties).transpose().map_err(err)?.unwrap_or_default();
                (!props.is_empty() && props != default).then_some(Value::Properties(props))
            }
            list if list.is_list() => {
                let delimiter = list.delimiter().unwrap_or_default();
                let items = to_list(raw, delimiter);
                let default = default.map(|d| to_list(d, delimiter)).unwrap_or_default();
                (!items.is_empty() && items != default).then_some(Value::List(items))
            }
            scalar => {
                let converted = convert(scalar, raw).map_err(err)?;
                match (default, &converted) {
                    (Some(d), _) if typed_eq(scalar, &converted, d) => None,
                    (None, Value::String(s)) if s.is_empty() => None,
                    _ => Some(converted),
                }
            }
        };
        Ok(value)
    }
}

fn conversion(location: &Location, attribute: &AttributeMetadata, source: ConvertError) -> AliasError {
    AliasError::Conversion {
        path: location.to_string(),
        name: attribute.model_name.clone(),
        source,
    }
}
