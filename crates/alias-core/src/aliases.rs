//! Aliases facade
//!
//! [`Aliases`] bundles a knowledge base with the resolver, translator and
//! validator built over it, all emitting under one [`Span`].

use alias_convert::{MergePolicyRegistry, Value};
use alias_kb::{KnowledgeBase, KnowledgeBaseRegistry, MetadataSource, ModelSection};
use std::sync::Arc;
use tracing::{debug, debug_span, Span};

use crate::config::AliasConfig;
use crate::encryption::{EncryptionConfig, PasswordDecryptor};
use crate::error::Result;
use crate::location::Location;
use crate::resolver::PathResolver;
use crate::tokens::PathTokens;
use crate::translator::{AttributeTranslator, ModelAttribute, ProviderAttribute};
use crate::validator::{Validation, Validator};

/// Alias resolution for one (version, mode)
///
/// # Example
///
/// ```rust
/// use alias_core::{Aliases, Location};
/// use alias_kb::{ConnectionMode, DocumentSource, KnowledgeBase};
/// use std::sync::Arc;
///
/// let source = DocumentSource::from_yaml_str(
///     "inline",
///     "folders:\n  Pool:\n    provider_type: Pools\n",
/// )?;
/// let kb = KnowledgeBase::load(&source, "12.2.1".parse()?, ConnectionMode::Offline)?;
/// let aliases = Aliases::new(Arc::new(kb));
///
/// let mut location = Location::from_folders(["Pool"]);
/// location.bind_token("POOL", "pool-1");
/// assert_eq!(aliases.attributes_path(&location)?, "/Pools/pool-1");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct Aliases {
    kb: Arc<KnowledgeBase>,
    resolver: PathResolver,
    translator: AttributeTranslator,
    validator: Validator,
    span: Span,
}

impl Aliases {
    /// Create facade over `kb` with default translator settings
    #[must_use]
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        let span = debug_span!("aliases", version = %kb.version(), mode = %kb.mode());
        Self {
            resolver: PathResolver::new(Arc::clone(&kb), span.clone()),
            translator: AttributeTranslator::new(Arc::clone(&kb), span.clone()),
            validator: Validator::new(Arc::clone(&kb), span.clone()),
            kb,
            span,
        }
    }

    /// Load the configured view from `source` and apply `config`
    ///
    /// # Errors
    /// Returns [`crate::AliasError`] if the configuration is invalid or the
    /// metadata cannot be loaded
    pub fn from_config(
        config: &AliasConfig,
        source: &dyn MetadataSource,
        decryptor: Arc<dyn PasswordDecryptor>,
    ) -> Result<Self> {
        let version = config.provider_version()?;
        let kb = KnowledgeBase::load(source, version, config.mode)?;
        Self::configured(Arc::new(kb), config, decryptor)
    }

    /// Take the configured view from `registry` and apply `config`
    ///
    /// # Errors
    /// As [`Self::from_config`]
    pub fn from_registry(
        registry: &KnowledgeBaseRegistry,
        config: &AliasConfig,
        decryptor: Arc<dyn PasswordDecryptor>,
    ) -> Result<Self> {
        let version = config.provider_version()?;
        let kb = registry.get_or_load(&version, config.mode)?;
        Self::configured(kb, config, decryptor)
    }

    fn configured(
        kb: Arc<KnowledgeBase>,
        config: &AliasConfig,
        decryptor: Arc<dyn PasswordDecryptor>,
    ) -> Result<Self> {
        let aliases = Self::new(kb)
            .with_path_tokens(config.path_tokens())
            .with_merge_registry(config.merge_registry()?)
            .with_encryption(config.encryption.clone(), decryptor);
        debug!(parent: &aliases.span, path_tokens = config.path_tokens.len(), "aliases configured");
        Ok(aliases)
    }

    /// With span every component emits under
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.resolver = PathResolver::new(Arc::clone(&self.kb), span.clone());
        self.validator = Validator::new(Arc::clone(&self.kb), span.clone());
        self.translator = self.translator.with_span(span.clone());
        self.span = span;
        self
    }

    /// With path tokens
    #[must_use]
    pub fn with_path_tokens(mut self, tokens: PathTokens) -> Self {
        self.translator = self.translator.with_path_tokens(tokens);
        self
    }

    /// With merge-policy registry
    #[must_use]
    pub fn with_merge_registry(mut self, registry: MergePolicyRegistry) -> Self {
        self.translator = self.translator.with_merge_registry(registry);
        self
    }

    /// With decryption settings and collaborator
    #[must_use]
    pub fn with_encryption(
        mut self,
        config: EncryptionConfig,
        decryptor: Arc<dyn PasswordDecryptor>,
    ) -> Self {
        self.translator = self.translator.with_encryption(config, decryptor);
        self
    }

    /// Knowledge base in use
    #[inline]
    #[must_use]
    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    /// Path resolver
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    /// Attribute translator
    #[inline]
    #[must_use]
    pub fn translator(&self) -> &AttributeTranslator {
        &self.translator
    }

    /// Name validator
    #[inline]
    #[must_use]
    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Span events are emitted under
    #[inline]
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Token naming the root object
    #[inline]
    #[must_use]
    pub fn root_name_token(&self) -> &str {
        self.kb.root_name_token()
    }

    /// See [`PathResolver::get_name_token`]
    ///
    /// # Errors
    /// As the resolver
    pub fn get_name_token(&self, location: &Location) -> Result<Option<String>> {
        self.resolver.get_name_token(location)
    }

    /// See [`PathResolver::model_folder_path`]
    ///
    /// # Errors
    /// As the resolver
    pub fn model_folder_path(&self, location: &Location) -> Result<String> {
        self.resolver.model_folder_path(location)
    }

    /// See [`PathResolver::attributes_path`]
    ///
    /// # Errors
    /// As the resolver
    pub fn attributes_path(&self, location: &Location) -> Result<String> {
        self.resolver.attributes_path(location)
    }

    /// See [`PathResolver::subfolders_path`]
    ///
    /// # Errors
    /// As the resolver
    pub fn subfolders_path(&self, location: &Location) -> Result<String> {
        self.resolver.subfolders_path(location)
    }

    /// See [`PathResolver::list_path`]
    ///
    /// # Errors
    /// As the resolver
    pub fn list_path(&self, location: &Location) -> Result<String> {
        self.resolver.list_path(location)
    }

    /// See [`PathResolver::create_path`]
    ///
    /// # Errors
    /// As the resolver
    pub fn create_path(&self, location: &Location) -> Result<String> {
        self.resolver.create_path(location)
    }

    /// See [`PathResolver::flattened_list_path`]
    ///
    /// # Errors
    /// As the resolver
    pub fn flattened_list_path(&self, location: &Location) -> Result<String> {
        self.resolver.flattened_list_path(location)
    }

    /// See [`PathResolver::flattened_create_path`]
    ///
    /// # Errors
    /// As the resolver
    pub fn flattened_create_path(&self, location: &Location) -> Result<String> {
        self.resolver.flattened_create_path(location)
    }

    /// See [`PathResolver::instance_name`]
    ///
    /// # Errors
    /// As the resolver
    pub fn instance_name(&self, location: &Location) -> Result<String> {
        self.resolver.instance_name(location)
    }

    /// See [`PathResolver::provider_type`]
    ///
    /// # Errors
    /// As the resolver
    pub fn provider_type(&self, location: &Location) -> Result<Option<String>> {
        self.resolver.provider_type(location)
    }

    /// See [`PathResolver::is_flattened`]
    ///
    /// # Errors
    /// As the resolver
    pub fn is_flattened(&self, location: &Location) -> Result<bool> {
        self.resolver.is_flattened(location)
    }

    /// See [`PathResolver::supports_multiple_instances`]
    ///
    /// # Errors
    /// As the resolver
    pub fn supports_multiple_instances(&self, location: &Location) -> Result<bool> {
        self.resolver.supports_multiple_instances(location)
    }

    /// See [`PathResolver::supports_single_instance`]
    ///
    /// # Errors
    /// As the resolver
    pub fn supports_single_instance(&self, location: &Location) -> Result<bool> {
        self.resolver.supports_single_instance(location)
    }

    /// See [`PathResolver::requires_unpredictable_single_name_handling`]
    ///
    /// # Errors
    /// As the resolver
    pub fn requires_unpredictable_single_name_handling(&self, location: &Location) -> Result<bool> {
        self.resolver.requires_unpredictable_single_name_handling(location)
    }

    /// See [`PathResolver::requires_artificial_type_subfolder_handling`]
    ///
    /// # Errors
    /// As the resolver
    pub fn requires_artificial_type_subfolder_handling(&self, location: &Location) -> Result<bool> {
        self.resolver.requires_artificial_type_subfolder_handling(location)
    }

    /// See [`PathResolver::model_subfolder_names`]
    ///
    /// # Errors
    /// As the resolver
    pub fn model_subfolder_names(&self, location: &Location) -> Result<Vec<String>> {
        self.resolver.model_subfolder_names(location)
    }

    /// See [`PathResolver::model_top_level_folder_names`]
    #[must_use]
    pub fn model_top_level_folder_names(&self, section: ModelSection) -> Vec<String> {
        self.resolver.model_top_level_folder_names(section)
    }

    /// See [`AttributeTranslator::model_to_provider`]
    ///
    /// # Errors
    /// As the translator
    pub fn model_to_provider(
        &self,
        location: &Location,
        model_name: &str,
        model_value: &Value,
        existing: Option<&Value>,
    ) -> Result<Option<ProviderAttribute>> {
        self.translator
            .model_to_provider(location, model_name, model_value, existing)
    }

    /// See [`AttributeTranslator::provider_to_model`]
    ///
    /// # Errors
    /// As the translator
    pub fn provider_to_model(
        &self,
        location: &Location,
        provider_name: &str,
        provider_value: Option<&Value>,
    ) -> Result<Option<ModelAttribute>> {
        self.translator
            .provider_to_model(location, provider_name, provider_value)
    }

    /// See [`AttributeTranslator::model_attribute_names`]
    ///
    /// # Errors
    /// As the translator
    pub fn model_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.translator.model_attribute_names(location)
    }

    /// See [`AttributeTranslator::get_required_attribute_names`]
    ///
    /// # Errors
    /// As the translator
    pub fn get_required_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.translator.get_required_attribute_names(location)
    }

    /// See [`AttributeTranslator::password_attribute_names`]
    ///
    /// # Errors
    /// As the translator
    pub fn password_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.translator.password_attribute_names(location)
    }

    /// See [`AttributeTranslator::restart_required_attribute_names`]
    ///
    /// # Errors
    /// As the translator
    pub fn restart_required_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.translator.restart_required_attribute_names(location)
    }

    /// See [`AttributeTranslator::merge_required_attribute_names`]
    ///
    /// # Errors
    /// As the translator
    pub fn merge_required_attribute_names(&self, location: &Location) -> Result<Vec<String>> {
        self.translator.merge_required_attribute_names(location)
    }

    /// See [`Validator::validate_folder_name`]
    ///
    /// # Errors
    /// As the validator
    pub fn validate_folder_name(&self, location: &Location, candidate: &str) -> Result<Validation> {
        self.validator.validate_folder_name(location, candidate)
    }

    /// See [`Validator::validate_attribute_name`]
    ///
    /// # Errors
    /// As the validator
    pub fn validate_attribute_name(&self, location: &Location, candidate: &str) -> Result<Validation> {
        self.validator.validate_attribute_name(location, candidate)
    }
}
