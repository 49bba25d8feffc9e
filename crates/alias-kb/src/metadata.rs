//! Filtered folder and attribute metadata
//!
//! The records in this module describe exactly one (version, mode) view of the
//! metadata. Every entry reachable from a [`FolderMetadata`] is valid for that
//! view; child folders unavailable in it are kept as explicit `None` slots so
//! callers can tell "unavailable here" from "never declared".

use alias_convert::{DataType, ElementType, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use crate::document::{AttributeEntry, AttributeVariants, FolderEntry, MetadataDocument};
use crate::error::{display_path, KbError};
use crate::mode::{ConnectionMode, ModelSection, PerMode};
use crate::version::{ProviderVersion, VersionRange};

/// How many instances a folder supports and how they are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildFolderKind {
    /// Artificial type-discriminator folder, not an addressable instance
    None,

    /// Exactly one instance with a derived name
    Single,

    /// Exactly one instance whose provider name cannot be predicted offline
    SingleUnpredictable,

    /// Zero or more named instances
    #[default]
    Multiple,

    /// Multiple instances created through a nested type-discriminator folder
    MultipleWithTypeSubfolder,
}

impl ChildFolderKind {
    /// True when a bound name token identifies the instance
    #[inline]
    #[must_use]
    pub fn requires_name_token(self) -> bool {
        matches!(
            self,
            Self::Multiple | Self::MultipleWithTypeSubfolder | Self::SingleUnpredictable
        )
    }

    /// True for [`Self::Multiple`] and [`Self::MultipleWithTypeSubfolder`]
    #[inline]
    #[must_use]
    pub fn supports_multiple(self) -> bool {
        matches!(self, Self::Multiple | Self::MultipleWithTypeSubfolder)
    }

    /// True for [`Self::Single`] and [`Self::SingleUnpredictable`]
    #[inline]
    #[must_use]
    pub fn supports_single(self) -> bool {
        matches!(self, Self::Single | Self::SingleUnpredictable)
    }

    /// True for [`Self::SingleUnpredictable`]
    #[inline]
    #[must_use]
    pub fn requires_unpredictable_single_name_handling(self) -> bool {
        matches!(self, Self::SingleUnpredictable)
    }

    /// True for [`Self::MultipleWithTypeSubfolder`]
    #[inline]
    #[must_use]
    pub fn requires_artificial_type_subfolder_handling(self) -> bool {
        matches!(self, Self::MultipleWithTypeSubfolder)
    }

    /// True for [`Self::None`]
    #[inline]
    #[must_use]
    pub fn is_artificial_type_folder(self) -> bool {
        matches!(self, Self::None)
    }
}

impl Display for ChildFolderKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "none",
            Self::Single => "single",
            Self::SingleUnpredictable => "single_unpredictable",
            Self::Multiple => "multiple",
            Self::MultipleWithTypeSubfolder => "multiple_with_type_subfolder",
        })
    }
}

/// How a folder level without a bound token derives its instance name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum NameRule {
    /// Deterministic placeholder `NO_NAME_<ordinal>`
    Generated,

    /// Nearest ancestor's instance name, else the root token
    Inherit,

    /// Value of the named token bound elsewhere in the location
    Token(String),
}

impl NameRule {
    /// Rule used when the metadata does not name one
    #[inline]
    #[must_use]
    pub fn default_for(mode: ConnectionMode) -> Self {
        match mode {
            ConnectionMode::Offline => Self::Generated,
            ConnectionMode::Online => Self::Inherit,
        }
    }
}

impl Display for NameRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generated => f.write_str("generated"),
            Self::Inherit => f.write_str("inherit"),
            Self::Token(name) => write!(f, "token:{name}"),
        }
    }
}

impl FromStr for NameRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "generated" => Ok(Self::Generated),
            "inherit" => Ok(Self::Inherit),
            other => other
                .strip_prefix("token:")
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| Self::Token(t.to_string()))
                .ok_or_else(|| format!("unknown name rule: '{s}'")),
        }
    }
}

impl TryFrom<String> for NameRule {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<NameRule> for String {
    fn from(rule: NameRule) -> Self {
        rule.to_string()
    }
}

/// Attribute access mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Access {
    /// Read-write
    #[default]
    #[serde(rename = "rw", alias = "RW", alias = "read_write")]
    ReadWrite,

    /// Read-only
    #[serde(rename = "ro", alias = "RO", alias = "read_only")]
    ReadOnly,

    /// Visible but never written
    #[serde(rename = "vo", alias = "VO", alias = "view_only")]
    ViewOnly,
}

impl Access {
    /// True for read-only and view-only attributes
    #[inline]
    #[must_use]
    pub fn is_read_only(self) -> bool {
        !matches!(self, Self::ReadWrite)
    }
}

/// How an attribute value is read back from the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GetMethod {
    /// Bulk listing of the folder's attributes
    #[default]
    Lsa,

    /// Individual getter call
    Get,

    /// Not read back
    None,
}

/// One resolved attribute
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeMetadata {
    /// Model attribute name
    pub model_name: String,
    /// Provider attribute name
    pub provider_name: String,
    /// Declared data type
    pub data_type: DataType,
    /// Read type override
    pub read_type: Option<DataType>,
    /// Preferred model type
    pub preferred_model_type: Option<DataType>,
    /// Access mode
    pub access: Access,
    /// Provider default, `None` when the default is null
    pub default: Option<Value>,
    /// Merge collection values with existing provider values
    pub merge: bool,
    /// Value contains path tokens
    pub uses_path_tokens: bool,
    /// Change requires restart
    pub restart_required: bool,
    /// How the value is read back
    pub get_method: GetMethod,
    /// Provider type of the sub-object returned by the getter
    pub returns_type: Option<String>,
    /// Provider type set through a sub-object reference setter
    pub set_mbean_type: Option<String>,
    /// Element type of typed arrays
    pub element_type: ElementType,
    /// Version range of the active variant
    pub version: Option<VersionRange>,
}

impl AttributeMetadata {
    /// Resolve a variant entry stored under `model_name`
    #[must_use]
    pub fn from_entry(model_name: &str, entry: &AttributeEntry) -> Self {
        let set_mbean_type = entry
            .set_method
            .as_deref()
            .and_then(|m| m.strip_prefix("MBEAN."))
            .map(str::to_string);
        let element_type =
            ElementType::from_declared(entry.element_type.as_deref().or(set_mbean_type.as_deref()));

        Self {
            model_name: model_name.to_string(),
            provider_name: entry
                .provider_name
                .clone()
                .unwrap_or_else(|| model_name.to_string()),
            data_type: entry.data_type,
            read_type: entry.read_type,
            preferred_model_type: entry.preferred_model_type,
            access: entry.access,
            default: entry.default.clone(),
            merge: entry.merge.unwrap_or(true),
            uses_path_tokens: entry.uses_path_tokens,
            restart_required: entry.restart_required,
            get_method: entry.get_method,
            returns_type: entry.returns_type.clone(),
            set_mbean_type,
            element_type,
            version: entry.version.clone(),
        }
    }

    /// True for read-only and view-only attributes
    #[inline]
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.access.is_read_only()
    }

    /// Declared read type, else the data type
    #[inline]
    #[must_use]
    pub fn read_type(&self) -> DataType {
        self.read_type.unwrap_or(self.data_type)
    }

    /// Preferred model type, else the data type
    #[inline]
    #[must_use]
    pub fn model_type(&self) -> DataType {
        self.preferred_model_type.unwrap_or(self.data_type)
    }

    /// True when the value is a collection merged with existing values
    #[inline]
    #[must_use]
    pub fn requires_merge(&self) -> bool {
        self.merge && self.data_type.is_collection()
    }
}

/// Collapsed provider level
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenedFolder {
    /// Provider type of the collapsed level
    pub provider_type: String,
    /// Naming rule of the collapsed level
    pub name_rule: NameRule,
}

/// One resolved folder
#[derive(Debug, Clone)]
pub struct FolderMetadata {
    name: String,
    section: ModelSection,
    provider_type: String,
    kind: ChildFolderKind,
    name_token: String,
    name_rule: NameRule,
    flattened: Option<FlattenedFolder>,
    attributes: IndexMap<String, AttributeMetadata>,
    provider_names: HashMap<String, String>,
    folders: IndexMap<String, Option<FolderMetadata>>,
}

impl FolderMetadata {
    /// Resolve the root folder of `doc` for `version` in `mode`
    ///
    /// # Errors
    /// Returns [`KbError::AmbiguousAttribute`] when several variants of one
    /// attribute are active at once
    pub fn resolve_root(
        doc: &MetadataDocument,
        version: &ProviderVersion,
        mode: ConnectionMode,
    ) -> Result<Self, KbError> {
        let mut root = Self {
            name: String::new(),
            section: ModelSection::Topology,
            provider_type: String::new(),
            kind: ChildFolderKind::Single,
            name_token: doc.root_name_token.clone(),
            name_rule: NameRule::Inherit,
            flattened: None,
            attributes: IndexMap::new(),
            provider_names: HashMap::new(),
            folders: IndexMap::new(),
        };

        let path: Vec<&str> = Vec::new();
        root.resolve_attributes(&path, &doc.attributes, version, mode)?;
        for (name, entry) in &doc.folders {
            let section = entry.section.unwrap_or_default();
            let child = Self::resolve(&path, name, entry, section, version, mode)?;
            root.folders.insert(name.clone(), child);
        }
        Ok(root)
    }

    fn resolve(
        parent: &[&str],
        name: &str,
        entry: &FolderEntry,
        section: ModelSection,
        version: &ProviderVersion,
        mode: ConnectionMode,
    ) -> Result<Option<Self>, KbError> {
        if !entry.applies_to(version, mode) {
            return Ok(None);
        }

        let mut path = parent.to_vec();
        path.push(name);

        let rule_for = |rule: &Option<PerMode<NameRule>>| {
            rule.as_ref()
                .map_or_else(|| NameRule::default_for(mode), |r| r.get(mode).clone())
        };

        let mut folder = Self {
            name: name.to_string(),
            section,
            provider_type: entry.provider_type.get(mode).clone(),
            kind: entry.kind,
            name_token: entry.token_name(name),
            name_rule: rule_for(&entry.name_rule),
            flattened: entry.flattened.as_ref().map(|f| FlattenedFolder {
                provider_type: f.provider_type.get(mode).clone(),
                name_rule: rule_for(&f.name_rule),
            }),
            attributes: IndexMap::new(),
            provider_names: HashMap::new(),
            folders: IndexMap::new(),
        };

        folder.resolve_attributes(&path, &entry.attributes, version, mode)?;
        for (child_name, child) in &entry.folders {
            let resolved = Self::resolve(&path, child_name, child, section, version, mode)?;
            folder.folders.insert(child_name.clone(), resolved);
        }
        Ok(Some(folder))
    }

    fn resolve_attributes(
        &mut self,
        path: &[&str],
        attributes: &IndexMap<String, AttributeVariants>,
        version: &ProviderVersion,
        mode: ConnectionMode,
    ) -> Result<(), KbError> {
        for (name, variants) in attributes {
            let active: Vec<&AttributeEntry> = variants
                .iter()
                .filter(|v| v.applies_to(version, mode))
                .collect();

            let entry = match active.as_slice() {
                [] => continue,
                [entry] => *entry,
                many => {
                    return Err(KbError::AmbiguousAttribute {
                        path: display_path(path),
                        name: name.clone(),
                        version: version.to_string(),
                        mode,
                        count: many.len(),
                    })
                }
            };

            let attribute = AttributeMetadata::from_entry(name, entry);
            self.provider_names
                .entry(attribute.provider_name.clone())
                .or_insert_with(|| name.clone());
            self.attributes.insert(name.clone(), attribute);
        }
        Ok(())
    }

    /// Model folder name (empty for the root)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Model section the folder belongs to
    #[inline]
    #[must_use]
    pub fn section(&self) -> ModelSection {
        self.section
    }

    /// Provider type name
    #[inline]
    #[must_use]
    pub fn provider_type(&self) -> &str {
        &self.provider_type
    }

    /// Cardinality kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ChildFolderKind {
        self.kind
    }

    /// Token carrying the instance name
    #[inline]
    #[must_use]
    pub fn name_token(&self) -> &str {
        &self.name_token
    }

    /// Naming rule for unbound instances
    #[inline]
    #[must_use]
    pub fn name_rule(&self) -> &NameRule {
        &self.name_rule
    }

    /// Collapsed provider level, if any
    #[inline]
    #[must_use]
    pub fn flattened(&self) -> Option<&FlattenedFolder> {
        self.flattened.as_ref()
    }

    /// True when the folder collapses an extra provider level
    #[inline]
    #[must_use]
    pub fn is_flattened(&self) -> bool {
        self.flattened.is_some()
    }

    /// Active attributes in declaration order
    pub fn attributes(&self) -> impl Iterator<Item = &AttributeMetadata> {
        self.attributes.values()
    }

    /// Attribute by model name
    #[inline]
    #[must_use]
    pub fn attribute(&self, model_name: &str) -> Option<&AttributeMetadata> {
        self.attributes.get(model_name)
    }

    /// Attribute by provider name
    #[must_use]
    pub fn attribute_by_provider_name(&self, provider_name: &str) -> Option<&AttributeMetadata> {
        self.provider_names
            .get(provider_name)
            .and_then(|model_name| self.attributes.get(model_name))
    }

    /// Available child folder by model name
    #[inline]
    #[must_use]
    pub fn folder(&self, name: &str) -> Option<&FolderMetadata> {
        self.folders.get(name).and_then(Option::as_ref)
    }

    /// True when a child folder of that name is declared for some version
    #[inline]
    #[must_use]
    pub fn declares_folder(&self, name: &str) -> bool {
        self.folders.contains_key(name)
    }

    /// Available child folders in declaration order
    pub fn folders(&self) -> impl Iterator<Item = &FolderMetadata> {
        self.folders.values().filter_map(Option::as_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_predicates_are_exclusive() {
        let kinds = [
            ChildFolderKind::None,
            ChildFolderKind::Single,
            ChildFolderKind::SingleUnpredictable,
            ChildFolderKind::Multiple,
            ChildFolderKind::MultipleWithTypeSubfolder,
        ];
        for kind in kinds {
            assert!(
                !(kind.supports_single() && kind.supports_multiple()),
                "{kind} is both single and multiple"
            );
        }
        assert!(ChildFolderKind::SingleUnpredictable.requires_name_token());
        assert!(!ChildFolderKind::Single.requires_name_token());
        assert!(ChildFolderKind::None.is_artificial_type_folder());
    }

    #[test]
    fn name_rule_parsing() {
        assert_eq!("generated".parse::<NameRule>().unwrap(), NameRule::Generated);
        assert_eq!(
            "token:DOMAIN".parse::<NameRule>().unwrap(),
            NameRule::Token("DOMAIN".to_string())
        );
        assert!("token:".parse::<NameRule>().is_err());
        assert!("random".parse::<NameRule>().is_err());
    }

    #[test]
    fn access_aliases() {
        let access: Access = serde_yaml::from_str("RO").unwrap();
        assert_eq!(access, Access::ReadOnly);
        assert!(Access::ViewOnly.is_read_only());
        assert!(!Access::ReadWrite.is_read_only());
    }

    #[test]
    fn set_method_declares_sub_object_type() {
        let entry: AttributeEntry = serde_yaml::from_str(
            "{ data_type: jarray, set_method: MBEAN.TargetMBean, provider_name: Targets }",
        )
        .unwrap();
        let attribute = AttributeMetadata::from_entry("Target", &entry);
        assert_eq!(attribute.provider_name, "Targets");
        assert_eq!(attribute.set_mbean_type.as_deref(), Some("TargetMBean"));
        assert_eq!(
            attribute.element_type,
            ElementType::Object("TargetMBean".to_string())
        );
        assert!(attribute.requires_merge());
    }
}
