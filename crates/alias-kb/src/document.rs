//! Raw metadata document
//!
//! The unfiltered, all-versions form of the metadata as read from a
//! [`MetadataSource`](crate::MetadataSource). Every entry may carry a version
//! range and a mode set; the [`KnowledgeBase`](crate::KnowledgeBase) filters
//! them once at load time.
//!
//! ```yaml
//! root_name_token: DOMAIN
//! attributes:
//!   AdminServerName: { data_type: string, default: AdminServer }
//! folders:
//!   Pool:
//!     provider_type: Pool
//!     kind: multiple
//!     attributes:
//!       Size: { data_type: integer, default: 0 }
//! ```

use alias_convert::{DataType, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::metadata::{Access, ChildFolderKind, GetMethod, NameRule};
use crate::mode::{ConnectionMode, ModeSet, ModelSection, PerMode};
use crate::version::{ProviderVersion, VersionRange};

fn default_root_name_token() -> String {
    "DOMAIN".to_string()
}

/// Complete metadata document, all versions and modes
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetadataDocument {
    /// Token naming the root object
    #[serde(default = "default_root_name_token")]
    pub root_name_token: String,

    /// Attributes of the root folder
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeVariants>,

    /// Top-level folders
    #[serde(default)]
    pub folders: IndexMap<String, FolderEntry>,
}

/// One folder entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FolderEntry {
    /// Model section, meaningful on top-level folders only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<ModelSection>,

    /// Versions this folder exists in (absent = all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionRange>,

    /// Modes this folder exists in
    #[serde(default)]
    pub modes: ModeSet,

    /// Provider type name
    pub provider_type: PerMode<String>,

    /// Cardinality kind
    #[serde(default)]
    pub kind: ChildFolderKind,

    /// Token carrying the instance name (defaults to the upper-cased folder name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_token: Option<String>,

    /// How a single instance derives its name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_rule: Option<PerMode<NameRule>>,

    /// Extra provider level collapsed into this folder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flattened: Option<FlattenedEntry>,

    /// Attributes by model name
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeVariants>,

    /// Child folders by model name
    #[serde(default)]
    pub folders: IndexMap<String, FolderEntry>,
}

impl FolderEntry {
    /// Check if the folder exists for `version` in `mode`
    #[must_use]
    pub fn applies_to(&self, version: &ProviderVersion, mode: ConnectionMode) -> bool {
        self.modes.contains(mode) && self.version.as_ref().map_or(true, |r| r.contains(version))
    }

    /// Name token for a folder entry stored under `model_name`
    #[must_use]
    pub fn token_name(&self, model_name: &str) -> String {
        self.name_token
            .clone()
            .unwrap_or_else(|| model_name.to_ascii_uppercase())
    }
}

/// Flattened provider level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlattenedEntry {
    /// Provider type of the collapsed level
    pub provider_type: PerMode<String>,

    /// How the collapsed level derives its instance name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name_rule: Option<PerMode<NameRule>>,
}

/// Attribute given as one entry or a list of version/mode variants
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeVariants {
    /// Single entry
    One(Box<AttributeEntry>),

    /// Several entries, at most one active per version and mode
    Many(Vec<AttributeEntry>),
}

impl AttributeVariants {
    /// Iterate over variants
    pub fn iter(&self) -> impl Iterator<Item = &AttributeEntry> {
        match self {
            Self::One(entry) => std::slice::from_ref(entry.as_ref()).iter(),
            Self::Many(entries) => entries.iter(),
        }
    }
}

/// One attribute variant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeEntry {
    /// Versions this variant applies to (absent = all)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<VersionRange>,

    /// Modes this variant applies to
    #[serde(default)]
    pub modes: ModeSet,

    /// Provider attribute name (defaults to the model name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,

    /// Declared data type
    pub data_type: DataType,

    /// Type used when reading from the provider, if different
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_type: Option<DataType>,

    /// Type preferred in the model document, if different
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_model_type: Option<DataType>,

    /// Access mode
    #[serde(default)]
    pub access: Access,

    /// Provider default value (absent = none)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Merge collection values with existing provider values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merge: Option<bool>,

    /// Value contains path tokens
    #[serde(default)]
    pub uses_path_tokens: bool,

    /// Changing the value requires a restart
    #[serde(default)]
    pub restart_required: bool,

    /// How the value is read back
    #[serde(default)]
    pub get_method: GetMethod,

    /// Provider type of the sub-object returned by the getter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns_type: Option<String>,

    /// Setter kind, `MBEAN.<Type>` for sub-object references
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set_method: Option<String>,

    /// Element type of typed arrays
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<String>,
}

impl AttributeEntry {
    /// Check if the variant applies to `version` in `mode`
    #[must_use]
    pub fn applies_to(&self, version: &ProviderVersion, mode: ConnectionMode) -> bool {
        self.modes.contains(mode) && self.version.as_ref().map_or(true, |r| r.contains(version))
    }
}
