//! Alias Knowledge Base
//!
//! Folder and attribute metadata, filtered per provider version and
//! connection mode.
//!
//! # Core Concepts
//!
//! - [`ProviderVersion`] / [`VersionRange`]: Release versions and intervals
//! - [`MetadataDocument`]: Raw, all-versions metadata
//! - [`MetadataSource`]: Supplier of the raw document (JSON or YAML)
//! - [`KnowledgeBase`]: Immutable view for one (version, mode)
//! - [`ChildFolderKind`]: Cardinality classification of folders
//! - [`KnowledgeBaseRegistry`]: One shared view per (version, mode)
//!
//! # Example
//!
//! ```rust
//! use alias_kb::{ConnectionMode, DocumentSource, KnowledgeBase};
//!
//! let source = DocumentSource::from_yaml_str(
//!     "inline",
//!     "folders:\n  Pool:\n    provider_type: Pool\n    attributes:\n      Size: { data_type: integer, default: 0 }\n",
//! )?;
//! let kb = KnowledgeBase::load(&source, "12.2.1".parse()?, ConnectionMode::Offline)?;
//! assert_eq!(kb.attribute(&["Pool"], "Size")?.provider_name, "Size");
//! # Ok::<(), alias_kb::KbError>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod document;
pub mod error;
pub mod knowledge_base;
pub mod metadata;
pub mod mode;
pub mod registry;
pub mod source;
pub mod version;

// Re-exports
pub use document::{AttributeEntry, AttributeVariants, FlattenedEntry, FolderEntry, MetadataDocument};
pub use error::{display_path, KbError};
pub use knowledge_base::{KnowledgeBase, NameStatus};
pub use metadata::{
    Access, AttributeMetadata, ChildFolderKind, FlattenedFolder, FolderMetadata, GetMethod,
    NameRule,
};
pub use mode::{ConnectionMode, ModeSet, ModelSection, PerMode, UnknownMode};
pub use registry::KnowledgeBaseRegistry;
pub use source::{DocumentSource, MetadataSource};
pub use version::{ProviderVersion, VersionError, VersionRange};

/// Prelude for common imports
pub mod prelude {
    pub use crate::knowledge_base::KnowledgeBase;
    pub use crate::metadata::{AttributeMetadata, ChildFolderKind, FolderMetadata};
    pub use crate::mode::{ConnectionMode, ModelSection};
    pub use crate::source::{DocumentSource, MetadataSource};
    pub use crate::version::{ProviderVersion, VersionRange};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
