//! Knowledge base
//!
//! A [`KnowledgeBase`] is the metadata view for one provider version and one
//! connection mode. It is filtered once when built and immutable afterwards,
//! so a single instance can be shared across threads behind an `Arc`.
//!
//! Besides the filtered view it keeps the raw document, which the validator
//! uses to tell a name that never existed from one that exists only in other
//! versions or modes.

use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

use crate::document::{AttributeVariants, FolderEntry, MetadataDocument};
use crate::error::{display_path, KbError};
use crate::metadata::{AttributeMetadata, FolderMetadata};
use crate::mode::{ConnectionMode, ModeSet, ModelSection};
use crate::source::MetadataSource;
use crate::version::{ProviderVersion, VersionRange};

/// Availability of a name across all versions and modes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameStatus {
    /// Available for the active version and mode
    Available,

    /// Declared, but only for other versions or modes
    Unavailable {
        /// Hull of the version ranges the name is declared for
        range: VersionRange,
        /// Modes the name is declared for
        modes: ModeSet,
    },

    /// Never declared
    Unknown,
}

/// Filtered metadata for one (version, mode)
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    version: ProviderVersion,
    mode: ConnectionMode,
    root: FolderMetadata,
    raw: Arc<MetadataDocument>,
}

struct RawScope<'a> {
    attributes: &'a IndexMap<String, AttributeVariants>,
    folders: &'a IndexMap<String, FolderEntry>,
}

impl KnowledgeBase {
    /// Load the view for `version` in `mode` from `source`
    ///
    /// # Errors
    /// Returns [`KbError`] if the source fails or the metadata is ambiguous
    /// for this view
    pub fn load(
        source: &dyn MetadataSource,
        version: ProviderVersion,
        mode: ConnectionMode,
    ) -> Result<Self, KbError> {
        debug!(source = source.name(), %version, %mode, "loading knowledge base");
        let raw = source.load()?;
        Self::from_document(raw, version, mode)
    }

    /// Build the view for `version` in `mode` from a parsed document
    ///
    /// # Errors
    /// Returns [`KbError::AmbiguousAttribute`] when several variants of one
    /// attribute are active at once
    pub fn from_document(
        raw: Arc<MetadataDocument>,
        version: ProviderVersion,
        mode: ConnectionMode,
    ) -> Result<Self, KbError> {
        let root = FolderMetadata::resolve_root(&raw, &version, mode)?;
        debug!(
            %version,
            %mode,
            top_level_folders = root.folders().count(),
            "knowledge base ready"
        );
        Ok(Self {
            version,
            mode,
            root,
            raw,
        })
    }

    /// Active provider version
    #[inline]
    #[must_use]
    pub fn version(&self) -> &ProviderVersion {
        &self.version
    }

    /// Active connection mode
    #[inline]
    #[must_use]
    pub fn mode(&self) -> ConnectionMode {
        self.mode
    }

    /// Token naming the root object
    #[inline]
    #[must_use]
    pub fn root_name_token(&self) -> &str {
        self.root.name_token()
    }

    /// Root folder (root attributes and top-level folders)
    #[inline]
    #[must_use]
    pub fn root(&self) -> &FolderMetadata {
        &self.root
    }

    /// Raw, unfiltered document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &MetadataDocument {
        &self.raw
    }

    /// Folder at `path`, `None` if absent from this view
    #[must_use]
    pub fn find_folder<S: AsRef<str>>(&self, path: &[S]) -> Option<&FolderMetadata> {
        path.iter()
            .try_fold(&self.root, |folder, name| folder.folder(name.as_ref()))
    }

    /// Folder at `path`
    ///
    /// # Errors
    /// - [`KbError::FolderUnavailable`] if declared only for other versions or modes
    /// - [`KbError::FolderNotFound`] if never declared
    pub fn folder<S: AsRef<str>>(&self, path: &[S]) -> Result<&FolderMetadata, KbError> {
        if let Some(folder) = self.find_folder(path) {
            return Ok(folder);
        }

        if self.raw_scope(path).is_some() {
            Err(KbError::FolderUnavailable {
                path: display_path(path),
                version: self.version.to_string(),
                mode: self.mode,
            })
        } else {
            Err(KbError::folder_not_found(path))
        }
    }

    /// True when `path` is declared for some version or mode
    #[must_use]
    pub fn declares_folder<S: AsRef<str>>(&self, path: &[S]) -> bool {
        self.raw_scope(path).is_some()
    }

    /// Attribute by model name in the folder at `path`
    ///
    /// # Errors
    /// Returns [`KbError`] if the folder or the attribute is absent
    pub fn attribute<S: AsRef<str>>(
        &self,
        path: &[S],
        model_name: &str,
    ) -> Result<&AttributeMetadata, KbError> {
        self.folder(path)?
            .attribute(model_name)
            .ok_or_else(|| KbError::attribute_not_found(path, model_name))
    }

    /// Attribute by provider name in the folder at `path`
    ///
    /// # Errors
    /// Returns [`KbError`] if the folder is absent
    pub fn attribute_by_provider_name<S: AsRef<str>>(
        &self,
        path: &[S],
        provider_name: &str,
    ) -> Result<Option<&AttributeMetadata>, KbError> {
        Ok(self.folder(path)?.attribute_by_provider_name(provider_name))
    }

    /// Names of available top-level folders in `section`
    #[must_use]
    pub fn top_level_folder_names(&self, section: ModelSection) -> Vec<&str> {
        self.root
            .folders()
            .filter(|f| f.section() == section)
            .map(FolderMetadata::name)
            .collect()
    }

    /// Classify `candidate` as a child folder of `parent` across all versions
    ///
    /// # Errors
    /// Returns [`KbError::FolderNotFound`] if `parent` was never declared
    pub fn classify_folder<S: AsRef<str>>(
        &self,
        parent: &[S],
        candidate: &str,
    ) -> Result<NameStatus, KbError> {
        let scope = self
            .raw_scope(parent)
            .ok_or_else(|| KbError::folder_not_found(parent))?;

        Ok(match scope.folders.get(candidate) {
            None => NameStatus::Unknown,
            Some(entry) if entry.applies_to(&self.version, self.mode) => NameStatus::Available,
            Some(entry) => NameStatus::Unavailable {
                range: entry.version.clone().unwrap_or_default(),
                modes: entry.modes,
            },
        })
    }

    /// Classify `candidate` as an attribute of `path` across all versions
    ///
    /// # Errors
    /// Returns [`KbError::FolderNotFound`] if `path` was never declared
    pub fn classify_attribute<S: AsRef<str>>(
        &self,
        path: &[S],
        candidate: &str,
    ) -> Result<NameStatus, KbError> {
        let scope = self
            .raw_scope(path)
            .ok_or_else(|| KbError::folder_not_found(path))?;

        let Some(variants) = scope.attributes.get(candidate) else {
            return Ok(NameStatus::Unknown);
        };

        if variants
            .iter()
            .any(|v| v.applies_to(&self.version, self.mode))
        {
            return Ok(NameStatus::Available);
        }

        let unbounded = VersionRange::unbounded();
        let ranges: Vec<&VersionRange> = variants
            .iter()
            .map(|v| v.version.as_ref().unwrap_or(&unbounded))
            .collect();
        let modes = variants
            .iter()
            .map(|v| v.modes)
            .reduce(ModeSet::union)
            .unwrap_or_default();

        Ok(NameStatus::Unavailable {
            range: VersionRange::hull(ranges).unwrap_or_default(),
            modes,
        })
    }

    fn raw_scope<S: AsRef<str>>(&self, path: &[S]) -> Option<RawScope<'_>> {
        let root = RawScope {
            attributes: &self.raw.attributes,
            folders: &self.raw.folders,
        };
        path.iter().try_fold(root, |scope, name| {
            scope.folders.get(name.as_ref()).map(|entry| RawScope {
                attributes: &entry.attributes,
                folders: &entry.folders,
            })
        })
    }
}
