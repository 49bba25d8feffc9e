//! Path resolution
//!
//! [`PathResolver`] turns a [`Location`] into provider addresses. Each model
//! segment contributes up to two provider levels (a flattened level, then its
//! own level), each a provider type followed by an instance name:
//!
//! - `MULTIPLE` and `MULTIPLE_WITH_TYPE_SUBFOLDER` use the bound name token
//! - `SINGLE` derives its name from the folder's [`NameRule`]
//! - `SINGLE_UNPREDICTABLE` uses the bound token, or offline a placeholder when unbound
//! - `NONE` (artificial type folder) contributes nothing
//!
//! Placeholders are `NO_NAME_<n>`, where `n` counts earlier placeholders for
//! the same provider type along the location.

use alias_kb::{
    display_path, ChildFolderKind, ConnectionMode, FolderMetadata, KbError, KnowledgeBase,
    ModelSection, NameRule,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, Span};

use crate::error::{AliasError, Result};
use crate::location::Location;

/// Prefix of generated instance names
pub const PLACEHOLDER_PREFIX: &str = "NO_NAME_";

#[derive(Debug, Clone, PartialEq, Eq)]
struct Level {
    provider_type: String,
    name: Option<String>,
}

#[derive(Debug)]
struct ResolvedSegment<'a> {
    folder: &'a FolderMetadata,
    flattened: Option<Level>,
    own: Option<Level>,
}

impl ResolvedSegment<'_> {
    fn levels(&self) -> impl Iterator<Item = &Level> {
        self.flattened.iter().chain(self.own.iter())
    }
}

struct Walk<'l> {
    location: &'l Location,
    names: Vec<&'l str>,
    inherited: Option<String>,
    placeholders: HashMap<String, usize>,
}

impl Walk<'_> {
    fn path(&self, index: usize) -> String {
        display_path(&self.names[..=index])
    }

    fn placeholder(&mut self, provider_type: &str) -> String {
        let next = self.placeholders.entry(provider_type.to_string()).or_insert(0);
        let name = format!("{PLACEHOLDER_PREFIX}{next}");
        *next += 1;
        name
    }
}

/// Provider address computation over one knowledge base
#[derive(Debug, Clone)]
pub struct PathResolver {
    kb: Arc<KnowledgeBase>,
    span: Span,
}

impl PathResolver {
    /// Create resolver
    #[must_use]
    pub fn new(kb: Arc<KnowledgeBase>, span: Span) -> Self {
        Self { kb, span }
    }

    /// Knowledge base in use
    #[inline]
    #[must_use]
    pub fn knowledge_base(&self) -> &Arc<KnowledgeBase> {
        &self.kb
    }

    /// Token naming the root object
    #[inline]
    #[must_use]
    pub fn root_name_token(&self) -> &str {
        self.kb.root_name_token()
    }

    /// Token the caller must bind for the last segment
    ///
    /// `None` when the folder takes no instance name or derives it. At the
    /// root this is the root name token.
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is absent
    pub fn get_name_token(&self, location: &Location) -> Result<Option<String>> {
        if location.is_empty() {
            return Ok(Some(self.kb.root_name_token().to_string()));
        }
        let folder = self.folder(location)?;
        Ok(folder
            .kind()
            .requires_name_token()
            .then(|| folder.name_token().to_string()))
    }

    /// Provider path holding the attributes of the location's instance
    ///
    /// # Errors
    /// - [`AliasError::TypeSubfolderRequired`] if the last folder needs a type subfolder
    /// - [`AliasError::TokenUnbound`] if a required name token is not bound
    /// - [`AliasError::Kb`] if a folder is absent
    pub fn attributes_path(&self, location: &Location) -> Result<String> {
        self.ensure_not_type_parent(location)?;
        let segments = self.walk(location, false)?;
        let path = render(segments.iter().flat_map(ResolvedSegment::levels), false);
        debug!(parent: &self.span, %location, %path, "resolved attributes path");
        Ok(path)
    }

    /// Provider path listing the location's child folders
    ///
    /// # Errors
    /// As [`Self::attributes_path`]
    pub fn subfolders_path(&self, location: &Location) -> Result<String> {
        self.attributes_path(location)
    }

    /// Provider path listing the instances of the last folder
    ///
    /// The last folder's own name token may be unbound.
    ///
    /// # Errors
    /// - [`AliasError::TokenUnbound`] if an ancestor's token is not bound
    /// - [`AliasError::Kb`] if a folder is absent
    pub fn list_path(&self, location: &Location) -> Result<String> {
        let segments = self.walk(location, true)?;
        let segments = strip_type_folder(&segments);
        let path = render(segments.iter().flat_map(ResolvedSegment::levels), true);
        debug!(parent: &self.span, %location, %path, "resolved list path");
        Ok(path)
    }

    /// Provider path in which the last folder's instance is created
    ///
    /// # Errors
    /// As [`Self::list_path`]
    pub fn create_path(&self, location: &Location) -> Result<String> {
        let segments = self.walk(location, true)?;
        let segments = strip_type_folder(&segments);
        let path = match segments.split_last() {
            Some((last, parents)) => render(
                parents
                    .iter()
                    .flat_map(ResolvedSegment::levels)
                    .chain(last.flattened.iter()),
                false,
            ),
            None => "/".to_string(),
        };
        debug!(parent: &self.span, %location, %path, "resolved create path");
        Ok(path)
    }

    /// Provider path listing the flattened level of the last folder
    ///
    /// # Errors
    /// - [`AliasError::NotFlattened`] if the last folder is not flattened
    /// - otherwise as [`Self::list_path`]
    pub fn flattened_list_path(&self, location: &Location) -> Result<String> {
        let segments = self.walk(location, true)?;
        let (last, parents) = flattened_split(location, &segments)?;
        let flattened = last.flattened.iter().map(|l| Level {
            provider_type: l.provider_type.clone(),
            name: None,
        });
        let levels: Vec<Level> = parents
            .iter()
            .flat_map(ResolvedSegment::levels)
            .cloned()
            .chain(flattened)
            .collect();
        Ok(render(levels.iter(), false))
    }

    /// Provider path in which the flattened level of the last folder is created
    ///
    /// # Errors
    /// As [`Self::flattened_list_path`]
    pub fn flattened_create_path(&self, location: &Location) -> Result<String> {
        let segments = self.walk(location, true)?;
        let (_, parents) = flattened_split(location, &segments)?;
        Ok(render(parents.iter().flat_map(ResolvedSegment::levels), false))
    }

    /// Resolved instance name of the location
    ///
    /// Artificial type folders report their parent's instance name.
    ///
    /// # Errors
    /// As [`Self::attributes_path`]
    pub fn instance_name(&self, location: &Location) -> Result<String> {
        self.ensure_not_type_parent(location)?;
        let segments = self.walk(location, false)?;
        segments
            .iter()
            .rev()
            .find_map(|s| s.own.as_ref().and_then(|l| l.name.clone()))
            .or_else(|| location.token(self.kb.root_name_token()).map(str::to_string))
            .ok_or_else(|| AliasError::TokenUnbound {
                path: location.to_string(),
                token: self.kb.root_name_token().to_string(),
            })
    }

    /// Resolved name of the last folder's flattened level, `None` if not flattened
    ///
    /// # Errors
    /// As [`Self::list_path`]
    pub fn flattened_instance_name(&self, location: &Location) -> Result<Option<String>> {
        let segments = self.walk(location, true)?;
        Ok(segments
            .last()
            .and_then(|s| s.flattened.as_ref())
            .and_then(|l| l.name.clone()))
    }

    /// Provider type of the last folder
    ///
    /// `None` at the root and for folders that exist only in other versions
    /// or modes.
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder was never declared
    pub fn provider_type(&self, location: &Location) -> Result<Option<String>> {
        if location.is_empty() {
            return Ok(None);
        }
        let names = location.folder_names();
        match self.kb.find_folder(&names) {
            Some(folder) => Ok(Some(folder.provider_type().to_string())),
            None if self.kb.declares_folder(&names) => Ok(None),
            None => Err(KbError::folder_not_found(&names).into()),
        }
    }

    /// Provider type of the last folder's flattened level, `None` if not flattened
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is absent
    pub fn flattened_provider_type(&self, location: &Location) -> Result<Option<String>> {
        Ok(self
            .folder(location)?
            .flattened()
            .map(|f| f.provider_type.clone()))
    }

    /// True when the last folder collapses an extra provider level
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is absent
    pub fn is_flattened(&self, location: &Location) -> Result<bool> {
        Ok(self.folder(location)?.is_flattened())
    }

    /// True when the last folder supports several instances
    ///
    /// # Errors
    /// Returns [`AliasError::KindMismatch`] for an artificial type folder
    pub fn supports_multiple_instances(&self, location: &Location) -> Result<bool> {
        Ok(self
            .answerable_kind(location, "supports multiple instances")?
            .supports_multiple())
    }

    /// True when the last folder has exactly one instance
    ///
    /// # Errors
    /// Returns [`AliasError::KindMismatch`] for an artificial type folder
    pub fn supports_single_instance(&self, location: &Location) -> Result<bool> {
        Ok(self
            .answerable_kind(location, "supports a single instance")?
            .supports_single())
    }

    /// True when the last folder's single instance name is unpredictable offline
    ///
    /// # Errors
    /// Returns [`AliasError::KindMismatch`] for an artificial type folder
    pub fn requires_unpredictable_single_name_handling(&self, location: &Location) -> Result<bool> {
        Ok(self
            .answerable_kind(location, "requires unpredictable single name handling")?
            .requires_unpredictable_single_name_handling())
    }

    /// True when the last folder needs a type subfolder before resolution
    ///
    /// # Errors
    /// Returns [`AliasError::KindMismatch`] for an artificial type folder
    pub fn requires_artificial_type_subfolder_handling(&self, location: &Location) -> Result<bool> {
        Ok(self
            .answerable_kind(location, "requires artificial type subfolder handling")?
            .requires_artificial_type_subfolder_handling())
    }

    /// True when the last folder is an artificial type folder
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is absent
    pub fn is_artificial_type_folder(&self, location: &Location) -> Result<bool> {
        Ok(self.folder(location)?.kind().is_artificial_type_folder())
    }

    /// Version-independent model path, `<section>:/Folder/name/...`
    ///
    /// Instance names appear only after folders that support several
    /// instances, and only when bound.
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if a folder is absent
    pub fn model_folder_path(&self, location: &Location) -> Result<String> {
        let chain = self.chain(location)?;
        let section = chain
            .first()
            .map_or(ModelSection::Topology, |f| f.section());

        let mut path = format!("{section}:");
        for folder in &chain {
            path.push('/');
            path.push_str(folder.name());
            if folder.kind().supports_multiple() {
                if let Some(name) = location.token(folder.name_token()) {
                    path.push('/');
                    path.push_str(name);
                }
            }
        }
        if chain.is_empty() {
            path.push('/');
        }
        Ok(path)
    }

    /// Model names of the available child folders
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is absent
    pub fn model_subfolder_names(&self, location: &Location) -> Result<Vec<String>> {
        Ok(self
            .folder(location)?
            .folders()
            .map(|f| f.name().to_string())
            .collect())
    }

    /// Model names of the available top-level folders in `section`
    #[must_use]
    pub fn model_top_level_folder_names(&self, section: ModelSection) -> Vec<String> {
        self.kb
            .top_level_folder_names(section)
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Model name of the child folder with provider type `provider_name`
    ///
    /// Matches the child's own provider type or its flattened type.
    ///
    /// # Errors
    /// Returns [`AliasError::Kb`] if the folder is absent
    pub fn model_subfolder_name(
        &self,
        location: &Location,
        provider_name: &str,
    ) -> Result<Option<String>> {
        Ok(self
            .folder(location)?
            .folders()
            .find(|f| {
                f.provider_type() == provider_name
                    || f.flattened().is_some_and(|flat| flat.provider_type == provider_name)
            })
            .map(|f| f.name().to_string()))
    }

    fn folder(&self, location: &Location) -> Result<&FolderMetadata> {
        Ok(self.kb.folder(&location.folder_names())?)
    }

    fn chain(&self, location: &Location) -> Result<Vec<&FolderMetadata>> {
        let names = location.folder_names();
        (0..names.len())
            .map(|i| self.kb.folder(&names[..=i]).map_err(AliasError::from))
            .collect()
    }

    fn answerable_kind(&self, location: &Location, question: &'static str) -> Result<ChildFolderKind> {
        let kind = self.folder(location)?.kind();
        if kind.is_artificial_type_folder() {
            return Err(AliasError::KindMismatch {
                path: location.to_string(),
                kind,
                question,
            });
        }
        Ok(kind)
    }

    fn ensure_not_type_parent(&self, location: &Location) -> Result<()> {
        if location.is_empty() {
            return Ok(());
        }
        if self.folder(location)?.kind().requires_artificial_type_subfolder_handling() {
            return Err(AliasError::TypeSubfolderRequired {
                path: location.to_string(),
            });
        }
        Ok(())
    }

    fn walk<'a>(&'a self, location: &Location, allow_unbound_last: bool) -> Result<Vec<ResolvedSegment<'a>>> {
        let chain = self.chain(location)?;
        let mode = self.kb.mode();
        let root_token = self.kb.root_name_token();

        let mut walk = Walk {
            location,
            names: location.folder_names(),
            inherited: location.token(root_token).map(str::to_string),
            placeholders: HashMap::new(),
        };
        let last = chain.len().saturating_sub(1);
        let mut resolved = Vec::with_capacity(chain.len());

        for (index, folder) in chain.into_iter().enumerate() {
            let may_be_unbound = allow_unbound_last && index == last;

            let flattened = match folder.flattened() {
                Some(flat) => {
                    let name = self.derive_name(&mut walk, index, &flat.name_rule, &flat.provider_type)?;
                    Some(Level {
                        provider_type: flat.provider_type.clone(),
                        name: Some(name),
                    })
                }
                None => None,
            };

            let own = match (folder.kind(), mode) {
                (ChildFolderKind::None, _) => None,
                (ChildFolderKind::SingleUnpredictable, ConnectionMode::Offline) => {
                    let name = match walk.location.token(folder.name_token()) {
                        Some(bound) => {
                            walk.inherited = Some(bound.to_string());
                            bound.to_string()
                        }
                        None => walk.placeholder(folder.provider_type()),
                    };
                    Some(Level {
                        provider_type: folder.provider_type().to_string(),
                        name: Some(name),
                    })
                }
                (ChildFolderKind::Single, _) => {
                    let name =
                        self.derive_name(&mut walk, index, folder.name_rule(), folder.provider_type())?;
                    Some(Level {
                        provider_type: folder.provider_type().to_string(),
                        name: Some(name),
                    })
                }
                _ => {
                    let name = walk.location.token(folder.name_token()).map(str::to_string);
                    if name.is_none() && !may_be_unbound {
                        return Err(AliasError::TokenUnbound {
                            path: walk.path(index),
                            token: folder.name_token().to_string(),
                        });
                    }
                    if let Some(name) = &name {
                        walk.inherited = Some(name.clone());
                    }
                    Some(Level {
                        provider_type: folder.provider_type().to_string(),
                        name,
                    })
                }
            };

            resolved.push(ResolvedSegment {
                folder,
                flattened,
                own,
            });
        }
        Ok(resolved)
    }

    fn derive_name(
        &self,
        walk: &mut Walk<'_>,
        index: usize,
        rule: &NameRule,
        provider_type: &str,
    ) -> Result<String> {
        match rule {
            NameRule::Generated => Ok(walk.placeholder(provider_type)),
            NameRule::Inherit => walk.inherited.clone().ok_or_else(|| AliasError::TokenUnbound {
                path: walk.path(index),
                token: self.kb.root_name_token().to_string(),
            }),
            NameRule::Token(token) => {
                let name = walk
                    .location
                    .token(token)
                    .map(str::to_string)
                    .ok_or_else(|| AliasError::TokenUnbound {
                        path: walk.path(index),
                        token: token.clone(),
                    })?;
                walk.inherited = Some(name.clone());
                Ok(name)
            }
        }
    }
}

fn flattened_split<'s, 'a>(
    location: &Location,
    segments: &'s [ResolvedSegment<'a>],
) -> Result<(&'s ResolvedSegment<'a>, &'s [ResolvedSegment<'a>])> {
    segments
        .split_last()
        .filter(|(last, _)| last.flattened.is_some())
        .ok_or_else(|| AliasError::NotFlattened {
            path: location.to_string(),
        })
}

fn strip_type_folder<'s, 'a>(segments: &'s [ResolvedSegment<'a>]) -> &'s [ResolvedSegment<'a>] {
    match segments.split_last() {
        Some((last, parents)) if last.folder.kind().is_artificial_type_folder() => parents,
        _ => segments,
    }
}

fn render<'a>(levels: impl Iterator<Item = &'a Level>, drop_last_name: bool) -> String {
    let levels: Vec<&Level> = levels.collect();
    let mut path = String::new();
    for (i, level) in levels.iter().enumerate() {
        path.push('/');
        path.push_str(&level.provider_type);
        let is_last = i + 1 == levels.len();
        if let Some(name) = level.name.as_deref().filter(|_| !(drop_last_name && is_last)) {
            path.push('/');
            path.push_str(name);
        }
    }
    if path.is_empty() {
        path.push('/');
    }
    path
}
