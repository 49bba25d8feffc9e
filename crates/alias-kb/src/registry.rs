//! Knowledge base registry
//!
//! Provides [`KnowledgeBaseRegistry`], which builds one [`KnowledgeBase`] per
//! (version, mode) on first request and hands out shared handles afterwards.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::KbError;
use crate::knowledge_base::KnowledgeBase;
use crate::mode::ConnectionMode;
use crate::source::MetadataSource;
use crate::version::ProviderVersion;

/// Cache of knowledge bases keyed by (version, mode)
#[derive(Debug, Clone)]
pub struct KnowledgeBaseRegistry {
    source: Arc<dyn MetadataSource>,
    cache: Arc<DashMap<(ProviderVersion, ConnectionMode), Arc<KnowledgeBase>>>,
}

impl KnowledgeBaseRegistry {
    /// Create registry over `source`
    #[must_use]
    pub fn new(source: Arc<dyn MetadataSource>) -> Self {
        Self {
            source,
            cache: Arc::new(DashMap::new()),
        }
    }

    /// Shared knowledge base for `version` in `mode`, loading it on first use
    ///
    /// Concurrent first requests for the same key may both load; the first
    /// insert wins and every caller receives that instance.
    ///
    /// # Errors
    /// Returns [`KbError`] if loading fails; failures are not cached
    pub fn get_or_load(
        &self,
        version: &ProviderVersion,
        mode: ConnectionMode,
    ) -> Result<Arc<KnowledgeBase>, KbError> {
        let key = (version.clone(), mode);
        if let Some(kb) = self.cache.get(&key) {
            return Ok(Arc::clone(kb.value()));
        }

        debug!(%version, %mode, "knowledge base cache miss");
        let kb = Arc::new(KnowledgeBase::load(self.source.as_ref(), version.clone(), mode)?);
        Ok(Arc::clone(self.cache.entry(key).or_insert(kb).value()))
    }

    /// Check if a view is cached
    #[inline]
    #[must_use]
    pub fn contains(&self, version: &ProviderVersion, mode: ConnectionMode) -> bool {
        self.cache.contains_key(&(version.clone(), mode))
    }

    /// Number of cached views
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if no view is cached
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Drop every cached view
    pub fn clear(&self) {
        self.cache.clear();
    }
}
