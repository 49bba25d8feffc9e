//! Merge policy registry
//!
//! Provides [`MergePolicyRegistry`] for naming merge policies and binding them
//! to specific folder attributes.

use std::collections::HashMap;
use std::sync::Arc;

use crate::convert::ConvertError;
use crate::data_type::DataType;
use crate::merge::{ArgumentFlags, ListUnion, MergePolicy, PropertiesByKey};

/// Registry of merge policies and per-attribute policy bindings
///
/// Attributes without a binding fall back on their data type: maps merge by
/// key, lists by ordered union.
#[derive(Debug, Default, Clone)]
pub struct MergePolicyRegistry {
    policies: HashMap<&'static str, Arc<dyn MergePolicy>>,
    bindings: HashMap<(String, String), &'static str>,
}

impl MergePolicyRegistry {
    /// Create new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create registry with built-in policies and bindings
    ///
    /// `ServerStart/Arguments` merges by argument flag.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(ListUnion::new()));
        registry.register(Arc::new(PropertiesByKey));
        registry.register(Arc::new(ArgumentFlags));
        registry.bindings.insert(
            ("ServerStart".to_string(), "Arguments".to_string()),
            "argument_flags",
        );
        registry
    }

    /// Register a policy under its own name
    pub fn register(&mut self, policy: Arc<dyn MergePolicy>) {
        self.policies.insert(policy.name(), policy);
    }

    /// Bind a registered policy to `folder`/`attribute`
    ///
    /// `folder` is the folder name (last location segment), not a path.
    ///
    /// # Errors
    /// Returns [`ConvertError::UnknownPolicy`] if no policy has that name
    pub fn bind(&mut self, folder: &str, attribute: &str, policy: &str) -> Result<(), ConvertError> {
        let (name, _) = self
            .policies
            .get_key_value(policy)
            .ok_or_else(|| ConvertError::UnknownPolicy(policy.to_string()))?;
        self.bindings
            .insert((folder.to_string(), attribute.to_string()), *name);
        Ok(())
    }

    /// Check if policy exists
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    /// Look up a policy by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn MergePolicy>> {
        self.policies.get(name).cloned()
    }

    /// List registered policy names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.policies.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Get number of registered policies
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Check if registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Select the policy for an attribute
    ///
    /// # Selection Logic
    /// - explicit binding for `folder`/`attribute`
    /// - map types → `properties_by_key`
    /// - list types → `list_union`, splitting on the type's delimiter
    /// - anything else → `None` (scalars are replaced, not merged)
    #[must_use]
    pub fn select(
        &self,
        folder: &str,
        attribute: &str,
        data_type: DataType,
    ) -> Option<Arc<dyn MergePolicy>> {
        if let Some(name) = self
            .bindings
            .get(&(folder.to_string(), attribute.to_string()))
        {
            return self.get(name);
        }

        if data_type.is_map() {
            return Some(self.get("properties_by_key").unwrap_or_else(|| Arc::new(PropertiesByKey)));
        }

        match data_type.delimiter() {
            Some(delimiter) => Some(Arc::new(ListUnion::new().with_delimiter(delimiter))),
            None if data_type.is_list() => {
                Some(self.get("list_union").unwrap_or_else(|| Arc::new(ListUnion::new())))
            }
            None => None,
        }
    }
}
