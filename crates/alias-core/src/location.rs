//! Model locations
//!
//! A [`Location`] is a position in the model tree: an ordered list of model
//! folder names, each carrying the name-token bindings made while it was the
//! last segment. Popping a segment drops its bindings with it, so one
//! location can be reused while walking sibling folders.

use smallvec::SmallVec;
use std::fmt::{self, Display, Formatter};

use alias_kb::display_path;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Segment {
    folder: String,
    tokens: Vec<(String, String)>,
}

/// Position in the model tree with bound name tokens
///
/// Owned by one resolution in progress; share across threads only with
/// external synchronization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Location {
    segments: SmallVec<[Segment; 8]>,
    root_tokens: Vec<(String, String)>,
}

impl Location {
    /// Create empty location (the root)
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create location from folder names
    #[must_use]
    pub fn from_folders<I, S>(folders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut location = Self::new();
        location.append_all(folders);
        location
    }

    /// Descend into `folder`
    pub fn append(&mut self, folder: impl Into<String>) -> &mut Self {
        self.segments.push(Segment {
            folder: folder.into(),
            tokens: Vec::new(),
        });
        self
    }

    /// Descend through several folders
    pub fn append_all<I, S>(&mut self, folders: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for folder in folders {
            self.append(folder);
        }
        self
    }

    /// Ascend one folder, dropping its token bindings
    ///
    /// Returns the removed folder name, `None` at the root.
    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop().map(|s| s.folder)
    }

    /// Bind `token` to `value` on the last segment (or the root)
    ///
    /// Rebinding a token in the same segment replaces its value.
    pub fn bind_token(&mut self, token: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let token = token.into();
        let value = value.into();
        let tokens = match self.segments.last_mut() {
            Some(segment) => &mut segment.tokens,
            None => &mut self.root_tokens,
        };
        match tokens.iter_mut().find(|(name, _)| *name == token) {
            Some(slot) => slot.1 = value,
            None => tokens.push((token, value)),
        }
        self
    }

    /// Value of `token`, searching the innermost binding first
    #[must_use]
    pub fn token(&self, token: &str) -> Option<&str> {
        self.segments
            .iter()
            .rev()
            .flat_map(|s| s.tokens.iter())
            .chain(self.root_tokens.iter())
            .find(|(name, _)| name == token)
            .map(|(_, value)| value.as_str())
    }

    /// Folder names in order
    pub fn folders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| s.folder.as_str())
    }

    /// Folder names in order, collected
    #[must_use]
    pub fn folder_names(&self) -> Vec<&str> {
        self.folders().collect()
    }

    /// Last folder name, `None` at the root
    #[inline]
    #[must_use]
    pub fn last_folder(&self) -> Option<&str> {
        self.segments.last().map(|s| s.folder.as_str())
    }

    /// Number of segments
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// True at the root
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Copy of this location without its last segment
    #[must_use]
    pub fn parent(&self) -> Self {
        let mut parent = self.clone();
        parent.pop();
        parent
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&display_path(&self.folder_names()))
    }
}
