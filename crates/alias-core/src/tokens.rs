//! Path tokens
//!
//! Attributes flagged `uses_path_tokens` may carry logical placeholders such
//! as `@@DOMAIN_HOME@@/lib`. [`PathTokens`] resolves them before a value is
//! written and restores them when a value is read back.

use alias_convert::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Path token table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathTokens {
    tokens: IndexMap<String, String>,
}

impl PathTokens {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With token; `name` may be given bare (`DOMAIN_HOME`) or wrapped (`@@DOMAIN_HOME@@`)
    #[must_use]
    pub fn with_token(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert token
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.tokens.insert(Self::wrap(name), value.into());
    }

    /// Replacement of a token
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.tokens.get(&Self::wrap(name)).map(String::as_str)
    }

    /// Number of tokens
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// True when no token is defined
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Replace every token in `text` with its value
    #[must_use]
    pub fn resolve(&self, text: &str) -> String {
        self.tokens
            .iter()
            .fold(text.to_string(), |acc, (token, value)| acc.replace(token, value))
    }

    /// Replace token values in `text` with their tokens, longest value first
    ///
    /// A value is replaced only where it ends a path component: at the end of
    /// `text` or before a path or list separator.
    #[must_use]
    pub fn tokenize(&self, text: &str) -> String {
        let mut by_length: Vec<(&String, &String)> = self
            .tokens
            .iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        by_length.sort_by(|a, b| b.1.len().cmp(&a.1.len()));

        by_length
            .into_iter()
            .fold(text.to_string(), |acc, (token, value)| {
                replace_at_boundaries(&acc, value, token)
            })
    }

    /// [`Self::resolve`] applied to every string inside `value`
    #[must_use]
    pub fn resolve_value(&self, value: &Value) -> Value {
        value.map_strings(&|s| self.resolve(s))
    }

    /// [`Self::tokenize`] applied to every string inside `value`
    #[must_use]
    pub fn tokenize_value(&self, value: &Value) -> Value {
        value.map_strings(&|s| self.tokenize(s))
    }

    fn wrap(name: &str) -> String {
        if name.starts_with("@@") && name.ends_with("@@") && name.len() > 4 {
            name.to_string()
        } else {
            format!("@@{name}@@")
        }
    }
}

fn is_boundary(c: char) -> bool {
    matches!(c, '/' | '\\' | ':' | ';')
}

fn replace_at_boundaries(text: &str, value: &str, token: &str) -> String {
    let value_closed = value.ends_with(is_boundary);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(value) {
        let end = pos + value.len();
        let closed = value_closed || rest[end..].chars().next().map_or(true, is_boundary);
        out.push_str(&rest[..pos]);
        out.push_str(if closed { token } else { &rest[pos..end] });
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}
