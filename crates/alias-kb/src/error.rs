//! Knowledge base errors

use std::path::PathBuf;

use crate::mode::ConnectionMode;
use crate::version::VersionError;

/// Errors while loading or querying a knowledge base
#[derive(Debug, thiserror::Error)]
pub enum KbError {
    /// Folder never declared for any version
    #[error("folder not found: {path}")]
    FolderNotFound { path: String },

    /// Folder declared, but not for the active version and mode
    #[error("folder {path} is not available in version {version} ({mode} mode)")]
    FolderUnavailable {
        path: String,
        version: String,
        mode: ConnectionMode,
    },

    /// Attribute not active in the folder
    #[error("attribute '{name}' not found in folder {path}")]
    AttributeNotFound { path: String, name: String },

    /// Several variants of one attribute active at once
    #[error("attribute '{name}' in {path} has {count} variants active for version {version} ({mode} mode)")]
    AmbiguousAttribute {
        path: String,
        name: String,
        version: String,
        mode: ConnectionMode,
        count: usize,
    },

    /// JSON metadata document could not be parsed
    #[error("invalid JSON metadata in '{source_name}': {source}")]
    Json {
        source_name: String,
        #[source]
        source: serde_json::Error,
    },

    /// YAML metadata document could not be parsed
    #[error("invalid YAML metadata in '{source_name}': {source}")]
    Yaml {
        source_name: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// IO error reading a metadata document
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid version text
    #[error(transparent)]
    Version(#[from] VersionError),
}

impl KbError {
    /// Create folder-not-found error for `path`
    pub fn folder_not_found<S: AsRef<str>>(path: &[S]) -> Self {
        Self::FolderNotFound {
            path: display_path(path),
        }
    }

    /// Create attribute-not-found error
    pub fn attribute_not_found<S: AsRef<str>>(path: &[S], name: impl Into<String>) -> Self {
        Self::AttributeNotFound {
            path: display_path(path),
            name: name.into(),
        }
    }
}

/// Render folder names as `/A/B`, or `/` for the root
#[must_use]
pub fn display_path<S: AsRef<str>>(path: &[S]) -> String {
    if path.is_empty() {
        return "/".to_string();
    }
    path.iter().fold(String::new(), |mut out, segment| {
        out.push('/');
        out.push_str(segment.as_ref());
        out
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_path_forms() {
        assert_eq!(display_path::<&str>(&[]), "/");
        assert_eq!(display_path(&["JDBCSystemResource", "JdbcResource"]), "/JDBCSystemResource/JdbcResource");
    }

    #[test]
    fn error_messages() {
        let err = KbError::attribute_not_found(&["Pool"], "Colour");
        assert_eq!(err.to_string(), "attribute 'Colour' not found in folder /Pool");
    }
}
