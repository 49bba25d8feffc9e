//! Metadata sources
//!
//! Provides the [`MetadataSource`] trait through which a knowledge base reads
//! its raw document, and [`DocumentSource`] for JSON and YAML text.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;

use crate::document::MetadataDocument;
use crate::error::KbError;

/// Supplier of the raw, all-versions metadata document
pub trait MetadataSource: Send + Sync + Debug {
    /// Source name (for diagnostics)
    fn name(&self) -> &str;

    /// Read the document
    ///
    /// # Errors
    /// Returns [`KbError`] if the document cannot be read or parsed
    fn load(&self) -> Result<Arc<MetadataDocument>, KbError>;
}

/// In-memory metadata document
#[derive(Debug, Clone)]
pub struct DocumentSource {
    name: String,
    document: Arc<MetadataDocument>,
}

impl DocumentSource {
    /// Wrap an already parsed document
    #[must_use]
    pub fn new(name: impl Into<String>, document: MetadataDocument) -> Self {
        Self {
            name: name.into(),
            document: Arc::new(document),
        }
    }

    /// Parse a JSON document
    ///
    /// # Errors
    /// Returns [`KbError::Json`] on malformed input
    pub fn from_json_str(name: impl Into<String>, text: &str) -> Result<Self, KbError> {
        let name = name.into();
        let document = serde_json::from_str(text).map_err(|source| KbError::Json {
            source_name: name.clone(),
            source,
        })?;
        Ok(Self::new(name, document))
    }

    /// Parse a YAML document
    ///
    /// # Errors
    /// Returns [`KbError::Yaml`] on malformed input
    pub fn from_yaml_str(name: impl Into<String>, text: &str) -> Result<Self, KbError> {
        let name = name.into();
        let document = serde_yaml::from_str(text).map_err(|source| KbError::Yaml {
            source_name: name.clone(),
            source,
        })?;
        Ok(Self::new(name, document))
    }

    /// Read a document file, choosing the format by extension
    ///
    /// `.json` files are parsed as JSON, anything else as YAML.
    ///
    /// # Errors
    /// Returns [`KbError::Io`] or a parse error
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, KbError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| KbError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path.display().to_string();

        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(name, &text),
            _ => Self::from_yaml_str(name, &text),
        }
    }

    /// Borrow the parsed document
    #[inline]
    #[must_use]
    pub fn document(&self) -> &MetadataDocument {
        &self.document
    }
}

impl MetadataSource for DocumentSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&self) -> Result<Arc<MetadataDocument>, KbError> {
        Ok(Arc::clone(&self.document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_and_yaml_agree() {
        let json = DocumentSource::from_json_str(
            "inline.json",
            r#"{"folders": {"Pool": {"provider_type": "Pool", "kind": "multiple"}}}"#,
        )
        .unwrap();
        let yaml = DocumentSource::from_yaml_str(
            "inline.yaml",
            "folders:\n  Pool:\n    provider_type: Pool\n    kind: multiple\n",
        )
        .unwrap();

        assert_eq!(
            json.document().folders.keys().collect::<Vec<_>>(),
            yaml.document().folders.keys().collect::<Vec<_>>()
        );
        assert_eq!(json.name(), "inline.json");
    }

    #[test]
    fn malformed_yaml_names_source() {
        let err = DocumentSource::from_yaml_str("broken.yaml", "folders: [").unwrap_err();
        assert!(err.to_string().contains("broken.yaml"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = DocumentSource::from_path("/nonexistent/aliases.yaml").unwrap_err();
        assert!(matches!(err, KbError::Io { .. }));
    }
}
