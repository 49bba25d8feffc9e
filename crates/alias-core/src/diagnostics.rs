//! Diagnostic codes
//!
//! Every resolution failure and every validation outcome is identified by a
//! stable [`DiagnosticCode`] plus structured arguments. Rendering those into
//! user-facing text is left to the caller's message catalog.

use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Stable identifier of a diagnostic condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum DiagnosticCode {
    /// Folder never declared
    FolderNotFound,
    /// Folder declared only for other versions or modes
    FolderUnavailable,
    /// Model attribute not declared for the folder
    AttributeNotFound,
    /// Provider attribute not recognized for the folder
    ProviderAttributeNotFound,
    /// Required name token not bound in the location
    NameTokenUnbound,
    /// Location stops at a folder that needs a type subfolder
    TypeSubfolderRequired,
    /// Cardinality question asked of an artificial type folder
    FolderKindMismatch,
    /// Flattened-folder question asked of a plain folder
    FolderNotFlattened,
    /// Value could not be converted to the declared type
    ConversionFailed,
    /// Password could not be decrypted
    EncryptionFailed,
    /// Metadata disagrees with itself
    MetadataInconsistent,
    /// Metadata could not be loaded
    MetadataLoadFailed,
    /// Configuration rejected
    ConfigInvalid,
    /// Folder name valid
    FolderValid,
    /// Folder name unknown
    FolderInvalid,
    /// Folder name valid only in other versions or modes
    FolderVersionInvalid,
    /// Attribute name valid
    AttributeValid,
    /// Attribute name unknown
    AttributeInvalid,
    /// Attribute name valid only in other versions or modes
    AttributeVersionInvalid,
}

impl DiagnosticCode {
    /// Dotted code string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FolderNotFound => "alias.folder.not_found",
            Self::FolderUnavailable => "alias.folder.unavailable",
            Self::AttributeNotFound => "alias.attribute.not_found",
            Self::ProviderAttributeNotFound => "alias.attribute.provider_not_found",
            Self::NameTokenUnbound => "alias.location.token_unbound",
            Self::TypeSubfolderRequired => "alias.location.type_subfolder_required",
            Self::FolderKindMismatch => "alias.folder.kind_mismatch",
            Self::FolderNotFlattened => "alias.folder.not_flattened",
            Self::ConversionFailed => "alias.value.conversion_failed",
            Self::EncryptionFailed => "alias.value.decryption_failed",
            Self::MetadataInconsistent => "alias.metadata.inconsistent",
            Self::MetadataLoadFailed => "alias.metadata.load_failed",
            Self::ConfigInvalid => "alias.config.invalid",
            Self::FolderValid => "alias.validate.folder.valid",
            Self::FolderInvalid => "alias.validate.folder.invalid",
            Self::FolderVersionInvalid => "alias.validate.folder.version_invalid",
            Self::AttributeValid => "alias.validate.attribute.valid",
            Self::AttributeInvalid => "alias.validate.attribute.invalid",
            Self::AttributeVersionInvalid => "alias.validate.attribute.version_invalid",
        }
    }
}

impl From<DiagnosticCode> for &'static str {
    fn from(code: DiagnosticCode) -> Self {
        code.as_str()
    }
}

impl Display for DiagnosticCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Diagnostic code with structured arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Condition identifier
    pub code: DiagnosticCode,
    /// Named arguments in insertion order
    pub args: IndexMap<&'static str, String>,
}

impl Diagnostic {
    /// Create diagnostic without arguments
    #[inline]
    #[must_use]
    pub fn new(code: DiagnosticCode) -> Self {
        Self {
            code,
            args: IndexMap::new(),
        }
    }

    /// With argument
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, key: &'static str, value: impl ToString) -> Self {
        self.args.insert(key, value.to_string());
        self
    }

    /// Argument by key
    #[inline]
    #[must_use]
    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.code)?;
        for (i, (key, value)) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_renders_code_and_args() {
        let diagnostic = Diagnostic::new(DiagnosticCode::AttributeInvalid)
            .with_arg("path", "/Pool")
            .with_arg("name", "Colour");
        assert_eq!(
            diagnostic.to_string(),
            "alias.validate.attribute.invalid(path=/Pool, name=Colour)"
        );
        assert_eq!(diagnostic.arg("name"), Some("Colour"));
    }

    #[test]
    fn display_without_args() {
        assert_eq!(
            Diagnostic::new(DiagnosticCode::MetadataLoadFailed).to_string(),
            "alias.metadata.load_failed()"
        );
    }
}
