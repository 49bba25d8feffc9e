//! Name validation
//!
//! Plain lookups collapse "never existed" and "exists in other versions".
//! [`Validator`] consults the unfiltered metadata to tell them apart.

use alias_kb::{KnowledgeBase, ModeSet, NameStatus, VersionRange};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;
use tracing::{debug, Span};

use crate::diagnostics::{Diagnostic, DiagnosticCode};
use crate::error::{AliasError, Result};
use crate::location::Location;

/// Validation outcome
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationCode {
    /// Available in the active version and mode
    Valid,

    /// Unknown in every version
    Invalid,

    /// Known, but only outside the active version or mode
    VersionInvalid {
        /// Hull of the version ranges declaring the name
        range: VersionRange,
        /// Modes declaring the name
        modes: ModeSet,
    },
}

impl ValidationCode {
    /// True for [`ValidationCode::Valid`]
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl Display for ValidationCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid => f.write_str("VALID"),
            Self::Invalid => f.write_str("INVALID"),
            Self::VersionInvalid { .. } => f.write_str("VERSION_INVALID"),
        }
    }
}

/// Validation result with its explanation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validation {
    /// Outcome
    pub code: ValidationCode,
    /// Diagnostic explaining the outcome
    pub explanation: Diagnostic,
}

#[derive(Debug, Clone, Copy)]
enum NameKind {
    Folder,
    Attribute,
}

impl NameKind {
    fn codes(self) -> [DiagnosticCode; 3] {
        match self {
            Self::Folder => [
                DiagnosticCode::FolderValid,
                DiagnosticCode::FolderInvalid,
                DiagnosticCode::FolderVersionInvalid,
            ],
            Self::Attribute => [
                DiagnosticCode::AttributeValid,
                DiagnosticCode::AttributeInvalid,
                DiagnosticCode::AttributeVersionInvalid,
            ],
        }
    }
}

/// Folder and attribute name validator
#[derive(Debug, Clone)]
pub struct Validator {
    kb: Arc<KnowledgeBase>,
    span: Span,
}

impl Validator {
    /// Create validator
    #[must_use]
    pub fn new(kb: Arc<KnowledgeBase>, span: Span) -> Self {
        Self { kb, span }
    }

    /// Validate `candidate` as a child folder of `location`
    ///
    /// # Errors
    /// - [`AliasError::Kb`] if `location` is not available
    /// - [`AliasError::Inconsistent`] if the metadata views disagree
    pub fn validate_folder_name(&self, location: &Location, candidate: &str) -> Result<Validation> {
        let names = location.folder_names();
        let parent = self.kb.folder(&names)?;
        let status = self.kb.classify_folder(&names, candidate)?;
        let present = parent.folder(candidate).is_some();
        self.finish(location, candidate, NameKind::Folder, status, present)
    }

    /// Validate `candidate` as an attribute of `location`
    ///
    /// # Errors
    /// - [`AliasError::Kb`] if `location` is not available
    /// - [`AliasError::Inconsistent`] if the metadata views disagree
    pub fn validate_attribute_name(&self, location: &Location, candidate: &str) -> Result<Validation> {
        let names = location.folder_names();
        let folder = self.kb.folder(&names)?;
        let status = self.kb.classify_attribute(&names, candidate)?;
        let present = folder.attribute(candidate).is_some();
        self.finish(location, candidate, NameKind::Attribute, status, present)
    }

    fn finish(
        &self,
        location: &Location,
        candidate: &str,
        kind: NameKind,
        status: NameStatus,
        present: bool,
    ) -> Result<Validation> {
        let [valid, invalid, version_invalid] = kind.codes();
        let path = location.to_string();

        let Some(code) = outcome(status, present) else {
            return Err(AliasError::Inconsistent {
                path,
                reason: format!("'{candidate}' disagrees between the filtered and unfiltered metadata"),
            });
        };

        let explanation = match &code {
            ValidationCode::Valid => Diagnostic::new(valid),
            ValidationCode::Invalid => Diagnostic::new(invalid),
            ValidationCode::VersionInvalid { range, modes } => Diagnostic::new(version_invalid)
                .with_arg("version", self.kb.version())
                .with_arg("mode", self.kb.mode())
                .with_arg("valid_range", range)
                .with_arg("valid_modes", modes),
        }
        .with_arg("path", &path)
        .with_arg("name", candidate);

        debug!(parent: &self.span, %location, candidate, code = %code, "validated name");
        Ok(Validation { code, explanation })
    }
}

/// Validation code for a raw classification and the filtered view's answer,
/// `None` when the two disagree
fn outcome(status: NameStatus, present: bool) -> Option<ValidationCode> {
    match (status, present) {
        (NameStatus::Available, true) => Some(ValidationCode::Valid),
        (NameStatus::Unknown, false) => Some(ValidationCode::Invalid),
        (NameStatus::Unavailable { range, modes }, false) => {
            Some(ValidationCode::VersionInvalid { range, modes })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alias_kb::{ConnectionMode, DocumentSource, ProviderVersion};

    const DOC: &str = r#"
folders:
  Pool:
    provider_type: Pool
    attributes:
      Size: { data_type: integer }
      Legacy: { data_type: string, version: "[10.0,12.0)" }
    folders:
      Cache:
        version: "[10.0,12.0)"
        provider_type: Cache
"#;

    fn validator(version: &str) -> Validator {
        let source = DocumentSource::from_yaml_str("test", DOC).unwrap();
        let version: ProviderVersion = version.parse().unwrap();
        let kb = KnowledgeBase::load(&source, version, ConnectionMode::Offline).unwrap();
        Validator::new(Arc::new(kb), Span::none())
    }

    fn pool() -> Location {
        Location::from_folders(["Pool"])
    }

    #[test]
    fn three_way_attribute_validation() {
        let validator = validator("13.0");
        assert_eq!(validator.validate_attribute_name(&pool(), "Size").unwrap().code, ValidationCode::Valid);
        assert_eq!(validator.validate_attribute_name(&pool(), "Colour").unwrap().code, ValidationCode::Invalid);

        let legacy = validator.validate_attribute_name(&pool(), "Legacy").unwrap();
        assert!(matches!(
            legacy.code,
            ValidationCode::VersionInvalid { ref range, .. } if range.to_string() == "[10.0,12.0)"
        ));
        assert_eq!(legacy.explanation.code, DiagnosticCode::AttributeVersionInvalid);
        assert_eq!(legacy.explanation.arg("valid_range"), Some("[10.0,12.0)"));
        assert_eq!(legacy.explanation.arg("version"), Some("13.0"));
    }

    #[test]
    fn folder_validation_follows_version() {
        assert!(validator("11.0").validate_folder_name(&pool(), "Cache").unwrap().code.is_valid());
        let result = validator("13.0").validate_folder_name(&pool(), "Cache").unwrap();
        assert_eq!(result.code.to_string(), "VERSION_INVALID");
        assert_eq!(result.explanation.arg("name"), Some("Cache"));
    }

    #[test]
    fn disagreeing_views_have_no_outcome() {
        assert_eq!(outcome(NameStatus::Available, false), None);
        assert_eq!(outcome(NameStatus::Unknown, true), None);
        let unavailable = NameStatus::Unavailable {
            range: VersionRange::unbounded(),
            modes: ModeSet::Online,
        };
        assert_eq!(outcome(unavailable, true), None);
        assert_eq!(outcome(NameStatus::Available, true), Some(ValidationCode::Valid));
    }

    #[test]
    fn unknown_parent_is_an_error() {
        let location = Location::from_folders(["Nope"]);
        assert!(validator("12.2.1").validate_folder_name(&location, "Cache").is_err());
    }
}
