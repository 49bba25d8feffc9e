//! Error types for alias resolution
//!
//! Resolution failures are programmer or data errors: an unknown folder, an
//! unknown attribute, an unbound name token, a failed decryption. They are
//! returned as [`AliasError`] and never recovered internally. Each variant
//! maps to a stable [`DiagnosticCode`].

use alias_convert::ConvertError;
use alias_kb::{ChildFolderKind, KbError, VersionError};
use std::path::PathBuf;

use crate::diagnostics::{Diagnostic, DiagnosticCode};

/// Main alias error type
#[derive(Debug, thiserror::Error)]
pub enum AliasError {
    /// Knowledge base lookup or load failed
    #[error(transparent)]
    Kb(#[from] KbError),

    /// Required name token not bound
    #[error("name token {token} is not bound for {path}")]
    TokenUnbound { path: String, token: String },

    /// Location ends at a folder that needs a concrete type subfolder
    #[error("{path} requires a type subfolder before it can be resolved")]
    TypeSubfolderRequired { path: String },

    /// Cardinality predicate asked of an artificial type folder
    #[error("folder {path} is of kind {kind}, which does not answer '{question}'")]
    KindMismatch {
        path: String,
        kind: ChildFolderKind,
        question: &'static str,
    },

    /// Flattened-folder path requested for a plain folder
    #[error("folder {path} is not flattened")]
    NotFlattened { path: String },

    /// Provider attribute not recognized
    #[error("provider attribute '{name}' is not recognized in {path}")]
    UnknownProviderAttribute { path: String, name: String },

    /// Value could not be converted
    #[error("cannot convert attribute '{name}' in {path}: {source}")]
    Conversion {
        path: String,
        name: String,
        #[source]
        source: ConvertError,
    },

    /// Password could not be decrypted
    #[error("cannot decrypt attribute '{name}' in {path}: {source}")]
    Encryption {
        path: String,
        name: String,
        #[source]
        source: EncryptionError,
    },

    /// Filtered and raw metadata disagree
    #[error("metadata for {path} is inconsistent: {reason}")]
    Inconsistent { path: String, reason: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl AliasError {
    /// Stable diagnostic code of this error
    #[must_use]
    pub fn code(&self) -> DiagnosticCode {
        match self {
            Self::Kb(KbError::FolderNotFound { .. }) => DiagnosticCode::FolderNotFound,
            Self::Kb(KbError::FolderUnavailable { .. }) => DiagnosticCode::FolderUnavailable,
            Self::Kb(KbError::AttributeNotFound { .. }) => DiagnosticCode::AttributeNotFound,
            Self::Kb(KbError::AmbiguousAttribute { .. }) | Self::Inconsistent { .. } => {
                DiagnosticCode::MetadataInconsistent
            }
            Self::Kb(_) => DiagnosticCode::MetadataLoadFailed,
            Self::TokenUnbound { .. } => DiagnosticCode::NameTokenUnbound,
            Self::TypeSubfolderRequired { .. } => DiagnosticCode::TypeSubfolderRequired,
            Self::KindMismatch { .. } => DiagnosticCode::FolderKindMismatch,
            Self::NotFlattened { .. } => DiagnosticCode::FolderNotFlattened,
            Self::UnknownProviderAttribute { .. } => DiagnosticCode::ProviderAttributeNotFound,
            Self::Conversion { .. } => DiagnosticCode::ConversionFailed,
            Self::Encryption { .. } => DiagnosticCode::EncryptionFailed,
            Self::Config(_) => DiagnosticCode::ConfigInvalid,
        }
    }

    /// Code plus structured arguments
    #[must_use]
    pub fn diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::new(self.code());
        match self {
            Self::Kb(KbError::FolderNotFound { path }) | Self::TypeSubfolderRequired { path } | Self::NotFlattened { path } => {
                diagnostic.with_arg("path", path)
            }
            Self::Kb(KbError::FolderUnavailable {
                path,
                version,
                mode,
            }) => diagnostic
                .with_arg("path", path)
                .with_arg("version", version)
                .with_arg("mode", mode),
            Self::Kb(KbError::AttributeNotFound { path, name })
            | Self::UnknownProviderAttribute { path, name } => {
                diagnostic.with_arg("path", path).with_arg("name", name)
            }
            Self::TokenUnbound { path, token } => {
                diagnostic.with_arg("path", path).with_arg("token", token)
            }
            Self::KindMismatch {
                path,
                kind,
                question,
            } => diagnostic
                .with_arg("path", path)
                .with_arg("kind", kind)
                .with_arg("question", question),
            Self::Conversion { path, name, source } => diagnostic
                .with_arg("path", path)
                .with_arg("name", name)
                .with_arg("reason", source),
            Self::Encryption { path, name, source } => diagnostic
                .with_arg("path", path)
                .with_arg("name", name)
                .with_arg("reason", source),
            Self::Inconsistent { path, reason } => {
                diagnostic.with_arg("path", path).with_arg("reason", reason)
            }
            other => diagnostic.with_arg("reason", other),
        }
    }
}

/// Password decryption errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncryptionError {
    /// Decryption enabled without a passphrase
    #[error("encryption passphrase is not configured")]
    MissingPassphrase,

    /// Collaborator rejected the ciphertext or passphrase
    #[error("decryption failed: {0}")]
    DecryptionFailed(String),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error reading a config file
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Invalid provider version
    #[error(transparent)]
    Version(#[from] VersionError),

    /// Merge policy key not of the form `Folder/Attribute`
    #[error("merge policy key must be 'Folder/Attribute': '{0}'")]
    MergePolicyKey(String),

    /// Merge policy not registered
    #[error("merge policy for '{key}': {source}")]
    MergePolicy {
        key: String,
        #[source]
        source: ConvertError,
    },
}

/// Result alias for alias operations
pub type Result<T, E = AliasError> = std::result::Result<T, E>;
