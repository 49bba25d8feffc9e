//! Alias Core
//!
//! Translates between model vocabulary and provider vocabulary for one
//! (version, mode) knowledge base.
//!
//! # Core Concepts
//!
//! - [`Location`]: Position in the model tree with bound name tokens
//! - [`PathResolver`]: Provider addresses for a location
//! - [`AttributeTranslator`]: Attribute names and values in both directions
//! - [`Validator`]: Valid / invalid / version-invalid name checks
//! - [`Aliases`]: Facade bundling the three over one knowledge base
//! - [`AliasConfig`]: Version, mode, decryption, path tokens, merge policies
//!
//! # Example
//!
//! ```rust
//! use alias_convert::Value;
//! use alias_core::{Aliases, Location};
//! use alias_kb::{ConnectionMode, DocumentSource, KnowledgeBase};
//! use std::sync::Arc;
//!
//! let source = DocumentSource::from_yaml_str(
//!     "inline",
//!     "folders:\n  Pool:\n    provider_type: Pool\n    attributes:\n      Size: { data_type: integer, default: 0 }\n",
//! )?;
//! let kb = KnowledgeBase::load(&source, "12.2.1".parse()?, ConnectionMode::Offline)?;
//! let aliases = Aliases::new(Arc::new(kb));
//!
//! let mut location = Location::from_folders(["Pool"]);
//! location.bind_token("POOL", "pool-1");
//!
//! let written = aliases.model_to_provider(&location, "Size", &Value::from("5"), None)?;
//! assert_eq!(written.map(|a| a.value), Some(Value::Integer(5)));
//!
//! let read = aliases.provider_to_model(&location, "Size", Some(&Value::Integer(0)))?;
//! assert_eq!(read.and_then(|a| a.value), None);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod aliases;
pub mod config;
pub mod diagnostics;
pub mod encryption;
pub mod error;
pub mod location;
pub mod resolver;
pub mod tokens;
pub mod translator;
pub mod validator;

// Re-exports
pub use aliases::Aliases;
pub use config::AliasConfig;
pub use diagnostics::{Diagnostic, DiagnosticCode};
pub use encryption::{EncryptionConfig, PasswordDecryptor, PlainText};
pub use error::{AliasError, ConfigError, EncryptionError, Result};
pub use location::Location;
pub use resolver::{PathResolver, PLACEHOLDER_PREFIX};
pub use tokens::PathTokens;
pub use translator::{
    AttributeTranslator, ModelAttribute, ProviderAttribute, IGNORED_PROVIDER_ATTRIBUTES,
    PASSWORD_PLACEHOLDER,
};
pub use validator::{Validation, ValidationCode, Validator};

/// Prelude for common imports
pub mod prelude {
    pub use crate::aliases::Aliases;
    pub use crate::config::AliasConfig;
    pub use crate::error::{AliasError, Result};
    pub use crate::location::Location;
    pub use crate::validator::{Validation, ValidationCode};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
