//! Alias Value Conversion
//!
//! Attribute values, declared data types, type conversion and merge policies
//! shared by the knowledge base and the resolver.
//!
//! # Core Concepts
//!
//! - [`Value`]: Dynamic attribute value in either vocabulary
//! - [`DataType`]: Declared attribute type, parsed from metadata
//! - [`convert`]: Pure conversion of a value to a declared type
//! - [`MergePolicy`]: Combining a model value with an existing provider value
//! - [`MergePolicyRegistry`]: Policy lookup and per-attribute bindings
//!
//! # Example
//!
//! ```rust
//! use alias_convert::{convert, DataType, Value};
//!
//! let port = convert(DataType::Integer, &Value::string("7001")).unwrap();
//! assert_eq!(port, Value::Integer(7001));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod convert;
pub mod data_type;
pub mod merge;
pub mod registry;
pub mod value;

// Re-exports
pub use convert::{convert, convert_with, to_boolean, to_list, to_properties, typed_eq, ConvertError, ConvertOptions};
pub use data_type::{DataType, Delimiter, UnknownDataType};
pub use merge::{ArgumentFlags, ListUnion, MergePolicy, PropertiesByKey};
pub use registry::MergePolicyRegistry;
pub use value::{ElementType, TypedArray, Value};

/// Prelude for common imports
pub mod prelude {
    pub use crate::convert::{convert, convert_with, ConvertError, ConvertOptions};
    pub use crate::data_type::{DataType, Delimiter};
    pub use crate::merge::MergePolicy;
    pub use crate::registry::MergePolicyRegistry;
    pub use crate::value::{ElementType, Value};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
