//! Declared attribute data types
//!
//! Provides [`DataType`], the closed set of types an attribute can declare,
//! and [`Delimiter`] for delimited-string lists.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Declared type of an attribute value
///
/// Parsed from metadata strings such as `integer`, `properties` or
/// `delimited_string[semicolon]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    /// Plain string
    String,

    /// 32-bit integer
    Integer,

    /// 64-bit integer
    Long,

    /// Floating point
    Double,

    /// Boolean
    Boolean,

    /// List of values
    List,

    /// List carried by the provider as one delimited string
    DelimitedString(Delimiter),

    /// Key/value properties map
    Properties,

    /// Password, possibly encrypted in the model
    Password,

    /// Homogeneous typed array
    TypedArray,

    /// Reference to a managed sub-object, carried by name
    Object,
}

impl DataType {
    /// True for list-shaped types (merged as lists)
    #[inline]
    #[must_use]
    pub fn is_list(self) -> bool {
        matches!(self, Self::List | Self::DelimitedString(_) | Self::TypedArray)
    }

    /// True for map-shaped types (merged by key)
    #[inline]
    #[must_use]
    pub fn is_map(self) -> bool {
        matches!(self, Self::Properties)
    }

    /// True for any collection type
    #[inline]
    #[must_use]
    pub fn is_collection(self) -> bool {
        self.is_list() || self.is_map()
    }

    /// Delimiter for delimited-string types
    #[inline]
    #[must_use]
    pub fn delimiter(self) -> Option<Delimiter> {
        match self {
            Self::DelimitedString(d) => Some(d),
            _ => None,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Long => f.write_str("long"),
            Self::Double => f.write_str("double"),
            Self::Boolean => f.write_str("boolean"),
            Self::List => f.write_str("list"),
            Self::DelimitedString(Delimiter::Comma) => f.write_str("delimited_string"),
            Self::DelimitedString(d) => write!(f, "delimited_string[{}]", d.name()),
            Self::Properties => f.write_str("properties"),
            Self::Password => f.write_str("password"),
            Self::TypedArray => f.write_str("array"),
            Self::Object => f.write_str("object"),
        }
    }
}

impl FromStr for DataType {
    type Err = UnknownDataType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if let Some(rest) = name.strip_prefix("delimited_string") {
            if rest.is_empty() {
                return Ok(Self::DelimitedString(Delimiter::Comma));
            }
            let inner = rest
                .strip_prefix('[')
                .and_then(|r| r.strip_suffix(']'))
                .ok_or_else(|| UnknownDataType(s.to_string()))?;
            return Delimiter::from_name(inner)
                .map(Self::DelimitedString)
                .ok_or_else(|| UnknownDataType(s.to_string()));
        }

        match name {
            "string" => Ok(Self::String),
            "integer" | "int" => Ok(Self::Integer),
            "long" => Ok(Self::Long),
            "double" => Ok(Self::Double),
            "boolean" => Ok(Self::Boolean),
            "list" => Ok(Self::List),
            "properties" | "dict" => Ok(Self::Properties),
            "password" => Ok(Self::Password),
            "array" | "jarray" => Ok(Self::TypedArray),
            "object" => Ok(Self::Object),
            _ => Err(UnknownDataType(s.to_string())),
        }
    }
}

impl TryFrom<String> for DataType {
    type Error = UnknownDataType;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<DataType> for String {
    fn from(t: DataType) -> Self {
        t.to_string()
    }
}

/// Unrecognized data type name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data type: '{0}'")]
pub struct UnknownDataType(pub String);

/// Delimiter of a delimited-string list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Delimiter {
    /// `,`
    #[default]
    Comma,

    /// `;`
    Semicolon,

    /// single space
    Space,

    /// platform path-list separator
    PathSeparator,
}

impl Delimiter {
    /// Separator text written between items
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Comma => ",",
            Self::Semicolon => ";",
            Self::Space => " ",
            Self::PathSeparator => {
                if cfg!(windows) {
                    ";"
                } else {
                    ":"
                }
            }
        }
    }

    /// Metadata name of the delimiter
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Comma => "comma",
            Self::Semicolon => "semicolon",
            Self::Space => "space",
            Self::PathSeparator => "path_separator",
        }
    }

    /// Parse a metadata delimiter name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "comma" => Some(Self::Comma),
            "semicolon" => Some(Self::Semicolon),
            "space" => Some(Self::Space),
            "path_separator" => Some(Self::PathSeparator),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_names() {
        assert_eq!("integer".parse::<DataType>().unwrap(), DataType::Integer);
        assert_eq!("jarray".parse::<DataType>().unwrap(), DataType::TypedArray);
        assert_eq!("properties".parse::<DataType>().unwrap(), DataType::Properties);
    }

    #[test]
    fn parses_delimited_variants() {
        assert_eq!(
            "delimited_string".parse::<DataType>().unwrap(),
            DataType::DelimitedString(Delimiter::Comma)
        );
        assert_eq!(
            "delimited_string[semicolon]".parse::<DataType>().unwrap(),
            DataType::DelimitedString(Delimiter::Semicolon)
        );
        assert!("delimited_string[tab]".parse::<DataType>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        let t = DataType::DelimitedString(Delimiter::PathSeparator);
        assert_eq!(t.to_string().parse::<DataType>().unwrap(), t);
    }

    #[test]
    fn unknown_name_is_error() {
        assert_eq!(
            "PyOrderedDict".parse::<DataType>(),
            Err(UnknownDataType("PyOrderedDict".to_string()))
        );
    }

    #[test]
    fn collection_classification() {
        assert!(DataType::List.is_list());
        assert!(DataType::TypedArray.is_collection());
        assert!(DataType::Properties.is_map());
        assert!(!DataType::Password.is_collection());
    }
}
