//! Attribute values
//!
//! Provides [`Value`], the dynamic value carried by model and provider
//! attributes, and [`TypedArray`] for homogeneous provider arrays.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt::{self, Display, Formatter};

use crate::convert::ConvertError;

/// Attribute value in either the model or the provider vocabulary
///
/// Absence of a value is expressed as `Option<Value>` by callers, never as a
/// variant here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Boolean value
    Bool(bool),

    /// 32-bit integer
    Integer(i32),

    /// 64-bit integer
    Long(i64),

    /// Floating point value
    Double(f64),

    /// Plain string (also passwords and object references)
    String(String),

    /// Ordered list of values
    List(Vec<Value>),

    /// Key/value properties, insertion ordered
    Properties(IndexMap<String, String>),

    /// Homogeneous array with a declared element type
    #[serde(skip_deserializing)]
    Array(TypedArray),
}

impl Value {
    /// Create a string value
    #[inline]
    #[must_use]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(s.into())
    }

    /// Create a list of string values
    #[must_use]
    pub fn string_list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(|s| Self::String(s.into())).collect())
    }

    /// Create properties from key/value pairs
    #[must_use]
    pub fn properties<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::Properties(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Borrow as string slice, if this is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for list, array and properties values
    #[inline]
    #[must_use]
    pub fn is_collection(&self) -> bool {
        matches!(self, Self::List(_) | Self::Array(_) | Self::Properties(_))
    }

    /// Number of entries for collections, `None` for scalars
    #[must_use]
    pub fn collection_len(&self) -> Option<usize> {
        match self {
            Self::List(items) => Some(items.len()),
            Self::Array(array) => Some(array.items.len()),
            Self::Properties(props) => Some(props.len()),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::Long(_) => "long",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::List(_) => "list",
            Self::Properties(_) => "properties",
            Self::Array(_) => "array",
        }
    }

    /// Map every string leaf through `f`
    ///
    /// Used for path-token substitution, which applies to strings wherever
    /// they appear inside a value.
    #[must_use]
    pub fn map_strings(&self, f: &dyn Fn(&str) -> String) -> Self {
        match self {
            Self::String(s) => Self::String(f(s)),
            Self::List(items) => Self::List(items.iter().map(|v| v.map_strings(f)).collect()),
            Self::Properties(props) => Self::Properties(
                props.iter().map(|(k, v)| (k.clone(), f(v))).collect(),
            ),
            Self::Array(array) => Self::Array(TypedArray {
                element: array.element.clone(),
                items: array.items.iter().map(|v| v.map_strings(f)).collect(),
            }),
            other => other.clone(),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Long(l) => write!(f, "{l}"),
            Self::Double(d) => write!(f, "{d}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => write_joined(f, items.iter(), ","),
            Self::Array(array) => write_joined(f, array.items.iter(), ","),
            Self::Properties(props) => {
                for (i, (k, v)) in props.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}={v}")?;
                }
                Ok(())
            }
        }
    }
}

fn write_joined<'a>(
    f: &mut Formatter<'_>,
    items: impl Iterator<Item = &'a Value>,
    sep: &str,
) -> fmt::Result {
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Self::Integer(i)
    }
}

impl From<i64> for Value {
    fn from(l: i64) -> Self {
        Self::Long(l)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Self::Double(d)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = ConvertError;

    /// Convert a parsed model document node into a [`Value`]
    ///
    /// JSON `null` has no counterpart and is rejected; callers model absent
    /// values with `Option`.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Null => Err(ConvertError::NullValue),
            serde_json::Value::Bool(b) => Ok(Self::Bool(b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(i32::try_from(i).map_or(Self::Long(i), Self::Integer))
                } else if let Some(d) = n.as_f64() {
                    Ok(Self::Double(d))
                } else {
                    Err(ConvertError::invalid("number", n.to_string()))
                }
            }
            serde_json::Value::String(s) => Ok(Self::String(s)),
            serde_json::Value::Array(items) => items
                .into_iter()
                .map(Self::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            serde_json::Value::Object(map) => {
                let mut props = IndexMap::with_capacity(map.len());
                for (k, v) in map {
                    let text = match v {
                        serde_json::Value::String(s) => s,
                        serde_json::Value::Null => {
                            return Err(ConvertError::NullValue);
                        }
                        other => other.to_string(),
                    };
                    props.insert(k, text);
                }
                Ok(Self::Properties(props))
            }
        }
    }
}

/// Element type of a [`TypedArray`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ElementType {
    /// String elements (the default)
    #[default]
    String,

    /// 32-bit integer elements
    Integer,

    /// 64-bit integer elements
    Long,

    /// Floating point elements
    Double,

    /// Boolean elements
    Boolean,

    /// References to provider objects of the named type, carried as names
    Object(String),
}

impl ElementType {
    /// Parse a declared element sub-type
    ///
    /// Unknown names denote provider object types; `None` falls back to
    /// string elements.
    #[must_use]
    pub fn from_declared(declared: Option<&str>) -> Self {
        let Some(name) = declared.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::String;
        };

        match name.to_ascii_lowercase().as_str() {
            "string" | "java.lang.string" => Self::String,
            "integer" | "int" | "java.lang.integer" => Self::Integer,
            "long" | "java.lang.long" => Self::Long,
            "double" | "java.lang.double" => Self::Double,
            "boolean" | "java.lang.boolean" => Self::Boolean,
            _ => Self::Object(name.to_string()),
        }
    }
}

impl Display for ElementType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Long => f.write_str("long"),
            Self::Double => f.write_str("double"),
            Self::Boolean => f.write_str("boolean"),
            Self::Object(name) => f.write_str(name),
        }
    }
}

/// Homogeneous provider array
#[derive(Debug, Clone, PartialEq)]
pub struct TypedArray {
    /// Declared element type
    pub element: ElementType,

    /// Array items, each already converted to `element`
    pub items: Vec<Value>,
}

impl TypedArray {
    /// Create array
    #[inline]
    #[must_use]
    pub fn new(element: ElementType, items: Vec<Value>) -> Self {
        Self { element, items }
    }
}

impl Serialize for TypedArray {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}
