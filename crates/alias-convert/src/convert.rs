//! Type conversion
//!
//! Pure, stateless conversion of a [`Value`] into the shape required by a
//! declared [`DataType`]. Every function here is referentially transparent and
//! usable without a knowledge base.

use indexmap::IndexMap;

use crate::data_type::{DataType, Delimiter};
use crate::value::{ElementType, TypedArray, Value};

/// Options for [`convert_with`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Delimiter used to split string input into list items
    ///
    /// Defaults to the target type's own delimiter, then to comma.
    pub delimiter: Option<Delimiter>,

    /// Element type for typed arrays
    pub element: ElementType,
}

impl ConvertOptions {
    /// Default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With explicit split delimiter
    #[inline]
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// With typed-array element type
    #[inline]
    #[must_use]
    pub fn with_element(mut self, element: ElementType) -> Self {
        self.element = element;
        self
    }
}

/// Convert `value` to `data_type` with default options
///
/// # Errors
/// Returns [`ConvertError`] when the value cannot represent the target type
pub fn convert(data_type: DataType, value: &Value) -> Result<Value, ConvertError> {
    convert_with(data_type, value, &ConvertOptions::default())
}

/// Convert `value` to `data_type`
///
/// # Errors
/// Returns [`ConvertError`] when the value cannot represent the target type
pub fn convert_with(
    data_type: DataType,
    value: &Value,
    options: &ConvertOptions,
) -> Result<Value, ConvertError> {
    match data_type {
        DataType::String | DataType::Password | DataType::Object => Ok(to_string_value(value)),
        DataType::Integer => to_integer(value).map(Value::Integer),
        DataType::Long => to_long(value).map(Value::Long),
        DataType::Double => to_double(value).map(Value::Double),
        DataType::Boolean => to_boolean(value).map(Value::Bool),
        DataType::List => {
            let delimiter = options.delimiter.unwrap_or_default();
            Ok(Value::List(to_list(value, delimiter)))
        }
        DataType::DelimitedString(target) => {
            let split = options.delimiter.unwrap_or(target);
            let items = to_list(value, split);
            Ok(Value::String(join(&items, target)))
        }
        DataType::Properties => to_properties(value).map(Value::Properties),
        DataType::TypedArray => {
            let delimiter = options.delimiter.unwrap_or_default();
            let items = to_list(value, delimiter)
                .iter()
                .map(|item| convert_element(&options.element, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(TypedArray::new(options.element.clone(), items)))
        }
    }
}

/// Type-aware equality of two values under `data_type`
///
/// Both sides are converted first; when either conversion fails the string
/// renderings are compared instead.
#[must_use]
pub fn typed_eq(data_type: DataType, a: &Value, b: &Value) -> bool {
    match (convert(data_type, a), convert(data_type, b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a.to_string() == b.to_string(),
    }
}

/// Normalize a value to a boolean
///
/// Accepts booleans, numbers (zero is false) and the usual truthy/falsy
/// spellings, case-insensitively.
///
/// # Errors
/// Returns [`ConvertError::InvalidValue`] for any other string
pub fn to_boolean(value: &Value) -> Result<bool, ConvertError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Integer(i) => Ok(*i != 0),
        Value::Long(l) => Ok(*l != 0),
        Value::Double(d) => Ok(*d != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "y" | "on" | "1" => Ok(true),
            "false" | "no" | "n" | "off" | "0" | "" => Ok(false),
            _ => Err(ConvertError::invalid("boolean", s)),
        },
        other => Err(ConvertError::unsupported(other, DataType::Boolean)),
    }
}

/// Split a value into list items
///
/// Strings are split on `delimiter` only, items are trimmed and empty items
/// dropped.
/// Scalars become a one-item list.
#[must_use]
pub fn to_list(value: &Value, delimiter: Delimiter) -> Vec<Value> {
    match value {
        Value::List(items) => items.clone(),
        Value::Array(array) => array.items.clone(),
        Value::String(s) => split_delimited(s, delimiter)
            .into_iter()
            .map(Value::String)
            .collect(),
        Value::Properties(props) => props
            .iter()
            .map(|(k, v)| Value::String(format!("{k}={v}")))
            .collect(),
        scalar => vec![scalar.clone()],
    }
}

/// Parse a value into properties
///
/// Accepts an existing map, a `k=v, k=v` string, or a list of `k=v` items.
///
/// # Errors
/// Returns [`ConvertError::MalformedProperty`] for an entry without `=`
pub fn to_properties(value: &Value) -> Result<IndexMap<String, String>, ConvertError> {
    match value {
        Value::Properties(props) => Ok(props.clone()),
        Value::String(s) => parse_pairs(split_delimited(s, Delimiter::Comma).iter()),
        Value::List(items) => {
            let texts: Vec<String> = items.iter().map(ToString::to_string).collect();
            parse_pairs(texts.iter())
        }
        other => Err(ConvertError::unsupported(other, DataType::Properties)),
    }
}

fn parse_pairs<'a>(
    entries: impl Iterator<Item = &'a String>,
) -> Result<IndexMap<String, String>, ConvertError> {
    let mut props = IndexMap::new();
    for entry in entries {
        let (key, val) = entry
            .split_once('=')
            .ok_or_else(|| ConvertError::MalformedProperty(entry.clone()))?;
        props.insert(key.trim().to_string(), val.trim().to_string());
    }
    Ok(props)
}

fn split_delimited(s: &str, delimiter: Delimiter) -> Vec<String> {
    let pieces: Vec<&str> = match delimiter {
        Delimiter::Space => s.split_whitespace().collect(),
        other => s.split(other.as_str()).collect(),
    };

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn join(items: &[Value], delimiter: Delimiter) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(delimiter.as_str())
}

fn to_string_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(s.clone()),
        other => Value::String(other.to_string()),
    }
}

fn to_long(value: &Value) -> Result<i64, ConvertError> {
    match value {
        Value::Integer(i) => Ok(i64::from(*i)),
        Value::Long(l) => Ok(*l),
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::Double(d) if d.fract() == 0.0 && d.is_finite() => {
            format!("{d:.0}").parse().map_err(|_| ConvertError::invalid("long", d.to_string()))
        }
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ConvertError::invalid("long", s)),
        other => Err(ConvertError::unsupported(other, DataType::Long)),
    }
}

fn to_integer(value: &Value) -> Result<i32, ConvertError> {
    match value {
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ConvertError::invalid("integer", s)),
        other => {
            let wide = to_long(other).map_err(|_| ConvertError::unsupported(other, DataType::Integer))?;
            i32::try_from(wide).map_err(|_| ConvertError::invalid("integer", wide.to_string()))
        }
    }
}

fn to_double(value: &Value) -> Result<f64, ConvertError> {
    match value {
        Value::Double(d) => Ok(*d),
        Value::Integer(i) => Ok(f64::from(*i)),
        Value::Long(l) => l
            .to_string()
            .parse()
            .map_err(|_| ConvertError::invalid("double", l.to_string())),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| ConvertError::invalid("double", s)),
        other => Err(ConvertError::unsupported(other, DataType::Double)),
    }
}

fn convert_element(element: &ElementType, item: &Value) -> Result<Value, ConvertError> {
    match element {
        ElementType::String | ElementType::Object(_) => Ok(to_string_value(item)),
        ElementType::Integer => to_integer(item).map(Value::Integer),
        ElementType::Long => to_long(item).map(Value::Long),
        ElementType::Double => to_double(item).map(Value::Double),
        ElementType::Boolean => to_boolean(item).map(Value::Bool),
    }
}

/// Conversion errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConvertError {
    /// Value text cannot be parsed as the target type
    #[error("cannot convert '{value}' to {target}")]
    InvalidValue {
        /// Target type name
        target: String,
        /// Offending value text
        value: String,
    },

    /// Value shape cannot represent the target type at all
    #[error("cannot convert {from} value to {to}")]
    Unsupported {
        /// Source value kind
        from: &'static str,
        /// Target type
        to: DataType,
    },

    /// Property entry without a `=` separator
    #[error("malformed property entry: '{0}'")]
    MalformedProperty(String),

    /// Null where a value is required
    #[error("null value is not convertible")]
    NullValue,

    /// Merge policy name not registered
    #[error("unknown merge policy: '{0}'")]
    UnknownPolicy(String),
}

impl ConvertError {
    /// Create invalid value error
    pub fn invalid(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            target: target.into(),
            value: value.into(),
        }
    }

    /// Create unsupported conversion error
    #[must_use]
    pub fn unsupported(from: &Value, to: DataType) -> Self {
        Self::Unsupported {
            from: from.kind(),
            to,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn integer_from_string() {
        assert_eq!(convert(DataType::Integer, &Value::string("123")).unwrap(), Value::Integer(123));
        assert_eq!(convert(DataType::Integer, &Value::string(" 5 ")).unwrap(), Value::Integer(5));
    }

    #[test]
    fn integer_rejects_garbage() {
        assert!(matches!(
            convert(DataType::Integer, &Value::string("five")),
            Err(ConvertError::InvalidValue { .. })
        ));
    }

    #[test]
    fn long_keeps_wide_values() {
        assert_eq!(convert(DataType::Long, &Value::string("3600")).unwrap(), Value::Long(3600));
        assert_eq!(
            convert(DataType::Long, &Value::Integer(7)).unwrap(),
            Value::Long(7)
        );
    }

    #[test]
    fn boolean_spellings() {
        for truthy in ["true", "TRUE", "yes", "on", "1"] {
            assert_eq!(to_boolean(&Value::string(truthy)).unwrap(), true, "{truthy}");
        }
        for falsy in ["false", "No", "off", "0"] {
            assert_eq!(to_boolean(&Value::string(falsy)).unwrap(), false, "{falsy}");
        }
        assert_eq!(to_boolean(&Value::Integer(1)).unwrap(), true);
        assert_eq!(to_boolean(&Value::Integer(0)).unwrap(), false);
        assert!(to_boolean(&Value::string("maybe")).is_err());
    }

    #[test]
    fn list_from_delimited_string_trims_items() {
        let list = convert(DataType::List, &Value::string("a, b ,c")).unwrap();
        assert_eq!(list, Value::string_list(["a", "b", "c"]));
    }

    #[test]
    fn delimited_string_normalizes_spacing() {
        let value = Value::string("com.bea.datasource1, com.bea.datasource2");
        let converted = convert(DataType::DelimitedString(Delimiter::Comma), &value).unwrap();
        assert_eq!(converted, Value::string("com.bea.datasource1,com.bea.datasource2"));
    }

    #[test]
    fn delimited_string_from_list() {
        let value = Value::string_list(["x", "y"]);
        let converted = convert(DataType::DelimitedString(Delimiter::Semicolon), &value).unwrap();
        assert_eq!(converted, Value::string("x;y"));
    }

    #[test]
    fn semicolon_items_keep_embedded_commas() {
        let converted = convert(
            DataType::DelimitedString(Delimiter::Semicolon),
            &Value::string("x,y; z"),
        )
        .unwrap();
        assert_eq!(converted, Value::string("x,y;z"));
        assert_eq!(
            to_list(&Value::string("a,b"), Delimiter::Semicolon),
            vec![Value::string("a,b")]
        );
    }

    #[test]
    fn space_items_keep_embedded_commas() {
        assert_eq!(
            to_list(&Value::string("-Dhosts=a,b  -Xmx1g"), Delimiter::Space),
            vec![Value::string("-Dhosts=a,b"), Value::string("-Xmx1g")]
        );
    }

    #[test]
    fn properties_from_string_and_map() {
        let expected = Value::properties([("key1", "val1"), ("key2", "val2"), ("key3", "val3")]);
        let from_string =
            convert(DataType::Properties, &Value::string("key1=val1, key2=val2, key3=val3")).unwrap();
        assert_eq!(from_string, expected);

        let from_map = convert(DataType::Properties, &expected).unwrap();
        assert_eq!(from_map, expected);
    }

    #[test]
    fn properties_reject_bare_entry() {
        assert_eq!(
            convert(DataType::Properties, &Value::string("a=1, b")),
            Err(ConvertError::MalformedProperty("b".to_string()))
        );
    }

    #[test]
    fn typed_array_converts_elements() {
        let options = ConvertOptions::new().with_element(ElementType::Integer);
        let converted =
            convert_with(DataType::TypedArray, &Value::string("1,2,3"), &options).unwrap();
        assert_eq!(
            converted,
            Value::Array(TypedArray::new(
                ElementType::Integer,
                vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]
            ))
        );
    }

    #[test]
    fn typed_array_defaults_to_strings() {
        let converted = convert(DataType::TypedArray, &Value::string_list(["abc", "def"])).unwrap();
        let Value::Array(array) = converted else {
            panic!("expected array");
        };
        assert_eq!(array.element, ElementType::String);
        assert_eq!(array.items.len(), 2);
    }

    #[test]
    fn password_passes_through() {
        let value = Value::string("{AES}abc==");
        assert_eq!(convert(DataType::Password, &value).unwrap(), value);
    }

    #[test]
    fn typed_eq_compares_after_conversion() {
        assert!(typed_eq(DataType::Integer, &Value::Integer(0), &Value::string("0")));
        assert!(typed_eq(DataType::Boolean, &Value::string("false"), &Value::Integer(0)));
        assert!(!typed_eq(DataType::Integer, &Value::Integer(5), &Value::string("0")));
    }

    #[test]
    fn space_delimiter_collapses_runs() {
        let list = to_list(&Value::string("-Xmx512m   -Dx=1"), Delimiter::Space);
        assert_eq!(list, vec![Value::string("-Xmx512m"), Value::string("-Dx=1")]);
    }
}
