//! Merge policies for collection attributes
//!
//! Provides the [`MergePolicy`] trait and the built-in policies used when a
//! model value is written onto a provider value that already exists:
//!
//! - [`ListUnion`] keeps existing entries and appends unseen model entries
//! - [`PropertiesByKey`] overrides matching keys and keeps the rest
//! - [`ArgumentFlags`] merges command-line arguments by flag

use indexmap::IndexMap;

use crate::convert::{to_list, to_properties, ConvertError};
use crate::data_type::Delimiter;
use crate::value::Value;

/// Policy for combining a model value with an existing provider value
///
/// Implementations must be deterministic: the same inputs always produce the
/// same output, in the same order.
pub trait MergePolicy: Send + Sync + std::fmt::Debug {
    /// Merge `model` onto `existing`
    ///
    /// # Returns
    /// The merged value; `model` unchanged when there is nothing to merge with
    ///
    /// # Errors
    /// Returns [`ConvertError`] when either side cannot be read in the shape
    /// this policy works on
    fn merge(&self, model: &Value, existing: Option<&Value>) -> Result<Value, ConvertError>;

    /// Policy name (for registry lookup and diagnostics)
    fn name(&self) -> &'static str;
}

/// Ordered union of list entries
#[derive(Debug, Clone, Copy, Default)]
pub struct ListUnion {
    delimiter: Delimiter,
}

impl ListUnion {
    /// Comma-delimited list union
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Split string values on `delimiter` instead of commas
    #[inline]
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: Delimiter) -> Self {
        self.delimiter = delimiter;
        self
    }
}

impl MergePolicy for ListUnion {
    fn merge(&self, model: &Value, existing: Option<&Value>) -> Result<Value, ConvertError> {
        let incoming = to_list(model, self.delimiter);
        let Some(existing) = existing else {
            return Ok(Value::List(incoming));
        };

        let mut merged = to_list(existing, self.delimiter);
        for item in incoming {
            if !merged.contains(&item) {
                merged.push(item);
            }
        }
        Ok(Value::List(merged))
    }

    fn name(&self) -> &'static str {
        "list_union"
    }
}

/// Merge properties by key, model keys winning
#[derive(Debug, Clone, Copy, Default)]
pub struct PropertiesByKey;

impl MergePolicy for PropertiesByKey {
    fn merge(&self, model: &Value, existing: Option<&Value>) -> Result<Value, ConvertError> {
        let incoming = to_properties(model)?;
        let Some(existing) = existing else {
            return Ok(Value::Properties(incoming));
        };

        let mut merged = to_properties(existing)?;
        for (key, value) in incoming {
            merged.insert(key, value);
        }
        Ok(Value::Properties(merged))
    }

    fn name(&self) -> &'static str {
        "properties_by_key"
    }
}

/// Merge whitespace-separated command-line arguments by flag
///
/// A model argument replaces the existing argument with the same flag in
/// place; arguments with novel flags are appended.
///
/// Flag keys:
/// - `-Dname=value` keyed by `-Dname`
/// - `-XX:+Name`, `-XX:-Name`, `-XX:Name=value` keyed by `-XX:Name`
/// - `-Xmx512m`, `-Xms`, `-Xss`, `-Xmn` keyed by their prefix
/// - anything else keyed by the text before `=`
#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentFlags;

const SIZED_FLAGS: [&str; 4] = ["-Xmx", "-Xms", "-Xss", "-Xmn"];

impl ArgumentFlags {
    /// Flag key of a single argument
    #[must_use]
    pub fn flag_key(argument: &str) -> String {
        if let Some(rest) = argument.strip_prefix("-XX:") {
            let name = rest.trim_start_matches(['+', '-']);
            let name = name.split_once('=').map_or(name, |(n, _)| n);
            return format!("-XX:{name}");
        }

        if let Some(prefix) = SIZED_FLAGS.iter().find(|p| argument.starts_with(**p)) {
            return (*prefix).to_string();
        }

        argument
            .split_once('=')
            .map_or(argument, |(key, _)| key)
            .to_string()
    }

    fn arguments(value: &Value) -> Vec<String> {
        to_list(value, Delimiter::Space)
            .iter()
            .map(ToString::to_string)
            .collect()
    }
}

impl MergePolicy for ArgumentFlags {
    fn merge(&self, model: &Value, existing: Option<&Value>) -> Result<Value, ConvertError> {
        let incoming = Self::arguments(model);
        let Some(existing) = existing else {
            return Ok(Value::String(incoming.join(" ")));
        };

        let mut merged: IndexMap<String, String> = Self::arguments(existing)
            .into_iter()
            .map(|arg| (Self::flag_key(&arg), arg))
            .collect();
        for arg in incoming {
            merged.insert(Self::flag_key(&arg), arg);
        }

        Ok(Value::String(
            merged.into_values().collect::<Vec<_>>().join(" "),
        ))
    }

    fn name(&self) -> &'static str {
        "argument_flags"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn list_union_appends_unseen() {
        let merged = ListUnion::new()
            .merge(
                &Value::string("b,c"),
                Some(&Value::string_list(["a", "b"])),
            )
            .unwrap();
        assert_eq!(merged, Value::string_list(["a", "b", "c"]));
    }

    #[test]
    fn list_union_without_existing_is_model() {
        let merged = ListUnion::new().merge(&Value::string("x, y"), None).unwrap();
        assert_eq!(merged, Value::string_list(["x", "y"]));
    }

    #[test]
    fn properties_model_keys_win() {
        let merged = PropertiesByKey
            .merge(
                &Value::string("user=scott, url=jdbc:new"),
                Some(&Value::properties([("url", "jdbc:old"), ("pool", "5")])),
            )
            .unwrap();
        assert_eq!(
            merged,
            Value::properties([("url", "jdbc:new"), ("pool", "5"), ("user", "scott")])
        );
    }

    #[test]
    fn flag_keys() {
        assert_eq!(ArgumentFlags::flag_key("-Dfoo=bar"), "-Dfoo");
        assert_eq!(ArgumentFlags::flag_key("-XX:+UseG1GC"), "-XX:UseG1GC");
        assert_eq!(ArgumentFlags::flag_key("-XX:-UseG1GC"), "-XX:UseG1GC");
        assert_eq!(ArgumentFlags::flag_key("-XX:MaxPermSize=256m"), "-XX:MaxPermSize");
        assert_eq!(ArgumentFlags::flag_key("-Xmx1024m"), "-Xmx");
        assert_eq!(ArgumentFlags::flag_key("-server"), "-server");
    }

    #[test]
    fn arguments_replace_in_place_and_append() {
        let merged = ArgumentFlags
            .merge(
                &Value::string("-Xmx1024m -Dnew=1 -XX:-UseG1GC"),
                Some(&Value::string("-Xms256m -Xmx512m -XX:+UseG1GC")),
            )
            .unwrap();
        assert_eq!(
            merged,
            Value::string("-Xms256m -Xmx1024m -XX:-UseG1GC -Dnew=1")
        );
    }

    #[test]
    fn argument_values_keep_commas() {
        let merged = ArgumentFlags
            .merge(
                &Value::string("-Dweblogic.hosts=a,b"),
                Some(&Value::string("-Xmx512m")),
            )
            .unwrap();
        assert_eq!(merged, Value::string("-Xmx512m -Dweblogic.hosts=a,b"));
    }

    #[test]
    fn semicolon_union_keeps_commas() {
        let merged = ListUnion::new()
            .with_delimiter(Delimiter::Semicolon)
            .merge(&Value::string("c,d"), Some(&Value::string("a,b;e")))
            .unwrap();
        assert_eq!(merged, Value::string_list(["a,b", "e", "c,d"]));
    }

    #[test]
    fn policy_names() {
        assert_eq!(ListUnion::new().name(), "list_union");
        assert_eq!(PropertiesByKey.name(), "properties_by_key");
        assert_eq!(ArgumentFlags.name(), "argument_flags");
    }
}
