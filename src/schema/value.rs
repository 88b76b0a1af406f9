//! Option values attached to tables, columns and relations.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Option bag for a declaration (`null: false`, `column: "author_id"`, ...)
///
/// Sorted by key so every rendering of the bag is stable.
pub type Options = BTreeMap<String, OptionValue>;

/// A literal value as written in the schema source
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OptionValue {
    Str(String),
    /// Ruby-style symbol (`:cascade`)
    Symbol(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Nil,
    List(Vec<OptionValue>),
    Hash(Options),
    /// Source text kept verbatim, e.g. a lambda default `-> { "now()" }`
    Raw(String),
}

impl OptionValue {
    /// String content of a string or symbol value
    pub fn as_name(&self) -> Option<&str> {
        match self {
            OptionValue::Str(s) | OptionValue::Symbol(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Str(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::Str(s)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Int(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Int(n.into())
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Str(s) => write!(f, "{:?}", s),
            OptionValue::Symbol(s) => write!(f, ":{}", s),
            OptionValue::Int(n) => write!(f, "{}", n),
            OptionValue::Float(n) => write!(f, "{}", n),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Nil => write!(f, "nil"),
            OptionValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            OptionValue::Hash(options) => write!(f, "{{{}}}", display_options(options)),
            OptionValue::Raw(s) => write!(f, "{}", s),
        }
    }
}

/// Format an option bag as `key: value, key: value`
pub fn display_options(options: &Options) -> String {
    options
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Build an option bag from key/value pairs
pub fn options<I, K, V>(pairs: I) -> Options
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<OptionValue>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_options_sorted() {
        let opts = options([("null", OptionValue::Bool(false)), ("limit", 255.into())]);
        assert_eq!(display_options(&opts), "limit: 255, null: false");
    }

    #[test]
    fn test_display_nested_values() {
        let value = OptionValue::List(vec![
            OptionValue::Symbol("cascade".to_string()),
            OptionValue::Nil,
            "x".into(),
        ]);
        assert_eq!(value.to_string(), r#"[:cascade, nil, "x"]"#);
    }

    #[test]
    fn test_as_name() {
        assert_eq!(OptionValue::Symbol("users".into()).as_name(), Some("users"));
        assert_eq!(OptionValue::Str("users".into()).as_name(), Some("users"));
        assert_eq!(OptionValue::Int(1).as_name(), None);
    }
}
