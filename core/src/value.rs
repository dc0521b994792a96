//! Bound values for arguments, options and commands.

use std::fmt;

use serde::Serialize;

/// The value bound to a leaf.
///
/// Scalars become [`Value::Items`] and flags become [`Value::Count`] when the
/// leaf can occur more than once in a single usage line.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::Value;
///
/// assert_eq!(Value::Text("x".into()).to_string(), "\"x\"");
/// assert_eq!(Value::Items(vec!["a".into(), "b".into()]).to_string(), "[\"a\", \"b\"]");
/// assert!(Value::Absent.is_absent());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
#[serde(untagged)]
pub enum Value {
    /// Not supplied and no default.
    #[default]
    Absent,
    /// Boolean flag or command.
    Flag(bool),
    /// Scalar string value.
    Text(String),
    /// Ordered values of a repeated argument or option.
    Items(Vec<String>),
    /// Occurrence count of a repeated flag or command.
    Count(u64),
}

impl Value {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Truthiness as used by help/version interception: absent, `false`,
    /// empty text, empty lists and zero counts are all "unset".
    pub fn is_set(&self) -> bool {
        match self {
            Self::Absent => false,
            Self::Flag(b) => *b,
            Self::Text(s) => !s.is_empty(),
            Self::Items(items) => !items.is_empty(),
            Self::Count(n) => *n > 0,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_items(&self) -> Option<&[String]> {
        match self {
            Self::Items(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<u64> {
        match self {
            Self::Count(n) => Some(*n),
            _ => None,
        }
    }

    /// Converts a scalar default into the list form used by repeated leaves.
    /// Text is split on whitespace.
    pub(crate) fn into_list(self) -> Self {
        match self {
            Self::Absent | Self::Flag(_) | Self::Count(_) => Self::Items(Vec::new()),
            Self::Text(s) => Self::Items(s.split_whitespace().map(str::to_string).collect()),
            items @ Self::Items(_) => items,
        }
    }

    /// Values contributed by one occurrence to a list-typed leaf.
    pub(crate) fn into_increment(self) -> Vec<String> {
        match self {
            Self::Text(s) => vec![s],
            Self::Items(items) => items,
            Self::Absent | Self::Flag(_) | Self::Count(_) => Vec::new(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("null"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::Text(s) => write!(f, "{s:?}"),
            Self::Items(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item:?}")?;
                }
                f.write_str("]")
            }
            Self::Count(n) => write!(f, "{n}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Count(value)
    }
}

impl From<Vec<String>> for Value {
    fn from(value: Vec<String>) -> Self {
        Self::Items(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_list_splits_text_default() {
        assert_eq!(
            Value::Text("./here ./there".into()).into_list(),
            Value::Items(vec!["./here".into(), "./there".into()])
        );
        assert_eq!(Value::Absent.into_list(), Value::Items(Vec::new()));
    }

    #[test]
    fn test_is_set_matches_truthiness() {
        assert!(!Value::Absent.is_set());
        assert!(!Value::Flag(false).is_set());
        assert!(!Value::Text(String::new()).is_set());
        assert!(!Value::Count(0).is_set());
        assert!(Value::Flag(true).is_set());
        assert!(Value::Count(2).is_set());
    }

    #[test]
    fn test_serializes_untagged() {
        let json = serde_json::to_string(&vec![
            Value::Absent,
            Value::Flag(true),
            Value::Text("x".into()),
            Value::Items(vec!["a".into()]),
            Value::Count(3),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,true,"x",["a"],3]"#);
    }
}
