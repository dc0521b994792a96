//! Static description of the leaves a usage document defines.

use serde::Serialize;
use tracing::debug;

use crate::apply::Document;
use crate::error::Result;
use crate::pattern::LeafKind;
use crate::value::Value;

/// Shape of the value a leaf binds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Absent,
    Flag,
    Text,
    Items,
    Count,
}

impl From<&Value> for ValueKind {
    fn from(value: &Value) -> Self {
        match value {
            Value::Absent => Self::Absent,
            Value::Flag(_) => Self::Flag,
            Value::Text(_) => Self::Text,
            Value::Items(_) => Self::Items,
            Value::Count(_) => Self::Count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeafNode {
    pub name: String,
    pub kind: LeafKind,
    /// Derived from the default after repetition fixing, so repeatable
    /// leaves report `Items` or `Count`.
    pub value_kind: ValueKind,
}

/// Lists the distinct leaves of `doc` in first-appearance order, without
/// matching any arguments.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{LeafKind, ValueKind, leaf_nodes};
///
/// let nodes = leaf_nodes("usage: prog go [-v] <dir>...").unwrap();
/// let summary = nodes
///     .iter()
///     .map(|node| (node.name.as_str(), node.kind, node.value_kind))
///     .collect::<Vec<_>>();
/// assert_eq!(
///     summary,
///     [
///         ("go", LeafKind::Command, ValueKind::Flag),
///         ("-v", LeafKind::Option, ValueKind::Flag),
///         ("<dir>", LeafKind::Argument, ValueKind::Items),
///     ]
/// );
/// ```
pub fn leaf_nodes(doc: &str) -> Result<Vec<LeafNode>> {
    let mut document = Document::parse(doc)?;
    document.pattern.expand_options_shortcut(&document.options);
    document.pattern.fix(&mut document.options);

    let nodes = document
        .defaults()
        .into_iter()
        .map(|(kind, name, value)| LeafNode {
            name,
            kind,
            value_kind: ValueKind::from(&value),
        })
        .collect::<Vec<_>>();
    debug!(count = nodes.len(), "Collected leaf nodes");
    Ok(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_shortcut_contributes_documented_options() {
        let doc = "Usage: prog [options] <src> <dst>

Options:
  -f --force       Overwrite.
  --mode=<m>       Mode [default: copy].
  -v               Verbose.
";
        let nodes = leaf_nodes(doc).unwrap();
        let names = nodes.iter().map(|node| node.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, ["--force", "--mode", "-v", "<src>", "<dst>"]);
        assert_eq!(nodes[1].value_kind, ValueKind::Text);
        assert_eq!(nodes[3].value_kind, ValueKind::Absent);
    }

    #[test]
    fn test_repeated_command_is_count() {
        let nodes = leaf_nodes("usage: prog tick tick [-q]...").unwrap();
        assert_eq!(nodes[0].name, "tick");
        assert_eq!(nodes[0].value_kind, ValueKind::Count);
        assert_eq!(nodes[1].value_kind, ValueKind::Count);
    }

    #[test]
    fn test_language_error_propagates() {
        assert!(leaf_nodes("usage: prog (unclosed").is_err());
        assert!(leaf_nodes("nothing here").is_err());
    }

    #[test]
    fn test_serializes_snake_case() {
        let nodes = leaf_nodes("usage: prog <x>").unwrap();
        let json = serde_json::to_value(&nodes).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{ "name": "<x>", "kind": "argument", "value_kind": "absent" }])
        );
    }
}
