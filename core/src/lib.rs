//! Usage-grammar parsing and argument matching.
//!
//! A usage document is free text with a `usage:` section describing the
//! accepted invocation shapes and optional `options:` sections describing
//! options and their defaults. This crate turns that text into a pattern
//! tree and matches argument vectors against it:
//!
//! - [`sections`] finds the `usage:` and `options:` sections and normalises
//!   usage lines into one formal expression.
//! - [`grammar`] parses the formal expression into a [`Pattern`] tree,
//!   resolving options against an [`OptionArena`].
//! - [`argv`] parses an argument vector into bound [`Leaf`] values.
//! - [`Matcher`] unifies the two, accumulating repeated leaves into lists
//!   and counts.
//! - [`apply`] wires everything together and reports an [`Outcome`]; an
//!   [`Accumulator`] decides what the result looks like.
//!
//! # Example
//!
//! ```
//! use usage_grammar_core::*;
//!
//! let doc = "Usage:
//!   prog add <file>...
//!   prog rm [-f] <file>
//!   prog (-h | --help)
//!
//! Options:
//!   -h --help   Show help.
//!   -f --force  Do not ask.
//! ";
//!
//! let bindings = apply(doc, ["rm", "-f", "notes.txt"], &ApplyConfig::default())
//!     .matched()
//!     .unwrap();
//! assert_eq!(bindings.flag("rm"), Some(true));
//! assert_eq!(bindings.flag("add"), Some(false));
//! assert_eq!(bindings.flag("--force"), Some(true));
//! assert_eq!(bindings.items("<file>"), Some(&["notes.txt".to_string()][..]));
//!
//! match apply(doc, ["mv"], &ApplyConfig::default()) {
//!     Outcome::Failed(err) => assert_eq!(err.kind(), Some(ErrorKind::Input)),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```

pub mod accumulate;
pub mod apply;
pub mod argv;
pub mod error;
pub mod grammar;
pub mod matcher;
pub mod nodes;
pub mod option;
pub mod pattern;
pub mod sections;
pub mod tokens;
pub mod value;

pub use accumulate::{
    Accumulator, Bindings, BindingsAccumulator, FieldTable, Setter, TypedAccumulator, property_name,
};
pub use apply::{ApplyConfig, Outcome, apply, apply_with};
pub use error::{Error, ErrorKind, Result};
pub use matcher::{MatchOutcome, Matcher};
pub use nodes::{LeafNode, ValueKind, leaf_nodes};
pub use option::{OptionArena, OptionId, OptionSpec};
pub use pattern::{Leaf, LeafKind, Pattern};
pub use value::Value;
