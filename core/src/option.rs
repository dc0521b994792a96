//! Option records and the arena that shares them between parse phases.
//!
//! Every option seen while reading the options sections, the usage pattern
//! or the argument vector lives in one [`OptionArena`]. Pattern leaves and
//! argv occurrences refer to entries by [`OptionId`], so a change to an
//! entry (for example turning its default into a list) is visible from
//! every place that references it.

use std::sync::LazyLock;

use regex::Regex;

use crate::value::Value;

static DEFAULT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\[default: (.*)\]").expect("static regex must compile"));

/// Stable index of an option in its [`OptionArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(usize);

impl OptionId {
    pub(crate) const fn from_index(idx: usize) -> Self {
        Self(idx)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Canonical description of one option.
///
/// Two options are the same option when both their short and long names
/// match; arity and value are not part of the identity.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{OptionSpec, Value};
///
/// let opt = OptionSpec::parse("-o FILE --output=FILE  Output file [default: out.txt]");
/// assert_eq!(opt.short.as_deref(), Some("-o"));
/// assert_eq!(opt.long.as_deref(), Some("--output"));
/// assert!(opt.takes_value());
/// assert_eq!(opt.value, Value::Text("out.txt".into()));
/// assert_eq!(opt.name(), "--output");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    /// One dash plus one character, e.g. `-v`.
    pub short: Option<String>,
    /// Two dashes plus a word, e.g. `--verbose`.
    pub long: Option<String>,
    /// 1 when the option consumes a value, otherwise 0.
    pub arity: u8,
    /// Default (or, for argv occurrences, bound) value.
    pub value: Value,
}

impl OptionSpec {
    /// Creates an option. Flags start as `false`, valued options as absent.
    pub fn new(short: Option<&str>, long: Option<&str>, arity: u8) -> Self {
        Self {
            short: short.map(String::from),
            long: long.map(String::from),
            arity,
            value: if arity == 0 {
                Value::Flag(false)
            } else {
                Value::Absent
            },
        }
    }

    pub fn with_value(mut self, value: Value) -> Self {
        self.value = value;
        self
    }

    /// Parses one option description line from an options section.
    ///
    /// The names end at the first run of two spaces or a tab; everything after is
    /// free text that may carry a `[default: X]` annotation, which also makes
    /// the option take a value.
    pub fn parse(description: &str) -> Self {
        let trimmed = description.trim();
        let split_at = [trimmed.find("  "), trimmed.find('\t')]
            .into_iter()
            .flatten()
            .min();
        let (names, text) = match split_at {
            Some(idx) => (&trimmed[..idx], &trimmed[idx..]),
            None => (trimmed, ""),
        };

        let mut short = None;
        let mut long = None;
        let mut arity = 0;
        for token in names
            .split(|ch: char| ch == ',' || ch == '=' || ch.is_whitespace())
            .filter(|token| !token.is_empty())
        {
            if token.starts_with("--") {
                long = Some(token);
            } else if token.starts_with('-') {
                short = Some(token);
            } else {
                arity = 1;
            }
        }

        // A default implies the option takes a value.
        match DEFAULT_RE.captures(text) {
            Some(caps) => Self::new(short, long, 1).with_value(Value::Text(caps[1].to_string())),
            None => Self::new(short, long, arity),
        }
    }

    pub fn takes_value(&self) -> bool {
        self.arity > 0
    }

    /// The name used as a result key: long form preferred, short as fallback.
    pub fn name(&self) -> &str {
        self.long
            .as_deref()
            .or(self.short.as_deref())
            .unwrap_or_default()
    }

    /// Returns `true` when both names match.
    pub fn same_identity(&self, other: &Self) -> bool {
        self.short == other.short && self.long == other.long
    }
}

/// Registry of every option known to one parse/match cycle.
#[derive(Debug, Clone, Default)]
pub struct OptionArena {
    entries: Vec<OptionSpec>,
    documented: usize,
}

impl OptionArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an arena whose first entries are the documented options.
    /// Duplicates are kept; they surface as ambiguity errors on lookup.
    pub fn from_documented(options: Vec<OptionSpec>) -> Self {
        let documented = options.len();
        Self {
            entries: options,
            documented,
        }
    }

    pub fn push(&mut self, option: OptionSpec) -> OptionId {
        self.entries.push(option);
        OptionId::from_index(self.entries.len() - 1)
    }

    pub fn get(&self, id: OptionId) -> &OptionSpec {
        &self.entries[id.0]
    }

    pub fn get_mut(&mut self, id: OptionId) -> &mut OptionSpec {
        &mut self.entries[id.0]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (OptionId, &OptionSpec)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(idx, option)| (OptionId::from_index(idx), option))
    }

    /// Ids of options that came from the options sections, in order.
    pub fn documented(&self) -> impl Iterator<Item = OptionId> + '_ {
        (0..self.documented).map(OptionId::from_index)
    }

    pub fn with_short(&self, short: &str) -> Vec<OptionId> {
        self.iter()
            .filter(|(_, option)| option.short.as_deref() == Some(short))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn with_long(&self, long: &str) -> Vec<OptionId> {
        self.iter()
            .filter(|(_, option)| option.long.as_deref() == Some(long))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn with_long_prefix(&self, prefix: &str) -> Vec<OptionId> {
        self.iter()
            .filter(|(_, option)| {
                option
                    .long
                    .as_deref()
                    .is_some_and(|long| long.starts_with(prefix))
            })
            .map(|(id, _)| id)
            .collect()
    }

    pub fn same_identity(&self, a: OptionId, b: OptionId) -> bool {
        a == b || self.get(a).same_identity(self.get(b))
    }

    /// First entry sharing `id`'s identity. Used to collapse duplicates
    /// onto one shared record.
    pub fn canonical(&self, id: OptionId) -> OptionId {
        let target = self.get(id);
        self.iter()
            .find(|(_, option)| option.same_identity(target))
            .map_or(id, |(found, _)| found)
    }

    pub fn name(&self, id: OptionId) -> &str {
        self.get(id).name()
    }
}
