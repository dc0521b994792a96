//! Pattern tree produced by the grammar parser.
//!
//! Leaves are arguments (`<file>`, `FILE`), commands (`add`) and options
//! (`--verbose`). Branches group them: [`Pattern::Required`] for `( )`,
//! [`Pattern::Optional`] for `[ ]`, [`Pattern::Either`] for `|` and
//! [`Pattern::OneOrMore`] for `...`.
//!
//! Leaf equality only looks at the leaf type and name, never at the bound
//! value, so identical leaves from different alternatives compare equal.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use tracing::trace;

use crate::option::{OptionArena, OptionId};
use crate::value::Value;

/// The three leaf flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LeafKind {
    Argument,
    Command,
    Option,
}

#[derive(Debug, Clone)]
pub enum Pattern {
    Argument { name: String, value: Value },
    Command { name: String, value: Value },
    /// Option leaf; its default lives in the arena entry.
    Option(OptionId),
    Required(Vec<Pattern>),
    Optional(Vec<Pattern>),
    Either(Vec<Pattern>),
    OneOrMore(Box<Pattern>),
    /// The `options` token, replaced before matching by every documented
    /// option the pattern does not mention itself.
    OptionsShortcut,
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Argument { name: a, .. }, Self::Argument { name: b, .. }) => a == b,
            (Self::Command { name: a, .. }, Self::Command { name: b, .. }) => a == b,
            (Self::Option(a), Self::Option(b)) => a == b,
            (Self::Required(a), Self::Required(b))
            | (Self::Optional(a), Self::Optional(b))
            | (Self::Either(a), Self::Either(b)) => a == b,
            (Self::OneOrMore(a), Self::OneOrMore(b)) => a == b,
            (Self::OptionsShortcut, Self::OptionsShortcut) => true,
            _ => false,
        }
    }
}

/// Identity of a leaf within one tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum LeafKey {
    Argument(String),
    Command(String),
    Option(OptionId),
}

/// A bound leaf: an argv occurrence or a value collected by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Leaf {
    /// Positional value. Argv occurrences have no name yet; the matcher
    /// names them after the argument pattern they bind to.
    Argument { name: Option<String>, value: Value },
    Command { name: String, value: Value },
    Option { id: OptionId, value: Value },
}

impl Leaf {
    pub fn value(&self) -> &Value {
        match self {
            Self::Argument { value, .. } | Self::Command { value, .. } | Self::Option { value, .. } => {
                value
            }
        }
    }

    pub(crate) fn value_mut(&mut self) -> &mut Value {
        match self {
            Self::Argument { value, .. } | Self::Command { value, .. } | Self::Option { value, .. } => {
                value
            }
        }
    }

    pub fn kind(&self) -> LeafKind {
        match self {
            Self::Argument { .. } => LeafKind::Argument,
            Self::Command { .. } => LeafKind::Command,
            Self::Option { .. } => LeafKind::Option,
        }
    }

    /// Result key of this leaf. Unnamed argv arguments have none.
    pub fn name<'a>(&'a self, options: &'a OptionArena) -> Option<&'a str> {
        match self {
            Self::Argument { name, .. } => name.as_deref(),
            Self::Command { name, .. } => Some(name),
            Self::Option { id, .. } => Some(options.name(*id)),
        }
    }
}

impl Pattern {
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Self::Argument { .. } | Self::Command { .. } | Self::Option(_)
        )
    }

    pub fn argument(name: impl Into<String>) -> Self {
        Self::Argument {
            name: name.into(),
            value: Value::Absent,
        }
    }

    pub fn command(name: impl Into<String>) -> Self {
        Self::Command {
            name: name.into(),
            value: Value::Flag(false),
        }
    }

    pub fn children(&self) -> &[Pattern] {
        match self {
            Self::Required(children) | Self::Optional(children) | Self::Either(children) => {
                children
            }
            Self::OneOrMore(child) => std::slice::from_ref(child.as_ref()),
            _ => &[],
        }
    }

    /// Leaves in left-to-right order, duplicates included.
    pub fn leaves(&self) -> Vec<&Pattern> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Pattern>) {
        if self.is_leaf() {
            out.push(self);
        } else {
            for child in self.children() {
                child.collect_leaves(out);
            }
        }
    }

    /// Distinct option ids referenced anywhere in the tree.
    pub fn option_ids(&self) -> Vec<OptionId> {
        let mut ids = Vec::new();
        for leaf in self.leaves() {
            if let Self::Option(id) = leaf
                && !ids.contains(id)
            {
                ids.push(*id);
            }
        }
        ids
    }

    pub fn has_options_shortcut(&self) -> bool {
        matches!(self, Self::OptionsShortcut) || self.children().iter().any(Self::has_options_shortcut)
    }

    /// Replaces every `options` placeholder with an optional group of the
    /// documented options not otherwise referenced by the tree.
    pub fn expand_options_shortcut(&mut self, options: &OptionArena) {
        if !self.has_options_shortcut() {
            return;
        }
        let referenced = self.option_ids();
        let mut extra: Vec<OptionId> = Vec::new();
        for id in options.documented() {
            let id = options.canonical(id);
            let already = referenced
                .iter()
                .chain(extra.iter())
                .any(|&seen| options.same_identity(seen, id));
            if !already {
                extra.push(id);
            }
        }
        trace!(count = extra.len(), "Expanding options shortcut");
        let replacement = extra.into_iter().map(Self::Option).collect::<Vec<_>>();
        self.replace_shortcuts(&replacement);
    }

    fn replace_shortcuts(&mut self, replacement: &[Pattern]) {
        match self {
            Self::OptionsShortcut => *self = Self::Optional(replacement.to_vec()),
            Self::Required(children) | Self::Optional(children) | Self::Either(children) => {
                for child in children {
                    child.replace_shortcuts(replacement);
                }
            }
            Self::OneOrMore(child) => child.replace_shortcuts(replacement),
            _ => {}
        }
    }

    /// Normalises the tree before matching: identical options collapse onto
    /// one arena entry, and leaves that can occur more than once in a single
    /// usage line switch to list or count values.
    pub fn fix(&mut self, options: &mut OptionArena) {
        self.fix_identities(options);
        self.fix_repeating(options);
    }

    fn fix_identities(&mut self, options: &OptionArena) {
        match self {
            Self::Option(id) => *id = options.canonical(*id),
            Self::Required(children) | Self::Optional(children) | Self::Either(children) => {
                for child in children {
                    child.fix_identities(options);
                }
            }
            Self::OneOrMore(child) => child.fix_identities(options),
            _ => {}
        }
    }

    fn fix_repeating(&mut self, options: &mut OptionArena) {
        let mut repeated: Vec<LeafKey> = Vec::new();
        for case in self.expand_cases() {
            let mut counts: HashMap<LeafKey, usize> = HashMap::new();
            for leaf in &case {
                if let Some(key) = leaf.key() {
                    *counts.entry(key).or_default() += 1;
                }
            }
            for leaf in &case {
                if let Some(key) = leaf.key()
                    && counts[&key] > 1
                    && !repeated.contains(&key)
                {
                    repeated.push(key);
                }
            }
        }

        for key in repeated {
            trace!(leaf = ?key, "Leaf repeats; switching to accumulating value");
            match &key {
                LeafKey::Option(id) => {
                    let option = options.get_mut(*id);
                    option.value = if option.takes_value() {
                        std::mem::take(&mut option.value).into_list()
                    } else {
                        Value::Count(0)
                    };
                }
                LeafKey::Argument(_) => self.update_leaf_values(&key, &|value| {
                    *value = std::mem::take(value).into_list();
                }),
                LeafKey::Command(_) => self.update_leaf_values(&key, &|value| {
                    *value = Value::Count(0);
                }),
            }
        }
    }

    fn update_leaf_values(&mut self, key: &LeafKey, update: &dyn Fn(&mut Value)) {
        if self.key().as_ref() == Some(key) {
            if let Self::Argument { value, .. } | Self::Command { value, .. } = self {
                update(value);
            }
            return;
        }
        match self {
            Self::Required(children) | Self::Optional(children) | Self::Either(children) => {
                for child in children {
                    child.update_leaf_values(key, update);
                }
            }
            Self::OneOrMore(child) => child.update_leaf_values(key, update),
            _ => {}
        }
    }

    pub(crate) fn key(&self) -> Option<LeafKey> {
        match self {
            Self::Argument { name, .. } => Some(LeafKey::Argument(name.clone())),
            Self::Command { name, .. } => Some(LeafKey::Command(name.clone())),
            Self::Option(id) => Some(LeafKey::Option(*id)),
            _ => None,
        }
    }

    /// Expands the tree into its alternative flat leaf sequences. A
    /// `OneOrMore` contributes its child twice so repeatable leaves show up
    /// as duplicates.
    fn expand_cases(&self) -> Vec<Vec<&Pattern>> {
        let mut cases = Vec::new();
        let mut groups: VecDeque<Vec<&Pattern>> = VecDeque::from([vec![self]]);
        while let Some(mut group) = groups.pop_front() {
            let Some(idx) = group.iter().position(|p| !p.is_leaf()) else {
                cases.push(group);
                continue;
            };
            let branch = group.remove(idx);
            match branch {
                Self::Either(alternatives) => {
                    for alternative in alternatives {
                        let mut next = vec![alternative];
                        next.extend(group.iter().copied());
                        groups.push_back(next);
                    }
                }
                Self::OneOrMore(child) => {
                    let mut next = vec![child.as_ref(), child.as_ref()];
                    next.extend(group);
                    groups.push_back(next);
                }
                other => {
                    let mut next = other.children().iter().collect::<Vec<_>>();
                    next.extend(group);
                    groups.push_back(next);
                }
            }
        }
        cases
    }

    /// Final `(kind, name, value)` of every leaf in the tree, in order.
    pub fn leaf_values<'a>(&'a self, options: &'a OptionArena) -> Vec<(LeafKind, &'a str, &'a Value)> {
        self.leaves()
            .into_iter()
            .filter_map(|leaf| match leaf {
                Self::Argument { name, value } => Some((LeafKind::Argument, name.as_str(), value)),
                Self::Command { name, value } => Some((LeafKind::Command, name.as_str(), value)),
                Self::Option(id) => {
                    let option = options.get(*id);
                    Some((LeafKind::Option, option.name(), &option.value))
                }
                _ => None,
            })
            .collect()
    }
}
