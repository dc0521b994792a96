//! Backtracking matcher that unifies a fixed [`Pattern`] tree with parsed
//! argv leaves.
//!
//! Each step takes the leaves still unconsumed (`left`) and the leaves bound
//! so far (`collected`) by value and hands back updated copies, so a failed
//! branch simply returns its inputs untouched.

use tracing::trace;

use crate::option::OptionArena;
use crate::pattern::{Leaf, Pattern};
use crate::value::Value;

static ABSENT: Value = Value::Absent;

/// Result of matching one pattern node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub matched: bool,
    /// Argv leaves not consumed by the match.
    pub left: Vec<Leaf>,
    /// Leaves bound during the match.
    pub collected: Vec<Leaf>,
}

impl MatchOutcome {
    fn success(left: Vec<Leaf>, collected: Vec<Leaf>) -> Self {
        Self {
            matched: true,
            left,
            collected,
        }
    }

    fn failure(left: Vec<Leaf>, collected: Vec<Leaf>) -> Self {
        Self {
            matched: false,
            left,
            collected,
        }
    }

    /// The whole argument vector was consumed by a successful match.
    pub fn is_complete(&self) -> bool {
        self.matched && self.left.is_empty()
    }
}

/// Matches patterns against argv leaves resolved from the same arena.
pub struct Matcher<'a> {
    options: &'a OptionArena,
}

impl<'a> Matcher<'a> {
    pub fn new(options: &'a OptionArena) -> Self {
        Self { options }
    }

    /// Matches `pattern` against `argv` with nothing collected yet.
    pub fn run(&self, pattern: &Pattern, argv: Vec<Leaf>) -> MatchOutcome {
        let outcome = self.match_pattern(pattern, argv, Vec::new());
        trace!(
            matched = outcome.matched,
            left = outcome.left.len(),
            collected = outcome.collected.len(),
            "Match finished"
        );
        outcome
    }

    pub fn match_pattern(
        &self,
        pattern: &Pattern,
        left: Vec<Leaf>,
        collected: Vec<Leaf>,
    ) -> MatchOutcome {
        match pattern {
            Pattern::Argument { .. } | Pattern::Command { .. } | Pattern::Option(_) => {
                self.match_leaf(pattern, left, collected)
            }
            Pattern::Required(children) => {
                let mut outcome = MatchOutcome::success(left.clone(), collected.clone());
                for child in children {
                    outcome = self.match_pattern(child, outcome.left, outcome.collected);
                    if !outcome.matched {
                        return MatchOutcome::failure(left, collected);
                    }
                }
                outcome
            }
            Pattern::Optional(children) => {
                let mut outcome = MatchOutcome::success(left, collected);
                for child in children {
                    let next = self.match_pattern(child, outcome.left, outcome.collected);
                    outcome = MatchOutcome::success(next.left, next.collected);
                }
                outcome
            }
            // Expanded before matching; an unexpanded one is an empty group.
            Pattern::OptionsShortcut => MatchOutcome::success(left, collected),
            Pattern::Either(children) => {
                let mut best: Option<MatchOutcome> = None;
                for child in children {
                    let outcome = self.match_pattern(child, left.clone(), collected.clone());
                    if outcome.matched
                        && best
                            .as_ref()
                            .is_none_or(|current| outcome.left.len() < current.left.len())
                    {
                        best = Some(outcome);
                    }
                }
                best.unwrap_or_else(|| MatchOutcome::failure(left, collected))
            }
            Pattern::OneOrMore(child) => {
                let mut outcome = MatchOutcome::success(left, collected);
                let mut rounds = 0usize;
                loop {
                    let before = outcome.left.len();
                    let next = self.match_pattern(child, outcome.left, outcome.collected);
                    let consumed = next.matched && next.left.len() < before;
                    if next.matched {
                        rounds += 1;
                    }
                    outcome = MatchOutcome::success(next.left, next.collected);
                    if !consumed {
                        break;
                    }
                }
                trace!(rounds, "Repetition finished");
                outcome
            }
        }
    }

    fn match_leaf(
        &self,
        pattern: &Pattern,
        mut left: Vec<Leaf>,
        mut collected: Vec<Leaf>,
    ) -> MatchOutcome {
        let Some((pos, mut found)) = self.single_match(pattern, &left) else {
            return MatchOutcome::failure(left, collected);
        };
        left.remove(pos);

        let increment = match self.default_value(pattern) {
            Value::Count(_) => Value::Count(1),
            Value::Items(_) => Value::Items(found.value().clone().into_increment()),
            _ => {
                collected.push(found);
                return MatchOutcome::success(left, collected);
            }
        };

        let name = found.name(self.options).map(str::to_string);
        let existing = collected
            .iter_mut()
            .find(|leaf| leaf.name(self.options) == name.as_deref());
        match existing {
            Some(existing) => accumulate(existing.value_mut(), increment),
            None => {
                *found.value_mut() = increment;
                collected.push(found);
            }
        }
        MatchOutcome::success(left, collected)
    }

    /// Finds the first argv leaf `pattern` can bind, returning its position
    /// and the leaf as it should be collected.
    fn single_match(&self, pattern: &Pattern, left: &[Leaf]) -> Option<(usize, Leaf)> {
        match pattern {
            Pattern::Argument { name, .. } => left.iter().enumerate().find_map(|(pos, leaf)| match leaf {
                Leaf::Argument { value, .. } => Some((
                    pos,
                    Leaf::Argument {
                        name: Some(name.clone()),
                        value: value.clone(),
                    },
                )),
                _ => None,
            }),
            // Only the first positional may be a command.
            Pattern::Command { name, .. } => {
                let (pos, leaf) = left
                    .iter()
                    .enumerate()
                    .find(|(_, leaf)| matches!(leaf, Leaf::Argument { .. }))?;
                (leaf.value().as_text() == Some(name.as_str())).then(|| {
                    (
                        pos,
                        Leaf::Command {
                            name: name.clone(),
                            value: Value::Flag(true),
                        },
                    )
                })
            }
            Pattern::Option(id) => left.iter().enumerate().find_map(|(pos, leaf)| match leaf {
                Leaf::Option { id: other, value } if self.options.same_identity(*id, *other) => Some((
                    pos,
                    Leaf::Option {
                        id: *id,
                        value: value.clone(),
                    },
                )),
                _ => None,
            }),
            _ => None,
        }
    }

    fn default_value<'p>(&'p self, pattern: &'p Pattern) -> &'p Value {
        match pattern {
            Pattern::Argument { value, .. } | Pattern::Command { value, .. } => value,
            Pattern::Option(id) => &self.options.get(*id).value,
            _ => &ABSENT,
        }
    }
}

fn accumulate(target: &mut Value, increment: Value) {
    match (target, increment) {
        (Value::Count(total), Value::Count(n)) => *total += n,
        (Value::Items(items), Value::Items(more)) => items.extend(more),
        (target, increment) => *target = increment,
    }
}
