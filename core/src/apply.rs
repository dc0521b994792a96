//! Entry points: parse a usage document, match an argument vector against
//! it and hand the final leaf values to an accumulator.

use serde::Deserialize;
use tracing::debug;

use crate::accumulate::{Accumulator, Bindings, BindingsAccumulator};
use crate::argv::parse_argv;
use crate::error::{Error, Result};
use crate::grammar::parse_pattern;
use crate::matcher::Matcher;
use crate::option::OptionArena;
use crate::pattern::{Leaf, LeafKind, Pattern};
use crate::sections::{formal_usage, parse_defaults, usage_section};
use crate::value::Value;

/// Behaviour switches for [`apply`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Short-circuit to [`Outcome::Help`] when `-h` or `--help` is given.
    pub help: bool,
    /// Version text; when set, `--version` short-circuits to
    /// [`Outcome::Version`].
    pub version: Option<String>,
    /// Treat everything after the first positional argument as positional.
    pub options_first: bool,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            help: true,
            version: None,
            options_first: false,
        }
    }
}

impl ApplyConfig {
    pub fn with_help(mut self, help: bool) -> Self {
        self.help = help;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_options_first(mut self, options_first: bool) -> Self {
        self.options_first = options_first;
        self
    }
}

/// What applying a document to an argument vector produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The arguments matched; holds the accumulated result.
    Matched(T),
    /// Help was requested; holds the full document.
    Help(String),
    /// The version was requested; holds the configured version text.
    Version(String),
    Failed(Error),
}

impl<T> Outcome<T> {
    pub fn is_matched(&self) -> bool {
        matches!(self, Self::Matched(_))
    }

    pub fn matched(self) -> Option<T> {
        match self {
            Self::Matched(value) => Some(value),
            _ => None,
        }
    }

    /// Help and version requests become `Ok(None)`.
    pub fn into_result(self) -> Result<Option<T>> {
        match self {
            Self::Matched(value) => Ok(Some(value)),
            Self::Help(_) | Self::Version(_) => Ok(None),
            Self::Failed(err) => Err(err),
        }
    }
}

/// Parses `doc`, matches `argv` against its usage and returns the value of
/// every leaf keyed by name.
///
/// Leaves absent from `argv` keep their defaults: `false` for flags and
/// commands, `null` for arguments, the `[default: ...]` text for valued
/// options, and empty lists or zero counts for repeatable leaves.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{ApplyConfig, Outcome, Value, apply};
///
/// let doc = "Naval Fate.
///
/// Usage:
///   naval ship <name> move <x> <y> [--speed=<kn>]
///   naval -h | --help
///
/// Options:
///   -h --help     Show this screen.
///   --speed=<kn>  Speed in knots [default: 10].
/// ";
/// let config = ApplyConfig::default();
///
/// let bindings = apply(doc, ["ship", "Guardian", "move", "10", "50"], &config)
///     .matched()
///     .unwrap();
/// assert_eq!(bindings.text("<name>"), Some("Guardian"));
/// assert_eq!(bindings.text("--speed"), Some("10"));
/// assert_eq!(bindings.get("--help"), Some(&Value::Flag(false)));
///
/// assert!(matches!(apply(doc, ["--help"], &config), Outcome::Help(_)));
/// assert!(matches!(apply(doc, ["ship"], &config), Outcome::Failed(_)));
/// ```
pub fn apply<I, S>(doc: &str, argv: I, config: &ApplyConfig) -> Outcome<Bindings>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    apply_with(doc, argv, config, &BindingsAccumulator)
}

/// Like [`apply`], feeding each final leaf to `accumulator`.
pub fn apply_with<I, S, A>(doc: &str, argv: I, config: &ApplyConfig, accumulator: &A) -> Outcome<A::Output>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    A: Accumulator,
{
    run(doc, argv, config, accumulator).unwrap_or_else(Outcome::Failed)
}

/// A usage document parsed into its pattern tree and option registry.
pub(crate) struct Document {
    pub(crate) usage: String,
    pub(crate) pattern: Pattern,
    pub(crate) options: OptionArena,
}

impl Document {
    pub(crate) fn parse(doc: &str) -> Result<Self> {
        let usage = usage_section(doc)?;
        let mut options = OptionArena::from_documented(parse_defaults(doc));
        let formal = formal_usage(&usage)?;
        let pattern = parse_pattern(&formal, &mut options)?;
        Ok(Self {
            usage,
            pattern,
            options,
        })
    }

    /// Leaf `(kind, name, value)` triples of the fixed tree, one per name,
    /// in first-appearance order.
    pub(crate) fn defaults(&self) -> Vec<(LeafKind, String, Value)> {
        let mut out: Vec<(LeafKind, String, Value)> = Vec::new();
        for (kind, name, value) in self.pattern.leaf_values(&self.options) {
            overlay(&mut out, kind, name, value.clone());
        }
        out
    }
}

fn overlay(out: &mut Vec<(LeafKind, String, Value)>, kind: LeafKind, name: &str, value: Value) {
    match out.iter_mut().find(|(_, existing, _)| existing == name) {
        Some(entry) => entry.2 = value,
        None => out.push((kind, name.to_string(), value)),
    }
}

fn run<I, S, A>(doc: &str, argv: I, config: &ApplyConfig, accumulator: &A) -> Result<Outcome<A::Output>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
    A: Accumulator,
{
    let mut document = Document::parse(doc)?;
    let argv = parse_argv(argv, &mut document.options, config.options_first)
        .map_err(|err| err.with_usage(&document.usage))?;
    document.pattern.expand_options_shortcut(&document.options);

    if config.help && requested(&argv, &document.options, &["-h", "--help"]) {
        debug!("Help requested");
        return Ok(Outcome::Help(doc.to_string()));
    }
    if let Some(version) = &config.version
        && requested(&argv, &document.options, &["--version"])
    {
        debug!("Version requested");
        return Ok(Outcome::Version(version.clone()));
    }

    document.pattern.fix(&mut document.options);
    let outcome = Matcher::new(&document.options).run(&document.pattern, argv);
    if !outcome.is_complete() {
        debug!(
            matched = outcome.matched,
            left = outcome.left.len(),
            "Arguments do not match usage"
        );
        return Err(Error::input("").with_usage(&document.usage));
    }

    let mut leaves = document.defaults();
    for leaf in &outcome.collected {
        if let Some(name) = leaf.name(&document.options) {
            overlay(&mut leaves, leaf.kind(), name, leaf.value().clone());
        }
    }
    debug!(count = leaves.len(), "Arguments matched usage");

    let mut state = accumulator.new_state();
    for (kind, name, value) in leaves {
        match kind {
            LeafKind::Command => accumulator.command(&mut state, &name, value)?,
            LeafKind::Argument => accumulator.argument(&mut state, &name, value)?,
            LeafKind::Option => accumulator.option(&mut state, &name, value)?,
        }
    }
    Ok(Outcome::Matched(state))
}

/// Whether argv set any of the options called `names`.
fn requested(argv: &[Leaf], options: &OptionArena, names: &[&str]) -> bool {
    argv.iter().any(|leaf| {
        matches!(leaf, Leaf::Option { .. })
            && leaf.value().is_set()
            && leaf.name(options).is_some_and(|name| names.contains(&name))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "Usage: prog [options] <x>

Options:
  -h --help   Help.
  --version   Version.
  -q          Quiet.
";

    #[test]
    fn test_config_defaults() {
        let config = ApplyConfig::default();
        assert!(config.help);
        assert_eq!(config.version, None);
        assert!(!config.options_first);

        let config = config.with_help(false).with_version("1.0").with_options_first(true);
        assert!(!config.help);
        assert_eq!(config.version.as_deref(), Some("1.0"));
        assert!(config.options_first);
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ApplyConfig = serde_json::from_str(r#"{"version": "2.1"}"#).unwrap();
        assert_eq!(config, ApplyConfig::default().with_version("2.1"));
    }

    #[test]
    fn test_help_short_circuits_before_matching() {
        let outcome = apply(DOC, ["-h"], &ApplyConfig::default());
        assert_eq!(outcome, Outcome::Help(DOC.to_string()));
    }

    #[test]
    fn test_help_disabled_binds_flag() {
        let config = ApplyConfig::default().with_help(false);
        let bindings = apply(DOC, ["--help", "x"], &config).matched().unwrap();
        assert_eq!(bindings.flag("--help"), Some(true));
    }

    #[test]
    fn test_version_only_when_configured() {
        let config = ApplyConfig::default().with_version("prog 1.2");
        assert_eq!(
            apply(DOC, ["--version"], &config),
            Outcome::Version("prog 1.2".into())
        );

        let bindings = apply(DOC, ["--version", "x"], &ApplyConfig::default())
            .matched()
            .unwrap();
        assert_eq!(bindings.flag("--version"), Some(true));
    }

    #[test]
    fn test_mismatch_carries_usage() {
        let outcome = apply(DOC, Vec::<String>::new(), &ApplyConfig::default());
        let Outcome::Failed(err) = outcome else {
            panic!("expected failure, got {outcome:?}");
        };
        assert_eq!(err.usage(), Some("Usage: prog [options] <x>"));
        assert_eq!(err.to_string(), "Usage: prog [options] <x>");
    }

    #[test]
    fn test_argv_error_carries_usage() {
        let outcome = apply(DOC, ["--nope"], &ApplyConfig::default());
        let err = outcome.into_result().unwrap_err();
        assert_eq!(err.to_string(), "--nope is not recognized\nUsage: prog [options] <x>");
    }

    #[test]
    fn test_into_result() {
        assert_eq!(
            apply(DOC, ["-h"], &ApplyConfig::default()).into_result(),
            Ok(None)
        );
        let bindings = apply(DOC, ["-q", "x"], &ApplyConfig::default())
            .into_result()
            .unwrap()
            .unwrap();
        assert_eq!(bindings.flag("-q"), Some(true));
        assert_eq!(bindings.text("<x>"), Some("x"));
    }

    #[test]
    fn test_document_defaults_one_entry_per_name() {
        let document = Document::parse("usage: prog (add <x> | rm <x>)").unwrap();
        let names = document
            .defaults()
            .into_iter()
            .map(|(_, name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(names, ["add", "<x>", "rm"]);
    }
}
