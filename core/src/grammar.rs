//! Recursive-descent parser from formal usage to a [`Pattern`] tree.
//!
//! ```text
//! expr ::= seq ( '|' seq )* ;
//! seq  ::= ( atom [ '...' ] )* ;
//! atom ::= '(' expr ')' | '[' expr ']' | 'options'
//!        | long | shorts | argument | command ;
//! ```
//!
//! Option tokens are resolved against the [`OptionArena`]. The same long and
//! short option routines serve the argv parser; the token stream's
//! [`ErrorKind`](crate::ErrorKind) decides which behaviour applies.

use tracing::debug;

use crate::error::Result;
use crate::option::{OptionArena, OptionId, OptionSpec};
use crate::pattern::Pattern;
use crate::tokens::Tokens;
use crate::value::Value;

/// One resolved option occurrence. `value` is only meaningful when parsing
/// argv: the bound text, or `true` for flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedOption {
    pub(crate) id: OptionId,
    pub(crate) value: Value,
}

/// Parses a formal usage string (see [`formal_usage`](crate::sections::formal_usage)).
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{OptionArena, Pattern, grammar::parse_pattern};
///
/// let mut options = OptionArena::new();
/// let tree = parse_pattern("( add <x> ) | ( rm <x> )", &mut options).unwrap();
/// let Pattern::Required(top) = &tree else { panic!("root is required") };
/// assert!(matches!(top.as_slice(), [Pattern::Either(alternatives)] if alternatives.len() == 2));
/// ```
pub fn parse_pattern(source: &str, options: &mut OptionArena) -> Result<Pattern> {
    let mut tokens = Tokens::from_pattern(source);
    let result = parse_expr(&mut tokens, options)?;
    if tokens.current().is_some() {
        return Err(tokens.error(format!(
            "unexpected ending: {}",
            tokens.remaining().join(" ")
        )));
    }
    debug!(options = options.len(), "Parsed usage pattern");
    Ok(Pattern::Required(result))
}

fn parse_expr(tokens: &mut Tokens, options: &mut OptionArena) -> Result<Vec<Pattern>> {
    let seq = parse_seq(tokens, options)?;
    if tokens.current() != Some("|") {
        return Ok(seq);
    }

    let mut alternatives = Vec::new();
    push_alternative(&mut alternatives, seq);
    while tokens.current() == Some("|") {
        tokens.advance();
        let seq = parse_seq(tokens, options)?;
        push_alternative(&mut alternatives, seq);
    }

    let mut unique: Vec<Pattern> = Vec::with_capacity(alternatives.len());
    for alternative in alternatives {
        if !unique.contains(&alternative) {
            unique.push(alternative);
        }
    }
    if unique.len() > 1 {
        Ok(vec![Pattern::Either(unique)])
    } else {
        Ok(unique)
    }
}

fn push_alternative(alternatives: &mut Vec<Pattern>, mut seq: Vec<Pattern>) {
    if seq.len() > 1 {
        alternatives.push(Pattern::Required(seq));
    } else {
        alternatives.append(&mut seq);
    }
}

fn parse_seq(tokens: &mut Tokens, options: &mut OptionArena) -> Result<Vec<Pattern>> {
    let mut result = Vec::new();
    while !matches!(tokens.current(), None | Some("]" | ")" | "|")) {
        let mut atom = parse_atom(tokens, options)?;
        if tokens.current() == Some("...") {
            tokens.advance();
            let repeated = if atom.len() == 1 {
                atom.remove(0)
            } else {
                Pattern::Required(atom)
            };
            result.push(Pattern::OneOrMore(Box::new(repeated)));
            return Ok(result);
        }
        result.extend(atom);
    }
    Ok(result)
}

fn parse_atom(tokens: &mut Tokens, options: &mut OptionArena) -> Result<Vec<Pattern>> {
    let Some(token) = tokens.current().map(str::to_string) else {
        return Err(tokens.error("unexpected end of usage pattern"));
    };

    match token.as_str() {
        "(" | "[" => {
            tokens.advance();
            let inner = parse_expr(tokens, options)?;
            let (closing, group) = if token == "(" {
                (")", Pattern::Required(inner))
            } else {
                ("]", Pattern::Optional(inner))
            };
            if tokens.advance().as_deref() != Some(closing) {
                return Err(tokens.error(format!("unmatched '{token}'")));
            }
            Ok(vec![group])
        }
        "options" => {
            tokens.advance();
            Ok(vec![Pattern::OptionsShortcut])
        }
        t if t.starts_with("--") && t != "--" => {
            let parsed = parse_long(tokens, options)?;
            Ok(vec![Pattern::Option(parsed.id)])
        }
        t if t.starts_with('-') && t != "-" && t != "--" => Ok(parse_shorts(tokens, options)?
            .into_iter()
            .map(|parsed| Pattern::Option(parsed.id))
            .collect()),
        t if is_argument_name(t) => {
            let argument = Pattern::argument(t);
            tokens.advance();
            Ok(vec![argument])
        }
        t => {
            let command = Pattern::command(t);
            tokens.advance();
            Ok(vec![command])
        }
    }
}

/// `<placeholder>` or an upper-case word such as `FILE` or `OUT_DIR`.
pub(crate) fn is_argument_name(token: &str) -> bool {
    (token.starts_with('<') && token.ends_with('>'))
        || (token.chars().any(char::is_uppercase) && !token.chars().any(char::is_lowercase))
}

/// Parses `--name`, `--name=value` or `--name value`.
///
/// When reading argv, a unique prefix of a known long option is accepted
/// and an unknown option is an error. When reading usage, unknown options
/// are registered with arity inferred from `=`.
pub(crate) fn parse_long(tokens: &mut Tokens, options: &mut OptionArena) -> Result<ParsedOption> {
    let token = tokens.advance().unwrap_or_default();
    let (long, mut value) = match token.split_once('=') {
        Some((long, value)) => (long.to_string(), Some(value.to_string())),
        None => (token, None),
    };

    let mut similar = options.with_long(&long);
    if tokens.is_input() && similar.is_empty() {
        similar = options.with_long_prefix(&long);
    }

    if similar.len() > 1 {
        let names = similar
            .iter()
            .map(|&id| options.name(id))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(tokens.error(format!("{long} is not a unique prefix: {names}?")));
    }

    let Some(&id) = similar.first() else {
        if tokens.is_input() {
            return Err(tokens.error(format!("{long} is not recognized")));
        }
        let arity = u8::from(value.is_some());
        let id = options.push(OptionSpec::new(None, Some(&long), arity));
        return Ok(ParsedOption {
            id,
            value: Value::Absent,
        });
    };

    let option = options.get(id);
    if option.takes_value() {
        if value.is_none() {
            if matches!(tokens.current(), None | Some("--")) {
                return Err(tokens.error(format!("{} requires argument", option.name())));
            }
            value = tokens.advance();
        }
    } else if value.is_some() {
        return Err(tokens.error(format!("{} must not have an argument", option.name())));
    }

    Ok(ParsedOption {
        id,
        value: value.map_or(Value::Flag(true), Value::Text),
    })
}

/// Parses a cluster of short options such as `-v`, `-vx` or `-ofile`.
///
/// An option that takes a value swallows the rest of the cluster, or the
/// next token when the cluster is exhausted. Unknown short options are
/// registered as flags.
pub(crate) fn parse_shorts(
    tokens: &mut Tokens,
    options: &mut OptionArena,
) -> Result<Vec<ParsedOption>> {
    let token = tokens.advance().unwrap_or_default();
    let mut left = token.trim_start_matches('-');
    let mut parsed = Vec::new();

    while let Some(ch) = left.chars().next() {
        let short = format!("-{ch}");
        left = &left[ch.len_utf8()..];

        let similar = options.with_short(&short);
        if similar.len() > 1 {
            return Err(tokens.error(format!(
                "{short} is specified ambiguously {} times",
                similar.len()
            )));
        }

        let Some(&id) = similar.first() else {
            let id = options.push(OptionSpec::new(Some(&short), None, 0));
            parsed.push(ParsedOption {
                id,
                value: Value::Flag(true),
            });
            continue;
        };

        let value = if options.get(id).takes_value() {
            if left.is_empty() {
                if matches!(tokens.current(), None | Some("--")) {
                    return Err(tokens.error(format!("{short} requires argument")));
                }
                tokens.advance()
            } else {
                let rest = left.to_string();
                left = "";
                Some(rest)
            }
        } else {
            None
        };

        parsed.push(ParsedOption {
            id,
            value: value.map_or(Value::Flag(true), Value::Text),
        });
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};

    fn documented(specs: &[OptionSpec]) -> OptionArena {
        OptionArena::from_documented(specs.to_vec())
    }

    #[test]
    fn test_parse_pattern_is_deterministic() {
        let source = "( ship new <name>... ) | ( ship <name> move <x> <y> [--speed=<kn>] )";
        let first = parse_pattern(source, &mut OptionArena::new()).unwrap();
        let second = parse_pattern(source, &mut OptionArena::new()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_argument_and_command_classification() {
        assert!(is_argument_name("<file>"));
        assert!(is_argument_name("FILE"));
        assert!(is_argument_name("OUT_DIR"));
        assert!(!is_argument_name("add"));
        assert!(!is_argument_name("Mixed"));
    }

    #[test]
    fn test_single_alternative_is_unwrapped() {
        let tree = parse_pattern("( go ) | ( go )", &mut OptionArena::new()).unwrap();
        assert_eq!(
            tree,
            Pattern::Required(vec![Pattern::Required(vec![Pattern::command("go")])])
        );
    }

    #[test]
    fn test_multi_element_alternative_is_wrapped_in_required() {
        let tree = parse_pattern("a b | c", &mut OptionArena::new()).unwrap();
        assert_eq!(
            tree,
            Pattern::Required(vec![Pattern::Either(vec![
                Pattern::Required(vec![Pattern::command("a"), Pattern::command("b")]),
                Pattern::command("c"),
            ])])
        );
    }

    #[test]
    fn test_ellipsis_wraps_preceding_atom() {
        let tree = parse_pattern("go <a>...", &mut OptionArena::new()).unwrap();
        assert_eq!(
            tree,
            Pattern::Required(vec![
                Pattern::command("go"),
                Pattern::OneOrMore(Box::new(Pattern::argument("<a>"))),
            ])
        );
    }

    #[test]
    fn test_ellipsis_ends_the_sequence() {
        let err = parse_pattern("<a>... <b>", &mut OptionArena::new()).unwrap_err();
        assert_eq!(err, Error::language("unexpected ending: <b>"));

        let err = parse_pattern("( <a>... <b> )", &mut OptionArena::new()).unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::Language));

        let tree = parse_pattern("( <a>... ) | ( <b> )", &mut OptionArena::new()).unwrap();
        assert!(matches!(&tree, Pattern::Required(top) if matches!(top.as_slice(), [Pattern::Either(_)])));
    }

    #[test]
    fn test_unmatched_group_is_language_error() {
        let err = parse_pattern("( [ go )", &mut OptionArena::new()).unwrap_err();
        assert_eq!(err, Error::language("unmatched '['"));

        let err = parse_pattern("( go", &mut OptionArena::new()).unwrap_err();
        assert_eq!(err, Error::language("unmatched '('"));
    }

    #[test]
    fn test_trailing_tokens_are_unexpected_ending() {
        let err = parse_pattern("( go ) )", &mut OptionArena::new()).unwrap_err();
        assert_eq!(err, Error::language("unexpected ending: )"));
    }

    #[test]
    fn test_unknown_long_registered_with_inferred_arity() {
        let mut options = OptionArena::new();
        parse_pattern("--flag --file=<f>", &mut options).unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options.get(options.with_long("--flag")[0]).arity, 0);
        assert_eq!(options.get(options.with_long("--file")[0]).arity, 1);
    }

    #[test]
    fn test_documented_valued_long_consumes_placeholder() {
        let mut options = documented(&[OptionSpec::new(None, Some("--speed"), 1)]);
        let tree = parse_pattern("--speed <kn>", &mut options).unwrap();
        assert_eq!(tree.leaves().len(), 1);
        assert_eq!(options.len(), 1);
    }

    #[test]
    fn test_short_cluster_in_usage() {
        let mut options = documented(&[OptionSpec::new(Some("-o"), None, 1)]);
        let tree = parse_pattern("-vo FILE", &mut options).unwrap();
        assert_eq!(tree.leaves().len(), 2);
        assert_eq!(options.with_short("-v").len(), 1);
    }

    #[test]
    fn test_options_shortcut_token() {
        let tree = parse_pattern("[options] go", &mut OptionArena::new()).unwrap();
        assert!(tree.has_options_shortcut());
    }

    #[test]
    fn test_parse_long_prefix_only_in_input_mode() {
        let mut options = documented(&[OptionSpec::new(None, Some("--verbose"), 0)]);

        let mut argv = Tokens::new(["--verb"], ErrorKind::Input);
        let parsed = parse_long(&mut argv, &mut options).unwrap();
        assert_eq!(options.name(parsed.id), "--verbose");
        assert_eq!(parsed.value, Value::Flag(true));

        let mut usage = Tokens::new(["--verb"], ErrorKind::Language);
        let parsed = parse_long(&mut usage, &mut options).unwrap();
        assert_eq!(options.name(parsed.id), "--verb");
    }

    #[test]
    fn test_parse_long_value_errors() {
        let mut options = documented(&[
            OptionSpec::new(None, Some("--quiet"), 0),
            OptionSpec::new(None, Some("--file"), 1),
        ]);

        let mut argv = Tokens::new(["--quiet=yes"], ErrorKind::Input);
        assert_eq!(
            parse_long(&mut argv, &mut options).unwrap_err(),
            Error::input("--quiet must not have an argument")
        );

        let mut argv = Tokens::new(["--file", "--"], ErrorKind::Input);
        assert_eq!(
            parse_long(&mut argv, &mut options).unwrap_err(),
            Error::input("--file requires argument")
        );
    }

    #[test]
    fn test_duplicate_long_definition_in_usage() {
        let mut options = documented(&[
            OptionSpec::new(None, Some("--x"), 0),
            OptionSpec::new(None, Some("--x"), 0),
        ]);
        assert_eq!(
            parse_pattern("--x", &mut options).unwrap_err(),
            Error::language("--x is not a unique prefix: --x, --x?")
        );
    }

    #[test]
    fn test_duplicate_long_definition_in_argv() {
        let mut options = documented(&[
            OptionSpec::new(None, Some("--x"), 0),
            OptionSpec::new(None, Some("--x"), 0),
        ]);
        let mut argv = Tokens::new(["--x"], ErrorKind::Input);
        assert_eq!(
            parse_long(&mut argv, &mut options).unwrap_err(),
            Error::input("--x is not a unique prefix: --x, --x?")
        );
    }

    #[test]
    fn test_parse_shorts_ambiguous_definition() {
        let mut options = documented(&[
            OptionSpec::new(Some("-x"), Some("--ex"), 0),
            OptionSpec::new(Some("-x"), Some("--exit"), 0),
        ]);
        let mut argv = Tokens::new(["-x"], ErrorKind::Input);
        assert_eq!(
            parse_shorts(&mut argv, &mut options).unwrap_err(),
            Error::input("-x is specified ambiguously 2 times")
        );
    }
}
