//! Argument-vector parsing into flat bound leaves.

use tracing::debug;

use crate::error::{ErrorKind, Result};
use crate::grammar::{parse_long, parse_shorts};
use crate::option::OptionArena;
use crate::pattern::Leaf;
use crate::tokens::Tokens;
use crate::value::Value;

enum TokenClass {
    Separator,
    Long,
    Shorts,
    Positional,
}

fn classify(token: &str) -> TokenClass {
    if token == "--" {
        TokenClass::Separator
    } else if token.starts_with("--") {
        TokenClass::Long
    } else if token.starts_with('-') && token != "-" {
        TokenClass::Shorts
    } else {
        TokenClass::Positional
    }
}

fn positional(value: String) -> Leaf {
    Leaf::Argument {
        name: None,
        value: Value::Text(value),
    }
}

/// Parses `argv` against the option registry.
///
/// ```text
/// options_first:  argv ::= [ long | shorts ]* [ argument ]* [ '--' [ argument ]* ] ;
/// otherwise:      argv ::= [ long | shorts | argument ]* [ '--' [ argument ]* ] ;
/// ```
///
/// `--` itself is kept as a positional so that usage lines can mention it.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::{Leaf, OptionArena, OptionSpec, Value, argv::parse_argv};
///
/// let mut options = OptionArena::from_documented(vec![
///     OptionSpec::new(Some("-v"), None, 0),
///     OptionSpec::new(Some("-o"), None, 1),
/// ]);
/// let leaves = parse_argv(["-voFILE", "x"], &mut options, false).unwrap();
/// assert_eq!(leaves.len(), 3);
/// assert_eq!(leaves[1].value(), &Value::Text("FILE".into()));
/// assert!(matches!(&leaves[2], Leaf::Argument { name: None, .. }));
/// ```
pub fn parse_argv<I, S>(argv: I, options: &mut OptionArena, options_first: bool) -> Result<Vec<Leaf>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut tokens = Tokens::new(argv, ErrorKind::Input);
    let mut parsed = Vec::new();

    while let Some(current) = tokens.current() {
        match classify(current) {
            TokenClass::Separator => {
                parsed.extend(tokens.drain().into_iter().map(positional));
            }
            TokenClass::Long => {
                let option = parse_long(&mut tokens, options)?;
                parsed.push(Leaf::Option {
                    id: option.id,
                    value: option.value,
                });
            }
            TokenClass::Shorts => {
                parsed.extend(
                    parse_shorts(&mut tokens, options)?
                        .into_iter()
                        .map(|option| Leaf::Option {
                            id: option.id,
                            value: option.value,
                        }),
                );
            }
            TokenClass::Positional if options_first => {
                parsed.extend(tokens.drain().into_iter().map(positional));
            }
            TokenClass::Positional => {
                if let Some(value) = tokens.advance() {
                    parsed.push(positional(value));
                }
            }
        }
    }

    debug!(count = parsed.len(), "Parsed argument vector");
    Ok(parsed)
}
