//! Positional token cursor shared by the grammar and argv parsers.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{Error, ErrorKind};

/// Grouping punctuation is padded with spaces before splitting.
static GROUPING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\[\]\(\)\|]|\.\.\.)").expect("static regex must compile"));

/// A `<placeholder with spaces>` stays one token.
static PATTERN_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S*<.*?>|\S+").expect("static regex must compile"));

/// An ordered, consumable sequence of tokens.
///
/// The cursor carries the [`ErrorKind`] to report with, so the same
/// option-parsing routines raise language errors while reading usage text
/// and input errors while reading argv.
#[derive(Debug, Clone)]
pub struct Tokens {
    items: Vec<String>,
    pos: usize,
    kind: ErrorKind,
}

impl Tokens {
    pub fn new<I, S>(items: I, kind: ErrorKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: items.into_iter().map(Into::into).collect(),
            pos: 0,
            kind,
        }
    }

    /// Tokenises a formal usage string.
    ///
    /// # Examples
    ///
    /// ```
    /// use usage_grammar_core::tokens::Tokens;
    ///
    /// let tokens = Tokens::from_pattern("[-v] <input file>...|go");
    /// assert_eq!(
    ///     tokens.remaining(),
    ///     ["[", "-v", "]", "<input file>", "...", "|", "go"]
    /// );
    /// ```
    pub fn from_pattern(source: &str) -> Self {
        let spaced = GROUPING_RE.replace_all(source, " $1 ");
        let items = PATTERN_TOKEN_RE
            .find_iter(&spaced)
            .map(|m| m.as_str().to_string())
            .collect::<Vec<_>>();
        Self::new(items, ErrorKind::Language)
    }

    /// Returns the current token without consuming it.
    pub fn current(&self) -> Option<&str> {
        self.items.get(self.pos).map(String::as_str)
    }

    /// Consumes and returns the current token. Never moves past the end.
    pub fn advance(&mut self) -> Option<String> {
        let token = self.items.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Consumes every remaining token.
    pub fn drain(&mut self) -> Vec<String> {
        let rest = self.items[self.pos..].to_vec();
        self.pos = self.items.len();
        rest
    }

    pub fn remaining(&self) -> &[String] {
        &self.items[self.pos..]
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is_input(&self) -> bool {
        self.kind == ErrorKind::Input
    }

    /// Builds an error of this cursor's kind.
    pub fn error(&self, message: impl Into<String>) -> Error {
        Error::of_kind(self.kind, message)
    }
}
