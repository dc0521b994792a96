//! Error types for usage parsing and argument matching.
//!
//! Failures fall into two phases: the usage document itself can be
//! malformed ([`Error::Language`]), or the supplied argument vector can fail
//! to conform to it ([`Error::Input`]). Typed accumulators add a third,
//! [`Error::Binding`], when a leaf has no registered field.

use thiserror::Error;

/// Errors produced while parsing usage text or matching arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The usage/options text is malformed.
    #[error("{message}")]
    Language { message: String },

    /// The argument vector does not match the usage.
    ///
    /// `usage` holds the usage section so callers can display it. It is
    /// empty while the error is still travelling up from the argv parser.
    #[error("{}", display_input(.message, .usage))]
    Input { message: String, usage: String },

    /// A matched leaf could not be stored into a typed target.
    #[error("can't find property {property} for argument {name}")]
    Binding { property: String, name: String },
}

/// Which of the two parse phases a token stream reports errors for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Parsing the usage pattern.
    Language,
    /// Parsing the argument vector.
    Input,
}

impl Error {
    pub fn language(message: impl Into<String>) -> Self {
        Self::Language {
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::Input {
            message: message.into(),
            usage: String::new(),
        }
    }

    pub(crate) fn of_kind(kind: ErrorKind, message: impl Into<String>) -> Self {
        match kind {
            ErrorKind::Language => Self::language(message),
            ErrorKind::Input => Self::input(message),
        }
    }

    /// Attaches the usage section to an input error. Other variants pass
    /// through unchanged.
    pub fn with_usage(self, usage: &str) -> Self {
        match self {
            Self::Input { message, .. } => Self::Input {
                message,
                usage: usage.to_string(),
            },
            other => other,
        }
    }

    /// Returns the phase that produced this error, if it is a parse error.
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Language { .. } => Some(ErrorKind::Language),
            Self::Input { .. } => Some(ErrorKind::Input),
            Self::Binding { .. } => None,
        }
    }

    /// The usage text carried by an input error, if any.
    pub fn usage(&self) -> Option<&str> {
        match self {
            Self::Input { usage, .. } if !usage.is_empty() => Some(usage),
            _ => None,
        }
    }
}

fn display_input(message: &str, usage: &str) -> String {
    match (message.is_empty(), usage.is_empty()) {
        (true, _) => usage.to_string(),
        (false, true) => message.to_string(),
        (false, false) => format!("{message}\n{usage}"),
    }
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_usage_only_touches_input_errors() {
        let err = Error::input("--ver is not a unique prefix").with_usage("usage: prog");
        assert_eq!(err.usage(), Some("usage: prog"));
        assert_eq!(
            err.to_string(),
            "--ver is not a unique prefix\nusage: prog"
        );

        let lang = Error::language("unmatched '('").with_usage("usage: prog");
        assert_eq!(lang.usage(), None);
        assert_eq!(lang.kind(), Some(ErrorKind::Language));
    }

    #[test]
    fn test_input_error_without_message_displays_usage() {
        let err = Error::input("").with_usage("usage: prog go");
        assert_eq!(err.to_string(), "usage: prog go");
    }
}
