//! Section extraction from free-form usage documents.
//!
//! A document holds one `usage:` section and any number of `options:`
//! sections. A section is the line containing its marker plus every
//! following line that starts with a space or tab.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::option::OptionSpec;

/// Start of an option description inside an options section.
static OPTION_START_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n[ \t]*(-\S+?)").expect("static regex must compile"));

/// Returns every section introduced by `name` (matched case-insensitively),
/// trimmed.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::sections::parse_section;
///
/// let doc = "Usage: prog go\n       prog stop\n\nOptions:\n  -v  Verbose.\n";
/// assert_eq!(parse_section("usage:", doc), ["Usage: prog go\n       prog stop"]);
/// assert_eq!(parse_section("options:", doc), ["Options:\n  -v  Verbose."]);
/// ```
pub fn parse_section(name: &str, source: &str) -> Vec<String> {
    let pattern = format!(
        r"(?im)^([^\r\n]*{}[^\r\n]*\r?\n?(?:[ \t].*?(?:\r?\n|$))*)",
        regex::escape(name)
    );
    let re = Regex::new(&pattern).expect("section regex must compile");
    re.find_iter(source)
        .map(|m| m.as_str().trim().to_string())
        .collect()
}

/// Returns the single `usage:` section of `doc`.
pub fn usage_section(doc: &str) -> Result<String> {
    let mut sections = parse_section("usage:", doc);
    match sections.len() {
        0 => Err(Error::language("\"usage:\" (case-insensitive) not found.")),
        1 => Ok(sections.remove(0)),
        _ => Err(Error::language(
            "More than one \"usage:\" (case-insensitive).",
        )),
    }
}

/// Rewrites a usage section into one alternation group per usage line.
///
/// The first word after the marker is the program name; each occurrence of
/// it starts a new group.
///
/// # Examples
///
/// ```
/// use usage_grammar_core::sections::formal_usage;
///
/// let formal = formal_usage("Usage: prog add <x>\n       prog rm <x>").unwrap();
/// assert_eq!(formal, "( add <x> ) | ( rm <x> )");
/// ```
pub fn formal_usage(section: &str) -> Result<String> {
    let body = section
        .split_once(':')
        .map_or(section, |(_, rest)| rest);
    let mut words = body.split_whitespace();
    let Some(program) = words.next() else {
        return Err(Error::language(
            "\"usage:\" section does not name a program.",
        ));
    };

    let parts = words
        .map(|word| if word == program { ") | (" } else { word })
        .collect::<Vec<_>>();
    let mut formal = String::from("( ");
    formal.push_str(&parts.join(" "));
    if !parts.is_empty() {
        formal.push(' ');
    }
    formal.push(')');
    debug!(program, formal = %formal, "Normalized usage section");
    Ok(formal)
}

/// Extracts the option registry from every `options:` section of `doc`.
///
/// Description lines begin with a dash-prefixed token; continuation lines
/// are folded into the preceding option. Order is preserved and duplicates
/// are kept.
pub fn parse_defaults(doc: &str) -> Vec<OptionSpec> {
    let mut defaults = Vec::new();
    for section in parse_section("options:", doc) {
        let body = section
            .split_once(':')
            .map_or(section.as_str(), |(_, rest)| rest);
        let text = format!("\n{body}");

        let starts = OPTION_START_RE
            .captures_iter(&text)
            .filter_map(|caps| Some((caps.get(0)?.start(), caps.get(1)?.start())))
            .collect::<Vec<_>>();
        for (idx, &(_, start)) in starts.iter().enumerate() {
            let end = starts
                .get(idx + 1)
                .map_or(text.len(), |&(next_line, _)| next_line);
            let chunk = &text[start..end];
            if chunk.starts_with('-') {
                defaults.push(OptionSpec::parse(chunk));
            }
        }
    }
    debug!(count = defaults.len(), "Parsed option defaults");
    defaults
}
