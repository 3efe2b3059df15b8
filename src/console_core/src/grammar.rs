//! # Command-line grammar
//!
//! ```text
//! command    := [target-sel WS] verb WS command-name [WS arg-list]
//! target-sel := "@" ident | "@@" ident | "#" ident | "##" ident | "select"
//! verb       := "get" | "set" | "call"
//! arg-list   := token (WS token)*
//! ```
//!
//! * Tokenization splits on runs of whitespace; there is no quoting.
//! * Verbs and `select` match ignoring ASCII case, command names are
//!   lowercased, arguments pass through verbatim.
//! * For `set` the remaining tokens are joined with single spaces into one
//!   value, so `set spawn 1, 2, 3` carries the value `1, 2, 3`.
//!
//! [`ParseError`] reports: `Empty`, `MissingVerbAfterTarget`, `UnknownVerb`
//! and `MissingCommandName`.

use core::fmt;

use thiserror::Error;
use tracing::trace;

/// Literal selector that targets the host's current selection.
pub const SELECT_KEYWORD: &str = "select";

/// Selector sigils, longest first so `@@` wins over `@`.
pub const SELECTOR_PREFIXES: [&str; 4] = ["@@", "##", "@", "#"];

/// One whitespace-delimited token and its byte offset in the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    pub start: usize,
}

impl Token<'_> {
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }
}

/// Splits `line` on runs of whitespace, dropping empty tokens.
pub fn tokenize(line: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut start: Option<usize> = None;

    for (i, ch) in line.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(s)) => {
                tokens.push(Token { text: &line[s..i], start: s });
                start = None;
            }
            (false, None) => start = Some(i),
            _ => {}
        }
    }
    if let Some(s) = start {
        tokens.push(Token { text: &line[s..], start: s });
    }
    tokens
}

/// The action requested against a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Set,
    Call,
}

impl Verb {
    pub const ALL: [Verb; 3] = [Verb::Get, Verb::Set, Verb::Call];

    /// Matches `get`, `set` or `call`, ignoring ASCII case.
    pub fn parse(token: &str) -> Option<Verb> {
        Verb::ALL.into_iter().find(|v| v.as_str().eq_ignore_ascii_case(token))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Get => "get",
            Verb::Set => "set",
            Verb::Call => "call",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which instances a command applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    None,
    /// `@name`: the first object with that name.
    ByOwnerName(String),
    /// `@@name`: every object with that name.
    AllByOwnerName(String),
    /// `#tag`: the first object with that tag.
    ByTag(String),
    /// `##tag`: every object with that tag.
    AllByTag(String),
    /// `select`: the host's current selection.
    CurrentSelection,
}

impl TargetSpec {
    pub fn is_none(&self) -> bool {
        matches!(self, TargetSpec::None)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::None => Ok(()),
            TargetSpec::ByOwnerName(n) => write!(f, "@{n}"),
            TargetSpec::AllByOwnerName(n) => write!(f, "@@{n}"),
            TargetSpec::ByTag(t) => write!(f, "#{t}"),
            TargetSpec::AllByTag(t) => write!(f, "##{t}"),
            TargetSpec::CurrentSelection => f.write_str(SELECT_KEYWORD),
        }
    }
}

/// Selector sigil at the start of `token`, if any.
pub fn selector_prefix(token: &str) -> Option<&'static str> {
    SELECTOR_PREFIXES.into_iter().find(|p| token.starts_with(*p))
}

/// Recognizes a target selector token.
///
/// A bare sigil (`@`) is still a selector; it names the empty identifier and
/// fails at resolution.
pub fn parse_selector(token: &str) -> Option<TargetSpec> {
    if token.eq_ignore_ascii_case(SELECT_KEYWORD) {
        return Some(TargetSpec::CurrentSelection);
    }
    let prefix = selector_prefix(token)?;
    let ident = token[prefix.len()..].to_string();
    Some(match prefix {
        "@@" => TargetSpec::AllByOwnerName(ident),
        "@" => TargetSpec::ByOwnerName(ident),
        "##" => TargetSpec::AllByTag(ident),
        _ => TargetSpec::ByTag(ident),
    })
}

/// A fully recognized command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub target: TargetSpec,
    pub verb: Verb,
    pub command_name: String,
    pub args: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("missing verb after target")]
    MissingVerbAfterTarget,

    #[error("unknown verb '{0}' (expected get, set or call)")]
    UnknownVerb(String),

    #[error("missing command name")]
    MissingCommandName,
}

/// Parses one command line.
pub fn parse(line: &str) -> Result<ParsedCommand, ParseError> {
    let tokens = tokenize(line);
    let first = tokens.first().ok_or(ParseError::Empty)?;

    let (target, verb_at) = match parse_selector(first.text) {
        Some(spec) => (spec, 1),
        None => (TargetSpec::None, 0),
    };

    let verb_token = match tokens.get(verb_at) {
        Some(t) => t.text,
        None => return Err(ParseError::MissingVerbAfterTarget),
    };
    let verb = Verb::parse(verb_token).ok_or_else(|| ParseError::UnknownVerb(verb_token.to_string()))?;

    let command_name = tokens
        .get(verb_at + 1)
        .ok_or(ParseError::MissingCommandName)?
        .text
        .to_lowercase();

    let rest = &tokens[verb_at + 2..];
    let args = match verb {
        Verb::Set if rest.is_empty() => Vec::new(),
        Verb::Set => vec![rest.iter().map(|t| t.text).collect::<Vec<_>>().join(" ")],
        _ => rest.iter().map(|t| t.text.to_string()).collect(),
    };

    let parsed = ParsedCommand { target, verb, command_name, args };
    trace!(?parsed, "command parsed");
    Ok(parsed)
}

// ================= TESTS ==========================

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(line: &str) -> Vec<&str> {
        tokenize(line).into_iter().map(|t| t.text).collect()
    }

    #[test]
    fn test_tokenize_collapses_whitespace() {
        assert_eq!(texts("  call   addhealth\t25 "), vec!["call", "addhealth", "25"]);
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t ").is_empty());
    }

    #[test]
    fn test_tokenize_records_offsets() {
        let tokens = tokenize("@Player1  get score");
        assert_eq!(tokens[0], Token { text: "@Player1", start: 0 });
        assert_eq!(tokens[1], Token { text: "get", start: 10 });
        assert_eq!(tokens[2].end(), 19);
    }

    #[test]
    fn test_selectors() {
        assert_eq!(parse_selector("@Player1"), Some(TargetSpec::ByOwnerName("Player1".into())));
        assert_eq!(parse_selector("@@Grunt"), Some(TargetSpec::AllByOwnerName("Grunt".into())));
        assert_eq!(parse_selector("#Enemy"), Some(TargetSpec::ByTag("Enemy".into())));
        assert_eq!(parse_selector("##Enemy"), Some(TargetSpec::AllByTag("Enemy".into())));
        assert_eq!(parse_selector("select"), Some(TargetSpec::CurrentSelection));
        assert_eq!(parse_selector("SELECT"), Some(TargetSpec::CurrentSelection));
        assert_eq!(parse_selector("@"), Some(TargetSpec::ByOwnerName(String::new())));
        assert_eq!(parse_selector("call"), None);
    }

    #[test]
    fn test_parse_without_target() {
        let parsed = parse("call restart").unwrap();
        assert_eq!(parsed.target, TargetSpec::None);
        assert_eq!(parsed.verb, Verb::Call);
        assert_eq!(parsed.command_name, "restart");
        assert!(parsed.args.is_empty());
    }

    #[test]
    fn test_parse_with_target_and_args() {
        let parsed = parse("##Enemy CALL God true").unwrap();
        assert_eq!(parsed.target, TargetSpec::AllByTag("Enemy".into()));
        assert_eq!(parsed.verb, Verb::Call);
        assert_eq!(parsed.command_name, "god");
        assert_eq!(parsed.args, vec!["true"]);
    }

    #[test]
    fn test_call_args_stay_separate_and_verbatim() {
        let parsed = parse("call teleport Player2 1,2,3").unwrap();
        assert_eq!(parsed.args, vec!["Player2", "1,2,3"]);
    }

    #[test]
    fn test_set_joins_value() {
        let parsed = parse("@Player1 set position 1,  2,   3").unwrap();
        assert_eq!(parsed.verb, Verb::Set);
        assert_eq!(parsed.args, vec!["1, 2, 3"]);

        let parsed = parse("set score").unwrap();
        assert!(parsed.args.is_empty());
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse(""), Err(ParseError::Empty));
        assert_eq!(parse("   "), Err(ParseError::Empty));
        assert_eq!(parse("@Player1"), Err(ParseError::MissingVerbAfterTarget));
        assert_eq!(parse("select"), Err(ParseError::MissingVerbAfterTarget));
        assert_eq!(parse("fetch score"), Err(ParseError::UnknownVerb("fetch".into())));
        assert_eq!(parse("@Player1 poke"), Err(ParseError::UnknownVerb("poke".into())));
        assert_eq!(parse("get"), Err(ParseError::MissingCommandName));
        assert_eq!(parse("#Enemy call"), Err(ParseError::MissingCommandName));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(ParseError::Empty.to_string(), "empty command");
        assert_eq!(ParseError::MissingVerbAfterTarget.to_string(), "missing verb after target");
        assert_eq!(ParseError::MissingCommandName.to_string(), "missing command name");
    }

    #[test]
    fn test_target_display_round_trips() {
        for line in ["@Player1", "@@Grunt", "#Enemy", "##Enemy", "select"] {
            assert_eq!(parse_selector(line).unwrap().to_string(), line);
        }
    }
}
