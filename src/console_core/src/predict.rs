//! Autocomplete over partial command lines.
//!
//! The partial line is tokenized with the parser's rules; the number of
//! tokens (plus an empty one when the line ends in whitespace) gives the
//! grammatical position of the token being typed:
//!
//! ```text
//!   [sel]  verb  name  arg0  arg1 ...
//!    ^      ^     ^     ^
//!    |      |     |     +-- enum/bool literals, hint "f32 amount"
//!    |      |     +-------- names in the verb's map, static/instance filtered
//!    |      +-------------- get / set / call
//!    +--------------------- object names or tags from the host, or `select`
//! ```
//!
//! Prediction never fails; anything it cannot place yields no candidates.

use tracing::trace;

use crate::cache::CommandCache;
use crate::descriptor::{Invoker, MemberDescriptor};
use crate::dispatch::kind_for;
use crate::grammar::{SELECT_KEYWORD, Verb, parse_selector, selector_prefix, tokenize};
use crate::target::HostDirectory;
use crate::value::TypeTag;

/// Where the token being typed sits in the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Position<'a> {
    /// First token: a selector, `select` or a verb.
    Leading(&'a str),
    /// Verb following a selector.
    Verb(&'a str),
    CommandName { verb: Verb, targeted: bool, partial: &'a str },
    Argument { verb: Verb, name: &'a str, index: usize, partial: &'a str },
}

fn locate(partial: &str) -> Option<Position<'_>> {
    let mut words: Vec<&str> = tokenize(partial).into_iter().map(|t| t.text).collect();
    if words.is_empty() {
        return None;
    }
    if partial.ends_with(char::is_whitespace) {
        words.push("");
    }

    if words.len() == 1 {
        return Some(Position::Leading(words[0]));
    }

    let targeted = parse_selector(words[0]).is_some();
    let offset = usize::from(targeted);
    let current = words[words.len() - 1];

    if words.len() == offset + 1 {
        return Some(Position::Verb(current));
    }
    let verb = Verb::parse(words[offset])?;
    if words.len() == offset + 2 {
        return Some(Position::CommandName { verb, targeted, partial: current });
    }
    Some(Position::Argument {
        verb,
        name: words[offset + 1],
        index: words.len() - offset - 3,
        partial: current,
    })
}

fn starts_with_ignore_case(candidate: &str, partial: &str) -> bool {
    candidate.len() >= partial.len()
        && candidate.is_char_boundary(partial.len())
        && candidate[..partial.len()].eq_ignore_ascii_case(partial)
}

/// Exact match first, then alphabetical; duplicates removed.
fn rank(mut candidates: Vec<String>, partial: &str, max: usize) -> Vec<String> {
    candidates.sort_by(|a, b| {
        let exact_a = !a.eq_ignore_ascii_case(partial);
        let exact_b = !b.eq_ignore_ascii_case(partial);
        exact_a
            .cmp(&exact_b)
            .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
            .then_with(|| a.cmp(b))
    });
    candidates.dedup();
    candidates.truncate(max);
    candidates
}

fn matching<'s, I>(options: I, partial: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'s str>,
{
    options
        .into_iter()
        .filter(|o| starts_with_ignore_case(o, partial))
        .map(str::to_string)
        .collect()
}

fn verbs() -> impl Iterator<Item = &'static str> {
    Verb::ALL.into_iter().map(Verb::as_str)
}

pub struct Predictor<'a> {
    cache: &'a CommandCache,
    directory: &'a dyn HostDirectory,
    max_candidates: usize,
}

impl<'a> Predictor<'a> {
    pub fn new(cache: &'a CommandCache, directory: &'a dyn HostDirectory, max_candidates: usize) -> Self {
        Self { cache, directory, max_candidates }
    }

    /// Ranked completions for the token being typed at the end of `partial`.
    pub fn predict(&self, partial: &str) -> Vec<String> {
        let Some(position) = locate(partial) else {
            return Vec::new();
        };

        let (candidates, typed) = match &position {
            Position::Leading(word) => (self.leading(word), leading_text(word)),
            Position::Verb(word) => (matching(verbs(), word), *word),
            Position::CommandName { verb, targeted, partial } => {
                let names = self
                    .cache
                    .descriptors(kind_for(*verb))
                    .filter(|d| d.is_static() != *targeted)
                    .map(MemberDescriptor::name);
                (matching(names, partial), *partial)
            }
            Position::Argument { partial, .. } => {
                let literals = self.argument_type(&position).and_then(|t| t.literal_completions());
                (matching(literals.unwrap_or_default(), partial), *partial)
            }
        };

        let ranked = rank(candidates, typed, self.max_candidates);
        trace!(partial, ?position, found = ranked.len(), "prediction");
        ranked
    }

    /// Inline hint for the argument being typed: `f32 amount` for a call
    /// parameter, the value type for `set`.
    pub fn hint(&self, partial: &str) -> Option<String> {
        let position = locate(partial)?;
        let Position::Argument { verb, name, index, .. } = position else {
            return None;
        };
        let descriptor = self.cache.lookup(name, kind_for(verb))?;
        match descriptor.invoker() {
            Invoker::Callable { params, .. } => params.get(index).map(ToString::to_string),
            Invoker::Setter { value_type, .. } if index == 0 => Some(value_type.to_string()),
            _ => None,
        }
    }

    fn leading(&self, word: &str) -> Vec<String> {
        if word.eq_ignore_ascii_case(SELECT_KEYWORD) {
            return verbs().map(str::to_string).collect();
        }
        match selector_prefix(word) {
            Some(prefix) => {
                let suffix = &word[prefix.len()..];
                let known = if prefix.starts_with('@') { self.directory.known_names() } else { self.directory.known_tags() };
                known.into_iter().filter(|n| starts_with_ignore_case(n, suffix)).collect()
            }
            None => matching(core::iter::once(SELECT_KEYWORD).chain(verbs()), word),
        }
    }

    /// Declared type at an argument position, if one applies.
    fn argument_type(&self, position: &Position<'_>) -> Option<TypeTag> {
        let Position::Argument { verb, name, index, .. } = *position else {
            return None;
        };
        let descriptor = self.cache.lookup(name, kind_for(verb))?;
        match descriptor.invoker() {
            Invoker::Callable { params, .. } => params.get(index).map(|p| p.declared_type.clone()),
            Invoker::Setter { value_type, .. } if index == 0 => Some(value_type.clone()),
            _ => None,
        }
    }
}

/// The text a leading-token candidate is compared against for ranking.
fn leading_text(word: &str) -> &str {
    match selector_prefix(word) {
        Some(prefix) => &word[prefix.len()..],
        None => word,
    }
}

// ================= TESTS ==========================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::TypeUniverse;
    use crate::fixtures::{Scene, health_commands, player_commands, scene_commands};

    fn cache() -> CommandCache {
        let universe = TypeUniverse::new()
            .register(health_commands)
            .register(player_commands)
            .register(scene_commands);
        CommandCache::build(false, &universe)
    }

    fn predict(line: &str) -> Vec<String> {
        let cache = cache();
        let scene = Scene::demo();
        Predictor::new(&cache, &scene, 32).predict(line)
    }

    fn hint(line: &str) -> Option<String> {
        let cache = cache();
        let scene = Scene::demo();
        Predictor::new(&cache, &scene, 32).hint(line)
    }

    #[test]
    fn test_empty_input_has_no_candidates() {
        assert!(predict("").is_empty());
        assert!(predict("   ").is_empty());
    }

    #[test]
    fn test_owner_names_after_at() {
        assert_eq!(predict("@Play"), vec!["Player1", "Player2"]);
        assert_eq!(predict("@@gr"), vec!["Grunt"]);
        assert_eq!(predict("@"), vec!["Crate", "Grunt", "Player1", "Player2"]);
    }

    #[test]
    fn test_tags_after_hash() {
        assert_eq!(predict("#En"), vec!["Enemy"]);
        assert_eq!(predict("##p"), vec!["Player"]);
    }

    #[test]
    fn test_leading_plain_text() {
        assert_eq!(predict("sel"), vec!["select"]);
        assert_eq!(predict("s"), vec!["select", "set"]);
        assert_eq!(predict("ca"), vec!["call"]);
        assert_eq!(predict("select"), vec!["call", "get", "set"]);
    }

    #[test]
    fn test_verb_after_selector() {
        assert_eq!(predict("@Player1 g"), vec!["get"]);
        assert_eq!(predict("select "), vec!["call", "get", "set"]);
        assert_eq!(predict("#Enemy x"), Vec::<String>::new());
    }

    #[test]
    fn test_command_names_follow_target_presence() {
        // No target: static commands only.
        assert_eq!(predict("call "), vec!["add", "echo", "restart"]);
        assert_eq!(predict("get v"), vec!["version"]);
        // Target: instance commands only.
        assert_eq!(predict("@Player1 call "), vec!["addhealth", "debugdump", "drain", "explode", "setdifficulty"]);
        assert_eq!(predict("@Player1 get s"), vec!["score"]);
        assert!(predict("@Player1 call rest").is_empty());
    }

    #[test]
    fn test_unknown_verb_predicts_nothing() {
        assert!(predict("fetch sc").is_empty());
    }

    #[test]
    fn test_literal_arguments() {
        assert_eq!(predict("@Player1 call setdifficulty "), vec!["Easy", "Hard", "Normal"]);
        assert_eq!(predict("@Player1 call setdifficulty h"), vec!["Hard"]);
        assert!(predict("@Player1 call addhealth 1").is_empty());
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let cache = cache();
        let scene = Scene::demo();
        let predictor = Predictor::new(&cache, &scene, 32);
        assert_eq!(predictor.predict("@Player1 set points"), vec!["points"]);
        assert_eq!(rank(vec!["ab".into(), "a".into(), "Ab".into(), "a".into()], "ab", 8), vec!["Ab", "ab", "a"]);
    }

    #[test]
    fn test_truncates_to_max() {
        let cache = cache();
        let scene = Scene::demo();
        assert_eq!(Predictor::new(&cache, &scene, 2).predict("@"), vec!["Crate", "Grunt"]);
    }

    #[test]
    fn test_hints() {
        assert_eq!(hint("@Player1 call addhealth "), Some("f32 amount".into()));
        assert_eq!(hint("call add 1 "), Some("i32 b".into()));
        assert_eq!(hint("call add 1 2 "), None);
        assert_eq!(hint("@Player1 set score "), Some("i32".into()));
        assert_eq!(hint("@Player1 call "), None);
        assert_eq!(hint("call nothing "), None);
    }
}
