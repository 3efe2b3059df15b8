//! Tab completion over console predictions.
//!
//! The token being completed is the last word before the cursor, minus any
//! leading selector sigils (`@`, `@@`, `#`, `##`), which are kept as typed.
//!
//! - one candidate: the token is replaced and a space appended;
//! - several: the token grows to their longest common prefix, and further
//!   Tab / Shift+Tab presses cycle through the candidates;
//! - none: nothing changes.
//!
//! A complete `select` keyword is never replaced: Tab only adds the space
//! that moves on to the verb.
//!
//! Any other key ends a cycle (see [`Autocomplete::reset`]).

use console_core::grammar::SELECT_KEYWORD;

/// Cycle through the candidates of one completion.
struct Cycle {
    head: String,             // Text before the completed token
    candidates: Vec<String>,  // Predictions for the token
    index: Option<usize>,     // Selected candidate, None before the first cycle step
    shown: String,            // Text before the cursor after the last step
}

#[derive(Default)]
pub struct Autocomplete {
    cycle: Option<Cycle>,
}

/// Byte offset where the token being completed starts.
fn token_start(before: &str) -> usize {
    let word = before.len() - before.rsplit(char::is_whitespace).next().map_or(0, str::len);
    let sigils = before[word..].len() - before[word..].trim_start_matches(['@', '#']).len();
    word + sigils
}

/// Longest prefix shared by all candidates, ignoring ASCII case; the
/// spelling of the first candidate is kept.
fn longest_common_prefix(candidates: &[String]) -> &str {
    let Some(first) = candidates.first() else { return "" };
    let mut len = first.len();
    for other in &candidates[1..] {
        len = first
            .char_indices()
            .zip(other.chars())
            .take_while(|((_, a), b)| a.eq_ignore_ascii_case(b))
            .last()
            .map_or(0, |((i, a), _)| i + a.len_utf8())
            .min(len);
    }
    &first[..len]
}

impl Autocomplete {
    pub fn new() -> Self {
        Self::default()
    }

    /// Completes `before` (the text before the cursor). `predict` is asked
    /// for candidates unless a cycle over the same text is in progress.
    /// Returns the replacement for `before`, or `None` when nothing applies.
    pub fn complete<F>(&mut self, before: &str, reverse: bool, predict: F) -> Option<String>
    where
        F: FnOnce(&str) -> Vec<String>,
    {
        if let Some(cycle) = self.cycle.as_mut().filter(|c| c.shown == before) {
            let len = cycle.candidates.len();
            let index = match (cycle.index, reverse) {
                (None, false) => 0,
                (None, true) => len - 1,
                (Some(i), false) => (i + 1) % len,
                (Some(i), true) => (i + len - 1) % len,
            };
            cycle.index = Some(index);
            cycle.shown = format!("{}{} ", cycle.head, cycle.candidates[index]);
            return Some(cycle.shown.clone());
        }

        self.cycle = None;
        if before.trim_start().eq_ignore_ascii_case(SELECT_KEYWORD) {
            return Some(format!("{before} "));
        }
        let candidates = predict(before);
        let start = token_start(before);
        let (head, token) = before.split_at(start);

        match candidates.len() {
            0 => None,
            1 => Some(format!("{head}{} ", candidates[0])),
            _ => {
                let prefix = longest_common_prefix(&candidates);
                let grown = prefix.len() > token.len();
                let mut cycle = Cycle {
                    head: head.to_string(),
                    shown: format!("{head}{prefix}"),
                    index: None,
                    candidates,
                };
                if !grown {
                    let index = if reverse { cycle.candidates.len() - 1 } else { 0 };
                    cycle.index = Some(index);
                    cycle.shown = format!("{head}{} ", cycle.candidates[index]);
                }
                let shown = cycle.shown.clone();
                self.cycle = Some(cycle);
                Some(shown)
            }
        }
    }

    /// Candidates of the completion in progress, if any.
    pub fn candidates(&self) -> &[String] {
        self.cycle.as_ref().map_or(&[], |c| c.candidates.as_slice())
    }

    /// Ends the current cycle.
    pub fn reset(&mut self) {
        self.cycle = None;
    }
}

// ==================== TESTS =======================
