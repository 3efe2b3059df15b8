use thiserror::Error;

use crate::coerce::CoerceError;
use crate::descriptor::InvokeError;
use crate::grammar::{ParseError, Verb};
use crate::target::ResolveError;

/// Everything that can go wrong between a command line and its result.
///
/// `Display` is the text shown to the user after the `Error: ` prefix.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConsoleError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Coerce(#[from] CoerceError),

    #[error(transparent)]
    Invoke(#[from] InvokeError),

    #[error("no command '{name}' accepts '{verb}'")]
    NotFound { verb: Verb, name: String },

    #[error("'{0}' needs a target (@name, @@name, #tag, ##tag or select)")]
    TargetRequired(String),

    #[error("wrong number of arguments for '{name}': expected {expected}, got {got}")]
    Arity { name: String, expected: usize, got: usize },

    #[error("invalid value for '{param}': {source}")]
    Argument { param: String, source: CoerceError },

    #[error("{target} has no {owner} component")]
    MissingComponent { target: String, owner: &'static str },

    #[error("{label}: {source}")]
    Invocation { label: String, source: InvokeError },

    #[error("{label} panicked: {message}")]
    Panicked { label: String, message: String },
}

impl ConsoleError {
    /// The user-facing line for this error.
    pub fn to_line(&self) -> String {
        format!("Error: {self}")
    }
}
