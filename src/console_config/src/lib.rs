//! Compile-time settings shared by the console shell and the demo host.

/// Prompt printed before each input line.
pub const PROMPT: &str = "console> ";

/// Capacity of the line editor buffer and of each history entry, in UTF-8
/// bytes.
pub const INPUT_MAX_LEN: usize = 256;

/// Number of lines kept in the history.
pub const HISTORY_MAX_ENTRIES: usize = 64;

/// Upper bound on completion candidates shown at once.
pub const MAX_CANDIDATES: usize = 32;

/// Register non-public members as commands.
pub const INCLUDE_PRIVATE: bool = false;

/// Hosts run in an interactive context (with a current selection) by default.
pub const INTERACTIVE: bool = true;

/// History file used when the `history-persistence` feature is enabled.
pub const HISTORY_FILE: &str = ".console_history";
