//! Terminal front end for `console_core`: raw-mode line editing, history,
//! Tab completion from console predictions, inline argument hints and a
//! handful of `#` meta commands.
//!
//! ```ignore
//! let console = Console::new(console_core::global(), &scene, ConsoleOptions::default());
//! let mut shell: Shell<'_, '_, 256, 64> = Shell::new(&console, "console> ");
//! shell.run()?;
//! ```

pub mod autocomplete;
pub mod history;
pub mod input;
pub mod shell;
pub mod terminal;

#[cfg(test)]
mod testing;

pub use autocomplete::Autocomplete;
pub use history::History;
pub use input::key_reader::{Key, decode};
pub use input::parser::{InputParser, KeyOutcome};
pub use shell::{Flow, Meta, Shell, meta_command};
pub use terminal::RawMode;

/// Shell sized by the `console_config` limits.
pub type DefaultShell<'c, 'a> = Shell<'c, 'a, { console_config::INPUT_MAX_LEN }, { console_config::HISTORY_MAX_ENTRIES }>;

/// History sized by the `console_config` limits, backed by
/// `console_config::HISTORY_FILE` when the `history-persistence` feature is on.
pub fn default_history() -> History<{ console_config::HISTORY_MAX_ENTRIES }, { console_config::INPUT_MAX_LEN }> {
    #[cfg(feature = "history-persistence")]
    {
        History::persistent(console_config::HISTORY_FILE)
    }
    #[cfg(not(feature = "history-persistence"))]
    {
        History::new()
    }
}
