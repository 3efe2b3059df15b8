//! Line editing state driven by decoded keys.
//!
//! [`InputParser`] owns the line buffer, the history and the completion
//! cycle. [`InputParser::apply_key`] is the whole editing model and needs no
//! terminal; [`InputParser::read_line`] wires it to the platform key reader
//! and the renderer.

use std::io::{self, Write};

use console_core::Console;

use crate::autocomplete::Autocomplete;
use crate::history::History;
use crate::input::buffer::InputBuffer;
use crate::input::key_reader::{Key, read_key};
use crate::input::renderer::DisplayRenderer;

/// What a key did to the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Line or cursor changed; redraw.
    Edited,
    /// Key had no effect (full line, nothing to complete, ...).
    Refused,
    /// Line is complete.
    Submit,
}

/// # Type Parameters
/// - `IML`: maximum line length, in characters.
/// - `HME`: maximum number of history entries.
pub struct InputParser<const IML: usize, const HME: usize> {
    buffer: InputBuffer<IML>,
    history: History<HME, IML>,
    autocomplete: Autocomplete,
}

impl<const IML: usize, const HME: usize> Default for InputParser<IML, HME> {
    fn default() -> Self {
        Self::new(History::new())
    }
}

impl<const IML: usize, const HME: usize> InputParser<IML, HME> {
    pub fn new(history: History<HME, IML>) -> Self {
        Self { buffer: InputBuffer::new(), history, autocomplete: Autocomplete::new() }
    }

    pub fn buffer(&self) -> &InputBuffer<IML> {
        &self.buffer
    }

    pub fn history(&self) -> &History<HME, IML> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History<HME, IML> {
        &mut self.history
    }

    /// Applies one key to the line. Completion and hints come from `console`.
    pub fn apply_key(&mut self, key: Key, console: &Console<'_>) -> KeyOutcome {
        if !matches!(key, Key::Tab | Key::ShiftTab) {
            self.autocomplete.reset();
        }

        match key {
            Key::Enter => return KeyOutcome::Submit,
            Key::Tab | Key::ShiftTab => {
                let before = self.buffer.before_cursor();
                let completed = self.autocomplete.complete(&before, key == Key::ShiftTab, |partial| {
                    console.predict(partial)
                });
                match completed {
                    Some(text) if text != before => self.buffer.replace_before_cursor(&text),
                    _ => return KeyOutcome::Refused,
                }
            }
            Key::Backspace => {
                if !self.buffer.backspace() {
                    return KeyOutcome::Refused;
                }
            }
            Key::Delete => {
                if !self.buffer.delete_at_cursor() {
                    return KeyOutcome::Refused;
                }
            }
            Key::CtrlU => self.buffer.delete_to_start(),
            Key::CtrlK => self.buffer.delete_to_end(),
            Key::CtrlD => self.buffer.clear(),
            Key::ArrowLeft => self.buffer.move_left(),
            Key::ArrowRight => self.buffer.move_right(),
            Key::Home => self.buffer.move_home(),
            Key::End => self.buffer.move_end(),
            Key::ArrowUp => match self.history.older() {
                Some(entry) => self.buffer.overwrite(entry),
                None => return KeyOutcome::Refused,
            },
            Key::ArrowDown => match self.history.newer() {
                Some(entry) => self.buffer.overwrite(entry),
                None => self.buffer.clear(),
            },
            Key::PageUp => match self.history.first() {
                Some(entry) => self.buffer.overwrite(entry),
                None => return KeyOutcome::Refused,
            },
            Key::PageDown => match self.history.last() {
                Some(entry) => self.buffer.overwrite(entry),
                None => return KeyOutcome::Refused,
            },
            Key::Char(c) if !c.is_control() => {
                if !self.buffer.insert(c) {
                    return KeyOutcome::Refused;
                }
            }
            Key::Char(_) | Key::Insert => return KeyOutcome::Refused,
        }
        KeyOutcome::Edited
    }

    /// Inline hint for the argument under the cursor.
    pub fn hint(&self, console: &Console<'_>) -> Option<String> {
        console.hint(&self.buffer.before_cursor())
    }

    /// Returns the edited line and starts a fresh one.
    pub fn take_line(&mut self) -> String {
        let line = self.buffer.text();
        self.buffer.clear();
        self.autocomplete.reset();
        line
    }

    fn render<W: Write>(&self, out: &mut W, prompt: &str, console: &Console<'_>) -> io::Result<()> {
        let hint = self.hint(console);
        DisplayRenderer::render(out, prompt, &self.buffer.text(), self.buffer.cursor(), hint.as_deref())
    }

    /// Edits one line on the terminal until Enter; the terminal is expected
    /// to be in raw mode already.
    pub fn read_line<W: Write>(&mut self, console: &Console<'_>, prompt: &str, out: &mut W) -> io::Result<String> {
        self.render(out, prompt, console)?;
        loop {
            let key = read_key()?;
            match self.apply_key(key, console) {
                KeyOutcome::Submit => {
                    // Drop the hint from the submitted line before moving on.
                    DisplayRenderer::render(out, prompt, &self.buffer.text(), self.buffer.len(), None)?;
                    writeln!(out)?;
                    return Ok(self.take_line());
                }
                KeyOutcome::Edited => self.render(out, prompt, console)?,
                KeyOutcome::Refused if self.buffer.len() >= IML => DisplayRenderer::boundary_marker(out)?,
                KeyOutcome::Refused => DisplayRenderer::bell(out)?,
            }
        }
    }
}

// ==================== TESTS =======================
