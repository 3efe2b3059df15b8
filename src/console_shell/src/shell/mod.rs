//! Interactive loop around a [`Console`].
//!
//! Each submitted line is either a meta command for the shell itself or a
//! console command line:
//!
//! ```text
//!   #q    quit                    #h    list history
//!   ##    list commands           #c    clear history
//!   #?    help                    #N    run history entry N
//! ```
//!
//! Anything else, including lines starting with a tag selector (`#Enemy`,
//! `##Enemy`), goes to [`Console::execute_command`].

use std::io::{self, Write};

use console_core::Console;
use tracing::debug;

use crate::history::History;
use crate::input::parser::InputParser;
use crate::terminal::RawMode;

/// Whether the loop keeps going after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Meta {
    Quit,
    ListCommands,
    History,
    ClearHistory,
    Help,
    Rerun(usize),
}

/// Recognizes the exact meta command forms; everything else is a console line.
pub fn meta_command(line: &str) -> Option<Meta> {
    match line.trim() {
        "#q" => Some(Meta::Quit),
        "##" => Some(Meta::ListCommands),
        "#h" => Some(Meta::History),
        "#c" => Some(Meta::ClearHistory),
        "#?" => Some(Meta::Help),
        other => {
            let digits = other.strip_prefix('#')?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok().map(Meta::Rerun)
        }
    }
}

const HELP: &str = "\
Commands:
  [@name|@@name|#tag|##tag|select] get|set|call <command> [args...]
  @name   first object named name      @@name  every object named name
  #tag    first object tagged tag      ##tag   every object tagged tag
  select  current selection

Shell:
  ##  list commands    #h  list history    #c  clear history
  #N  run history N    #?  this help       #q  quit

Keys:
  Tab / Shift+Tab  complete, cycle      Up / Down      history
  PgUp / PgDn      first / last entry   Home / End     line start / end
  Ctrl+U / Ctrl+K  delete to start/end  Ctrl+D         clear line";

pub struct Shell<'c, 'a, const IML: usize, const HME: usize> {
    console: &'c Console<'a>,
    parser: InputParser<IML, HME>,
    prompt: &'static str,
}

impl<'c, 'a, const IML: usize, const HME: usize> Shell<'c, 'a, IML, HME> {
    pub fn new(console: &'c Console<'a>, prompt: &'static str) -> Self {
        Self::with_history(console, prompt, History::new())
    }

    pub fn with_history(console: &'c Console<'a>, prompt: &'static str, history: History<HME, IML>) -> Self {
        Self { console, parser: InputParser::new(history), prompt }
    }

    pub fn history(&self) -> &History<HME, IML> {
        self.parser.history()
    }

    /// Handles one submitted line, writing its output to `out`.
    pub fn process_line<W: Write>(&mut self, line: &str, out: &mut W) -> io::Result<Flow> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Flow::Continue);
        }

        let Some(meta) = meta_command(line) else {
            self.parser.history_mut().push(line);
            return self.execute(line, out);
        };

        debug!(?meta, "meta command");
        match meta {
            Meta::Quit => return Ok(Flow::Quit),
            Meta::ListCommands => self.list_commands(out)?,
            Meta::History => self.list_history(out)?,
            Meta::ClearHistory => {
                self.parser.history_mut().clear();
                writeln!(out, "History cleared")?;
            }
            Meta::Help => writeln!(out, "{HELP}")?,
            Meta::Rerun(index) => match self.parser.history().get(index).map(str::to_string) {
                Some(entry) => {
                    writeln!(out, "{entry}")?;
                    return self.execute(&entry, out);
                }
                None => writeln!(out, "No history entry at index {index}")?,
            },
        }
        Ok(Flow::Continue)
    }

    fn execute<W: Write>(&self, line: &str, out: &mut W) -> io::Result<Flow> {
        writeln!(out, "{}", self.console.execute_command(line))?;
        Ok(Flow::Continue)
    }

    fn list_commands<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let names = self.console.all_command_names();
        if names.is_empty() {
            return writeln!(out, "No commands registered");
        }
        let width = names.iter().map(String::len).max().unwrap_or(0);
        for name in &names {
            let info = self.console.command_type_info(name).unwrap_or_default();
            writeln!(out, "{name:>width$} : {info}")?;
        }
        Ok(())
    }

    fn list_history<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let history = self.parser.history();
        if history.is_empty() {
            return writeln!(out, "History is empty");
        }
        for (index, entry) in history.iter() {
            writeln!(out, "{index:>3} : {entry}")?;
        }
        writeln!(out, "Free entries: {}", history.free())
    }

    /// Runs the interactive loop on the process terminal until `#q` or end
    /// of input.
    pub fn run(&mut self) -> io::Result<()> {
        let _raw = RawMode::enable(stdin_fd())?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        loop {
            let line = match self.parser.read_line(self.console, self.prompt, &mut out) {
                Ok(line) => line,
                Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                    writeln!(out)?;
                    return Ok(());
                }
                Err(err) => return Err(err),
            };
            if self.process_line(&line, &mut out)? == Flow::Quit {
                return Ok(());
            }
        }
    }
}

#[cfg(unix)]
fn stdin_fd() -> i32 {
    use std::os::unix::io::AsRawFd;
    io::stdin().as_raw_fd()
}

#[cfg(not(unix))]
fn stdin_fd() -> i32 {
    0
}

// ==================== TESTS =======================
