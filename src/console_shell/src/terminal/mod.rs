//! Raw terminal mode for the line editor.
//!
//! Canonical input processing and echo are switched off while a [`RawMode`]
//! guard is alive so keys arrive one at a time; the previous mode is restored
//! when the guard drops.
//!
//! - Unix: `termios` attributes on the given descriptor.
//! - Windows: console mode of the standard input handle.

use std::io;

/// Guard holding the terminal mode to restore.
pub struct RawMode {
    #[cfg(unix)]
    fd: i32,
    #[cfg(unix)]
    original: termios::Termios,
    #[cfg(windows)]
    original_mode: u32,
}

impl RawMode {
    /// Switches `fd` (usually stdin) to raw input.
    #[cfg(unix)]
    pub fn enable(fd: i32) -> io::Result<Self> {
        use termios::{ECHO, ICANON, TCSANOW, Termios, tcsetattr};
        let original = Termios::from_fd(fd)?;
        let mut raw = original;
        raw.c_lflag &= !(ICANON | ECHO);
        tcsetattr(fd, TCSANOW, &raw)?;
        Ok(RawMode { fd, original })
    }

    /// Switches the console input handle to raw input; `fd` is ignored.
    #[cfg(windows)]
    pub fn enable(_fd: i32) -> io::Result<Self> {
        use winapi::um::{
            consoleapi::{GetConsoleMode, SetConsoleMode},
            wincon::{ENABLE_ECHO_INPUT, ENABLE_LINE_INPUT},
        };
        let handle = stdin_handle()?;
        let mut mode = 0;
        // SAFETY: `handle` is the process' valid standard input handle.
        unsafe {
            if GetConsoleMode(handle, &mut mode) == 0 {
                return Err(io::Error::last_os_error());
            }
            let original_mode = mode;
            mode &= !(ENABLE_LINE_INPUT | ENABLE_ECHO_INPUT);
            if SetConsoleMode(handle, mode) == 0 {
                return Err(io::Error::last_os_error());
            }
            Ok(RawMode { original_mode })
        }
    }
}

#[cfg(windows)]
fn stdin_handle() -> io::Result<winapi::um::winnt::HANDLE> {
    use winapi::um::{handleapi::INVALID_HANDLE_VALUE, processenv::GetStdHandle, winbase::STD_INPUT_HANDLE};
    // SAFETY: GetStdHandle has no preconditions.
    let handle = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
    if handle.is_null() || handle == INVALID_HANDLE_VALUE {
        return Err(io::Error::last_os_error());
    }
    Ok(handle)
}

impl Drop for RawMode {
    #[cfg(unix)]
    fn drop(&mut self) {
        use termios::{TCSANOW, tcsetattr};
        if let Err(err) = tcsetattr(self.fd, TCSANOW, &self.original) {
            tracing::warn!(%err, "could not restore terminal mode");
        }
    }

    #[cfg(windows)]
    fn drop(&mut self) {
        use winapi::um::consoleapi::SetConsoleMode;
        match stdin_handle() {
            // SAFETY: valid handle, mode captured from the same handle.
            Ok(handle) => unsafe {
                SetConsoleMode(handle, self.original_mode);
            },
            Err(err) => tracing::warn!(%err, "could not restore console mode"),
        }
    }
}
