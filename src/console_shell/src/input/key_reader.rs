// Cross-platform key reader

use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    // History / cursor
    ArrowUp,    // Older history entry
    ArrowDown,  // Newer history entry
    ArrowLeft,  // Cursor left
    ArrowRight, // Cursor right

    // Navigation
    Home,     // Cursor to line start
    End,      // Cursor to line end
    Insert,   // Ignored
    Delete,   // Delete under the cursor
    PageUp,   // Oldest history entry
    PageDown, // Newest history entry

    // Editing
    Enter,     // Submit the line
    Backspace, // Delete before the cursor
    Tab,       // Complete / next candidate
    ShiftTab,  // Previous candidate

    // Line kill
    CtrlU, // Delete to line start
    CtrlK, // Delete to line end
    CtrlD, // Clear the line

    Char(char),
}

/// Decodes one key from a raw terminal byte stream.
///
/// Returns `None` once the stream ends. Escape sequences the editor has no
/// use for are consumed and skipped.
pub fn decode<I: Iterator<Item = u8>>(bytes: &mut I) -> Option<Key> {
    loop {
        let b = bytes.next()?;
        let key = match b {
            0x1B => decode_escape(bytes),
            0x15 => Some(Key::CtrlU),
            0x0B => Some(Key::CtrlK),
            0x04 => Some(Key::CtrlD),
            b'\r' | b'\n' => Some(Key::Enter),
            b'\t' => Some(Key::Tab),
            0x7F | 0x08 => Some(Key::Backspace),
            b if b.is_ascii() => Some(Key::Char(b as char)),
            lead => decode_utf8(lead, bytes).map(Key::Char),
        };
        if key.is_some() {
            return key;
        }
    }
}

/// `ESC [ x`, `ESC [ n ~` and `ESC O x` forms.
fn decode_escape<I: Iterator<Item = u8>>(bytes: &mut I) -> Option<Key> {
    match bytes.next()? {
        b'[' => {}
        b'O' => {
            return match bytes.next()? {
                b'H' => Some(Key::Home),
                b'F' => Some(Key::End),
                _ => None,
            };
        }
        _ => return None,
    }

    let first = bytes.next()?;
    let key = match first {
        b'A' => Key::ArrowUp,
        b'B' => Key::ArrowDown,
        b'C' => Key::ArrowRight,
        b'D' => Key::ArrowLeft,
        b'H' => Key::Home,
        b'F' => Key::End,
        b'Z' => Key::ShiftTab,
        b'0'..=b'9' => {
            let mut code = u32::from(first - b'0');
            let mut modified = false;
            loop {
                match bytes.next()? {
                    d @ b'0'..=b'9' if !modified => code = code * 10 + u32::from(d - b'0'),
                    b';' => modified = true,
                    b'~' => break,
                    b'0'..=b'9' => {}
                    // `ESC [ 1 ; 5 C` style arrows with modifiers
                    _ => return None,
                }
            }
            match code {
                1 | 7 => Key::Home,
                2 => Key::Insert,
                3 => Key::Delete,
                4 | 8 => Key::End,
                5 => Key::PageUp,
                6 => Key::PageDown,
                _ => return None,
            }
        }
        _ => return None,
    };
    Some(key)
}

fn decode_utf8<I: Iterator<Item = u8>>(lead: u8, bytes: &mut I) -> Option<char> {
    let len = match lead {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return None,
    };
    let mut buf = [lead, 0, 0, 0];
    for slot in buf.iter_mut().take(len).skip(1) {
        *slot = bytes.next()?;
    }
    std::str::from_utf8(&buf[..len]).ok()?.chars().next()
}

#[cfg(not(windows))]
pub mod platform {
    use super::{Key, decode};
    use std::io::{self, Read};

    /// Blocks until one key is available on stdin.
    pub fn read_key() -> io::Result<Key> {
        let stdin = io::stdin();
        let mut bytes = stdin.lock().bytes().map_while(Result::ok);
        decode(&mut bytes).ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "end of input"))
    }
}

#[cfg(windows)]
pub mod platform {
    use super::Key;
    use std::io;
    use winapi::shared::minwindef::DWORD;
    use winapi::um::consoleapi::ReadConsoleInputW;
    use winapi::um::processenv::GetStdHandle;
    use winapi::um::winbase::STD_INPUT_HANDLE;
    use winapi::um::wincon::{INPUT_RECORD, KEY_EVENT};
    use winapi::um::wincontypes::KEY_EVENT_RECORD;

    const LEFT_CTRL_PRESSED: u32 = 0x0008;
    const RIGHT_CTRL_PRESSED: u32 = 0x0004;
    const SHIFT_PRESSED: u32 = 0x0010;

    fn virtual_key(vkey: u16, ctrl: bool, shift: bool) -> Option<Key> {
        if ctrl {
            match vkey {
                0x55 => return Some(Key::CtrlU),
                0x4B => return Some(Key::CtrlK),
                0x44 => return Some(Key::CtrlD),
                _ => {}
            }
        }
        Some(match vkey {
            0x21 => Key::PageUp,
            0x22 => Key::PageDown,
            0x23 => Key::End,
            0x24 => Key::Home,
            0x25 => Key::ArrowLeft,
            0x26 => Key::ArrowUp,
            0x27 => Key::ArrowRight,
            0x28 => Key::ArrowDown,
            0x2D => Key::Insert,
            0x2E => Key::Delete,
            0x08 => Key::Backspace,
            0x09 if shift => Key::ShiftTab,
            0x09 => Key::Tab,
            0x0D => Key::Enter,
            _ => return None,
        })
    }

    /// Blocks until one key press is available on the console.
    pub fn read_key() -> io::Result<Key> {
        // SAFETY: plain console API calls on the process' input handle; the
        // record union is only read as a key event when tagged KEY_EVENT.
        unsafe {
            let handle = GetStdHandle(STD_INPUT_HANDLE);
            if handle.is_null() {
                return Err(io::Error::other("no console input handle"));
            }
            let mut record: INPUT_RECORD = std::mem::zeroed();
            let mut read: DWORD = 0;
            loop {
                if ReadConsoleInputW(handle, &mut record, 1, &mut read) == 0 {
                    return Err(io::Error::last_os_error());
                }
                if record.EventType != KEY_EVENT {
                    continue;
                }
                let event: KEY_EVENT_RECORD = *record.Event.KeyEvent();
                if event.bKeyDown == 0 {
                    continue;
                }
                let state = event.dwControlKeyState;
                let ctrl = state & (LEFT_CTRL_PRESSED | RIGHT_CTRL_PRESSED) != 0;
                let shift = state & SHIFT_PRESSED != 0;
                if let Some(key) = virtual_key(event.wVirtualKeyCode, ctrl, shift) {
                    return Ok(key);
                }
                let unit = *event.uChar.UnicodeChar() as u32;
                if let Some(c) = char::from_u32(unit).filter(|c| *c != '\0') {
                    return Ok(Key::Char(c));
                }
            }
        }
    }
}

/// Reads the next key from the platform console.
pub fn read_key() -> io::Result<Key> {
    platform::read_key()
}

// ==================== TESTS =======================

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(input: &[u8]) -> Vec<Key> {
        let mut bytes = input.iter().copied();
        std::iter::from_fn(|| decode(&mut bytes)).collect()
    }

    #[test]
    fn test_plain_and_control_bytes() {
        assert_eq!(
            keys(b"a \t\r\x7f\x08\x15\x0b\x04"),
            vec![
                Key::Char('a'),
                Key::Char(' '),
                Key::Tab,
                Key::Enter,
                Key::Backspace,
                Key::Backspace,
                Key::CtrlU,
                Key::CtrlK,
                Key::CtrlD,
            ]
        );
    }

    #[test]
    fn test_csi_sequences() {
        assert_eq!(
            keys(b"\x1b[A\x1b[B\x1b[C\x1b[D\x1b[H\x1b[F\x1b[Z"),
            vec![
                Key::ArrowUp,
                Key::ArrowDown,
                Key::ArrowRight,
                Key::ArrowLeft,
                Key::Home,
                Key::End,
                Key::ShiftTab,
            ]
        );
        assert_eq!(
            keys(b"\x1b[1~\x1b[2~\x1b[3~\x1b[4~\x1b[5~\x1b[6~\x1bOH\x1bOF"),
            vec![
                Key::Home,
                Key::Insert,
                Key::Delete,
                Key::End,
                Key::PageUp,
                Key::PageDown,
                Key::Home,
                Key::End,
            ]
        );
    }

    #[test]
    fn test_unknown_sequences_are_skipped() {
        assert_eq!(keys(b"\x1b[1;5Cx\x1b[15~y"), vec![Key::Char('x'), Key::Char('y')]);
        assert_eq!(keys(b"\x1b[3;2~z"), vec![Key::Delete, Key::Char('z')]);
    }

    #[test]
    fn test_utf8_and_truncated_input() {
        assert_eq!(keys("é".as_bytes()), vec![Key::Char('é')]);
        assert_eq!(keys(b"\x1b["), Vec::<Key>::new());
        assert_eq!(keys(b""), Vec::<Key>::new());
    }
}
