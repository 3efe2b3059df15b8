use std::io::{self, Write};

/// Terminal output for the line editor, written to any `Write`.
pub struct DisplayRenderer;

impl DisplayRenderer {
    /// Redraws the prompt and the line, followed by a dimmed hint when one
    /// is given, and parks the cursor at `cursor` characters into the line.
    pub fn render<W: Write>(out: &mut W, prompt: &str, content: &str, cursor: usize, hint: Option<&str>) -> io::Result<()> {
        let cursor = cursor.min(content.chars().count());
        write!(out, "\r\x1B[K{prompt}{content}")?;
        if let Some(hint) = hint {
            write!(out, "  \x1B[2m<{hint}>\x1B[0m")?;
        }
        write!(out, "\x1B[{}G", prompt.chars().count() + cursor + 1)?;
        out.flush()
    }

    /// Audible bell for refused edits.
    pub fn bell<W: Write>(out: &mut W) -> io::Result<()> {
        out.write_all(b"\x07")?;
        out.flush()
    }

    /// Red marker shown when the line is full.
    pub fn boundary_marker<W: Write>(out: &mut W) -> io::Result<()> {
        out.write_all(b"\x1B[31m|\x1B[0m\x1B[1D \x1B[1D")?;
        out.flush()
    }
}

// ==================== TESTS =======================
