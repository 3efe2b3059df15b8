use heapless::Vec;

/// Fixed-capacity line being edited, with a cursor.
///
/// Positions are counted in characters. `IML` bounds the line's UTF-8
/// length in bytes, the unit history entries are stored in, so a full
/// line always fits in the history. Inserts beyond it are refused.
pub struct InputBuffer<const IML: usize> {
    chars: Vec<char, IML>,
    cursor: usize,
}

impl<const IML: usize> InputBuffer<IML> {
    pub fn new() -> Self {
        Self { chars: Vec::new(), cursor: 0 }
    }

    /// Inserts `ch` at the cursor; `false` when the line is full.
    pub fn insert(&mut self, ch: char) -> bool {
        if self.byte_len() + ch.len_utf8() > IML || self.chars.insert(self.cursor, ch).is_err() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Deletes the character before the cursor; `false` at line start.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    /// Deletes the character under the cursor; `false` at line end.
    pub fn delete_at_cursor(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.chars.remove(self.cursor);
        true
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.chars.len() {
            self.cursor += 1;
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.chars.len();
    }

    /// Ctrl+U: removes everything before the cursor.
    pub fn delete_to_start(&mut self) {
        let kept: Vec<char, IML> = self.chars.iter().skip(self.cursor).copied().collect();
        self.chars = kept;
        self.cursor = 0;
    }

    /// Ctrl+K: removes everything from the cursor on.
    pub fn delete_to_end(&mut self) {
        self.chars.truncate(self.cursor);
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }

    /// Replaces the whole line, truncated to capacity, cursor at the end.
    pub fn overwrite(&mut self, text: &str) {
        self.chars.clear();
        self.cursor = 0;
        for ch in text.chars() {
            if !self.insert(ch) {
                break;
            }
        }
    }

    /// Replaces the text before the cursor, keeping what follows it.
    /// The cursor lands at the end of the inserted text.
    pub fn replace_before_cursor(&mut self, text: &str) {
        let tail: std::vec::Vec<char> = self.chars[self.cursor..].to_vec();
        self.chars.clear();
        let mut bytes = 0;
        for ch in text.chars().chain(tail.iter().copied()) {
            bytes += ch.len_utf8();
            if bytes > IML || self.chars.push(ch).is_err() {
                break;
            }
        }
        self.cursor = text.chars().count().min(self.chars.len());
    }

    /// Length of the line in UTF-8 bytes.
    pub fn byte_len(&self) -> usize {
        self.chars.iter().map(|c| c.len_utf8()).sum()
    }

    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }

    pub fn before_cursor(&self) -> String {
        self.chars[..self.cursor].iter().collect()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

impl<const IML: usize> Default for InputBuffer<IML> {
    fn default() -> Self {
        Self::new()
    }
}

// ==================== TESTS =======================

#[cfg(test)]
mod tests {
    use super::*;

    fn typed<const N: usize>(text: &str) -> InputBuffer<N> {
        let mut buf = InputBuffer::new();
        for ch in text.chars() {
            buf.insert(ch);
        }
        buf
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut buf = typed::<16>("cal");
        buf.move_home();
        buf.move_right();
        assert!(buf.insert('x'));
        assert_eq!(buf.text(), "cxal");
        assert_eq!(buf.cursor(), 2);
    }

    #[test]
    fn test_capacity_is_enforced() {
        let mut buf = typed::<4>("abcd");
        assert!(!buf.insert('e'));
        assert_eq!(buf.text(), "abcd");
        buf.overwrite("123456");
        assert_eq!(buf.text(), "1234");
        assert_eq!(buf.cursor(), 4);
    }

    #[test]
    fn test_capacity_counts_utf8_bytes() {
        let mut buf = typed::<6>("héé");
        assert_eq!(buf.len(), 3);
        assert_eq!(buf.byte_len(), 5);
        assert!(!buf.insert('é'));
        assert!(buf.insert('x'));
        assert_eq!(buf.text(), "hééx");

        buf.overwrite("ééééé");
        assert_eq!(buf.text(), "ééé");

        let mut history: crate::history::History<4, 6> = crate::history::History::new();
        assert!(history.push(&buf.text()));
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut buf = typed::<16>("abc");
        assert!(buf.backspace());
        assert_eq!(buf.text(), "ab");
        assert!(!buf.delete_at_cursor());
        buf.move_home();
        assert!(!buf.backspace());
        assert!(buf.delete_at_cursor());
        assert_eq!(buf.text(), "b");
    }

    #[test]
    fn test_kill_to_start_and_end() {
        let mut buf = typed::<16>("get score");
        for _ in 0..5 {
            buf.move_left();
        }
        let mut head = typed::<16>("get score");
        head.move_home();
        head.move_right();

        buf.delete_to_start();
        assert_eq!(buf.text(), "score");
        assert_eq!(buf.cursor(), 0);

        head.delete_to_end();
        assert_eq!(head.text(), "g");
    }

    #[test]
    fn test_replace_before_cursor_keeps_tail() {
        let mut buf = typed::<32>("call ad 1 2");
        buf.move_home();
        for _ in 0..7 {
            buf.move_right();
        }
        assert_eq!(buf.before_cursor(), "call ad");
        buf.replace_before_cursor("call add ");
        assert_eq!(buf.text(), "call add  1 2");
        assert_eq!(buf.cursor(), 9);
    }
}
