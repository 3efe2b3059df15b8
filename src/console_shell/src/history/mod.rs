//! Bounded, deduplicated history of submitted lines.
//!
//! - `HME`: maximum number of entries; the oldest is dropped when full.
//! - `IML`: maximum entry length in UTF-8 bytes; longer lines are not
//!   recorded. The line editor bounds its buffer in the same unit.
//!
//! Navigation keeps a position that [`History::older`] / [`History::newer`]
//! move through; pushing a line resets it past the newest entry. With the
//! `history-persistence` feature, a history opened with
//! [`History::persistent`] loads its file on creation and appends every new
//! entry to it.

use heapless::{String, Vec};

pub struct History<const HME: usize, const IML: usize> {
    entries: Vec<String<IML>, HME>,
    position: Option<usize>, // None: past the newest entry
    #[cfg(feature = "history-persistence")]
    file: Option<std::path::PathBuf>,
}

impl<const HME: usize, const IML: usize> Default for History<HME, IML> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const HME: usize, const IML: usize> History<HME, IML> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            position: None,
            #[cfg(feature = "history-persistence")]
            file: None,
        }
    }

    /// Records `line` (trimmed). Empty lines, lines over `IML` bytes and
    /// lines already present are refused.
    pub fn push(&mut self, line: &str) -> bool {
        self.position = None;
        if !self.record(line) {
            return false;
        }
        #[cfg(feature = "history-persistence")]
        if let Some(path) = &self.file {
            if let Err(err) = append_line(path, line.trim()) {
                tracing::warn!(%err, path = %path.display(), "could not append to history file");
            }
        }
        true
    }

    fn record(&mut self, line: &str) -> bool {
        let trimmed = line.trim();
        if HME == 0 || trimmed.is_empty() || self.entries.iter().any(|e| e.as_str() == trimmed) {
            return false;
        }
        let Ok(entry) = String::<IML>::try_from(trimmed) else {
            return false;
        };
        if self.entries.is_full() {
            self.entries.remove(0);
        }
        self.entries.push(entry).is_ok()
    }

    /// Steps back towards the oldest entry (Up arrow).
    pub fn older(&mut self) -> Option<&str> {
        let index = match self.position {
            None => self.entries.len().checked_sub(1)?,
            Some(i) => i.saturating_sub(1),
        };
        self.position = Some(index);
        self.get(index)
    }

    /// Steps forward towards the newest entry (Down arrow); `None` once past
    /// the newest one.
    pub fn newer(&mut self) -> Option<&str> {
        let next = self.position? + 1;
        if next >= self.entries.len() {
            self.position = None;
            return None;
        }
        self.position = Some(next);
        self.get(next)
    }

    /// Oldest entry (Page Up).
    pub fn first(&mut self) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        self.position = Some(0);
        self.get(0)
    }

    /// Newest entry (Page Down).
    pub fn last(&mut self) -> Option<&str> {
        let index = self.entries.len().checked_sub(1)?;
        self.position = Some(index);
        self.get(index)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    /// Entries oldest first, with their indexes.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.entries.iter().map(String::as_str).enumerate()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Free entry slots.
    pub fn free(&self) -> usize {
        HME - self.entries.len()
    }

    /// Forgets every entry. The history file, if any, is left untouched.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.position = None;
    }
}

#[cfg(feature = "history-persistence")]
impl<const HME: usize, const IML: usize> History<HME, IML> {
    /// History backed by `path`: the last `HME` distinct lines of the file
    /// are loaded now, new entries are appended as they are pushed.
    pub fn persistent(path: impl Into<std::path::PathBuf>) -> Self {
        let path = path.into();
        let mut history = Self::new();
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                for line in text.lines() {
                    if let Some(index) = history.entries.iter().position(|e| e.as_str() == line.trim()) {
                        history.entries.remove(index);
                    }
                    history.record(line);
                }
                tracing::debug!(path = %path.display(), entries = history.len(), "history loaded");
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => tracing::warn!(%err, path = %path.display(), "could not read history file"),
        }
        history.file = Some(path);
        history
    }
}

#[cfg(feature = "history-persistence")]
fn append_line(path: &std::path::Path, line: &str) -> std::io::Result<()> {
    use std::io::Write;
    let mut file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")
}

// ==================== TESTS =======================

#[cfg(test)]
mod tests {
    use super::*;

    fn history(lines: &[&str]) -> History<4, 32> {
        let mut h = History::new();
        for line in lines {
            h.push(line);
        }
        h
    }

    #[test]
    fn test_push_trims_and_refuses_duplicates() {
        let mut h = history(&["call restart", "  get score "]);
        assert!(!h.push("call restart"));
        assert!(!h.push("   "));
        assert_eq!(h.iter().collect::<std::vec::Vec<_>>(), vec![(0, "call restart"), (1, "get score")]);
    }

    #[test]
    fn test_oldest_entry_is_evicted() {
        let h = history(&["a", "b", "c", "d", "e"]);
        assert_eq!(h.len(), 4);
        assert_eq!(h.get(0), Some("b"));
        assert_eq!(h.get(3), Some("e"));
        assert_eq!(h.free(), 0);
    }

    #[test]
    fn test_overlong_lines_are_not_recorded() {
        let mut h: History<4, 8> = History::new();
        assert!(!h.push("call something_long"));
        assert!(h.is_empty());
    }

    #[test]
    fn test_zero_capacity_history_records_nothing() {
        let mut h: History<0, 16> = History::new();
        assert!(!h.push("call restart"));
        assert!(h.is_empty());
        assert_eq!(h.older(), None);
    }

    #[test]
    fn test_navigation() {
        let mut h = history(&["a", "b", "c"]);
        assert_eq!(h.newer(), None);
        assert_eq!(h.older(), Some("c"));
        assert_eq!(h.older(), Some("b"));
        assert_eq!(h.older(), Some("a"));
        assert_eq!(h.older(), Some("a"));
        assert_eq!(h.newer(), Some("b"));
        assert_eq!(h.newer(), Some("c"));
        assert_eq!(h.newer(), None);
        assert_eq!(h.first(), Some("a"));
        assert_eq!(h.last(), Some("c"));

        h.push("d");
        assert_eq!(h.older(), Some("d"));
    }

    #[test]
    fn test_clear() {
        let mut h = history(&["a"]);
        h.clear();
        assert!(h.is_empty());
        assert_eq!(h.older(), None);
        assert_eq!(h.first(), None);
    }

    #[cfg(feature = "history-persistence")]
    #[test]
    fn test_persistent_history_round_trips_through_file() {
        let path = std::env::temp_dir().join(format!("console_history_test_{}", std::process::id()));
        let _ = std::fs::remove_file(&path);

        let mut h: History<4, 32> = History::persistent(&path);
        h.push("get score");
        h.push("call restart");

        let reloaded: History<4, 32> = History::persistent(&path);
        assert_eq!(reloaded.get(0), Some("get score"));
        assert_eq!(reloaded.get(1), Some("call restart"));
        let _ = std::fs::remove_file(&path);
    }
}
