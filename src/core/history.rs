//! Submitted-input history with shell-style Up/Down navigation.
//!
//! The cursor ranges over `[0, len]`. `len` is the sentinel "new, empty
//! entry" position; every submission moves the cursor back onto it.

#[derive(Debug, Clone, Default)]
pub struct InputHistory {
    entries: Vec<String>,
    cursor: usize,
}

/// What the input line should show after a navigation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView<'a> {
    /// Nothing stored yet; leave the input line untouched.
    Unchanged,
    Entry(&'a str),
    /// Cursor sits on the sentinel; clear the input line.
    Blank,
}

impl InputHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission and reset the cursor past the newest entry.
    pub fn push(&mut self, entry: impl Into<String>) {
        self.entries.push(entry.into());
        self.cursor = self.entries.len();
    }

    pub fn older(&mut self) -> HistoryView<'_> {
        if self.entries.is_empty() {
            return HistoryView::Unchanged;
        }
        self.cursor = self.cursor.saturating_sub(1);
        HistoryView::Entry(&self.entries[self.cursor])
    }

    pub fn newer(&mut self) -> HistoryView<'_> {
        if self.entries.is_empty() {
            return HistoryView::Unchanged;
        }
        self.cursor = (self.cursor + 1).min(self.entries.len());
        match self.entries.get(self.cursor) {
            Some(entry) => HistoryView::Entry(entry),
            None => HistoryView::Blank,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_of(items: &[&str]) -> InputHistory {
        let mut history = InputHistory::new();
        for item in items {
            history.push(*item);
        }
        history
    }

    #[test]
    fn empty_history_ignores_navigation() {
        let mut history = InputHistory::new();
        assert_eq!(history.older(), HistoryView::Unchanged);
        assert_eq!(history.newer(), HistoryView::Unchanged);
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn older_walks_back_and_clamps_at_oldest() {
        let mut history = history_of(&["one", "two", "three"]);
        assert_eq!(history.older(), HistoryView::Entry("three"));
        assert_eq!(history.older(), HistoryView::Entry("two"));
        assert_eq!(history.older(), HistoryView::Entry("one"));
        assert_eq!(history.older(), HistoryView::Entry("one"));
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn newer_past_the_end_blanks_the_input() {
        let mut history = history_of(&["one", "two"]);
        history.older();
        history.older();
        assert_eq!(history.newer(), HistoryView::Entry("two"));
        assert_eq!(history.newer(), HistoryView::Blank);
        assert_eq!(history.newer(), HistoryView::Blank);
        assert_eq!(history.cursor(), 2);
    }

    #[test]
    fn submission_resets_cursor_to_sentinel() {
        let mut history = history_of(&["one", "two"]);
        history.older();
        history.older();
        history.push("three");
        assert_eq!(history.cursor(), 3);
        assert_eq!(history.older(), HistoryView::Entry("three"));
    }

    #[test]
    fn cursor_stays_within_bounds_for_any_walk() {
        let mut history = history_of(&["a", "b", "c", "d"]);
        let steps = [true, true, false, true, true, true, true, false, false, false, false, false];
        for older in steps {
            if older {
                history.older();
            } else {
                history.newer();
            }
            assert!(history.cursor() <= history.len());
        }
    }
}
