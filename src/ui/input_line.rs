//! The prompt line under the transcript: cursor editing plus history keys.

use crate::utils::input::sanitize_line;
use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    text: String,
    /// Cursor position in characters, `0..=text.chars().count()`.
    cursor: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Insert(char),
    Backspace,
    Delete,
    MoveLeft,
    MoveRight,
    MoveStart,
    MoveEnd,
    DeleteToEnd,
    DeleteWord,
    ClearAll,
    Paste(String),
    HistoryOlder,
    HistoryNewer,
    Submit,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Continue { redraw: bool },
    /// The line was taken; the prompt is now empty.
    Submit(String),
    HistoryOlder,
    HistoryNewer,
    Quit,
}

impl InputLine {
    pub fn with_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the whole line (history recall) with the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.text.chars().count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    /// Text left of the cursor, for cursor placement.
    pub fn before_cursor(&self) -> &str {
        &self.text[..char_to_byte_index(&self.text, self.cursor)]
    }

    pub fn apply(&mut self, action: InputAction) -> InputOutcome {
        let redraw = match action {
            InputAction::Insert(c) => {
                let byte_idx = char_to_byte_index(&self.text, self.cursor);
                self.text.insert(byte_idx, c);
                self.cursor += 1;
                true
            }
            InputAction::Backspace => {
                if self.cursor == 0 {
                    false
                } else {
                    let end = char_to_byte_index(&self.text, self.cursor);
                    let start = char_to_byte_index(&self.text, self.cursor - 1);
                    self.text.replace_range(start..end, "");
                    self.cursor -= 1;
                    true
                }
            }
            InputAction::Delete => {
                let start = char_to_byte_index(&self.text, self.cursor);
                if start >= self.text.len() {
                    false
                } else {
                    let end = char_to_byte_index(&self.text, self.cursor + 1);
                    self.text.replace_range(start..end, "");
                    true
                }
            }
            InputAction::MoveLeft => {
                let moved = self.cursor > 0;
                self.cursor = self.cursor.saturating_sub(1);
                moved
            }
            InputAction::MoveRight => {
                let moved = self.cursor < self.text.chars().count();
                if moved {
                    self.cursor += 1;
                }
                moved
            }
            InputAction::MoveStart => std::mem::replace(&mut self.cursor, 0) != 0,
            InputAction::MoveEnd => {
                let end = self.text.chars().count();
                std::mem::replace(&mut self.cursor, end) != end
            }
            InputAction::DeleteToEnd => {
                let byte_idx = char_to_byte_index(&self.text, self.cursor);
                let changed = byte_idx < self.text.len();
                self.text.truncate(byte_idx);
                changed
            }
            InputAction::DeleteWord => {
                if self.cursor == 0 {
                    false
                } else {
                    self.cursor = delete_word_before_cursor(&mut self.text, self.cursor);
                    true
                }
            }
            InputAction::ClearAll => {
                let changed = !self.text.is_empty();
                self.clear();
                changed
            }
            InputAction::Paste(text) => {
                let line = sanitize_line(&text);
                if line.is_empty() {
                    false
                } else {
                    let byte_idx = char_to_byte_index(&self.text, self.cursor);
                    self.text.insert_str(byte_idx, &line);
                    self.cursor += line.chars().count();
                    true
                }
            }
            InputAction::HistoryOlder => return InputOutcome::HistoryOlder,
            InputAction::HistoryNewer => return InputOutcome::HistoryNewer,
            InputAction::Submit => {
                let text = std::mem::take(&mut self.text);
                self.cursor = 0;
                return InputOutcome::Submit(text);
            }
            InputAction::Quit => return InputOutcome::Quit,
        };
        InputOutcome::Continue { redraw }
    }
}

pub fn map_key_event_to_action(key: &KeyEvent) -> Option<InputAction> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => Some(InputAction::Submit),
        KeyCode::Esc => Some(InputAction::Quit),
        KeyCode::Backspace => Some(InputAction::Backspace),
        KeyCode::Delete => Some(InputAction::Delete),
        KeyCode::Left => Some(InputAction::MoveLeft),
        KeyCode::Right => Some(InputAction::MoveRight),
        KeyCode::Home => Some(InputAction::MoveStart),
        KeyCode::End => Some(InputAction::MoveEnd),
        KeyCode::Up => Some(InputAction::HistoryOlder),
        KeyCode::Down => Some(InputAction::HistoryNewer),
        KeyCode::Char('a') if ctrl => Some(InputAction::MoveStart),
        KeyCode::Char('e') if ctrl => Some(InputAction::MoveEnd),
        KeyCode::Char('k') if ctrl => Some(InputAction::DeleteToEnd),
        KeyCode::Char('w') if ctrl => Some(InputAction::DeleteWord),
        KeyCode::Char('u') if ctrl => Some(InputAction::ClearAll),
        KeyCode::Char('c') | KeyCode::Char('d') if ctrl => Some(InputAction::Quit),
        KeyCode::Char('\n') | KeyCode::Char('\r') => Some(InputAction::Submit),
        KeyCode::Char(c) if !ctrl => Some(InputAction::Insert(c)),
        _ => None,
    }
}

fn delete_word_before_cursor(input: &mut String, cursor: usize) -> usize {
    let mut chars: Vec<char> = input.chars().collect();
    let end = cursor.min(chars.len());
    let mut idx = end;
    while idx > 0 && chars[idx - 1] == ' ' {
        idx -= 1;
    }
    while idx > 0 && chars[idx - 1] != ' ' {
        idx -= 1;
    }
    chars.drain(idx..end);
    *input = chars.into_iter().collect();
    idx
}

fn char_to_byte_index(input: &str, char_index: usize) -> usize {
    input
        .char_indices()
        .nth(char_index)
        .map(|(idx, _)| idx)
        .unwrap_or(input.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn insert_and_move_cursor() {
        let mut line = InputLine::default();
        assert_eq!(
            line.apply(InputAction::Insert('a')),
            InputOutcome::Continue { redraw: true }
        );
        line.apply(InputAction::MoveLeft);
        line.apply(InputAction::Insert('é'));
        assert_eq!(line.text(), "éa");
        assert_eq!(line.cursor(), 1);
        assert_eq!(line.before_cursor(), "é");
    }

    #[test]
    fn edits_at_boundaries_do_not_redraw() {
        let mut line = InputLine::default();
        for action in [
            InputAction::Backspace,
            InputAction::Delete,
            InputAction::MoveLeft,
            InputAction::MoveRight,
            InputAction::MoveStart,
            InputAction::MoveEnd,
            InputAction::DeleteToEnd,
            InputAction::DeleteWord,
            InputAction::ClearAll,
        ] {
            assert_eq!(line.apply(action), InputOutcome::Continue { redraw: false });
        }
    }

    #[test]
    fn ctrl_k_and_ctrl_w() {
        let mut line = InputLine::with_text("hello big world");
        line.apply(InputAction::DeleteWord);
        assert_eq!(line.text(), "hello big ");

        line.apply(InputAction::MoveStart);
        line.apply(InputAction::MoveRight);
        line.apply(InputAction::DeleteToEnd);
        assert_eq!(line.text(), "h");
    }

    #[test]
    fn paste_keeps_first_line_without_submitting() {
        let mut line = InputLine::with_text(">");
        assert_eq!(
            line.apply(InputAction::Paste("one\ttwo\nthree".to_string())),
            InputOutcome::Continue { redraw: true }
        );
        assert_eq!(line.text(), ">one two");
    }

    #[test]
    fn submit_takes_the_line() {
        let mut line = InputLine::with_text("/help");
        assert_eq!(
            line.apply(InputAction::Submit),
            InputOutcome::Submit("/help".to_string())
        );
        assert_eq!(line.text(), "");
        assert_eq!(line.cursor(), 0);
    }

    #[test]
    fn key_mapping() {
        assert_eq!(
            map_key_event_to_action(&key(KeyCode::Up, KeyModifiers::NONE)),
            Some(InputAction::HistoryOlder)
        );
        assert_eq!(
            map_key_event_to_action(&key(KeyCode::Down, KeyModifiers::NONE)),
            Some(InputAction::HistoryNewer)
        );
        assert_eq!(
            map_key_event_to_action(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputAction::Quit)
        );
        assert_eq!(
            map_key_event_to_action(&key(KeyCode::Char('u'), KeyModifiers::CONTROL)),
            Some(InputAction::ClearAll)
        );
        assert_eq!(
            map_key_event_to_action(&key(KeyCode::Char('X'), KeyModifiers::SHIFT)),
            Some(InputAction::Insert('X'))
        );
        assert_eq!(
            map_key_event_to_action(&key(KeyCode::Char('x'), KeyModifiers::CONTROL)),
            None
        );
    }
}
