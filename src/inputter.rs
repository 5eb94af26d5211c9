use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::trace;

/// Single line text entry backing the filter input.
#[derive(Default)]
pub struct Inputter {
    text: String,
    cursor: usize, // in chars
    finished: bool,
    canceled: bool,
}

#[derive(Default, Clone, Debug, PartialEq)]
pub struct InputResult {
    pub text: String,
    pub cursor: usize,
    pub changed: bool,
    pub finished: bool,
    pub canceled: bool,
}

impl Inputter {
    pub fn read(&mut self, key: KeyEvent) -> InputResult {
        let before = self.text.clone();
        match (key.code, key.modifiers) {
            (KeyCode::Enter, _) => self.finished = true,
            (KeyCode::Esc, _) => {
                self.clear();
                self.canceled = true;
                self.finished = true;
            }
            (KeyCode::Backspace, _) => self.backspace(),
            (KeyCode::Delete, _) => self.delete(),
            (KeyCode::Left, _) => self.cursor = self.cursor.saturating_sub(1),
            (KeyCode::Right, _) => self.cursor = (self.cursor + 1).min(self.len()),
            (KeyCode::Home, _) => self.cursor = 0,
            (KeyCode::End, _) => self.cursor = self.len(),
            (KeyCode::Char('u'), KeyModifiers::CONTROL) => {
                self.text.clear();
                self.cursor = 0;
            }
            (KeyCode::Char(chr), m) if !m.contains(KeyModifiers::CONTROL) => self.insert(chr),
            (code, m) => trace!("Inputter ignores {code:?} {m:?}"),
        }
        let mut result = self.get();
        result.changed = result.text != before;
        result
    }

    /// Starts a new edit session on `text`, cursor at the end.
    pub fn set(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.len();
        self.finished = false;
        self.canceled = false;
    }

    pub fn get(&self) -> InputResult {
        InputResult {
            text: self.text.clone(),
            cursor: self.cursor,
            changed: false,
            finished: self.finished,
            canceled: self.canceled,
        }
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.finished = false;
        self.canceled = false;
    }

    fn len(&self) -> usize {
        self.text.chars().count()
    }

    fn insert(&mut self, chr: char) {
        let at = self.byte_pos(self.cursor);
        self.text.insert(at, chr);
        self.cursor += 1;
    }

    fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_pos(self.cursor);
            self.text.remove(at);
        }
    }

    fn delete(&mut self) {
        if self.cursor < self.len() {
            let at = self.byte_pos(self.cursor);
            self.text.remove(at);
        }
    }

    fn byte_pos(&self, cursor: usize) -> usize {
        self.text
            .char_indices()
            .nth(cursor)
            .map(|(byte_idx, _)| byte_idx)
            .unwrap_or(self.text.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(input: &mut Inputter, s: &str) -> InputResult {
        let mut last = input.get();
        for c in s.chars() {
            last = input.read(key(KeyCode::Char(c)));
        }
        last
    }

    #[test]
    fn typing_and_editing_in_the_middle() {
        let mut input = Inputter::default();
        type_str(&mut input, "dta");
        input.read(key(KeyCode::Left));
        input.read(key(KeyCode::Left));
        let r = input.read(key(KeyCode::Char('o')));
        assert_eq!(r.text, "dota");
        assert!(r.changed);

        let r = input.read(key(KeyCode::End));
        assert_eq!(r.cursor, 4);
        assert!(!r.changed);
        let r = input.read(key(KeyCode::Backspace));
        assert_eq!(r.text, "dot");
    }

    #[test]
    fn multibyte_chars() {
        let mut input = Inputter::default();
        type_str(&mut input, "ñé");
        input.read(key(KeyCode::Home));
        let r = input.read(key(KeyCode::Delete));
        assert_eq!(r.text, "é");
    }

    #[test]
    fn escape_clears_and_cancels() {
        let mut input = Inputter::default();
        input.set("rust");
        let r = input.read(key(KeyCode::Esc));
        assert_eq!(r.text, "");
        assert!(r.canceled && r.finished && r.changed);
    }

    #[test]
    fn enter_keeps_text() {
        let mut input = Inputter::default();
        type_str(&mut input, "apex");
        let r = input.read(key(KeyCode::Enter));
        assert_eq!(r.text, "apex");
        assert!(r.finished && !r.canceled);
    }
}
