//! Single-line input editor.
//!
//! The editor owns the unsubmitted input line and its cursor.  Keys are
//! dispatched synchronously through [`LineEditor::handle_key`]; each category
//! (submit, delete, cursor motion, insertion) has one handler.  Insertion
//! echoes just the new character, and every other mutation redraws the whole
//! input row so the terminal always matches the buffer.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::lock::ActivityLock;
use crate::observability::EDITOR_KEYS_SUPPRESSED;
use crate::render::{ANSI_CLEAR_LINE, Screen};

/// Prompt shown at the start of the input row.
pub const PROMPT: &str = "> ";

/// Write the prompt at the cursor.
pub fn write_prompt(screen: &mut dyn Screen) {
    screen.write(PROMPT);
    screen.flush();
}

/// A key as the editor understands it.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Key {
    /// Submit the line.
    Enter,
    /// Delete the character left of the cursor.
    Backspace,
    /// Move the cursor one position left.
    Left,
    /// Move the cursor one position right.
    Right,
    /// A visible character typed without Control, Super or Meta.
    Char(char),
    /// Anything else; consumed without effect.
    Other,
}

impl Key {
    /// Map a terminal key event.
    pub fn from_event(event: &KeyEvent) -> Self {
        if event.kind == KeyEventKind::Release {
            return Key::Other;
        }
        match event.code {
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Char(c) => {
                let chorded = KeyModifiers::CONTROL | KeyModifiers::SUPER | KeyModifiers::META;
                if c.is_control() || event.modifiers.intersects(chorded) {
                    Key::Other
                } else {
                    Key::Char(c)
                }
            }
            _ => Key::Other,
        }
    }
}

/// What handling a key did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// A request is in flight; the key was dropped.
    Ignored,
    /// The key was accepted but changed nothing.
    Consumed,
    /// The buffer or cursor changed.
    Edited,
    /// The line was submitted.
    Submitted(String),
}

/// An input line and a cursor, `0 <= cursor <= len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl EditBuffer {
    /// An empty buffer with the cursor at 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `c` at the cursor and advance past it.
    pub fn insert(&mut self, c: char) {
        self.chars.insert(self.cursor, c);
        self.cursor += 1;
    }

    /// Remove the character left of the cursor.  False at position 0.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    /// Move left one position.  False at the start.
    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Move right one position.  False at the end.
    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.chars.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    /// Return the contents and reset to empty with the cursor at 0.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        self.chars.drain(..).collect()
    }

    /// Cursor offset in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// True when the buffer holds nothing.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The contents as a string.
    pub fn text(&self) -> String {
        self.chars.iter().collect()
    }
}

/// Translates keys into buffer edits and terminal output.
pub struct LineEditor {
    buffer: EditBuffer,
    lock: ActivityLock,
}

impl LineEditor {
    /// An editor that refuses input while `lock` is held.
    pub fn new(lock: ActivityLock) -> Self {
        Self {
            buffer: EditBuffer::new(),
            lock,
        }
    }

    /// The current input line.
    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    /// Handle one key, drawing its effect on `screen`.
    pub fn handle_key(&mut self, key: Key, screen: &mut dyn Screen) -> KeyOutcome {
        if self.lock.is_held() {
            EDITOR_KEYS_SUPPRESSED.click();
            return KeyOutcome::Ignored;
        }
        let outcome = match key {
            Key::Enter => self.submit(screen),
            Key::Backspace => self.edit(screen, EditBuffer::backspace),
            Key::Left => self.edit(screen, EditBuffer::move_left),
            Key::Right => self.edit(screen, EditBuffer::move_right),
            Key::Char(c) => self.insert(screen, c),
            Key::Other => KeyOutcome::Consumed,
        };
        screen.flush();
        outcome
    }

    /// Clear the input row and rewrite prompt, buffer and cursor position.
    pub fn redraw(&self, screen: &mut dyn Screen) {
        let text = self.buffer.text();
        screen.write(&format!("\r{ANSI_CLEAR_LINE}{PROMPT}{text}"));
        let column = PROMPT.chars().count() + self.buffer.cursor();
        screen.write(&format!("\r\x1b[{column}C"));
    }

    fn submit(&mut self, screen: &mut dyn Screen) -> KeyOutcome {
        let line = self.buffer.take();
        screen.writeln("");
        KeyOutcome::Submitted(line)
    }

    fn edit(&mut self, screen: &mut dyn Screen, op: fn(&mut EditBuffer) -> bool) -> KeyOutcome {
        if op(&mut self.buffer) {
            self.redraw(screen);
            KeyOutcome::Edited
        } else {
            KeyOutcome::Consumed
        }
    }

    fn insert(&mut self, screen: &mut dyn Screen, c: char) -> KeyOutcome {
        self.buffer.insert(c);
        let mut echo = [0u8; 4];
        screen.write(c.encode_utf8(&mut echo));
        if self.buffer.cursor() < self.buffer.len() {
            // Mid-line insertion shifts the tail; only a redraw shows it.
            self.redraw(screen);
        }
        KeyOutcome::Edited
    }
}
