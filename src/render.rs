//! Terminal output surface.
//!
//! Everything the boot sequencer, line editor and chat session show goes
//! through the [`Screen`] trait.  [`AnsiScreen`] drives a real terminal with
//! ANSI/OSC escapes; because it is generic over the writer, tests point it at
//! a `Vec<u8>` and inspect exactly what would have reached the terminal.

use std::io::{self, Stdout, Write};

use crate::theme::{RESET_SEQUENCE, Rgb, Theme};

/// ANSI escape code to reset all styling.
pub const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for bold green text (used for the access-granted line).
pub const ANSI_BOLD_GREEN: &str = "\x1b[1;32m";

/// ANSI escape code for bold red text (used for connection errors).
pub const ANSI_BOLD_RED: &str = "\x1b[1;31m";

/// ANSI escape code for green text (used for falling characters).
pub const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for blinking text (used for the takeover banner).
pub const ANSI_BLINK: &str = "\x1b[5m";

/// ANSI escape code to clear from the cursor to the end of the line.
pub const ANSI_CLEAR_LINE: &str = "\x1b[K";

const ANSI_CLEAR_SCREEN: &str = "\x1b[2J\x1b[3J\x1b[H";
const ANSI_HIDE_CURSOR: &str = "\x1b[?25l";
const ANSI_SHOW_CURSOR: &str = "\x1b[?25h";

/// Grid size assumed until the first [`Screen::fit`].
pub const DEFAULT_SIZE: (u16, u16) = (80, 24);

/// A character-cell terminal the application draws on.
///
/// Methods are infallible: a terminal that stops accepting output is not an
/// error the interactive surface can do anything about.
pub trait Screen {
    /// Write text at the cursor.
    fn write(&mut self, text: &str);

    /// Write text followed by a line break.
    fn writeln(&mut self, text: &str) {
        self.write(text);
        self.write("\r\n");
    }

    /// Clear the screen and scrollback, homing the cursor.
    fn clear(&mut self);

    /// Move the cursor to a zero-based cell.
    fn move_to(&mut self, row: u16, col: u16);

    /// Hide the cursor.
    fn hide_cursor(&mut self);

    /// Show the cursor.
    fn show_cursor(&mut self);

    /// Paint every visible cell with `colour`.
    fn fill(&mut self, colour: Rgb);

    /// Apply a colour theme to the terminal.
    fn set_theme(&mut self, theme: &Theme);

    /// Record the grid size after a resize.
    fn fit(&mut self, cols: u16, rows: u16);

    /// Current grid size as `(cols, rows)`.
    fn size(&self) -> (u16, u16);

    /// Push buffered output to the terminal.
    fn flush(&mut self);

    /// Undo any theme, cursor or attribute changes.
    fn reset(&mut self);
}

/// A [`Screen`] that emits ANSI escape sequences to a writer.
pub struct AnsiScreen<W: Write> {
    out: W,
    cols: u16,
    rows: u16,
    after_cr: bool,
}

impl AnsiScreen<Stdout> {
    /// A screen over the process's stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> AnsiScreen<W> {
    /// A screen writing to `out` with the default grid size.
    pub fn new(out: W) -> Self {
        Self {
            out,
            cols: DEFAULT_SIZE.0,
            rows: DEFAULT_SIZE.1,
            after_cr: false,
        }
    }

    /// Borrow the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }

    /// Consume the screen, returning the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, s: &str) {
        let _ = self.out.write_all(s.as_bytes());
    }
}

impl AnsiScreen<Vec<u8>> {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.out).into_owned()
    }

    /// Forget everything written so far.
    pub fn take(&mut self) -> String {
        let contents = self.contents();
        self.out.clear();
        contents
    }
}

impl<W: Write> Screen for AnsiScreen<W> {
    fn write(&mut self, text: &str) {
        // Raw mode does not return the carriage on a bare line feed.
        let mut converted = String::with_capacity(text.len());
        for c in text.chars() {
            if c == '\n' && !self.after_cr {
                converted.push('\r');
            }
            converted.push(c);
            self.after_cr = c == '\r';
        }
        self.emit(&converted);
    }

    fn clear(&mut self) {
        self.emit(ANSI_CLEAR_SCREEN);
        self.after_cr = false;
    }

    fn move_to(&mut self, row: u16, col: u16) {
        let seq = format!("\x1b[{};{}H", row as u32 + 1, col as u32 + 1);
        self.emit(&seq);
    }

    fn hide_cursor(&mut self) {
        self.emit(ANSI_HIDE_CURSOR);
    }

    fn show_cursor(&mut self) {
        self.emit(ANSI_SHOW_CURSOR);
    }

    fn fill(&mut self, colour: Rgb) {
        let blank = " ".repeat(self.cols as usize);
        let mut seq = format!("\x1b[{}m", colour.sgr_background());
        for row in 0..self.rows {
            seq.push_str(&format!("\x1b[{};1H{blank}", row as u32 + 1));
        }
        seq.push_str(ANSI_RESET);
        self.emit(&seq);
    }

    fn set_theme(&mut self, theme: &Theme) {
        let seq = theme.sequence();
        self.emit(&seq);
    }

    fn fit(&mut self, cols: u16, rows: u16) {
        self.cols = cols.max(1);
        self.rows = rows.max(1);
    }

    fn size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }

    fn reset(&mut self) {
        self.emit(ANSI_RESET);
        self.emit(RESET_SEQUENCE);
        self.emit(ANSI_SHOW_CURSOR);
        self.flush();
    }
}
