//! Terminal colour themes.
//!
//! A theme is applied to the host terminal with OSC sequences: 10/11/12 set
//! the default foreground, background and cursor colours and OSC 4 rewrites
//! the sixteen-colour palette.  [`RESET_SEQUENCE`] puts all of it back.

use std::fmt::Write as _;

/// Restores the palette and default colours changed by [`Theme::sequence`].
pub const RESET_SEQUENCE: &str = "\x1b]104\x07\x1b]110\x07\x1b]111\x07\x1b]112\x07";

/// A 24-bit colour.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Parse `#rgb` or `#rrggbb`.
    pub const fn hex(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        match b.len() {
            4 if b[0] == b'#' => match (nibble(b[1]), nibble(b[2]), nibble(b[3])) {
                (Some(r), Some(g), Some(bl)) => Some(Rgb(r * 17, g * 17, bl * 17)),
                _ => None,
            },
            7 if b[0] == b'#' => match (
                nibble(b[1]),
                nibble(b[2]),
                nibble(b[3]),
                nibble(b[4]),
                nibble(b[5]),
                nibble(b[6]),
            ) {
                (Some(r1), Some(r2), Some(g1), Some(g2), Some(b1), Some(b2)) => {
                    Some(Rgb(r1 * 16 + r2, g1 * 16 + g2, b1 * 16 + b2))
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// The `rgb:rr/gg/bb` form understood by xterm colour OSCs.
    pub fn xparse(&self) -> String {
        format!("rgb:{:02x}/{:02x}/{:02x}", self.0, self.1, self.2)
    }

    /// SGR parameters selecting this colour as a background.
    pub fn sgr_background(&self) -> String {
        format!("48;2;{};{};{}", self.0, self.1, self.2)
    }
}

const fn nibble(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

const fn rgb(s: &str) -> Rgb {
    match Rgb::hex(s) {
        Some(c) => c,
        None => panic!("invalid colour literal"),
    }
}

/// Colours applied to the host terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Default text colour.
    pub foreground: Rgb,
    /// Default background colour.
    pub background: Rgb,
    /// Cursor colour, if the theme sets one.
    pub cursor: Option<Rgb>,
    /// Replacement for ANSI colours 0-15, if the theme sets them.
    pub palette: Option<[Rgb; 16]>,
}

/// White on black, used while booting.
pub const BOOT: Theme = Theme {
    foreground: rgb("#fff"),
    background: rgb("#000"),
    cursor: None,
    palette: None,
};

/// Green on black, applied once the terminal has been taken over.
pub const MATRIX: Theme = Theme {
    foreground: rgb("#0f0"),
    background: rgb("#000"),
    cursor: Some(rgb("#0f0")),
    palette: Some([
        rgb("#000"),
        rgb("#005500"),
        rgb("#00AA00"),
        rgb("#555500"),
        rgb("#000055"),
        rgb("#550055"),
        rgb("#005555"),
        rgb("#AAA"),
        rgb("#222"),
        rgb("#F55"),
        rgb("#5F5"),
        rgb("#FF5"),
        rgb("#55F"),
        rgb("#F5F"),
        rgb("#5FF"),
        rgb("#FFF"),
    ]),
};

impl Theme {
    /// The escape sequence that applies this theme.
    pub fn sequence(&self) -> String {
        let mut out = String::new();
        if let Some(palette) = &self.palette {
            for (idx, colour) in palette.iter().enumerate() {
                let _ = write!(out, "\x1b]4;{idx};{}\x07", colour.xparse());
            }
        }
        let _ = write!(out, "\x1b]10;{}\x07", self.foreground.xparse());
        let _ = write!(out, "\x1b]11;{}\x07", self.background.xparse());
        if let Some(cursor) = &self.cursor {
            let _ = write!(out, "\x1b]12;{}\x07", cursor.xparse());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_short_and_long_hex() {
        assert_eq!(Rgb::hex("#0f0"), Some(Rgb(0, 255, 0)));
        assert_eq!(Rgb::hex("#00AA00"), Some(Rgb(0, 0xaa, 0)));
        assert_eq!(Rgb::hex("0f0"), None);
        assert_eq!(Rgb::hex("#0g0"), None);
    }

    #[test]
    fn matrix_sequence() {
        let seq = MATRIX.sequence();
        assert!(seq.starts_with("\x1b]4;0;rgb:00/00/00\x07"));
        assert!(seq.contains("\x1b]4;2;rgb:00/aa/00\x07"));
        assert!(seq.contains("\x1b]10;rgb:00/ff/00\x07"));
        assert!(seq.contains("\x1b]11;rgb:00/00/00\x07"));
        assert!(seq.ends_with("\x1b]12;rgb:00/ff/00\x07"));
    }

    #[test]
    fn boot_sequence_has_no_palette() {
        let seq = BOOT.sequence();
        assert!(!seq.contains("\x1b]4;"));
        assert_eq!(seq, "\x1b]10;rgb:ff/ff/ff\x07\x1b]11;rgb:00/00/00\x07");
    }
}
