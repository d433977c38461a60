//! Text attribute state
//!
//! Tracks the SGR state an application has selected and turns it into
//! console attribute bits. The console attribute is always recomputed from
//! the whole state, never patched bit by bit.

use crate::console::Attribute;

/// ANSI color index (bit 0 red, bit 1 green, bit 2 blue) to foreground bits
const FOREGROUND: [Attribute; 8] = [
    Attribute(0x0000), // black
    Attribute::FOREGROUND_RED, // red
    Attribute::FOREGROUND_GREEN, // green
    Attribute(0x0006), // yellow
    Attribute::FOREGROUND_BLUE, // blue
    Attribute(0x0005), // magenta
    Attribute(0x0003), // cyan
    Attribute(0x0007), // white
];

/// Same palette in the background nibble
const BACKGROUND: [Attribute; 8] = [
    Attribute(0x0000),
    Attribute::BACKGROUND_RED,
    Attribute::BACKGROUND_GREEN,
    Attribute(0x0060),
    Attribute::BACKGROUND_BLUE,
    Attribute(0x0050),
    Attribute(0x0030),
    Attribute(0x0070),
];

/// Attribute and cursor state the filter keeps between writes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeState {
    /// Foreground palette index, 0-7
    pub foreground: u8,
    /// Background palette index, 0-7
    pub background: u8,
    pub bold: bool,
    pub underline: bool,
    pub reverse_video: bool,
    /// Text is masked with spaces while set
    pub concealed: bool,
    /// Position stored by `ESC[s`
    pub saved_cursor: Option<(i32, i32)>,
}

impl AttributeState {
    pub fn new() -> Self {
        Self {
            foreground: 7,
            background: 0,
            bold: false,
            underline: false,
            reverse_video: false,
            concealed: false,
            saved_cursor: None,
        }
    }

    /// Back to white on black with every flag cleared; the saved cursor stays
    pub fn reset(&mut self) {
        *self = Self {
            saved_cursor: self.saved_cursor,
            ..Self::new()
        };
    }

    /// Apply a list of SGR codes in order
    ///
    /// Codes this palette cannot express are ignored.
    pub fn apply_sgr<I>(&mut self, codes: I)
    where
        I: IntoIterator<Item = u16>,
    {
        for code in codes {
            match code {
                0 => self.reset(),
                1 => self.bold = true,
                21 => self.bold = false,
                4 => self.underline = true,
                24 => self.underline = false,
                7 => self.reverse_video = true,
                27 => self.reverse_video = false,
                8 => self.concealed = true,
                28 => self.concealed = false,
                30..=37 => self.foreground = (code - 30) as u8,
                40..=47 => self.background = (code - 40) as u8,
                _ => {}
            }
        }
    }

    /// Console attribute bits for the current state
    ///
    /// Underline has no console equivalent and is shown as background
    /// intensity.
    pub fn effective(&self) -> Attribute {
        let (fg, bg) = if self.reverse_video {
            (self.background, self.foreground)
        } else {
            (self.foreground, self.background)
        };

        let mut attribute = FOREGROUND[usize::from(fg & 7)] | BACKGROUND[usize::from(bg & 7)];
        if self.bold {
            attribute |= Attribute::FOREGROUND_INTENSITY;
        }
        if self.underline {
            attribute |= Attribute::BACKGROUND_INTENSITY;
        }
        attribute
    }
}

impl Default for AttributeState {
    fn default() -> Self {
        Self::new()
    }
}
