//! Console adapter abstraction
//!
//! The filter never touches a device directly. Everything it does to the
//! screen goes through the [`Console`] trait, which mirrors the primitives a
//! legacy character-cell console offers: cursor, attribute, region scroll,
//! positioned reads and writes, and a redirection query.

pub mod cell;
pub mod codepage;
pub mod memory;

pub use cell::Cell;
pub use memory::{MemoryConsole, ScreenSnapshot};

use crate::Result;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Display attribute bits in the legacy console layout
///
/// Low nibble is the foreground (blue, green, red, intensity), high nibble
/// the background in the same order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Attribute(pub u16);

impl Attribute {
    pub const FOREGROUND_BLUE: Attribute = Attribute(0x0001);
    pub const FOREGROUND_GREEN: Attribute = Attribute(0x0002);
    pub const FOREGROUND_RED: Attribute = Attribute(0x0004);
    pub const FOREGROUND_INTENSITY: Attribute = Attribute(0x0008);
    pub const BACKGROUND_BLUE: Attribute = Attribute(0x0010);
    pub const BACKGROUND_GREEN: Attribute = Attribute(0x0020);
    pub const BACKGROUND_RED: Attribute = Attribute(0x0040);
    pub const BACKGROUND_INTENSITY: Attribute = Attribute(0x0080);

    /// White on black, no intensity
    pub const DEFAULT: Attribute = Attribute(0x0007);

    pub fn bits(self) -> u16 {
        self.0
    }

    pub fn contains(self, other: Attribute) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Attribute {
    type Output = Attribute;

    fn bitor(self, rhs: Attribute) -> Attribute {
        Attribute(self.0 | rhs.0)
    }
}

impl BitOrAssign for Attribute {
    fn bitor_assign(&mut self, rhs: Attribute) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Inclusive rectangle of cells
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.left > self.right || self.top > self.bottom
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Console buffer geometry as reported by the device
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BufferInfo {
    /// Buffer dimensions (cols, rows)
    pub size: (i32, i32),
    /// Current cursor position (x, y)
    pub cursor: (i32, i32),
    /// Attribute new text is written with
    pub attribute: Attribute,
    /// Visible window, inclusive
    pub window: Rect,
}

impl BufferInfo {
    pub fn width(&self) -> i32 {
        self.size.0
    }

    pub fn height(&self) -> i32 {
        self.size.1
    }
}

/// Parameters of a region scroll
///
/// The source rectangle is moved so its top-left corner lands on
/// `destination`. Source cells left uncovered are filled with `fill`
/// drawn in `fill_attribute`. Cells outside `clip` are never touched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollRequest {
    pub source: Rect,
    pub destination: (i32, i32),
    pub fill: u8,
    pub fill_attribute: Attribute,
    pub clip: Rect,
}

/// Capabilities the ANSI filter needs from the underlying console
///
/// Implementors define what counts as a failure (bad coordinates, a closed
/// handle, ...). The filter propagates every error unchanged.
pub trait Console {
    /// Current cursor position (x, y)
    fn cursor(&self) -> Result<(i32, i32)>;

    fn set_cursor(&mut self, x: i32, y: i32) -> Result<()>;

    /// Attribute subsequent text is drawn with
    fn attribute(&self) -> Result<Attribute>;

    fn set_attribute(&mut self, attribute: Attribute) -> Result<()>;

    fn buffer_info(&self) -> Result<BufferInfo>;

    /// Blank the whole buffer with the current attribute
    fn clear_screen(&mut self) -> Result<()>;

    fn scroll(&mut self, request: &ScrollRequest) -> Result<()>;

    /// Write text at the cursor, advancing it and honoring control characters
    fn write_text(&mut self, text: &[u8]) -> Result<()>;

    /// Overwrite characters starting at (x, y) without moving the cursor or
    /// changing attributes. Returns how many cells were written.
    fn write_chars_at(&mut self, text: &[u8], x: i32, y: i32) -> Result<usize>;

    /// Read up to `count` characters starting at (x, y)
    fn read_chars_at(&self, count: usize, x: i32, y: i32) -> Result<Vec<u8>>;

    /// Write bytes verbatim to the redirected target
    fn write_raw(&mut self, bytes: &[u8]) -> Result<()>;

    /// True when output goes to a file or pipe rather than a screen
    fn is_redirected(&self) -> bool;

    fn output_code_page(&self) -> Result<u32>;

    fn set_output_code_page(&mut self, code_page: u32) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_nibbles() {
        let attr = Attribute::FOREGROUND_RED | Attribute::BACKGROUND_BLUE;
        assert_eq!(attr.bits(), 0x0014);
        assert!(attr.contains(Attribute::FOREGROUND_RED));
        assert!(!attr.contains(Attribute::FOREGROUND_INTENSITY));
    }

    #[test]
    fn test_attribute_display() {
        assert_eq!(Attribute::DEFAULT.to_string(), "0x0007");
    }

    #[test]
    fn test_rect_empty_and_contains() {
        assert!(Rect::new(5, 0, 4, 0).is_empty());
        let rect = Rect::new(0, 0, 9, 4);
        assert!(!rect.is_empty());
        assert!(rect.contains(9, 4));
        assert!(!rect.contains(10, 4));
    }
}
