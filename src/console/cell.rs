//! Console cell - a single character position in a console buffer

use super::Attribute;

/// A single character cell
///
/// The character is kept as a byte in the console's output code page, the
/// way a legacy console stores it; the attribute is stored alongside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub data: u8,
    pub attribute: Attribute,
}

impl Cell {
    /// Create a blank cell with the default attribute
    pub fn new() -> Self {
        Self {
            data: b' ',
            attribute: Attribute::DEFAULT,
        }
    }

    pub fn with_byte(data: u8, attribute: Attribute) -> Self {
        Self { data, attribute }
    }

    /// Reset cell to a space drawn in `attribute`
    pub fn clear(&mut self, attribute: Attribute) {
        self.data = b' ';
        self.attribute = attribute;
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new()
    }
}
