//! In-memory console buffer
//!
//! A complete [`Console`] implementation over a 2D grid of cells. It behaves
//! like a legacy console screen buffer in processed-output mode, which makes
//! it usable both as a rendering target for the command line tool and as a
//! deterministic device for tests.

use super::{codepage, Attribute, BufferInfo, Cell, Console, Rect, ScrollRequest};
use crate::{AnsiError, Result};
use log::{debug, trace};
use serde::Serialize;

/// Code page a fresh buffer reports (OEM United States)
const DEFAULT_CODE_PAGE: u32 = 437;

/// Tab stops every 8 columns
const TAB_WIDTH: i32 = 8;

/// Console buffer kept entirely in memory
pub struct MemoryConsole {
    /// 2D buffer: buffer[y][x] where y is row, x is column
    buffer: Vec<Vec<Cell>>,

    /// Current cursor position (x, y), always inside the buffer
    cursor: (i32, i32),

    /// Buffer dimensions (cols, rows)
    size: (i32, i32),

    /// Attribute new text is drawn with
    attribute: Attribute,

    /// When set, output is treated as going to a file or pipe
    redirected: bool,

    /// Bytes received through `write_raw`
    raw_output: Vec<u8>,

    code_page: u32,
}

/// Serializable view of the buffer contents
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenSnapshot {
    pub size: (i32, i32),
    pub cursor: (i32, i32),
    pub attribute: u16,
    pub code_page: u32,
    pub lines: Vec<String>,
}

impl MemoryConsole {
    /// Create a blank console buffer
    pub fn new(cols: u16, rows: u16) -> Self {
        let cols = i32::from(cols.max(1));
        let rows = i32::from(rows.max(1));
        debug!("Creating memory console with {}x{} dimensions", cols, rows);

        Self {
            buffer: vec![vec![Cell::new(); cols as usize]; rows as usize],
            cursor: (0, 0),
            size: (cols, rows),
            attribute: Attribute::DEFAULT,
            redirected: false,
            raw_output: Vec::new(),
            code_page: DEFAULT_CODE_PAGE,
        }
    }

    pub fn with_code_page(mut self, code_page: u32) -> Self {
        self.code_page = code_page;
        self
    }

    pub fn set_redirected(&mut self, redirected: bool) {
        self.redirected = redirected;
    }

    pub fn size(&self) -> (i32, i32) {
        self.size
    }

    pub fn cell(&self, x: i32, y: i32) -> Option<Cell> {
        if !self.bounds().contains(x, y) {
            return None;
        }
        Some(self.buffer[y as usize][x as usize])
    }

    /// Entire row as a string, one char per cell, decoded in the output code page
    pub fn line(&self, y: i32) -> String {
        match usize::try_from(y).ok().and_then(|y| self.buffer.get(y)) {
            Some(row) => row
                .iter()
                .map(|cell| codepage::decode(self.code_page, cell.data))
                .collect(),
            None => String::new(),
        }
    }

    /// Row with trailing spaces removed
    pub fn line_trimmed(&self, y: i32) -> String {
        self.line(y).trim_end().to_string()
    }

    /// Everything handed to `write_raw` while redirected
    pub fn raw_output(&self) -> &[u8] {
        &self.raw_output
    }

    pub fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot {
            size: self.size,
            cursor: self.cursor,
            attribute: self.attribute.bits(),
            code_page: self.code_page,
            lines: (0..self.size.1).map(|y| self.line(y)).collect(),
        }
    }

    fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.size.0 - 1, self.size.1 - 1)
    }

    fn cell_mut(&mut self, x: i32, y: i32) -> &mut Cell {
        &mut self.buffer[y as usize][x as usize]
    }

    /// Move down one row, scrolling the whole buffer up at the bottom
    fn line_feed(&mut self) {
        if self.cursor.1 >= self.size.1 - 1 {
            self.buffer.remove(0);
            let mut blank = vec![Cell::new(); self.size.0 as usize];
            for cell in &mut blank {
                cell.clear(self.attribute);
            }
            self.buffer.push(blank);
        } else {
            self.cursor.1 += 1;
        }
    }

    /// Store one byte at the cursor and advance, wrapping at the right edge
    fn put(&mut self, byte: u8) {
        let (x, y) = self.cursor;
        *self.cell_mut(x, y) = Cell::with_byte(byte, self.attribute);

        self.cursor.0 += 1;
        if self.cursor.0 >= self.size.0 {
            self.cursor.0 = 0;
            self.line_feed();
        }
    }

    /// Linear cell index of a position, rejecting anything off the buffer
    fn offset(&self, x: i32, y: i32) -> Result<usize> {
        if !self.bounds().contains(x, y) {
            return Err(AnsiError::OutOfBounds { x, y });
        }
        Ok((y * self.size.0 + x) as usize)
    }
}

impl Console for MemoryConsole {
    fn cursor(&self) -> Result<(i32, i32)> {
        Ok(self.cursor)
    }

    fn set_cursor(&mut self, x: i32, y: i32) -> Result<()> {
        self.cursor = (x.clamp(0, self.size.0 - 1), y.clamp(0, self.size.1 - 1));
        Ok(())
    }

    fn attribute(&self) -> Result<Attribute> {
        Ok(self.attribute)
    }

    fn set_attribute(&mut self, attribute: Attribute) -> Result<()> {
        self.attribute = attribute;
        Ok(())
    }

    fn buffer_info(&self) -> Result<BufferInfo> {
        Ok(BufferInfo {
            size: self.size,
            cursor: self.cursor,
            attribute: self.attribute,
            window: self.bounds(),
        })
    }

    fn clear_screen(&mut self) -> Result<()> {
        let attribute = self.attribute;
        for row in &mut self.buffer {
            for cell in row {
                cell.clear(attribute);
            }
        }
        Ok(())
    }

    fn scroll(&mut self, request: &ScrollRequest) -> Result<()> {
        let source = request.source;
        if source.is_empty() {
            return Ok(());
        }
        trace!(
            "Scrolling {:?} to {:?} (clip {:?})",
            source,
            request.destination,
            request.clip
        );

        let bounds = self.bounds();
        let writable = |x: i32, y: i32| bounds.contains(x, y) && request.clip.contains(x, y);

        // Capture the source before any cell changes; source and destination may overlap
        let mut moved = Vec::new();
        for y in source.top..=source.bottom {
            for x in source.left..=source.right {
                if bounds.contains(x, y) {
                    moved.push((x - source.left, y - source.top, self.buffer[y as usize][x as usize]));
                }
            }
        }

        let fill = Cell::with_byte(request.fill, request.fill_attribute);
        for y in source.top..=source.bottom {
            for x in source.left..=source.right {
                if writable(x, y) {
                    *self.cell_mut(x, y) = fill;
                }
            }
        }

        let (dest_x, dest_y) = request.destination;
        for (dx, dy, cell) in moved {
            let (x, y) = (dest_x + dx, dest_y + dy);
            if writable(x, y) {
                *self.cell_mut(x, y) = cell;
            }
        }

        Ok(())
    }

    fn write_text(&mut self, text: &[u8]) -> Result<()> {
        for &byte in text {
            match byte {
                b'\n' => {
                    self.cursor.0 = 0;
                    self.line_feed();
                }
                b'\r' => self.cursor.0 = 0,
                0x08 => self.cursor.0 = (self.cursor.0 - 1).max(0),
                b'\t' => {
                    self.cursor.0 = ((self.cursor.0 / TAB_WIDTH + 1) * TAB_WIDTH).min(self.size.0 - 1);
                }
                0x07 => {}
                _ => self.put(byte),
            }
        }
        Ok(())
    }

    fn write_chars_at(&mut self, text: &[u8], x: i32, y: i32) -> Result<usize> {
        let start = self.offset(x, y)?;
        let width = self.size.0 as usize;
        let total = width * self.size.1 as usize;

        let mut written = 0;
        for (index, &byte) in (start..total).zip(text) {
            self.buffer[index / width][index % width].data = byte;
            written += 1;
        }
        Ok(written)
    }

    fn read_chars_at(&self, count: usize, x: i32, y: i32) -> Result<Vec<u8>> {
        let start = self.offset(x, y)?;
        let width = self.size.0 as usize;
        let total = width * self.size.1 as usize;
        let end = start.saturating_add(count).min(total);

        Ok((start..end)
            .map(|index| self.buffer[index / width][index % width].data)
            .collect())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.raw_output.extend_from_slice(bytes);
        Ok(())
    }

    fn is_redirected(&self) -> bool {
        self.redirected
    }

    fn output_code_page(&self) -> Result<u32> {
        Ok(self.code_page)
    }

    fn set_output_code_page(&mut self, code_page: u32) -> Result<()> {
        if code_page == 0 {
            return Err(AnsiError::Console("invalid code page 0".to_string()));
        }
        debug!("Output code page {} -> {}", self.code_page, code_page);
        if !codepage::is_supported(code_page) {
            debug!("No decode table for code page {}, upper half shows as U+FFFD", code_page);
        }
        self.code_page = code_page;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full(console: &MemoryConsole) -> Rect {
        let (w, h) = console.size();
        Rect::new(0, 0, w - 1, h - 1)
    }

    #[test]
    fn test_new_console() {
        let console = MemoryConsole::new(80, 25);
        assert_eq!(console.size(), (80, 25));
        assert_eq!(console.cursor().unwrap(), (0, 0));
        assert_eq!(console.line(0).len(), 80);
        assert_eq!(console.output_code_page().unwrap(), 437);
    }

    #[test]
    fn test_write_text_and_attribute() {
        let mut console = MemoryConsole::new(10, 3);
        console.set_attribute(Attribute::FOREGROUND_RED).unwrap();
        console.write_text(b"Hi").unwrap();

        assert_eq!(console.line_trimmed(0), "Hi");
        assert_eq!(console.cell(1, 0).unwrap().attribute, Attribute::FOREGROUND_RED);
        assert_eq!(console.cursor().unwrap(), (2, 0));
    }

    #[test]
    fn test_write_text_wraps_and_scrolls() {
        let mut console = MemoryConsole::new(5, 2);
        console.write_text(b"ABCDEFGHIJK").unwrap();

        assert_eq!(console.line_trimmed(0), "FGHIJ");
        assert_eq!(console.line_trimmed(1), "K");
        assert_eq!(console.cursor().unwrap(), (1, 1));
    }

    #[test]
    fn test_control_characters() {
        let mut console = MemoryConsole::new(20, 3);
        console.write_text(b"abc\rX\n\tY\x08Z\x07").unwrap();

        assert_eq!(console.line_trimmed(0), "Xbc");
        assert_eq!(console.line_trimmed(1), "        Z");
        assert_eq!(console.cursor().unwrap(), (9, 1));
    }

    #[test]
    fn test_set_cursor_clamps() {
        let mut console = MemoryConsole::new(10, 5);
        console.set_cursor(-3, 99).unwrap();
        assert_eq!(console.cursor().unwrap(), (0, 4));
    }

    #[test]
    fn test_write_chars_at_keeps_cursor_and_attribute() {
        let mut console = MemoryConsole::new(4, 2);
        console.set_attribute(Attribute::BACKGROUND_RED).unwrap();
        let written = console.write_chars_at(b"xyzwvu", 2, 0).unwrap();

        assert_eq!(written, 6);
        assert_eq!(console.line(0), "  xy");
        assert_eq!(console.line(1), "zwvu");
        assert_eq!(console.cursor().unwrap(), (0, 0));
        assert_eq!(console.cell(2, 0).unwrap().attribute, Attribute::DEFAULT);
    }

    #[test]
    fn test_write_chars_at_stops_at_buffer_end() {
        let mut console = MemoryConsole::new(3, 1);
        assert_eq!(console.write_chars_at(b"abcdef", 1, 0).unwrap(), 2);
        assert_eq!(console.line(0), " ab");
    }

    #[test]
    fn test_positioned_io_out_of_bounds() {
        let mut console = MemoryConsole::new(3, 1);
        assert!(matches!(
            console.write_chars_at(b"a", 3, 0),
            Err(AnsiError::OutOfBounds { x: 3, y: 0 })
        ));
        assert!(console.read_chars_at(1, 0, -1).is_err());
    }

    #[test]
    fn test_read_chars_at() {
        let mut console = MemoryConsole::new(6, 2);
        console.write_text(b"hello world").unwrap();
        assert_eq!(console.read_chars_at(4, 3, 0).unwrap(), b"lo w".to_vec());
        assert_eq!(console.read_chars_at(100, 3, 1).unwrap(), b"ld ".to_vec());
    }

    #[test]
    fn test_clear_screen_uses_current_attribute() {
        let mut console = MemoryConsole::new(4, 2);
        console.write_text(b"abcd").unwrap();
        console.set_attribute(Attribute::BACKGROUND_BLUE).unwrap();
        console.clear_screen().unwrap();

        assert_eq!(console.line_trimmed(0), "");
        assert_eq!(console.cell(3, 1).unwrap().attribute, Attribute::BACKGROUND_BLUE);
    }

    #[test]
    fn test_scroll_down_inserts_blank_rows() {
        let mut console = MemoryConsole::new(3, 4);
        console.write_chars_at(b"aaabbbcccddd", 0, 0).unwrap();
        let clip = full(&console);

        console
            .scroll(&ScrollRequest {
                source: Rect::new(0, 1, 2, 3),
                destination: (0, 2),
                fill: b' ',
                fill_attribute: Attribute::DEFAULT,
                clip,
            })
            .unwrap();

        assert_eq!(console.line(0), "aaa");
        assert_eq!(console.line(1), "   ");
        assert_eq!(console.line(2), "bbb");
        assert_eq!(console.line(3), "ccc");
    }

    #[test]
    fn test_scroll_up_within_row() {
        let mut console = MemoryConsole::new(6, 1);
        console.write_chars_at(b"abcdef", 0, 0).unwrap();
        let clip = full(&console);

        console
            .scroll(&ScrollRequest {
                source: Rect::new(3, 0, 5, 0),
                destination: (1, 0),
                fill: b'.',
                fill_attribute: Attribute::DEFAULT,
                clip,
            })
            .unwrap();

        assert_eq!(console.line(0), "adef..");
    }

    #[test]
    fn test_scroll_respects_clip_and_empty_source() {
        let mut console = MemoryConsole::new(4, 1);
        console.write_chars_at(b"abcd", 0, 0).unwrap();

        console
            .scroll(&ScrollRequest {
                source: Rect::new(0, 0, 1, 0),
                destination: (2, 0),
                fill: b'-',
                fill_attribute: Attribute::DEFAULT,
                clip: Rect::new(0, 0, 2, 0),
            })
            .unwrap();
        assert_eq!(console.line(0), "--ad");

        console
            .scroll(&ScrollRequest {
                source: Rect::new(4, 0, 3, 0),
                destination: (0, 0),
                fill: b'!',
                fill_attribute: Attribute::DEFAULT,
                clip: Rect::new(0, 0, 3, 0),
            })
            .unwrap();
        assert_eq!(console.line(0), "--ad");
    }

    #[test]
    fn test_raw_output_and_redirect() {
        let mut console = MemoryConsole::new(4, 1);
        assert!(!console.is_redirected());
        console.set_redirected(true);
        console.write_raw(b"\x1b[31m").unwrap();
        assert!(console.is_redirected());
        assert_eq!(console.raw_output(), b"\x1b[31m");
        assert_eq!(console.line_trimmed(0), "");
    }

    #[test]
    fn test_code_page() {
        let mut console = MemoryConsole::new(4, 1).with_code_page(850);
        assert_eq!(console.output_code_page().unwrap(), 850);
        console.set_output_code_page(1252).unwrap();
        assert_eq!(console.output_code_page().unwrap(), 1252);
        assert!(console.set_output_code_page(0).is_err());
    }

    #[test]
    fn test_line_decodes_output_code_page() {
        let mut console = MemoryConsole::new(5, 1).with_code_page(850);
        console.write_text(b"caf\x82").unwrap();
        assert_eq!(console.line_trimmed(0), "café");
        assert_eq!(console.snapshot().lines, vec!["café ".to_string()]);

        // Same bytes read under the page they are now labelled with
        console.set_output_code_page(1252).unwrap();
        assert_eq!(console.line_trimmed(0), "caf\u{201A}");
    }

    #[test]
    fn test_snapshot() {
        let mut console = MemoryConsole::new(3, 2);
        console.write_text(b"ok").unwrap();
        let snapshot = console.snapshot();

        assert_eq!(snapshot.size, (3, 2));
        assert_eq!(snapshot.cursor, (2, 0));
        assert_eq!(snapshot.lines, vec!["ok ".to_string(), "   ".to_string()]);
        assert_eq!(snapshot.attribute, 7);
    }
}
