//! ANSI stream filter
//!
//! [`AnsiFilter`] is the output sink an application writes to. Bytes are
//! split into text and escape commands by the [`Recognizer`]; text goes to
//! the console (remapped or concealed), commands are turned into cursor,
//! erase, scroll and attribute calls on the [`Console`].
//!
//! The filter holds no locks. Callers writing from several threads must
//! serialize access themselves.

pub mod attribute;
pub mod command;
pub mod recognizer;
pub mod remap;

pub use attribute::AttributeState;
pub use command::{EscapeCommand, Introducer};
pub use recognizer::{Recognizer, Unit};
pub use remap::ByteMap;

use crate::console::{Console, Rect, ScrollRequest};
use crate::Result;
use log::{debug, trace, warn};
use std::io;

/// Windows ("ANSI") code page assumed for application text
pub const DEFAULT_ANSI_CODE_PAGE: u32 = 1252;

/// Settings fixed when a filter is built
#[derive(Clone, Debug)]
pub struct FilterConfig {
    /// Code page application text is written in
    pub ansi_code_page: u32,
    /// Code page the console displays; `None` asks the console
    pub oem_code_page: Option<u32>,
    /// Remap text between the two code pages at start-up
    pub conversion: bool,
    /// Report unsupported sequences at warn level
    pub debug: bool,
    /// Table to use instead of the built-in one for the code page pair
    pub remap: Option<ByteMap>,
}

impl FilterConfig {
    pub fn with_code_pages(mut self, ansi: u32, oem: u32) -> Self {
        self.ansi_code_page = ansi;
        self.oem_code_page = Some(oem);
        self
    }

    pub fn with_conversion(mut self, conversion: bool) -> Self {
        self.conversion = conversion;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_remap(mut self, remap: ByteMap) -> Self {
        self.remap = Some(remap);
        self
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ansi_code_page: DEFAULT_ANSI_CODE_PAGE,
            oem_code_page: None,
            conversion: true,
            debug: false,
            remap: None,
        }
    }
}

/// Byte sink that emulates ANSI escape sequences on a console
pub struct AnsiFilter<C: Console> {
    console: C,
    recognizer: Recognizer,
    attributes: AttributeState,
    remap: ByteMap,
    /// Text remapping currently enabled (`ESC(U` / `ESC(K` / `ESC(#X`)
    conversion: bool,
    /// Console code page at construction, restored by `ESC(K`
    original_code_page: u32,
    debug: bool,
}

impl<C: Console> AnsiFilter<C> {
    /// Wrap a console
    pub fn new(console: C, config: FilterConfig) -> Result<Self> {
        let original_code_page = console.output_code_page()?;
        let oem = config.oem_code_page.unwrap_or(original_code_page);
        let remap = config
            .remap
            .unwrap_or_else(|| ByteMap::for_code_pages(config.ansi_code_page, oem));

        debug!(
            "Creating ANSI filter: cp{} -> cp{}, conversion={}, table={}",
            config.ansi_code_page,
            oem,
            config.conversion,
            !remap.is_identity()
        );
        if config.conversion
            && config.ansi_code_page != oem
            && remap.is_identity()
            && !ByteMap::has_table(config.ansi_code_page, oem)
        {
            debug!(
                "No built-in table for cp{} -> cp{}, text is written unconverted",
                config.ansi_code_page, oem
            );
        }

        Ok(Self {
            console,
            recognizer: Recognizer::new(),
            attributes: AttributeState::new(),
            remap,
            conversion: config.conversion,
            original_code_page,
            debug: config.debug,
        })
    }

    /// Write a chunk of output
    ///
    /// Redirected output is passed through untouched, escape sequences
    /// included. Otherwise every complete unit is applied to the console in
    /// order; an unterminated sequence waits for the next call.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.console.is_redirected() {
            trace!("Redirected, writing {} bytes verbatim", bytes.len());
            return self.console.write_raw(bytes);
        }

        trace!("Filtering {} bytes", bytes.len());
        for unit in self.recognizer.feed(bytes) {
            match unit {
                Unit::Text(text) => self.write_text(&text)?,
                Unit::Command(command) => self.dispatch(&command)?,
            }
        }
        Ok(())
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn into_inner(self) -> C {
        self.console
    }

    pub fn attributes(&self) -> &AttributeState {
        &self.attributes
    }

    /// Bytes of an escape sequence still waiting for its terminator
    pub fn pending(&self) -> &[u8] {
        self.recognizer.pending()
    }

    pub fn conversion_enabled(&self) -> bool {
        self.conversion
    }

    fn write_text(&mut self, text: &[u8]) -> Result<()> {
        if self.attributes.concealed {
            self.console.write_text(&remap::conceal(text))
        } else if self.conversion {
            self.console.write_text(&self.remap.map(text))
        } else {
            self.console.write_text(text)
        }
    }

    fn dispatch(&mut self, command: &EscapeCommand) -> Result<()> {
        trace!("Dispatching {}", command);
        match command.introducer {
            Introducer::Csi => self.dispatch_csi(command),
            Introducer::Charset => self.dispatch_charset(command),
        }
    }

    fn dispatch_csi(&mut self, command: &EscapeCommand) -> Result<()> {
        let n = i32::from(command.arg(0));

        match command.terminator {
            // SGR - set display attributes
            b'm' => {
                self.attributes.apply_sgr(command.args());
                self.console.set_attribute(self.attributes.effective())?;
            }
            b'J' => self.erase_display(command)?,
            b'K' => self.erase_line(command)?,
            // IL - insert blank lines at the cursor row
            b'L' => {
                let info = self.console.buffer_info()?;
                let (x, y) = info.cursor;
                let below = Rect::new(0, y, info.width() - 1, info.height() - 1);
                self.scroll(below, (0, y + n), info.window)?;
                self.console.set_cursor(x, y)?;
            }
            // DL - delete lines at the cursor row; clipping to the rows from
            // the cursor down blanks every vacated row, however large n is
            b'M' => {
                let info = self.console.buffer_info()?;
                let (x, y) = info.cursor;
                let below = Rect::new(0, y, info.width() - 1, info.height() - 1);
                self.scroll(below, (0, y - n), below)?;
                self.console.set_cursor(x, y)?;
            }
            // DCH - delete characters, shifting the rest of the line left
            b'P' => {
                let info = self.console.buffer_info()?;
                let (x, y) = info.cursor;
                let width = info.width();
                let n = if x + n > width - 1 { width - x } else { n };

                self.scroll(Rect::new(x + n, y, width - 1, y), (x, y), info.window)?;
                if n > 0 {
                    self.console.write_chars_at(&spaces(n), width - n, y)?;
                }
                self.console.set_cursor(x, y)?;
            }
            // ICH - insert blanks, shifting the rest of the line right
            b'@' => {
                let info = self.console.buffer_info()?;
                let (x, y) = info.cursor;
                let remainder = (info.window.right - x + 1).max(0) as usize;

                let mut line = spaces(n);
                line.extend(self.console.read_chars_at(remainder, x, y)?);
                line.truncate(remainder);

                self.console.write_chars_at(&line, x, y)?;
                self.console.set_cursor(x, y)?;
            }
            b'A' => self.move_cursor(|x, y| (x, y - n))?,
            b'B' => self.move_cursor(|x, y| (x, y + n))?,
            b'C' => self.move_cursor(|x, y| (x + n, y))?,
            b'D' => self.move_cursor(|x, y| (x - n, y))?,
            b'E' => self.move_cursor(|_, y| (0, y + n))?,
            b'F' => self.move_cursor(|_, y| (0, y - n))?,
            b'G' => self.move_cursor(|_, y| (n - 1, y))?,
            // CUP - 1-based row;col to 0-based device coordinates
            b'H' | b'f' => {
                let row = i32::from(command.arg(0));
                let col = i32::from(command.arg(1));
                self.console.set_cursor(col - 1, row - 1)?;
            }
            b's' => {
                self.attributes.saved_cursor = Some(self.console.cursor()?);
            }
            b'u' => {
                if let Some((x, y)) = self.attributes.saved_cursor {
                    self.console.set_cursor(x, y)?;
                }
            }
            _ => self.unhandled(command),
        }
        Ok(())
    }

    fn dispatch_charset(&mut self, command: &EscapeCommand) -> Result<()> {
        match command.terminator {
            // no mapping
            b'U' => self.conversion = false,
            // mapping back on, original code page restored
            b'K' => {
                self.console.set_output_code_page(self.original_code_page)?;
                self.conversion = true;
            }
            // explicit code page
            b'X' => match command.param(0) {
                Some(code_page) => {
                    self.conversion = false;
                    self.console.set_output_code_page(u32::from(code_page))?;
                }
                None => self.unhandled(command),
            },
            _ => self.unhandled(command),
        }
        Ok(())
    }

    /// ED - erase in display
    fn erase_display(&mut self, command: &EscapeCommand) -> Result<()> {
        let info = self.console.buffer_info()?;
        let (width, height) = info.size;
        let (x, y) = info.cursor;

        match command.arg(0) {
            0 => {
                let count = (height - y) * width - x;
                self.console.write_chars_at(&spaces(count), x, y)?;
                self.console.set_cursor(x, y)?;
            }
            1 => {
                let count = y * width + x + 1;
                self.console.write_chars_at(&spaces(count), 0, 0)?;
                self.console.set_cursor(x, y)?;
            }
            2 => {
                self.console.clear_screen()?;
                self.console.set_cursor(0, 0)?;
            }
            _ => self.unhandled(command),
        }
        Ok(())
    }

    /// EL - erase in line; the cursor ends where it started
    fn erase_line(&mut self, command: &EscapeCommand) -> Result<()> {
        let info = self.console.buffer_info()?;
        let (x, y) = info.cursor;

        match command.arg(0) {
            0 => self
                .console
                .write_chars_at(&spaces(info.window.right - x + 1), x, y)?,
            1 => self.console.write_chars_at(&spaces(x + 1), 0, y)?,
            2 => self.console.write_chars_at(&spaces(info.width()), 0, y)?,
            _ => {
                self.unhandled(command);
                return Ok(());
            }
        };
        self.console.set_cursor(x, y)
    }

    fn move_cursor<F>(&mut self, to: F) -> Result<()>
    where
        F: FnOnce(i32, i32) -> (i32, i32),
    {
        let (x, y) = self.console.cursor()?;
        let (x, y) = to(x, y);
        self.console.set_cursor(x, y)
    }

    /// Scroll a region, filling with blanks in the current attribute
    fn scroll(&mut self, source: Rect, destination: (i32, i32), clip: Rect) -> Result<()> {
        let request = ScrollRequest {
            source,
            destination,
            fill: b' ',
            fill_attribute: self.console.attribute()?,
            clip,
        };
        self.console.scroll(&request)
    }

    fn unhandled(&self, command: &EscapeCommand) {
        if self.debug {
            warn!("{} not implemented", command);
        } else {
            trace!("{} not implemented", command);
        }
    }
}

impl<C: Console> io::Write for AnsiFilter<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn spaces(count: i32) -> Vec<u8> {
    vec![b' '; count.max(0) as usize]
}
