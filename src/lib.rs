//! ansi-console - ANSI escape sequence emulation
//!
//! Translates a byte stream containing ANSI/VT100 escape sequences into
//! native console operations (cursor movement, erasure, scrolling and
//! color attributes) for consoles that do not interpret the sequences
//! themselves.

pub mod config;
pub mod console;
pub mod error;
pub mod filter;

pub use console::{Console, MemoryConsole};
pub use error::{AnsiError, Result};
pub use filter::{AnsiFilter, FilterConfig};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "ansi-console";
