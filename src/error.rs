//! Error types for ansi-console

use std::io;
use thiserror::Error;

/// Main error type for ansi-console
#[derive(Error, Debug)]
pub enum AnsiError {
    #[error("Console error: {0}")]
    Console(String),

    #[error("Position ({x}, {y}) is outside the console buffer")]
    OutOfBounds { x: i32, y: i32 },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for ansi-console operations
pub type Result<T> = std::result::Result<T, AnsiError>;

impl From<String> for AnsiError {
    fn from(s: String) -> Self {
        AnsiError::Other(s)
    }
}

impl From<&str> for AnsiError {
    fn from(s: &str) -> Self {
        AnsiError::Other(s.to_string())
    }
}

impl From<AnsiError> for io::Error {
    fn from(e: AnsiError) -> Self {
        match e {
            AnsiError::Io(inner) => inner,
            other => io::Error::new(io::ErrorKind::Other, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = AnsiError::OutOfBounds { x: 90, y: -1 };
        assert_eq!(
            err.to_string(),
            "Position (90, -1) is outside the console buffer"
        );
    }

    #[test]
    fn test_io_round_trip_keeps_kind() {
        let err: AnsiError = io::Error::new(io::ErrorKind::BrokenPipe, "pipe").into();
        let back: io::Error = err.into();
        assert_eq!(back.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_from_str() {
        let err: AnsiError = "boom".into();
        assert_eq!(err.to_string(), "boom");
    }
}
