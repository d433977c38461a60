//! Escape sequence recognizer
//!
//! Splits an arbitrarily chunked byte stream into plain text runs and
//! complete escape commands. Once ESC is seen every byte is buffered until
//! one of the terminator letters arrives; there is no length limit, so a
//! stream that opens a sequence and never finishes it keeps growing the
//! pending buffer.

use super::command::{is_terminator, EscapeCommand, ESC};
use log::trace;

/// One unit of recognized output
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unit {
    /// Bytes to be written as text
    Text(Vec<u8>),
    /// A complete, well-formed escape command
    Command(EscapeCommand),
}

/// Streaming state machine over output bytes
#[derive(Debug, Default)]
pub struct Recognizer {
    /// Bytes of the unterminated sequence, starting with ESC
    pending: Vec<u8>,
    in_escape: bool,
}

impl Recognizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume a chunk and return the units it completes, in order
    ///
    /// Text seen in this chunk is always returned; only an unterminated
    /// escape sequence is carried over to the next call.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<Unit> {
        let mut units = Vec::new();
        let mut text = Vec::new();

        for &byte in bytes {
            if !self.in_escape {
                if byte == ESC {
                    if !text.is_empty() {
                        units.push(Unit::Text(std::mem::take(&mut text)));
                    }
                    self.in_escape = true;
                    self.pending.push(byte);
                } else {
                    text.push(byte);
                }
                continue;
            }

            self.pending.push(byte);
            if is_terminator(byte) {
                self.in_escape = false;
                let sequence = std::mem::take(&mut self.pending);
                Self::complete(sequence, &mut units);
            }
        }

        if !text.is_empty() {
            units.push(Unit::Text(text));
        }
        units
    }

    /// Bytes buffered for a sequence that has not terminated yet
    pub fn pending(&self) -> &[u8] {
        &self.pending
    }

    pub fn in_escape(&self) -> bool {
        self.in_escape
    }

    /// Classify a terminated buffer
    ///
    /// Only the last ESC in the buffer can start the command; anything
    /// before it, or a buffer that does not parse, is passed on as text.
    fn complete(sequence: Vec<u8>, units: &mut Vec<Unit>) {
        let start = sequence.iter().rposition(|&b| b == ESC).unwrap_or(0);

        match EscapeCommand::parse(&sequence[start..]) {
            Some(command) => {
                if start > 0 {
                    units.push(Unit::Text(sequence[..start].to_vec()));
                }
                units.push(Unit::Command(command));
            }
            None => {
                trace!("Passing through unrecognized sequence {:?}", sequence);
                units.push(Unit::Text(sequence));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(bytes: &[u8]) -> Unit {
        Unit::Command(EscapeCommand::parse(bytes).unwrap())
    }

    #[test]
    fn test_plain_text() {
        let mut recognizer = Recognizer::new();
        assert_eq!(recognizer.feed(b"hello"), vec![Unit::Text(b"hello".to_vec())]);
        assert!(recognizer.feed(b"").is_empty());
    }

    #[test]
    fn test_text_and_commands() {
        let mut recognizer = Recognizer::new();
        let units = recognizer.feed(b"A\x1b[31mB\x1b[0mC");
        assert_eq!(
            units,
            vec![
                Unit::Text(b"A".to_vec()),
                command(b"\x1b[31m"),
                Unit::Text(b"B".to_vec()),
                command(b"\x1b[0m"),
                Unit::Text(b"C".to_vec()),
            ]
        );
    }

    #[test]
    fn test_sequence_split_across_feeds() {
        let mut recognizer = Recognizer::new();
        assert_eq!(recognizer.feed(b"x\x1b["), vec![Unit::Text(b"x".to_vec())]);
        assert!(recognizer.in_escape());
        assert_eq!(recognizer.pending(), b"\x1b[");

        assert!(recognizer.feed(b"1;3").is_empty());
        assert_eq!(recognizer.feed(b"2m"), vec![command(b"\x1b[1;32m")]);
        assert!(!recognizer.in_escape());
        assert!(recognizer.pending().is_empty());
    }

    #[test]
    fn test_unterminated_sequence_keeps_buffering() {
        let mut recognizer = Recognizer::new();
        recognizer.feed(b"\x1b[");
        for _ in 0..100 {
            assert!(recognizer.feed(b"1;").is_empty());
        }
        assert_eq!(recognizer.pending().len(), 202);
    }

    #[test]
    fn test_malformed_sequence_passes_through() {
        let mut recognizer = Recognizer::new();
        let units = recognizer.feed(b"\x1b[?25hello\x1b[K");
        assert_eq!(
            units,
            vec![Unit::Text(b"\x1b[?25hello".to_vec()), command(b"\x1b[K")]
        );
    }

    #[test]
    fn test_unparseable_terminated_buffer_is_text() {
        let mut recognizer = Recognizer::new();
        assert_eq!(
            recognizer.feed(b"\x1bMx"),
            vec![Unit::Text(b"\x1bM".to_vec()), Unit::Text(b"x".to_vec())]
        );
    }

    #[test]
    fn test_second_escape_restarts_command() {
        let mut recognizer = Recognizer::new();
        let units = recognizer.feed(b"\x1b\x1b[2J");
        assert_eq!(
            units,
            vec![Unit::Text(b"\x1b".to_vec()), command(b"\x1b[2J")]
        );
    }

    #[test]
    fn test_high_bytes_are_opaque() {
        let mut recognizer = Recognizer::new();
        assert_eq!(
            recognizer.feed(&[0xe9, 0x00, 0xff]),
            vec![Unit::Text(vec![0xe9, 0x00, 0xff])]
        );
    }
}
