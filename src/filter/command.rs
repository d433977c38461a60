//! Parsed escape commands
//!
//! A complete sequence looks like `ESC [ 2 ; 5 H`: the escape byte, an
//! introducer, numeric parameters separated by `;`, and a terminating letter.

use std::fmt;

/// The escape-introducer byte
pub const ESC: u8 = 0x1b;

/// Bytes that complete a buffered escape sequence
pub const TERMINATORS: &[u8] = b"mJLM@PABCDEFGHfsuUKX";

/// Returns true if `byte` ends an escape sequence
pub fn is_terminator(byte: u8) -> bool {
    TERMINATORS.contains(&byte)
}

/// Byte following ESC that selects the command family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Introducer {
    /// `ESC [` - cursor, erase, scroll and attribute commands
    Csi,
    /// `ESC (` - code page switching
    Charset,
}

impl Introducer {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'[' => Some(Introducer::Csi),
            b'(' => Some(Introducer::Charset),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Introducer::Csi => b'[',
            Introducer::Charset => b'(',
        }
    }
}

/// One complete escape command
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscapeCommand {
    pub introducer: Introducer,
    /// Parameters in order; `None` where the parameter was left empty
    pub params: Vec<Option<u16>>,
    pub terminator: u8,
}

impl EscapeCommand {
    /// Parse a complete sequence starting with ESC
    ///
    /// Returns `None` when the bytes do not follow the
    /// `ESC introducer [0-9;=]* terminator` grammar.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&terminator, rest) = bytes.split_last()?;
        let (&esc, rest) = rest.split_first()?;
        let (&introducer, body) = rest.split_first()?;

        if esc != ESC || !is_terminator(terminator) {
            return None;
        }
        let introducer = Introducer::from_byte(introducer)?;
        if !body.iter().all(|b| b.is_ascii_digit() || *b == b';' || *b == b'=') {
            return None;
        }

        let params = body.split(|&b| b == b';').map(parse_param).collect();

        Some(Self {
            introducer,
            params,
            terminator,
        })
    }

    /// Explicit value of a parameter, if one was given
    pub fn param(&self, index: usize) -> Option<u16> {
        self.params.get(index).copied().flatten()
    }

    /// Parameter value with the command's implicit default applied
    pub fn arg(&self, index: usize) -> u16 {
        self.param(index)
            .unwrap_or_else(|| implicit_default(self.introducer, self.terminator))
    }

    /// All parameters resolved, in order
    pub fn args(&self) -> impl Iterator<Item = u16> + '_ {
        (0..self.params.len()).map(move |index| self.arg(index))
    }
}

impl fmt::Display for EscapeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ESC{}", char::from(self.introducer.as_byte()))?;
        for (index, param) in self.params.iter().enumerate() {
            if index > 0 {
                write!(f, ";")?;
            }
            if let Some(value) = param {
                write!(f, "{}", value)?;
            }
        }
        write!(f, "{}", char::from(self.terminator))
    }
}

/// Value an empty or missing parameter stands for
///
/// `ESC[m` is `ESC[0m`, `ESC[J` is `ESC[0J`, a missing count moves or
/// scrolls by one, and `ESC[H` homes to row 1, column 1. Insert-character
/// (`@`) has no implicit count.
fn implicit_default(introducer: Introducer, terminator: u8) -> u16 {
    match (introducer, terminator) {
        (Introducer::Csi, b'm' | b'J' | b'K' | b'@') => 0,
        (Introducer::Csi, b'L' | b'M' | b'P') => 1,
        (Introducer::Csi, b'A' | b'B' | b'C' | b'D' | b'E' | b'F' | b'G') => 1,
        (Introducer::Csi, b'H' | b'f') => 1,
        _ => 0,
    }
}

/// Empty means "use the default"; otherwise the value of the leading digits
fn parse_param(raw: &[u8]) -> Option<u16> {
    if raw.is_empty() {
        return None;
    }
    let value = raw
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u16, |acc, b| {
            acc.saturating_mul(10).saturating_add(u16::from(b - b'0'))
        });
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cursor_position() {
        let cmd = EscapeCommand::parse(b"\x1b[2;5H").unwrap();
        assert_eq!(cmd.introducer, Introducer::Csi);
        assert_eq!(cmd.params, vec![Some(2), Some(5)]);
        assert_eq!(cmd.terminator, b'H');
    }

    #[test]
    fn test_empty_params_are_none() {
        let cmd = EscapeCommand::parse(b"\x1b[m").unwrap();
        assert_eq!(cmd.params, vec![None]);
        assert_eq!(cmd.arg(0), 0);

        let cmd = EscapeCommand::parse(b"\x1b[;5H").unwrap();
        assert_eq!(cmd.params, vec![None, Some(5)]);
        assert_eq!(cmd.arg(0), 1);
        assert_eq!(cmd.arg(1), 5);
    }

    #[test]
    fn test_missing_trailing_param_defaults() {
        let cmd = EscapeCommand::parse(b"\x1b[7H").unwrap();
        assert_eq!(cmd.arg(0), 7);
        assert_eq!(cmd.arg(1), 1);
    }

    #[test]
    fn test_count_defaults() {
        for seq in [&b"\x1b[A"[..], b"\x1b[L", b"\x1b[P", b"\x1b[G"] {
            assert_eq!(EscapeCommand::parse(seq).unwrap().arg(0), 1);
        }
        assert_eq!(EscapeCommand::parse(b"\x1b[@").unwrap().arg(0), 0);
        assert_eq!(EscapeCommand::parse(b"\x1b[K").unwrap().arg(0), 0);
    }

    #[test]
    fn test_explicit_zero_is_kept() {
        let cmd = EscapeCommand::parse(b"\x1b[0A").unwrap();
        assert_eq!(cmd.param(0), Some(0));
        assert_eq!(cmd.arg(0), 0);
    }

    #[test]
    fn test_charset_introducer() {
        let cmd = EscapeCommand::parse(b"\x1b(850X").unwrap();
        assert_eq!(cmd.introducer, Introducer::Charset);
        assert_eq!(cmd.param(0), Some(850));

        let cmd = EscapeCommand::parse(b"\x1b(X").unwrap();
        assert_eq!(cmd.param(0), None);
    }

    #[test]
    fn test_equals_param_uses_leading_digits() {
        let cmd = EscapeCommand::parse(b"\x1b[=5m").unwrap();
        assert_eq!(cmd.params, vec![Some(0)]);
    }

    #[test]
    fn test_large_param_saturates() {
        let cmd = EscapeCommand::parse(b"\x1b[999999C").unwrap();
        assert_eq!(cmd.arg(0), u16::MAX);
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(EscapeCommand::parse(b"\x1bM").is_none());
        assert!(EscapeCommand::parse(b"\x1b]2m").is_none());
        assert!(EscapeCommand::parse(b"\x1b[?25m").is_none());
        assert!(EscapeCommand::parse(b"[31m").is_none());
        assert!(EscapeCommand::parse(b"\x1b[31h").is_none());
    }

    #[test]
    fn test_display() {
        let cmd = EscapeCommand::parse(b"\x1b[;5H").unwrap();
        assert_eq!(cmd.to_string(), "ESC[;5H");
        let cmd = EscapeCommand::parse(b"\x1b(U").unwrap();
        assert_eq!(cmd.to_string(), "ESC(U");
    }

    #[test]
    fn test_args_resolves_all() {
        let cmd = EscapeCommand::parse(b"\x1b[1;;31m").unwrap();
        assert_eq!(cmd.args().collect::<Vec<_>>(), vec![1, 0, 31]);
    }
}
