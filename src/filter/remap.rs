//! Code page remapping for plain text
//!
//! Text written by an application is assumed to be in the Windows ("ANSI")
//! code page while the console displays an OEM code page. A [`ByteMap`]
//! translates one to the other a byte at a time. Only the upper half of the
//! table differs; ASCII always maps to itself.

/// A byte-to-byte translation table
#[derive(Clone, PartialEq, Eq)]
pub struct ByteMap {
    table: [u8; 256],
}

impl ByteMap {
    /// Map every byte to itself
    pub fn identity() -> Self {
        let mut table = [0u8; 256];
        for (index, entry) in table.iter_mut().enumerate() {
            *entry = index as u8;
        }
        Self { table }
    }

    /// Build a table from an arbitrary function
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(u8) -> u8,
    {
        let mut table = [0u8; 256];
        for (index, entry) in table.iter_mut().enumerate() {
            *entry = f(index as u8);
        }
        Self { table }
    }

    /// Table for text in code page `from` shown on a console using `to`
    ///
    /// Pairs without a built-in table, and equal pages, give the identity map.
    pub fn for_code_pages(from: u32, to: u32) -> Self {
        match upper_half(from, to) {
            Some(upper) => {
                let mut map = Self::identity();
                map.table[0x80..].copy_from_slice(upper);
                map
            }
            None => Self::identity(),
        }
    }

    /// Whether a built-in table exists for the pair
    pub fn has_table(from: u32, to: u32) -> bool {
        upper_half(from, to).is_some()
    }

    pub fn remap(&self, byte: u8) -> u8 {
        self.table[usize::from(byte)]
    }

    pub fn map(&self, text: &[u8]) -> Vec<u8> {
        text.iter().map(|&b| self.remap(b)).collect()
    }

    pub fn is_identity(&self) -> bool {
        self.table
            .iter()
            .enumerate()
            .all(|(index, &b)| usize::from(b) == index)
    }
}

impl Default for ByteMap {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::fmt::Debug for ByteMap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteMap")
            .field("identity", &self.is_identity())
            .finish()
    }
}

/// Replace every non-whitespace byte with a space
pub fn conceal(text: &[u8]) -> Vec<u8> {
    text.iter()
        .map(|&b| match b {
            b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r' => b,
            _ => b' ',
        })
        .collect()
}

fn upper_half(from: u32, to: u32) -> Option<&'static [u8; 128]> {
    match (from, to) {
        (1252, 850) => Some(&CP1252_TO_CP850),
        (1252, 437) => Some(&CP1252_TO_CP437),
        (1250, 852) => Some(&CP1250_TO_CP852),
        (1251, 855) => Some(&CP1251_TO_CP855),
        _ => None,
    }
}

// Characters the target page lacks are shown as '?' (0x3F).

/// Windows-1252 to OEM 850, bytes 0x80..=0xFF.
const CP1252_TO_CP850: [u8; 128] = [
    0x3F, 0x3F, 0x3F, 0x9F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F,
    0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F,
    0xFF, 0xAD, 0xBD, 0x9C, 0xCF, 0xBE, 0xDD, 0xF5, 0xF9, 0xB8, 0xA6, 0xAE, 0xAA, 0xF0, 0xA9, 0xEE,
    0xF8, 0xF1, 0xFD, 0xFC, 0xEF, 0xE6, 0xF4, 0xFA, 0xF7, 0xFB, 0xA7, 0xAF, 0xAC, 0xAB, 0xF3, 0xA8,
    0xB7, 0xB5, 0xB6, 0xC7, 0x8E, 0x8F, 0x92, 0x80, 0xD4, 0x90, 0xD2, 0xD3, 0xDE, 0xD6, 0xD7, 0xD8,
    0xD1, 0xA5, 0xE3, 0xE0, 0xE2, 0xE5, 0x99, 0x9E, 0x9D, 0xEB, 0xE9, 0xEA, 0x9A, 0xED, 0xE8, 0xE1,
    0x85, 0xA0, 0x83, 0xC6, 0x84, 0x86, 0x91, 0x87, 0x8A, 0x82, 0x88, 0x89, 0x8D, 0xA1, 0x8C, 0x8B,
    0xD0, 0xA4, 0x95, 0xA2, 0x93, 0xE4, 0x94, 0xF6, 0x9B, 0x97, 0xA3, 0x96, 0x81, 0xEC, 0xE7, 0x98,
];

/// Windows-1252 to OEM 437, bytes 0x80..=0xFF.
const CP1252_TO_CP437: [u8; 128] = [
    0x3F, 0x3F, 0x3F, 0x9F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F,
    0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F,
    0xFF, 0xAD, 0x9B, 0x9C, 0x3F, 0x9D, 0x3F, 0x3F, 0x3F, 0x3F, 0xA6, 0xAE, 0xAA, 0x3F, 0x3F, 0x3F,
    0xF8, 0xF1, 0xFD, 0x3F, 0x3F, 0xE6, 0x3F, 0xFA, 0x3F, 0x3F, 0xA7, 0xAF, 0xAC, 0xAB, 0x3F, 0xA8,
    0x3F, 0x3F, 0x3F, 0x3F, 0x8E, 0x8F, 0x92, 0x80, 0x3F, 0x90, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F,
    0x3F, 0xA5, 0x3F, 0x3F, 0x3F, 0x3F, 0x99, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x9A, 0x3F, 0x3F, 0xE1,
    0x85, 0xA0, 0x83, 0x3F, 0x84, 0x86, 0x91, 0x87, 0x8A, 0x82, 0x88, 0x89, 0x8D, 0xA1, 0x8C, 0x8B,
    0x3F, 0xA4, 0x95, 0xA2, 0x93, 0x3F, 0x94, 0xF6, 0x3F, 0x97, 0xA3, 0x96, 0x81, 0x3F, 0x3F, 0x98,
];

/// Windows-1250 to OEM 852, bytes 0x80..=0xFF.
const CP1250_TO_CP852: [u8; 128] = [
    0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0xE6, 0x3F, 0x97, 0x9B, 0xA6, 0x8D,
    0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0xE7, 0x3F, 0x98, 0x9C, 0xA7, 0xAB,
    0xFF, 0xF3, 0xF4, 0x9D, 0xCF, 0xA4, 0x3F, 0xF5, 0xF9, 0x3F, 0xB8, 0xAE, 0xAA, 0xF0, 0x3F, 0xBD,
    0xF8, 0x3F, 0xF2, 0x88, 0xEF, 0x3F, 0x3F, 0x3F, 0xF7, 0xA5, 0xAD, 0xAF, 0x95, 0xF1, 0x96, 0xBE,
    0xE8, 0xB5, 0xB6, 0xC6, 0x8E, 0x91, 0x8F, 0x80, 0xAC, 0x90, 0xA8, 0xD3, 0xB7, 0xD6, 0xD7, 0xD2,
    0xD1, 0xE3, 0xD5, 0xE0, 0xE2, 0x8A, 0x99, 0x9E, 0xFC, 0xDE, 0xE9, 0xEB, 0x9A, 0xED, 0xDD, 0xE1,
    0xEA, 0xA0, 0x83, 0xC7, 0x84, 0x92, 0x86, 0x87, 0x9F, 0x82, 0xA9, 0x89, 0xD8, 0xA1, 0x8C, 0xD4,
    0xD0, 0xE4, 0xE5, 0xA2, 0x93, 0x8B, 0x94, 0xF6, 0xFD, 0x85, 0xA3, 0xFB, 0x81, 0xEC, 0xEE, 0xFA,
];

/// Windows-1251 to OEM 855, bytes 0x80..=0xFF.
const CP1251_TO_CP855: [u8; 128] = [
    0x81, 0x83, 0x3F, 0x82, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x91, 0x3F, 0x93, 0x97, 0x95, 0x9B,
    0x80, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x3F, 0x90, 0x3F, 0x92, 0x96, 0x94, 0x9A,
    0xFF, 0x99, 0x98, 0x8F, 0xCF, 0x3F, 0x3F, 0xFD, 0x85, 0x3F, 0x87, 0xAE, 0x3F, 0xF0, 0x3F, 0x8D,
    0x3F, 0x3F, 0x8B, 0x8A, 0x3F, 0x3F, 0x3F, 0x3F, 0x84, 0xEF, 0x86, 0xAF, 0x8E, 0x89, 0x88, 0x8C,
    0xA1, 0xA3, 0xEC, 0xAD, 0xA7, 0xA9, 0xEA, 0xF4, 0xB8, 0xBE, 0xC7, 0xD1, 0xD3, 0xD5, 0xD7, 0xDD,
    0xE2, 0xE4, 0xE6, 0xE8, 0xAB, 0xB6, 0xA5, 0xFC, 0xF6, 0xFA, 0x9F, 0xF2, 0xEE, 0xF8, 0x9D, 0xE0,
    0xA0, 0xA2, 0xEB, 0xAC, 0xA6, 0xA8, 0xE9, 0xF3, 0xB7, 0xBD, 0xC6, 0xD0, 0xD2, 0xD4, 0xD6, 0xD8,
    0xE1, 0xE3, 0xE5, 0xE7, 0xAA, 0xB5, 0xA4, 0xFB, 0xF5, 0xF9, 0x9E, 0xF1, 0xED, 0xF7, 0x9C, 0xDE,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let map = ByteMap::identity();
        assert!(map.is_identity());
        assert_eq!(map.remap(0xe9), 0xe9);
    }

    #[test]
    fn test_ascii_untouched() {
        let map = ByteMap::for_code_pages(1252, 850);
        assert_eq!(map.map(b"Hello, world!"), b"Hello, world!".to_vec());
        assert!(!map.is_identity());
    }

    #[test]
    fn test_latin1_to_oem() {
        let map = ByteMap::for_code_pages(1252, 850);
        // e acute
        assert_eq!(map.remap(0xe9), 0x82);
        // section sign
        assert_eq!(map.remap(0xa7), 0xf5);

        let map = ByteMap::for_code_pages(1252, 437);
        assert_eq!(map.remap(0xe9), 0x82);
        // euro sign has no cp437 equivalent
        assert_eq!(map.remap(0x80), b'?');
    }

    #[test]
    fn test_cyrillic() {
        let map = ByteMap::for_code_pages(1251, 855);
        // CYRILLIC CAPITAL LETTER A
        assert_eq!(map.remap(0xc0), 0xa1);
    }

    #[test]
    fn test_unknown_pair_is_identity() {
        assert!(ByteMap::for_code_pages(1252, 1252).is_identity());
        assert!(ByteMap::for_code_pages(1253, 737).is_identity());
        assert!(!ByteMap::has_table(65001, 437));
        assert!(ByteMap::has_table(1250, 852));
    }

    #[test]
    fn test_from_fn() {
        let upper = ByteMap::from_fn(|b| b.to_ascii_uppercase());
        assert_eq!(upper.map(b"abc1"), b"ABC1".to_vec());
    }

    #[test]
    fn test_conceal_keeps_whitespace() {
        assert_eq!(conceal(b"pw: s3cr\tet\r\n"), b"        \t  \r\n".to_vec());
    }
}
