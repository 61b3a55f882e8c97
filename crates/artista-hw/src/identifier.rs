//! Display identifier stored in screen firmware.
//!
//! Each screen holds a 16-byte slot that callers use to address it
//! independently of USB enumeration order. The slot holds the bytes of a
//! short string, zero-terminated when shorter than the slot:
//!
//! - rendering stops at the first zero byte, so anything after an embedded
//!   zero is lost;
//! - storing copies at most [`ID_SIZE`] bytes verbatim and zero-fills the
//!   rest, which may cut a multi-byte character in half.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Size of the identifier slot in bytes.
pub const ID_SIZE: usize = 16;

/// A 16-byte display identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct DisplayId([u8; ID_SIZE]);

impl DisplayId {
    /// Wraps a raw identifier slot.
    pub const fn from_bytes(bytes: [u8; ID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Returns the raw identifier slot.
    pub fn as_bytes(&self) -> &[u8; ID_SIZE] {
        &self.0
    }

    /// Returns true if the identifier renders as an empty string.
    pub fn is_blank(&self) -> bool {
        self.0[0] == 0
    }

    /// Builds an identifier from a string, truncating to 16 bytes.
    pub fn new(s: &str) -> Self {
        let mut bytes = [0u8; ID_SIZE];
        let len = s.len().min(ID_SIZE);
        bytes[..len].copy_from_slice(&s.as_bytes()[..len]);
        Self(bytes)
    }

    /// Bytes up to the first zero.
    fn text_bytes(&self) -> &[u8] {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(ID_SIZE);
        &self.0[..end]
    }
}

impl FromStr for DisplayId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.text_bytes()))
    }
}

impl PartialEq<str> for DisplayId {
    fn eq(&self, other: &str) -> bool {
        self.text_bytes() == other.as_bytes()
    }
}

impl PartialEq<&str> for DisplayId {
    fn eq(&self, other: &&str) -> bool {
        self.text_bytes() == other.as_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_without_zero_bytes() {
        let id = DisplayId::from_bytes(*b"lobby-left-0001x");
        let text = id.to_string();
        assert_eq!(text, "lobby-left-0001x");
        assert_eq!(DisplayId::new(&text), id);
    }

    #[test]
    fn test_all_zero_is_empty() {
        let id = DisplayId::default();
        assert_eq!(id.to_string(), "");
        assert!(id.is_blank());
    }

    #[test]
    fn test_short_string_zero_padded() {
        let id = DisplayId::new("abc");
        let mut expected = [0u8; ID_SIZE];
        expected[..3].copy_from_slice(b"abc");
        assert_eq!(id.as_bytes(), &expected);
    }

    #[test]
    fn test_long_string_truncated() {
        let id = DisplayId::new("0123456789abcdefOVERFLOW");
        assert_eq!(id.as_bytes(), b"0123456789abcdef");
        assert_eq!(id.to_string(), "0123456789abcdef");
    }

    #[test]
    fn test_embedded_zero_truncates() {
        let mut bytes = [0u8; ID_SIZE];
        bytes[..2].copy_from_slice(b"ab");
        bytes[3] = b'c';
        let id = DisplayId::from_bytes(bytes);
        assert_eq!(id.to_string(), "ab");
        assert_ne!(DisplayId::new(&id.to_string()), id);
    }

    #[test]
    fn test_utf8_bytes_copied_verbatim() {
        let id = DisplayId::new("café");
        assert_eq!(&id.as_bytes()[..6], &[0x63, 0x61, 0x66, 0xC3, 0xA9, 0x00]);
        assert_eq!(id.to_string(), "café");
        assert!(id == "café");

        let id = DisplayId::new("\u{263A}\u{263A}\u{263A}");
        assert_eq!(&id.as_bytes()[..9], "\u{263A}\u{263A}\u{263A}".as_bytes());
        assert_eq!(id.to_string(), "\u{263A}\u{263A}\u{263A}");
    }

    #[test]
    fn test_firmware_written_bytes_compare_equal() {
        let mut bytes = [0u8; ID_SIZE];
        bytes[..5].copy_from_slice("café".as_bytes());
        let id = DisplayId::from_bytes(bytes);
        assert!(id == "café");
        assert_eq!(DisplayId::new("café"), id);
    }

    #[test]
    fn test_truncation_counts_bytes() {
        // 15 ASCII bytes leave room for only the first byte of 'é'
        let id = DisplayId::new("0123456789abcdeé");
        assert_eq!(&id.as_bytes()[..15], b"0123456789abcde");
        assert_eq!(id.as_bytes()[15], 0xC3);
        assert_eq!(id.to_string(), "0123456789abcde\u{FFFD}");
    }

    #[test]
    fn test_compare_with_str() {
        let id: DisplayId = "left".parse().unwrap();
        assert!(id == "left");
        assert!(id != "right");
    }
}
