//! 16-bit address values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 16-bit address on the 6502 bus.
///
/// All arithmetic wraps at the 64 KiB boundary; there is no out-of-range
/// address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(u16);

impl Word {
    /// Build an address from its high and low bytes.
    #[inline]
    pub const fn new(high: u8, low: u8) -> Self {
        Self(((high as u16) << 8) | low as u16)
    }

    /// Address within the zero page.
    #[inline]
    pub const fn zero_page(low: u8) -> Self {
        Self::new(0x00, low)
    }

    /// Address within the stack page.
    #[inline]
    pub const fn stack(low: u8) -> Self {
        Self::new(0x01, low)
    }

    #[inline]
    pub const fn value(self) -> u16 {
        self.0
    }

    #[inline]
    pub const fn high(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[inline]
    pub const fn low(self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// `(self + offset) mod 0x10000`.
    #[inline]
    pub const fn add(self, offset: u16) -> Self {
        Self(self.0.wrapping_add(offset))
    }

    /// Signed displacement, used by relative branches.
    #[inline]
    pub const fn offset(self, displacement: i8) -> Self {
        Self(self.0.wrapping_add(displacement as i16 as u16))
    }

    /// Two addresses share a page iff their high bytes match.
    #[inline]
    pub const fn same_page(self, other: Word) -> bool {
        self.high() == other.high()
    }
}

impl From<u16> for Word {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<Word> for u16 {
    fn from(word: Word) -> Self {
        word.0
    }
}

impl From<Word> for usize {
    fn from(word: Word) -> Self {
        word.0 as usize
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_from_byte_pair_and_raw_value() {
        assert_eq!(Word::new(0x15, 0xFF), Word::from(0x15FF));
        assert_eq!(Word::new(0x15, 0xFF).high(), 0x15);
        assert_eq!(Word::new(0x15, 0xFF).low(), 0xFF);
        assert_eq!(Word::zero_page(0x2F).value(), 0x002F);
        assert_eq!(Word::stack(0xFF).value(), 0x01FF);
    }

    #[test]
    fn add_wraps_at_64k() {
        assert_eq!(Word::from(0xFFFF).add(1), Word::from(0x0000));
        assert_eq!(Word::from(0xFFF0).add(0x20), Word::from(0x0010));
        assert_eq!(Word::from(0x0600).add(14), Word::from(0x060E));
    }

    #[test]
    fn signed_offset_moves_both_directions() {
        assert_eq!(Word::from(0x060A).offset(-8), Word::from(0x0602));
        assert_eq!(Word::from(0x0004).offset(0x02), Word::from(0x0006));
        assert_eq!(Word::from(0x0002).offset(-4), Word::from(0xFFFE));
    }

    #[test]
    fn renders_four_uppercase_hex_digits() {
        assert_eq!(Word::from(2).to_string(), "0002");
        assert_eq!(Word::new(0xDE, 0x05).to_string(), "DE05");
        assert_eq!(Word::from(0x2BAA).to_string(), "2BAA");
    }

    #[test]
    fn page_comparison_uses_high_byte() {
        assert!(Word::from(0x0700).same_page(Word::from(0x07FF)));
        assert!(!Word::from(0x07FF).same_page(Word::from(0x0800)));
        assert!(Word::from(0x0833) > Word::from(0x0789));
    }
}
