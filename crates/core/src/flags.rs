//! Processor status register (P).

use serde::{Deserialize, Serialize};
use std::fmt;

pub const CARRY: u8 = 0x01;
pub const ZERO: u8 = 0x02;
pub const INTERRUPT: u8 = 0x04;
pub const DECIMAL: u8 = 0x08;
pub const BREAK: u8 = 0x10;
/// Bit 5 has no latch and always reads back as set.
pub const RESERVED: u8 = 0x20;
pub const OVERFLOW: u8 = 0x40;
pub const NEGATIVE: u8 = 0x80;

/// The seven status flags, packed as `NV1BDIZC` when pushed to the stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub carry: bool,
    pub zero: bool,
    /// Interrupt-disable (I)
    pub interrupt: bool,
    pub decimal: bool,
    pub break_command: bool,
    pub overflow: bool,
    pub negative: bool,
}

impl Flags {
    /// Combine the flags into one byte; the reserved bit is always set.
    pub fn pack(&self) -> u8 {
        let mut p = RESERVED;
        for (set, bit) in [
            (self.carry, CARRY),
            (self.zero, ZERO),
            (self.interrupt, INTERRUPT),
            (self.decimal, DECIMAL),
            (self.break_command, BREAK),
            (self.overflow, OVERFLOW),
            (self.negative, NEGATIVE),
        ] {
            if set {
                p |= bit;
            }
        }
        p
    }

    /// Inverse of [`Flags::pack`]; bit 5 is ignored.
    pub fn unpack(p: u8) -> Self {
        Self {
            carry: p & CARRY != 0,
            zero: p & ZERO != 0,
            interrupt: p & INTERRUPT != 0,
            decimal: p & DECIMAL != 0,
            break_command: p & BREAK != 0,
            overflow: p & OVERFLOW != 0,
            negative: p & NEGATIVE != 0,
        }
    }

    /// Zero and Negative from a data-producing result.
    #[inline]
    pub fn set_zero_negative(&mut self, value: u8) {
        self.zero = value == 0;
        self.negative = value & 0x80 != 0;
    }
}

/// `NV-BDIZC` with upper case for set flags and `.` for clear ones.
impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = |set: bool, c: char| if set { c } else { '.' };
        write!(
            f,
            "{}{}-{}{}{}{}{}",
            letter(self.negative, 'N'),
            letter(self.overflow, 'V'),
            letter(self.break_command, 'B'),
            letter(self.decimal, 'D'),
            letter(self.interrupt, 'I'),
            letter(self.zero, 'Z'),
            letter(self.carry, 'C'),
        )
    }
}
