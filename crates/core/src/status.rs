//! Complete mutable machine state: registers, flags, memory and the cycle
//! counter.

use crate::flags::Flags;
use crate::logging::{log, LogCategory, LogLevel};
use crate::memory::Memory;
use crate::word::Word;
use serde::{Deserialize, Serialize};

/// First byte of the memory window front-ends render as a bitmap.
pub const DISPLAY_START: u16 = 0x0200;
/// Display window width in pixels (one byte per pixel).
pub const DISPLAY_WIDTH: usize = 32;
/// Display window height in pixels.
pub const DISPLAY_HEIGHT: usize = 32;

/// Register file plus memory.
///
/// A fresh status is all zeroes except the stack pointer, which starts at
/// `0xFF` (top of page `0x01`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Accumulator register
    pub a: u8,
    /// X index register
    pub x: u8,
    /// Y index register
    pub y: u8,
    /// Stack pointer (points to 0x0100 + sp)
    pub sp: u8,
    /// Program counter
    pub pc: Word,
    /// Status register (NV-BDIZC)
    pub flags: Flags,
    /// Total cycles executed
    pub cycles: u64,
    pub memory: Memory,
}

impl Status {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFF,
            pc: Word::default(),
            flags: Flags::default(),
            cycles: 0,
            memory: Memory::new(),
        }
    }

    /// Fetch the byte at PC and advance PC.
    #[inline]
    pub(crate) fn fetch_u8(&mut self) -> u8 {
        let v = self.memory.read(self.pc);
        self.pc = self.pc.add(1);
        v
    }

    /// Fetch a little-endian address at PC and advance PC by two.
    #[inline]
    pub(crate) fn fetch_word(&mut self) -> Word {
        let lo = self.fetch_u8();
        let hi = self.fetch_u8();
        Word::new(hi, lo)
    }

    /// Store at `(0x01, sp)` then decrement sp; sp wraps within page 1.
    pub(crate) fn push(&mut self, v: u8) {
        let addr = Word::stack(self.sp);
        self.memory.write(addr, v);
        self.sp = self.sp.wrapping_sub(1);
        log(LogCategory::Stack, LogLevel::Trace, || {
            format!("push {:02X} -> {}", v, addr)
        });
    }

    /// Increment sp then read from `(0x01, sp)`.
    pub(crate) fn pull(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        let addr = Word::stack(self.sp);
        let v = self.memory.read(addr);
        log(LogCategory::Stack, LogLevel::Trace, || {
            format!("pull {:02X} <- {}", v, addr)
        });
        v
    }

    /// The 32x32 byte window at `$0200-$05FF`, row-major.
    pub fn display_window(&self) -> Vec<u8> {
        self.memory
            .slice(Word::from(DISPLAY_START), DISPLAY_WIDTH * DISPLAY_HEIGHT)
    }

    /// One-line register dump, e.g. `A=08 X=00 Y=00 SP=FF PC=060F P=..-.....`.
    pub fn register_summary(&self) -> String {
        format!(
            "A={:02X} X={:02X} Y={:02X} SP={:02X} PC={} P={}",
            self.a, self.x, self.y, self.sp, self.pc, self.flags
        )
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::new()
    }
}
