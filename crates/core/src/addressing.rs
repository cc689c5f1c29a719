//! Addressing-mode resolution.
//!
//! [`resolve`] is called with PC pointing at the first operand byte. It
//! consumes exactly the operand bytes of the mode and reports whether
//! indexing carried into a new page, so the dispatcher can charge the
//! page-cross cycle where the opcode calls for it.

use crate::status::Status;
use crate::word::Word;
use serde::{Deserialize, Serialize};

/// 6502 addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AddressingMode {
    /// No operand (CLC, RTS, NOP, ...)
    Implied,
    /// Operates on A (ASL A, ROR A, ...)
    Accumulator,
    /// `#$nn`
    Immediate,
    /// `$nn`
    ZeroPage,
    /// `$nn,X`, wraps within page zero
    ZeroPageX,
    /// `$nn,Y`, wraps within page zero
    ZeroPageY,
    /// Signed branch displacement
    Relative,
    /// `$nnnn`
    Absolute,
    /// `$nnnn,X`
    AbsoluteX,
    /// `$nnnn,Y`
    AbsoluteY,
    /// `($nnnn)`, JMP only
    Indirect,
    /// `($nn,X)`
    IndirectX,
    /// `($nn),Y`
    IndirectY,
}

impl AddressingMode {
    /// Operand bytes following the opcode.
    pub const fn operand_bytes(self) -> u8 {
        match self {
            Self::Implied | Self::Accumulator => 0,
            Self::Immediate
            | Self::ZeroPage
            | Self::ZeroPageX
            | Self::ZeroPageY
            | Self::Relative
            | Self::IndirectX
            | Self::IndirectY => 1,
            Self::Absolute | Self::AbsoluteX | Self::AbsoluteY | Self::Indirect => 2,
        }
    }
}

/// What an instruction operates on once its mode has been resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Implied,
    Accumulator,
    Immediate(u8),
    Address(Word),
    Relative(i8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    pub operand: Operand,
    /// Indexing changed the high byte of the effective address.
    pub page_crossed: bool,
}

impl Resolved {
    fn plain(operand: Operand) -> Self {
        Self {
            operand,
            page_crossed: false,
        }
    }

    fn indexed(base: Word, index: u8) -> Self {
        let addr = base.add(index as u16);
        Self {
            operand: Operand::Address(addr),
            page_crossed: !base.same_page(addr),
        }
    }
}

/// Resolve `mode` against the current state, advancing PC past the operand.
pub fn resolve(status: &mut Status, mode: AddressingMode) -> Resolved {
    match mode {
        AddressingMode::Implied => Resolved::plain(Operand::Implied),
        AddressingMode::Accumulator => Resolved::plain(Operand::Accumulator),
        AddressingMode::Immediate => Resolved::plain(Operand::Immediate(status.fetch_u8())),
        AddressingMode::ZeroPage => {
            let zp = status.fetch_u8();
            Resolved::plain(Operand::Address(Word::zero_page(zp)))
        }
        AddressingMode::ZeroPageX => {
            let zp = status.fetch_u8().wrapping_add(status.x);
            Resolved::plain(Operand::Address(Word::zero_page(zp)))
        }
        AddressingMode::ZeroPageY => {
            let zp = status.fetch_u8().wrapping_add(status.y);
            Resolved::plain(Operand::Address(Word::zero_page(zp)))
        }
        AddressingMode::Relative => Resolved::plain(Operand::Relative(status.fetch_u8() as i8)),
        AddressingMode::Absolute => Resolved::plain(Operand::Address(status.fetch_word())),
        AddressingMode::AbsoluteX => {
            let base = status.fetch_word();
            Resolved::indexed(base, status.x)
        }
        AddressingMode::AbsoluteY => {
            let base = status.fetch_word();
            Resolved::indexed(base, status.y)
        }
        AddressingMode::Indirect => {
            let ptr = status.fetch_word();
            Resolved::plain(Operand::Address(read_indirect_bug(status, ptr)))
        }
        AddressingMode::IndirectX => {
            let zp = status.fetch_u8().wrapping_add(status.x);
            Resolved::plain(Operand::Address(read_zero_page_word(status, zp)))
        }
        AddressingMode::IndirectY => {
            let zp = status.fetch_u8();
            let base = read_zero_page_word(status, zp);
            Resolved::indexed(base, status.y)
        }
    }
}

/// 16-bit pointer stored in page zero; the high byte wraps to `$00` after `$FF`.
fn read_zero_page_word(status: &Status, zp: u8) -> Word {
    let lo = status.memory.read(Word::zero_page(zp));
    let hi = status.memory.read(Word::zero_page(zp.wrapping_add(1)));
    Word::new(hi, lo)
}

/// JMP ($xxFF) fetches the high byte from `$xx00`, not the next page.
fn read_indirect_bug(status: &Status, ptr: Word) -> Word {
    let lo = status.memory.read(ptr);
    let hi = status
        .memory
        .read(Word::new(ptr.high(), ptr.low().wrapping_add(1)));
    Word::new(hi, lo)
}
