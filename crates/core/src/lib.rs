//! Cycle-counting MOS 6502 execution core.
//!
//! Load a program into the flat 64 KiB address space and run it until the
//! program counter leaves the program's own byte range:
//!
//! ```rust
//! use sim6502_core::{Cpu6502, Word};
//!
//! let mut cpu = Cpu6502::new();
//! // LDA #$01; STA $0200; LDA #$05; STA $0201; LDA #$08; STA $0202
//! let program = [
//!     0xA9, 0x01, 0x8D, 0x00, 0x02, 0xA9, 0x05, 0x8D, 0x01, 0x02, 0xA9, 0x08, 0x8D, 0x02, 0x02,
//! ];
//! cpu.execute(0x0600, &program).unwrap();
//! assert_eq!(cpu.status.a, 0x08);
//! assert_eq!(cpu.status.pc, Word::from(0x060F));
//! assert_eq!(cpu.status.cycles, 18);
//! ```

pub mod addressing;
pub mod alu;
pub mod cpu_6502;
pub mod flags;
pub mod logging;
pub mod memory;
pub mod opcodes;
pub mod status;
pub mod word;

pub use addressing::{AddressingMode, Operand};
pub use cpu_6502::{Cpu6502, ExecuteError, ExecutionSummary, RunLimit, StateError};
pub use flags::Flags;
pub use memory::{Memory, MEMORY_SIZE};
pub use opcodes::{Opcode, Operation, OPCODE_TABLE};
pub use status::{Status, DISPLAY_HEIGHT, DISPLAY_START, DISPLAY_WIDTH};
pub use word::Word;

/// A CPU-like component that can be stepped; returns cycles consumed.
pub trait Cpu {
    fn reset(&mut self);
    fn step(&mut self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_steps<C: Cpu>(cpu: &mut C, n: usize) -> u32 {
        (0..n).map(|_| cpu.step()).sum()
    }

    #[test]
    fn cpu6502_steps_through_the_trait() {
        let mut cpu = Cpu6502::new();
        cpu.status.memory.load(Word::from(0), &[0xA9, 0x01, 0xEA, 0xE8]);
        assert_eq!(run_steps(&mut cpu, 3), 6);
        assert_eq!(cpu.status.x, 1);

        Cpu::reset(&mut cpu);
        assert_eq!(cpu.status.cycles, 0);
        assert_eq!(cpu.status.memory[Word::from(0)], 0);
    }
}
