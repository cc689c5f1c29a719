//! MOS 6502 execution core
//!
//! [`Cpu6502`] owns a [`Status`] (registers, flags, 64 KiB of memory and the
//! cycle counter) and executes instructions by looking each opcode byte up in
//! [`OPCODE_TABLE`]. Every byte value decodes to something: the 105 bytes with
//! no documented meaning behave as 1-byte, 2-cycle NOPs.
//!
//! Interrupts are not modelled. `BRK` is a 1-byte, 7-cycle instruction that
//! only advances PC; it pushes nothing and does not read the IRQ vector.

use crate::addressing::{resolve, Operand};
use crate::alu;
use crate::flags::Flags;
use crate::logging::{log, LogCategory, LogLevel};
use crate::memory::MEMORY_SIZE;
use crate::opcodes::{Operation, OPCODE_TABLE};
use crate::status::Status;
use crate::word::Word;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version tag written into save states.
const STATE_VERSION: u64 = 1;
const STATE_SYSTEM: &str = "6502";

/// Errors at the boundary of [`Cpu6502::execute`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    #[error("program of {len} bytes at ${entry:04X} does not fit below $10000")]
    ProgramOutOfRange { entry: u16, len: usize },
    #[error("run limit reached after {instructions} instructions ({cycles} cycles) at PC={pc}")]
    LimitReached {
        instructions: u64,
        cycles: u64,
        pc: Word,
    },
}

/// Errors from [`Cpu6502::load_state`].
#[derive(thiserror::Error, Debug)]
pub enum StateError {
    #[error("Invalid save state: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Unsupported save state version {0}")]
    Version(u64),
    #[error("Save state is for system {0:?}")]
    System(String),
}

/// Optional bounds for [`Cpu6502::execute_with_limit`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunLimit {
    pub max_instructions: Option<u64>,
    pub max_cycles: Option<u64>,
}

impl RunLimit {
    /// No bound at all; equivalent to [`Cpu6502::execute`].
    pub const fn unlimited() -> Self {
        Self {
            max_instructions: None,
            max_cycles: None,
        }
    }

    pub const fn instructions(max: u64) -> Self {
        Self {
            max_instructions: Some(max),
            max_cycles: None,
        }
    }

    pub const fn cycles(max: u64) -> Self {
        Self {
            max_instructions: None,
            max_cycles: Some(max),
        }
    }

    fn reached(&self, run: &ExecutionSummary) -> bool {
        self.max_instructions.is_some_and(|max| run.instructions >= max)
            || self.max_cycles.is_some_and(|max| run.cycles >= max)
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    /// Instructions stepped during this run
    pub instructions: u64,
    /// Cycles spent during this run
    pub cycles: u64,
}

/// MOS 6502 CPU state and execution engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cpu6502 {
    pub status: Status,
}

impl Cpu6502 {
    /// A CPU with zeroed registers and memory and SP = 0xFF.
    pub fn new() -> Self {
        Self {
            status: Status::new(),
        }
    }

    /// Back to power-on: fresh registers, cleared memory, zero cycles.
    pub fn reset(&mut self) {
        self.status = Status::new();
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut Status {
        &mut self.status
    }

    /// Load `program` at `entry` and run until PC leaves
    /// `[entry, entry + program.len())`.
    ///
    /// There is no bound on the number of instructions; a program that loops
    /// inside its own window never returns. See [`Cpu6502::execute_with_limit`].
    pub fn execute(&mut self, entry: u16, program: &[u8]) -> Result<ExecutionSummary, ExecuteError> {
        self.execute_with_limit(entry, program, RunLimit::unlimited())
    }

    /// Like [`Cpu6502::execute`] but stops with [`ExecuteError::LimitReached`]
    /// once `limit` is met and PC is still inside the window. The state is
    /// left as it was at that point.
    pub fn execute_with_limit(
        &mut self,
        entry: u16,
        program: &[u8],
        limit: RunLimit,
    ) -> Result<ExecutionSummary, ExecuteError> {
        let start = entry as usize;
        let end = start + program.len();
        if end > MEMORY_SIZE {
            return Err(ExecuteError::ProgramOutOfRange {
                entry,
                len: program.len(),
            });
        }

        self.status.memory.load(Word::from(entry), program);
        self.status.pc = Word::from(entry);
        log(LogCategory::CPU, LogLevel::Debug, || {
            format!(
                "run: {} bytes at ${:04X}, limit {:?}",
                program.len(),
                entry,
                limit
            )
        });

        let mut run = ExecutionSummary::default();
        while (start..end).contains(&usize::from(self.status.pc)) {
            if limit.reached(&run) {
                log(LogCategory::CPU, LogLevel::Debug, || {
                    format!(
                        "run: limit reached after {} instructions at PC={}",
                        run.instructions, self.status.pc
                    )
                });
                return Err(ExecuteError::LimitReached {
                    instructions: run.instructions,
                    cycles: run.cycles,
                    pc: self.status.pc,
                });
            }
            run.cycles += self.step() as u64;
            run.instructions += 1;
        }

        log(LogCategory::CPU, LogLevel::Debug, || {
            format!(
                "run: left window at PC={} after {} instructions, {} cycles",
                self.status.pc, run.instructions, run.cycles
            )
        });
        Ok(run)
    }

    /// Execute one instruction and return cycles used.
    pub fn step(&mut self) -> u32 {
        let pc = self.status.pc;
        let byte = self.status.fetch_u8();
        let opcode = OPCODE_TABLE[byte as usize];

        log(LogCategory::CPU, LogLevel::Trace, || {
            format!(
                "{}  {:02X}  {} {:?}  {}  CYC={}",
                pc,
                byte,
                opcode.operation.mnemonic(),
                opcode.mode,
                self.status.register_summary(),
                self.status.cycles
            )
        });
        match opcode.operation {
            Operation::Undocumented => log(LogCategory::Stubs, LogLevel::Warn, || {
                format!("undocumented opcode ${:02X} at {} executed as NOP", byte, pc)
            }),
            Operation::Brk => log(LogCategory::Stubs, LogLevel::Debug, || {
                format!("BRK at {}: no interrupt sequence, 7 cycles", pc)
            }),
            _ => {}
        }

        let resolved = resolve(&mut self.status, opcode.mode);
        let mut cycles = opcode.cycles as u32;
        if opcode.page_penalty && resolved.page_crossed {
            cycles += 1;
        }
        cycles += self.dispatch(opcode.operation, resolved.operand);

        self.status.cycles += cycles as u64;
        cycles
    }

    /// Carry out `operation`; returns cycles beyond the table cost (branches).
    fn dispatch(&mut self, operation: Operation, operand: Operand) -> u32 {
        match operation {
            Operation::Lda => {
                self.status.a = self.read(operand);
                self.status.flags.set_zero_negative(self.status.a);
            }
            Operation::Ldx => {
                self.status.x = self.read(operand);
                self.status.flags.set_zero_negative(self.status.x);
            }
            Operation::Ldy => {
                self.status.y = self.read(operand);
                self.status.flags.set_zero_negative(self.status.y);
            }
            Operation::Sta => self.write(operand, self.status.a),
            Operation::Stx => self.write(operand, self.status.x),
            Operation::Sty => self.write(operand, self.status.y),

            Operation::And => self.logical(operand, |a, m| a & m),
            Operation::Ora => self.logical(operand, |a, m| a | m),
            Operation::Eor => self.logical(operand, |a, m| a ^ m),
            Operation::Bit => {
                let m = self.read(operand);
                let flags = &mut self.status.flags;
                flags.zero = self.status.a & m == 0;
                flags.negative = m & 0x80 != 0;
                flags.overflow = m & 0x40 != 0;
            }

            Operation::Adc => {
                let m = self.read(operand);
                let (a, flags) = (self.status.a, self.status.flags);
                let sum = if flags.decimal {
                    alu::adc_decimal(a, m, flags.carry)
                } else {
                    alu::adc_binary(a, m, flags.carry)
                };
                self.store_sum(sum);
            }
            Operation::Sbc => {
                let m = self.read(operand);
                let (a, flags) = (self.status.a, self.status.flags);
                let sum = if flags.decimal {
                    alu::sbc_decimal(a, m, flags.carry)
                } else {
                    alu::sbc_binary(a, m, flags.carry)
                };
                self.store_sum(sum);
            }
            Operation::Cmp => self.compare(self.status.a, operand),
            Operation::Cpx => self.compare(self.status.x, operand),
            Operation::Cpy => self.compare(self.status.y, operand),

            Operation::Asl => self.shift(operand, |v, _| alu::asl(v)),
            Operation::Lsr => self.shift(operand, |v, _| alu::lsr(v)),
            Operation::Rol => self.shift(operand, alu::rol),
            Operation::Ror => self.shift(operand, alu::ror),

            Operation::Inc => {
                let v = self.read(operand).wrapping_add(1);
                self.write(operand, v);
                self.status.flags.set_zero_negative(v);
            }
            Operation::Dec => {
                let v = self.read(operand).wrapping_sub(1);
                self.write(operand, v);
                self.status.flags.set_zero_negative(v);
            }
            Operation::Inx => {
                self.status.x = self.status.x.wrapping_add(1);
                self.status.flags.set_zero_negative(self.status.x);
            }
            Operation::Iny => {
                self.status.y = self.status.y.wrapping_add(1);
                self.status.flags.set_zero_negative(self.status.y);
            }
            Operation::Dex => {
                self.status.x = self.status.x.wrapping_sub(1);
                self.status.flags.set_zero_negative(self.status.x);
            }
            Operation::Dey => {
                self.status.y = self.status.y.wrapping_sub(1);
                self.status.flags.set_zero_negative(self.status.y);
            }

            Operation::Tax => {
                self.status.x = self.status.a;
                self.status.flags.set_zero_negative(self.status.x);
            }
            Operation::Tay => {
                self.status.y = self.status.a;
                self.status.flags.set_zero_negative(self.status.y);
            }
            Operation::Txa => {
                self.status.a = self.status.x;
                self.status.flags.set_zero_negative(self.status.a);
            }
            Operation::Tya => {
                self.status.a = self.status.y;
                self.status.flags.set_zero_negative(self.status.a);
            }
            Operation::Tsx => {
                self.status.x = self.status.sp;
                self.status.flags.set_zero_negative(self.status.x);
            }
            Operation::Txs => self.status.sp = self.status.x,

            Operation::Pha => self.status.push(self.status.a),
            Operation::Php => self.status.push(self.status.flags.pack()),
            Operation::Pla => {
                self.status.a = self.status.pull();
                self.status.flags.set_zero_negative(self.status.a);
            }
            Operation::Plp => {
                let p = self.status.pull();
                self.status.flags = Flags::unpack(p);
            }

            Operation::Bcc => return self.branch(!self.status.flags.carry, operand),
            Operation::Bcs => return self.branch(self.status.flags.carry, operand),
            Operation::Bne => return self.branch(!self.status.flags.zero, operand),
            Operation::Beq => return self.branch(self.status.flags.zero, operand),
            Operation::Bpl => return self.branch(!self.status.flags.negative, operand),
            Operation::Bmi => return self.branch(self.status.flags.negative, operand),
            Operation::Bvc => return self.branch(!self.status.flags.overflow, operand),
            Operation::Bvs => return self.branch(self.status.flags.overflow, operand),

            Operation::Jmp => {
                if let Operand::Address(target) = operand {
                    self.status.pc = target;
                }
            }
            Operation::Jsr => {
                if let Operand::Address(target) = operand {
                    // PC is past the operand; the pushed address is its last byte.
                    let ret = self.status.pc.add(0xFFFF);
                    self.status.push(ret.high());
                    self.status.push(ret.low());
                    self.status.pc = target;
                }
            }
            Operation::Rts => {
                let lo = self.status.pull();
                let hi = self.status.pull();
                self.status.pc = Word::new(hi, lo).add(1);
            }
            Operation::Rti => {
                let p = self.status.pull();
                self.status.flags = Flags::unpack(p);
                let lo = self.status.pull();
                let hi = self.status.pull();
                self.status.pc = Word::new(hi, lo);
            }

            Operation::Clc => self.status.flags.carry = false,
            Operation::Sec => self.status.flags.carry = true,
            Operation::Cli => self.status.flags.interrupt = false,
            Operation::Sei => self.status.flags.interrupt = true,
            Operation::Cld => self.status.flags.decimal = false,
            Operation::Sed => self.status.flags.decimal = true,
            Operation::Clv => self.status.flags.overflow = false,

            Operation::Brk | Operation::Nop | Operation::Undocumented => {}
        }
        0
    }

    /// Value an operand stands for.
    #[inline]
    fn read(&self, operand: Operand) -> u8 {
        match operand {
            Operand::Immediate(v) => v,
            Operand::Address(addr) => self.status.memory.read(addr),
            Operand::Accumulator => self.status.a,
            Operand::Implied | Operand::Relative(_) => 0,
        }
    }

    #[inline]
    fn write(&mut self, operand: Operand, v: u8) {
        match operand {
            Operand::Address(addr) => self.status.memory.write(addr, v),
            Operand::Accumulator => self.status.a = v,
            Operand::Implied | Operand::Immediate(_) | Operand::Relative(_) => {}
        }
    }

    fn logical(&mut self, operand: Operand, op: impl FnOnce(u8, u8) -> u8) {
        let m = self.read(operand);
        self.status.a = op(self.status.a, m);
        self.status.flags.set_zero_negative(self.status.a);
    }

    fn store_sum(&mut self, sum: alu::Sum) {
        self.status.a = sum.value;
        self.status.flags.carry = sum.carry;
        self.status.flags.overflow = sum.overflow;
        self.status.flags.set_zero_negative(sum.value);
    }

    fn compare(&mut self, reg: u8, operand: Operand) {
        let (diff, carry) = alu::compare(reg, self.read(operand));
        self.status.flags.carry = carry;
        self.status.flags.set_zero_negative(diff);
    }

    /// Read-modify-write through a shift/rotate kernel that sees the old carry.
    fn shift(&mut self, operand: Operand, op: impl FnOnce(u8, bool) -> (u8, bool)) {
        let (v, carry) = op(self.read(operand), self.status.flags.carry);
        self.write(operand, v);
        self.status.flags.carry = carry;
        self.status.flags.set_zero_negative(v);
    }

    /// Extra cycles for a conditional branch.
    fn branch(&mut self, condition: bool, operand: Operand) -> u32 {
        let Operand::Relative(offset) = operand else {
            return 0;
        };
        let (taken, crossed) = self.branch_if(condition, offset);
        taken as u32 + crossed as u32
    }

    /// Returns `(taken, crossed)`; crossed compares the target with the
    /// address of the next instruction.
    fn branch_if(&mut self, condition: bool, offset: i8) -> (bool, bool) {
        if !condition {
            return (false, false);
        }
        let next = self.status.pc;
        let target = next.offset(offset);
        self.status.pc = target;
        (true, !next.same_page(target))
    }

    /// JSON snapshot of the whole machine, memory included.
    pub fn save_state(&self) -> Value {
        serde_json::json!({
            "version": STATE_VERSION,
            "system": STATE_SYSTEM,
            "status": self.status,
        })
    }

    /// Restore a snapshot produced by [`Cpu6502::save_state`]. On error the
    /// current state is untouched.
    pub fn load_state(&mut self, v: &Value) -> Result<(), StateError> {
        let version = v["version"].as_u64().unwrap_or(0);
        if version != STATE_VERSION {
            return Err(StateError::Version(version));
        }
        let system = v["system"].as_str().unwrap_or("");
        if system != STATE_SYSTEM {
            return Err(StateError::System(system.to_string()));
        }
        self.status = Status::deserialize(&v["status"])?;
        Ok(())
    }
}

impl crate::Cpu for Cpu6502 {
    fn reset(&mut self) {
        Cpu6502::reset(self);
    }

    fn step(&mut self) -> u32 {
        Cpu6502::step(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// CPU with `program` at 0x0600 and PC pointing at it.
    fn cpu_with(program: &[u8]) -> Cpu6502 {
        let mut cpu = Cpu6502::new();
        cpu.status.memory.load(Word::from(0x0600), program);
        cpu.status.pc = Word::from(0x0600);
        cpu
    }

    #[test]
    fn lda_immediate_sets_a_and_flags() {
        let mut cpu = cpu_with(&[0xA9, 0x05, 0xEA]);
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.status.a, 5);
        assert!(!cpu.status.flags.zero);
        assert!(!cpu.status.flags.negative);
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.status.cycles, 4);
    }

    #[test]
    fn lda_leaves_carry_and_overflow_alone() {
        let mut cpu = cpu_with(&[0xA9, 0x00, 0xA9, 0x80]);
        cpu.status.flags.carry = true;
        cpu.status.flags.overflow = true;
        cpu.step();
        assert!(cpu.status.flags.zero);
        cpu.step();
        assert!(cpu.status.flags.negative);
        assert!(!cpu.status.flags.zero);
        assert!(cpu.status.flags.carry && cpu.status.flags.overflow);
    }

    #[test]
    fn zero_page_x_read_costs_four() {
        // LDX #$08; LDA $27,X
        let mut cpu = cpu_with(&[0xA2, 0x08, 0xB5, 0x27]);
        cpu.status.memory[Word::from(0x002F)] = 0x05;
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.step(), 4);
        assert_eq!(cpu.status.a, 0x05);
        assert_eq!(cpu.status.pc, Word::from(0x0604));
    }

    #[test]
    fn page_cross_only_charged_to_reads() {
        // LDA $0789,X crosses; STA $0789,X pays its fixed 5.
        let mut cpu = cpu_with(&[0xBD, 0x89, 0x07, 0x9D, 0x89, 0x07]);
        cpu.status.x = 0xAA;
        assert_eq!(cpu.step(), 5);
        assert_eq!(cpu.step(), 5);

        let mut cpu = cpu_with(&[0xBD, 0x00, 0x07]);
        cpu.status.x = 0x10;
        assert_eq!(cpu.step(), 4);
    }

    #[test]
    fn branch_costs_depend_on_page() {
        // BNE not taken, taken same page, taken across a page.
        let mut cpu = cpu_with(&[0xD0, 0x02]);
        cpu.status.flags.zero = true;
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.status.pc, Word::from(0x0602));

        let mut cpu = cpu_with(&[0xD0, 0x02]);
        assert_eq!(cpu.step(), 3);
        assert_eq!(cpu.status.pc, Word::from(0x0604));

        let mut cpu = cpu_with(&[0xD0, 0x80]);
        assert_eq!(cpu.step(), 4);
        assert_eq!(cpu.status.pc, Word::from(0x0582));
    }

    #[test]
    fn pha_pla_roundtrip() {
        let mut cpu = cpu_with(&[0x48, 0xA9, 0x00, 0x68]); // PHA; LDA #0; PLA
        cpu.status.a = 0x7F;
        assert_eq!(cpu.step(), 3);
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.step(), 4);
        assert_eq!(cpu.status.a, 0x7F);
        assert_eq!(cpu.status.sp, 0xFF);
    }

    #[test]
    fn jsr_rts_returns_to_next_instruction() {
        // JSR $0610; LDA #1 ... RTS at $0610
        let mut cpu = cpu_with(&[0x20, 0x10, 0x06, 0xA9, 0x01]);
        cpu.status.memory[Word::from(0x0610)] = 0x60;
        assert_eq!(cpu.step(), 6);
        assert_eq!(cpu.status.pc, Word::from(0x0610));
        assert_eq!(cpu.status.memory[Word::from(0x01FF)], 0x06);
        assert_eq!(cpu.status.memory[Word::from(0x01FE)], 0x02);
        assert_eq!(cpu.step(), 6);
        assert_eq!(cpu.status.pc, Word::from(0x0603));
        assert_eq!(cpu.status.sp, 0xFF);
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.status.a, 1);
    }

    #[test]
    fn rti_pulls_flags_then_pc() {
        let mut cpu = cpu_with(&[0x40]);
        cpu.status.sp = 0xFC;
        cpu.status.memory[Word::from(0x01FD)] = 0x09; // C and D
        cpu.status.memory[Word::from(0x01FE)] = 0x34;
        cpu.status.memory[Word::from(0x01FF)] = 0x12;
        assert_eq!(cpu.step(), 6);
        assert_eq!(cpu.status.pc, Word::from(0x1234));
        assert!(cpu.status.flags.carry && cpu.status.flags.decimal);
        assert!(!cpu.status.flags.interrupt);
    }

    #[test]
    fn brk_only_advances_past_opcode() {
        let mut cpu = cpu_with(&[0x00, 0xEA]);
        assert_eq!(cpu.step(), 7);
        assert_eq!(cpu.status.pc, Word::from(0x0601));
        assert_eq!(cpu.status.sp, 0xFF);
        assert_eq!(cpu.status.flags, Flags::default());
    }

    #[test]
    fn undocumented_bytes_run_as_nop() {
        let mut cpu = cpu_with(&[0x02, 0xFF, 0x1A]);
        let before = cpu.status.clone();
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.status.pc, Word::from(0x0603));
        assert_eq!(cpu.status.a, before.a);
        assert_eq!(cpu.status.flags, before.flags);
    }

    #[test]
    fn txs_sets_no_flags_but_tsx_does() {
        let mut cpu = cpu_with(&[0x9A, 0xBA]);
        cpu.status.x = 0x00;
        cpu.step();
        assert_eq!(cpu.status.sp, 0x00);
        assert!(!cpu.status.flags.zero);
        cpu.step();
        assert!(cpu.status.flags.zero);
    }

    #[test]
    fn asl_accumulator_and_memory() {
        // ASL A; ASL $10
        let mut cpu = cpu_with(&[0x0A, 0x06, 0x10]);
        cpu.status.a = 0x81;
        cpu.status.memory[Word::from(0x0010)] = 0x3C;
        assert_eq!(cpu.step(), 2);
        assert_eq!(cpu.status.a, 0x02);
        assert!(cpu.status.flags.carry);
        assert_eq!(cpu.step(), 5);
        assert_eq!(cpu.status.memory[Word::from(0x0010)], 0x78);
        assert!(!cpu.status.flags.carry);
    }

    #[test]
    fn execute_stops_when_pc_leaves_window() {
        let mut cpu = Cpu6502::new();
        let run = cpu.execute(0x0600, &[0xA9, 0x01, 0xE8]).unwrap();
        assert_eq!(run, ExecutionSummary { instructions: 2, cycles: 4 });
        assert_eq!(cpu.status.pc, Word::from(0x0603));
    }

    #[test]
    fn empty_program_does_nothing() {
        let mut cpu = Cpu6502::new();
        let run = cpu.execute(0x0600, &[]).unwrap();
        assert_eq!(run.instructions, 0);
        assert_eq!(cpu.status.cycles, 0);
    }

    #[test]
    fn program_past_top_of_memory_is_rejected() {
        let mut cpu = Cpu6502::new();
        let err = cpu.execute(0xFFFF, &[0xEA, 0xEA]).unwrap_err();
        assert_eq!(err, ExecuteError::ProgramOutOfRange { entry: 0xFFFF, len: 2 });
        assert_eq!(cpu.status.memory[Word::from(0xFFFF)], 0);

        assert!(cpu.execute(0xFFFF, &[0xEA]).is_ok());
    }

    #[test]
    fn limit_stops_in_window_loop() {
        // JMP $0600
        let mut cpu = Cpu6502::new();
        let err = cpu
            .execute_with_limit(0x0600, &[0x4C, 0x00, 0x06], RunLimit::instructions(10))
            .unwrap_err();
        assert_eq!(
            err,
            ExecuteError::LimitReached {
                instructions: 10,
                cycles: 30,
                pc: Word::from(0x0600)
            }
        );

        let err = cpu
            .execute_with_limit(0x0600, &[0x4C, 0x00, 0x06], RunLimit::cycles(7))
            .unwrap_err();
        assert!(matches!(err, ExecuteError::LimitReached { instructions: 3, .. }));
    }

    #[test]
    fn save_and_load_state() {
        let mut cpu = Cpu6502::new();
        cpu.execute(0x0600, &[0xA9, 0x08, 0x8D, 0x00, 0x02, 0x38]).unwrap();
        let saved = cpu.save_state();

        let mut other = Cpu6502::new();
        other.load_state(&saved).unwrap();
        assert_eq!(other, cpu);
        assert_eq!(other.status.memory[Word::from(0x0200)], 0x08);
    }

    #[test]
    fn load_state_rejects_foreign_snapshots() {
        let mut cpu = Cpu6502::new();
        let mut saved = cpu.save_state();
        saved["version"] = serde_json::json!(2);
        assert!(matches!(cpu.load_state(&saved), Err(StateError::Version(2))));

        let mut saved = cpu.save_state();
        saved["system"] = serde_json::json!("z80");
        assert!(matches!(cpu.load_state(&saved), Err(StateError::System(_))));

        let mut saved = cpu.save_state();
        saved["status"]["memory"] = serde_json::json!([0, 1, 2]);
        assert!(matches!(cpu.load_state(&saved), Err(StateError::Json(_))));
    }

    #[test]
    fn reset_clears_everything() {
        let mut cpu = Cpu6502::new();
        cpu.execute(0x0600, &[0xA9, 0x08, 0x48]).unwrap();
        cpu.reset();
        assert_eq!(cpu, Cpu6502::new());
    }
}
