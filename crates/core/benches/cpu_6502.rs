use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sim6502_core::{Cpu6502, RunLimit, Word};

const ENTRY: u16 = 0x0600;

/// LDA #$42; STA $2000; LDX #$10; LDY #$20; INX; INY; DEX; DEY; ADC #$01; JMP $0600
const LOOP: [u8; 18] = [
    0xA9, 0x42, 0x8D, 0x00, 0x20, 0xA2, 0x10, 0xA0, 0x20, 0xE8, 0xC8, 0xCA, 0x88, 0x69, 0x01, 0x4C,
    0x00, 0x06,
];

/// LDX #$FF; (LDY #$FF; DEY; BNE -3; DEX; BNE -8), then off the end.
const COUNTDOWN: [u8; 10] = [0xA2, 0xFF, 0xA0, 0xFF, 0x88, 0xD0, 0xFD, 0xCA, 0xD0, 0xF8];

fn cpu_at_loop() -> Cpu6502 {
    let mut cpu = Cpu6502::new();
    cpu.status.memory.load(Word::from(ENTRY), &LOOP);
    cpu.status.pc = Word::from(ENTRY);
    cpu
}

fn bench_cpu_step(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_step");

    group.bench_function("single_instruction", |b| {
        let mut cpu = cpu_at_loop();
        b.iter(|| {
            if usize::from(cpu.status.pc) >= ENTRY as usize + LOOP.len() {
                cpu.status.pc = Word::from(ENTRY);
            }
            black_box(cpu.step());
        });
    });

    group.finish();
}

fn bench_cpu_multiple_steps(c: &mut Criterion) {
    let mut group = c.benchmark_group("cpu_6502_multiple_steps");

    for step_count in [10u64, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(step_count),
            &step_count,
            |b, &count| {
                b.iter(|| {
                    let mut cpu = Cpu6502::new();
                    let _ = cpu.execute_with_limit(ENTRY, &LOOP, RunLimit::instructions(count));
                    black_box(cpu.status.cycles);
                });
            },
        );
    }

    group.finish();
}

fn bench_cpu_execute(c: &mut Criterion) {
    c.bench_function("cpu_6502_execute_countdown", |b| {
        b.iter(|| {
            let mut cpu = Cpu6502::new();
            black_box(cpu.execute(ENTRY, &COUNTDOWN).map(|run| run.cycles))
        });
    });
}

fn bench_cpu_reset(c: &mut Criterion) {
    c.bench_function("cpu_6502_reset", |b| {
        let mut cpu = cpu_at_loop();
        b.iter(|| {
            cpu.reset();
            black_box(cpu.status.pc);
        });
    });
}

criterion_group!(
    benches,
    bench_cpu_step,
    bench_cpu_multiple_steps,
    bench_cpu_execute,
    bench_cpu_reset
);
criterion_main!(benches);
