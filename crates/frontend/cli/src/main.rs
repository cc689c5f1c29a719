use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use sim6502_core::logging::{LogCategory, LogConfig, LogLevel};
use sim6502_core::{Cpu6502, ExecuteError, RunLimit, DISPLAY_WIDTH};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Run a 6502 program until PC leaves the bytes it was loaded into.
#[derive(Parser, Debug)]
#[command(name = "sim6502")]
struct Args {
    /// Program file: raw machine code, or hex text with --hex
    program: PathBuf,

    /// Load and entry address ($0600, 0x0600 or 1536)
    #[arg(long, default_value = "0x0600", value_parser = parse_address)]
    entry: u16,

    /// Read the program as whitespace-separated hex bytes
    #[arg(long, default_value_t = false)]
    hex: bool,

    /// Stop with an error after this many instructions
    #[arg(long, default_value_t = 10_000_000)]
    max_instructions: u64,

    /// Stop with an error after this many cycles
    #[arg(long)]
    max_cycles: Option<u64>,

    /// Dump save-state to this file as JSON
    #[arg(long)]
    save: Option<PathBuf>,

    /// Print the 32x32 display window ($0200-$05FF) as hex
    #[arg(long, default_value_t = false)]
    display: bool,

    /// Suppress the register summary
    #[arg(long, default_value_t = false)]
    quiet: bool,

    /// Core log level for every category (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "off", value_parser = parse_level)]
    log_level: LogLevel,

    /// Core log level for the CPU category (instruction trace at "trace")
    #[arg(long, value_parser = parse_level)]
    log_cpu: Option<LogLevel>,

    /// Write core logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn parse_address(s: &str) -> Result<u16, String> {
    let s = s.trim();
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('$'));
    match hex {
        Some(digits) => u16::from_str_radix(digits, 16),
        None => s.parse::<u16>(),
    }
    .map_err(|e| format!("invalid address {:?}: {}", s, e))
}

fn parse_level(s: &str) -> Result<LogLevel, String> {
    LogLevel::from_str(s).ok_or_else(|| format!("unknown log level {:?}", s))
}

/// Hex bytes separated by whitespace; `;` starts a comment.
fn parse_hex_program(text: &str) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let code = line.split(';').next().unwrap_or("");
        for token in code.split_whitespace() {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix('$'))
                .unwrap_or(token);
            let byte = u8::from_str_radix(digits, 16)
                .with_context(|| format!("line {}: invalid hex byte {:?}", line_no + 1, token))?;
            bytes.push(byte);
        }
    }
    Ok(bytes)
}

fn load_program(path: &Path, hex: bool) -> Result<Vec<u8>> {
    if hex {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        parse_hex_program(&text).with_context(|| format!("parsing {}", path.display()))
    } else {
        fs::read(path).with_context(|| format!("reading {}", path.display()))
    }
}

/// One row per display line, two hex digits per pixel.
fn format_display(window: &[u8]) -> String {
    window
        .chunks(DISPLAY_WIDTH)
        .map(|row| {
            row.iter()
                .map(|b| format!("{:02X}", b))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Instructions executed, plus the limit error when the run was cut short.
/// A program that does not fit in memory fails outright.
fn run_program(
    cpu: &mut Cpu6502,
    entry: u16,
    program: &[u8],
    limit: RunLimit,
) -> Result<(u64, Option<ExecuteError>)> {
    match cpu.execute_with_limit(entry, program, limit) {
        Ok(run) => Ok((run.instructions, None)),
        Err(ExecuteError::LimitReached {
            instructions,
            cycles,
            pc,
        }) => Ok((
            instructions,
            Some(ExecuteError::LimitReached {
                instructions,
                cycles,
                pc,
            }),
        )),
        Err(e @ ExecuteError::ProgramOutOfRange { .. }) => Err(e.into()),
    }
}

fn configure_core_logging(args: &Args) -> Result<()> {
    let config = LogConfig::global();
    config.set_global_level(args.log_level);
    if let Some(level) = args.log_cpu {
        config.set_level(LogCategory::CPU, level);
    }
    if let Some(path) = &args.log_file {
        config
            .set_log_file(path.clone())
            .with_context(|| format!("opening log file {}", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    configure_core_logging(&args)?;

    let program = load_program(&args.program, args.hex)?;
    info!(
        "loaded {} bytes from {} at ${:04X}",
        program.len(),
        args.program.display(),
        args.entry
    );

    let limit = RunLimit {
        max_instructions: Some(args.max_instructions),
        max_cycles: args.max_cycles,
    };
    let mut cpu = Cpu6502::new();
    let (instructions, limit_error) = run_program(&mut cpu, args.entry, &program, limit)?;

    if !args.quiet {
        println!("{}", cpu.status.register_summary());
        println!("cycles: {}", cpu.status.cycles);
        println!("instructions: {}", instructions);
    }
    if args.display {
        println!("{}", format_display(&cpu.status.display_window()));
    }
    if let Some(path) = &args.save {
        let state = cpu.save_state();
        let mut f = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        write!(f, "{}", serde_json::to_string_pretty(&state)?)?;
        info!("saved state to {}", path.display());
    }

    if let Some(e) = limit_error {
        warn!("{}", e);
        return Err(e).context("program did not leave its address range");
    }
    Ok(())
}
