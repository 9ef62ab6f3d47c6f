use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use sparc_sim::{Cpu, CpuConfig, Endian, HarnessMemory, Reg, RunExit, TrapMode};

/// Bytes reserved above the initial stack pointer for the harness words and
/// a register-window save area.
const STACK_RESERVE: u32 = 4 + 120;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Vectored,
    Internal,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EndianArg {
    Big,
    Little,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Run a raw SPARC V8 integer image on the sparc-sim interpreter"
)]
struct Opts {
    /// Raw memory image, loaded at address 0
    #[arg(value_name = "IMAGE")]
    image: PathBuf,
    /// Raw CPU-state dump to resume from instead of the reset state
    #[arg(value_name = "STATE")]
    state: Option<PathBuf>,
    /// Guest memory size in bytes
    #[arg(long, default_value_t = 1 << 20)]
    mem_size: usize,
    #[arg(short, long, value_parser = parse_u32, default_value = "0")]
    entry: u32,
    #[arg(long, default_value_t = 10_000_000)]
    max_steps: u64,
    /// CPU configuration as JSON
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Number of register windows (overrides the config file)
    #[arg(long)]
    windows: Option<u8>,
    /// Trap delivery (overrides the config file; internal when there is none)
    #[arg(long, value_enum)]
    trap_mode: Option<ModeArg>,
    /// Byte order of the image and state files
    #[arg(long, value_enum)]
    endian: Option<EndianArg>,
    /// Write the final CPU state as JSON
    #[arg(long, value_name = "FILE")]
    dump_state: Option<PathBuf>,
}

fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}

fn load_config(opts: &Opts) -> Result<CpuConfig> {
    let mut cfg = match &opts.config {
        Some(path) => {
            let txt = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&txt).with_context(|| format!("parsing config {}", path.display()))?
        }
        // bare images rely on the built-in spill/fill routine
        None => CpuConfig { trap_mode: TrapMode::Internal, ..CpuConfig::default() },
    };
    if let Some(n) = opts.windows {
        cfg.nwindows = n;
    }
    match opts.trap_mode {
        Some(ModeArg::Vectored) => cfg.trap_mode = TrapMode::Vectored,
        Some(ModeArg::Internal) => cfg.trap_mode = TrapMode::Internal,
        None => {}
    }
    match opts.endian {
        Some(EndianArg::Big) => cfg.endian = Endian::Big,
        Some(EndianArg::Little) => cfg.endian = Endian::Little,
        None => {}
    }
    Ok(cfg)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let opts = Opts::parse();
    let cfg = load_config(&opts)?;
    anyhow::ensure!(
        opts.mem_size >= 4096 && opts.mem_size % 4 == 0,
        "--mem-size must be a multiple of 4 and at least 4096"
    );
    anyhow::ensure!(
        u32::try_from(opts.mem_size).is_ok(),
        "--mem-size exceeds the 32-bit address space"
    );

    let mut mem = HarnessMemory::new(opts.mem_size);
    mem.ram.endian = cfg.endian;
    let bytes = std::fs::read(&opts.image)
        .with_context(|| format!("reading image {}", opts.image.display()))?;
    mem.ram.load_image(0, &bytes)?;

    let mut cpu = Cpu::new(cfg)?;
    cpu.reset(opts.entry);
    let out_addr = mem.output_addr();
    cpu.set_reg(Reg::SP.index(), (opts.mem_size as u32).wrapping_sub(STACK_RESERVE));
    cpu.set_reg(Reg::O0.index(), out_addr);

    if let Some(path) = &opts.state {
        let raw = std::fs::read(path).with_context(|| format!("reading state {}", path.display()))?;
        cpu.load_raw_dump(&raw, cfg.endian)?;
    }

    let result = cpu.run(&mut mem, opts.max_steps, HarnessMemory::finished);

    for v in &mem.outputs {
        println!("{v}");
    }
    if let Some(path) = &opts.dump_state {
        std::fs::write(path, serde_json::to_string_pretty(&cpu)?)?;
    }

    match result {
        Ok(RunExit::Stopped { steps }) => match mem.status {
            Some(0) => eprintln!("PASS after {steps} steps"),
            Some(line) => anyhow::bail!("guest reported failure at line {line}"),
            None => anyhow::bail!("stopped without a completion status"),
        },
        Ok(RunExit::StepLimit { steps }) => anyhow::bail!("no completion status after {steps} steps"),
        Err(trap) => anyhow::bail!("unhandled {trap}"),
    }
    Ok(())
}
