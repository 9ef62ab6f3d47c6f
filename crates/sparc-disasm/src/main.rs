use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use std::fmt::Write as _;
use std::path::Path;

use sparc_disasm::{load_raw_bin, read_u32, Image};
use sparc_sim::disasm::fmt_at;
use sparc_sim::{decode, Endian};

#[derive(Parser, Debug)]
#[command(author, version, about = "SPARC V8 disassembler CLI", long_about = None)]
struct Cli {
    /// Load address for the binary in target address space
    #[arg(long, default_value = "0", value_parser = parse_u32)]
    base: u32,
    /// Skip N bytes at start of file before loading
    #[arg(long, default_value_t = 0usize)]
    skip: usize,
    /// Input binary path
    #[arg(value_name = "BINFILE")]
    input: String,
    /// Limit bytes loaded (default: to EOF after --skip)
    #[arg(long)]
    len: Option<usize>,
    /// Byte order of instruction words in the file
    #[arg(long, value_enum, default_value_t = ByteOrder::Big)]
    endian: ByteOrder,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List loaded segments
    Sections,
    /// Disassemble a range [start, end) in bytes
    Range {
        /// Start address (hex or dec)
        #[arg(value_parser = parse_u32)]
        start: u32,
        /// End address (hex or dec, exclusive)
        #[arg(value_parser = parse_u32)]
        end: u32,
        /// Show instruction bytes
        #[arg(long)]
        show_bytes: bool,
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
        /// Write output to file instead of stdout
        #[arg(long, value_name = "FILE")]
        out: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ByteOrder {
    Big,
    Little,
}

impl From<ByteOrder> for Endian {
    fn from(b: ByteOrder) -> Endian {
        match b {
            ByteOrder::Big => Endian::Big,
            ByteOrder::Little => Endian::Little,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct InsnOut {
    addr: u32,
    raw: u32,
    text: String,
}

fn parse_u32(s: &str) -> Result<u32> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Ok(u32::from_str_radix(hex, 16)?)
    } else {
        Ok(s.parse::<u32>()?)
    }
}

/// Decodes every word in `[start, end)`, stopping at the first unmapped one.
fn disassemble(img: &Image, start: u32, end: u32) -> Vec<InsnOut> {
    let mut out = Vec::new();
    let mut pc = start & !3;
    while pc < end {
        let Some(raw) = read_u32(img, pc) else { break };
        out.push(InsnOut { addr: pc, raw, text: fmt_at(&decode(raw), pc) });
        pc = match pc.checked_add(4) {
            Some(next) => next,
            None => break,
        };
    }
    out
}

fn render_text(insns: &[InsnOut], show_bytes: bool, endian: Endian) -> String {
    let mut buf = String::new();
    for i in insns {
        let _ = write!(buf, "{:#010x}: ", i.addr);
        if show_bytes {
            for b in endian.bytes(i.raw) {
                let _ = write!(buf, "{b:02x} ");
            }
            buf.push_str("  ");
        }
        let _ = writeln!(buf, "{}", i.text);
    }
    buf
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let endian = Endian::from(cli.endian);
    let img = load_raw_bin(Path::new(&cli.input), cli.base, cli.skip, cli.len, endian)?;

    match cli.cmd {
        Command::Sections => {
            println!("{:<10} {:<10} {:<10} {:<6} {:<6}", "name", "start", "end", "perms", "kind");
            for s in &img.segments {
                println!(
                    "{:<10} {:#010x} {:#010x} {:<6} {:<6}",
                    s.name,
                    s.base,
                    s.end(),
                    s.perms,
                    s.kind
                );
            }
        }
        Command::Range { start, end, show_bytes, format, out } => {
            anyhow::ensure!(end >= start, "end must be >= start");
            let insns = disassemble(&img, start, end);
            let text = match format {
                OutputFormat::Text => render_text(&insns, show_bytes, endian),
                OutputFormat::Json => serde_json::to_string_pretty(&insns)?,
            };
            if let Some(path) = out {
                std::fs::write(path, text)?;
            } else {
                print!("{text}");
                if matches!(format, OutputFormat::Json) {
                    println!();
                }
            }
        }
    }

    Ok(())
}
