use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::cpu::Cpu;
use crate::decoder::Decoded;

/// Host memory adapter. The core only ever asks for aligned 32-bit words;
/// sub-word accesses are composed in-core.
pub trait Bus {
    fn read_u32(&mut self, addr: u32) -> Result<u32>;
    fn write_u32(&mut self, addr: u32, val: u32) -> Result<()>;

    /// Called for an opcode combination the interpreter does not implement.
    /// There is no way back from here.
    fn report_unimplemented(&mut self, cpu: &Cpu, d: &Decoded) -> ! {
        tracing::error!(
            op = d.op,
            op2 = d.op2,
            op3 = d.op3,
            "unimplemented instruction {:#010x} at pc {:#010x}",
            d.raw,
            cpu.pc
        );
        panic!(
            "unimplemented instruction {:#010x} at pc {:#010x} (op={:#x} op2={:#x} op3={:#x})",
            d.raw, cpu.pc, d.op, d.op2, d.op3
        );
    }
}

/// Byte order used when turning raw files into words.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endian {
    #[default]
    Big,
    Little,
}

impl Endian {
    pub fn word(self, b: [u8; 4]) -> u32 {
        match self {
            Endian::Big => u32::from_be_bytes(b),
            Endian::Little => u32::from_le_bytes(b),
        }
    }

    pub fn bytes(self, v: u32) -> [u8; 4] {
        match self {
            Endian::Big => v.to_be_bytes(),
            Endian::Little => v.to_le_bytes(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct LinearMemory {
    pub mem: Vec<u8>,
    pub base: u32,
    pub endian: Endian,
}

impl LinearMemory {
    pub fn new(size: usize) -> Self {
        Self {
            mem: vec![0; size],
            base: 0,
            endian: Endian::Big,
        }
    }

    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn size(&self) -> usize {
        self.mem.len()
    }

    /// Copies a raw image in at `offset` bytes from the base.
    pub fn load_image(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let Some(end) = offset.checked_add(bytes.len()) else {
            bail!("image offset overflows");
        };
        if end > self.mem.len() {
            bail!(
                "image of {} bytes at offset {offset:#x} exceeds memory of {} bytes",
                bytes.len(),
                self.mem.len()
            );
        }
        self.mem[offset..end].copy_from_slice(bytes);
        Ok(())
    }

    fn word_offset(&self, addr: u32) -> Result<usize> {
        if addr & 0x3 != 0 {
            bail!("unaligned word access at {addr:#010x}");
        }
        let Some(off) = addr.checked_sub(self.base) else {
            bail!("address {addr:#010x} below memory base {:#010x}", self.base);
        };
        let off = off as usize;
        if off + 4 > self.mem.len() {
            bail!("address {addr:#010x} out of range");
        }
        Ok(off)
    }
}

impl Bus for LinearMemory {
    fn read_u32(&mut self, addr: u32) -> Result<u32> {
        let off = self.word_offset(addr)?;
        let mut b = [0u8; 4];
        b.copy_from_slice(&self.mem[off..off + 4]);
        Ok(self.endian.word(b))
    }

    fn write_u32(&mut self, addr: u32, val: u32) -> Result<()> {
        let off = self.word_offset(addr)?;
        self.mem[off..off + 4].copy_from_slice(&self.endian.bytes(val));
        Ok(())
    }
}

/// Linear memory with the two magic words test programs use to talk to the
/// host: the last word of memory collects output values and the one below it
/// receives a completion status (0 for success, otherwise a failing line).
pub struct HarnessMemory {
    pub ram: LinearMemory,
    pub outputs: Vec<u32>,
    pub status: Option<u32>,
}

impl HarnessMemory {
    pub fn new(size: usize) -> Self {
        Self {
            ram: LinearMemory::new(size),
            outputs: Vec::new(),
            status: None,
        }
    }

    pub fn output_addr(&self) -> u32 {
        self.ram.base.wrapping_add(self.ram.size() as u32).wrapping_sub(4)
    }

    pub fn status_addr(&self) -> u32 {
        self.output_addr().wrapping_sub(4)
    }

    pub fn finished(&self) -> bool {
        self.status.is_some()
    }
}

impl Bus for HarnessMemory {
    fn read_u32(&mut self, addr: u32) -> Result<u32> {
        self.ram.read_u32(addr)
    }

    fn write_u32(&mut self, addr: u32, val: u32) -> Result<()> {
        self.ram.write_u32(addr, val)?;
        if addr == self.output_addr() {
            tracing::info!(value = val, "guest output");
            self.outputs.push(val);
        } else if addr == self.status_addr() {
            if val == 0 {
                tracing::info!("guest test completed successfully");
            } else {
                tracing::info!(line = val, "guest test failed");
            }
            self.status = Some(val);
        }
        Ok(())
    }
}
