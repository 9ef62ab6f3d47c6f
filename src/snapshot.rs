//! Raw CPU-state dumps.
//!
//! A dump is a sequence of 32-bit words in this order: `pc`, `npc`, the flat
//! register file, `psr`, `wim`, `tbr`, `y`, the pending trap code (0 for
//! none), the annul flag and the queued branch target ([`NO_BRANCH`] for
//! none). A dump may stop after any whole field; the fields it leaves out
//! keep their current value.

use crate::cpu::{Cpu, Psr};
use crate::error::SnapshotError;
use crate::memory::Endian;
use crate::trap::TrapType;

/// Branch-target word meaning no transfer is queued.
pub const NO_BRANCH: u32 = 0xffff_ffff;

/// Words after the register file.
const TAIL_WORDS: usize = 7;

impl Cpu {
    /// Size in bytes of a complete dump for this CPU's window count.
    pub fn record_len(&self) -> usize {
        4 * (2 + self.regs.len() + TAIL_WORDS)
    }

    /// Overlays a raw dump. The dump is checked in full before anything is
    /// written, so on error the CPU is unchanged.
    pub fn load_raw_dump(&mut self, bytes: &[u8], endian: Endian) -> Result<(), SnapshotError> {
        if bytes.is_empty() {
            return Err(SnapshotError::Empty);
        }
        if bytes.len() % 4 != 0 {
            return Err(SnapshotError::Misaligned(bytes.len()));
        }
        let max = self.record_len();
        if bytes.len() > max {
            return Err(SnapshotError::TooLong { len: bytes.len(), max });
        }

        let words: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|c| endian.word([c[0], c[1], c[2], c[3]]))
            .collect();
        let nregs = self.regs.len();
        let mut next = self.clone();
        let mut it = words.into_iter();

        let mut field = || it.next();
        if let Some(v) = field() {
            next.pc = v;
        }
        if let Some(v) = field() {
            next.npc = v;
        }
        for i in 0..nregs {
            match field() {
                Some(v) => next.regs[i] = v,
                None => break,
            }
        }
        if let Some(v) = field() {
            let cwp = (v & Psr::CWP.bits()) as u8;
            if cwp >= next.cfg.nwindows {
                return Err(SnapshotError::BadCwp { cwp, nwindows: next.cfg.nwindows });
            }
            next.psr = Psr::from_bits_retain(v);
        }
        if let Some(v) = field() {
            next.wim = v;
        }
        if let Some(v) = field() {
            next.tbr = v;
        }
        if let Some(v) = field() {
            next.y = v;
        }
        if let Some(v) = field() {
            next.pending_trap = match v {
                0 => None,
                code => Some(
                    u8::try_from(code)
                        .ok()
                        .and_then(TrapType::from_code)
                        .ok_or(SnapshotError::UnknownTrap(code))?,
                ),
            };
        }
        if let Some(v) = field() {
            next.pending_annul = v != 0;
        }
        if let Some(v) = field() {
            next.branch_target = (v != NO_BRANCH).then_some(v);
        }

        next.regs[0] = 0;
        *self = next;
        Ok(())
    }

    /// Full dump in the layout [`Cpu::load_raw_dump`] reads.
    pub fn to_raw_dump(&self, endian: Endian) -> Vec<u8> {
        let mut words = Vec::with_capacity(self.record_len() / 4);
        words.push(self.pc);
        words.push(self.npc);
        words.extend_from_slice(&self.regs);
        words.extend([
            self.psr.bits(),
            self.wim,
            self.tbr,
            self.y,
            self.pending_trap.map_or(0, |tt| tt.code() as u32),
            self.pending_annul as u32,
            self.branch_target.unwrap_or(NO_BRANCH),
        ]);
        words.into_iter().flat_map(|w| endian.bytes(w)).collect()
    }
}
