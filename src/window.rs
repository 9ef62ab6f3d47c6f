//! Register file and window management.
//!
//! Logical registers 0..8 are the globals. 8..32 are the outs, locals and
//! ins of the current window, found at `reg + 16 * CWP` in the flat file and
//! wrapped back past the globals, so that window `w`'s ins are window
//! `w + 1`'s outs and the last window's ins are window 0's outs.

use crate::cpu::{Cpu, Psr};
use crate::decoder::Decoded;
use crate::exec::operand2;
use crate::trap::TrapType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotate {
    /// Towards higher window numbers (restore, rett).
    Forward,
    /// Towards lower window numbers (save, trap entry).
    Backward,
}

impl Cpu {
    pub fn cwp(&self) -> u8 {
        (self.psr.bits() & Psr::CWP.bits()) as u8
    }

    pub fn set_cwp(&mut self, cwp: u8) {
        debug_assert!(cwp < self.cfg.nwindows, "cwp {cwp} out of range");
        let bits = (self.psr.bits() & !Psr::CWP.bits()) | (cwp as u32 & Psr::CWP.bits());
        self.psr = Psr::from_bits_retain(bits);
    }

    /// Physical index of logical register `n` under the current window.
    pub fn phys_index(&self, n: u8) -> usize {
        let n = (n & 0x1f) as usize;
        if n < 8 {
            return n;
        }
        let total = self.regs.len();
        let idx = n + 16 * self.cwp() as usize;
        if idx >= total {
            idx % total + 8
        } else {
            idx
        }
    }

    pub fn get_reg(&self, n: u8) -> u32 {
        if n & 0x1f == 0 {
            return 0;
        }
        self.regs[self.phys_index(n)]
    }

    /// Writes to `%g0` are dropped.
    pub fn set_reg(&mut self, n: u8, value: u32) {
        if n & 0x1f == 0 {
            return;
        }
        let idx = self.phys_index(n);
        self.regs[idx] = value;
    }

    pub fn next_cwp(&self, dir: Rotate) -> u8 {
        let n = self.cfg.nwindows as u32;
        let cwp = self.cwp() as u32;
        let next = match dir {
            Rotate::Forward => (cwp + n + 1) % n,
            Rotate::Backward => (cwp + n - 1) % n,
        };
        next as u8
    }

    /// Moves CWP one window without consulting the WIM.
    pub fn rotate_window(&mut self, dir: Rotate) {
        let next = self.next_cwp(dir);
        self.set_cwp(next);
    }

    pub fn increment_cwp(&mut self) {
        self.rotate_window(Rotate::Forward);
    }

    pub fn decrement_cwp(&mut self) {
        self.rotate_window(Rotate::Backward);
    }

    pub fn window_invalid(&self, window: u8) -> bool {
        window < 32 && self.wim & (1u32 << window) != 0
    }
}

/// Mask covering one WIM bit per implemented window.
pub fn window_mask(nwindows: u8) -> u32 {
    if nwindows >= 32 {
        u32::MAX
    } else {
        (1u32 << nwindows) - 1
    }
}

/// `save` and `restore`: the sum is formed from the old window's sources
/// and written to rd in the new window. If the new window is invalid the
/// instruction traps and performs no part of its work.
pub(crate) fn save_restore(cpu: &mut Cpu, d: &Decoded, dir: Rotate) {
    let next = cpu.next_cwp(dir);
    if cpu.window_invalid(next) {
        cpu.raise(match dir {
            Rotate::Backward => TrapType::WindowOverflow,
            Rotate::Forward => TrapType::WindowUnderflow,
        });
        return;
    }
    let sum = cpu.get_reg(d.rs1).wrapping_add(operand2(cpu, d));
    cpu.set_cwp(next);
    cpu.set_reg(d.rd, sum);
}
