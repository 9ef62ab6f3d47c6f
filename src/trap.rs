//! Trap types and delivery.
//!
//! Dispatch only ever marks a trap pending. Delivery happens afterwards, when
//! the driver calls [`Cpu::enter_trap`]: either through the vector table at
//! TBR or, in [`TrapMode::Internal`], through a built-in window spill/fill
//! routine after which the trapping instruction is simply retried.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cpu::{Cpu, Psr, TrapMode};
use crate::isa::sparc_v8::Reg;
use crate::memory::Bus;
use crate::window::window_mask;

/// tt field of the TBR, bits 11:4.
pub const TBR_TT_MASK: u32 = 0xff0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrapType {
    IllegalInstruction,
    PrivilegedInstruction,
    WindowOverflow,
    WindowUnderflow,
    DataAccessException,
    InstructionAccessException,
    DivisionByZero,
    /// `ticc`, carrying the low seven bits of the software trap number.
    Software(u8),
}

impl TrapType {
    pub fn code(self) -> u8 {
        match self {
            TrapType::IllegalInstruction => 0x02,
            TrapType::PrivilegedInstruction => 0x03,
            TrapType::WindowOverflow => 0x05,
            TrapType::WindowUnderflow => 0x06,
            TrapType::DataAccessException => 0x09,
            TrapType::InstructionAccessException => 0x21,
            TrapType::DivisionByZero => 0x2a,
            TrapType::Software(n) => 0x80 | (n & 0x7f),
        }
    }

    pub fn from_code(code: u8) -> Option<TrapType> {
        Some(match code {
            0x02 => TrapType::IllegalInstruction,
            0x03 => TrapType::PrivilegedInstruction,
            0x05 => TrapType::WindowOverflow,
            0x06 => TrapType::WindowUnderflow,
            0x09 => TrapType::DataAccessException,
            0x21 => TrapType::InstructionAccessException,
            0x2a => TrapType::DivisionByZero,
            c if c & 0x80 != 0 => TrapType::Software(c & 0x7f),
            _ => return None,
        })
    }
}

impl fmt::Display for TrapType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrapType::IllegalInstruction => "illegal_instruction",
            TrapType::PrivilegedInstruction => "privileged_instruction",
            TrapType::WindowOverflow => "window_overflow",
            TrapType::WindowUnderflow => "window_underflow",
            TrapType::DataAccessException => "data_access_exception",
            TrapType::InstructionAccessException => "instruction_access_exception",
            TrapType::DivisionByZero => "division_by_zero",
            TrapType::Software(_) => "trap_instruction",
        };
        write!(f, "{name} (tt={:#04x})", self.code())
    }
}

/// A trap left pending by [`Cpu::step`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{tt} at pc {pc:#010x} (npc {npc:#010x})")]
pub struct Trap {
    pub tt: TrapType,
    pub pc: u32,
    pub npc: u32,
}

enum WindowRoutine {
    Spill,
    Fill,
}

impl Cpu {
    /// Marks a trap pending. Dispatch checks for it once the instruction is done.
    pub fn raise(&mut self, tt: TrapType) {
        tracing::debug!(pc = self.pc, "raise {tt}");
        self.pending_trap = Some(tt);
    }

    /// Delivers the pending trap, if any.
    ///
    /// Saves S into PS, enters supervisor mode with traps disabled, moves to
    /// the next lower window without a WIM check, stores pc/npc in `%l1`/`%l2`
    /// and records tt in the TBR. Vectored mode then jumps to the handler.
    /// Internal mode runs the spill/fill routine and returns to the trapping
    /// window so the instruction is retried, leaving S set and ET clear.
    /// Traps it has no routine for come back as `Err` with the CPU untouched.
    pub fn enter_trap<B: Bus>(&mut self, bus: &mut B) -> Result<(), Trap> {
        let Some(tt) = self.pending_trap else {
            return Ok(());
        };
        let routine = match (self.cfg.trap_mode, tt) {
            (TrapMode::Vectored, _) => None,
            (TrapMode::Internal, TrapType::WindowOverflow) => Some(WindowRoutine::Spill),
            (TrapMode::Internal, TrapType::WindowUnderflow) => Some(WindowRoutine::Fill),
            (TrapMode::Internal, _) => return Err(self.trap_report(tt)),
        };
        tracing::debug!(pc = self.pc, npc = self.npc, cwp = self.cwp(), "enter {tt}");

        let supervisor = self.psr.contains(Psr::S);
        self.psr.set(Psr::PS, supervisor);
        self.psr.insert(Psr::S);
        self.decrement_cwp();
        self.psr.remove(Psr::ET);

        let (pc, npc) = (self.pc, self.npc);
        self.set_reg(Reg::L1.index(), pc);
        self.set_reg(Reg::L2.index(), npc);
        self.tbr = (self.tbr & !TBR_TT_MASK) | ((tt.code() as u32) << 4);

        match routine {
            Some(routine) => {
                match routine {
                    WindowRoutine::Spill => self.spill_window(bus),
                    WindowRoutine::Fill => self.fill_window(bus),
                }
                // back to the trapping window; S and ET keep their trap-entry values
                self.increment_cwp();
            }
            None => {
                let handler = self.tbr & !0xf;
                self.pc = handler;
                self.npc = handler.wrapping_add(4);
            }
        }

        self.pending_trap = None;
        Ok(())
    }

    /// Entered in the trap window. Saves the window below it to that window's
    /// stack and makes it the new invalid window.
    fn spill_window<B: Bus>(&mut self, bus: &mut B) {
        let n = self.cfg.nwindows;
        let mut new_wim = (self.wim & window_mask(n)) >> 1;
        if new_wim == 0 {
            new_wim = 1 << (n - 1);
        }
        self.wim = 0;

        self.decrement_cwp();
        let sp = self.get_reg(Reg::SP.index());
        if sp != 0 {
            for (k, r) in Reg::SAVE_AREA.iter().enumerate() {
                let addr = sp.wrapping_add(4 * k as u32);
                let val = self.get_reg(r.index());
                if let Err(e) = bus.write_u32(addr, val) {
                    tracing::warn!(addr, cwp = self.cwp(), "window spill store failed: {e:#}");
                }
            }
        }
        self.increment_cwp();

        self.wim = new_wim;
    }

    /// Entered in the trap window. Reloads the window two above it from its
    /// stack and moves the invalid mark one window further up.
    fn fill_window<B: Bus>(&mut self, bus: &mut B) {
        let n = self.cfg.nwindows;
        let mask = window_mask(n);
        let mut new_wim = ((self.wim & mask) << 1) & mask;
        if new_wim == 0 {
            new_wim = 1;
        }
        self.wim = 0;

        self.increment_cwp();
        self.increment_cwp();
        let sp = self.get_reg(Reg::SP.index());
        if sp == 0 {
            tracing::warn!(cwp = self.cwp(), "window fill with null stack pointer, skipped");
        } else {
            for (k, r) in Reg::SAVE_AREA.iter().enumerate() {
                let addr = sp.wrapping_add(4 * k as u32);
                match bus.read_u32(addr) {
                    Ok(val) => self.set_reg(r.index(), val),
                    Err(e) => {
                        tracing::warn!(addr, cwp = self.cwp(), "window fill load failed: {e:#}")
                    }
                }
            }
        }
        self.decrement_cwp();
        self.decrement_cwp();

        self.wim = new_wim;
    }
}
