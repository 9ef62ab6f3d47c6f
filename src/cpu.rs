use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::decoder::decode;
use crate::disasm::fmt_decoded;
use crate::error::ConfigError;
use crate::exec::{Executor, IntExecutor};
use crate::memory::{Bus, Endian};
use crate::trap::{Trap, TrapType};

/// The CWP field is five bits wide and the WIM one word, so 32 is the ceiling.
pub const MAX_WINDOWS: u8 = 32;

/// How a pending trap is delivered by [`Cpu::enter_trap`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrapMode {
    /// Jump to the handler at `TBR & !0xf`, leaving the trap window active.
    #[default]
    Vectored,
    /// Service window overflow/underflow with the built-in spill/fill routine
    /// and resume; anything else is handed back to the caller.
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CpuConfig {
    pub nwindows: u8,
    pub trap_mode: TrapMode,
    pub endian: Endian, // byte order of raw images and state dumps
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            nwindows: 8,
            trap_mode: TrapMode::Vectored,
            endian: Endian::Big,
        }
    }
}

impl CpuConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(2..=MAX_WINDOWS).contains(&self.nwindows) {
            return Err(ConfigError::WindowCount(self.nwindows));
        }
        Ok(())
    }

    /// Globals plus sixteen registers per window.
    pub fn num_regs(&self) -> usize {
        8 + 16 * self.nwindows as usize
    }
}

bitflags! {
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Psr: u32 {
const N = 1 << 23; // Negative
const Z = 1 << 22; // Zero
const V = 1 << 21; // Overflow
const C = 1 << 20; // Carry
const S = 1 << 7;  // Supervisor
const PS = 1 << 6; // Previous supervisor
const ET = 1 << 5; // Enable traps
const CWP = 0x1f;  // Current window pointer field
}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cpu {
    pub pc: u32,
    pub npc: u32,
    pub regs: Vec<u32>, // globals, then nwindows * 16 windowed registers
    pub psr: Psr,
    pub wim: u32,
    pub tbr: u32,
    pub y: u32,
    pub pending_trap: Option<TrapType>,
    pub pending_annul: bool,
    pub branch_target: Option<u32>, // delayed transfer queued by this step
    pub cfg: CpuConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    /// The stop predicate fired.
    Stopped { steps: u64 },
    /// The step budget ran out first.
    StepLimit { steps: u64 },
}

impl Default for Cpu {
    fn default() -> Self {
        let cfg = CpuConfig::default();
        let mut cpu = Self::blank(cfg);
        cpu.reset(0);
        cpu
    }
}

impl Cpu {
    pub fn new(cfg: CpuConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let mut cpu = Self::blank(cfg);
        cpu.reset(0);
        Ok(cpu)
    }

    fn blank(cfg: CpuConfig) -> Self {
        Self {
            pc: 0,
            npc: 4,
            regs: vec![0; cfg.num_regs()],
            psr: Psr::empty(),
            wim: 0,
            tbr: 0,
            y: 0,
            pending_trap: None,
            pending_annul: false,
            branch_target: None,
            cfg,
        }
    }

    /// Supervisor mode with traps enabled, window 0 current and window 1
    /// marked invalid. The host seeds `%sp` and any argument registers after.
    pub fn reset(&mut self, reset_pc: u32) {
        self.pc = reset_pc;
        self.npc = reset_pc.wrapping_add(4);
        self.regs.iter_mut().for_each(|r| *r = 0);
        self.psr = Psr::S | Psr::ET;
        self.wim = 1 << 1;
        self.tbr = 0;
        self.y = 0;
        self.pending_trap = None;
        self.pending_annul = false;
        self.branch_target = None;
    }

    pub(crate) fn trap_report(&self, tt: TrapType) -> Trap {
        Trap {
            tt,
            pc: self.pc,
            npc: self.npc,
        }
    }

    /// Executes one instruction. An `Err` means a trap is pending and the
    /// pc/npc pair still points at the trapping instruction; the driver must
    /// deliver it (see [`Cpu::enter_trap`]) before stepping again.
    pub fn step<B: Bus>(&mut self, bus: &mut B) -> Result<(), Trap> {
        self.step_with(bus, &IntExecutor)
    }

    pub fn step_with<B: Bus, X: Executor>(&mut self, bus: &mut B, exec: &X) -> Result<(), Trap> {
        let raw = self.fetch(bus);
        let d = decode(raw);
        if let Some(tt) = self.pending_trap {
            return Err(self.trap_report(tt));
        }

        self.regs[0] = 0;
        // An annulled slot is skipped whole, even if it would have trapped.
        if self.pending_annul {
            self.pending_annul = false;
            tracing::trace!(pc = self.pc, "annulled: {}", fmt_decoded(&d));
        } else {
            tracing::trace!(pc = self.pc, "{}", fmt_decoded(&d));
            exec.exec(self, bus, &d);
        }
        self.regs[0] = 0;

        if let Some(tt) = self.pending_trap {
            return Err(self.trap_report(tt));
        }

        self.pc = self.npc;
        self.npc = match self.branch_target.take() {
            Some(target) => target,
            None => self.npc.wrapping_add(4),
        };
        Ok(())
    }

    fn fetch<B: Bus>(&mut self, bus: &mut B) -> u32 {
        let pc = self.pc;
        if pc & 0x3 != 0 {
            tracing::debug!(pc, "misaligned instruction fetch");
            self.raise(TrapType::InstructionAccessException);
            return 0;
        }
        match bus.read_u32(pc) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!(pc, "instruction fetch failed: {e:#}");
                self.raise(TrapType::InstructionAccessException);
                0
            }
        }
    }

    /// Steps until `stop` says so or `max_steps` instructions have been
    /// attempted, delivering traps along the way. A trap the configured mode
    /// cannot deliver ends the run with that trap.
    pub fn run<B: Bus>(
        &mut self,
        bus: &mut B,
        max_steps: u64,
        mut stop: impl FnMut(&B) -> bool,
    ) -> Result<RunExit, Trap> {
        let mut steps = 0u64;
        while steps < max_steps {
            if stop(bus) {
                return Ok(RunExit::Stopped { steps });
            }
            if let Err(trap) = self.step(bus) {
                self.enter_trap(bus)?;
                tracing::debug!(steps, "delivered {trap}");
            }
            steps += 1;
        }
        if stop(bus) {
            Ok(RunExit::Stopped { steps })
        } else {
            Ok(RunExit::StepLimit { steps })
        }
    }
}
