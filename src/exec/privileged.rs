//! Reads and writes of PSR, WIM, TBR and Y. All of them require supervisor
//! mode. Writes store `rs1 ^ operand2`.

use crate::cpu::{Cpu, Psr};
use crate::decoder::Decoded;
use crate::isa::sparc_v8::*;
use crate::memory::Bus;
use crate::trap::TrapType;
use crate::window::window_mask;

use super::operand2;

/// Trap base address field of the TBR.
const TBR_BASE_MASK: u32 = 0xffff_f000;

fn supervisor(cpu: &mut Cpu) -> bool {
    if cpu.psr.contains(Psr::S) {
        return true;
    }
    cpu.raise(TrapType::PrivilegedInstruction);
    false
}

pub(crate) fn read<B: Bus>(cpu: &mut Cpu, bus: &mut B, d: &Decoded) {
    // only %y among the ancillary state registers
    if d.op3 == OP3_RDASR && d.rs1 != 0 {
        bus.report_unimplemented(cpu, d);
    }
    if !supervisor(cpu) {
        return;
    }
    let v = match d.op3 {
        OP3_RDASR => cpu.y,
        OP3_RDPSR => cpu.psr.bits(),
        OP3_RDWIM => cpu.wim,
        _ => cpu.tbr,
    };
    cpu.set_reg(d.rd, v);
}

pub(crate) fn write<B: Bus>(cpu: &mut Cpu, bus: &mut B, d: &Decoded) {
    if d.op3 == OP3_WRASR && d.rd != 0 {
        bus.report_unimplemented(cpu, d);
    }
    if !supervisor(cpu) {
        return;
    }
    let v = cpu.get_reg(d.rs1) ^ operand2(cpu, d);
    match d.op3 {
        OP3_WRASR => cpu.y = v,
        OP3_WRPSR => {
            if (v & Psr::CWP.bits()) as u8 >= cpu.cfg.nwindows {
                cpu.raise(TrapType::IllegalInstruction);
                return;
            }
            cpu.psr = Psr::from_bits_retain(v);
        }
        OP3_WRWIM => cpu.wim = v & window_mask(cpu.cfg.nwindows),
        _ => cpu.tbr = (v & TBR_BASE_MASK) | (cpu.tbr & !TBR_BASE_MASK),
    }
}
