use crate::cpu::{Cpu, Psr};
use crate::decoder::Decoded;
use crate::icc::{Cond, Icc};
use crate::isa::sparc_v8::Reg;
use crate::trap::TrapType;
use crate::window::Rotate;

use super::{effective_address, operand2};

/// Conditional branch. A taken branch queues its target for after the delay
/// slot. The annul bit skips the slot when the branch is not taken, and also
/// for an unconditional `ba,a`.
pub(crate) fn bicc(cpu: &mut Cpu, d: &Decoded) {
    let cond = Cond::from_field(d.cond);
    let taken = cond.holds(Icc::from_psr(cpu.psr));
    if taken {
        cpu.branch_target = Some(cpu.pc.wrapping_add(d.branch_offset()));
    }
    if d.a && (!taken || cond == Cond::Always) {
        cpu.pending_annul = true;
    }
}

pub(crate) fn call(cpu: &mut Cpu, d: &Decoded) {
    let pc = cpu.pc;
    cpu.set_reg(Reg::O7.index(), pc);
    cpu.branch_target = Some(pc.wrapping_add(d.call_offset()));
}

pub(crate) fn jmpl(cpu: &mut Cpu, d: &Decoded) {
    // rd may be one of the sources
    let target = effective_address(cpu, d);
    let pc = cpu.pc;
    cpu.set_reg(d.rd, pc);
    cpu.branch_target = Some(target);
}

/// Return from trap. Window underflow outranks the privilege check, which
/// outranks the illegal check for an `rett` issued with traps still enabled.
pub(crate) fn rett(cpu: &mut Cpu, d: &Decoded) {
    let next = cpu.next_cwp(Rotate::Forward);
    if cpu.window_invalid(next) {
        cpu.raise(TrapType::WindowUnderflow);
        return;
    }
    if !cpu.psr.contains(Psr::S) {
        cpu.raise(TrapType::PrivilegedInstruction);
        return;
    }
    if cpu.psr.contains(Psr::ET) {
        cpu.raise(TrapType::IllegalInstruction);
        return;
    }
    cpu.branch_target = Some(effective_address(cpu, d));
    let ps = cpu.psr.contains(Psr::PS);
    cpu.psr.set(Psr::S, ps);
    cpu.psr.insert(Psr::ET);
    cpu.set_cwp(next);
}

pub(crate) fn ticc(cpu: &mut Cpu, d: &Decoded) {
    if !Cond::from_field(d.cond).holds(Icc::from_psr(cpu.psr)) {
        return;
    }
    let n = cpu.get_reg(d.rs1).wrapping_add(operand2(cpu, d)) & 0x7f;
    cpu.raise(TrapType::Software(n as u8));
}
