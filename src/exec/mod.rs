//! Instruction dispatch.
//!
//! Keyed on the format field, then op2 or op3. Every combination that is not
//! matched below ends in [`Bus::report_unimplemented`].

mod alu;
mod branch;
mod mem;
mod muldiv;
mod privileged;

use crate::cpu::Cpu;
use crate::decoder::Decoded;
use crate::isa::sparc_v8::*;
use crate::memory::Bus;
use crate::window::{save_restore, Rotate};

pub use alu::{add, sub};

pub trait Executor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: &Decoded);
}

/// The integer unit. Traps are left pending on the CPU, never returned.
pub struct IntExecutor;

impl Executor for IntExecutor {
    fn exec<B: Bus>(&self, cpu: &mut Cpu, bus: &mut B, d: &Decoded) {
        match d.op {
            OP_FORMAT_2 => match d.op2 {
                OP2_NOP => {}
                OP2_BICC => branch::bicc(cpu, d),
                OP2_SETHI => cpu.set_reg(d.rd, d.imm22 << 10),
                _ => bus.report_unimplemented(cpu, d),
            },
            OP_CALL => branch::call(cpu, d),
            OP_FORMAT_3_ALU => exec_alu(cpu, bus, d),
            OP_FORMAT_3_MEM => mem::exec(cpu, bus, d),
            _ => unreachable!("op is a two-bit field"),
        }
    }
}

fn exec_alu<B: Bus>(cpu: &mut Cpu, bus: &mut B, d: &Decoded) {
    match d.op3 {
        OP3_ADD | OP3_AND | OP3_OR | OP3_XOR | OP3_SUB | OP3_ANDN | OP3_ORN | OP3_ADDCC
        | OP3_ANDCC | OP3_ORCC | OP3_XORCC | OP3_SUBCC => alu::exec(cpu, d),
        OP3_SLL | OP3_SRL | OP3_SRA => alu::shift(cpu, d),
        OP3_UMUL | OP3_SMUL | OP3_UMULCC | OP3_SMULCC => muldiv::mul(cpu, d),
        OP3_UDIV | OP3_SDIV | OP3_UDIVCC | OP3_SDIVCC => muldiv::div(cpu, d),
        OP3_MULSCC => muldiv::mulscc(cpu, d),
        OP3_RDASR | OP3_RDPSR | OP3_RDWIM | OP3_RDTBR => privileged::read(cpu, bus, d),
        OP3_WRASR | OP3_WRPSR | OP3_WRWIM | OP3_WRTBR => privileged::write(cpu, bus, d),
        OP3_JMPL => branch::jmpl(cpu, d),
        OP3_RETT => branch::rett(cpu, d),
        OP3_TICC => branch::ticc(cpu, d),
        OP3_SAVE => save_restore(cpu, d, Rotate::Backward),
        OP3_RESTORE => save_restore(cpu, d, Rotate::Forward),
        _ => bus.report_unimplemented(cpu, d),
    }
}

/// Second source operand: `rs2` or the sign-extended 13-bit immediate.
pub(crate) fn operand2(cpu: &Cpu, d: &Decoded) -> u32 {
    if d.i {
        d.simm13 as u32
    } else {
        cpu.get_reg(d.rs2)
    }
}

/// `rs1 + operand2`, the effective address of memory ops and jumps.
pub(crate) fn effective_address(cpu: &Cpu, d: &Decoded) -> u32 {
    cpu.get_reg(d.rs1).wrapping_add(operand2(cpu, d))
}

/// True for the op3 values whose flags reach the PSR.
pub(crate) fn sets_icc(op3: u8) -> bool {
    (0x10..0x20).contains(&op3)
}
