use crate::cpu::Cpu;
use crate::decoder::Decoded;
use crate::icc::Icc;
use crate::isa::sparc_v8::*;

use super::{operand2, sets_icc};

/// Addition leaves V and C false. Only subtraction computes them.
pub fn add(a: u32, b: u32) -> (u32, Icc) {
    let res = a.wrapping_add(b);
    (res, Icc::stage(res, false, false))
}

/// Overflow compares the widened difference with its own 32-bit sign
/// extension; carry is the borrow out of bit 31.
pub fn sub(a: u32, b: u32) -> (u32, Icc) {
    let wide = (a as i32 as i64) - (b as i32 as i64);
    let res = wide as u32;
    let overflow = wide != res as i32 as i64;
    let borrowed = ((a as u64) | (1 << 32)).wrapping_sub(b as u64);
    let carry = borrowed & (1 << 32) == 0;
    (res, Icc::stage(res, overflow, carry))
}

fn logical(res: u32) -> (u32, Icc) {
    (res, Icc::stage(res, false, false))
}

pub(crate) fn exec(cpu: &mut Cpu, d: &Decoded) {
    let a = cpu.get_reg(d.rs1);
    let b = operand2(cpu, d);
    let (res, icc) = match d.op3 & 0xf {
        OP3_ADD => add(a, b),
        OP3_AND => logical(a & b),
        OP3_OR => logical(a | b),
        OP3_XOR => logical(a ^ b),
        OP3_SUB => sub(a, b),
        OP3_ANDN => logical(a & !b),
        OP3_ORN => logical(a | !b),
        _ => unreachable!("dispatch only routes arithmetic and logical op3 here"),
    };
    cpu.set_reg(d.rd, res);
    if sets_icc(d.op3) {
        icc.commit(&mut cpu.psr);
    }
}

pub(crate) fn shift(cpu: &mut Cpu, d: &Decoded) {
    let a = cpu.get_reg(d.rs1);
    let cnt = operand2(cpu, d) & 0x1f;
    let res = match d.op3 {
        OP3_SLL => a << cnt,
        OP3_SRL => a >> cnt,
        _ => ((a as i32) >> cnt) as u32,
    };
    cpu.set_reg(d.rd, res);
}
