//! Multiply, divide and multiply-step. All of them go through `Y`.

use crate::cpu::Cpu;
use crate::decoder::Decoded;
use crate::icc::Icc;
use crate::isa::sparc_v8::*;
use crate::trap::TrapType;

use super::{operand2, sets_icc};

pub fn umul(a: u32, b: u32) -> u64 {
    a as u64 * b as u64
}

pub fn smul(a: u32, b: u32) -> u64 {
    (a as i32 as i64 * b as i32 as i64) as u64
}

/// Quotient of `y:a / b`, clamped to 32 bits. The flag reports the clamp.
/// `None` for a zero divisor.
pub fn udiv(y: u32, a: u32, b: u32) -> Option<(u32, bool)> {
    if b == 0 {
        return None;
    }
    let dividend = ((y as u64) << 32) | a as u64;
    let q = dividend / b as u64;
    Some(match u32::try_from(q) {
        Ok(q) => (q, false),
        Err(_) => (u32::MAX, true),
    })
}

pub fn sdiv(y: u32, a: u32, b: u32) -> Option<(u32, bool)> {
    if b == 0 {
        return None;
    }
    let dividend = (((y as u64) << 32) | a as u64) as i64;
    let Some(q) = dividend.checked_div(b as i32 as i64) else {
        // i64::MIN / -1, far above any 32-bit quotient
        return Some((i32::MAX as u32, true));
    };
    Some(match i32::try_from(q) {
        Ok(q) => (q as u32, false),
        Err(_) if q > 0 => (i32::MAX as u32, true),
        Err(_) => (i32::MIN as u32, true),
    })
}

pub(crate) fn mul(cpu: &mut Cpu, d: &Decoded) {
    let a = cpu.get_reg(d.rs1);
    let b = operand2(cpu, d);
    let product = match d.op3 {
        OP3_UMUL | OP3_UMULCC => umul(a, b),
        _ => smul(a, b),
    };
    let lo = product as u32;
    cpu.y = (product >> 32) as u32;
    cpu.set_reg(d.rd, lo);
    if sets_icc(d.op3) {
        Icc::stage(lo, false, false).commit(&mut cpu.psr);
    }
}

pub(crate) fn div(cpu: &mut Cpu, d: &Decoded) {
    let a = cpu.get_reg(d.rs1);
    let b = operand2(cpu, d);
    let quotient = match d.op3 {
        OP3_UDIV | OP3_UDIVCC => udiv(cpu.y, a, b),
        _ => sdiv(cpu.y, a, b),
    };
    let Some((q, overflow)) = quotient else {
        cpu.raise(TrapType::DivisionByZero);
        return;
    };
    cpu.set_reg(d.rd, q);
    if sets_icc(d.op3) {
        Icc::stage(q, overflow, false).commit(&mut cpu.psr);
    }
}

/// One step of a shift-and-add multiply. The multiplier is consumed from
/// `Y` bit 0 while `rs1`'s low bit is shifted into the top of `Y`.
pub(crate) fn mulscc(cpu: &mut Cpu, d: &Decoded) {
    let a = cpu.get_reg(d.rs1);
    let addend = if cpu.y & 1 != 0 { operand2(cpu, d) } else { 0 };
    let icc = Icc::from_psr(cpu.psr);
    let shifted = (a >> 1) | (((icc.n ^ icc.v) as u32) << 31);
    let (res, carry) = shifted.overflowing_add(addend);
    Icc::stage(res, carry, false).commit(&mut cpu.psr);
    cpu.y = (cpu.y >> 1) | (a << 31);
    cpu.set_reg(d.rd, res);
}
