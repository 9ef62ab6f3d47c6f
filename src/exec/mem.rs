//! Loads and stores.
//!
//! The bus only sees aligned words. Byte and halfword accesses read the
//! containing word and pick or replace a lane, so sub-word stores are
//! read-modify-write. A failed access raises data_access_exception; whatever
//! the instruction already did before the failure stays done.

use crate::cpu::Cpu;
use crate::decoder::Decoded;
use crate::isa::sparc_v8::*;
use crate::memory::Bus;
use crate::trap::TrapType;

use super::effective_address;

/// Bit offset of the byte at `addr` within its big-endian word.
pub fn byte_shift(addr: u32) -> u32 {
    (3 - (addr & 3)) * 8
}

/// Bit offset of the halfword at `addr`: the upper half at offset 0, the
/// lower half otherwise.
pub fn half_shift(addr: u32) -> u32 {
    if addr & 3 == 0 {
        16
    } else {
        0
    }
}

fn is_load(op3: u8) -> bool {
    matches!(
        op3,
        OP3_LD | OP3_LDUB | OP3_LDUH | OP3_LDD | OP3_LDSB | OP3_LDSH | OP3_LDSTUB
    )
}

pub(crate) fn exec<B: Bus>(cpu: &mut Cpu, bus: &mut B, d: &Decoded) {
    // lda and friends
    if !d.i && d.asi != 0 && is_load(d.op3) {
        bus.report_unimplemented(cpu, d);
    }
    let addr = effective_address(cpu, d);
    match d.op3 {
        OP3_LD => {
            if let Some(w) = load_word(cpu, bus, addr) {
                cpu.set_reg(d.rd, w);
            }
        }
        OP3_LDUB | OP3_LDSB => {
            if let Some(w) = load_word(cpu, bus, addr & !3) {
                let byte = (w >> byte_shift(addr)) as u8;
                let v = if d.op3 == OP3_LDSB { byte as i8 as i32 as u32 } else { byte as u32 };
                cpu.set_reg(d.rd, v);
            }
        }
        OP3_LDUH | OP3_LDSH => {
            if let Some(w) = load_word(cpu, bus, addr & !3) {
                let half = (w >> half_shift(addr)) as u16;
                let v = if d.op3 == OP3_LDSH { half as i16 as i32 as u32 } else { half as u32 };
                cpu.set_reg(d.rd, v);
            }
        }
        OP3_LDD => {
            let rd = d.rd & !1;
            let Some(hi) = load_word(cpu, bus, addr) else {
                return;
            };
            cpu.set_reg(rd, hi);
            if let Some(lo) = load_word(cpu, bus, addr.wrapping_add(4)) {
                cpu.set_reg(rd + 1, lo);
            }
        }
        OP3_ST => {
            let v = cpu.get_reg(d.rd);
            store_word(cpu, bus, addr, v);
        }
        OP3_STB => {
            let v = cpu.get_reg(d.rd) & 0xff;
            store_lane(cpu, bus, addr, v, 0xff, byte_shift(addr));
        }
        OP3_STH => {
            let v = cpu.get_reg(d.rd) & 0xffff;
            store_lane(cpu, bus, addr, v, 0xffff, half_shift(addr));
        }
        OP3_STD => {
            let rd = d.rd & !1;
            let (hi, lo) = (cpu.get_reg(rd), cpu.get_reg(rd + 1));
            if store_word(cpu, bus, addr, hi) {
                store_word(cpu, bus, addr.wrapping_add(4), lo);
            }
        }
        OP3_LDSTUB => {
            let shift = byte_shift(addr);
            let Some(w) = load_word(cpu, bus, addr & !3) else {
                return;
            };
            cpu.set_reg(d.rd, (w >> shift) & 0xff);
            store_word(cpu, bus, addr & !3, w | (0xff << shift));
        }
        _ => bus.report_unimplemented(cpu, d),
    }
}

fn load_word<B: Bus>(cpu: &mut Cpu, bus: &mut B, addr: u32) -> Option<u32> {
    if addr & 3 != 0 {
        tracing::debug!(addr, "misaligned load");
        cpu.raise(TrapType::DataAccessException);
        return None;
    }
    match bus.read_u32(addr) {
        Ok(w) => Some(w),
        Err(e) => {
            tracing::debug!(addr, "load failed: {e:#}");
            cpu.raise(TrapType::DataAccessException);
            None
        }
    }
}

fn store_word<B: Bus>(cpu: &mut Cpu, bus: &mut B, addr: u32, val: u32) -> bool {
    if addr & 3 != 0 {
        tracing::debug!(addr, "misaligned store");
        cpu.raise(TrapType::DataAccessException);
        return false;
    }
    match bus.write_u32(addr, val) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(addr, "store failed: {e:#}");
            cpu.raise(TrapType::DataAccessException);
            false
        }
    }
}

/// Replaces one lane of the word containing `addr`. Nothing is written if
/// the read fails.
fn store_lane<B: Bus>(cpu: &mut Cpu, bus: &mut B, addr: u32, val: u32, mask: u32, shift: u32) {
    let aligned = addr & !3;
    if let Some(w) = load_word(cpu, bus, aligned) {
        let merged = (w & !(mask << shift)) | (val << shift);
        store_word(cpu, bus, aligned, merged);
    }
}
