#![allow(dead_code)]

use sparc_sim::isa::sparc_v8::*;
use sparc_sim::{Bus, Cpu, CpuConfig, LinearMemory, Reg};

pub const NOP: u32 = 0x0100_0000;

fn r(reg: Reg) -> u32 {
    reg.index() as u32
}

/// Format 3, register second operand.
pub fn enc_rr(op: u8, op3: u8, rd: Reg, rs1: Reg, rs2: Reg) -> u32 {
    ((op as u32) << 30) | (r(rd) << 25) | ((op3 as u32) << 19) | (r(rs1) << 14) | r(rs2)
}

/// Format 3, immediate second operand.
pub fn enc_ri(op: u8, op3: u8, rd: Reg, rs1: Reg, simm13: i32) -> u32 {
    ((op as u32) << 30)
        | (r(rd) << 25)
        | ((op3 as u32) << 19)
        | (r(rs1) << 14)
        | (1 << 13)
        | (simm13 as u32 & 0x1fff)
}

pub fn alu_rr(op3: u8, rd: Reg, rs1: Reg, rs2: Reg) -> u32 {
    enc_rr(OP_FORMAT_3_ALU, op3, rd, rs1, rs2)
}

pub fn alu_ri(op3: u8, rd: Reg, rs1: Reg, simm13: i32) -> u32 {
    enc_ri(OP_FORMAT_3_ALU, op3, rd, rs1, simm13)
}

pub fn mem_ri(op3: u8, rd: Reg, rs1: Reg, simm13: i32) -> u32 {
    enc_ri(OP_FORMAT_3_MEM, op3, rd, rs1, simm13)
}

pub fn mem_rr(op3: u8, rd: Reg, rs1: Reg, rs2: Reg) -> u32 {
    enc_rr(OP_FORMAT_3_MEM, op3, rd, rs1, rs2)
}

/// Bicc with a displacement in words.
pub fn bicc(cond: u8, annul: bool, disp: i32) -> u32 {
    ((annul as u32) << 29)
        | ((cond as u32 & 0xf) << 25)
        | ((OP2_BICC as u32) << 22)
        | (disp as u32 & 0x3f_ffff)
}

pub fn call(disp: i32) -> u32 {
    (1 << 30) | (disp as u32 & 0x3fff_ffff)
}

pub fn sethi(rd: Reg, value: u32) -> u32 {
    (r(rd) << 25) | ((OP2_SETHI as u32) << 22) | (value >> 10)
}

pub fn ticc(cond: u8, rs1: Reg, imm: i32) -> u32 {
    alu_ri(OP3_TICC, Reg::from_field(cond & 0xf), rs1, imm)
}

pub const COND_A: u8 = 0x8;
pub const COND_N: u8 = 0x0;
pub const COND_E: u8 = 0x1;
pub const COND_NE: u8 = 0x9;
pub const COND_LE: u8 = 0x2;
pub const COND_G: u8 = 0xa;
pub const COND_CC: u8 = 0xd;

pub fn load(mem: &mut LinearMemory, at: u32, words: &[u32]) {
    for (i, w) in words.iter().enumerate() {
        mem.write_u32(at + 4 * i as u32, *w).unwrap();
    }
}

/// Default CPU at pc 0 over a zeroed 4 KiB memory holding `program`.
pub fn setup(program: &[u32]) -> (Cpu, LinearMemory) {
    setup_with(CpuConfig::default(), program)
}

pub fn setup_with(cfg: CpuConfig, program: &[u32]) -> (Cpu, LinearMemory) {
    setup_in(4096, cfg, program)
}

pub fn setup_in(size: usize, cfg: CpuConfig, program: &[u32]) -> (Cpu, LinearMemory) {
    let mut mem = LinearMemory::new(size);
    load(&mut mem, 0, program);
    let cpu = Cpu::new(cfg).unwrap();
    (cpu, mem)
}

pub fn reg(cpu: &Cpu, reg: Reg) -> u32 {
    cpu.get_reg(reg.index())
}

pub fn set(cpu: &mut Cpu, reg: Reg, v: u32) {
    cpu.set_reg(reg.index(), v)
}
