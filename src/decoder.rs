use serde::{Deserialize, Serialize};

/// Control signals extracted from one instruction word.
///
/// Every field any format might need is filled in regardless of which format
/// the word actually uses; dispatch picks the ones that apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decoded {
    pub raw: u32,
    pub op: u8,
    pub a: bool, // annul
    pub rd: u8,
    pub cond: u8,
    pub op2: u8,
    pub op3: u8,
    pub rs1: u8,
    pub i: bool, // immediate operand
    pub asi: u8,
    pub rs2: u8,
    pub simm13: i32,
    pub imm22: u32,
    pub imm7: u32,
    pub disp22: u32,
    pub disp30: u32,
}

#[inline]
pub fn sign_ext(v: u32, bits: u32) -> u32 {
    let s = 32 - bits;
    ((v << s) as i32 >> s) as u32
}

/// Splits a raw word into its fields. Never fails: undefined field
/// combinations are left for dispatch to reject.
pub fn decode(raw: u32) -> Decoded {
    Decoded {
        raw,
        op: ((raw >> 30) & 0x3) as u8,
        a: (raw >> 29) & 0x1 != 0,
        rd: ((raw >> 25) & 0x1f) as u8,
        cond: ((raw >> 25) & 0xf) as u8,
        op2: ((raw >> 22) & 0x7) as u8,
        op3: ((raw >> 19) & 0x3f) as u8,
        rs1: ((raw >> 14) & 0x1f) as u8,
        i: (raw >> 13) & 0x1 != 0,
        asi: ((raw >> 5) & 0xff) as u8,
        rs2: (raw & 0x1f) as u8,
        simm13: sign_ext(raw & 0x1fff, 13) as i32,
        imm22: raw & 0x3f_ffff,
        imm7: raw & 0x7f,
        disp22: raw & 0x3f_ffff,
        disp30: raw & 0x3fff_ffff,
    }
}

impl Decoded {
    /// Branch displacement in bytes, sign-extended from 22 bits.
    pub fn branch_offset(&self) -> u32 {
        sign_ext(self.disp22, 22).wrapping_mul(4)
    }

    /// Call displacement in bytes. The 30-bit field times four wraps the
    /// whole address space, so no sign extension is needed.
    pub fn call_offset(&self) -> u32 {
        self.disp30.wrapping_mul(4)
    }
}
