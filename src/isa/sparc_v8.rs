//! SPARC V8 integer-unit opcode map.
//!
//! Field values as they appear in the instruction word. Only the subset the
//! interpreter executes is named here; everything else falls through to the
//! fatal unimplemented path in dispatch.

use serde::{Deserialize, Serialize};

// op (bits 31:30)
pub const OP_FORMAT_2: u8 = 0x0;
pub const OP_CALL: u8 = 0x1;
pub const OP_FORMAT_3_ALU: u8 = 0x2;
pub const OP_FORMAT_3_MEM: u8 = 0x3;

// op2 (bits 24:22), format 2
pub const OP2_NOP: u8 = 0x0;
pub const OP2_BICC: u8 = 0x2;
pub const OP2_SETHI: u8 = 0x4;

// op3 (bits 24:19), op = 2
pub const OP3_ADD: u8 = 0x00;
pub const OP3_AND: u8 = 0x01;
pub const OP3_OR: u8 = 0x02;
pub const OP3_XOR: u8 = 0x03;
pub const OP3_SUB: u8 = 0x04;
pub const OP3_ANDN: u8 = 0x05;
pub const OP3_ORN: u8 = 0x06;
pub const OP3_UMUL: u8 = 0x0a;
pub const OP3_SMUL: u8 = 0x0b;
pub const OP3_UDIV: u8 = 0x0e;
pub const OP3_SDIV: u8 = 0x0f;
pub const OP3_ADDCC: u8 = 0x10;
pub const OP3_ANDCC: u8 = 0x11;
pub const OP3_ORCC: u8 = 0x12;
pub const OP3_XORCC: u8 = 0x13;
pub const OP3_SUBCC: u8 = 0x14;
pub const OP3_UMULCC: u8 = 0x1a;
pub const OP3_SMULCC: u8 = 0x1b;
pub const OP3_UDIVCC: u8 = 0x1e;
pub const OP3_SDIVCC: u8 = 0x1f;
pub const OP3_MULSCC: u8 = 0x24;
pub const OP3_SLL: u8 = 0x25;
pub const OP3_SRL: u8 = 0x26;
pub const OP3_SRA: u8 = 0x27;
pub const OP3_RDASR: u8 = 0x28; // rd %y when rs1 == 0
pub const OP3_RDPSR: u8 = 0x29;
pub const OP3_RDWIM: u8 = 0x2a;
pub const OP3_RDTBR: u8 = 0x2b;
pub const OP3_WRASR: u8 = 0x30; // wr %y when rd == 0
pub const OP3_WRPSR: u8 = 0x31;
pub const OP3_WRWIM: u8 = 0x32;
pub const OP3_WRTBR: u8 = 0x33;
pub const OP3_JMPL: u8 = 0x38;
pub const OP3_RETT: u8 = 0x39;
pub const OP3_TICC: u8 = 0x3a;
pub const OP3_SAVE: u8 = 0x3c;
pub const OP3_RESTORE: u8 = 0x3d;

// op3 (bits 24:19), op = 3
pub const OP3_LD: u8 = 0x00;
pub const OP3_LDUB: u8 = 0x01;
pub const OP3_LDUH: u8 = 0x02;
pub const OP3_LDD: u8 = 0x03;
pub const OP3_ST: u8 = 0x04;
pub const OP3_STB: u8 = 0x05;
pub const OP3_STH: u8 = 0x06;
pub const OP3_STD: u8 = 0x07;
pub const OP3_LDSB: u8 = 0x09;
pub const OP3_LDSH: u8 = 0x0a;
pub const OP3_LDSTUB: u8 = 0x0d;

/// Logical register names. The discriminants are the 5-bit register numbers
/// used in the rd/rs1/rs2 instruction fields.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reg {
    G0 = 0,
    G1 = 1,
    G2 = 2,
    G3 = 3,
    G4 = 4,
    G5 = 5,
    G6 = 6,
    G7 = 7,
    O0 = 8,
    O1 = 9,
    O2 = 10,
    O3 = 11,
    O4 = 12,
    O5 = 13,
    O6 = 14,
    O7 = 15,
    L0 = 16,
    L1 = 17,
    L2 = 18,
    L3 = 19,
    L4 = 20,
    L5 = 21,
    L6 = 22,
    L7 = 23,
    I0 = 24,
    I1 = 25,
    I2 = 26,
    I3 = 27,
    I4 = 28,
    I5 = 29,
    I6 = 30,
    I7 = 31,
}

impl Reg {
    /// Stack pointer.
    pub const SP: Reg = Reg::O6;
    /// Frame pointer.
    pub const FP: Reg = Reg::I6;

    const ALL: [Reg; 32] = [
        Reg::G0, Reg::G1, Reg::G2, Reg::G3, Reg::G4, Reg::G5, Reg::G6, Reg::G7,
        Reg::O0, Reg::O1, Reg::O2, Reg::O3, Reg::O4, Reg::O5, Reg::O6, Reg::O7,
        Reg::L0, Reg::L1, Reg::L2, Reg::L3, Reg::L4, Reg::L5, Reg::L6, Reg::L7,
        Reg::I0, Reg::I1, Reg::I2, Reg::I3, Reg::I4, Reg::I5, Reg::I6, Reg::I7,
    ];

    /// Maps a 5-bit register field to its name. Bits above the field are ignored.
    pub fn from_field(n: u8) -> Reg {
        Self::ALL[(n & 0x1f) as usize]
    }

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Assembler spelling, e.g. `%o6` prints as `%sp`.
    pub fn name(self) -> &'static str {
        const NAMES: [&str; 32] = [
            "%g0", "%g1", "%g2", "%g3", "%g4", "%g5", "%g6", "%g7",
            "%o0", "%o1", "%o2", "%o3", "%o4", "%o5", "%sp", "%o7",
            "%l0", "%l1", "%l2", "%l3", "%l4", "%l5", "%l6", "%l7",
            "%i0", "%i1", "%i2", "%i3", "%i4", "%i5", "%fp", "%i7",
        ];
        NAMES[self as usize]
    }

    /// The sixteen registers a window spill/fill moves, in save-area order.
    pub const SAVE_AREA: [Reg; 16] = [
        Reg::L0, Reg::L1, Reg::L2, Reg::L3, Reg::L4, Reg::L5, Reg::L6, Reg::L7,
        Reg::I0, Reg::I1, Reg::I2, Reg::I3, Reg::I4, Reg::I5, Reg::I6, Reg::I7,
    ];
}

impl From<Reg> for u8 {
    fn from(r: Reg) -> u8 {
        r as u8
    }
}
