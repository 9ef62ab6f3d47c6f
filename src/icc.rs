//! Integer condition codes.
//!
//! ALU operations return a staged [`Icc`] alongside their result; only the
//! flag-setting mnemonics commit it into the PSR.

use crate::cpu::Psr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Icc {
    pub n: bool,
    pub z: bool,
    pub v: bool,
    pub c: bool,
}

impl Icc {
    /// N and Z come from the result; V and C are whatever the operation computed.
    pub fn stage(result: u32, overflow: bool, carry: bool) -> Self {
        Self {
            n: (result as i32) < 0,
            z: result == 0,
            v: overflow,
            c: carry,
        }
    }

    pub fn from_psr(psr: Psr) -> Self {
        Self {
            n: psr.contains(Psr::N),
            z: psr.contains(Psr::Z),
            v: psr.contains(Psr::V),
            c: psr.contains(Psr::C),
        }
    }

    /// Replaces all four icc bits of `psr` at once.
    pub fn commit(self, psr: &mut Psr) {
        psr.set(Psr::N, self.n);
        psr.set(Psr::Z, self.z);
        psr.set(Psr::V, self.v);
        psr.set(Psr::C, self.c);
    }
}

/// Integer condition field of Bicc and Ticc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
    Never = 0x0,
    Equal = 0x1,
    LessOrEqual = 0x2,
    Less = 0x3,
    LessOrEqualUnsigned = 0x4,
    CarrySet = 0x5,
    Negative = 0x6,
    OverflowSet = 0x7,
    Always = 0x8,
    NotEqual = 0x9,
    Greater = 0xa,
    GreaterOrEqual = 0xb,
    GreaterUnsigned = 0xc,
    CarryClear = 0xd,
    Positive = 0xe,
    OverflowClear = 0xf,
}

impl Cond {
    pub fn from_field(cond: u8) -> Cond {
        match cond & 0xf {
            0x0 => Cond::Never,
            0x1 => Cond::Equal,
            0x2 => Cond::LessOrEqual,
            0x3 => Cond::Less,
            0x4 => Cond::LessOrEqualUnsigned,
            0x5 => Cond::CarrySet,
            0x6 => Cond::Negative,
            0x7 => Cond::OverflowSet,
            0x8 => Cond::Always,
            0x9 => Cond::NotEqual,
            0xa => Cond::Greater,
            0xb => Cond::GreaterOrEqual,
            0xc => Cond::GreaterUnsigned,
            0xd => Cond::CarryClear,
            0xe => Cond::Positive,
            _ => Cond::OverflowClear,
        }
    }

    pub fn holds(self, icc: Icc) -> bool {
        match self {
            Cond::Never => false,
            Cond::Equal => icc.z,
            Cond::LessOrEqual => icc.z || (icc.n ^ icc.v),
            Cond::Less => icc.n ^ icc.v,
            Cond::LessOrEqualUnsigned => icc.c || icc.z,
            Cond::CarrySet => icc.c,
            Cond::Negative => icc.n,
            Cond::OverflowSet => icc.v,
            Cond::Always => true,
            Cond::NotEqual => !icc.z,
            Cond::Greater => !(icc.z || (icc.n ^ icc.v)),
            Cond::GreaterOrEqual => !(icc.n ^ icc.v),
            Cond::GreaterUnsigned => !(icc.c || icc.z),
            Cond::CarryClear => !icc.c,
            Cond::Positive => !icc.n,
            Cond::OverflowClear => !icc.v,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Cond::Never => "n",
            Cond::Equal => "e",
            Cond::LessOrEqual => "le",
            Cond::Less => "l",
            Cond::LessOrEqualUnsigned => "leu",
            Cond::CarrySet => "cs",
            Cond::Negative => "neg",
            Cond::OverflowSet => "vs",
            Cond::Always => "a",
            Cond::NotEqual => "ne",
            Cond::Greater => "g",
            Cond::GreaterOrEqual => "ge",
            Cond::GreaterUnsigned => "gu",
            Cond::CarryClear => "cc",
            Cond::Positive => "pos",
            Cond::OverflowClear => "vc",
        }
    }
}
