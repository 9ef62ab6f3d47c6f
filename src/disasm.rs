use crate::decoder::Decoded;
use crate::icc::Cond;
use crate::isa::sparc_v8::*;

fn r(n: u8) -> &'static str {
    Reg::from_field(n).name()
}

/// Second operand as written in assembly: a register or a signed immediate.
fn src2(d: &Decoded) -> String {
    if d.i { format!("{}", d.simm13) } else { r(d.rs2).to_string() }
}

fn addr(d: &Decoded) -> String {
    if d.i {
        match d.simm13 {
            0 => format!("[{}]", r(d.rs1)),
            off if off < 0 => format!("[{} - {}]", r(d.rs1), -off),
            off => format!("[{} + {}]", r(d.rs1), off),
        }
    } else if d.rs2 == 0 {
        format!("[{}]", r(d.rs1))
    } else {
        format!("[{} + {}]", r(d.rs1), r(d.rs2))
    }
}

/// Renders an instruction with pc-relative targets, e.g. `be,a +0x1c`.
pub fn fmt_decoded(d: &Decoded) -> String {
    fmt_with(d, |off| match off as i32 {
        neg if neg < 0 => format!("-{:#x}", neg.unsigned_abs()),
        pos => format!("+{pos:#x}"),
    })
}

/// Same as [`fmt_decoded`] but with branch and call targets resolved
/// against `pc`.
pub fn fmt_at(d: &Decoded, pc: u32) -> String {
    fmt_with(d, |off| format!("{:#x}", pc.wrapping_add(off)))
}

fn fmt_with(d: &Decoded, target: impl Fn(u32) -> String) -> String {
    match d.op {
        OP_FORMAT_2 => match d.op2 {
            OP2_NOP => "nop".to_string(),
            OP2_SETHI if d.rd == 0 && d.imm22 == 0 => "nop".to_string(),
            OP2_SETHI => format!("sethi %hi({:#x}), {}", d.imm22 << 10, r(d.rd)),
            OP2_BICC => {
                let annul = if d.a { ",a" } else { "" };
                let mn = Cond::from_field(d.cond).mnemonic();
                format!("b{mn}{annul} {}", target(d.branch_offset()))
            }
            _ => unknown(d),
        },
        OP_CALL => format!("call {}", target(d.call_offset())),
        OP_FORMAT_3_ALU => alu(d),
        _ => mem(d),
    }
}

fn alu(d: &Decoded) -> String {
    let mn = match d.op3 {
        OP3_ADD => "add",
        OP3_AND => "and",
        OP3_OR if d.rs1 == 0 => return format!("mov {}, {}", src2(d), r(d.rd)),
        OP3_OR => "or",
        OP3_XOR => "xor",
        OP3_SUB => "sub",
        OP3_ANDN => "andn",
        OP3_ORN => "orn",
        OP3_ADDCC => "addcc",
        OP3_ANDCC => "andcc",
        OP3_ORCC => "orcc",
        OP3_XORCC => "xorcc",
        OP3_SUBCC if d.rd == 0 => return format!("cmp {}, {}", r(d.rs1), src2(d)),
        OP3_SUBCC => "subcc",
        OP3_UMUL => "umul",
        OP3_SMUL => "smul",
        OP3_UDIV => "udiv",
        OP3_SDIV => "sdiv",
        OP3_UMULCC => "umulcc",
        OP3_SMULCC => "smulcc",
        OP3_UDIVCC => "udivcc",
        OP3_SDIVCC => "sdivcc",
        OP3_MULSCC => "mulscc",
        OP3_SLL => "sll",
        OP3_SRL => "srl",
        OP3_SRA => "sra",
        OP3_SAVE => "save",
        OP3_RESTORE if d.rd == 0 && d.rs1 == 0 && !d.i && d.rs2 == 0 => return "restore".into(),
        OP3_RESTORE => "restore",
        OP3_RDASR if d.rs1 == 0 => return format!("rd %y, {}", r(d.rd)),
        OP3_RDPSR => return format!("rd %psr, {}", r(d.rd)),
        OP3_RDWIM => return format!("rd %wim, {}", r(d.rd)),
        OP3_RDTBR => return format!("rd %tbr, {}", r(d.rd)),
        OP3_WRASR if d.rd == 0 => return format!("wr {}, {}, %y", r(d.rs1), src2(d)),
        OP3_WRPSR => return format!("wr {}, {}, %psr", r(d.rs1), src2(d)),
        OP3_WRWIM => return format!("wr {}, {}, %wim", r(d.rs1), src2(d)),
        OP3_WRTBR => return format!("wr {}, {}, %tbr", r(d.rs1), src2(d)),
        OP3_JMPL => {
            let ret = d.i && d.simm13 == 8 && d.rd == 0;
            return match d.rs1 {
                31 if ret => "ret".into(),
                15 if ret => "retl".into(),
                _ => format!("jmpl {}, {}", addr(d).trim_matches(['[', ']']), r(d.rd)),
            };
        }
        OP3_RETT => return format!("rett {}", addr(d).trim_matches(['[', ']'])),
        OP3_TICC => {
            let mn = Cond::from_field(d.cond).mnemonic();
            return if d.rs1 == 0 {
                format!("t{mn} {}", src2(d))
            } else {
                format!("t{mn} {} + {}", r(d.rs1), src2(d))
            };
        }
        _ => return unknown(d),
    };
    format!("{mn} {}, {}, {}", r(d.rs1), src2(d), r(d.rd))
}

fn mem(d: &Decoded) -> String {
    let (mn, store) = match d.op3 {
        OP3_LD => ("ld", false),
        OP3_LDUB => ("ldub", false),
        OP3_LDUH => ("lduh", false),
        OP3_LDD => ("ldd", false),
        OP3_LDSB => ("ldsb", false),
        OP3_LDSH => ("ldsh", false),
        OP3_LDSTUB => ("ldstub", false),
        OP3_ST => ("st", true),
        OP3_STB => ("stb", true),
        OP3_STH => ("sth", true),
        OP3_STD => ("std", true),
        _ => return unknown(d),
    };
    if store {
        format!("{mn} {}, {}", r(d.rd), addr(d))
    } else {
        format!("{mn} {}, {}", addr(d), r(d.rd))
    }
}

fn unknown(d: &Decoded) -> String {
    format!(".word {:#010x}", d.raw)
}
