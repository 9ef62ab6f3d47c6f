mod common;

use common::*;
use pretty_assertions::assert_eq;
use sparc_sim::isa::sparc_v8::*;
use sparc_sim::{Bus, CpuConfig, Psr, Reg, RunExit, Trap, TrapMode, TrapType};

/// Trap table base. Must leave the tt field (bits 11:4) clear.
const VECTORS: u32 = 0x2000;

fn vectored(program: &[u32]) -> (sparc_sim::Cpu, sparc_sim::LinearMemory) {
    let (mut cpu, mem) = setup_in(0x4000, CpuConfig::default(), program);
    cpu.tbr = VECTORS;
    (cpu, mem)
}

#[test]
fn software_trap_is_delivered_through_the_tbr() {
    let (mut cpu, mut mem) = vectored(&[NOP, ticc(COND_A, Reg::G0, 5)]);
    cpu.step(&mut mem).unwrap();
    let trap = cpu.step(&mut mem).unwrap_err();
    assert_eq!(trap, Trap { tt: TrapType::Software(5), pc: 4, npc: 8 });

    cpu.enter_trap(&mut mem).unwrap();
    assert_eq!(cpu.pending_trap, None);
    assert_eq!(cpu.tbr, VECTORS | 0x85 << 4);
    assert_eq!((cpu.pc, cpu.npc), (VECTORS | 0x850, VECTORS | 0x854));
    assert_eq!(cpu.cwp(), 7);
    assert_eq!(reg(&cpu, Reg::L1), 4);
    assert_eq!(reg(&cpu, Reg::L2), 8);
    assert!(cpu.psr.contains(Psr::S | Psr::PS));
    assert!(!cpu.psr.contains(Psr::ET));
}

#[test]
fn trap_number_wraps_to_seven_bits() {
    let (mut cpu, mut mem) = setup(&[ticc(COND_A, Reg::O0, 2)]);
    set(&mut cpu, Reg::O0, 0x7f);
    assert_eq!(cpu.step(&mut mem).unwrap_err().tt, TrapType::Software(1));
}

#[test]
fn conditional_trap_not_taken() {
    let (mut cpu, mut mem) = setup(&[ticc(COND_NE, Reg::G0, 5)]);
    cpu.psr.insert(Psr::Z);
    cpu.step(&mut mem).unwrap();
    assert_eq!(cpu.pc, 4);
}

#[test]
fn vectored_handler_returns_with_jmpl_rett() {
    let (mut cpu, mut mem) = vectored(&[ticc(COND_A, Reg::G0, 0), inc_g(Reg::G2)]);
    load(
        &mut mem,
        VECTORS | 0x800,
        &[
            inc_g(Reg::G1),
            alu_ri(OP3_JMPL, Reg::G0, Reg::L2, 0),
            alu_ri(OP3_RETT, Reg::G0, Reg::L2, 4),
        ],
    );

    assert!(cpu.step(&mut mem).is_err());
    cpu.enter_trap(&mut mem).unwrap();
    assert_eq!(cpu.pc, VECTORS | 0x800);
    for _ in 0..4 {
        cpu.step(&mut mem).unwrap();
    }
    assert_eq!(reg(&cpu, Reg::G1), 1);
    assert_eq!(reg(&cpu, Reg::G2), 1);
    assert_eq!(cpu.cwp(), 0);
    assert!(cpu.psr.contains(Psr::S | Psr::ET));
    assert_eq!(cpu.pc, 8);
}

fn inc_g(r: Reg) -> u32 {
    alu_ri(OP3_ADD, r, r, 1)
}

#[test]
fn rett_checks_window_before_privilege() {
    let (mut cpu, mut mem) = setup(&[alu_ri(OP3_RETT, Reg::G0, Reg::L2, 0)]);
    cpu.psr.remove(Psr::S | Psr::ET);
    assert_eq!(cpu.step(&mut mem).unwrap_err().tt, TrapType::WindowUnderflow);

    let (mut cpu, mut mem) = setup(&[alu_ri(OP3_RETT, Reg::G0, Reg::L2, 0)]);
    cpu.psr.remove(Psr::S | Psr::ET);
    cpu.wim = 0;
    assert_eq!(cpu.step(&mut mem).unwrap_err().tt, TrapType::PrivilegedInstruction);
}

#[test]
fn rett_with_traps_enabled_is_illegal() {
    let (mut cpu, mut mem) = setup(&[alu_ri(OP3_RETT, Reg::G0, Reg::L2, 0)]);
    cpu.wim = 0;
    assert_eq!(cpu.step(&mut mem).unwrap_err().tt, TrapType::IllegalInstruction);
}

#[test]
fn rett_restores_mode_and_window() {
    let (mut cpu, mut mem) = setup(&[alu_ri(OP3_RETT, Reg::G0, Reg::L2, 0)]);
    cpu.wim = 0;
    cpu.set_cwp(7);
    cpu.psr.remove(Psr::ET | Psr::PS);
    set(&mut cpu, Reg::L2, 0x40);
    cpu.step(&mut mem).unwrap();
    assert_eq!(cpu.cwp(), 0);
    assert!(!cpu.psr.contains(Psr::S));
    assert!(cpu.psr.contains(Psr::ET));
    assert_eq!((cpu.pc, cpu.npc), (4, 0x40));
}

#[test]
fn privileged_registers_need_supervisor_mode() {
    for insn in [
        alu_rr(OP3_RDPSR, Reg::O0, Reg::G0, Reg::G0),
        alu_rr(OP3_RDWIM, Reg::O0, Reg::G0, Reg::G0),
        alu_rr(OP3_RDASR, Reg::O0, Reg::G0, Reg::G0),
        alu_ri(OP3_WRTBR, Reg::G0, Reg::G0, 0),
    ] {
        let (mut cpu, mut mem) = setup(&[insn]);
        cpu.psr.remove(Psr::S);
        assert_eq!(cpu.step(&mut mem).unwrap_err().tt, TrapType::PrivilegedInstruction);
        assert_eq!(reg(&cpu, Reg::O0), 0);
    }
}

#[test]
fn state_register_reads_and_writes() {
    let (mut cpu, mut mem) = setup(&[
        alu_ri(OP3_WRWIM, Reg::G0, Reg::O0, 0x0f0),
        alu_rr(OP3_RDWIM, Reg::O1, Reg::G0, Reg::G0),
        alu_ri(OP3_WRTBR, Reg::G0, Reg::G0, -1),
        alu_rr(OP3_RDPSR, Reg::O2, Reg::G0, Reg::G0),
    ]);
    set(&mut cpu, Reg::O0, 0xffff_ff00);
    cpu.tbr = 0x0000_0a5c;
    for _ in 0..4 {
        cpu.step(&mut mem).unwrap();
    }
    // 0xffffff00 ^ 0xf0, cut to eight windows
    assert_eq!(reg(&cpu, Reg::O1), 0xf0);
    assert_eq!(cpu.tbr, 0xffff_fa5c);
    assert_eq!(reg(&cpu, Reg::O2), (Psr::S | Psr::ET).bits());
}

#[test]
fn psr_write_with_bad_cwp_is_illegal() {
    let (mut cpu, mut mem) = setup(&[alu_ri(OP3_WRPSR, Reg::G0, Reg::G0, 0xa8)]);
    let before = cpu.psr;
    assert_eq!(cpu.step(&mut mem).unwrap_err().tt, TrapType::IllegalInstruction);
    assert_eq!(cpu.psr, before);

    let (mut cpu, mut mem) = setup(&[alu_ri(OP3_WRPSR, Reg::G0, Reg::G0, 0xa3)]);
    cpu.step(&mut mem).unwrap();
    assert_eq!(cpu.cwp(), 3);
}

fn internal() -> CpuConfig {
    CpuConfig { trap_mode: TrapMode::Internal, ..CpuConfig::default() }
}

#[test]
fn internal_mode_spills_the_window_and_retries() {
    let (mut cpu, mut mem) = setup_with(internal(), &[alu_ri(OP3_SAVE, Reg::SP, Reg::SP, -96)]);
    cpu.wim = 1 << 7;
    set(&mut cpu, Reg::SP, 0x800);
    cpu.set_cwp(6);
    for (k, r) in Reg::SAVE_AREA.iter().enumerate() {
        set(&mut cpu, *r, 0x100 + k as u32);
    }
    set(&mut cpu, Reg::SP, 0x400);
    cpu.set_cwp(0);

    assert_eq!(cpu.step(&mut mem).unwrap_err().tt, TrapType::WindowOverflow);
    cpu.enter_trap(&mut mem).unwrap();
    assert_eq!(cpu.wim, 1 << 6);
    assert_eq!(cpu.cwp(), 0);
    assert_eq!((cpu.pc, cpu.npc), (0, 4));
    assert!(cpu.psr.contains(Psr::S));
    assert!(!cpu.psr.contains(Psr::ET));

    let spilled: Vec<u32> = (0..16).map(|k| mem.read_u32(0x400 + 4 * k).unwrap()).collect();
    let want: Vec<u32> = (0..16).map(|k| 0x100 + k).collect();
    assert_eq!(spilled, want);

    cpu.step(&mut mem).unwrap();
    assert_eq!(cpu.cwp(), 7);
    assert_eq!(reg(&cpu, Reg::SP), 0x7a0);
}

#[test]
fn internal_spill_from_user_mode_leaves_supervisor_set_and_traps_disabled() {
    let (mut cpu, mut mem) = setup_with(internal(), &[alu_ri(OP3_SAVE, Reg::SP, Reg::SP, -96)]);
    cpu.wim = 1 << 7;
    cpu.psr.remove(Psr::S);
    set(&mut cpu, Reg::SP, 0x400);

    assert_eq!(cpu.step(&mut mem).unwrap_err().tt, TrapType::WindowOverflow);
    cpu.enter_trap(&mut mem).unwrap();
    assert!(cpu.psr.contains(Psr::S));
    assert!(!cpu.psr.contains(Psr::PS));
    assert!(!cpu.psr.contains(Psr::ET));
    assert_eq!(cpu.cwp(), 0);
}

#[test]
fn internal_fill_with_null_stack_pointer_keeps_stale_registers() {
    let (mut cpu, mut mem) = setup_with(internal(), &[alu_ri(OP3_RESTORE, Reg::G0, Reg::G0, 0)]);
    cpu.set_cwp(1);
    set(&mut cpu, Reg::L0, 0x55);
    cpu.set_cwp(0);
    set(&mut cpu, Reg::FP, 0);

    assert_eq!(cpu.step(&mut mem).unwrap_err().tt, TrapType::WindowUnderflow);
    cpu.enter_trap(&mut mem).unwrap();
    assert_eq!(cpu.wim, 1 << 2);

    cpu.step(&mut mem).unwrap();
    assert_eq!(cpu.cwp(), 1);
    assert_eq!(reg(&cpu, Reg::L0), 0x55);
}

#[test]
fn internal_mode_fills_the_window_and_retries() {
    let (mut cpu, mut mem) = setup_with(internal(), &[alu_ri(OP3_RESTORE, Reg::G0, Reg::G0, 0)]);
    // window 1's %sp is window 0's %fp
    set(&mut cpu, Reg::FP, 0x400);
    let words: Vec<u32> = (0..16).map(|k| 0x200 + k).collect();
    load(&mut mem, 0x400, &words);

    assert_eq!(cpu.step(&mut mem).unwrap_err().tt, TrapType::WindowUnderflow);
    cpu.enter_trap(&mut mem).unwrap();
    assert_eq!(cpu.wim, 1 << 2);
    assert_eq!(cpu.cwp(), 0);

    cpu.step(&mut mem).unwrap();
    assert_eq!(cpu.cwp(), 1);
    assert_eq!(reg(&cpu, Reg::L0), 0x200);
    assert_eq!(reg(&cpu, Reg::I7), 0x20f);
}

#[test]
fn internal_mode_hands_back_other_traps() {
    let (mut cpu, mut mem) = setup_with(internal(), &[ticc(COND_A, Reg::G0, 3)]);
    let trap = cpu.step(&mut mem).unwrap_err();
    let before = cpu.to_raw_dump(sparc_sim::Endian::Big);
    assert_eq!(cpu.enter_trap(&mut mem), Err(trap));
    assert_eq!(cpu.to_raw_dump(sparc_sim::Endian::Big), before);
}

#[test]
fn run_delivers_vectored_traps_and_stops_on_request() {
    let (mut cpu, mut mem) = vectored(&[ticc(COND_A, Reg::G0, 0), NOP]);
    let handler = VECTORS | 0x800;
    load(&mut mem, handler, &[inc_g(Reg::G1), bicc(COND_A, false, 0), NOP]);
    let exit = cpu.run(&mut mem, 100, |_| false).unwrap();
    assert_eq!(exit, RunExit::StepLimit { steps: 100 });
    assert_eq!(reg(&cpu, Reg::G1), 1);

    let (mut cpu, mut mem) = setup(&[NOP, NOP, NOP]);
    let mut calls = 0;
    let exit = cpu
        .run(&mut mem, 100, |_| {
            calls += 1;
            calls > 2
        })
        .unwrap();
    assert_eq!(exit, RunExit::Stopped { steps: 2 });
}

#[test]
fn run_in_internal_mode_ends_on_foreign_traps() {
    let (mut cpu, mut mem) = setup_with(internal(), &[NOP, ticc(COND_A, Reg::G0, 9)]);
    let err = cpu.run(&mut mem, 100, |_| false).unwrap_err();
    assert_eq!(err, Trap { tt: TrapType::Software(9), pc: 4, npc: 8 });
}
