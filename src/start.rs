use core::arch::asm;

use crate::kmain;
use crate::param::*;
use crate::riscv::*;

#[repr(C, align(16))]
struct Stack0Aligned([u8; 4096 * NCPU]);
#[no_mangle]
static stack0: Stack0Aligned = Stack0Aligned([0; 4096 * NCPU]);

#[no_mangle]
extern "C" fn start() {
    // set M Previous Privilege mode to Supervisor, for mret.
    let mut x = r_mstatus();
    x &= !MSTATUS_MPP_MASK;
    x |= MSTATUS_MPP_S;
    w_mstatus(x);

    // set M Exception Program Counter to main, for mret.
    // requires gcc -mcmodel=medany
    w_mepc(kmain as usize);

    // disable paging for now.
    w_satp(0);

    // delegate all interrupts and exceptions to supervisor mode.
    w_medeleg(0xffff);
    w_mideleg(0xffff);
    w_sie(r_sie() | SIE_SEIE | SIE_STIE | SIE_SSIE);

    // configure Physical Memory Protection to give supervisor mode
    // access to all of physical memory.
    w_pmpaddr0(0x3ffffffffffff);
    w_pmpcfg0(0xf);

    // enable the Sstc extension's stimecmp so S-mode can arm its own
    // timer interrupts directly, without routing through the CLINT.
    w_menvcfg(r_menvcfg() | MENVCFG_STCE);

    // allow supervisor mode to read the time CSR.
    w_mcounteren(r_mcounteren() | COUNTEREN_TM);

    // arm the first timer interrupt; kerneltrap's clockintr() rearms
    // every subsequent one.
    w_stimecmp(r_time() + TICK_INTERVAL);

    // keep each CPU's hartid in its tp register, for cpuid().
    let id = r_mhartid();
    w_tp(id);

    // switch to supervisor mode and jump to main().
    unsafe { asm!("mret") }
}
