use crate::MAKE_SATP;
use crate::memlayout::{TRAMPOLINE, UART0_IRQ, VIRTIO0_IRQ};
use crate::param::TICK_INTERVAL;
use crate::plic::{plic_claim, plic_complete};
use crate::proc::{cpuid, killed, myproc, mycpu, proc_yield, setkilled, sleep, wakeup};
use crate::riscv::{
    intr_get, intr_off, intr_on, r_satp, r_scause, r_sepc, r_sstatus, r_stval, r_time,
    w_sepc, w_sstatus, w_stimecmp, w_stvec, PageTable, PGSIZE, SSTATUS_SPIE, SSTATUS_SPP,
};
use crate::spinlock::Spinlock;
use crate::syscall::syscall::syscall;
use crate::uart::uartintr;
use crate::virtio::virtio_disk::virtio_disk_intr;

static mut TICKS_LOCK: Option<Spinlock> = None;
static mut TICKS: u64 = 0;

// in kernelvec.S, calls kerneltrap().
extern {
    static kernelvec: u8;
    static trampoline: u8;
    static uservec: u8;
    static userret: u8;
}

pub fn trapinit() {
    unsafe {
        TICKS_LOCK = Some(Spinlock::init_lock("time"));
    }
}

// set up to take exceptions and traps while in the kernel.
pub fn trapinithart() {
    w_stvec((unsafe { &kernelvec } as *const u8).expose_provenance());
}

//
// handle an interrupt, exception, or system call from user space.
// called from trampoline.S
//
extern "C" fn usertrap() {
    if (r_sstatus() & SSTATUS_SPP) != 0 {
        panic!("usertrap: not from user mode");
    }

    // send interrupts and exceptions to kerneltrap(),
    // since we're now in the kernel.
    w_stvec((unsafe { &kernelvec } as *const u8).expose_provenance());

    let p = myproc();

    // save user program counter.
    unsafe {
        (*p.trapframe.unwrap()).epc = r_sepc() as u64;
    }

    let scause = r_scause();
    if scause == 8 {
        // system call

        if killed(p) != 0 {
            crate::proc::exit(-1);
        }

        // sepc points to the ecall instruction, but we want to return to
        // the next instruction.
        unsafe {
            (*p.trapframe.unwrap()).epc += 4;
        }

        // an interrupt will change sepc, scause, and sstatus, so enable
        // only now that we're done with those registers.
        intr_on();

        syscall();
    } else if let Some(which_dev) = devintr(scause) {
        if which_dev == 2 {
            proc_yield();
        }
    } else {
        log::warn!(
            "usertrap(): unexpected scause {:x} pid={}",
            scause,
            p.pid
        );
        log::warn!("            sepc={:x} stval={:x}", r_sepc(), r_stval());
        setkilled(p);
    }

    if killed(p) != 0 {
        crate::proc::exit(-1);
    }

    usertrapret();
}

//
// return to user space
//
pub fn usertrapret() {
    let p = myproc();

    // we're about to switch the destination of traps from
    // kerneltrap() to usertrap(), so turn off interrupts until
    // we're back in user space, where usertrap() is correct.
    intr_off();

    // send syscalls, interrupts, and exceptions to uservec in trampoline.S
    let uservec_addr = (unsafe { &uservec } as *const u8).expose_provenance();
    let trampoline_addr = (unsafe { &trampoline } as *const u8).expose_provenance();
    let trampoline_uservec = TRAMPOLINE + uservec_addr - trampoline_addr;
    w_stvec(trampoline_uservec);

    // set up trapframe values that uservec will need when
    // the process next traps into the kernel.

    let trapframe = unsafe { p.trapframe.unwrap().as_mut().unwrap() };
    trapframe.kernel_satp = r_satp() as u64;         // kernel page table
    trapframe.kernel_sp = (p.kstack + PGSIZE) as u64; // process's kernel stack
    trapframe.kernel_trap = usertrap as u64;
    trapframe.kernel_hartid = crate::riscv::r_tp();         // hartid for cpuid()

    // set up the registers that trampoline.S's sret will use
    // to get to user space.

    // set S Previous Privilege mode to User.
    let mut x = r_sstatus();
    x &= !SSTATUS_SPP; // clear SPP to 0 for user mode
    x |= SSTATUS_SPIE; // enable interrupts in user mode
    w_sstatus(x);

    // set S Exception Program Counter to the saved user pc.
    w_sepc(trapframe.epc as usize);

    // tell trampoline.S the user page table to switch to.
    let satp = MAKE_SATP!((p.pagetable.unwrap() as *const PageTable).expose_provenance());

    // jump to userret in trampoline.S at the top of memory, which
    // switches to the user page table, restores user registers,
    // and switches to user mode with sret.
    let userret_addr = (unsafe { &userret } as *const u8).expose_provenance();
    let trampoline_userret = TRAMPOLINE + userret_addr - trampoline_addr;

    unsafe {
        let func: extern "C" fn(usize) = core::mem::transmute(trampoline_userret);
        func(satp);
    };
}

//
// interrupts and exceptions from kernel code go here via kernelvec,
// on whatever the current kernel stack is.
//
#[no_mangle]
extern "C" fn kerneltrap() {
    let sepc = r_sepc();
    let sstatus = r_sstatus();
    let scause = r_scause();

    if (sstatus & SSTATUS_SPP) == 0 {
        panic!("kerneltrap: not from supervisor mode");
    }
    if intr_get() {
        panic!("kerneltrap: interrupts enabled");
    }

    match devintr(scause) {
        None => {
            log::error!("scause {:x}", scause);
            log::error!(
                "sepc={:x} stval={:x}",
                r_sepc(),
                r_stval()
            );
            panic!("kerneltrap");
        }
        Some(2) => {
            // give up the CPU if this is a timer interrupt.
            if mycpu().current_is_running() {
                proc_yield();
            }
        }
        Some(_) => {}
    }

    // the yield() may have caused some traps to occur,
    // so restore trap registers for use by kernelvec.S's sepc instruction.
    w_sepc(sepc as usize);
    w_sstatus(sstatus);
}

// Current tick count, for sys_uptime.
pub(crate) fn ticks() -> u64 {
    unsafe {
        TICKS_LOCK.as_mut().unwrap().acquire();
        let t = TICKS;
        TICKS_LOCK.as_mut().unwrap().release();
        t
    }
}

// Block the calling process for n ticks. Returns -1 if killed while
// waiting, 0 otherwise.
pub(crate) fn ticks_sleep(n: u64) -> i32 {
    unsafe {
        TICKS_LOCK.as_mut().unwrap().acquire();
        let ticks0 = TICKS;
        while TICKS - ticks0 < n {
            if killed(myproc()) != 0 {
                TICKS_LOCK.as_mut().unwrap().release();
                return -1;
            }
            sleep(&TICKS as *const u64 as *const u8, TICKS_LOCK.as_mut().unwrap());
        }
        TICKS_LOCK.as_mut().unwrap().release();
    }
    0
}

fn clockintr() {
    unsafe {
        if cpuid() == 0 {
            TICKS_LOCK.as_mut().unwrap().acquire();
            TICKS += 1;
            wakeup(&TICKS as *const u64 as *const u8);
            TICKS_LOCK.as_mut().unwrap().release();
        }
    }

    // ask for the next timer interrupt, via the S-mode timer extension.
    w_stimecmp(r_time() + TICK_INTERVAL);
}

// check if it's an external interrupt or software interrupt, and handle
// it. returns 2 if timer interrupt, 1 if other device, 0 if not
// recognized.
fn devintr(scause: u64) -> Option<i32> {
    if scause & 0x8000000000000000 != 0 && (scause & 0xff) == 9 {
        // this is a supervisor external interrupt, via PLIC.

        let irq = plic_claim();

        if irq as usize == UART0_IRQ {
            uartintr();
        } else if irq as usize == VIRTIO0_IRQ {
            virtio_disk_intr();
        } else if irq != 0 {
            log::warn!("unexpected interrupt irq={}", irq);
        }

        if irq != 0 {
            plic_complete(irq);
        }

        Some(1)
    } else if scause == 0x8000000000000005 {
        // timer interrupt.
        clockintr();
        Some(2)
    } else {
        None
    }
}
