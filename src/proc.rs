use core::mem;
use core::sync::atomic::{AtomicU32, Ordering};
use crate::file::{File, INode};
use crate::file::file::filedup;
use crate::fs::fs;
use crate::kalloc::KMEM;
use crate::KSTACK;
use crate::memlayout::{TRAMPOLINE, TRAPFRAME};
use crate::param::{NCPU, NOFILE, NPROC, ROOTDEV};
use crate::proc::Procstate::{RUNNABLE, RUNNING, SLEEPING, UNUSED, USED, ZOMBIE};
use crate::riscv::{PageTable, PGSIZE, PTE_R, PTE_W, PTE_X, r_tp};
use crate::spinlock::{pop_off, push_off, Spinlock};
use crate::string::safestrcpy;
use crate::trap::usertrapret;
use crate::vm::{kvmmap, mappages, uvmalloc, uvmcopy, uvmcreate, uvmdealloc, uvmfirst, uvmfree, uvmunmap};

extern "C" {
    fn swtch(old: *mut Context, new: *mut Context);
}

// Saved registers for kernel context switches.
#[derive(Copy, Clone, Default)]
#[repr(C)]
struct Context {
    ra: u64,
    sp: u64,

    // callee-saved
    s0: u64,
    s1: u64,
    s2: u64,
    s3: u64,
    s4: u64,
    s5: u64,
    s6: u64,
    s7: u64,
    s8: u64,
    s9: u64,
    s10: u64,
    s11: u64,
}

// Per-CPU state.
#[derive(Copy, Clone)]
pub struct Cpu<'a> {
    proc: Option<&'a Proc<'a>>, // the process running on this cpu, or None.
    context: Context,           // swtch() here to enter scheduler().
    pub noff: u8,               // depth of push_off() nesting.
    pub intena: bool,           // were interrupts enabled before push_off()?
}

impl<'a> Cpu<'a> {
    const fn default() -> Self {
        Cpu {
            proc: None,
            context: Context { ra: 0, sp: 0, s0: 0, s1: 0, s2: 0, s3: 0, s4: 0, s5: 0, s6: 0, s7: 0, s8: 0, s9: 0, s10: 0, s11: 0 },
            noff: 0,
            intena: false,
        }
    }

    // pure bookkeeping for the nested interrupt-disable depth counter,
    // separated from the CSR read/write so it can be unit-tested without
    // touching hardware state.
    pub fn begin_nested_disable(&mut self, was_enabled: bool) {
        if self.noff == 0 {
            self.intena = was_enabled;
        }
        self.noff += 1;
    }

    // returns whether interrupts should now be re-enabled.
    pub fn end_nested_disable(&mut self) -> bool {
        if self.noff < 1 {
            panic!("pop_off");
        }
        self.noff -= 1;
        self.noff == 0 && self.intena
    }

    #[cfg(test)]
    pub fn for_test() -> Self {
        Self::default()
    }

    // used by kerneltrap to decide whether a timer tick should yield:
    // only if a process is actually running on this cpu right now.
    pub fn current_is_running(&self) -> bool {
        matches!(self.proc, Some(p) if p.state == RUNNING)
    }
}

static mut CPUS: [Cpu; NCPU] = [Cpu::default(); NCPU];
static mut PROCS: [Proc; NPROC] = [Proc::default(); NPROC];

static mut INIT_PROC: Option<&Proc> = None;

extern {
    static trampoline: u8; // trampoline.S
}

// per-process data for the trap handling code in trampoline.S.
// sits in a page by itself just under the trampoline page in the
// user page table. not specially mapped in the kernel page table.
// uservec in trampoline.S saves user registers in the trapframe,
// then initializes registers from the trapframe's
// kernel_sp, kernel_hartid, kernel_satp, and jumps to kernel_trap.
// usertrapret() and userret in trampoline.S set up
// the trapframe's kernel_*, restore user registers from the
// trapframe, switch to the user page table, and enter user space.
#[repr(C)]
pub struct Trapframe {
    /*   0 */ pub kernel_satp: u64,   // kernel page table
    /*   8 */ pub kernel_sp: u64,     // top of process's kernel stack
    /*  16 */ pub kernel_trap: u64,   // usertrap()
    /*  24 */ pub epc: u64,           // saved user program counter
    /*  32 */ pub kernel_hartid: u64, // saved kernel tp
    /*  40 */ pub ra: u64,
    /*  48 */ pub sp: u64,
    /*  56 */ pub gp: u64,
    /*  64 */ pub tp: u64,
    /*  72 */ pub t0: u64,
    /*  80 */ pub t1: u64,
    /*  88 */ pub t2: u64,
    /*  96 */ pub s0: u64,
    /* 104 */ pub s1: u64,
    /* 112 */ pub a0: u64,
    /* 120 */ pub a1: u64,
    /* 128 */ pub a2: u64,
    /* 136 */ pub a3: u64,
    /* 144 */ pub a4: u64,
    /* 152 */ pub a5: u64,
    /* 160 */ pub a6: u64,
    /* 168 */ pub a7: u64,
    /* 176 */ pub s2: u64,
    /* 184 */ pub s3: u64,
    /* 192 */ pub s4: u64,
    /* 200 */ pub s5: u64,
    /* 208 */ pub s6: u64,
    /* 216 */ pub s7: u64,
    /* 224 */ pub s8: u64,
    /* 232 */ pub s9: u64,
    /* 240 */ pub s10: u64,
    /* 248 */ pub s11: u64,
    /* 256 */ pub t3: u64,
    /* 264 */ pub t4: u64,
    /* 272 */ pub t5: u64,
    /* 280 */ pub t6: u64,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Procstate { UNUSED, USED, SLEEPING, RUNNABLE, RUNNING, ZOMBIE }

// Per-process state
#[derive(Copy, Clone)]
pub struct Proc<'a> {
    pub lock: Spinlock,

    // p.lock must be held when using these:
    state: Procstate,            // process state
    chan: Option<*const u8>,     // if Some, sleeping on chan
    killed: u8,                  // if non-zero, have been killed
    xstate: i32,                 // exit status to be returned to parent's wait
    pub pid: u32,                // process ID

    // wait_lock must be held when using this:
    parent: Option<*const Proc<'a>>,

    // these are private to the process, so p.lock need not be held.
    pub(crate) kstack: usize,             // virtual address of kernel stack
    pub sz: usize,                        // size of process memory (bytes)
    pub pagetable: Option<*mut PageTable>, // user page table
    pub trapframe: Option<*mut Trapframe>, // data page for trampoline.S
    context: Context,                     // swtch() here to run process
    pub(crate) ofile: [Option<*mut File>; NOFILE], // open files
    pub(crate) cwd: Option<*mut INode>,    // current directory
    pub name: [u8; 16],                    // process name (debugging)
    _marker: core::marker::PhantomData<&'a ()>,
}

impl<'a> Proc<'a> {
    const fn default() -> Self {
        Proc {
            lock: Spinlock::init_lock("proc"),
            state: UNUSED,
            chan: None,
            killed: 0,
            xstate: 0,
            pid: 0,
            parent: None,
            kstack: 0,
            sz: 0,
            pagetable: None,
            trapframe: None,
            context: Context { ra: 0, sp: 0, s0: 0, s1: 0, s2: 0, s3: 0, s4: 0, s5: 0, s6: 0, s7: 0, s8: 0, s9: 0, s10: 0, s11: 0 },
            ofile: [None; NOFILE],
            cwd: None,
            name: [0; 16],
            _marker: core::marker::PhantomData,
        }
    }

    pub fn killed(&self) -> u8 {
        // read without the process lock, matching the original's
        // lock-free `killed()` accessor used from sleep-loop guards.
        self.killed
    }

    pub fn setkilled(&mut self) {
        self.lock.acquire();
        self.killed = 1;
        self.lock.release();
    }
}

static NEXT_PID: AtomicU32 = AtomicU32::new(1);
// helps ensure that wakeups of wait()ing parents are not lost, and obeys
// the memory model when touching p.parent. must be acquired before any
// p.lock.
static mut WAIT_LOCK: Spinlock = Spinlock::init_lock("wait_lock");

// Must be called with interrupts disabled, to prevent race with
// the process being moved to a different CPU.
pub fn cpuid() -> usize {
    r_tp() as usize
}

// Return this CPU's Cpu struct. Interrupts must be disabled.
pub fn mycpu() -> &'static mut Cpu<'static> {
    unsafe { &mut CPUS[cpuid()] }
}

// Return the current process, or panic if there isn't one.
#[allow(invalid_reference_casting)]
pub fn myproc<'a>() -> &'a mut Proc<'a> {
    push_off();
    let c = mycpu();
    let p = c.proc;
    pop_off();
    unsafe { &mut *(p.unwrap() as *const Proc as *mut Proc) }
}

fn allocpid() -> u32 {
    NEXT_PID.fetch_add(1, Ordering::Relaxed)
}

// Allocate a page for each process's kernel stack.
// Map it high in memory, followed by an invalid guard page.
pub fn proc_mapstacks(kpgtbl: &mut PageTable) {
    for idx in 0..NPROC {
        unsafe {
            let pa: *mut u8 = KMEM.kalloc();
            if pa.is_null() {
                panic!("kalloc");
            }
            let va = KSTACK!(idx);
            kvmmap(kpgtbl, va, pa.expose_provenance(), PGSIZE, PTE_R | PTE_W)
        }
    }
}

// initialize the process table.
pub fn procinit() {
    unsafe {
        for i in 0..NPROC {
            PROCS[i].state = UNUSED;
            PROCS[i].kstack = KSTACK!(i);
        }
    }
}

// a user program that calls exec("/init")
// assembled from ../user/initcode.S
// od -t xC ../user/initcode
const INITCODE: [u8; 52] = [
    0x17, 0x05, 0x00, 0x00, 0x13, 0x05, 0x45, 0x02,
    0x97, 0x05, 0x00, 0x00, 0x93, 0x85, 0x35, 0x02,
    0x93, 0x08, 0x70, 0x00, 0x73, 0x00, 0x00, 0x00,
    0x93, 0x08, 0x20, 0x00, 0x73, 0x00, 0x00, 0x00,
    0xef, 0xf0, 0x9f, 0xff, 0x2f, 0x69, 0x6e, 0x69,
    0x74, 0x00, 0x00, 0x24, 0x00, 0x00, 0x00, 0x00,
    0x00, 0x00, 0x00, 0x00
];

// Set up first user process.
pub fn userinit() {
    let p = allocproc().expect("userinit: allocproc failed");

    unsafe { INIT_PROC = Some(&*(p as *const Proc)); }

    // allocate one user page and copy initcode's instructions
    // and data into it.
    let pagetable = unsafe { &mut *p.pagetable.unwrap() };
    uvmfirst(pagetable, INITCODE.as_ptr(), INITCODE.len());
    p.sz = PGSIZE;

    // prepare for the very first "return" from kernel to user.
    let tf = unsafe { &mut *p.trapframe.unwrap() };
    tf.epc = 0;              // user program counter
    tf.sp = PGSIZE as u64;   // user stack pointer

    let name = b"initcode\0";
    p.name[..name.len()].copy_from_slice(name);

    // namei("/") is out of scope (file system layer); cwd is left
    // unset here, matching the external-collaborator boundary.

    p.state = RUNNABLE;

    p.lock.release();
}

// A fork child's very first scheduling by scheduler() swtch()es to
// forkret.
extern "C" fn forkret() {
    static mut FIRST: bool = true;

    // still holding p.lock from scheduler.
    myproc().lock.release();

    unsafe {
        if FIRST {
            // file system initialization must run in the context of a
            // regular process (it calls sleep), so it can't run from
            // kmain().
            FIRST = false;
            fs::fsinit(ROOTDEV);
        }
    }

    usertrapret();
}

// Look in the process table for an UNUSED proc.
// If found, initialize state required to run in the kernel,
// and return with p.lock held.
fn allocproc() -> Option<&'static mut Proc<'static>> {
    let mut found: Option<&'static mut Proc<'static>> = None;
    for i in 0..NPROC {
        let p = unsafe { &mut PROCS[i] };
        p.lock.acquire();

        if p.state == UNUSED {
            found = Some(p);
            break;
        }

        p.lock.release();
    }

    let p = found?;
    p.pid = allocpid();
    p.state = USED;

    // Allocate a trapframe page.
    let trapframe_ptr: *mut Trapframe = unsafe { KMEM.kalloc() };
    if trapframe_ptr.is_null() {
        freeproc(p);
        p.lock.release();
        return None;
    }
    p.trapframe = Some(trapframe_ptr);

    // An empty user page table.
    match proc_pagetable(p) {
        Some(pt) => p.pagetable = Some(pt),
        None => {
            freeproc(p);
            p.lock.release();
            return None;
        }
    }

    // Set up new context to start executing at forkret,
    // which returns to user space.
    p.context = Context { ra: 0, sp: 0, s0: 0, s1: 0, s2: 0, s3: 0, s4: 0, s5: 0, s6: 0, s7: 0, s8: 0, s9: 0, s10: 0, s11: 0 };
    p.context.ra = forkret as usize as u64;
    p.context.sp = (p.kstack + PGSIZE) as u64;

    Some(p)
}

// free a proc structure and the data hanging from it, including user
// pages. p.lock must be held.
fn freeproc(p: &mut Proc) {
    if let Some(tf) = p.trapframe {
        unsafe { KMEM.kfree(tf) };
    }
    p.trapframe = None;

    if let Some(pt) = p.pagetable {
        proc_freepagetable(unsafe { &mut *pt }, p.sz);
    }
    p.pagetable = None;

    p.sz = 0;
    p.pid = 0;
    p.parent = None;
    p.name = [0; 16];
    p.chan = None;
    p.killed = 0;
    p.xstate = 0;
    p.state = UNUSED;
}

// Create a user page table for a given process, with no user memory,
// but with trampoline and trapframe pages.
pub(crate) fn proc_pagetable(p: &Proc) -> Option<&'static mut PageTable> {
    // An empty page table.
    let pagetable = uvmcreate()?;

    // map the trampoline code (for system call return) at the highest
    // user virtual address. only the supervisor uses it, on the way
    // to/from user space, so not PTE_U.
    let trampoline_addr = (unsafe { &trampoline } as *const u8).expose_provenance();
    if mappages(pagetable, TRAMPOLINE, trampoline_addr, PGSIZE, PTE_R | PTE_X) != 0 {
        uvmfree(pagetable, 0);
        return None;
    }

    // map the trapframe page just below the trampoline page, for
    // trampoline.S.
    let trapframe_addr = p.trapframe.unwrap().expose_provenance();
    if mappages(pagetable, TRAPFRAME, trapframe_addr, PGSIZE, PTE_R | PTE_W) != 0 {
        uvmunmap(pagetable, TRAMPOLINE, 1, false);
        uvmfree(pagetable, 0);
        return None;
    }

    Some(pagetable)
}

// Free a process's page table, and free the physical memory it refers to.
pub(crate) fn proc_freepagetable(pagetable: &mut PageTable, sz: usize) {
    uvmunmap(pagetable, TRAMPOLINE, 1, false);
    uvmunmap(pagetable, TRAPFRAME, 1, false);
    uvmfree(pagetable, sz);
}

// Grow or shrink user memory by n bytes.
// Returns 0 on success, -1 on failure.
pub fn growproc(n: i32) -> i32 {
    let p = myproc();
    let pagetable = unsafe { &mut *p.pagetable.unwrap() };
    let mut sz = p.sz;

    if n > 0 {
        sz = uvmalloc(pagetable, sz, sz + n as usize, PTE_W);
        if sz == 0 {
            return -1;
        }
    } else if n < 0 {
        sz = uvmdealloc(pagetable, sz, (sz as isize + n as isize) as usize);
    }
    p.sz = sz;
    0
}

// Create a new process, copying the parent. Sets up the child's
// kernel stack to return 0 as if from the fork() system call.
pub fn fork() -> Option<u32> {
    let p = myproc();

    let np = allocproc()?;

    // Copy user memory from parent to child.
    let old_pt = unsafe { &mut *p.pagetable.unwrap() };
    let new_pt = unsafe { &mut *np.pagetable.unwrap() };
    if uvmcopy(old_pt, new_pt, p.sz) < 0 {
        freeproc(np);
        np.lock.release();
        return None;
    }
    np.sz = p.sz;

    // copy saved user registers.
    unsafe {
        core::ptr::copy_nonoverlapping(p.trapframe.unwrap(), np.trapframe.unwrap(), 1);
        // fork returns 0 in the child.
        (*np.trapframe.unwrap()).a0 = 0;
    }

    // increment reference counts on open file descriptors.
    for i in 0..NOFILE {
        if let Some(f) = p.ofile[i] {
            filedup(f);
            np.ofile[i] = Some(f);
        }
    }
    np.cwd = p.cwd;

    np.name = p.name;

    let pid = np.pid;

    np.lock.release();

    unsafe {
        WAIT_LOCK.acquire();
        np.parent = Some(p as *const Proc);
        WAIT_LOCK.release();
    }

    np.lock.acquire();
    np.state = RUNNABLE;
    np.lock.release();

    Some(pid)
}

// Pass p's abandoned children to init. Caller must hold wait_lock.
fn reparent(p: *const Proc<'static>) {
    unsafe {
        for i in 0..NPROC {
            let pp = &mut PROCS[i];
            if pp.parent == Some(p) {
                pp.parent = INIT_PROC.map(|ip| ip as *const Proc);
                wakeup(INIT_PROC.unwrap() as *const Proc as *const u8);
            }
        }
    }
}

// Exit the current process. Does not return. An exited process
// remains in the zombie state until its parent calls wait().
pub fn exit(status: i32) -> ! {
    let p = myproc();

    if core::ptr::eq(p, unsafe { *INIT_PROC.as_ref().unwrap() as *const Proc as *const Proc }) {
        panic!("init exiting");
    }

    // close all open files.
    for i in 0..NOFILE {
        if let Some(f) = p.ofile[i] {
            crate::file::file::fileclose(unsafe { &mut *f });
            p.ofile[i] = None;
        }
    }

    // cwd release is handled by the (out-of-scope) file system layer.
    p.cwd = None;

    unsafe {
        WAIT_LOCK.acquire();

        // give any children to init.
        reparent(p as *const Proc);

        // parent might be sleeping in wait().
        if let Some(parent) = p.parent {
            wakeup(parent as *const u8);
        }

        p.lock.acquire();

        p.xstate = status;
        p.state = ZOMBIE;

        WAIT_LOCK.release();
    }

    sched();
    unreachable!("zombie exited");
}

// Wait for a child process to exit and return its pid.
// Return -1 if this process has no children.
pub fn wait(addr: usize) -> i32 {
    let p = myproc();

    unsafe {
        WAIT_LOCK.acquire();

        loop {
            let mut have_kids = false;
            for i in 0..NPROC {
                let np = &mut PROCS[i];
                if np.parent != Some(p as *const Proc) {
                    continue;
                }

                np.lock.acquire();
                have_kids = true;
                if np.state == ZOMBIE {
                    let pid = np.pid;
                    if addr != 0 {
                        let xstate = np.xstate;
                        if crate::proc::either_copyout(true, addr as *mut u8, &xstate as *const i32 as *const u8, mem::size_of::<i32>()) < 0 {
                            np.lock.release();
                            WAIT_LOCK.release();
                            return -1;
                        }
                    }
                    freeproc(np);
                    np.lock.release();
                    WAIT_LOCK.release();
                    return pid as i32;
                }
                np.lock.release();
            }

            if !have_kids || p.killed() != 0 {
                WAIT_LOCK.release();
                return -1;
            }

            sleep(p as *const Proc as *const u8, &mut WAIT_LOCK);
        }
    }
}

// Per-CPU process scheduler. Each CPU calls scheduler() after setting
// itself up. Scheduler never returns; it loops, doing:
//  - choose a process to run
//  - swtch to start running that process
//  - eventually that process transfers control via swtch back
//    to the scheduler.
pub fn scheduler() -> ! {
    let c = mycpu();
    c.proc = None;

    loop {
        // avoid deadlock by ensuring devices can interrupt.
        crate::riscv::intr_on();

        let mut found = false;
        unsafe {
            for i in 0..NPROC {
                let p = &mut PROCS[i];
                p.lock.acquire();
                if p.state == RUNNABLE {
                    p.state = RUNNING;
                    c.proc = Some(&*(p as *const Proc));

                    swtch(&mut c.context as *mut Context, &mut p.context as *mut Context);

                    c.proc = None;
                    found = true;
                }
                p.lock.release();
            }
        }

        if !found {
            // nothing to run; wait for an interrupt.
            unsafe { core::arch::asm!("wfi") }
        }
    }
}

// Switch to scheduler. Must hold only p.lock and have changed
// proc.state. Saves and restores intena because intena is a property
// of this kernel thread, not this CPU. It should be proc.intena and
// proc.noff, but that would break if an interrupt arrived while in the
// scheduler.
fn sched() {
    let p = myproc();

    if !p.lock.holding() {
        panic!("sched p.lock");
    }
    let c = mycpu();
    if c.noff != 1 {
        panic!("sched locks");
    }
    if p.state == RUNNING {
        panic!("sched running");
    }
    if crate::riscv::intr_get() {
        panic!("sched interruptible");
    }

    let intena = c.intena;
    unsafe {
        swtch(&mut p.context as *mut Context, &mut c.context as *mut Context);
    }
    c.intena = intena;
}

// Give up the CPU for one scheduling round.
pub fn proc_yield() {
    let p = myproc();
    p.lock.acquire();
    p.state = RUNNABLE;
    sched();
    p.lock.release();
}

// Atomically release lock and sleep on chan. Reacquires lock when
// awakened.
pub fn sleep(chan: *const u8, lk: &mut Spinlock) {
    let p = myproc();

    // must acquire p.lock in order to change p.state and then call
    // sched. once we hold p.lock we can be guaranteed that we won't
    // miss any wakeup (as wakeup locks p.lock), so it's okay to
    // release lk.
    if !core::ptr::eq(lk as *const Spinlock, &p.lock as *const Spinlock) {
        p.lock.acquire();
        lk.release();
    }

    p.chan = Some(chan);
    p.state = SLEEPING;

    sched();

    p.chan = None;

    if !core::ptr::eq(lk as *const Spinlock, &p.lock as *const Spinlock) {
        p.lock.release();
        lk.acquire();
    }
}

// Wake up all processes sleeping on chan. Must be called without any
// p.lock held.
pub fn wakeup(chan: *const u8) {
    unsafe {
        let me = myproc() as *const Proc;
        for i in 0..NPROC {
            let p = &mut PROCS[i];
            if core::ptr::eq(p as *const Proc, me) {
                continue;
            }

            p.lock.acquire();
            if p.state == SLEEPING && p.chan == Some(chan) {
                p.state = RUNNABLE;
            }
            p.lock.release();
        }
    }
}

// Kill the process with the given pid. The victim won't exit until it
// tries to return to user space (see usertrap() in trap.c).
pub fn kill(pid: u32) -> i32 {
    unsafe {
        for i in 0..NPROC {
            let p = &mut PROCS[i];
            p.lock.acquire();
            if p.pid == pid {
                p.killed = 1;
                if p.state == SLEEPING {
                    // wake process from sleep().
                    p.state = RUNNABLE;
                }
                p.lock.release();
                return 0;
            }
            p.lock.release();
        }
    }
    -1
}

pub fn setkilled(p: &mut Proc) {
    p.setkilled();
}

pub fn killed(p: &Proc) -> u8 {
    p.killed()
}

// Copy either to user or kernel address, depending on is_user_dst.
pub fn either_copyout(is_user_dst: bool, dst: *mut u8, src: *const u8, len: usize) -> i32 {
    if is_user_dst {
        let p = myproc();
        let pagetable = unsafe { &mut *p.pagetable.unwrap() };
        return crate::vm::copyout(pagetable, dst.expose_provenance(), src, len);
    }
    crate::string::memmove(dst, src, len);
    0
}

// Copy either from user or kernel address, depending on is_user_src.
pub fn either_copyin(dst: *mut u8, is_user_src: bool, src: *const u8, len: usize) -> i32 {
    if is_user_src {
        let p = myproc();
        let pagetable = unsafe { &mut *p.pagetable.unwrap() };
        return crate::vm::copyin(pagetable, dst, src.expose_provenance(), len);
    }
    crate::string::memmove(dst, src, len);
    0
}

// Print a process listing to the console, for debugging. Runs when a
// user types ^P on the console. No lock is taken here so that it can
// be run even if the machine is otherwise wedged.
pub fn procdump() {
    crate::printf!("\n");
    unsafe {
        for i in 0..NPROC {
            let p = &PROCS[i];
            if p.state == UNUSED {
                continue;
            }
            let state = match p.state {
                UNUSED => "unused",
                USED => "used",
                SLEEPING => "sleep ",
                RUNNABLE => "runble",
                RUNNING => "run   ",
                ZOMBIE => "zombie",
            };
            crate::printf!("{} {} {}\n", p.pid, state, "-");
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn context_layout_has_all_callee_saved_registers() {
        use core::mem::size_of;
        // ra, sp, s0-s11: 14 u64 fields, no hidden padding expected.
        assert_eq!(size_of::<super::Context>(), 14 * 8);
    }
}
