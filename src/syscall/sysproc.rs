use crate::syscall::syscall::{argaddr, argint};
use crate::proc;
use crate::trap::{ticks, ticks_sleep};

pub(crate) fn sys_fork() -> u64 {
    match proc::fork() {
        Some(pid) => pid as u64,
        None => u64::MAX,
    }
}

pub(crate) fn sys_exit() -> u64 {
    let status = crate::syscall::syscall::argint(0);
    proc::exit(status);
}

pub(crate) fn sys_wait() -> u64 {
    let addr = argaddr(0);
    proc::wait(addr) as u64
}

pub(crate) fn sys_getpid() -> u64 {
    proc::myproc().pid as u64
}

pub(crate) fn sys_kill() -> u64 {
    let pid = argint(0) as u32;
    proc::kill(pid) as i64 as u64
}

pub(crate) fn sys_sbrk() -> u64 {
    let n = argint(0);
    let addr = proc::myproc().sz;
    if proc::growproc(n) < 0 {
        return u64::MAX;
    }
    addr as u64
}

pub(crate) fn sys_sleep() -> u64 {
    let n = argint(0) as u64;
    ticks_sleep(n) as i64 as u64
}

pub(crate) fn sys_uptime() -> u64 {
    ticks()
}
